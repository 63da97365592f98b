//! Carpool planner using best-first search.
//!
//! This module implements the core assignment algorithm that answers:
//! "Who should drive, and who should ride with whom?"
//!
//! The algorithm searches the space of partial assignments, placing people
//! one at a time in roster order, and prefers arrangements that leave the
//! fewest people without a car and, among those, cost the least.

mod config;
mod cost;
mod frontier;
mod node;
mod progress;
mod search;


pub use config::{ConfigError, CostEquivalents, PlannerConfig};
pub use cost::CostModel;
pub use node::{Action, Car, Edge, Node};
pub use progress::{NoProgress, ProgressSink, ProgressUpdate};
pub use search::{
    PlannerError, SearchOutcome, SearchResult, SearchSession, SearchStats, plan_carpools,
};
