//! Web layer for the carpool planner.
//!
//! Serves the worker protocol over a WebSocket, plus a one-shot JSON endpoint.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
