//! Domain types for the carpool planner.
//!
//! This module contains the people being grouped into cars and the
//! arrangements produced for them. Rosters enforce their invariants at
//! construction time, so the planner can trust person indices and ids.

mod arrangement;
mod error;
mod person;
mod roster;
mod time;

pub use arrangement::{Arrangement, ArrangementNames, Carpool, car_departure};
pub use error::DomainError;
pub use person::{Accommodation, CanDrive, Gender, Person, PersonId};
pub use roster::Roster;
pub use time::{Timestamp, hours_between, latest};
