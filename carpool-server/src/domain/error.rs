//! Domain error types.
//!
//! These errors represent validation failures in the roster handed to the
//! planner. They are raised before any search starts.

use super::PersonId;

/// Domain-level errors for roster validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A person was submitted without an id
    #[error("person at position {0} has an empty id")]
    EmptyPersonId(usize),

    /// Two people share the same id
    #[error("duplicate person id: {0}")]
    DuplicatePersonId(PersonId),

    /// Someone who may drive has no room in their car, not even for themselves
    #[error("person {0} can drive but has a capacity of zero")]
    InvalidCapacity(PersonId),
}
