//! People travelling to the event.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Stable identifier of a person, as assigned by the host application.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for PersonId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PersonId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Debug for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PersonId({})", self.0)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether someone is able and willing to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanDrive {
    No,
    Yes,
    YesIfNeeded,
}

/// Where someone would like to stay at the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Accommodation {
    NoPreference,
    Hosted,
    Hotel,
    Independent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gender {
    Female,
    Male,
    NonBinary,
}

fn default_max_passengers() -> u32 {
    1
}

/// One traveller's constraints, as seen by the planner.
///
/// A `Person` is a read-only snapshot for the duration of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,

    pub can_drive: CanDrive,

    /// Seats in their car, driver included. Only meaningful for drivers.
    #[serde(default = "default_max_passengers")]
    pub max_passengers: u32,

    /// Absent means "can leave anytime".
    #[serde(default)]
    pub earliest_departure: Option<Timestamp>,

    #[serde(default)]
    pub accommodation: Option<Accommodation>,

    #[serde(default)]
    pub prefers_same_gender: bool,

    #[serde(default)]
    pub gender: Option<Gender>,

    /// People making their own way are never placed in a car.
    #[serde(default)]
    pub travels_independently: bool,
}

impl Person {
    /// Create a person with no preferences and a single seat.
    pub fn new(id: impl Into<PersonId>, can_drive: CanDrive) -> Self {
        Self {
            id: id.into(),
            can_drive,
            max_passengers: 1,
            earliest_departure: None,
            accommodation: None,
            prefers_same_gender: false,
            gender: None,
            travels_independently: false,
        }
    }

    /// Set the number of seats in their car.
    pub fn with_seats(mut self, max_passengers: u32) -> Self {
        self.max_passengers = max_passengers;
        self
    }

    /// Set the earliest time they can leave.
    pub fn departing_at(mut self, earliest_departure: Timestamp) -> Self {
        self.earliest_departure = Some(earliest_departure);
        self
    }

    pub fn with_accommodation(mut self, accommodation: Accommodation) -> Self {
        self.accommodation = Some(accommodation);
        self
    }

    pub fn with_gender(mut self, gender: Gender, prefers_same_gender: bool) -> Self {
        self.gender = Some(gender);
        self.prefers_same_gender = prefers_same_gender;
        self
    }

    pub fn independent(mut self) -> Self {
        self.travels_independently = true;
        self
    }

    /// Returns true if they could be asked to drive.
    pub fn may_drive(&self) -> bool {
        self.can_drive != CanDrive::No
    }
}
