//! Arrangements: proposed partitions of the roster into cars.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{PersonId, Roster, Timestamp, latest};

/// One car in an arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carpool {
    /// When the car can leave: the latest earliest-departure of its occupants.
    pub departure: Option<Timestamp>,

    /// Occupants, driver first.
    pub occupants: Vec<PersonId>,
}

/// A named proposal for who travels with whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrangement {
    pub name: String,

    /// Whether the arrangement was produced by the planner.
    pub auto: bool,

    /// Cars, sorted by departure with undated cars last.
    pub carpools: Vec<Carpool>,
}

/// Returns the binding departure time for a car holding `occupants`.
pub fn car_departure(roster: &Roster, occupants: &[usize]) -> Option<Timestamp> {
    latest(occupants.iter().map(|&i| roster[i].earliest_departure))
}

impl Arrangement {
    /// Build an automatic arrangement from cars given as roster indices.
    ///
    /// Each car lists its driver first. The resulting carpools are sorted by
    /// departure; cars without a departure go last, and ties keep their
    /// original relative order.
    pub fn from_cars<'a, I>(name: impl Into<String>, roster: &Roster, cars: I) -> Self
    where
        I: IntoIterator<Item = &'a [usize]>,
    {
        let mut carpools: Vec<Carpool> = cars
            .into_iter()
            .map(|car| Carpool {
                departure: car_departure(roster, car),
                occupants: car.iter().map(|&i| roster[i].id.clone()).collect(),
            })
            .collect();

        // Stable: equal departures keep car order
        carpools.sort_by_key(|c| (c.departure.is_none(), c.departure));

        Self {
            name: name.into(),
            auto: true,
            carpools,
        }
    }

    /// Returns the number of people placed in a car.
    pub fn num_placed(&self) -> usize {
        self.carpools.iter().map(|c| c.occupants.len()).sum()
    }
}

/// Generator for "Auto N" names that avoids names the host already uses.
#[derive(Debug, Clone)]
pub struct ArrangementNames {
    taken: HashSet<String>,
    next: usize,
}

impl Default for ArrangementNames {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl ArrangementNames {
    const PREFIX: &'static str = "Auto";

    /// Create a generator that will skip every name in `existing`.
    pub fn new<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: existing.into_iter().map(Into::into).collect(),
            next: 1,
        }
    }

    /// Returns the next free name.
    pub fn next_name(&mut self) -> String {
        loop {
            let candidate = format!("{} {}", Self::PREFIX, self.next);
            self.next += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
