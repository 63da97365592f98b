//! Edge costs for the carpool search.
//!
//! Every action the search can take (asking someone to drive, or putting the
//! next person into an existing car) has a cost in hours-equivalent. The
//! weights come from [`CostEquivalents`].

use crate::domain::{Accommodation, CanDrive, Person, Roster, car_departure, hours_between};

use super::config::CostEquivalents;

/// Prices actions against a roster.
#[derive(Debug, Clone, Copy)]
pub struct CostModel<'a> {
    weights: &'a CostEquivalents,
    roster: &'a Roster,
}

impl<'a> CostModel<'a> {
    pub fn new(weights: &'a CostEquivalents, roster: &'a Roster) -> Self {
        Self { weights, roster }
    }

    /// Cost of making `person` drive a car of their own.
    ///
    /// Returns `None` if they cannot drive.
    pub fn promotion(&self, person: usize) -> Option<f64> {
        let drive = match self.roster[person].can_drive {
            CanDrive::No => return None,
            CanDrive::Yes => self.weights.make_willing_driver_drive,
            CanDrive::YesIfNeeded => self.weights.make_if_needed_driver_drive,
        };
        Some(self.weights.lonely_driver + drive)
    }

    /// Cost of adding `person` to the car whose occupants are `car`.
    ///
    /// Capacity is not checked here.
    pub fn join(&self, car: &[usize], person: usize) -> f64 {
        let joiner = &self.roster[person];

        let company = if car.len() == 1 {
            -self.weights.lonely_driver
        } else {
            0.0
        };

        let old_departure = car_departure(self.roster, car);
        let delay = match (old_departure, joiner.earliest_departure) {
            // Everyone already in the car waits for the newcomer
            (Some(old), Some(new)) if old < new => hours_between(old, new) * car.len() as f64,
            // Only the newcomer waits
            (Some(old), Some(new)) => hours_between(new, old),
            _ => 0.0,
        };

        let pairs: f64 = car
            .iter()
            .map(|&other| self.pair(joiner, &self.roster[other]))
            .sum();

        company + delay + pairs
    }

    /// Cost of two people sharing a car.
    pub fn pair(&self, a: &Person, b: &Person) -> f64 {
        let mut cost = 0.0;

        if let (Some(x), Some(y)) = (a.accommodation, b.accommodation) {
            if x != y && x != Accommodation::NoPreference && y != Accommodation::NoPreference {
                cost += self.weights.prefer_different_accommodation;
            }
        }

        if let (Some(x), Some(y)) = (a.gender, b.gender) {
            if x != y {
                cost += if a.prefers_same_gender || b.prefers_same_gender {
                    self.weights.different_gender_prefer_same_gender
                } else {
                    self.weights.different_gender_no_preference
                };
            }
        }

        cost
    }
}
