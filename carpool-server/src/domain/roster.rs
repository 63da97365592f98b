//! Validated list of people to be placed in cars.

use std::collections::HashSet;
use std::ops::Index;

use super::{DomainError, Person};

/// The people a search partitions into cars.
///
/// Independent travellers are dropped on construction. Order is preserved
/// and significant: the planner refers to people by their position here.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    people: Vec<Person>,
}

impl Roster {
    /// Build a roster, dropping independent travellers and validating the rest.
    pub fn new(people: Vec<Person>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();

        for (position, person) in people.iter().enumerate() {
            if person.id.is_empty() {
                return Err(DomainError::EmptyPersonId(position));
            }
            if !seen.insert(&person.id) {
                return Err(DomainError::DuplicatePersonId(person.id.clone()));
            }
        }

        let people: Vec<Person> = people
            .into_iter()
            .filter(|p| !p.travels_independently)
            .collect();

        if let Some(person) = people
            .iter()
            .find(|p| p.may_drive() && p.max_passengers == 0)
        {
            return Err(DomainError::InvalidCapacity(person.id.clone()));
        }

        Ok(Self { people })
    }

    /// Returns the number of people to place.
    pub fn len(&self) -> usize {
        self.people.len()
    }

    /// Returns true if nobody needs a car.
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }
}

impl Index<usize> for Roster {
    type Output = Person;

    fn index(&self, index: usize) -> &Self::Output {
        &self.people[index]
    }
}
