//! Search states: partial assignments of people to cars.
//!
//! People are placed strictly in roster order. A node remembers the first
//! person not yet placed (its cursor); everyone before the cursor sits in a
//! car, and everyone after it is unplaced unless they already drive. This
//! makes a node's cars plus its cursor a canonical identity: two different
//! action sequences reaching the same cars compare, hash and order equal.

use std::fmt;

use crate::domain::{Arrangement, Roster};

use super::cost::CostModel;

/// One car: driver first, then passengers in the order they joined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Car(Vec<usize>);

impl Car {
    fn new(driver: usize) -> Self {
        Self(vec![driver])
    }

    /// Returns the roster index of the driver.
    pub fn driver(&self) -> usize {
        self.0[0]
    }

    /// Returns every occupant, driver first.
    pub fn occupants(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the driver's seats are all taken.
    pub fn is_full(&self, roster: &Roster) -> bool {
        self.0.len() >= roster[self.driver()].max_passengers as usize
    }

    fn with_passenger(&self, person: usize) -> Self {
        let mut occupants = Vec::with_capacity(self.0.len() + 1);
        occupants.extend_from_slice(&self.0);
        occupants.push(person);
        Self(occupants)
    }
}

/// The single action an edge applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Someone starts driving a car of their own.
    Drive { person: usize },

    /// The next unplaced person joins the car with this driver.
    Join { driver: usize, person: usize },
}

/// A candidate transition out of a node.
#[derive(Debug, Clone)]
pub struct Edge {
    pub action: Action,
    pub cost: f64,
    pub target: Node,
}

/// A partial (or complete) assignment of the roster to cars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node {
    /// Sorted by driver index.
    cars: Vec<Car>,
    first_unassigned: usize,
}

impl Node {
    /// The starting state: no cars, nobody placed.
    pub fn root() -> Self {
        Self {
            cars: Vec::new(),
            first_unassigned: 0,
        }
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Returns the number of people sitting in a car.
    pub fn assigned_count(&self) -> usize {
        self.cars.iter().map(Car::len).sum()
    }

    pub fn num_unassigned(&self, roster: &Roster) -> usize {
        roster.len() - self.assigned_count()
    }

    /// Returns true if everyone has been placed.
    pub fn is_done(&self, roster: &Roster) -> bool {
        self.first_unassigned == roster.len()
    }

    /// Returns the driver of every car, ascending.
    pub fn drivers(&self) -> impl Iterator<Item = usize> + '_ {
        self.cars.iter().map(Car::driver)
    }

    pub fn is_driver(&self, person: usize) -> bool {
        self.cars
            .binary_search_by_key(&person, Car::driver)
            .is_ok()
    }

    /// Returns true if every roster index sits in exactly one car.
    pub fn covers(&self, roster: &Roster) -> bool {
        let mut seen = vec![false; roster.len()];
        for &person in self.cars.iter().flat_map(Car::occupants) {
            match seen.get_mut(person) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        seen.into_iter().all(|s| s)
    }

    /// Generate every successor of this node.
    ///
    /// Promotions come first (in roster order), then joins (in car order).
    pub fn edges(&self, roster: &Roster, costs: &CostModel<'_>) -> Vec<Edge> {
        let next = self.first_unassigned;
        if next >= roster.len() {
            return Vec::new();
        }

        let mut edges = Vec::new();

        for person in next..roster.len() {
            if self.is_driver(person) {
                continue;
            }
            let Some(cost) = costs.promotion(person) else {
                continue;
            };
            edges.push(Edge {
                action: Action::Drive { person },
                cost,
                target: self.with_driver(person, roster),
            });
        }

        for (position, car) in self.cars.iter().enumerate() {
            if car.is_full(roster) {
                continue;
            }
            edges.push(Edge {
                action: Action::Join {
                    driver: car.driver(),
                    person: next,
                },
                cost: costs.join(car.occupants(), next),
                target: self.with_passenger(position, roster),
            });
        }

        edges
    }

    /// Materialize this node as a named arrangement.
    pub fn to_arrangement(&self, name: impl Into<String>, roster: &Roster) -> Arrangement {
        Arrangement::from_cars(name, roster, self.cars.iter().map(Car::occupants))
    }

    fn with_driver(&self, person: usize, roster: &Roster) -> Self {
        let mut cars = self.cars.clone();
        let position = cars.partition_point(|c| c.driver() < person);
        cars.insert(position, Car::new(person));

        Self {
            cars,
            first_unassigned: self.first_unassigned,
        }
        .advanced_from(self.first_unassigned, roster)
    }

    fn with_passenger(&self, position: usize, roster: &Roster) -> Self {
        let mut cars = self.cars.clone();
        cars[position] = cars[position].with_passenger(self.first_unassigned);

        Self {
            cars,
            first_unassigned: self.first_unassigned,
        }
        .advanced_from(self.first_unassigned + 1, roster)
    }

    /// Move the cursor to the first index at or after `from` that is not a driver.
    fn advanced_from(mut self, from: usize, roster: &Roster) -> Self {
        let mut cursor = from;
        while cursor < roster.len() && self.is_driver(cursor) {
            cursor += 1;
        }
        self.first_unassigned = cursor;
        self
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for car in &self.cars {
            write!(f, "[")?;
            for (i, person) in car.occupants().iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{person}")?;
            }
            write!(f, "] ")?;
        }
        write!(f, "@{}", self.first_unassigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CanDrive, Person};
    use crate::planner::config::CostEquivalents;

    fn roster() -> Roster {
        Roster::new(vec![
            Person::new("a", CanDrive::Yes).with_seats(2),
            Person::new("b", CanDrive::No),
            Person::new("c", CanDrive::YesIfNeeded).with_seats(3),
            Person::new("d", CanDrive::No),
        ])
        .unwrap()
    }

    fn targets(edges: &[Edge]) -> Vec<String> {
        edges.iter().map(|e| e.target.to_string()).collect()
    }

    fn apply(node: &Node, action: Action, roster: &Roster, weights: &CostEquivalents) -> Node {
        let model = CostModel::new(weights, roster);
        node.edges(roster, &model)
            .into_iter()
            .find(|e| e.action == action)
            .map(|e| e.target)
            .unwrap_or_else(|| panic!("{action:?} not offered from {node}"))
    }

    #[test]
    fn root_offers_every_driver() {
        let roster = roster();
        let weights = CostEquivalents::default();
        let model = CostModel::new(&weights, &roster);

        let edges = Node::root().edges(&roster, &model);

        assert_eq!(targets(&edges), vec!["[0] @1", "[2] @0"]);
        assert_eq!(edges[0].cost, 3.0);
        assert_eq!(edges[1].cost, 5.0);
    }

    #[test]
    fn promotion_keeps_driver_order_and_skips_drivers() {
        let roster = roster();
        let weights = CostEquivalents::default();

        let node = apply(&Node::root(), Action::Drive { person: 2 }, &roster, &weights);
        let node = apply(&node, Action::Drive { person: 0 }, &roster, &weights);

        assert_eq!(node.to_string(), "[0] [2] @1");
        assert_eq!(node.drivers().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(node.assigned_count(), 2);
        assert_eq!(node.num_unassigned(&roster), 2);
    }

    #[test]
    fn join_advances_past_drivers() {
        let roster = roster();
        let weights = CostEquivalents::default();

        let node = apply(&Node::root(), Action::Drive { person: 0 }, &roster, &weights);
        let node = apply(&node, Action::Drive { person: 2 }, &roster, &weights);
        let node = apply(&node, Action::Join { driver: 2, person: 1 }, &roster, &weights);

        // Person 2 drives, so the cursor jumps to 3
        assert_eq!(node.to_string(), "[0] [2 1] @3");
        assert!(!node.is_done(&roster));

        let node = apply(&node, Action::Join { driver: 0, person: 3 }, &roster, &weights);
        assert_eq!(node.to_string(), "[0 3] [2 1] @4");
        assert!(node.is_done(&roster));
        assert!(node.covers(&roster));
        assert!(node.edges(&roster, &CostModel::new(&weights, &roster)).is_empty());
    }

    #[test]
    fn full_car_offers_no_join() {
        let roster = roster();
        let weights = CostEquivalents::default();
        let model = CostModel::new(&weights, &roster);

        let node = apply(&Node::root(), Action::Drive { person: 0 }, &roster, &weights);
        let node = apply(&node, Action::Join { driver: 0, person: 1 }, &roster, &weights);
        assert_eq!(node.to_string(), "[0 1] @2");

        // Car 0 has two seats and is full; only promotions remain
        let edges = node.edges(&roster, &model);
        assert!(
            edges
                .iter()
                .all(|e| matches!(e.action, Action::Drive { .. }))
        );
        assert_eq!(targets(&edges), vec!["[0 1] [2] @3"]);
    }

    #[test]
    fn same_cars_in_any_order_are_one_node() {
        let roster = roster();
        let weights = CostEquivalents::default();

        let first = apply(&Node::root(), Action::Drive { person: 0 }, &roster, &weights);
        let first = apply(&first, Action::Drive { person: 2 }, &roster, &weights);

        let second = apply(&Node::root(), Action::Drive { person: 2 }, &roster, &weights);
        let second = apply(&second, Action::Drive { person: 0 }, &roster, &weights);

        assert_eq!(first, second);

        use std::collections::HashSet;
        let set: HashSet<Node> = [first, second].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn unplaceable_person_blocks_cursor() {
        let roster = Roster::new(vec![
            Person::new("a", CanDrive::No),
            Person::new("b", CanDrive::Yes).with_seats(1),
        ])
        .unwrap();
        let weights = CostEquivalents::default();

        let node = apply(&Node::root(), Action::Drive { person: 1 }, &roster, &weights);
        assert_eq!(node.to_string(), "[1] @0");

        // b's car has one seat; a cannot drive; nothing left to do
        let model = CostModel::new(&weights, &roster);
        assert!(node.edges(&roster, &model).is_empty());
        assert!(!node.is_done(&roster));
        assert_eq!(node.num_unassigned(&roster), 1);
    }

    #[test]
    fn covers_detects_missing_people() {
        let roster = roster();
        let weights = CostEquivalents::default();
        let node = apply(&Node::root(), Action::Drive { person: 0 }, &roster, &weights);
        assert!(!node.covers(&roster));
    }

    #[test]
    fn arrangement_lists_driver_first() {
        let roster = roster();
        let weights = CostEquivalents::default();

        let node = apply(&Node::root(), Action::Drive { person: 2 }, &roster, &weights);
        let node = apply(&node, Action::Join { driver: 2, person: 0 }, &roster, &weights);
        let arrangement = node.to_arrangement("Auto 1", &roster);

        let occupants: Vec<&str> = arrangement.carpools[0]
            .occupants
            .iter()
            .map(|p| p.as_str())
            .collect();
        assert_eq!(occupants, vec!["c", "a"]);
    }
}
