//! Automatic carpool planner.
//!
//! Splits a list of people travelling to an event into cars, trading off
//! waiting time, lonely drivers, reluctant drivers and who shares a car with
//! whom. Searches run in a background worker that reports progress to its
//! host and can be abandoned at any time.

pub mod domain;
pub mod planner;
pub mod web;
pub mod worker;
