//! Route planning server.
//!
//! Takes an ordered itinerary of addresses and "find me a ... on the way"
//! requests, and returns it geocoded, routed and checked against each
//! stop's opening hours.

pub mod config;
pub mod domain;
pub mod planner;
pub mod providers;
pub mod web;
