//! Stag Planner - Conversational Bachelor-Party Itinerary Planner
//!
//! This crate drives a multi-turn conversation that elicits trip facts from
//! a user, then synthesizes a day-by-day bachelor-party itinerary from a
//! catalog of bookable services.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
