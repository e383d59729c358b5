//! Domain layer - pure business logic with no I/O.
//!
//! Organized leaf-first: `foundation` holds shared value objects,
//! `catalog` and `facts` are data models, `conversation` owns the per-turn
//! state machine, `itinerary` builds the day-by-day plan, and `selection`
//! owns the service-selection contract and fallback heuristic.

pub mod catalog;
pub mod conversation;
pub mod facts;
pub mod foundation;
pub mod itinerary;
pub mod selection;
