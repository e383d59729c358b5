//! Itinerary construction - trip structure detection, per-day plans,
//! and assembly of selections into a finished itinerary.

mod assembler;
mod day_plan;
mod trip_structure;

pub use assembler::ItineraryAssembler;
pub use day_plan::{DayByDayPlanning, DayPlan, ServiceSelection};
pub use trip_structure::{DayDescriptor, TimeSlot, TripStructure};
