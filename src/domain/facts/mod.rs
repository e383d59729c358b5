//! Trip facts - typed attributes elicited from the conversation.
//!
//! `fact` defines the generic value/status/confidence cell, `trip_facts`
//! the closed record of everything we track for a trip, `dates` the
//! date-phrase parser, and `extraction` the utterance-to-update policy.

mod dates;
mod extraction;
mod fact;
mod trip_facts;

pub use dates::{parse_date_phrase, DateInfo};
pub use extraction::{ExtractionOutcome, FactExtractor, StructuredInput};
pub use fact::{Confidence, Fact, FactPriority, FactProposal, FactStatus, MergeOutcome};
pub use trip_facts::{BudgetType, FactName, FactUpdate, FactValue, TripFacts, WildnessLevel};
