//! Service selection - the contract between planning and the selection
//! strategies, the model-output repair pipeline, and the heuristic
//! fallback.

mod contract;
mod fallback;
mod response;
mod strategy;

pub use contract::{
    DaySelection, EditDirective, SelectedService, SelectionConstraints, SelectionRequest,
};
pub use fallback::FallbackSelector;
pub use response::{parse_selection_response, RawDaySelection, RawSelectedService};
pub use strategy::ReasoningSelector;
