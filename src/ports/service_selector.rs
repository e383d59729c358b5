//! Service selector port - turns a day's context into selections.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::itinerary::DayPlan;
use crate::domain::selection::{DaySelection, EditDirective, SelectionRequest};

/// Errors from a selection strategy.
///
/// Strategies are expected to degrade internally (heuristic fallback)
/// before surfacing an error, so these are rare.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("no services available for {city}")]
    EmptyCatalog { city: String },

    #[error("selection failed: {0}")]
    Failed(String),
}

/// Picks services for one day of the trip.
#[async_trait]
pub trait ServiceSelector: Send + Sync {
    async fn select_day(&self, request: &SelectionRequest) -> Result<DaySelection, SelectionError>;

    /// Applies a substitution to an already-planned day, with the
    /// current plan as context. Everything but the swapped service
    /// should survive the edit.
    async fn edit_day(
        &self,
        request: &SelectionRequest,
        current: &DayPlan,
        directive: &EditDirective,
    ) -> Result<DaySelection, SelectionError>;
}
