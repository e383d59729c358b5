//! Selection request/response contract.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{ServiceCategory, ServiceRecord};
use crate::domain::facts::TripFacts;
use crate::domain::foundation::ServiceId;
use crate::domain::itinerary::{DayDescriptor, TimeSlot};

/// Constraints on what a strategy may pick.
#[derive(Debug, Clone, Default)]
pub struct SelectionConstraints {
    /// Services already used on other days. Discouraged, not banned:
    /// a strategy may still pick one when nothing else fits.
    pub used_services: Vec<ServiceId>,
    /// The user explicitly asked to repeat a venue.
    pub allow_repeats: bool,
    /// Verbatim user request to honor ("they really want the steakhouse").
    pub user_explicit_request: Option<String>,
}

/// Everything a strategy needs to plan one day.
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub day: DayDescriptor,
    pub facts: TripFacts,
    pub candidates: Vec<ServiceRecord>,
    pub constraints: SelectionConstraints,
}

/// One service a strategy picked, resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedService {
    pub service_id: ServiceId,
    pub name: String,
    pub category: ServiceCategory,
    pub slot: TimeSlot,
    pub reason: Option<String>,
}

/// A strategy's answer for one day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaySelection {
    pub selected_services: Vec<SelectedService>,
    /// Names of backup options worth mentioning.
    pub alternative_options: Vec<String>,
    pub day_theme: Option<String>,
    pub logistics_notes: Option<String>,
}

/// A user edit against a finished plan: swap one service on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDirective {
    /// Zero-based index into the planned days.
    pub day_index: usize,
    /// Name of the service to remove (primary or alternate name).
    pub swap_out: String,
    /// Name of the service to add.
    pub swap_in: String,
}
