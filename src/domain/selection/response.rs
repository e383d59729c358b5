//! Repair and validation of model selection output.
//!
//! Models are asked for bare JSON but routinely wrap it in code fences
//! or prose. The repair pipeline strips fences, falls back to scanning
//! for a balanced object, and tolerates missing fields. Validation
//! then resolves every claimed service against the candidate slice -
//! anything the model invented is dropped.

use serde::Deserialize;

use crate::domain::catalog::ServiceRecord;
use crate::domain::itinerary::{DayDescriptor, TimeSlot};

use super::contract::{DaySelection, SelectedService};

/// Model output before validation. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDaySelection {
    #[serde(default)]
    pub selected_services: Vec<RawSelectedService>,
    #[serde(default)]
    pub alternative_options: Vec<String>,
    #[serde(default)]
    pub day_theme: Option<String>,
    #[serde(default)]
    pub logistics_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSelectedService {
    pub name: String,
    #[serde(default)]
    pub slot: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Parses a model response into a raw selection, repairing common
/// wrapping problems first.
pub fn parse_selection_response(text: &str) -> Result<RawDaySelection, serde_json::Error> {
    let candidate = extract_json(text);
    serde_json::from_str(candidate)
}

/// Pulls the JSON object out of a possibly-wrapped response.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    // Code fences first: ```json ... ``` or plain ``` ... ```.
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(end) = rest.find("```") {
            return rest[..end].trim();
        }
    }

    // Otherwise scan for the first balanced object.
    if let Some(start) = trimmed.find('{') {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (i, c) in trimmed[start..].char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' if in_string => escaped = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return &trimmed[start..start + i + 1];
                    }
                }
                _ => {}
            }
        }
    }

    trimmed
}

impl RawDaySelection {
    /// Validates the raw selection against the candidate slice and the
    /// day's slots.
    ///
    /// Services the model named but the catalog does not carry are
    /// dropped. Slots the model omitted or mangled are filled from the
    /// day's unassigned slots in order.
    pub fn resolve(self, candidates: &[ServiceRecord], day: &DayDescriptor) -> DaySelection {
        let mut taken: Vec<TimeSlot> = Vec::new();
        let mut selected = Vec::new();

        for raw in self.selected_services {
            let Some(record) = candidates.iter().find(|c| c.matches_name(&raw.name)) else {
                continue;
            };

            let slot = raw
                .slot
                .as_deref()
                .and_then(parse_slot)
                .filter(|s| day.slots.contains(s))
                .or_else(|| {
                    day.slots.iter().copied().find(|s| !taken.contains(s))
                });
            let Some(slot) = slot else { continue };

            taken.push(slot);
            selected.push(SelectedService {
                service_id: record.id.clone(),
                name: record.name.clone(),
                category: record.category,
                slot,
                reason: raw.reason,
            });
        }

        DaySelection {
            selected_services: selected,
            alternative_options: self.alternative_options,
            day_theme: self.day_theme,
            logistics_notes: self.logistics_notes,
        }
    }
}

fn parse_slot(s: &str) -> Option<TimeSlot> {
    match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
        "morning" => Some(TimeSlot::Morning),
        "afternoon" => Some(TimeSlot::Afternoon),
        "evening" => Some(TimeSlot::Evening),
        "night" => Some(TimeSlot::Night),
        "late_night" | "latenight" => Some(TimeSlot::LateNight),
        _ => None,
    }
}
