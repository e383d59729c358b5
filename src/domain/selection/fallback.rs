//! Deterministic fallback selection.
//!
//! Used when the reasoning provider is unavailable or keeps returning
//! unparsable output. Scores candidates against the group's stated
//! interests and fills each slot from a fixed category map.

use crate::domain::catalog::{ServiceCategory, ServiceRecord};
use crate::domain::itinerary::{DayPlan, TimeSlot};
use crate::ports::SelectionError;

use super::contract::{DaySelection, EditDirective, SelectedService, SelectionRequest};

const USED_PENALTY: f64 = 100.0;

/// Heuristic day planner.
#[derive(Debug, Clone, Default)]
pub struct FallbackSelector;

impl FallbackSelector {
    pub fn new() -> Self {
        Self
    }

    /// Plans one day without calling a model.
    pub fn select_day(&self, request: &SelectionRequest) -> DaySelection {
        let keywords = interest_keywords(request);
        let strip_club_ok = explicitly_wants_strip_club(request);

        let mut chosen: Vec<SelectedService> = Vec::new();
        let mut alternatives: Vec<String> = Vec::new();

        for slot in &request.day.slots {
            let categories = categories_for_slot(*slot, strip_club_ok);
            let mut ranked: Vec<&ServiceRecord> = request
                .candidates
                .iter()
                .filter(|c| categories.contains(&c.category))
                .filter(|c| chosen.iter().all(|s| s.service_id != c.id))
                .collect();
            ranked.sort_by(|a, b| {
                score(b, &keywords, request)
                    .partial_cmp(&score(a, &keywords, request))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            if let Some(best) = ranked.first() {
                chosen.push(SelectedService {
                    service_id: best.id.clone(),
                    name: best.name.clone(),
                    category: best.category,
                    slot: *slot,
                    reason: None,
                });
            }
            if let Some(runner_up) = ranked.get(1) {
                if !alternatives.contains(&runner_up.name) {
                    alternatives.push(runner_up.name.clone());
                }
            }
        }

        alternatives.truncate(3);

        DaySelection {
            selected_services: chosen,
            alternative_options: alternatives,
            day_theme: None,
            logistics_notes: None,
        }
    }

    /// Deterministic substitution: swaps the outgoing service for the
    /// named incoming one and preserves its slot. The outgoing service
    /// is matched by its plan name or its catalog alternate name.
    pub fn edit_day(
        &self,
        request: &SelectionRequest,
        current: &DayPlan,
        directive: &EditDirective,
    ) -> Result<DaySelection, SelectionError> {
        let incoming = request
            .candidates
            .iter()
            .find(|r| r.matches_name(&directive.swap_in))
            .ok_or_else(|| {
                SelectionError::Failed(format!("no service named '{}'", directive.swap_in))
            })?;

        let outgoing_index = current
            .selections
            .iter()
            .position(|s| {
                s.name.eq_ignore_ascii_case(directive.swap_out.trim())
                    || request
                        .candidates
                        .iter()
                        .find(|r| r.id == s.service_id)
                        .is_some_and(|r| r.matches_name(&directive.swap_out))
            })
            .ok_or_else(|| {
                SelectionError::Failed(format!(
                    "'{}' is not on that day's plan",
                    directive.swap_out
                ))
            })?;

        let mut selections: Vec<SelectedService> = current
            .selections
            .iter()
            .map(|s| SelectedService {
                service_id: s.service_id.clone(),
                name: s.name.clone(),
                category: s.category,
                slot: s.slot,
                reason: s.reason.clone(),
            })
            .collect();
        selections[outgoing_index] = SelectedService {
            service_id: incoming.id.clone(),
            name: incoming.name.clone(),
            category: incoming.category,
            slot: selections[outgoing_index].slot,
            reason: None,
        };

        Ok(DaySelection {
            selected_services: selections,
            alternative_options: current.alternatives.clone(),
            day_theme: current.theme.clone(),
            logistics_notes: current.logistics_notes.clone(),
        })
    }
}

/// Score: interest matches dominate, price breaks ties upward,
/// already-used services sink to the bottom without being excluded.
fn score(record: &ServiceRecord, keywords: &[String], request: &SelectionRequest) -> f64 {
    let haystack = format!(
        "{} {}",
        record.name.to_lowercase(),
        record.description.to_lowercase()
    );
    let hits = keywords.iter().filter(|k| haystack.contains(k.as_str())).count();

    let mut score = 2.0 * hits as f64 + 0.01 * record.price;
    if !request.constraints.allow_repeats
        && request.constraints.used_services.contains(&record.id)
    {
        score -= USED_PENALTY;
    }
    score
}

fn interest_keywords(request: &SelectionRequest) -> Vec<String> {
    request
        .facts
        .interested_activities()
        .value()
        .map(|acts| acts.iter().map(|a| a.to_lowercase()).collect())
        .unwrap_or_default()
}

fn explicitly_wants_strip_club(request: &SelectionRequest) -> bool {
    let in_interests = request
        .facts
        .interested_activities()
        .value()
        .is_some_and(|acts| acts.iter().any(|a| a.to_lowercase().contains("strip")));
    let in_request = request
        .constraints
        .user_explicit_request
        .as_deref()
        .is_some_and(|r| r.to_lowercase().contains("strip"));
    in_interests || in_request
}

fn categories_for_slot(slot: TimeSlot, strip_club_ok: bool) -> Vec<ServiceCategory> {
    match slot {
        TimeSlot::Morning => vec![ServiceCategory::Restaurant],
        TimeSlot::Afternoon => vec![ServiceCategory::Activity],
        TimeSlot::Evening => vec![ServiceCategory::Restaurant],
        TimeSlot::Night => {
            if strip_club_ok {
                vec![
                    ServiceCategory::StripClub,
                    ServiceCategory::Nightclub,
                    ServiceCategory::Bar,
                ]
            } else {
                vec![ServiceCategory::Nightclub, ServiceCategory::Bar]
            }
        }
        TimeSlot::LateNight => vec![ServiceCategory::Bar, ServiceCategory::Nightclub],
    }
}
