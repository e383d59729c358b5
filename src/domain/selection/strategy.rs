//! Reasoning-backed selection strategy.
//!
//! Builds a selection prompt from the day context, asks the reasoning
//! provider for JSON, repairs and validates the answer, and degrades to
//! the heuristic fallback when the provider fails or keeps returning
//! garbage. The strategy itself never errors on provider trouble.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::ports::{
    ReasoningMessage, ReasoningProvider, ReasoningRequest, SelectionError, ServiceSelector,
};

use crate::domain::itinerary::DayPlan;

use super::contract::{DaySelection, EditDirective, SelectionRequest};
use super::fallback::FallbackSelector;
use super::response::parse_selection_response;

const SYSTEM_PROMPT: &str = "You are a bachelor party planner. Pick services for one day of the \
trip from the provided candidates only. Respond with a single JSON object: \
{\"selected_services\": [{\"name\", \"slot\", \"reason\"}], \"alternative_options\": [], \
\"day_theme\": null, \"logistics_notes\": null}. Use only candidate names. Slots: morning, \
afternoon, evening, night, late_night.";

const RETRY_REMINDER: &str =
    "That was not valid JSON. Respond again with only the JSON object, no prose, no code fences.";

const EDIT_SYSTEM_PROMPT: &str = "You are a bachelor party planner revising one day of an \
existing plan. Apply the requested substitution and respond with the full updated day as a \
single JSON object: {\"selected_services\": [{\"name\", \"slot\", \"reason\"}], \
\"alternative_options\": [], \"day_theme\": null, \"logistics_notes\": null}. Keep every other \
selection and its slot unchanged. Use only candidate names.";

/// Selects services by asking a reasoning model, with heuristic fallback.
pub struct ReasoningSelector {
    provider: Arc<dyn ReasoningProvider>,
    fallback: FallbackSelector,
}

impl ReasoningSelector {
    pub fn new(provider: Arc<dyn ReasoningProvider>) -> Self {
        Self {
            provider,
            fallback: FallbackSelector::new(),
        }
    }

    fn build_prompt(&self, request: &SelectionRequest) -> Vec<ReasoningMessage> {
        let facts = &request.facts;
        let context = json!({
            "day": {
                "date": request.day.date.to_string(),
                "label": request.day.label,
                "slots": request.day.slots.iter().map(|s| s.label()).collect::<Vec<_>>(),
            },
            "group": {
                "destination": facts.destination().value(),
                "size": facts.group_size().value(),
                "wildness": facts.wildness_level().value(),
                "interests": facts.interested_activities().value(),
                "budget": facts.budget().value(),
                "budget_type": facts.budget_type().value(),
                "relationship": facts.relationship().value(),
                "age_range": facts.age_range().value(),
            },
            "candidates": request.candidates.iter().map(|c| json!({
                "name": c.name,
                "category": c.category.label(),
                "description": c.description,
                "price": c.price,
                "currency": c.currency,
            })).collect::<Vec<_>>(),
            "already_used_elsewhere": request.constraints.used_services,
            "repeats_allowed": request.constraints.allow_repeats,
            "explicit_user_request": request.constraints.user_explicit_request,
        });

        vec![
            ReasoningMessage::system(SYSTEM_PROMPT),
            ReasoningMessage::user(context.to_string()),
        ]
    }

    fn build_edit_prompt(
        &self,
        request: &SelectionRequest,
        current: &DayPlan,
        directive: &EditDirective,
    ) -> Vec<ReasoningMessage> {
        let context = json!({
            "day": {
                "date": request.day.date.to_string(),
                "label": request.day.label,
            },
            "current_plan": current.selections.iter().map(|s| json!({
                "name": s.name,
                "slot": s.slot.label(),
                "category": s.category.label(),
            })).collect::<Vec<_>>(),
            "substitution": {
                "swap_out": directive.swap_out,
                "swap_in": directive.swap_in,
            },
            "candidates": request.candidates.iter().map(|c| json!({
                "name": c.name,
                "category": c.category.label(),
                "description": c.description,
                "price": c.price,
                "currency": c.currency,
            })).collect::<Vec<_>>(),
        });

        vec![
            ReasoningMessage::system(EDIT_SYSTEM_PROMPT),
            ReasoningMessage::user(context.to_string()),
        ]
    }

    async fn ask(&self, messages: Vec<ReasoningMessage>) -> Option<String> {
        match self.provider.complete(ReasoningRequest::new(messages)).await {
            Ok(response) => Some(response.content),
            Err(err) => {
                warn!(provider = self.provider.name(), error = %err, "reasoning provider failed");
                None
            }
        }
    }
}

#[async_trait]
impl ServiceSelector for ReasoningSelector {
    async fn select_day(&self, request: &SelectionRequest) -> Result<DaySelection, SelectionError> {
        let mut messages = self.build_prompt(request);

        let Some(first) = self.ask(messages.clone()).await else {
            return Ok(self.fallback.select_day(request));
        };

        let raw = match parse_selection_response(&first) {
            Ok(raw) => Some(raw),
            Err(err) => {
                debug!(error = %err, "selection response unparsable, retrying once");
                messages.push(ReasoningMessage::assistant(first));
                messages.push(ReasoningMessage::user(RETRY_REMINDER));
                match self.ask(messages).await {
                    Some(second) => parse_selection_response(&second).ok(),
                    None => None,
                }
            }
        };

        let Some(raw) = raw else {
            return Ok(self.fallback.select_day(request));
        };

        let selection = raw.resolve(&request.candidates, &request.day);

        // A model that named nothing the catalog carries is as good as
        // no model at all.
        if selection.selected_services.is_empty()
            && !request.candidates.is_empty()
            && !request.day.slots.is_empty()
        {
            return Ok(self.fallback.select_day(request));
        }

        Ok(selection)
    }

    async fn edit_day(
        &self,
        request: &SelectionRequest,
        current: &DayPlan,
        directive: &EditDirective,
    ) -> Result<DaySelection, SelectionError> {
        let messages = self.build_edit_prompt(request, current, directive);

        let raw = match self.ask(messages).await {
            Some(reply) => parse_selection_response(&reply).ok(),
            None => None,
        };

        if let Some(raw) = raw {
            let selection = raw.resolve(&request.candidates, &request.day);
            let includes_incoming = request
                .candidates
                .iter()
                .find(|r| r.matches_name(&directive.swap_in))
                .map(|r| {
                    selection
                        .selected_services
                        .iter()
                        .any(|s| s.service_id == r.id)
                })
                .unwrap_or(false);
            if includes_incoming {
                return Ok(selection);
            }
            debug!("edit response did not apply the substitution, swapping deterministically");
        }

        self.fallback.edit_day(request, current, directive)
    }
}
