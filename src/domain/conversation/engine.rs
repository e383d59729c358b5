//! Turn engine - applies extracted updates to the conversation and
//! decides what the assistant does next.

use crate::domain::facts::{ExtractionOutcome, FactName, FactPriority, MergeOutcome};
use crate::domain::foundation::DomainError;
use crate::domain::itinerary::TripStructure;

use super::conversation::Conversation;
use super::phase::ConversationPhase;

/// Standby check-in messages, rotated so repeated nudges don't repeat
/// themselves back to back.
pub const NUDGE_TEMPLATES: [&str; 3] = [
    "Still happy with the plan? I can swap anything out.",
    "Want me to tweak any day, or is the lineup locked in?",
    "The itinerary's holding steady. Say the word if something should change.",
];

/// What the assistant should do after a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    /// Ask the user about a specific fact.
    AskQuestion(FactName),
    /// Ask a clarifying question about a topic we failed to parse.
    AskClarification(&'static str),
    /// Confirm before overwriting confirmed facts.
    ResolveAmbiguity(Vec<FactName>),
    /// Start (or resume) building the itinerary.
    BeginPlanning,
    /// Send a standby check-in.
    Nudge { template: usize },
    /// Nothing to ask, nothing to plan - acknowledge and hold.
    Acknowledge,
}

/// Result of processing one turn.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub action: NextAction,
    /// True when a correction invalidated the existing plan.
    pub plan_invalidated: bool,
}

/// Facts whose correction always makes an existing plan wrong.
const HARD_STRUCTURE_FACTS: [FactName; 2] = [FactName::Destination, FactName::GroupSize];

/// Facts whose correction only matters when the day count moves; a
/// shifted span of the same length keeps the built days and relabels
/// their dates.
const DATE_FACTS: [FactName; 2] = [FactName::StartDate, FactName::EndDate];

/// Drives a conversation forward one turn at a time.
#[derive(Debug, Clone, Default)]
pub struct TurnEngine;

impl TurnEngine {
    pub fn new() -> Self {
        Self
    }

    /// Applies an extraction outcome and picks the next action.
    pub fn process(
        &self,
        conversation: &mut Conversation,
        outcome: &ExtractionOutcome,
    ) -> Result<EngineOutput, DomainError> {
        if conversation.expecting_first_wildness() {
            conversation.consume_first_wildness();
        }
        if outcome.single_event_signal {
            conversation.request_single_event();
        }

        let mut ambiguous = Vec::new();
        let mut hard_change = false;
        let mut destination_change = false;
        let mut date_change = false;
        for update in &outcome.updates {
            let name = update.name();
            let correction = update.correction;
            match conversation.facts_mut().apply(update.clone()) {
                MergeOutcome::Applied if correction => {
                    hard_change |= HARD_STRUCTURE_FACTS.contains(&name);
                    destination_change |= name == FactName::Destination;
                    date_change |= DATE_FACTS.contains(&name);
                }
                MergeOutcome::Applied => {}
                MergeOutcome::Ambiguous => ambiguous.push(name),
            }
        }

        let mut plan_invalidated = false;
        if conversation.planning().is_some() {
            let keep_plan = !hard_change && (!date_change || self.rebase_plan(conversation));
            if !keep_plan {
                if destination_change {
                    conversation.clear_service_snapshot();
                }
                conversation.invalidate_plan();
                if conversation.phase() == ConversationPhase::Standby {
                    conversation.advance_phase(ConversationPhase::Planning)?;
                }
                plan_invalidated = true;
            }
        }

        if !ambiguous.is_empty() {
            return Ok(EngineOutput {
                action: NextAction::ResolveAmbiguity(ambiguous),
                plan_invalidated,
            });
        }

        if let Some(topic) = outcome.needs_clarification {
            return Ok(EngineOutput {
                action: NextAction::AskClarification(topic),
                plan_invalidated,
            });
        }

        let action = match conversation.phase() {
            ConversationPhase::Gathering => self.gathering_action(conversation, outcome)?,
            ConversationPhase::Planning => NextAction::BeginPlanning,
            ConversationPhase::Standby => self.standby_action(conversation, outcome),
        };

        Ok(EngineOutput {
            action,
            plan_invalidated,
        })
    }

    /// Tries to carry the built plan across a date correction. Succeeds
    /// when the corrected dates produce the same day count; the days
    /// keep their selections and pick up the new dates and labels.
    fn rebase_plan(&self, conversation: &mut Conversation) -> bool {
        let facts = conversation.facts();
        let Some(start) = facts.start_date().value().copied() else {
            return false;
        };
        let end = facts.end_date().value().copied();
        let themes = facts
            .interested_activities()
            .value()
            .cloned()
            .unwrap_or_default();
        let structure =
            TripStructure::detect(start, end, conversation.single_event_requested(), themes);

        conversation
            .planning_mut()
            .map(|planning| planning.rebase(structure))
            .unwrap_or(false)
    }

    /// Gathering: ask for the next missing fact, or open planning once
    /// the gate passes.
    fn gathering_action(
        &self,
        conversation: &mut Conversation,
        outcome: &ExtractionOutcome,
    ) -> Result<NextAction, DomainError> {
        let facts = conversation.facts();
        let essentials_ok = facts.essentials_satisfied();

        let helpful_pending: Vec<FactName> = facts
            .helpful_names()
            .into_iter()
            .filter(|name| {
                !facts.status_of(*name).is_known() && !conversation.asked_about().contains(name)
            })
            .collect();

        // Readiness short-circuits the helpful round, never the essentials.
        if essentials_ok && (helpful_pending.is_empty() || outcome.readiness_signal) {
            conversation.advance_phase(ConversationPhase::Planning)?;
            return Ok(NextAction::BeginPlanning);
        }

        let next = FactName::ALL.into_iter().find(|name| {
            match conversation.facts().priority_of(*name) {
                FactPriority::Essential => !conversation
                    .facts()
                    .status_of(*name)
                    .satisfies_essential(),
                FactPriority::Helpful => helpful_pending.contains(name),
                FactPriority::Optional => false,
            }
        });

        match next {
            Some(name) => {
                conversation.mark_asked(name);
                Ok(NextAction::AskQuestion(name))
            }
            // Gate not formally passed but nothing left to ask.
            None => {
                conversation.advance_phase(ConversationPhase::Planning)?;
                Ok(NextAction::BeginPlanning)
            }
        }
    }

    /// Standby: edits arrive as fact corrections or explicit directives;
    /// an empty turn earns a rotated check-in nudge.
    fn standby_action(
        &self,
        conversation: &mut Conversation,
        outcome: &ExtractionOutcome,
    ) -> NextAction {
        if outcome.updates.is_empty() && !outcome.readiness_signal {
            let template = conversation
                .last_nudge_template()
                .map(|last| (last + 1) % NUDGE_TEMPLATES.len())
                .unwrap_or(0);
            conversation.record_nudge(template);
            return NextAction::Nudge { template };
        }
        NextAction::Acknowledge
    }

    /// Question wording for each fact.
    pub fn question_text(name: FactName) -> &'static str {
        match name {
            FactName::Destination => "Where's the party headed?",
            FactName::GroupSize => "How many people are coming?",
            FactName::StartDate => "What dates are you thinking?",
            FactName::EndDate => "When does everyone head home?",
            FactName::WildnessLevel => "How wild should this get - chill, medium, or all out?",
            FactName::InterestedActivities => "Anything the group definitely wants to do?",
            FactName::Budget => "What's the budget looking like?",
            FactName::BudgetType => "Is that budget total or per person?",
            FactName::Relationship => "How do you know the groom?",
            FactName::AgeRange => "Roughly what ages are we planning for?",
        }
    }
}
