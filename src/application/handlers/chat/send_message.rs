//! Send-message handler - one full conversational turn.
//!
//! Extraction and the turn engine run first; when the engine opens
//! planning, the handler drives the day-by-day loop against the
//! catalog and the selection strategy, then renders the narrative.
//! Planning state is only written back to the conversation after every
//! day's selection has been computed.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, instrument};

use crate::domain::catalog::{CatalogFilters, ServiceRecord};
use crate::domain::conversation::{
    Conversation, ConversationPhase, EngineOutput, NextAction, TurnEngine, NUDGE_TEMPLATES,
};
use crate::domain::facts::{ExtractionOutcome, FactExtractor, FactName, StructuredInput};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::itinerary::{DayByDayPlanning, ItineraryAssembler, TripStructure};
use crate::domain::selection::{EditDirective, SelectionConstraints, SelectionRequest};
use crate::ports::{CatalogError, CatalogStore, SelectionError, ServiceSelector};

/// One user turn.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub message: String,
    /// Reference date for relative date phrases.
    pub today: NaiveDate,
}

/// The assistant's side of the turn.
#[derive(Debug, Clone)]
pub struct SendMessageResult {
    pub reply: String,
    pub phase: ConversationPhase,
    pub plan_invalidated: bool,
}

#[derive(Debug, Error)]
pub enum SendMessageError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("selection error: {0}")]
    Selection(#[from] SelectionError),
}

/// Handles chat turns end to end.
pub struct SendMessageHandler {
    catalog: Arc<dyn CatalogStore>,
    selector: Arc<dyn ServiceSelector>,
    extractor: FactExtractor,
    engine: TurnEngine,
    assembler: ItineraryAssembler,
}

impl SendMessageHandler {
    pub fn new(catalog: Arc<dyn CatalogStore>, selector: Arc<dyn ServiceSelector>) -> Self {
        Self {
            catalog,
            selector,
            extractor: FactExtractor::new(),
            engine: TurnEngine::new(),
            assembler: ItineraryAssembler::new(),
        }
    }

    /// The opening question every conversation starts with.
    pub fn opening_message() -> &'static str {
        "Let's plan this bachelor party. First things first - how wild are we talking? \
Chill weekend, medium, or completely off the rails?"
    }

    /// Processes a free-text user turn.
    #[instrument(skip(self, conversation, command), fields(conversation_id = %conversation.id()))]
    pub async fn handle(
        &self,
        conversation: &mut Conversation,
        command: SendMessageCommand,
    ) -> Result<SendMessageResult, SendMessageError> {
        conversation.record_user_message(&command.message);
        let outcome = self.extractor.extract_text(
            &command.message,
            conversation.expecting_first_wildness(),
            command.today,
        );
        self.run_turn(conversation, outcome).await
    }

    /// Processes a structured selector payload (buttons, pickers).
    pub async fn handle_structured(
        &self,
        conversation: &mut Conversation,
        input: StructuredInput,
    ) -> Result<SendMessageResult, SendMessageError> {
        let outcome = self.extractor.extract_structured(input);
        self.run_turn(conversation, outcome).await
    }

    /// Applies a swap edit against the finished plan by re-invoking the
    /// selection strategy with the current day as context, then
    /// re-renders the plan. Repeats are allowed freely in this flow.
    pub async fn handle_edit(
        &self,
        conversation: &mut Conversation,
        directive: EditDirective,
    ) -> Result<SendMessageResult, SendMessageError> {
        let Some(mut planning) = conversation.planning().cloned() else {
            return Err(DomainError::new(
                ErrorCode::PlanningNotStarted,
                "there is no plan to edit yet",
            )
            .into());
        };
        let Some(day) = planning.days().get(directive.day_index).cloned() else {
            return Err(DomainError::new(
                ErrorCode::DayIndexOutOfRange,
                format!("no planned day at index {}", directive.day_index),
            )
            .with_detail("day_index", directive.day_index.to_string())
            .into());
        };

        let candidates = self.candidate_services(conversation).await?;
        if !candidates.iter().any(|r| r.matches_name(&directive.swap_in)) {
            return Err(DomainError::new(
                ErrorCode::ServiceNotFound,
                format!("no service named '{}'", directive.swap_in),
            )
            .into());
        }

        let request = SelectionRequest {
            day: day.descriptor.clone(),
            facts: conversation.facts().clone(),
            candidates,
            constraints: SelectionConstraints {
                used_services: planning.used_services().to_vec(),
                allow_repeats: true,
                user_explicit_request: Some(directive.swap_in.clone()),
            },
        };
        let selection = self.selector.edit_day(&request, &day, &directive).await?;
        let plan = self.assembler.assemble_day(day.descriptor, selection);
        planning.replace_day(directive.day_index, plan);

        let narrative = self.assembler.render_narrative(&planning, conversation.facts());
        conversation.begin_planning(planning);

        let reply = format!("Done - swapped it out.\n\n{}", narrative);
        conversation.record_assistant_message(&reply);
        Ok(SendMessageResult {
            reply,
            phase: conversation.phase(),
            plan_invalidated: false,
        })
    }

    async fn run_turn(
        &self,
        conversation: &mut Conversation,
        outcome: ExtractionOutcome,
    ) -> Result<SendMessageResult, SendMessageError> {
        let EngineOutput {
            action,
            plan_invalidated,
        } = self.engine.process(conversation, &outcome)?;

        let reply = match action {
            NextAction::AskQuestion(name) => TurnEngine::question_text(name).to_string(),
            NextAction::AskClarification(topic) => clarification_text(topic).to_string(),
            NextAction::ResolveAmbiguity(names) => ambiguity_text(&names),
            NextAction::BeginPlanning => {
                let narrative = self.plan(conversation, &outcome).await?;
                if plan_invalidated {
                    format!("Got it - I've rebuilt the plan around that.\n\n{}", narrative)
                } else {
                    format!("Here's what I've put together.\n\n{}", narrative)
                }
            }
            NextAction::Nudge { template } => NUDGE_TEMPLATES[template].to_string(),
            NextAction::Acknowledge => "Noted. The plan stands - shout if anything should change."
                .to_string(),
        };

        conversation.record_assistant_message(&reply);
        Ok(SendMessageResult {
            reply,
            phase: conversation.phase(),
            plan_invalidated,
        })
    }

    /// Plans every remaining day, then moves to standby.
    async fn plan(
        &self,
        conversation: &mut Conversation,
        outcome: &ExtractionOutcome,
    ) -> Result<String, SendMessageError> {
        let facts = conversation.facts().clone();
        let start = facts.start_date().value().copied().ok_or_else(|| {
            DomainError::new(
                ErrorCode::PlanningNotStarted,
                "cannot plan without a start date",
            )
        })?;
        let end = facts.end_date().value().copied();
        let themes = facts.interested_activities().value().cloned().unwrap_or_default();

        let structure = TripStructure::detect(
            start,
            end,
            conversation.single_event_requested(),
            themes,
        );
        let mut planning = conversation
            .planning()
            .cloned()
            .unwrap_or_else(|| DayByDayPlanning::new(structure.clone()));

        let snapshot = self.candidate_services(conversation).await?;
        let candidates: Vec<ServiceRecord> = snapshot
            .into_iter()
            .filter(|r| facts.group_size().value().map_or(true, |g| r.fits_group(*g)))
            .collect();

        info!(
            shape = structure.describe(),
            days = structure.total_days(),
            candidates = candidates.len(),
            "planning itinerary"
        );

        while let Some(day) = planning.next_day() {
            let request = SelectionRequest {
                day: day.clone(),
                facts: facts.clone(),
                candidates: candidates.clone(),
                constraints: SelectionConstraints {
                    used_services: planning.used_services().to_vec(),
                    allow_repeats: outcome.repeat_request,
                    user_explicit_request: outcome.explicit_request.clone(),
                },
            };
            let selection = self.selector.select_day(&request).await?;
            let plan = self.assembler.assemble_day(day, selection);
            planning.record_day(plan);
        }

        let narrative = self.assembler.render_narrative(&planning, &facts);
        conversation.begin_planning(planning);
        conversation.advance_phase(ConversationPhase::Standby)?;
        Ok(narrative)
    }

    /// The catalog slice the whole plan draws from. Pinned on the
    /// conversation at planning start so a correction-triggered replan
    /// works against the same catalog version as the first build.
    async fn candidate_services(
        &self,
        conversation: &mut Conversation,
    ) -> Result<Vec<ServiceRecord>, SendMessageError> {
        if conversation.available_services().is_empty() {
            let mut filters = CatalogFilters::default();
            if let Some(city) = conversation.facts().destination().value() {
                filters.city = Some(city.clone());
            }
            let services = self.catalog.search(&filters).await?;
            conversation.snapshot_services(services);
        }
        Ok(conversation.available_services().to_vec())
    }
}

fn clarification_text(topic: &str) -> &'static str {
    match topic {
        "dates" => {
            "I couldn't pin the dates down - can you give them to me straight, \
like 'September 5-7' or 'the first weekend of October'?"
        }
        _ => "I caught a number in there but couldn't tell what it was for - \
group size, budget, or something else?",
    }
}

fn ambiguity_text(names: &[FactName]) -> String {
    let labels: Vec<&str> = names.iter().map(|n| fact_label(*n)).collect();
    format!(
        "Quick check before I change anything: did you mean to update the {}? \
Say 'actually' plus the new value and I'll lock it in.",
        labels.join(" and ")
    )
}

fn fact_label(name: FactName) -> &'static str {
    match name {
        FactName::Destination => "destination",
        FactName::GroupSize => "group size",
        FactName::StartDate => "start date",
        FactName::EndDate => "end date",
        FactName::WildnessLevel => "wildness level",
        FactName::Relationship => "relationship",
        FactName::InterestedActivities => "activities",
        FactName::AgeRange => "age range",
        FactName::Budget => "budget",
        FactName::BudgetType => "budget type",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockReasoningProvider;
    use crate::adapters::catalog::InMemoryCatalog;
    use crate::domain::catalog::ServiceCategory;
    use crate::domain::foundation::ServiceId;
    use crate::domain::selection::ReasoningSelector;

    fn record(name: &str, category: ServiceCategory, description: &str) -> ServiceRecord {
        ServiceRecord {
            id: ServiceId::new(format!("svc-{}", name.to_lowercase().replace(' ', "-"))).unwrap(),
            name: name.to_string(),
            alt_name: None,
            category,
            description: description.to_string(),
            price: 90.0,
            currency: "USD".to_string(),
            duration_minutes: None,
            city: "Austin".to_string(),
            min_group: None,
            max_group: None,
        }
    }

    fn austin_catalog() -> InMemoryCatalog {
        let mut services = vec![
            record("Smokehouse", ServiceCategory::Restaurant, "bbq and steak"),
            record("Taqueria", ServiceCategory::Restaurant, "late night tacos"),
            record("Diner", ServiceCategory::Restaurant, "breakfast classics"),
            record("Topgolf", ServiceCategory::Activity, "golf bays and beer"),
            record("Boat Day", ServiceCategory::Activity, "boat party on the lake"),
            record("Neon Club", ServiceCategory::Nightclub, "dancing until late"),
            record("Dive Bar", ServiceCategory::Bar, "cheap drinks"),
            record("Whiskey Library", ServiceCategory::Bar, "whiskey flights"),
        ];
        let mut palace = record("Palace", ServiceCategory::StripClub, "gentlemen's club");
        palace.price = 150.0;
        services.push(palace);
        InMemoryCatalog::new(services)
    }

    fn handler_on(
        provider: Arc<MockReasoningProvider>,
        catalog: Arc<InMemoryCatalog>,
    ) -> SendMessageHandler {
        let selector = Arc::new(ReasoningSelector::new(provider));
        SendMessageHandler::new(catalog, selector)
    }

    fn handler_with(provider: Arc<MockReasoningProvider>) -> SendMessageHandler {
        handler_on(provider, Arc::new(austin_catalog()))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 27).unwrap()
    }

    fn command(message: &str) -> SendMessageCommand {
        SendMessageCommand {
            message: message.to_string(),
            today: today(),
        }
    }

    async fn turn(
        handler: &SendMessageHandler,
        conversation: &mut Conversation,
        message: &str,
    ) -> SendMessageResult {
        handler.handle(conversation, command(message)).await.unwrap()
    }

    #[tokio::test]
    async fn gathers_facts_then_plans_a_weekend() {
        let provider = Arc::new(MockReasoningProvider::new());
        let handler = handler_with(provider);
        let mut conv = Conversation::new();

        // First turn answers the opening wildness question.
        let result = turn(&handler, &mut conv, "somewhere in the middle").await;
        assert_eq!(result.phase, ConversationPhase::Gathering);

        turn(&handler, &mut conv, "austin").await;
        turn(&handler, &mut conv, "8 people").await;
        let result = turn(&handler, &mut conv, "september 5-7, i'm ready to plan").await;

        assert_eq!(result.phase, ConversationPhase::Standby);
        assert!(result.reply.contains("Austin weekend"));
        assert!(result.reply.contains("Friday arrival"));
        assert!(result.reply.contains("Sunday departure"));
        assert_eq!(conv.planning().unwrap().days().len(), 3);
    }

    #[tokio::test]
    async fn services_are_not_repeated_across_days() {
        let provider = Arc::new(MockReasoningProvider::new());
        let handler = handler_with(provider);
        let mut conv = Conversation::new();

        turn(&handler, &mut conv, "medium").await;
        turn(&handler, &mut conv, "austin").await;
        turn(&handler, &mut conv, "8 people").await;
        let result = turn(&handler, &mut conv, "september 5-7, i'm ready to plan").await;
        assert_eq!(result.phase, ConversationPhase::Standby);

        // Friday and Saturday must not share a service while unused
        // options remain.
        let days = conv.planning().unwrap().days();
        let friday: Vec<_> = days[0].selections.iter().map(|s| &s.service_id).collect();
        let saturday: Vec<_> = days[1].selections.iter().map(|s| &s.service_id).collect();
        assert!(friday.iter().all(|id| !saturday.contains(id)));
        assert!(!friday.is_empty());
        assert!(!saturday.is_empty());
    }

    #[tokio::test]
    async fn model_selections_flow_into_the_plan() {
        let provider = Arc::new(MockReasoningProvider::new());
        // One response per day of the weekend.
        provider
            .queue_response(
                r#"{"selected_services": [{"name": "Smokehouse", "slot": "evening"}], "day_theme": "BBQ night"}"#,
            )
            .await;
        provider.queue_response("{}").await;
        provider.queue_response("{}").await;
        let handler = handler_with(provider);
        let mut conv = Conversation::new();

        turn(&handler, &mut conv, "medium").await;
        turn(&handler, &mut conv, "austin").await;
        turn(&handler, &mut conv, "8 people").await;
        let result = turn(&handler, &mut conv, "september 5-7, i'm ready to plan").await;

        assert!(result.reply.contains("BBQ night"));
        assert!(result.reply.contains("Smokehouse"));
    }

    #[tokio::test]
    async fn standby_correction_rebuilds_the_plan() {
        let provider = Arc::new(MockReasoningProvider::new());
        let handler = handler_with(provider);
        let mut conv = Conversation::new();

        turn(&handler, &mut conv, "medium").await;
        turn(&handler, &mut conv, "austin").await;
        turn(&handler, &mut conv, "8 people").await;
        turn(&handler, &mut conv, "september 5-7, i'm ready to plan").await;
        assert_eq!(conv.phase(), ConversationPhase::Standby);

        let result = turn(&handler, &mut conv, "actually there will be 12 of us").await;

        assert!(result.plan_invalidated);
        assert_eq!(result.phase, ConversationPhase::Standby);
        assert_eq!(conv.facts().group_size().value(), Some(&12));
        assert_eq!(conv.planning().unwrap().days().len(), 3);
    }

    #[tokio::test]
    async fn standby_small_talk_earns_a_nudge() {
        let provider = Arc::new(MockReasoningProvider::new());
        let handler = handler_with(provider);
        let mut conv = Conversation::new();

        turn(&handler, &mut conv, "medium").await;
        turn(&handler, &mut conv, "austin").await;
        turn(&handler, &mut conv, "8 people").await;
        turn(&handler, &mut conv, "september 5-7, i'm ready to plan").await;

        let result = turn(&handler, &mut conv, "sweet").await;
        assert!(NUDGE_TEMPLATES.contains(&result.reply.as_str()));
    }

    #[tokio::test]
    async fn edit_swaps_a_service_in_place() {
        let provider = Arc::new(MockReasoningProvider::new());
        provider
            .queue_response(
                r#"{"selected_services": [{"name": "Smokehouse", "slot": "evening"}]}"#,
            )
            .await;
        let handler = handler_with(provider);
        let mut conv = Conversation::new();

        turn(&handler, &mut conv, "medium").await;
        turn(&handler, &mut conv, "austin").await;
        turn(&handler, &mut conv, "8 people").await;
        turn(&handler, &mut conv, "september 5-7, i'm ready to plan").await;

        let result = handler
            .handle_edit(
                &mut conv,
                EditDirective {
                    day_index: 0,
                    swap_out: "Smokehouse".to_string(),
                    swap_in: "Taqueria".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(result.reply.contains("Taqueria"));
        assert_eq!(result.phase, ConversationPhase::Standby);
    }

    #[tokio::test]
    async fn edit_without_a_plan_is_rejected() {
        let provider = Arc::new(MockReasoningProvider::new());
        let handler = handler_with(provider);
        let mut conv = Conversation::new();

        let err = handler
            .handle_edit(
                &mut conv,
                EditDirective {
                    day_index: 0,
                    swap_out: "Smokehouse".to_string(),
                    swap_in: "Taqueria".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SendMessageError::Domain(ref e) if e.code == ErrorCode::PlanningNotStarted));
    }

    #[tokio::test]
    async fn date_shift_of_equal_length_relabels_the_plan() {
        let provider = Arc::new(MockReasoningProvider::new());
        let handler = handler_with(provider);
        let mut conv = Conversation::new();

        turn(&handler, &mut conv, "medium").await;
        turn(&handler, &mut conv, "austin").await;
        turn(&handler, &mut conv, "8 people").await;
        turn(&handler, &mut conv, "september 5-7, i'm ready to plan").await;
        let friday_pick = conv.planning().unwrap().days()[0].selections[0]
            .service_id
            .clone();

        let result = turn(&handler, &mut conv, "actually make that september 12-14").await;

        assert!(!result.plan_invalidated);
        assert_eq!(result.phase, ConversationPhase::Standby);
        let days = conv.planning().unwrap().days();
        assert_eq!(
            days[0].descriptor.date,
            NaiveDate::from_ymd_opt(2025, 9, 12).unwrap()
        );
        assert_eq!(days[0].selections[0].service_id, friday_pick);
    }

    #[tokio::test]
    async fn replans_reuse_the_catalog_snapshot() {
        let provider = Arc::new(MockReasoningProvider::new());
        let catalog = Arc::new(austin_catalog());
        let handler = handler_on(provider, Arc::clone(&catalog));
        let mut conv = Conversation::new();

        turn(&handler, &mut conv, "medium").await;
        turn(&handler, &mut conv, "austin").await;
        turn(&handler, &mut conv, "8 people").await;
        turn(&handler, &mut conv, "september 5-7, i'm ready to plan").await;

        // A listing added after planning started must not leak into the
        // rebuilt plan.
        let mut latecomer = record("Gold Grill", ServiceCategory::Restaurant, "tomahawk steaks");
        latecomer.price = 400.0;
        catalog.add(latecomer).await;

        let result = turn(&handler, &mut conv, "actually there will be 12 of us").await;

        assert!(result.plan_invalidated);
        let days = conv.planning().unwrap().days();
        assert!(days
            .iter()
            .flat_map(|d| &d.selections)
            .all(|s| s.name != "Gold Grill"));
    }

    #[tokio::test]
    async fn destination_correction_refreshes_the_catalog() {
        let provider = Arc::new(MockReasoningProvider::new());
        let catalog = Arc::new(austin_catalog());
        let mut nashville = record("Broadway Honky Tonk", ServiceCategory::Bar, "live country");
        nashville.city = "Nashville".to_string();
        catalog.add(nashville).await;
        let handler = handler_on(provider, Arc::clone(&catalog));
        let mut conv = Conversation::new();

        turn(&handler, &mut conv, "medium").await;
        turn(&handler, &mut conv, "austin").await;
        turn(&handler, &mut conv, "8 people").await;
        turn(&handler, &mut conv, "september 5-7, i'm ready to plan").await;

        let result = turn(&handler, &mut conv, "actually let's do nashville instead").await;

        assert!(result.plan_invalidated);
        let days = conv.planning().unwrap().days();
        assert!(days
            .iter()
            .flat_map(|d| &d.selections)
            .any(|s| s.name == "Broadway Honky Tonk"));
    }

    #[tokio::test]
    async fn explicit_ask_unlocks_the_strip_club() {
        let provider = Arc::new(MockReasoningProvider::new());
        let handler = handler_with(provider);
        let mut conv = Conversation::new();

        turn(&handler, &mut conv, "wild").await;
        turn(&handler, &mut conv, "austin").await;
        turn(&handler, &mut conv, "8 people").await;
        let result = turn(
            &handler,
            &mut conv,
            "september 5-7, a strip joint is mandatory, i'm ready to plan",
        )
        .await;

        assert_eq!(result.phase, ConversationPhase::Standby);
        let days = conv.planning().unwrap().days();
        assert!(days
            .iter()
            .flat_map(|d| &d.selections)
            .any(|s| s.name == "Palace"));
    }

    #[tokio::test]
    async fn single_event_skips_the_day_program() {
        let provider = Arc::new(MockReasoningProvider::new());
        let handler = handler_with(provider);
        let mut conv = Conversation::new();

        turn(&handler, &mut conv, "medium").await;
        turn(&handler, &mut conv, "austin").await;
        turn(&handler, &mut conv, "8 people").await;
        turn(&handler, &mut conv, "casino and whiskey sound right").await;
        let result = turn(
            &handler,
            &mut conv,
            "just the party on saturday september 6, i'm ready to plan",
        )
        .await;

        assert_eq!(result.phase, ConversationPhase::Standby);
        let planning = conv.planning().unwrap();
        assert_eq!(planning.structure().total_days(), 0);
        assert!(planning.days().is_empty());
        assert!(result.reply.contains("party plan"));
        assert!(result.reply.contains("Option: casino package"));
    }

    #[tokio::test]
    async fn edit_with_an_unknown_service_is_rejected() {
        let provider = Arc::new(MockReasoningProvider::new());
        let handler = handler_with(provider);
        let mut conv = Conversation::new();

        turn(&handler, &mut conv, "medium").await;
        turn(&handler, &mut conv, "austin").await;
        turn(&handler, &mut conv, "8 people").await;
        turn(&handler, &mut conv, "september 5-7, i'm ready to plan").await;

        let err = handler
            .handle_edit(
                &mut conv,
                EditDirective {
                    day_index: 0,
                    swap_out: "Smokehouse".to_string(),
                    swap_in: "Moonshine Shack".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SendMessageError::Domain(ref e) if e.code == ErrorCode::ServiceNotFound));
    }

    #[tokio::test]
    async fn structured_date_range_counts_as_confirmed() {
        let provider = Arc::new(MockReasoningProvider::new());
        let handler = handler_with(provider);
        let mut conv = Conversation::new();

        turn(&handler, &mut conv, "medium").await;
        let start = NaiveDate::from_ymd_opt(2025, 9, 5).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 9, 7).unwrap();
        let result = handler
            .handle_structured(
                &mut conv,
                StructuredInput::DateRange {
                    start,
                    end: Some(end),
                },
            )
            .await
            .unwrap();

        assert_eq!(conv.facts().start_date().value(), Some(&start));
        assert!(!result.reply.is_empty());
    }
}
