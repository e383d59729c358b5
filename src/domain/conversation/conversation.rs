//! Conversation entity.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::catalog::ServiceRecord;
use crate::domain::facts::{FactName, TripFacts};
use crate::domain::foundation::{ConversationId, DomainError, StateMachine, Timestamp, UserId};
use crate::domain::itinerary::DayByDayPlanning;

use super::message::Message;
use super::phase::ConversationPhase;

/// A planning conversation with one user.
///
/// Owns the transcript, the fact record, the phase, and - once
/// planning starts - the day-by-day planning state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    id: ConversationId,
    /// Absent for anonymous sessions.
    user_id: Option<UserId>,
    phase: ConversationPhase,
    facts: TripFacts,
    planning: Option<DayByDayPlanning>,
    /// Catalog snapshot taken when planning starts. Replans reuse it so
    /// the plan never mixes two versions of the catalog.
    #[serde(default)]
    available_services: Vec<ServiceRecord>,
    messages: Vec<Message>,
    /// Helpful facts the assistant has already asked about.
    asked_about: HashSet<FactName>,
    /// The very first user turn answers the opening wildness question.
    expecting_first_wildness: bool,
    /// The user asked for one party block instead of a trip.
    single_event_requested: bool,
    nudges_sent: u32,
    last_nudge_template: Option<usize>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Conversation {
    /// Starts a fresh anonymous conversation in the gathering phase.
    pub fn new() -> Self {
        let now = Timestamp::now();
        Self {
            id: ConversationId::new(),
            user_id: None,
            phase: ConversationPhase::Gathering,
            facts: TripFacts::new(),
            planning: None,
            available_services: Vec::new(),
            messages: Vec::new(),
            asked_about: HashSet::new(),
            expecting_first_wildness: true,
            single_event_requested: false,
            nudges_sent: 0,
            last_nudge_template: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Starts a fresh conversation tied to a known user.
    pub fn for_user(user_id: UserId) -> Self {
        let mut conversation = Self::new();
        conversation.user_id = Some(user_id);
        conversation
    }

    /// Rebuilds a conversation from persisted state.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ConversationId,
        user_id: Option<UserId>,
        phase: ConversationPhase,
        facts: TripFacts,
        planning: Option<DayByDayPlanning>,
        available_services: Vec<ServiceRecord>,
        messages: Vec<Message>,
        asked_about: HashSet<FactName>,
        expecting_first_wildness: bool,
        single_event_requested: bool,
        nudges_sent: u32,
        last_nudge_template: Option<usize>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            phase,
            facts,
            planning,
            available_services,
            messages,
            asked_about,
            expecting_first_wildness,
            single_event_requested,
            nudges_sent,
            last_nudge_template,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn phase(&self) -> ConversationPhase {
        self.phase
    }

    pub fn facts(&self) -> &TripFacts {
        &self.facts
    }

    pub fn facts_mut(&mut self) -> &mut TripFacts {
        self.touch();
        &mut self.facts
    }

    pub fn planning(&self) -> Option<&DayByDayPlanning> {
        self.planning.as_ref()
    }

    pub fn planning_mut(&mut self) -> Option<&mut DayByDayPlanning> {
        self.touch();
        self.planning.as_mut()
    }

    pub fn available_services(&self) -> &[ServiceRecord] {
        &self.available_services
    }

    /// Pins the catalog slice every plan and replan draws from.
    pub fn snapshot_services(&mut self, services: Vec<ServiceRecord>) {
        self.available_services = services;
        self.touch();
    }

    /// Drops the snapshot; the next plan re-queries the catalog. Needed
    /// when the destination changes and the snapshot is the wrong city.
    pub fn clear_service_snapshot(&mut self) {
        self.available_services.clear();
        self.touch();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn asked_about(&self) -> &HashSet<FactName> {
        &self.asked_about
    }

    pub fn expecting_first_wildness(&self) -> bool {
        self.expecting_first_wildness
    }

    pub fn single_event_requested(&self) -> bool {
        self.single_event_requested
    }

    /// Remembers a request to plan one party block instead of a trip.
    pub fn request_single_event(&mut self) {
        self.single_event_requested = true;
        self.touch();
    }

    pub fn nudges_sent(&self) -> u32 {
        self.nudges_sent
    }

    pub fn last_nudge_template(&self) -> Option<usize> {
        self.last_nudge_template
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Records a user message. The first user turn consumes the
    /// one-time wildness override.
    pub fn record_user_message(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
        self.touch();
    }

    pub fn record_assistant_message(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
        self.touch();
    }

    /// Clears the first-wildness override after it has been used once.
    pub fn consume_first_wildness(&mut self) {
        self.expecting_first_wildness = false;
        self.touch();
    }

    /// Remembers that a fact has been asked about, so the helpful-fact
    /// gate does not block on it forever.
    pub fn mark_asked(&mut self, name: FactName) {
        self.asked_about.insert(name);
        self.touch();
    }

    pub fn record_nudge(&mut self, template_index: usize) {
        self.nudges_sent += 1;
        self.last_nudge_template = Some(template_index);
        self.touch();
    }

    /// Moves the conversation into a new phase, enforcing the phase
    /// machine's transition rules.
    pub fn advance_phase(&mut self, target: ConversationPhase) -> Result<(), DomainError> {
        self.phase = self.phase.transition_to(target)?;
        self.touch();
        Ok(())
    }

    /// Installs planning state when planning begins.
    pub fn begin_planning(&mut self, planning: DayByDayPlanning) {
        self.planning = Some(planning);
        self.touch();
    }

    /// Drops the current plan after a structure-changing correction.
    pub fn invalidate_plan(&mut self) {
        self.planning = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
