//! The closed trip-facts record.
//!
//! One field per known fact name rather than an open map, so adding a fact
//! forces every match in this file to be revisited at compile time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fact::{Confidence, Fact, FactPriority, FactProposal, FactStatus, MergeOutcome};

/// How rowdy the trip should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildnessLevel {
    Mild,
    Medium,
    Wild,
}

/// Whether the budget covers the whole group or each person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetType {
    Total,
    PerPerson,
}

/// Names of the tracked facts, used for questions and asked-about tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactName {
    Destination,
    GroupSize,
    StartDate,
    EndDate,
    WildnessLevel,
    Relationship,
    InterestedActivities,
    AgeRange,
    Budget,
    BudgetType,
}

impl FactName {
    /// Every fact name, in question-asking order.
    pub const ALL: [FactName; 10] = [
        FactName::Destination,
        FactName::GroupSize,
        FactName::StartDate,
        FactName::EndDate,
        FactName::WildnessLevel,
        FactName::InterestedActivities,
        FactName::Budget,
        FactName::BudgetType,
        FactName::Relationship,
        FactName::AgeRange,
    ];
}

/// A typed value for exactly one fact.
#[derive(Debug, Clone, PartialEq)]
pub enum FactValue {
    Destination(String),
    GroupSize(u32),
    StartDate(NaiveDate),
    EndDate(NaiveDate),
    Wildness(WildnessLevel),
    Relationship(String),
    Activities(Vec<String>),
    AgeRange(String),
    Budget(u32),
    BudgetType(BudgetType),
}

impl FactValue {
    /// Returns which fact this value belongs to.
    pub fn name(&self) -> FactName {
        match self {
            FactValue::Destination(_) => FactName::Destination,
            FactValue::GroupSize(_) => FactName::GroupSize,
            FactValue::StartDate(_) => FactName::StartDate,
            FactValue::EndDate(_) => FactName::EndDate,
            FactValue::Wildness(_) => FactName::WildnessLevel,
            FactValue::Relationship(_) => FactName::Relationship,
            FactValue::Activities(_) => FactName::InterestedActivities,
            FactValue::AgeRange(_) => FactName::AgeRange,
            FactValue::Budget(_) => FactName::Budget,
            FactValue::BudgetType(_) => FactName::BudgetType,
        }
    }
}

/// A proposed fact update produced by extraction.
#[derive(Debug, Clone)]
pub struct FactUpdate {
    pub value: FactValue,
    pub confidence: Confidence,
    pub provenance: Option<String>,
    pub correction: bool,
}

impl FactUpdate {
    /// Creates an update at full confidence (structured input, selectors).
    pub fn confirmed(value: FactValue, provenance: impl Into<String>) -> Self {
        Self {
            value,
            confidence: Confidence::certain(),
            provenance: Some(provenance.into()),
            correction: false,
        }
    }

    /// Creates an update from free-text extraction.
    pub fn extracted(value: FactValue, confidence: f64, provenance: impl Into<String>) -> Self {
        Self {
            value,
            confidence: Confidence::new(confidence),
            provenance: Some(provenance.into()),
            correction: false,
        }
    }

    /// Marks the update as an explicit correction.
    pub fn as_correction(mut self) -> Self {
        self.correction = true;
        self
    }

    pub fn name(&self) -> FactName {
        self.value.name()
    }
}

/// Everything we track about the requested trip.
///
/// Complete from creation: every key exists, most start `Unknown`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripFacts {
    destination: Fact<String>,
    group_size: Fact<u32>,
    start_date: Fact<NaiveDate>,
    end_date: Fact<NaiveDate>,
    wildness_level: Fact<WildnessLevel>,
    relationship: Fact<String>,
    interested_activities: Fact<Vec<String>>,
    age_range: Fact<String>,
    budget: Fact<u32>,
    budget_type: Fact<BudgetType>,
}

impl TripFacts {
    /// Creates the record with fixed priorities.
    pub fn new() -> Self {
        Self {
            destination: Fact::unknown(FactPriority::Essential),
            group_size: Fact::unknown(FactPriority::Essential),
            start_date: Fact::unknown(FactPriority::Essential),
            end_date: Fact::unknown(FactPriority::Helpful),
            wildness_level: Fact::unknown(FactPriority::Helpful),
            relationship: Fact::unknown(FactPriority::Optional),
            interested_activities: Fact::unknown(FactPriority::Helpful),
            age_range: Fact::unknown(FactPriority::Optional),
            budget: Fact::unknown(FactPriority::Helpful),
            budget_type: Fact::unknown(FactPriority::Optional),
        }
    }

    // === Typed accessors ===

    pub fn destination(&self) -> &Fact<String> {
        &self.destination
    }

    pub fn group_size(&self) -> &Fact<u32> {
        &self.group_size
    }

    pub fn start_date(&self) -> &Fact<NaiveDate> {
        &self.start_date
    }

    pub fn end_date(&self) -> &Fact<NaiveDate> {
        &self.end_date
    }

    pub fn wildness_level(&self) -> &Fact<WildnessLevel> {
        &self.wildness_level
    }

    pub fn relationship(&self) -> &Fact<String> {
        &self.relationship
    }

    pub fn interested_activities(&self) -> &Fact<Vec<String>> {
        &self.interested_activities
    }

    pub fn age_range(&self) -> &Fact<String> {
        &self.age_range
    }

    pub fn budget(&self) -> &Fact<u32> {
        &self.budget
    }

    pub fn budget_type(&self) -> &Fact<BudgetType> {
        &self.budget_type
    }

    // === Keyed queries ===

    /// Returns the status of the named fact.
    pub fn status_of(&self, name: FactName) -> FactStatus {
        match name {
            FactName::Destination => self.destination.status(),
            FactName::GroupSize => self.group_size.status(),
            FactName::StartDate => self.start_date.status(),
            FactName::EndDate => self.end_date.status(),
            FactName::WildnessLevel => self.wildness_level.status(),
            FactName::Relationship => self.relationship.status(),
            FactName::InterestedActivities => self.interested_activities.status(),
            FactName::AgeRange => self.age_range.status(),
            FactName::Budget => self.budget.status(),
            FactName::BudgetType => self.budget_type.status(),
        }
    }

    /// Returns the priority of the named fact.
    pub fn priority_of(&self, name: FactName) -> FactPriority {
        match name {
            FactName::Destination => self.destination.priority(),
            FactName::GroupSize => self.group_size.priority(),
            FactName::StartDate => self.start_date.priority(),
            FactName::EndDate => self.end_date.priority(),
            FactName::WildnessLevel => self.wildness_level.priority(),
            FactName::Relationship => self.relationship.priority(),
            FactName::InterestedActivities => self.interested_activities.priority(),
            FactName::AgeRange => self.age_range.priority(),
            FactName::Budget => self.budget.priority(),
            FactName::BudgetType => self.budget_type.priority(),
        }
    }

    /// Returns true once every Essential fact is Set, Assumed, or Corrected.
    pub fn essentials_satisfied(&self) -> bool {
        self.unknown_essentials().is_empty()
    }

    /// Essential facts that do not yet satisfy the planning gate.
    pub fn unknown_essentials(&self) -> Vec<FactName> {
        FactName::ALL
            .into_iter()
            .filter(|name| {
                self.priority_of(*name) == FactPriority::Essential
                    && !self.status_of(*name).satisfies_essential()
            })
            .collect()
    }

    /// All Helpful fact names.
    pub fn helpful_names(&self) -> Vec<FactName> {
        FactName::ALL
            .into_iter()
            .filter(|name| self.priority_of(*name) == FactPriority::Helpful)
            .collect()
    }

    /// Applies one proposed update under the merge policy.
    pub fn apply(&mut self, update: FactUpdate) -> MergeOutcome {
        let FactUpdate {
            value,
            confidence,
            provenance,
            correction,
        } = update;

        fn proposal<T>(
            value: T,
            confidence: Confidence,
            provenance: Option<String>,
            correction: bool,
        ) -> FactProposal<T> {
            FactProposal {
                value,
                confidence,
                provenance,
                correction,
            }
        }

        match value {
            FactValue::Destination(v) => self
                .destination
                .apply(proposal(v, confidence, provenance, correction)),
            FactValue::GroupSize(v) => self
                .group_size
                .apply(proposal(v, confidence, provenance, correction)),
            FactValue::StartDate(v) => self
                .start_date
                .apply(proposal(v, confidence, provenance, correction)),
            FactValue::EndDate(v) => self
                .end_date
                .apply(proposal(v, confidence, provenance, correction)),
            FactValue::Wildness(v) => self
                .wildness_level
                .apply(proposal(v, confidence, provenance, correction)),
            FactValue::Relationship(v) => self
                .relationship
                .apply(proposal(v, confidence, provenance, correction)),
            FactValue::Activities(v) => self
                .interested_activities
                .apply(proposal(v, confidence, provenance, correction)),
            FactValue::AgeRange(v) => self
                .age_range
                .apply(proposal(v, confidence, provenance, correction)),
            FactValue::Budget(v) => self
                .budget
                .apply(proposal(v, confidence, provenance, correction)),
            FactValue::BudgetType(v) => self
                .budget_type
                .apply(proposal(v, confidence, provenance, correction)),
        }
    }
}

impl Default for TripFacts {
    fn default() -> Self {
        Self::new()
    }
}
