//! Generic fact cell - value, status, confidence, provenance, priority.

use serde::{Deserialize, Serialize};

/// How strongly a fact value is established.
///
/// - `Unknown`: nothing captured yet (value is always `None`)
/// - `Suggested`: low-confidence guess from an utterance
/// - `Assumed`: reasonable inference, not explicitly confirmed
/// - `Set`: explicitly provided or confirmed by the user
/// - `Corrected`: user revised a previously captured value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FactStatus {
    #[default]
    Unknown,
    Suggested,
    Assumed,
    Set,
    Corrected,
}

impl FactStatus {
    /// Returns true once any value has been captured.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Returns true for user-confirmed statuses.
    ///
    /// Confirmed values are never silently replaced by lower-confidence
    /// guesses.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Set | Self::Corrected)
    }

    /// Returns true for statuses that satisfy an Essential fact
    /// for the purpose of phase advancement.
    pub fn satisfies_essential(&self) -> bool {
        matches!(self, Self::Set | Self::Assumed | Self::Corrected)
    }
}

/// How important a fact is to producing a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactPriority {
    /// Planning cannot start without it.
    Essential,
    /// Improves the plan; must be asked about at least once.
    Helpful,
    /// Nice to have.
    Optional,
}

/// Confidence in a fact value, clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Proposals at or above this confidence are treated as explicit
    /// user confirmation and stored as `Set`.
    pub const CONFIRMED_THRESHOLD: f64 = 0.95;

    /// Proposals at or above this confidence (but below confirmed)
    /// are stored as `Assumed`.
    pub const ASSUMED_THRESHOLD: f64 = 0.6;

    /// Creates a confidence value, clamping into [0, 1].
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Full confidence - explicit user confirmation.
    pub fn certain() -> Self {
        Self(1.0)
    }

    /// Returns the inner value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(0.0)
    }
}

/// A proposed new value for a fact, produced by extraction.
#[derive(Debug, Clone)]
pub struct FactProposal<T> {
    pub value: T,
    pub confidence: Confidence,
    pub provenance: Option<String>,
    /// True when the user is explicitly revising an earlier answer.
    pub correction: bool,
}

/// Result of merging a proposal into a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The proposal was applied.
    Applied,
    /// A lower-confidence proposal tried to overwrite a confirmed value.
    /// Never applied silently; the caller should ask the user.
    Ambiguous,
}

/// One tracked trip attribute.
///
/// Invariants:
/// - `status == Unknown` implies `value == None`
/// - `Set`/`Corrected` carry full confidence
/// - `Corrected` only ever follows a non-Unknown status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact<T> {
    value: Option<T>,
    status: FactStatus,
    confidence: Confidence,
    provenance: Option<String>,
    priority: FactPriority,
}

impl<T> Fact<T> {
    /// Creates an unknown fact with the given priority.
    pub fn unknown(priority: FactPriority) -> Self {
        Self {
            value: None,
            status: FactStatus::Unknown,
            confidence: Confidence::default(),
            provenance: None,
            priority,
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn status(&self) -> FactStatus {
        self.status
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn provenance(&self) -> Option<&str> {
        self.provenance.as_deref()
    }

    pub fn priority(&self) -> FactPriority {
        self.priority
    }

    pub fn is_known(&self) -> bool {
        self.status.is_known()
    }

    /// Merges a proposal into this fact.
    ///
    /// Overwrite rules:
    /// (a) current status Unknown/Suggested/Assumed: always apply;
    /// (b) confirmed value: apply only when the new confidence is at
    ///     least the stored confidence;
    /// (c) correction flow: always apply, status becomes `Corrected`
    ///     (or `Set` when nothing was captured before).
    pub fn apply(&mut self, proposal: FactProposal<T>) -> MergeOutcome {
        if proposal.correction {
            // Corrected may only follow a non-Unknown status.
            let status = if self.status.is_known() {
                FactStatus::Corrected
            } else {
                FactStatus::Set
            };
            self.store(proposal.value, status, Confidence::certain(), proposal.provenance);
            return MergeOutcome::Applied;
        }

        if self.status.is_confirmed() && proposal.confidence < self.confidence {
            return MergeOutcome::Ambiguous;
        }

        let status = if proposal.confidence.value() >= Confidence::CONFIRMED_THRESHOLD {
            FactStatus::Set
        } else if proposal.confidence.value() >= Confidence::ASSUMED_THRESHOLD {
            FactStatus::Assumed
        } else {
            FactStatus::Suggested
        };

        let confidence = if status == FactStatus::Set {
            Confidence::certain()
        } else {
            proposal.confidence
        };

        self.store(proposal.value, status, confidence, proposal.provenance);
        MergeOutcome::Applied
    }

    fn store(
        &mut self,
        value: T,
        status: FactStatus,
        confidence: Confidence,
        provenance: Option<String>,
    ) {
        self.value = Some(value);
        self.status = status;
        self.confidence = confidence;
        self.provenance = provenance;
    }
}
