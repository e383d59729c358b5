//! Conversation phase state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{DomainError, ErrorCode, StateMachine};

/// Phase of the planning conversation.
///
/// `Gathering` elicits facts, `Planning` builds the itinerary day by
/// day, and `Standby` holds the finished plan while remaining open to
/// edits (which send the conversation back to `Planning`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    #[default]
    Gathering,
    Planning,
    Standby,
}

impl fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Gathering => "gathering",
            Self::Planning => "planning",
            Self::Standby => "standby",
        };
        write!(f, "{}", s)
    }
}

impl StateMachine for ConversationPhase {
    type Error = DomainError;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Self::Gathering => vec![Self::Planning],
            Self::Planning => vec![Self::Standby],
            // Edits and corrections reopen planning.
            Self::Standby => vec![Self::Planning],
        }
    }

    fn transition_to(&self, target: Self) -> Result<Self, Self::Error> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("cannot transition from {} to {}", self, target),
            )
            .with_detail("from", self.to_string())
            .with_detail("to", target.to_string()))
        }
    }

    fn is_terminal(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod transitions {
        use super::*;

        #[test]
        fn gathering_advances_to_planning() {
            let phase = ConversationPhase::Gathering;
            assert_eq!(
                phase.transition_to(ConversationPhase::Planning).unwrap(),
                ConversationPhase::Planning
            );
        }

        #[test]
        fn planning_completes_into_standby() {
            let phase = ConversationPhase::Planning;
            assert!(phase.can_transition_to(&ConversationPhase::Standby));
        }

        #[test]
        fn standby_reopens_into_planning() {
            let phase = ConversationPhase::Standby;
            assert!(phase.can_transition_to(&ConversationPhase::Planning));
        }

        #[test]
        fn gathering_cannot_skip_to_standby() {
            let phase = ConversationPhase::Gathering;
            let err = phase.transition_to(ConversationPhase::Standby).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        }

        #[test]
        fn no_phase_is_terminal() {
            for phase in [
                ConversationPhase::Gathering,
                ConversationPhase::Planning,
                ConversationPhase::Standby,
            ] {
                assert!(!phase.is_terminal());
            }
        }
    }
}
