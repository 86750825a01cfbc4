use thiserror::Error;
use crate::action::ActionKind;
use crate::turn::Phase;
use crate::Character;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoupError {
    #[error("{0} is eliminated and cannot act")]
    InvalidPlayerState(String),
    #[error("{0:?} is not a legal action right now")]
    IllegalActionChoice(ActionKind),
    #[error("{0:?} is not a legal target")]
    IllegalTargetChoice(Option<usize>),
    #[error("card index {0} is out of range")]
    IllegalCardIndex(usize),
    #[error("exchange selection {0:?} is invalid")]
    IllegalExchangeSelection(Vec<usize>),
    #[error("{0} cannot counter this action")]
    IllegalCounterRole(Character),
    #[error("decision was not returned before the deadline")]
    DecisionTimeout,
    #[error("the decider panicked")]
    DeciderPanicked,
    #[error("deck underflow: requested {requested}, {remaining} remaining")]
    DeckUnderflow { requested: usize, remaining: usize },
    #[error("turn cannot move from {from:?} to {to:?}")]
    IllegalTransition { from: Phase, to: Phase },
    #[error("could not start the decision runtime: {0}")]
    Runtime(String),
    #[error("the game is already over")]
    GameOver,
    #[error("a game needs at least 2 players, got {0}")]
    NotEnoughPlayers(usize),
    #[error("a game supports at most 6 players, got {0}")]
    TooManyPlayers(usize),
}

impl CoupError {
    /// Bad answers from a decider are recovered inside the turn engine.
    /// Everything else is an engine or controller bug and ends the game.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoupError::IllegalActionChoice(_)
                | CoupError::IllegalTargetChoice(_)
                | CoupError::IllegalCardIndex(_)
                | CoupError::IllegalExchangeSelection(_)
                | CoupError::IllegalCounterRole(_)
                | CoupError::DecisionTimeout
                | CoupError::DeciderPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::action::ActionKind;
    use crate::turn::Phase;
    use crate::{CoupError, Character};

    #[test]
    fn classification() {
        assert!(CoupError::IllegalActionChoice(ActionKind::Coup).is_recoverable());
        assert!(CoupError::IllegalCounterRole(Character::Duke).is_recoverable());
        assert!(CoupError::DecisionTimeout.is_recoverable());
        assert!(CoupError::DeciderPanicked.is_recoverable());
        assert!(!CoupError::Runtime("no threads".into()).is_recoverable());
        assert!(!CoupError::InvalidPlayerState("P1".into()).is_recoverable());
        assert!(!CoupError::DeckUnderflow { requested: 2, remaining: 1 }.is_recoverable());
        assert!(!CoupError::GameOver.is_recoverable());
        assert!(!CoupError::IllegalTransition { from: Phase::Done, to: Phase::AwaitingAction }.is_recoverable());
    }

    #[test]
    fn messages() {
        let err = CoupError::DeckUnderflow { requested: 2, remaining: 1 };
        assert_eq!(err.to_string(), "deck underflow: requested 2, 1 remaining");
    }
}
