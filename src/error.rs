//! Recoverable rejection taxonomy.
//!
//! Every variant here means "that input was invalid, nothing changed, try
//! again". There is no fatal error class inside the engine: catastrophic
//! failures (lost writes, network trouble) belong to the sync collaborator.

use thiserror::Error;

use crate::cards::CardId;

/// Why an input was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("the game is already over")]
    GameOver,

    #[error("no card is selected")]
    NoCardSelected,

    #[error("a card is already being resolved")]
    TurnInProgress,

    #[error("{0} is not in the active player's hand")]
    CardNotInHand(CardId),

    #[error("{0} is not a known card")]
    UnknownCard(CardId),

    #[error("square {0} is outside the board")]
    OutOfBounds(i32),

    #[error("square {0} is already occupied")]
    Occupied(usize),

    #[error("no piece at square {0}")]
    NoPieceAt(usize),

    #[error("square {0} does not hold one of your pieces")]
    NotYourPiece(usize),

    #[error("can only move one space at a time")]
    MoveTooFar,

    #[error("no valid targets, try again")]
    NoValidTargets,

    #[error("must click on an opponent's polygon feature")]
    NotAnOpponentPolygon,

    #[error("opponent's polygon must be touching one of your polygon or line features")]
    NotTouchingOwnFeature,

    #[error("no polygon feature of yours at square {0}")]
    NotYourPolygon(usize),

    #[error("square {0} is not adjacent to a highlighted feature")]
    NotAJoinSquare(usize),

    #[error("square {0} already holds one of your pieces")]
    AlreadyYours(usize),

    #[error("no choice is pending")]
    NoChoicePending,

    #[error("a choice is pending; resolve it first")]
    ChoicePending,

    #[error("the supplied value does not match the pending choice")]
    ChoiceMismatch,

    #[error("{0} is not among the offered cards")]
    NotOffered(CardId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_square() {
        assert_eq!(
            PlayError::Occupied(42).to_string(),
            "square 42 is already occupied"
        );
        assert_eq!(
            PlayError::NotAJoinSquare(7).to_string(),
            "square 7 is not adjacent to a highlighted feature"
        );
    }

    #[test]
    fn test_messages_name_the_card() {
        assert_eq!(
            PlayError::NotOffered(CardId::CLIP).to_string(),
            "Card 3 is not among the offered cards"
        );
    }
}
