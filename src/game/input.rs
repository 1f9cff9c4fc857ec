//! Player Actions
//!
//! Validated application of placement/aim/release actions to the
//! authoritative match state. Actions arrive from the local input
//! collaborator or, for the remote seat, from the network projection;
//! either way they are applied only between physics ticks.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::core::vec2::Vec2;
use super::aim;
use super::events::GameEvent;
use super::piece::{PieceId, Seat};
use super::state::{MatchState, StrikerPhase};

/// An action a seated player can take on their turn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Slide the striker along the baseline. `piece` names the dragged
    /// piece; anything but the striker is a no-op.
    Place {
        /// The piece the client believes it is dragging.
        piece: PieceId,
        /// Requested x coordinate (clamped to the legal span).
        x: f32,
    },
    /// Update the aim drag vector (drag start to current pointer).
    Aim {
        /// Current drag vector in board units.
        drag: Vec2,
    },
    /// Release the drag and launch (or cancel a too-weak shot).
    Release,
}

/// Why an action was rejected. Rejected actions have no side effects;
/// callers log and drop them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    /// The acting seat is not the current seat.
    #[error("seat {0:?} acted out of turn")]
    NotYourTurn(Seat),

    /// The striker phase does not admit this action.
    #[error("action not legal in phase {0:?}")]
    WrongPhase(StrikerPhase),

    /// The referenced piece is not in the authoritative set.
    #[error("unknown or non-striker piece {0:?}")]
    UnknownPiece(PieceId),

    /// The match is over.
    #[error("match has ended")]
    MatchOver,
}

/// Apply one action for `seat` to the authoritative state.
///
/// Must be called between ticks, never mid sub-step. Out-of-turn actions
/// are rejected without side effects; a release below the minimum power
/// silently reverts to placing (that is a legal outcome, not an error).
pub fn apply_action(
    state: &mut MatchState,
    seat: Seat,
    action: PlayerAction,
) -> Result<(), ActionError> {
    if state.is_ended() {
        return Err(ActionError::MatchOver);
    }
    if seat != state.turn.current {
        debug!(seat = seat.index(), "dropping out-of-turn action");
        return Err(ActionError::NotYourTurn(seat));
    }

    match action {
        PlayerAction::Place { piece, x } => {
            if piece != PieceId::STRIKER || state.piece(piece).is_none() {
                return Err(ActionError::UnknownPiece(piece));
            }
            if state.turn.striker_phase != StrikerPhase::Placing {
                return Err(ActionError::WrongPhase(state.turn.striker_phase));
            }
            let position = state.board.baseline_position(seat, x);
            state.striker_mut().position = position;
            Ok(())
        }

        PlayerAction::Aim { drag } => {
            match state.turn.striker_phase {
                StrikerPhase::Placing => {
                    if aim::drag_is_aiming(drag) {
                        state.turn.striker_phase = StrikerPhase::Aiming;
                        state.turn.aim_drag = Some(drag);
                    }
                    Ok(())
                }
                StrikerPhase::Aiming => {
                    state.turn.aim_drag = Some(drag);
                    Ok(())
                }
                phase => Err(ActionError::WrongPhase(phase)),
            }
        }

        PlayerAction::Release => {
            if state.turn.striker_phase != StrikerPhase::Aiming {
                return Err(ActionError::WrongPhase(state.turn.striker_phase));
            }
            let drag = state.turn.aim_drag.take().unwrap_or(Vec2::ZERO);
            match aim::resolve_drag(drag) {
                Some(shot) => {
                    let velocity = shot.velocity();
                    state.striker_mut().velocity = velocity;
                    state.turn.striker_phase = StrikerPhase::Moving;
                    let event = GameEvent::striker_launched(state.tick, seat, velocity);
                    state.push_event(event);
                    debug!(
                        seat = seat.index(),
                        power = shot.power,
                        "striker launched"
                    );
                }
                None => {
                    // Too weak: back to placing, turn not consumed.
                    state.turn.striker_phase = StrikerPhase::Placing;
                }
            }
            Ok(())
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
