//! Protocol Messages
//!
//! Wire format between the authority and the mirroring participant.
//! Messages serialize as JSON for debugging ease, with binary (bincode)
//! for production. Moving the bytes is the transport collaborator's job;
//! this module only defines the shapes and the codecs.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::hash::{StateHash, StateHasher};
use crate::game::input::PlayerAction;
use crate::game::piece::{Piece, PieceId, PieceKind, Seat};
use crate::game::state::{MatchPhase, MatchState, TurnState};
use crate::core::vec2::Vec2;

/// Decode/encode failure at the protocol boundary.
///
/// Malformed payloads stop here; nothing propagates into the core.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// JSON codec failure.
    #[error("json codec: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary codec failure.
    #[error("binary codec: {0}")]
    Binary(#[from] bincode::Error),

    /// Structurally valid message with impossible contents.
    #[error("invalid payload: {0}")]
    Invalid(&'static str),
}

// =============================================================================
// MIRROR -> AUTHORITY MESSAGES
// =============================================================================

/// The action payload of a client intent.
///
/// Externally tagged so the same shape round-trips through both codecs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Slide the striker to `x` on the shooter's baseline.
    Place {
        /// Arena id of the dragged piece.
        piece: u8,
        /// Requested baseline x.
        x: f32,
    },
    /// Update the aim drag vector.
    Aim {
        /// Drag vector (start to current) in board units.
        drag: [f32; 2],
    },
    /// Release the drag.
    Release,
    /// Ask the authority for an immediate full snapshot.
    SyncRequest,
}

/// An intent from the non-authoritative seat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientIntent {
    /// Claimed seat index (0 or 1).
    pub seat: u8,
    /// Per-seat sequence number; duplicates and stale values are dropped.
    pub seq: u32,
    /// The action itself.
    pub kind: IntentKind,
}

impl ClientIntent {
    /// Validate the seat claim and convert to a game action.
    ///
    /// `SyncRequest` is not a game action and returns `None` for the
    /// action while still yielding the seat.
    pub fn to_action(&self) -> Result<(Seat, Option<PlayerAction>), ProtocolError> {
        let seat = Seat::from_index(self.seat)
            .ok_or(ProtocolError::Invalid("seat index out of range"))?;
        let action = match self.kind {
            IntentKind::Place { piece, x } => Some(PlayerAction::Place {
                piece: PieceId(piece),
                x,
            }),
            IntentKind::Aim { drag } => Some(PlayerAction::Aim {
                drag: Vec2::new(drag[0], drag[1]),
            }),
            IntentKind::Release => Some(PlayerAction::Release),
            IntentKind::SyncRequest => None,
        };
        Ok((seat, action))
    }
}

// =============================================================================
// AUTHORITY -> MIRROR MESSAGES
// =============================================================================

/// One piece as carried in a snapshot: everything the rendering side
/// needs, nothing it does not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    /// Arena id.
    pub id: u8,
    /// Piece kind.
    pub kind: PieceKind,
    /// Position in board units.
    pub position: [f32; 2],
    /// Orientation in radians.
    pub orientation: f32,
    /// Whether the piece is pocketed.
    pub pocketed: bool,
}

impl PieceSnapshot {
    fn of(piece: &Piece) -> Self {
        Self {
            id: piece.id.0,
            kind: piece.kind,
            position: [piece.position.x, piece.position.y],
            orientation: piece.orientation,
            pocketed: piece.pocketed,
        }
    }
}

/// Full-state snapshot broadcast by the authority after every settled
/// turn. The mirror replaces its world with this wholesale; convergence
/// is last-snapshot-wins, never incremental repair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Monotonically increasing snapshot number.
    pub seq: u64,
    /// Authoritative tick the snapshot was taken at.
    pub tick: u64,
    /// Wall-clock send time, for diagnostics only.
    pub sent_at: DateTime<Utc>,
    /// All twenty pieces.
    pub pieces: Vec<PieceSnapshot>,
    /// Turn state machine data.
    pub turn: TurnState,
    /// Scores by seat index.
    pub scores: [u32; 2],
    /// Match lifecycle phase.
    pub phase: MatchPhase,
    /// Payload integrity hash; see [`StateSnapshot::compute_integrity`].
    pub integrity: StateHash,
}

impl StateSnapshot {
    /// Capture a snapshot of the authoritative state.
    pub fn capture(state: &MatchState, seq: u64) -> Self {
        let mut snapshot = Self {
            seq,
            tick: state.tick,
            sent_at: Utc::now(),
            pieces: state.pieces.iter().map(PieceSnapshot::of).collect(),
            turn: state.turn.clone(),
            scores: [
                state.players[0].score,
                state.players[1].score,
            ],
            phase: state.phase,
            integrity: [0; 32],
        };
        snapshot.integrity = snapshot.compute_integrity();
        snapshot
    }

    /// Hash of the snapshot payload (everything except `sent_at` and the
    /// hash field itself). The mirror recomputes this to detect payload
    /// corruption or divergence before trusting a snapshot.
    pub fn compute_integrity(&self) -> StateHash {
        let mut hasher = StateHasher::new(b"CARROM_SNAPSHOT_V1");
        hasher.update_u64(self.seq);
        hasher.update_u64(self.tick);
        for piece in &self.pieces {
            hasher.update_u8(piece.id);
            hasher.update_u8(piece.kind as u8);
            hasher.update_f32(piece.position[0]);
            hasher.update_f32(piece.position[1]);
            hasher.update_f32(piece.orientation);
            hasher.update_bool(piece.pocketed);
        }
        hasher.update_u8(self.turn.current as u8);
        match self.turn.queen {
            crate::game::state::QueenStatus::OnBoard => hasher.update_u8(0),
            crate::game::state::QueenStatus::Pending { owner } => {
                hasher.update_u8(1);
                hasher.update_u8(owner as u8);
            }
            crate::game::state::QueenStatus::Covered { owner } => {
                hasher.update_u8(2);
                hasher.update_u8(owner as u8);
            }
        }
        for id in &self.turn.last_pocketed {
            hasher.update_u8(id.0);
        }
        hasher.update_u32(self.scores[0]);
        hasher.update_u32(self.scores[1]);
        hasher.finalize()
    }

    /// Verify the integrity hash.
    pub fn verify_integrity(&self) -> bool {
        self.integrity == self.compute_integrity()
    }
}

/// Messages sent from the authority to the mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityMessage {
    /// Full-state snapshot.
    Snapshot(StateSnapshot),
}

// =============================================================================
// CODECS
// =============================================================================

/// Encode a message as JSON (debug-friendly).
pub fn encode_json<T: Serialize>(message: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}

/// Decode a message from JSON.
pub fn decode_json<T: DeserializeOwned>(payload: &str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(payload)?)
}

/// Encode a message as compact binary.
pub fn encode_binary<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(bincode::serialize(message)?)
}

/// Decode a message from compact binary.
pub fn decode_binary<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ProtocolError> {
    Ok(bincode::deserialize(payload)?)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::quick_setup;

    #[test]
    fn test_intent_json_roundtrip() {
        let intent = ClientIntent {
            seat: 1,
            seq: 7,
            kind: IntentKind::Aim { drag: [2.0, -8.5] },
        };
        let json = encode_json(&intent).unwrap();
        let back: ClientIntent = decode_json(&json).unwrap();
        assert_eq!(back, intent);
    }

    #[test]
    fn test_intent_binary_roundtrip() {
        let intent = ClientIntent {
            seat: 0,
            seq: 1,
            kind: IntentKind::Place { piece: 0, x: -3.5 },
        };
        let bytes = encode_binary(&intent).unwrap();
        let back: ClientIntent = decode_binary(&bytes).unwrap();
        assert_eq!(back, intent);
    }

    #[test]
    fn test_malformed_payload_rejected() {
        assert!(decode_json::<ClientIntent>("{\"seat\": \"garbage\"}").is_err());
        assert!(decode_binary::<ClientIntent>(&[0xff, 0x01]).is_err());
    }

    #[test]
    fn test_bad_seat_index_rejected() {
        let intent = ClientIntent {
            seat: 7,
            seq: 0,
            kind: IntentKind::Release,
        };
        assert!(intent.to_action().is_err());
    }

    #[test]
    fn test_sync_request_is_not_an_action() {
        let intent = ClientIntent {
            seat: 1,
            seq: 0,
            kind: IntentKind::SyncRequest,
        };
        let (seat, action) = intent.to_action().unwrap();
        assert_eq!(seat, Seat::North);
        assert_eq!(action, None);
    }

    #[test]
    fn test_snapshot_integrity_roundtrip() {
        let state = MatchState::new(quick_setup([3; 16]));
        let snapshot = StateSnapshot::capture(&state, 1);
        assert!(snapshot.verify_integrity());

        let json = encode_json(&AuthorityMessage::Snapshot(snapshot.clone())).unwrap();
        let AuthorityMessage::Snapshot(back) = decode_json(&json).unwrap();
        assert!(back.verify_integrity());
        assert_eq!(back.pieces.len(), state.pieces.len());
        assert_eq!(back.scores, [0, 0]);
    }

    #[test]
    fn test_tampered_snapshot_fails_integrity() {
        let state = MatchState::new(quick_setup([3; 16]));
        let mut snapshot = StateSnapshot::capture(&state, 1);
        snapshot.scores[0] = 99;
        assert!(!snapshot.verify_integrity());
    }
}
