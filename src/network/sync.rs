//! Authority / Mirror Synchronization
//!
//! The authority owns the only live `MatchState`. Inbound intents pass
//! through a gate that enforces turn ownership and drops duplicates;
//! after every settled turn the authority broadcasts a full snapshot.
//! The mirror holds the latest snapshot wholesale - never partially
//! patched - and when it detects corruption it freezes and requests a
//! fresh snapshot (freeze-and-resync).

use tracing::{debug, info, warn};

use crate::game::input::apply_action;
use crate::game::piece::Seat;
use crate::game::state::MatchState;
use super::protocol::{ClientIntent, IntentKind, StateSnapshot};

// =============================================================================
// AUTHORITY SIDE
// =============================================================================

/// Allocates snapshot sequence numbers and captures snapshots.
#[derive(Debug, Default)]
pub struct SnapshotProducer {
    next_seq: u64,
}

impl SnapshotProducer {
    /// Create a producer starting at sequence zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the authoritative state under the next sequence number.
    pub fn produce(&mut self, state: &MatchState) -> StateSnapshot {
        let snapshot = StateSnapshot::capture(state, self.next_seq);
        self.next_seq += 1;
        snapshot
    }
}

/// What the authority did with an inbound intent.
#[derive(Debug, PartialEq, Eq)]
pub enum IntentDisposition {
    /// The action was applied to the match state.
    Applied,
    /// The mirror asked for a snapshot; send one now.
    SnapshotRequested,
    /// The intent was dropped without side effects.
    Dropped(DropReason),
}

/// Why an intent was dropped.
#[derive(Debug, PartialEq, Eq)]
pub enum DropReason {
    /// Seat index outside 0..2 or otherwise unusable payload.
    Malformed,
    /// Sequence number at or below the last one seen for that seat.
    DuplicateOrStale,
    /// The game rules rejected the action (wrong turn, wrong phase,
    /// unknown piece, match over).
    Rejected,
}

/// Validates inbound intents before they touch the match state.
///
/// Tracks the last applied sequence number per seat so replayed or
/// reordered duplicates are dropped, exactly once semantics from the
/// core's point of view.
#[derive(Debug, Default)]
pub struct IntentGate {
    last_seq: [Option<u32>; 2],
}

impl IntentGate {
    /// Create a gate that has seen nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate one intent and, if legal, apply it to the state.
    ///
    /// Application happens between ticks by construction: the host calls
    /// this from its message pump, never from inside `tick`.
    pub fn admit(&mut self, state: &mut MatchState, intent: &ClientIntent) -> IntentDisposition {
        let Ok((seat, action)) = intent.to_action() else {
            warn!(seat = intent.seat, "malformed intent dropped");
            return IntentDisposition::Dropped(DropReason::Malformed);
        };

        let slot = &mut self.last_seq[seat.index()];
        if slot.is_some_and(|last| intent.seq <= last) {
            debug!(seat = seat.index(), seq = intent.seq, "duplicate intent dropped");
            return IntentDisposition::Dropped(DropReason::DuplicateOrStale);
        }
        *slot = Some(intent.seq);

        let Some(action) = action else {
            info!(seat = seat.index(), "mirror requested resync");
            return IntentDisposition::SnapshotRequested;
        };

        match apply_action(state, seat, action) {
            Ok(()) => IntentDisposition::Applied,
            Err(err) => {
                debug!(seat = seat.index(), %err, "intent rejected");
                IntentDisposition::Dropped(DropReason::Rejected)
            }
        }
    }
}

// =============================================================================
// MIRROR SIDE
// =============================================================================

/// Result of feeding a snapshot to the mirror.
#[derive(Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The snapshot replaced the mirror's world.
    Applied,
    /// An older or repeated snapshot arrived; the newer one stands.
    Stale,
    /// The payload failed its integrity check and was discarded.
    Corrupt,
}

/// The non-authoritative participant's read-only world.
///
/// Holds at most one snapshot, replaced wholesale on every apply. If a
/// snapshot fails verification the mirror freezes (renderers keep the
/// last good frame) until a requested full snapshot arrives; a gap in
/// sequence numbers needs no repair because every snapshot is complete.
#[derive(Debug, Default)]
pub struct Mirror {
    latest: Option<StateSnapshot>,
    frozen: bool,
    gaps_observed: u64,
}

impl Mirror {
    /// Create an empty mirror.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one snapshot from the authority.
    pub fn apply(&mut self, snapshot: StateSnapshot) -> ApplyOutcome {
        if !snapshot.verify_integrity() {
            warn!(seq = snapshot.seq, "snapshot failed integrity check; freezing");
            self.frozen = true;
            return ApplyOutcome::Corrupt;
        }

        if let Some(current) = &self.latest {
            if snapshot.seq <= current.seq {
                debug!(
                    have = current.seq,
                    got = snapshot.seq,
                    "stale snapshot ignored"
                );
                return ApplyOutcome::Stale;
            }
            self.gaps_observed += snapshot.seq - current.seq - 1;
        }

        self.latest = Some(snapshot);
        self.frozen = false;
        ApplyOutcome::Applied
    }

    /// True while the mirror is waiting on a resync snapshot.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Build the resync intent for this mirror's seat.
    pub fn resync_intent(&self, seat: Seat, seq: u32) -> ClientIntent {
        ClientIntent {
            seat: seat as u8,
            seq,
            kind: IntentKind::SyncRequest,
        }
    }

    /// The latest accepted snapshot, if any.
    pub fn latest(&self) -> Option<&StateSnapshot> {
        self.latest.as_ref()
    }

    /// Snapshots skipped over so far (dropped in transit). Diagnostic
    /// only: full snapshots make gaps harmless.
    pub fn gaps_observed(&self) -> u64 {
        self.gaps_observed
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use crate::game::input::PlayerAction;
    use crate::game::piece::PieceId;
    use crate::game::state::{quick_setup, StrikerPhase};

    fn fresh_state() -> MatchState {
        MatchState::new(quick_setup([0; 16]))
    }

    fn place_intent(seat: u8, seq: u32, x: f32) -> ClientIntent {
        ClientIntent {
            seat,
            seq,
            kind: IntentKind::Place { piece: 0, x },
        }
    }

    #[test]
    fn test_producer_seq_monotonic() {
        let state = fresh_state();
        let mut producer = SnapshotProducer::new();
        let a = producer.produce(&state);
        let b = producer.produce(&state);
        assert_eq!(a.seq, 0);
        assert_eq!(b.seq, 1);
    }

    #[test]
    fn test_gate_applies_in_turn_intent() {
        let mut state = fresh_state();
        let mut gate = IntentGate::new();

        let disposition = gate.admit(&mut state, &place_intent(0, 1, 5.0));
        assert_eq!(disposition, IntentDisposition::Applied);
        assert_eq!(state.striker().position.x, 5.0);
    }

    #[test]
    fn test_gate_drops_duplicates() {
        let mut state = fresh_state();
        let mut gate = IntentGate::new();

        assert_eq!(gate.admit(&mut state, &place_intent(0, 1, 5.0)), IntentDisposition::Applied);
        // Same seq again: dropped, state untouched.
        assert_eq!(
            gate.admit(&mut state, &place_intent(0, 1, -5.0)),
            IntentDisposition::Dropped(DropReason::DuplicateOrStale)
        );
        assert_eq!(state.striker().position.x, 5.0);
        // Lower seq: also dropped.
        assert_eq!(
            gate.admit(&mut state, &place_intent(0, 0, -5.0)),
            IntentDisposition::Dropped(DropReason::DuplicateOrStale)
        );
    }

    #[test]
    fn test_gate_drops_out_of_turn() {
        let mut state = fresh_state();
        let mut gate = IntentGate::new();

        // North acts while it is South's turn.
        assert_eq!(
            gate.admit(&mut state, &place_intent(1, 1, 5.0)),
            IntentDisposition::Dropped(DropReason::Rejected)
        );
        assert_eq!(state.striker().position.x, 0.0);
    }

    #[test]
    fn test_gate_drops_malformed_seat() {
        let mut state = fresh_state();
        let mut gate = IntentGate::new();
        assert_eq!(
            gate.admit(&mut state, &place_intent(9, 1, 5.0)),
            IntentDisposition::Dropped(DropReason::Malformed)
        );
    }

    #[test]
    fn test_gate_passes_sync_request_through() {
        let mut state = fresh_state();
        let mut gate = IntentGate::new();
        let intent = ClientIntent {
            seat: 1,
            seq: 1,
            kind: IntentKind::SyncRequest,
        };
        assert_eq!(gate.admit(&mut state, &intent), IntentDisposition::SnapshotRequested);
    }

    #[test]
    fn test_mirror_applies_and_rejects_stale() {
        let state = fresh_state();
        let mut producer = SnapshotProducer::new();
        let mut mirror = Mirror::new();

        let s0 = producer.produce(&state);
        let s1 = producer.produce(&state);

        assert_eq!(mirror.apply(s1.clone()), ApplyOutcome::Applied);
        assert_eq!(mirror.apply(s0), ApplyOutcome::Stale);
        assert_eq!(mirror.latest().unwrap().seq, s1.seq);
    }

    #[test]
    fn test_mirror_counts_gaps() {
        let state = fresh_state();
        let mut producer = SnapshotProducer::new();
        let mut mirror = Mirror::new();

        let s0 = producer.produce(&state);
        let _lost = producer.produce(&state);
        let s2 = producer.produce(&state);

        mirror.apply(s0);
        mirror.apply(s2);
        assert_eq!(mirror.gaps_observed(), 1);
        assert!(!mirror.is_frozen());
    }

    #[test]
    fn test_mirror_freezes_on_corruption() {
        let state = fresh_state();
        let mut producer = SnapshotProducer::new();
        let mut mirror = Mirror::new();

        let good = producer.produce(&state);
        mirror.apply(good.clone());

        let mut bad = producer.produce(&state);
        bad.scores[1] = 42; // tampered in transit
        assert_eq!(mirror.apply(bad), ApplyOutcome::Corrupt);
        assert!(mirror.is_frozen());
        // Last good world is still there for the renderer.
        assert_eq!(mirror.latest().unwrap().seq, good.seq);

        // Recovery: the requested snapshot arrives and thaws the mirror.
        let recovery = producer.produce(&state);
        assert_eq!(mirror.apply(recovery), ApplyOutcome::Applied);
        assert!(!mirror.is_frozen());
    }

    #[test]
    fn test_end_to_end_turn_sync() {
        // Authority runs a full remote turn: place, aim, release arrive
        // as intents; physics settles; the mirror receives the result.
        let mut state = fresh_state();
        let mut gate = IntentGate::new();
        let mut producer = SnapshotProducer::new();
        let mut mirror = Mirror::new();

        for (seq, kind) in [
            (1, IntentKind::Place { piece: 0, x: 2.0 }),
            (2, IntentKind::Aim { drag: [0.0, -12.0] }),
            (3, IntentKind::Release),
        ] {
            let disposition = gate.admit(&mut state, &ClientIntent { seat: 0, seq, kind });
            assert_eq!(disposition, IntentDisposition::Applied);
        }
        assert_eq!(state.turn.striker_phase, StrikerPhase::Moving);
        assert!(state.striker().velocity != Vec2::ZERO);

        let result = crate::game::tick::run_until_settled(&mut state, 5_000);
        assert!(result.turn_resolved.is_some());

        let snapshot = producer.produce(&state);
        assert_eq!(mirror.apply(snapshot), ApplyOutcome::Applied);

        let seen = mirror.latest().unwrap();
        assert_eq!(seen.pieces.len(), state.pieces.len());
        assert_eq!(seen.turn.current, state.turn.current);
        assert_eq!(
            seen.pieces[PieceId::STRIKER.index()].pocketed,
            state.striker().pocketed
        );
    }
}
