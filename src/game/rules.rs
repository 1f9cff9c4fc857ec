//! Turn Rule Evaluation
//!
//! Converts the raw physics outcome of a settled strike - the set of
//! pieces newly pocketed since the previous evaluation - into a legal
//! game transition: fouls and their reversals, queen pending/covering,
//! turn continuation, and the win gate.

use std::collections::BTreeSet;
use tracing::{debug, info};

use super::events::{FoulKind, GameEvent};
use super::piece::{PieceId, Seat};
use super::state::{MatchPhase, MatchState, QueenStatus, StrikerPhase};

/// Result of one end-of-turn evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Seat that strikes next (unchanged seat means a repeat strike).
    pub next_seat: Seat,
    /// A foul was called this turn.
    pub foul: Option<FoulKind>,
    /// The match ended with this winner.
    pub winner: Option<Seat>,
}

/// Evaluate a settled strike and advance the turn state machine.
///
/// Must only be called by the authoritative side, with the striker phase
/// in `Processing`. On return the phase is `Placing` for the next seat,
/// or the match has ended.
pub fn evaluate_turn(state: &mut MatchState) -> TurnOutcome {
    debug_assert_eq!(state.turn.striker_phase, StrikerPhase::Processing);

    let seat = state.turn.current;
    let own_color = seat.own_color();
    let opp_color = seat.opponent().own_color();

    // Per-turn delta against the snapshot from the previous evaluation.
    let pocketed_now = state.pocketed_set();
    let newly: BTreeSet<PieceId> = pocketed_now
        .difference(&state.turn.last_pocketed)
        .copied()
        .collect();

    let striker_fouled = newly.contains(&PieceId::STRIKER);
    let queen_newly = newly.contains(&PieceId::QUEEN);
    let own_newly = newly_of_color(state, &newly, own_color);
    let opp_newly = newly_of_color(state, &newly, opp_color);

    let mut foul = None;
    let mut continues = false;

    if striker_fouled {
        foul = Some(FoulKind::StrikerPocketed);
        let returned = reverse_foul_stroke(state, seat, &own_newly, &opp_newly, queen_newly);
        info!(
            seat = seat.index(),
            returned = returned.len(),
            "striker pocketed: foul, captures reversed"
        );
        state.push_event(GameEvent::foul(
            state.tick,
            seat,
            FoulKind::StrikerPocketed,
            returned,
        ));
    } else {
        if queen_newly {
            state.turn.queen = QueenStatus::Pending { owner: seat };
            continues = true;
        }

        if !own_newly.is_empty() {
            continues = true;
            if state.turn.queen.is_pending_for(seat) {
                state.turn.queen = QueenStatus::Covered { owner: seat };
                info!(seat = seat.index(), "queen covered");
                state.push_event(GameEvent::queen_covered(state.tick, seat));
            }
        } else if state.turn.queen.is_pending_for(seat) && !queen_newly {
            // The cover strike produced nothing: the queen goes back.
            return_queen_to_board(state);
            state.push_event(GameEvent::queen_returned(state.tick));
        }

        if queen_newly && state.turn.queen == (QueenStatus::Pending { owner: seat }) {
            state.push_event(GameEvent::queen_pocketed(state.tick, seat));
        }
    }

    // Win gate: a cleared seat wins only with the queen covered or never
    // captured; otherwise the finish itself is a foul.
    let mut winner = None;
    for candidate in [seat, seat.opponent()] {
        if state.remaining_own_color(candidate) > 0 {
            continue;
        }
        if state.turn.queen.is_covered() || state.queen().is_active() {
            winner = Some(candidate);
            break;
        }

        foul = Some(FoulKind::UncoveredFinish);
        continues = false;
        let returned = return_most_recent_of_color(state, candidate);
        info!(
            seat = candidate.index(),
            "cleared without queen cover: piece restored"
        );
        state.push_event(GameEvent::foul(
            state.tick,
            candidate,
            FoulKind::UncoveredFinish,
            returned.into_iter().collect(),
        ));
    }

    // The snapshot is taken after reversals, so returned pieces count as
    // newly pocketed again if they drop on a later strike.
    state.turn.last_pocketed = state.pocketed_set();
    state.recompute_scores();

    if let Some(winner) = winner {
        state.phase = MatchPhase::Ended { winner };
        state.push_event(GameEvent::match_ended(state.tick, winner));
        info!(winner = winner.index(), "match ended");
        return TurnOutcome {
            next_seat: seat,
            foul,
            winner: Some(winner),
        };
    }

    let next_seat = if foul.is_some() || !continues {
        state.push_event(GameEvent::turn_passed(state.tick, seat));
        seat.opponent()
    } else {
        state.push_event(GameEvent::turn_continued(state.tick, seat));
        seat
    };

    debug!(
        from = seat.index(),
        to = next_seat.index(),
        continues,
        "turn evaluated"
    );

    // Stage the striker on the next shooter's baseline.
    state.turn.current = next_seat;
    state.turn.striker_phase = StrikerPhase::Placing;
    state.turn.aim_drag = None;
    let staging = state.free_baseline_spot(next_seat);
    state.striker_mut().return_to_board(staging);

    TurnOutcome {
        next_seat,
        foul,
        winner: None,
    }
}

/// Newly pocketed ids of one color, ordered by capture ordinal.
fn newly_of_color(
    state: &MatchState,
    newly: &BTreeSet<PieceId>,
    color: super::piece::PieceKind,
) -> Vec<PieceId> {
    let mut ids: Vec<PieceId> = newly
        .iter()
        .copied()
        .filter(|id| state.piece(*id).is_some_and(|p| p.kind == color))
        .collect();
    ids.sort_by_key(|id| state.piece(*id).and_then(|p| p.captured_seq));
    ids
}

/// Reverse the captures of a foul stroke.
///
/// The striker returns to the shooter's baseline; every opponent piece
/// pocketed this turn returns to the center area; of the shooter's own
/// pieces pocketed this turn only the least-recently-captured one
/// returns; a queen pocketed in the foul stroke (or pending from the
/// shooter's previous strike) returns uncovered.
fn reverse_foul_stroke(
    state: &mut MatchState,
    seat: Seat,
    own_newly: &[PieceId],
    opp_newly: &[PieceId],
    queen_newly: bool,
) -> Vec<PieceId> {
    let mut returned = Vec::new();

    let baseline = state.free_baseline_spot(seat);
    state.striker_mut().return_to_board(baseline);
    returned.push(PieceId::STRIKER);

    for &id in opp_newly {
        return_piece_to_center(state, id);
        returned.push(id);
    }

    if let Some(&first_own) = own_newly.first() {
        return_piece_to_center(state, first_own);
        returned.push(first_own);
    }

    if queen_newly || state.turn.queen.is_pending_for(seat) {
        if state.queen().pocketed {
            return_queen_to_board(state);
            returned.push(PieceId::QUEEN);
            state.push_event(GameEvent::queen_returned(state.tick));
        }
    }

    returned
}

fn return_piece_to_center(state: &mut MatchState, id: PieceId) {
    let Some(radius) = state.piece(id).map(|p| p.radius()) else {
        return;
    };
    let spot = state.free_spot_near_center(radius);
    if let Some(piece) = state.piece_mut(id) {
        piece.return_to_board(spot);
    }
}

fn return_queen_to_board(state: &mut MatchState) {
    return_piece_to_center(state, PieceId::QUEEN);
    state.turn.queen = QueenStatus::OnBoard;
}

/// Return the most recently captured piece of a seat's color to the
/// board center (the uncovered-finish penalty).
fn return_most_recent_of_color(state: &mut MatchState, seat: Seat) -> Option<PieceId> {
    let color = seat.own_color();
    let id = state
        .pieces
        .iter()
        .filter(|p| p.kind == color && p.pocketed)
        .max_by_key(|p| p.captured_seq)
        .map(|p| p.id)?;
    return_piece_to_center(state, id);
    Some(id)
}

// =============================================================================
// TESTS
// =============================================================================
