//! Authoritative Simulation Tick
//!
//! One tick advances the striker-in-flight physics by the configured
//! sub-steps, resolving collisions inside each sub-step, and hands the
//! outcome to the rule evaluator once all motion has settled. Only the
//! authoritative side runs this against game-affecting state; the remote
//! participant renders interpolated snapshots instead.

use tracing::debug;

use super::collision::{resolve_piece_collisions, resolve_pockets, resolve_walls};
use super::events::GameEvent;
use super::physics::{integrate_substep, SubstepParams};
use super::piece::{Seat, PIECE_COUNT};
use super::rules::{evaluate_turn, TurnOutcome};
use super::state::{MatchState, StrikerPhase};
use super::board::SUBSTEPS;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Set when motion settled and the turn was evaluated this tick
    pub turn_resolved: Option<TurnOutcome>,
    /// Whether the match is over after this tick
    pub match_ended: bool,
    /// Winner (if the match ended with one)
    pub winner: Option<Seat>,
}

/// Run one simulation tick.
///
/// Outside the `Moving` phase this only advances the tick counter;
/// placement and aiming mutate state through action application between
/// ticks, not through physics. State mutation is atomic with respect to
/// inbound messages: nothing may touch the piece array between the
/// sub-steps of a single call.
pub fn tick(state: &mut MatchState) -> TickResult {
    let mut result = TickResult::default();

    if state.is_ended() {
        result.match_ended = true;
        result.events = state.take_events();
        return result;
    }

    state.tick += 1;

    if state.turn.striker_phase == StrikerPhase::Moving {
        run_physics(state);

        if state.motion_settled() {
            debug!(tick = state.tick, "motion settled, evaluating turn");
            state.turn.striker_phase = StrikerPhase::Processing;
            let outcome = evaluate_turn(state);
            result.winner = outcome.winner;
            result.match_ended = outcome.winner.is_some();
            result.turn_resolved = Some(outcome);
        }
    }

    debug_assert_eq!(
        state.active_count() + state.pocketed_count(),
        PIECE_COUNT,
        "piece conservation violated"
    );

    result.events = state.take_events();
    result
}

/// Advance all sub-steps of one tick: integrate, then resolve walls,
/// pockets, and piece pairs, in that order, inside every sub-step.
fn run_physics(state: &mut MatchState) {
    let params = SubstepParams::per_tick();
    let by_seat = state.turn.current;
    let board = state.board;

    for _ in 0..SUBSTEPS {
        integrate_substep(&mut state.pieces, &params);
        resolve_walls(&mut state.pieces, &board);

        let captures =
            resolve_pockets(&mut state.pieces, &board, &mut state.capture_counter);

        for capture in captures {
            state.push_event(GameEvent::piece_captured(
                state.tick,
                capture.piece_id,
                capture.kind,
                capture.pocket,
                by_seat,
            ));
        }

        resolve_piece_collisions(&mut state.pieces);
    }
}

/// Drive ticks until the board settles and the turn resolves, up to
/// `max_ticks`. Convenience for the demo binary and tests; the real host
/// calls [`tick`] once per display frame.
pub fn run_until_settled(state: &mut MatchState, max_ticks: u32) -> TickResult {
    let mut all_events = Vec::new();

    for _ in 0..max_ticks {
        let mut result = tick(state);
        all_events.append(&mut result.events);

        if result.turn_resolved.is_some() || result.match_ended {
            result.events = all_events;
            return result;
        }
    }

    TickResult {
        events: all_events,
        ..TickResult::default()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use crate::game::input::{apply_action, PlayerAction};
    use crate::game::piece::PieceId;
    use crate::game::state::{quick_setup, QueenStatus};

    fn launched_state(drag: Vec2) -> MatchState {
        let mut state = MatchState::new(quick_setup([0; 16]));
        apply_action(
            &mut state,
            Seat::South,
            PlayerAction::Place { piece: PieceId::STRIKER, x: 0.0 },
        )
        .unwrap();
        apply_action(&mut state, Seat::South, PlayerAction::Aim { drag }).unwrap();
        apply_action(&mut state, Seat::South, PlayerAction::Release).unwrap();
        state
    }

    #[test]
    fn test_idle_tick_only_counts() {
        let mut state = MatchState::new(quick_setup([0; 16]));
        let before = state.compute_hash();
        let result = tick(&mut state);

        assert_eq!(state.tick, 1);
        assert!(result.turn_resolved.is_none());
        assert!(!result.match_ended);
        // Nothing but the tick counter moved.
        state.tick = 0;
        assert_eq!(state.compute_hash(), before);
    }

    #[test]
    fn test_strike_runs_and_settles() {
        // Straight shot up the board from the baseline center.
        let mut state = launched_state(Vec2::new(0.0, -14.0));
        assert_eq!(state.turn.striker_phase, StrikerPhase::Moving);

        let result = run_until_settled(&mut state, 5_000);

        let outcome = result.turn_resolved.expect("strike should settle");
        assert!(state.motion_settled());
        assert_eq!(state.turn.striker_phase, StrikerPhase::Placing);
        // Whatever happened, the piece count invariant held.
        assert_eq!(state.active_count() + state.pocketed_count(), PIECE_COUNT);
        // A rules decision was made about the next seat.
        assert!(outcome.next_seat == Seat::South || outcome.next_seat == Seat::North);
    }

    #[test]
    fn test_count_invariant_across_many_strikes() {
        let mut state = MatchState::new(quick_setup([0; 16]));

        let drags = [
            Vec2::new(2.0, -12.0),
            Vec2::new(-3.0, 14.0),
            Vec2::new(1.0, -20.0),
            Vec2::new(-2.0, 16.0),
            Vec2::new(0.5, -9.0),
        ];

        for (i, drag) in drags.iter().enumerate() {
            if state.is_ended() {
                break;
            }
            let seat = state.turn.current;
            apply_action(
                &mut state,
                seat,
                PlayerAction::Place { piece: PieceId::STRIKER, x: (i as f32) - 2.0 },
            )
            .unwrap();
            apply_action(&mut state, seat, PlayerAction::Aim { drag: *drag }).unwrap();
            apply_action(&mut state, seat, PlayerAction::Release).unwrap();

            let result = run_until_settled(&mut state, 5_000);
            assert!(result.turn_resolved.is_some() || result.match_ended);
            assert_eq!(state.active_count() + state.pocketed_count(), PIECE_COUNT);
        }
    }

    #[test]
    fn test_capture_emits_event() {
        // Aim the striker straight at a corner pocket with plenty of power.
        let mut state = MatchState::new(quick_setup([0; 16]));
        let pocket = state.board.pockets[0];
        {
            let striker = state.striker_mut();
            striker.position = pocket + Vec2::new(6.0, 6.0);
            striker.velocity = (pocket - striker.position).normalize().scale(3.0);
        }
        state.turn.striker_phase = StrikerPhase::Moving;

        let result = run_until_settled(&mut state, 2_000);

        let captured = result.events.iter().any(|e| {
            matches!(
                e.data,
                crate::game::events::GameEventData::PieceCaptured { piece_id, .. }
                    if piece_id == PieceId::STRIKER
            )
        });
        assert!(captured, "striker heading into a pocket must emit a capture");
        // And a striker capture is a foul: the turn passed.
        let outcome = result.turn_resolved.expect("turn should resolve");
        assert_eq!(outcome.next_seat, Seat::North);
        assert_eq!(state.turn.queen, QueenStatus::OnBoard);
    }

    #[test]
    fn test_random_strikes_keep_invariants() {
        use rand::{Rng, SeedableRng};

        let mut rng = rand::rngs::StdRng::seed_from_u64(0xCA220);
        let mut state = MatchState::new(quick_setup([0; 16]));

        for _ in 0..12 {
            if state.is_ended() {
                break;
            }
            let seat = state.turn.current;
            let x = rng.gen_range(-20.0..20.0);
            let toward_board = if seat == Seat::South { -1.0 } else { 1.0 };
            let drag = Vec2::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(5.0..25.0) * toward_board,
            );

            apply_action(
                &mut state,
                seat,
                PlayerAction::Place { piece: PieceId::STRIKER, x },
            )
            .unwrap();
            apply_action(&mut state, seat, PlayerAction::Aim { drag }).unwrap();
            apply_action(&mut state, seat, PlayerAction::Release).unwrap();

            run_until_settled(&mut state, 10_000);

            // Count invariant after every strike.
            assert_eq!(state.active_count() + state.pocketed_count(), PIECE_COUNT);

            // Pending queen implies the queen piece is actually pocketed.
            if let QueenStatus::Pending { .. } = state.turn.queen {
                assert!(state.queen().pocketed);
            }

            // The striker is always back on the board for the next shot.
            if !state.is_ended() {
                assert!(state.striker().is_active());
                assert_eq!(state.turn.striker_phase, StrikerPhase::Placing);
            }
        }
    }

    #[test]
    fn test_tick_after_end_is_inert() {
        let mut state = MatchState::new(quick_setup([0; 16]));
        state.phase = crate::game::state::MatchPhase::Ended { winner: Seat::South };

        let result = tick(&mut state);
        assert!(result.match_ended);
        assert_eq!(state.tick, 0, "ended matches do not advance");
    }
}
