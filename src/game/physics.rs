//! Physics Integrator
//!
//! Advances all active pieces with sub-stepped semi-implicit integration.
//! Each tick is divided into a fixed number of sub-steps to keep fast
//! pieces from tunneling through walls or each other; friction is applied
//! per sub-step with an exponent that makes the per-tick decay independent
//! of the sub-step count.

use super::board::{
    FRICTION, SPIN_FRICTION, SPIN_STOP_THRESHOLD, STOP_THRESHOLD, SUBSTEPS,
};
use super::piece::Piece;

/// Precomputed per-sub-step coefficients.
///
/// Built once per tick loop; `friction` here is already raised to
/// `1/SUBSTEPS` so applying it every sub-step yields exactly the
/// configured per-tick decay.
#[derive(Clone, Copy, Debug)]
pub struct SubstepParams {
    /// Linear velocity retention per sub-step.
    pub friction: f32,
    /// Angular velocity retention per sub-step.
    pub spin_friction: f32,
    /// Position advance fraction per sub-step.
    pub step_fraction: f32,
}

impl SubstepParams {
    /// Coefficients for the configured tick/sub-step split.
    pub fn per_tick() -> Self {
        let n = SUBSTEPS as f32;
        Self {
            friction: FRICTION.powf(1.0 / n),
            spin_friction: SPIN_FRICTION.powf(1.0 / n),
            step_fraction: 1.0 / n,
        }
    }
}

impl Default for SubstepParams {
    fn default() -> Self {
        Self::per_tick()
    }
}

/// Advance every active piece by one sub-step.
///
/// Semi-implicit: friction decays the velocity first, then the position
/// advances with the decayed velocity. Velocities under the stop
/// thresholds snap to exactly zero so settled boards do not jitter
/// forever on denormal residue.
pub fn integrate_substep(pieces: &mut [Piece], params: &SubstepParams) {
    for piece in pieces.iter_mut().filter(|p| p.is_active()) {
        piece.velocity = piece.velocity.scale(params.friction);
        piece.angular_velocity *= params.spin_friction;

        if piece.velocity.length_squared() < STOP_THRESHOLD * STOP_THRESHOLD {
            piece.velocity = crate::core::vec2::Vec2::ZERO;
        }
        if piece.angular_velocity.abs() < SPIN_STOP_THRESHOLD {
            piece.angular_velocity = 0.0;
        }

        piece.position = piece.position + piece.velocity.scale(params.step_fraction);
        piece.orientation = (piece.orientation
            + piece.angular_velocity * params.step_fraction)
            .rem_euclid(std::f32::consts::TAU);
    }
}

/// True when every active piece has zero linear and angular velocity.
///
/// This is the trigger the turn state machine waits on before moving
/// from `Moving` to `Processing`.
pub fn is_settled(pieces: &[Piece]) -> bool {
    pieces
        .iter()
        .filter(|p| p.is_active())
        .all(|p| !p.is_moving())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use crate::game::piece::{Piece, PieceId, PieceKind};

    fn moving_piece(vx: f32, spin: f32) -> Piece {
        let mut piece = Piece::new(PieceId(2), PieceKind::Light, Vec2::ZERO);
        piece.velocity = Vec2::new(vx, 0.0);
        piece.angular_velocity = spin;
        piece
    }

    #[test]
    fn test_per_tick_decay_independent_of_substeps() {
        let params = SubstepParams::per_tick();
        let mut pieces = vec![moving_piece(10.0, 2.0)];

        for _ in 0..SUBSTEPS {
            integrate_substep(&mut pieces, &params);
        }

        // After one full tick of sub-steps the decay equals the per-tick
        // coefficient.
        assert!((pieces[0].velocity.x - 10.0 * FRICTION).abs() < 1e-3);
        assert!((pieces[0].angular_velocity - 2.0 * SPIN_FRICTION).abs() < 1e-3);
    }

    #[test]
    fn test_position_advances_by_velocity_per_tick() {
        // With friction disabled the piece covers exactly its velocity in
        // one tick's worth of sub-steps.
        let params = SubstepParams {
            friction: 1.0,
            spin_friction: 1.0,
            step_fraction: 1.0 / SUBSTEPS as f32,
        };
        let mut pieces = vec![moving_piece(8.0, 0.0)];
        for _ in 0..SUBSTEPS {
            integrate_substep(&mut pieces, &params);
        }
        assert!((pieces[0].position.x - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_stop_threshold_snaps_to_zero() {
        let params = SubstepParams::per_tick();
        let mut pieces = vec![moving_piece(STOP_THRESHOLD * 0.9, SPIN_STOP_THRESHOLD * 0.9)];

        integrate_substep(&mut pieces, &params);
        assert_eq!(pieces[0].velocity, Vec2::ZERO);
        assert_eq!(pieces[0].angular_velocity, 0.0);
        assert!(is_settled(&pieces));
    }

    #[test]
    fn test_friction_eventually_settles() {
        let params = SubstepParams::per_tick();
        let mut pieces = vec![moving_piece(50.0, 5.0)];

        let mut ticks = 0;
        while !is_settled(&pieces) && ticks < 10_000 {
            for _ in 0..SUBSTEPS {
                integrate_substep(&mut pieces, &params);
            }
            ticks += 1;
        }
        assert!(is_settled(&pieces), "piece never settled");
        assert!(ticks > 10, "piece settled implausibly fast");
    }

    #[test]
    fn test_pocketed_pieces_skipped() {
        let params = SubstepParams::per_tick();
        let mut piece = moving_piece(10.0, 0.0);
        piece.pocketed = true;
        let mut pieces = vec![piece];

        integrate_substep(&mut pieces, &params);
        assert_eq!(pieces[0].position, Vec2::ZERO);
        assert_eq!(pieces[0].velocity.x, 10.0);
        // Settled: the pocketed piece's residual velocity is ignored.
        assert!(is_settled(&pieces));
    }

    #[test]
    fn test_orientation_wraps() {
        let params = SubstepParams {
            friction: 1.0,
            spin_friction: 1.0,
            step_fraction: 1.0,
        };
        let mut pieces = vec![moving_piece(0.0, 100.0)];
        integrate_substep(&mut pieces, &params);
        assert!(pieces[0].orientation >= 0.0);
        assert!(pieces[0].orientation < std::f32::consts::TAU);
    }
}
