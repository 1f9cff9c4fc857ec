//! Board Geometry
//!
//! Fixed geometry for the single supported carrom board: play bounds,
//! pocket placement, baselines, and the physics coefficients tuned for it.
//! All distances are in board units with the origin at the board center.

use serde::{Serialize, Deserialize};
use crate::core::vec2::Vec2;
use super::piece::Seat;

/// Half-extent of the inner play area (inset from the outer frame).
pub const PLAY_HALF_EXTENT: f32 = 44.0;

/// Distance of each pocket center from the origin along both axes.
const POCKET_OFFSET: f32 = 41.5;

/// Radius within which a piece is softly pulled toward a pocket center.
pub const POCKET_ATTRACT_RADIUS: f32 = 5.0;

/// Radius within which a piece is captured. Smaller than the attraction
/// radius.
pub const POCKET_CAPTURE_RADIUS: f32 = 2.4;

/// Velocity nudge toward the pocket center per sub-step, applied inside
/// the attraction radius.
pub const POCKET_PULL: f32 = 0.05;

/// Per-tick retention factor for linear velocity.
pub const FRICTION: f32 = 0.975;

/// Per-tick retention factor for angular velocity.
pub const SPIN_FRICTION: f32 = 0.94;

/// Energy retained along the collision normal in a wall bounce.
pub const WALL_RESTITUTION: f32 = 0.82;

/// Energy retained along the collision normal in a piece-piece collision.
pub const PIECE_RESTITUTION: f32 = 0.92;

/// Fraction of tangential relative velocity converted to spin on contact.
pub const SPIN_TRANSFER: f32 = 0.12;

/// Linear speed below which a piece is snapped to rest (units/tick).
pub const STOP_THRESHOLD: f32 = 0.02;

/// Angular speed below which spin is snapped to rest (radians/tick).
pub const SPIN_STOP_THRESHOLD: f32 = 0.01;

/// Sub-steps per physics tick.
pub const SUBSTEPS: u32 = 4;

/// Distance of each baseline from the board center.
pub const BASELINE_OFFSET: f32 = 32.0;

/// Legal striker placement range along the baseline: |x| <= half span.
pub const BASELINE_HALF_SPAN: f32 = 20.0;

/// Radius of the inner ring of the opening rosette.
pub const ROSETTE_INNER_RADIUS: f32 = 3.4;

/// Radius of the outer ring of the opening rosette.
pub const ROSETTE_OUTER_RADIUS: f32 = 6.8;

/// The fixed play area: an inset square with a pocket in each corner.
///
/// There is exactly one board; `Board::default()` is the board. The struct
/// exists so the integrator, resolver, and rules all read geometry from one
/// place instead of ambient globals.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Board {
    /// Half-extent of the play area.
    pub half_extent: f32,
    /// The four pocket centers, corner order: SW, SE, NE, NW.
    pub pockets: [Vec2; 4],
    /// Soft-pull radius around each pocket.
    pub attract_radius: f32,
    /// Capture radius around each pocket.
    pub capture_radius: f32,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            half_extent: PLAY_HALF_EXTENT,
            pockets: [
                Vec2::new(-POCKET_OFFSET, -POCKET_OFFSET),
                Vec2::new(POCKET_OFFSET, -POCKET_OFFSET),
                Vec2::new(POCKET_OFFSET, POCKET_OFFSET),
                Vec2::new(-POCKET_OFFSET, POCKET_OFFSET),
            ],
            attract_radius: POCKET_ATTRACT_RADIUS,
            capture_radius: POCKET_CAPTURE_RADIUS,
        }
    }
}

impl Board {
    /// Y coordinate of the baseline belonging to a seat.
    ///
    /// Seat `South` shoots from the bottom edge, `North` from the top.
    pub fn baseline_y(&self, seat: Seat) -> f32 {
        match seat {
            Seat::South => -BASELINE_OFFSET,
            Seat::North => BASELINE_OFFSET,
        }
    }

    /// Striker placement position for a given x on a seat's baseline,
    /// with x clamped to the legal range.
    pub fn baseline_position(&self, seat: Seat, x: f32) -> Vec2 {
        Vec2::new(
            x.clamp(-BASELINE_HALF_SPAN, BASELINE_HALF_SPAN),
            self.baseline_y(seat),
        )
    }

    /// Check whether a circle of `radius` at `pos` lies fully inside the
    /// play area.
    pub fn contains(&self, pos: Vec2, radius: f32) -> bool {
        let limit = self.half_extent - radius;
        pos.x >= -limit && pos.x <= limit && pos.y >= -limit && pos.y <= limit
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pockets_in_corners() {
        let board = Board::default();
        for pocket in board.pockets {
            assert_eq!(pocket.x.abs(), POCKET_OFFSET);
            assert_eq!(pocket.y.abs(), POCKET_OFFSET);
            // Pocket capture zone lies inside the play area
            assert!(pocket.length() < board.half_extent * std::f32::consts::SQRT_2);
        }
    }

    #[test]
    fn test_capture_smaller_than_attract() {
        let board = Board::default();
        assert!(board.capture_radius < board.attract_radius);
    }

    #[test]
    fn test_baseline_sides() {
        let board = Board::default();
        assert!(board.baseline_y(Seat::South) < 0.0);
        assert!(board.baseline_y(Seat::North) > 0.0);
        assert_eq!(
            board.baseline_y(Seat::South),
            -board.baseline_y(Seat::North)
        );
    }

    #[test]
    fn test_baseline_position_clamps() {
        let board = Board::default();
        let pos = board.baseline_position(Seat::South, 1000.0);
        assert_eq!(pos.x, BASELINE_HALF_SPAN);
        assert_eq!(pos.y, -BASELINE_OFFSET);

        let pos = board.baseline_position(Seat::North, -1000.0);
        assert_eq!(pos.x, -BASELINE_HALF_SPAN);
        assert_eq!(pos.y, BASELINE_OFFSET);
    }

    #[test]
    fn test_contains() {
        let board = Board::default();
        assert!(board.contains(Vec2::ZERO, 2.0));
        assert!(!board.contains(Vec2::new(PLAY_HALF_EXTENT, 0.0), 2.0));
    }
}
