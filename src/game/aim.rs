//! Aiming Model
//!
//! Converts a drag gesture (already mapped into board coordinates by the
//! input collaborator) into a launch velocity for the striker. Pull back
//! to launch forward, slingshot style.

use serde::{Serialize, Deserialize};
use crate::core::vec2::Vec2;

/// Upper bound on launch speed (board units per tick).
pub const MAX_FORCE: f32 = 4.5;

/// Launch speed gained per board unit of drag distance.
pub const AIM_SENSITIVITY: f32 = 0.18;

/// Minimum launch speed; a weaker release cancels the shot.
pub const MIN_SHOT_POWER: f32 = 0.4;

/// Perpendicular drag displacement from the baseline that moves the
/// striker from placing into aiming.
pub const AIM_START_THRESHOLD: f32 = 1.2;

/// A resolved shot: unit direction and clamped power.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    /// Unit launch direction.
    pub direction: Vec2,
    /// Launch speed, in (MIN_SHOT_POWER, MAX_FORCE].
    pub power: f32,
}

impl Shot {
    /// The striker velocity this shot seeds.
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.direction.scale(self.power)
    }
}

/// Resolve a drag gesture into a shot.
///
/// `drag` is the vector from drag start to the current pointer position.
/// The launch direction points back from the current position toward the
/// start; power is proportional to drag distance, clamped to
/// [`MAX_FORCE`]. Returns `None` below [`MIN_SHOT_POWER`] - a cancelled
/// shot, not an error.
pub fn resolve_drag(drag: Vec2) -> Option<Shot> {
    let distance = drag.length();
    let power = (distance * AIM_SENSITIVITY).min(MAX_FORCE);
    if power < MIN_SHOT_POWER {
        return None;
    }
    Some(Shot {
        direction: (-drag).normalize(),
        power,
    })
}

/// Resolve a drag gesture given its two endpoints.
#[inline]
pub fn resolve(drag_start: Vec2, drag_current: Vec2) -> Option<Shot> {
    resolve_drag(drag_current - drag_start)
}

/// True once a drag has pulled far enough off the (horizontal) baseline
/// to count as aiming rather than sliding the striker.
#[inline]
pub fn drag_is_aiming(drag: Vec2) -> bool {
    drag.y.abs() > AIM_START_THRESHOLD
}

// =============================================================================
// TESTS
// =============================================================================
