//! Collision Resolver
//!
//! Runs inside each physics sub-step, after integration, in a fixed
//! order: wall reflection, pocket interaction, then piece-piece
//! collisions. Pocketed pieces never participate.

use crate::core::vec2::Vec2;
use super::board::{Board, PIECE_RESTITUTION, POCKET_PULL, SPIN_TRANSFER, WALL_RESTITUTION};
use super::piece::{Piece, PieceId, PieceKind};

/// A capture produced by the pocket pass, for the orchestrator to turn
/// into events (scoring, audio, particles happen elsewhere).
#[derive(Clone, Copy, Debug)]
pub struct CaptureRecord {
    /// Which piece dropped.
    pub piece_id: PieceId,
    /// Its kind.
    pub kind: PieceKind,
    /// The pocket it dropped into.
    pub pocket: Vec2,
}

/// Reflect active pieces off the play-area boundary.
///
/// A piece whose center crosses the inner boundary minus its radius is
/// clamped back onto the boundary and the velocity component along that
/// axis is negated, scaled by the wall restitution.
pub fn resolve_walls(pieces: &mut [Piece], board: &Board) {
    for piece in pieces.iter_mut().filter(|p| p.is_active()) {
        let limit = board.half_extent - piece.radius();

        if piece.position.x < -limit {
            piece.position.x = -limit;
            piece.velocity.x = -piece.velocity.x * WALL_RESTITUTION;
        } else if piece.position.x > limit {
            piece.position.x = limit;
            piece.velocity.x = -piece.velocity.x * WALL_RESTITUTION;
        }

        if piece.position.y < -limit {
            piece.position.y = -limit;
            piece.velocity.y = -piece.velocity.y * WALL_RESTITUTION;
        } else if piece.position.y > limit {
            piece.position.y = limit;
            piece.velocity.y = -piece.velocity.y * WALL_RESTITUTION;
        }
    }
}

/// Pocket attraction and capture.
///
/// Inside the attraction radius the piece's velocity is nudged a little
/// toward the pocket center each sub-step (a soft pull that rewards
/// near-misses); inside the smaller capture radius the piece is marked
/// pocketed, stamped with the next capture ordinal, and stopped.
pub fn resolve_pockets(
    pieces: &mut [Piece],
    board: &Board,
    capture_counter: &mut u32,
) -> Vec<CaptureRecord> {
    let mut captures = Vec::new();

    for piece in pieces.iter_mut().filter(|p| p.is_active()) {
        for pocket in board.pockets {
            let dist_sq = piece.position.distance_squared(pocket);

            if dist_sq <= board.capture_radius * board.capture_radius {
                piece.pocketed = true;
                piece.captured_seq = Some(*capture_counter);
                *capture_counter += 1;
                piece.stop();
                captures.push(CaptureRecord {
                    piece_id: piece.id,
                    kind: piece.kind,
                    pocket,
                });
                break;
            }

            if dist_sq <= board.attract_radius * board.attract_radius {
                let pull = (pocket - piece.position).normalize().scale(POCKET_PULL);
                piece.velocity = piece.velocity + pull;
            }
        }
    }

    captures
}

/// Resolve every overlapping pair of active pieces.
///
/// Velocities are decomposed along the collision normal; the normal
/// components get the mass-weighted 1D elastic exchange scaled by the
/// piece restitution, the tangential components are kept, and a fraction
/// of the tangential relative velocity becomes spin on both pieces. The
/// pair is then pushed apart along the normal, split by inverse mass so
/// the heavier piece moves less.
pub fn resolve_piece_collisions(pieces: &mut [Piece]) {
    let len = pieces.len();
    for i in 0..len {
        for j in (i + 1)..len {
            let (head, tail) = pieces.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];
            if !a.is_active() || !b.is_active() {
                continue;
            }

            let min_dist = a.radius() + b.radius();
            let delta = b.position - a.position;
            let dist_sq = delta.length_squared();
            if dist_sq >= min_dist * min_dist {
                continue;
            }

            let dist = dist_sq.sqrt();
            // Coincident centers: pick a fixed axis rather than divide by zero.
            let normal = if dist > f32::EPSILON {
                delta.scale(1.0 / dist)
            } else {
                Vec2::RIGHT
            };
            let tangent = normal.perpendicular();

            let (m1, m2) = (a.mass(), b.mass());
            let u1n = a.velocity.dot(normal);
            let u1t = a.velocity.dot(tangent);
            let u2n = b.velocity.dot(normal);
            let u2t = b.velocity.dot(tangent);

            // 1D elastic exchange on the normal components, then lossy
            // restitution on the result.
            let sum = m1 + m2;
            let v1n = ((m1 - m2) * u1n + 2.0 * m2 * u2n) / sum * PIECE_RESTITUTION;
            let v2n = ((m2 - m1) * u2n + 2.0 * m1 * u1n) / sum * PIECE_RESTITUTION;

            a.velocity = normal.scale(v1n) + tangent.scale(u1t);
            b.velocity = normal.scale(v2n) + tangent.scale(u2t);

            // Grazing contact shows up as spin; the rules never read this.
            let rel_t = u2t - u1t;
            a.angular_velocity += rel_t * SPIN_TRANSFER;
            b.angular_velocity -= rel_t * SPIN_TRANSFER;

            let overlap = min_dist - dist;
            let (inv1, inv2) = (1.0 / m1, 1.0 / m2);
            let inv_sum = inv1 + inv2;
            a.position = a.position - normal.scale(overlap * inv1 / inv_sum);
            b.position = b.position + normal.scale(overlap * inv2 / inv_sum);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
