//! Pieces
//!
//! The piece arena: stable small-integer ids, a closed kind enum carrying
//! the per-kind radius and mass, and the opening rosette layout.

use std::f32::consts::TAU;
use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use super::board::{Board, ROSETTE_INNER_RADIUS, ROSETTE_OUTER_RADIUS};

/// Total pieces per match: 1 striker + 1 queen + 9 light + 9 dark.
pub const PIECE_COUNT: usize = 20;

/// Number of colored pieces per seat.
pub const PIECES_PER_SEAT: usize = 9;

/// Striker radius (larger than the colored pieces).
pub const STRIKER_RADIUS: f32 = 2.1;

/// Radius of the queen and the colored pieces.
pub const COIN_RADIUS: f32 = 1.6;

/// Striker mass (heavier than the colored pieces).
pub const STRIKER_MASS: f32 = 15.0;

/// Mass of the queen and the colored pieces.
pub const COIN_MASS: f32 = 5.5;

// =============================================================================
// SEAT
// =============================================================================

/// One of the two player seats.
///
/// `South` shoots from the bottom baseline, `North` from the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum Seat {
    /// Seat index 0, bottom baseline, owns the light pieces.
    #[default]
    South = 0,
    /// Seat index 1, top baseline, owns the dark pieces.
    North = 1,
}

impl Seat {
    /// The other seat.
    #[inline]
    pub fn opponent(self) -> Seat {
        match self {
            Seat::South => Seat::North,
            Seat::North => Seat::South,
        }
    }

    /// Array index for seat-keyed storage.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The piece color this seat must clear.
    #[inline]
    pub fn own_color(self) -> PieceKind {
        match self {
            Seat::South => PieceKind::Light,
            Seat::North => PieceKind::Dark,
        }
    }

    /// Get seat from index (0 or 1).
    pub fn from_index(index: u8) -> Option<Seat> {
        match index {
            0 => Some(Seat::South),
            1 => Some(Seat::North),
            _ => None,
        }
    }
}

// =============================================================================
// PIECE KIND
// =============================================================================

/// Closed set of piece kinds. Radius and mass are fixed per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PieceKind {
    /// The launched piece, heavier and larger than the rest.
    Striker = 0,
    /// The high-value piece that must be covered to count.
    Queen = 1,
    /// Colored pieces belonging to the south seat.
    Light = 2,
    /// Colored pieces belonging to the north seat.
    Dark = 3,
}

impl PieceKind {
    /// Collision radius for this kind.
    #[inline]
    pub fn radius(self) -> f32 {
        match self {
            PieceKind::Striker => STRIKER_RADIUS,
            _ => COIN_RADIUS,
        }
    }

    /// Mass for this kind.
    #[inline]
    pub fn mass(self) -> f32 {
        match self {
            PieceKind::Striker => STRIKER_MASS,
            _ => COIN_MASS,
        }
    }

    /// The seat that owns this color, if it is a colored kind.
    #[inline]
    pub fn owner(self) -> Option<Seat> {
        match self {
            PieceKind::Light => Some(Seat::South),
            PieceKind::Dark => Some(Seat::North),
            _ => None,
        }
    }
}

// =============================================================================
// PIECE ID
// =============================================================================

/// Stable arena index of a piece, 0..20.
///
/// Ids are assigned once at match start and never reused; the striker is
/// always id 0 and the queen id 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u8);

impl PieceId {
    /// The striker's fixed id.
    pub const STRIKER: PieceId = PieceId(0);

    /// The queen's fixed id.
    pub const QUEEN: PieceId = PieceId(1);

    /// Array index into the piece arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// =============================================================================
// PIECE
// =============================================================================

/// State of a single piece.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Piece {
    /// Stable arena id
    pub id: PieceId,

    /// Kind (determines radius and mass)
    pub kind: PieceKind,

    /// Center position in board units
    pub position: Vec2,

    /// Linear velocity in board units per tick
    pub velocity: Vec2,

    /// Orientation in radians (visual spin only)
    pub orientation: f32,

    /// Angular velocity in radians per tick
    pub angular_velocity: f32,

    /// Captured flag. A pocketed piece is excluded from integration and
    /// collision until explicitly returned by the rules.
    pub pocketed: bool,

    /// Monotonic capture ordinal, set when pocketed. Resolves
    /// least/most-recently-captured queries in the foul rules.
    pub captured_seq: Option<u32>,
}

impl Piece {
    /// Create a resting piece at a position.
    pub fn new(id: PieceId, kind: PieceKind, position: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            orientation: 0.0,
            angular_velocity: 0.0,
            pocketed: false,
            captured_seq: None,
        }
    }

    /// Collision radius.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.kind.radius()
    }

    /// Mass.
    #[inline]
    pub fn mass(&self) -> f32 {
        self.kind.mass()
    }

    /// A piece participates in physics only while on the board.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.pocketed
    }

    /// True while the piece has any linear or angular motion.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.velocity != Vec2::ZERO || self.angular_velocity != 0.0
    }

    /// Bring the piece to a complete stop.
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
    }

    /// Return a pocketed piece to the board at `position`, at rest.
    pub fn return_to_board(&mut self, position: Vec2) {
        self.pocketed = false;
        self.captured_seq = None;
        self.position = position;
        self.stop();
    }
}

// =============================================================================
// OPENING LAYOUT
// =============================================================================

/// Build the opening arrangement: striker on the south baseline, queen at
/// the center, six pieces in an inner ring and twelve in a staggered outer
/// ring, colors alternating so each seat gets nine.
pub fn initial_pieces(board: &Board) -> Vec<Piece> {
    let mut pieces = Vec::with_capacity(PIECE_COUNT);

    pieces.push(Piece::new(
        PieceId::STRIKER,
        PieceKind::Striker,
        board.baseline_position(Seat::South, 0.0),
    ));
    pieces.push(Piece::new(PieceId::QUEEN, PieceKind::Queen, Vec2::ZERO));

    let mut next_id = 2u8;
    let mut push_ring = |count: u32, radius: f32, stagger: f32, first: PieceKind| {
        for i in 0..count {
            let angle = TAU * i as f32 / count as f32 + stagger;
            let kind = if i % 2 == 0 { first } else { other_color(first) };
            let position = Vec2::new(angle.cos(), angle.sin()).scale(radius);
            pieces.push(Piece::new(PieceId(next_id), kind, position));
            next_id += 1;
        }
    };

    // Inner ring: 3 light + 3 dark. Outer ring: 6 of each, offset half a
    // slot so no piece sits radially behind an inner one.
    push_ring(6, ROSETTE_INNER_RADIUS, 0.0, PieceKind::Light);
    push_ring(12, ROSETTE_OUTER_RADIUS, TAU / 24.0, PieceKind::Dark);

    pieces
}

fn other_color(kind: PieceKind) -> PieceKind {
    match kind {
        PieceKind::Light => PieceKind::Dark,
        _ => PieceKind::Light,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_opponent() {
        assert_eq!(Seat::South.opponent(), Seat::North);
        assert_eq!(Seat::North.opponent(), Seat::South);
    }

    #[test]
    fn test_seat_colors() {
        assert_eq!(Seat::South.own_color(), PieceKind::Light);
        assert_eq!(Seat::North.own_color(), PieceKind::Dark);
        assert_eq!(PieceKind::Light.owner(), Some(Seat::South));
        assert_eq!(PieceKind::Dark.owner(), Some(Seat::North));
        assert_eq!(PieceKind::Striker.owner(), None);
        assert_eq!(PieceKind::Queen.owner(), None);
    }

    #[test]
    fn test_striker_heavier_and_larger() {
        assert!(PieceKind::Striker.radius() > PieceKind::Light.radius());
        assert!(PieceKind::Striker.mass() > PieceKind::Dark.mass());
        assert_eq!(PieceKind::Queen.radius(), PieceKind::Light.radius());
    }

    #[test]
    fn test_initial_layout_counts() {
        let pieces = initial_pieces(&Board::default());
        assert_eq!(pieces.len(), PIECE_COUNT);

        let count_of = |kind: PieceKind| pieces.iter().filter(|p| p.kind == kind).count();
        assert_eq!(count_of(PieceKind::Striker), 1);
        assert_eq!(count_of(PieceKind::Queen), 1);
        assert_eq!(count_of(PieceKind::Light), PIECES_PER_SEAT);
        assert_eq!(count_of(PieceKind::Dark), PIECES_PER_SEAT);
    }

    #[test]
    fn test_initial_ids_stable() {
        let pieces = initial_pieces(&Board::default());
        for (i, piece) in pieces.iter().enumerate() {
            assert_eq!(piece.id.index(), i);
        }
        assert_eq!(pieces[0].kind, PieceKind::Striker);
        assert_eq!(pieces[1].kind, PieceKind::Queen);
    }

    #[test]
    fn test_initial_layout_no_overlap() {
        let pieces = initial_pieces(&Board::default());
        // The striker sits on the baseline away from the rosette, but check
        // every pair anyway.
        for i in 0..pieces.len() {
            for j in (i + 1)..pieces.len() {
                let a = &pieces[i];
                let b = &pieces[j];
                let min_dist = a.radius() + b.radius();
                assert!(
                    a.position.distance(b.position) >= min_dist - 1e-4,
                    "pieces {i} and {j} overlap in the opening layout"
                );
            }
        }
    }

    #[test]
    fn test_return_to_board() {
        let mut piece = Piece::new(PieceId(5), PieceKind::Light, Vec2::new(3.0, 3.0));
        piece.pocketed = true;
        piece.captured_seq = Some(7);
        piece.velocity = Vec2::new(1.0, 0.0);

        piece.return_to_board(Vec2::ZERO);
        assert!(piece.is_active());
        assert_eq!(piece.captured_seq, None);
        assert_eq!(piece.position, Vec2::ZERO);
        assert!(!piece.is_moving());
    }
}
