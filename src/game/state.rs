//! Match State Definitions
//!
//! The authoritative `MatchState` owns the piece arena, the turn state
//! machine, and the two players. It is created at match start from the
//! lobby's setup structure, mutated only by the tick loop and the rule
//! evaluator, and dropped at match end. Nothing here is global.

use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::vec2::Vec2;
use super::board::Board;
use super::events::GameEvent;
use super::piece::{initial_pieces, Piece, PieceId, Seat, COIN_RADIUS};

// =============================================================================
// PLAYER ID
// =============================================================================

/// Unique player identifier (UUID as bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s)
            .ok()
            .map(|u| Self(*u.as_bytes()))
    }

    /// Generate a fresh random id.
    pub fn random() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

// =============================================================================
// PLAYERS
// =============================================================================

/// One seated participant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    /// Unique player id
    pub id: PlayerId,

    /// Seat this player occupies
    pub seat: Seat,

    /// Display name from the lobby
    pub name: String,

    /// Whether this seat is driven by a bot
    pub is_bot: bool,

    /// Current score (derived from captures, see `recompute_scores`)
    pub score: u32,
}

/// Per-player entry of the lobby's match setup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerSpec {
    /// Unique player id
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Whether the seat is bot-driven
    pub is_bot: bool,
}

/// Match setup handed over by the lobby collaborator at match start.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchSetup {
    /// Match identifier
    pub match_id: [u8; 16],
    /// The two participants, indexed by seat.
    pub players: [PlayerSpec; 2],
}

// =============================================================================
// TURN STATE
// =============================================================================

/// Striker interaction phase within the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum StrikerPhase {
    /// The striker slides along the current seat's baseline.
    #[default]
    Placing,
    /// A drag gesture is in progress.
    Aiming,
    /// The striker has been launched; physics is running.
    Moving,
    /// Motion settled; the rule evaluator is deciding the outcome.
    Processing,
}

/// Where the queen stands in the cover protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum QueenStatus {
    /// On the board, capturable.
    #[default]
    OnBoard,
    /// Pocketed last turn; the owner must cover it.
    Pending {
        /// Seat that pocketed the queen.
        owner: Seat,
    },
    /// Covered; permanently out of play.
    Covered {
        /// Seat that covered the queen.
        owner: Seat,
    },
}

impl QueenStatus {
    /// True if the queen is pending cover by `seat`.
    #[inline]
    pub fn is_pending_for(self, seat: Seat) -> bool {
        matches!(self, QueenStatus::Pending { owner } if owner == seat)
    }

    /// True once the queen has been covered by either seat.
    #[inline]
    pub fn is_covered(self) -> bool {
        matches!(self, QueenStatus::Covered { .. })
    }
}

/// The turn-resolution state machine's data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnState {
    /// Seat whose turn it is.
    pub current: Seat,

    /// Striker interaction phase.
    pub striker_phase: StrikerPhase,

    /// Queen cover protocol status.
    pub queen: QueenStatus,

    /// Pocketed set snapshot from the previous evaluation; "newly
    /// pocketed" is always a set difference against this.
    pub last_pocketed: BTreeSet<PieceId>,

    /// Latest drag vector while aiming (drag start to drag current).
    pub aim_drag: Option<Vec2>,
}

impl TurnState {
    fn new(first: Seat) -> Self {
        Self {
            current: first,
            striker_phase: StrikerPhase::Placing,
            queen: QueenStatus::OnBoard,
            last_pocketed: BTreeSet::new(),
            aim_drag: None,
        }
    }
}

// =============================================================================
// MATCH PHASE
// =============================================================================

/// Lifecycle phase of the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Turns are being played.
    InProgress,
    /// Terminal state with a winner.
    Ended {
        /// The winning seat.
        winner: Seat,
    },
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete authoritative state of one match.
///
/// Exactly one instance per match advances game-affecting physics; the
/// remote participant only ever holds a read-only mirror of it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchState {
    /// Match identifier
    pub match_id: [u8; 16],

    /// Current tick
    pub tick: u64,

    /// Lifecycle phase
    pub phase: MatchPhase,

    /// Board geometry
    pub board: Board,

    /// Piece arena, indexed by `PieceId`.
    pub pieces: Vec<Piece>,

    /// Both players, indexed by seat.
    pub players: [Player; 2],

    /// Turn state machine data
    pub turn: TurnState,

    /// Monotonic capture ordinal source
    pub(crate) capture_counter: u32,

    /// Events generated since last drained (cleared each drain)
    #[serde(skip)]
    pending_events: Vec<GameEvent>,
}

impl MatchState {
    /// Create a new match from the lobby's setup. South always opens.
    pub fn new(setup: MatchSetup) -> Self {
        let board = Board::default();
        let pieces = initial_pieces(&board);
        let [south, north] = setup.players;

        Self {
            match_id: setup.match_id,
            tick: 0,
            phase: MatchPhase::InProgress,
            board,
            pieces,
            players: [
                Player {
                    id: south.id,
                    seat: Seat::South,
                    name: south.name,
                    is_bot: south.is_bot,
                    score: 0,
                },
                Player {
                    id: north.id,
                    seat: Seat::North,
                    name: north.name,
                    is_bot: north.is_bot,
                    score: 0,
                },
            ],
            turn: TurnState::new(Seat::South),
            capture_counter: 0,
            pending_events: Vec::new(),
        }
    }

    /// Get a piece by id.
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index())
    }

    /// Get a piece mutably by id.
    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id.index())
    }

    /// The striker piece.
    pub fn striker(&self) -> &Piece {
        &self.pieces[PieceId::STRIKER.index()]
    }

    /// The striker piece, mutably.
    pub fn striker_mut(&mut self) -> &mut Piece {
        &mut self.pieces[PieceId::STRIKER.index()]
    }

    /// The queen piece.
    pub fn queen(&self) -> &Piece {
        &self.pieces[PieceId::QUEEN.index()]
    }

    /// The player at a seat.
    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> &Player {
        self.player(self.turn.current)
    }

    /// Number of pieces currently on the board.
    pub fn active_count(&self) -> usize {
        self.pieces.iter().filter(|p| p.is_active()).count()
    }

    /// Number of pieces currently pocketed.
    pub fn pocketed_count(&self) -> usize {
        self.pieces.iter().filter(|p| p.pocketed).count()
    }

    /// Remaining on-board pieces of a seat's own color.
    pub fn remaining_own_color(&self, seat: Seat) -> usize {
        let color = seat.own_color();
        self.pieces
            .iter()
            .filter(|p| p.kind == color && p.is_active())
            .count()
    }

    /// The full set of currently pocketed piece ids.
    pub fn pocketed_set(&self) -> BTreeSet<PieceId> {
        self.pieces
            .iter()
            .filter(|p| p.pocketed)
            .map(|p| p.id)
            .collect()
    }

    /// True when every active piece is at complete rest.
    pub fn motion_settled(&self) -> bool {
        self.pieces
            .iter()
            .filter(|p| p.is_active())
            .all(|p| !p.is_moving())
    }

    /// Check if the match has ended.
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, MatchPhase::Ended { .. })
    }

    /// Next capture ordinal.
    pub fn next_capture_seq(&mut self) -> u32 {
        let seq = self.capture_counter;
        self.capture_counter += 1;
        seq
    }

    /// Find a free resting spot for a returned piece, starting at the
    /// board center and stepping outward until the spot overlaps no
    /// active piece. Deterministic: the probe order is fixed.
    pub fn free_spot_near_center(&self, radius: f32) -> Vec2 {
        let step = 2.0 * COIN_RADIUS + 0.3;
        let candidate_free = |pos: Vec2| {
            self.pieces.iter().filter(|p| p.is_active()).all(|p| {
                p.position.distance(pos) >= p.radius() + radius + 0.05
            })
        };

        if candidate_free(Vec2::ZERO) {
            return Vec2::ZERO;
        }
        for ring in 1..8 {
            for k in 0..8 {
                let angle = std::f32::consts::TAU * k as f32 / 8.0;
                let pos = Vec2::new(angle.cos(), angle.sin()).scale(step * ring as f32);
                if candidate_free(pos) {
                    return pos;
                }
            }
        }
        // A carrom board cannot be packed densely enough to exhaust the
        // probe rings, but fall back to the center rather than panic.
        Vec2::ZERO
    }

    /// Find a striker staging spot on a seat's baseline that rests clear
    /// of active pieces. Probes the center first, then symmetric offsets
    /// along the legal span.
    pub fn free_baseline_spot(&self, seat: Seat) -> Vec2 {
        let radius = self.striker().radius();
        let y = self.board.baseline_y(seat);
        let clear = |pos: Vec2| {
            self.pieces
                .iter()
                .filter(|p| p.is_active() && p.id != PieceId::STRIKER)
                .all(|p| p.position.distance(pos) >= p.radius() + radius + 0.05)
        };

        if clear(Vec2::new(0.0, y)) {
            return Vec2::new(0.0, y);
        }
        for k in 1..=8 {
            let dx = k as f32 * 2.5;
            for x in [dx, -dx] {
                let pos = Vec2::new(x, y);
                if clear(pos) {
                    return pos;
                }
            }
        }
        Vec2::new(0.0, y)
    }

    /// Recompute both scores from the piece arena: one point per own-color
    /// capture plus three for a covered queen. Derived rather than
    /// incremented so foul reversals never desync the tally.
    pub fn recompute_scores(&mut self) {
        let queen_bonus = match self.turn.queen {
            QueenStatus::Covered { owner } => Some(owner),
            _ => None,
        };
        for seat in [Seat::South, Seat::North] {
            let color = seat.own_color();
            let captured = self
                .pieces
                .iter()
                .filter(|p| p.kind == color && p.pocketed)
                .count() as u32;
            let bonus = if queen_bonus == Some(seat) { 3 } else { 0 };
            self.players[seat.index()].score = captured + bonus;
        }
    }

    /// Compute hash of current state for snapshot verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, |hasher| {
            hasher.update_uuid(&self.match_id);

            for piece in &self.pieces {
                hasher.update_u8(piece.id.0);
                hasher.update_u8(piece.kind as u8);
                hasher.update_vec2(piece.position);
                hasher.update_vec2(piece.velocity);
                hasher.update_f32(piece.orientation);
                hasher.update_f32(piece.angular_velocity);
                hasher.update_bool(piece.pocketed);
                hasher.update_u32(piece.captured_seq.map_or(u32::MAX, |s| s));
            }

            hasher.update_u8(self.turn.current as u8);
            hasher.update_u8(match self.turn.striker_phase {
                StrikerPhase::Placing => 0,
                StrikerPhase::Aiming => 1,
                StrikerPhase::Moving => 2,
                StrikerPhase::Processing => 3,
            });
            match self.turn.queen {
                QueenStatus::OnBoard => hasher.update_u8(0),
                QueenStatus::Pending { owner } => {
                    hasher.update_u8(1);
                    hasher.update_u8(owner as u8);
                }
                QueenStatus::Covered { owner } => {
                    hasher.update_u8(2);
                    hasher.update_u8(owner as u8);
                }
            }
            for id in &self.turn.last_pocketed {
                hasher.update_u8(id.0);
            }

            for player in &self.players {
                hasher.update_uuid(&player.id.0);
                hasher.update_u32(player.score);
            }

            match self.phase {
                MatchPhase::InProgress => hasher.update_u8(0),
                MatchPhase::Ended { winner } => {
                    hasher.update_u8(1);
                    hasher.update_u8(winner as u8);
                }
            }
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

/// Build a minimal two-player setup, useful for tests and the demo.
pub fn quick_setup(match_id: [u8; 16]) -> MatchSetup {
    MatchSetup {
        match_id,
        players: [
            PlayerSpec {
                id: PlayerId::new([1; 16]),
                name: "south".into(),
                is_bot: false,
            },
            PlayerSpec {
                id: PlayerId::new([2; 16]),
                name: "north".into(),
                is_bot: false,
            },
        ],
    }
}

// =============================================================================
// TESTS
// =============================================================================
