//! Game Events
//!
//! Events generated during simulation for the rendering, audio, and
//! scoring collaborators. The core emits these; it never renders or
//! plays anything itself.

use serde::{Serialize, Deserialize};
use crate::core::vec2::Vec2;
use super::piece::{PieceId, PieceKind, Seat};

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Captures processed first
    Capture = 0,
    /// Then queen status changes
    Queen = 1,
    /// Then fouls and their reversals
    Foul = 2,
    /// Then turn flow
    TurnFlow = 3,
    /// Lowest priority
    Other = 255,
}

/// Why a foul was called.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoulKind {
    /// The striker itself went into a pocket.
    StrikerPocketed,
    /// A seat cleared its last piece without the queen covered or on board.
    UncoveredFinish,
}

/// Game event data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum GameEventData {
    /// The striker was launched.
    StrikerLaunched {
        seat: Seat,
        velocity: Vec2,
    },

    /// A piece dropped into a pocket.
    PieceCaptured {
        piece_id: PieceId,
        kind: PieceKind,
        /// Pocket position, for capture effects.
        position: Vec2,
        by_seat: Seat,
    },

    /// The queen was pocketed and is pending cover.
    QueenPocketed { by_seat: Seat },

    /// The queen's cover succeeded; it stays out for the match.
    QueenCovered { by_seat: Seat },

    /// The queen returned to the board uncovered.
    QueenReturned,

    /// A foul was called; the listed pieces were returned to the board.
    Foul {
        seat: Seat,
        kind: FoulKind,
        returned: Vec<PieceId>,
    },

    /// The turn moved to the other seat.
    TurnPassed { from: Seat, to: Seat },

    /// The same seat strikes again.
    TurnContinued { seat: Seat },

    /// Match ended with a winner.
    MatchEnded { winner: Seat },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u64,

    /// Processing priority
    pub priority: EventPriority,

    /// Seat involved (for tie-breaking)
    pub seat: Option<Seat>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u64, priority: EventPriority, data: GameEventData) -> Self {
        let seat = match &data {
            GameEventData::StrikerLaunched { seat, .. } => Some(*seat),
            GameEventData::PieceCaptured { by_seat, .. } => Some(*by_seat),
            GameEventData::QueenPocketed { by_seat } => Some(*by_seat),
            GameEventData::QueenCovered { by_seat } => Some(*by_seat),
            GameEventData::QueenReturned => None,
            GameEventData::Foul { seat, .. } => Some(*seat),
            GameEventData::TurnPassed { from, .. } => Some(*from),
            GameEventData::TurnContinued { seat } => Some(*seat),
            GameEventData::MatchEnded { winner } => Some(*winner),
        };

        Self {
            tick,
            priority,
            seat,
            data,
        }
    }

    /// Create a striker launch event.
    pub fn striker_launched(tick: u64, seat: Seat, velocity: Vec2) -> Self {
        Self::new(
            tick,
            EventPriority::Other,
            GameEventData::StrikerLaunched { seat, velocity },
        )
    }

    /// Create a capture event.
    pub fn piece_captured(
        tick: u64,
        piece_id: PieceId,
        kind: PieceKind,
        position: Vec2,
        by_seat: Seat,
    ) -> Self {
        Self::new(
            tick,
            EventPriority::Capture,
            GameEventData::PieceCaptured {
                piece_id,
                kind,
                position,
                by_seat,
            },
        )
    }

    /// Create a queen pocketed (pending) event.
    pub fn queen_pocketed(tick: u64, by_seat: Seat) -> Self {
        Self::new(tick, EventPriority::Queen, GameEventData::QueenPocketed { by_seat })
    }

    /// Create a queen covered event.
    pub fn queen_covered(tick: u64, by_seat: Seat) -> Self {
        Self::new(tick, EventPriority::Queen, GameEventData::QueenCovered { by_seat })
    }

    /// Create a queen returned event.
    pub fn queen_returned(tick: u64) -> Self {
        Self::new(tick, EventPriority::Queen, GameEventData::QueenReturned)
    }

    /// Create a foul event.
    pub fn foul(tick: u64, seat: Seat, kind: FoulKind, returned: Vec<PieceId>) -> Self {
        Self::new(
            tick,
            EventPriority::Foul,
            GameEventData::Foul { seat, kind, returned },
        )
    }

    /// Create a turn passed event.
    pub fn turn_passed(tick: u64, from: Seat) -> Self {
        Self::new(
            tick,
            EventPriority::TurnFlow,
            GameEventData::TurnPassed { from, to: from.opponent() },
        )
    }

    /// Create a turn continued event.
    pub fn turn_continued(tick: u64, seat: Seat) -> Self {
        Self::new(tick, EventPriority::TurnFlow, GameEventData::TurnContinued { seat })
    }

    /// Create a match ended event.
    pub fn match_ended(tick: u64, winner: Seat) -> Self {
        Self::new(tick, EventPriority::Other, GameEventData::MatchEnded { winner })
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick
            && self.priority == other.priority
            && self.seat == other.seat
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: tick, then priority, then seat
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.seat.cmp(&other.seat))
    }
}
