//! Game Logic Module
//!
//! The complete carrom simulation. Only the authoritative side runs this
//! against game-affecting state.
//!
//! ## Module Structure
//!
//! - `board`: Board geometry and physics coefficients
//! - `piece`: Piece arena, kinds, opening layout
//! - `state`: Match, turn, and player state
//! - `physics`: Sub-stepped integrator
//! - `collision`: Wall, pocket, and piece-piece resolution
//! - `aim`: Drag gesture to launch vector
//! - `input`: Validated player actions
//! - `rules`: End-of-turn evaluation (fouls, queen, win gate)
//! - `tick`: Per-tick orchestration
//! - `events`: Event stream for rendering/audio collaborators

pub mod board;
pub mod piece;
pub mod state;
pub mod physics;
pub mod collision;
pub mod aim;
pub mod input;
pub mod rules;
pub mod tick;
pub mod events;

// Re-export key types
pub use board::Board;
pub use piece::{Piece, PieceId, PieceKind, Seat};
pub use state::{MatchSetup, MatchState, Player, PlayerId, QueenStatus, StrikerPhase, TurnState};
pub use input::{ActionError, PlayerAction};
pub use rules::TurnOutcome;
pub use tick::TickResult;
pub use events::GameEvent;
