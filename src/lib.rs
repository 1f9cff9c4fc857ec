//! # Carrom Core
//!
//! Authoritative physics and rules core for a networked two-player
//! carrom match.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       CARROM CORE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Simulation primitives                     │
//! │  ├── vec2.rs     - 2D vector math                            │
//! │  └── hash.rs     - State hashing for snapshot integrity      │
//! │                                                              │
//! │  game/           - Game logic (authority only)               │
//! │  ├── board.rs    - Geometry and physics coefficients         │
//! │  ├── piece.rs    - Piece arena and opening layout            │
//! │  ├── state.rs    - Match, turn, and player state             │
//! │  ├── physics.rs  - Sub-stepped integrator                    │
//! │  ├── collision.rs- Walls, pockets, piece-piece response      │
//! │  ├── aim.rs      - Drag gesture to launch vector             │
//! │  ├── input.rs    - Validated player actions                  │
//! │  ├── rules.rs    - Fouls, queen protocol, win gate           │
//! │  ├── tick.rs     - Per-tick orchestration                    │
//! │  └── events.rs   - Event stream for collaborators            │
//! │                                                              │
//! │  network/        - Network projection (no sockets)           │
//! │  ├── protocol.rs - Intent and snapshot wire types + codecs   │
//! │  └── sync.rs     - Intent gate, snapshot producer, mirror    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Authority Model
//!
//! Exactly one participant - the authority - advances the physics and
//! the turn state machine; its results are canonical. The other
//! participant submits placement/aim/release intents and holds a
//! read-only mirror that is overwritten wholesale by each full-state
//! snapshot. Divergence repair is "last snapshot wins": a corrupt or
//! missing snapshot is answered by requesting a fresh one, never by
//! patching.
//!
//! Rendering, audio, the lobby, and the transport that carries message
//! bytes are external collaborators; this crate defines the interfaces
//! they consume and nothing more.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use crate::core::vec2::Vec2;
pub use crate::core::hash::{StateHash, StateHasher};
pub use crate::game::input::{ActionError, PlayerAction};
pub use crate::game::piece::{Piece, PieceId, PieceKind, Seat};
pub use crate::game::state::{MatchSetup, MatchState, Player, PlayerId, QueenStatus, StrikerPhase};
pub use crate::game::tick::{tick, TickResult};
pub use crate::network::{ClientIntent, IntentGate, Mirror, SnapshotProducer, StateSnapshot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz), matched to display refresh.
pub const TICK_RATE: u32 = 60;
