//! Core simulation primitives.
//!
//! Vector math and state hashing shared by the game logic and the
//! network projection.

pub mod vec2;
pub mod hash;

// Re-export core types
pub use vec2::Vec2;
pub use hash::{StateHash, StateHasher, compute_state_hash};
