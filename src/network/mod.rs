//! Network Projection
//!
//! The boundary the core honors toward the transport collaborator: wire
//! message shapes, codecs, validated intent application, and the
//! read-only mirror. No sockets live here - byte delivery belongs to the
//! host.

pub mod protocol;
pub mod sync;

pub use protocol::{
    AuthorityMessage, ClientIntent, IntentKind, PieceSnapshot, ProtocolError,
    StateSnapshot,
};
pub use sync::{
    ApplyOutcome, DropReason, IntentDisposition, IntentGate, Mirror,
    SnapshotProducer,
};
