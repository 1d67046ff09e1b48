//! In-memory storage backend for the Fluzio proof engine.
//!
//! Implements every trait from `fluzio-store` over mutex-guarded maps, one
//! lock per table. State survives restarts through whole-store JSON
//! snapshots written atomically (temp file + rename).

pub mod snapshot;
pub mod store;

pub use snapshot::Snapshot;
pub use store::MemoryStore;
