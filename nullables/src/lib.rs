//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies of the engine (wall-clock time and the external
//! review API) sit behind traits. The implementations here return scripted
//! values, can be driven from a test, and never touch the network.

pub mod clock;
pub mod probe;

pub use clock::NullClock;
pub use probe::NullProbe;
