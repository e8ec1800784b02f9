//! Event Store
//!
//! Durable, ordered storage for the scoring system: an append-only operation
//! journal on disk, in-memory tables for courts, matches, per-match event
//! logs, and the per-match snapshot cache, plus crash recovery that rebuilds
//! everything by replay.
//!
//! The journal is the single source of truth. Snapshots are never persisted;
//! they are rebuilt from the log on boot, so an event can never exist without
//! its snapshot update or vice versa.

pub mod journal;
pub mod recovery;
pub mod state;

pub use journal::{CompletedPrevious, JournalError, JournalWriter, StoreOp};
pub use recovery::{recover, Recovered, RecoveryError};
pub use state::{StateError, StoreState};
