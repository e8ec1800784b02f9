//! Match Coordinator
//!
//! Orchestrates court and match lifecycle over the event store: validates
//! commands, applies the optimistic-concurrency sequence protocol, performs
//! undo-by-replay, and pushes change notifications to the fan-out seam.
//!
//! Every mutating command is one transaction: journal append first, then the
//! in-memory tables, under a single write lock. Readers share the lock, so
//! they never observe a half-applied command.

pub mod coordinator;
pub mod notify;

pub use coordinator::MatchCoordinator;
pub use notify::{ChangeNotifier, NullNotifier};
