//! Change notification seam
//!
//! The coordinator signals "match changed" through this trait; the transport
//! layer decides how to deliver it. Delivery is best-effort and asynchronous
//! relative to the transaction that triggered it — clients resync by pulling
//! full state.

use types::view::{MatchView, ScoreboardView};

/// Receiver for post-commit change notifications.
///
/// Implementations must not block: they run on the command path after the
/// store lock is released.
pub trait ChangeNotifier: Send + Sync {
    /// One match changed (point scored, undo, match started or completed).
    fn match_updated(&self, view: &MatchView);

    /// The full live scoreboard, recomputed after every successful mutation.
    fn scoreboard_refresh(&self, scoreboard: &ScoreboardView);
}

/// Notifier that drops everything. Used by tests and offline tooling.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl ChangeNotifier for NullNotifier {
    fn match_updated(&self, _view: &MatchView) {}

    fn scoreboard_refresh(&self, _scoreboard: &ScoreboardView) {}
}
