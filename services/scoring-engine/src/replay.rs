//! Event log replay
//!
//! Rebuilding a snapshot is a pure fold of the event log over the initial
//! state. Undo relies on this: drop the last event, replay the rest.

use types::event::ScoreEvent;
use types::snapshot::MatchSnapshot;

use crate::engine::apply;

/// Fold `events` over `initial` in the order given.
///
/// Callers pass events in ascending sequence order; the log guarantees that
/// order by construction.
pub fn replay<'a, I>(initial: MatchSnapshot, events: I) -> MatchSnapshot
where
    I: IntoIterator<Item = &'a ScoreEvent>,
{
    events
        .into_iter()
        .fold(initial, |snap, event| apply(&snap, event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::initial_snapshot;
    use chrono::Utc;
    use types::event::{ScoreEventKind, TeamSide};
    use types::ids::MatchId;
    use types::snapshot::BestOf;

    fn event_log(match_id: MatchId, winners: &[TeamSide]) -> Vec<ScoreEvent> {
        winners
            .iter()
            .enumerate()
            .map(|(i, &winner)| {
                ScoreEvent::new(
                    match_id,
                    (i + 1) as u64,
                    ScoreEventKind::PointWon { winner },
                    "test".to_string(),
                    Utc::now(),
                )
            })
            .collect()
    }

    #[test]
    fn test_replay_seq_equals_event_count() {
        let match_id = MatchId::new();
        let initial = initial_snapshot(match_id, BestOf::Three, Utc::now());
        let events = event_log(match_id, &[TeamSide::A, TeamSide::B, TeamSide::A]);

        let snap = replay(initial, &events);
        assert_eq!(snap.seq, 3);
        assert_eq!(snap.game.points_a, 2);
        assert_eq!(snap.game.points_b, 1);
    }

    #[test]
    fn test_replay_is_idempotent() {
        let match_id = MatchId::new();
        let started = Utc::now();
        let events = event_log(
            match_id,
            &[TeamSide::A, TeamSide::A, TeamSide::B, TeamSide::A, TeamSide::A],
        );

        let first = replay(initial_snapshot(match_id, BestOf::Three, started), &events);
        let second = replay(initial_snapshot(match_id, BestOf::Three, started), &events);
        assert_eq!(first, second);
    }

    #[test]
    fn test_replay_without_last_event_undoes_it() {
        let match_id = MatchId::new();
        let started = Utc::now();
        let events = event_log(match_id, &[TeamSide::A, TeamSide::A, TeamSide::B]);

        let before_last = replay(
            initial_snapshot(match_id, BestOf::Three, started),
            &events[..2],
        );
        let full = replay(initial_snapshot(match_id, BestOf::Three, started), &events);
        let undone = replay(
            initial_snapshot(match_id, BestOf::Three, started),
            &events[..2],
        );

        assert_ne!(full, before_last);
        assert_eq!(undone, before_last);
    }

    #[test]
    fn test_empty_replay_is_initial() {
        let match_id = MatchId::new();
        let started = Utc::now();
        let initial = initial_snapshot(match_id, BestOf::Three, started);
        let snap = replay(initial.clone(), &[]);
        assert_eq!(snap, initial);
    }
}
