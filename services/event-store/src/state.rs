//! In-memory store tables
//!
//! Courts, matches, per-match event logs, and the per-match snapshot cache.
//! All mutation goes through [`StoreState::apply_op`], the same transition the
//! recovery path replays, so a live store and a recovered store can never
//! disagree.
//!
//! `BTreeMap` throughout for deterministic iteration.

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;
use types::court::Court;
use types::errors::CommandError;
use types::event::ScoreEvent;
use types::ids::{CourtId, MatchId};
use types::matches::{MatchRecord, MatchStatus};
use types::snapshot::MatchSnapshot;

use crate::journal::StoreOp;

// ── Errors ──────────────────────────────────────────────────────────

/// Violations of store invariants. On the live path these are unreachable
/// (the coordinator validates first); during recovery they mean the journal
/// is corrupt beyond the torn-tail cases the scanner already handles.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("court name already exists: {name}")]
    DuplicateCourt { name: String },

    #[error("unknown court: {court_id}")]
    UnknownCourt { court_id: CourtId },

    #[error("unknown match: {match_id}")]
    UnknownMatch { match_id: MatchId },

    #[error("match {match_id} is not live")]
    MatchNotLive { match_id: MatchId },

    #[error("event sequence gap for match {match_id}: expected {expected}, got {got}")]
    SequenceGap {
        match_id: MatchId,
        expected: u64,
        got: u64,
    },

    #[error("missing snapshot for match {match_id}")]
    MissingSnapshot { match_id: MatchId },
}

impl From<StateError> for CommandError {
    fn from(err: StateError) -> Self {
        CommandError::Storage {
            message: err.to_string(),
        }
    }
}

// ── Store State ─────────────────────────────────────────────────────

/// The full mutable state of the scoring store.
#[derive(Debug, Default)]
pub struct StoreState {
    courts: BTreeMap<CourtId, Court>,
    /// Unique-name index over courts.
    court_names: BTreeMap<String, CourtId>,
    matches: BTreeMap<MatchId, MatchRecord>,
    /// Append-only per-match event logs, ascending by `seq`.
    events: BTreeMap<MatchId, Vec<ScoreEvent>>,
    /// Materialized current snapshot per match; always `f(events)`.
    snapshots: BTreeMap<MatchId, MatchSnapshot>,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Apply one committed operation. The only mutation entry point.
    pub fn apply_op(&mut self, op: &StoreOp) -> Result<(), StateError> {
        match op {
            StoreOp::CourtCreated { court } => self.apply_court_created(court),
            StoreOp::MatchStarted {
                record,
                best_of,
                completed_previous,
            } => self.apply_match_started(record, *best_of, completed_previous.as_ref()),
            StoreOp::PointScored { event } => self.apply_point_scored(event),
            StoreOp::LastEventUndone { match_id } => self.apply_last_event_undone(*match_id),
        }
    }

    fn apply_court_created(&mut self, court: &Court) -> Result<(), StateError> {
        if self.court_names.contains_key(&court.name) {
            return Err(StateError::DuplicateCourt {
                name: court.name.clone(),
            });
        }
        self.court_names.insert(court.name.clone(), court.id);
        self.courts.insert(court.id, court.clone());
        Ok(())
    }

    fn apply_match_started(
        &mut self,
        record: &MatchRecord,
        best_of: types::snapshot::BestOf,
        completed_previous: Option<&crate::journal::CompletedPrevious>,
    ) -> Result<(), StateError> {
        if !self.courts.contains_key(&record.court_id) {
            return Err(StateError::UnknownCourt {
                court_id: record.court_id,
            });
        }
        if let Some(prev) = completed_previous {
            let previous = self
                .matches
                .get_mut(&prev.match_id)
                .ok_or(StateError::UnknownMatch {
                    match_id: prev.match_id,
                })?;
            previous.complete(prev.completed_at);
        }

        self.matches.insert(record.id, record.clone());
        self.events.insert(record.id, Vec::new());
        self.snapshots.insert(
            record.id,
            scoring_engine::initial_snapshot(record.id, best_of, record.started_at),
        );
        Ok(())
    }

    fn apply_point_scored(&mut self, event: &ScoreEvent) -> Result<(), StateError> {
        let match_id = event.match_id;
        let record = self
            .matches
            .get_mut(&match_id)
            .ok_or(StateError::UnknownMatch { match_id })?;
        if !record.is_live() {
            return Err(StateError::MatchNotLive { match_id });
        }
        let log = self
            .events
            .get_mut(&match_id)
            .ok_or(StateError::UnknownMatch { match_id })?;
        let expected = log.len() as u64 + 1;
        if event.seq != expected {
            return Err(StateError::SequenceGap {
                match_id,
                expected,
                got: event.seq,
            });
        }
        let snapshot = self
            .snapshots
            .get(&match_id)
            .ok_or(StateError::MissingSnapshot { match_id })?;

        let next = scoring_engine::apply(snapshot, event);
        log.push(event.clone());
        if next.status == MatchStatus::Complete {
            record.complete(event.created_at);
        }
        self.snapshots.insert(match_id, next);
        Ok(())
    }

    fn apply_last_event_undone(&mut self, match_id: MatchId) -> Result<(), StateError> {
        let log = self
            .events
            .get_mut(&match_id)
            .ok_or(StateError::UnknownMatch { match_id })?;
        if log.pop().is_none() {
            // Undo on an empty log is a no-op; it is never journaled on the
            // live path, so seeing one in replay is harmless.
            return Ok(());
        }

        let record = self
            .matches
            .get(&match_id)
            .ok_or(StateError::UnknownMatch { match_id })?;
        let best_of = self
            .snapshots
            .get(&match_id)
            .ok_or(StateError::MissingSnapshot { match_id })?
            .best_of;

        // Rebuild from scratch: the snapshot is a pure function of the log.
        let initial = scoring_engine::initial_snapshot(match_id, best_of, record.started_at);
        let log = &self.events[&match_id];
        let rebuilt = scoring_engine::replay(initial, log.iter());

        let other_live_on_court = self.matches.values().any(|m| {
            m.id != match_id && m.court_id == record.court_id && m.is_live()
        });
        let record = self.matches.get_mut(&match_id).expect("checked above");
        if rebuilt.status == MatchStatus::Live && !record.is_live() {
            // Reopening must not break the one-live-match-per-court rule: a
            // match that was completed by a newer match starting on its court
            // stays complete.
            if other_live_on_court {
                warn!(%match_id, "undo left superseded match complete");
            } else {
                record.reopen();
            }
        }
        self.snapshots.insert(match_id, rebuilt);
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn court(&self, court_id: CourtId) -> Option<&Court> {
        self.courts.get(&court_id)
    }

    pub fn court_by_name(&self, name: &str) -> Option<&Court> {
        self.court_names.get(name).and_then(|id| self.courts.get(id))
    }

    /// All courts ordered by display order.
    pub fn courts_ordered(&self) -> Vec<&Court> {
        let mut courts: Vec<&Court> = self.courts.values().collect();
        courts.sort_by_key(|c| c.display_order);
        courts
    }

    /// Next display order: max(existing) + 1, starting at 1.
    pub fn next_display_order(&self) -> u32 {
        self.courts
            .values()
            .map(|c| c.display_order)
            .max()
            .map_or(1, |max| max + 1)
    }

    pub fn match_record(&self, match_id: MatchId) -> Option<&MatchRecord> {
        self.matches.get(&match_id)
    }

    pub fn snapshot(&self, match_id: MatchId) -> Option<&MatchSnapshot> {
        self.snapshots.get(&match_id)
    }

    pub fn events(&self, match_id: MatchId) -> Option<&[ScoreEvent]> {
        self.events.get(&match_id).map(|v| v.as_slice())
    }

    /// The live match on a court, if any. At most one exists.
    pub fn live_match_on_court(&self, court_id: CourtId) -> Option<&MatchRecord> {
        self.matches
            .values()
            .find(|m| m.court_id == court_id && m.is_live())
    }

    /// Live matches ordered by their court's display order.
    pub fn live_matches_ordered(&self) -> Vec<&MatchRecord> {
        let mut live: Vec<&MatchRecord> = self.matches.values().filter(|m| m.is_live()).collect();
        live.sort_by_key(|m| {
            self.courts
                .get(&m.court_id)
                .map(|c| c.display_order)
                .unwrap_or(u32::MAX)
        });
        live
    }

    /// Cross-check the cache invariant: every match has a snapshot whose
    /// `seq` equals its event count.
    pub fn verify(&self) -> Result<(), StateError> {
        for (match_id, log) in &self.events {
            let snapshot = self
                .snapshots
                .get(match_id)
                .ok_or(StateError::MissingSnapshot { match_id: *match_id })?;
            let expected = log.len() as u64;
            if snapshot.seq != expected {
                return Err(StateError::SequenceGap {
                    match_id: *match_id,
                    expected,
                    got: snapshot.seq,
                });
            }
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::CompletedPrevious;
    use chrono::Utc;
    use types::event::{ScoreEventKind, TeamSide};
    use types::snapshot::BestOf;

    fn state_with_court(name: &str) -> (StoreState, Court) {
        let mut state = StoreState::new();
        let court = Court::new(name.to_string(), state.next_display_order(), Utc::now());
        state
            .apply_op(&StoreOp::CourtCreated { court: court.clone() })
            .unwrap();
        (state, court)
    }

    fn start_match(state: &mut StoreState, court_id: CourtId) -> MatchRecord {
        let record = MatchRecord::new(court_id, "A team".into(), "B team".into(), Utc::now());
        state
            .apply_op(&StoreOp::MatchStarted {
                record: record.clone(),
                best_of: BestOf::Three,
                completed_previous: None,
            })
            .unwrap();
        record
    }

    fn point(state: &mut StoreState, match_id: MatchId, winner: TeamSide) {
        let seq = state.events(match_id).unwrap().len() as u64 + 1;
        let event = ScoreEvent::new(
            match_id,
            seq,
            ScoreEventKind::PointWon { winner },
            "test".into(),
            Utc::now(),
        );
        state.apply_op(&StoreOp::PointScored { event }).unwrap();
    }

    #[test]
    fn test_duplicate_court_name_rejected() {
        let (mut state, _) = state_with_court("Court 1");
        let dup = Court::new("Court 1".into(), 2, Utc::now());
        let err = state.apply_op(&StoreOp::CourtCreated { court: dup }).unwrap_err();
        assert!(matches!(err, StateError::DuplicateCourt { .. }));
    }

    #[test]
    fn test_display_order_is_monotonic() {
        let (mut state, _) = state_with_court("Court 1");
        assert_eq!(state.next_display_order(), 2);
        let court = Court::new("Court 2".into(), state.next_display_order(), Utc::now());
        state.apply_op(&StoreOp::CourtCreated { court }).unwrap();
        assert_eq!(state.next_display_order(), 3);

        let names: Vec<&str> = state
            .courts_ordered()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Court 1", "Court 2"]);
    }

    #[test]
    fn test_match_start_creates_empty_log_and_initial_snapshot() {
        let (mut state, court) = state_with_court("Court 1");
        let record = start_match(&mut state, court.id);

        assert_eq!(state.events(record.id).unwrap().len(), 0);
        let snap = state.snapshot(record.id).unwrap();
        assert_eq!(snap.seq, 0);
        assert_eq!(snap.server, TeamSide::A);
        state.verify().unwrap();
    }

    #[test]
    fn test_match_start_completes_previous() {
        let (mut state, court) = state_with_court("Court 1");
        let first = start_match(&mut state, court.id);

        let second = MatchRecord::new(court.id, "C".into(), "D".into(), Utc::now());
        state
            .apply_op(&StoreOp::MatchStarted {
                record: second.clone(),
                best_of: BestOf::Three,
                completed_previous: Some(CompletedPrevious {
                    match_id: first.id,
                    completed_at: Utc::now(),
                }),
            })
            .unwrap();

        assert_eq!(
            state.match_record(first.id).unwrap().status,
            MatchStatus::Complete
        );
        assert_eq!(state.live_match_on_court(court.id).unwrap().id, second.id);
        assert_eq!(state.live_matches_ordered().len(), 1);
    }

    #[test]
    fn test_point_advances_log_and_snapshot_together() {
        let (mut state, court) = state_with_court("Court 1");
        let record = start_match(&mut state, court.id);

        point(&mut state, record.id, TeamSide::A);
        point(&mut state, record.id, TeamSide::B);

        assert_eq!(state.events(record.id).unwrap().len(), 2);
        assert_eq!(state.snapshot(record.id).unwrap().seq, 2);
        state.verify().unwrap();
    }

    #[test]
    fn test_point_with_gapped_seq_rejected() {
        let (mut state, court) = state_with_court("Court 1");
        let record = start_match(&mut state, court.id);

        let event = ScoreEvent::new(
            record.id,
            5,
            ScoreEventKind::PointWon { winner: TeamSide::A },
            "test".into(),
            Utc::now(),
        );
        let err = state.apply_op(&StoreOp::PointScored { event }).unwrap_err();
        assert!(matches!(err, StateError::SequenceGap { expected: 1, got: 5, .. }));
        assert_eq!(state.events(record.id).unwrap().len(), 0);
    }

    #[test]
    fn test_match_completion_via_points() {
        let (mut state, court) = state_with_court("Court 1");
        let record = start_match(&mut state, court.id);

        // Two sets of six love games: 48 straight points for A.
        for _ in 0..48 {
            point(&mut state, record.id, TeamSide::A);
        }
        let record = state.match_record(record.id).unwrap();
        assert_eq!(record.status, MatchStatus::Complete);
        assert!(record.completed_at.is_some());
        let snap = state.snapshot(record.id).unwrap();
        assert_eq!(snap.winner, Some(TeamSide::A));
    }

    #[test]
    fn test_undo_reopens_completed_match() {
        let (mut state, court) = state_with_court("Court 1");
        let record = start_match(&mut state, court.id);
        for _ in 0..48 {
            point(&mut state, record.id, TeamSide::A);
        }
        assert!(!state.match_record(record.id).unwrap().is_live());

        state
            .apply_op(&StoreOp::LastEventUndone { match_id: record.id })
            .unwrap();

        let reopened = state.match_record(record.id).unwrap();
        assert!(reopened.is_live());
        assert!(reopened.completed_at.is_none());
        let snap = state.snapshot(record.id).unwrap();
        assert_eq!(snap.seq, 47);
        assert_eq!(snap.status, MatchStatus::Live);
        state.verify().unwrap();
    }

    #[test]
    fn test_undo_does_not_reopen_superseded_match() {
        let (mut state, court) = state_with_court("Court 1");
        let first = start_match(&mut state, court.id);
        for _ in 0..48 {
            point(&mut state, first.id, TeamSide::A);
        }
        // A new match starts on the same court while the first is complete.
        let second = MatchRecord::new(court.id, "C".into(), "D".into(), Utc::now());
        state
            .apply_op(&StoreOp::MatchStarted {
                record: second.clone(),
                best_of: BestOf::Three,
                completed_previous: None,
            })
            .unwrap();

        state
            .apply_op(&StoreOp::LastEventUndone { match_id: first.id })
            .unwrap();

        // The log rolled back but the superseded match stays complete.
        assert_eq!(state.events(first.id).unwrap().len(), 47);
        assert!(!state.match_record(first.id).unwrap().is_live());
        assert_eq!(state.live_match_on_court(court.id).unwrap().id, second.id);
    }

    #[test]
    fn test_undo_on_empty_log_is_noop() {
        let (mut state, court) = state_with_court("Court 1");
        let record = start_match(&mut state, court.id);

        state
            .apply_op(&StoreOp::LastEventUndone { match_id: record.id })
            .unwrap();
        assert_eq!(state.snapshot(record.id).unwrap().seq, 0);
    }

    #[test]
    fn test_live_matches_follow_court_display_order() {
        let (mut state, court1) = state_with_court("Court 1");
        let court2 = Court::new("Court 2".into(), state.next_display_order(), Utc::now());
        state
            .apply_op(&StoreOp::CourtCreated { court: court2.clone() })
            .unwrap();

        // Start on court 2 first; ordering must still follow display order.
        let m2 = start_match(&mut state, court2.id);
        let m1 = start_match(&mut state, court1.id);

        let ordered: Vec<MatchId> = state.live_matches_ordered().iter().map(|m| m.id).collect();
        assert_eq!(ordered, vec![m1.id, m2.id]);
    }
}
