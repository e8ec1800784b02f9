//! Coordinator core
//!
//! Single authoritative writer for the scoring store. One `RwLock` guards the
//! journal + tables pair: mutating commands hold the write half, queries the
//! read half. Point entry is human-speed across at most a dozen courts, so a
//! single lock is the whole concurrency story.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use event_store::{recover, CompletedPrevious, JournalWriter, StoreOp, StoreState};
use tracing::{error, info, warn};
use types::court::{normalize_court_name, Court};
use types::errors::CommandError;
use types::event::{ScoreEvent, ScoreEventKind, TeamSide};
use types::ids::{CourtId, MatchId};
use types::matches::MatchRecord;
use types::snapshot::BestOf;
use types::view::{MatchView, ScoreboardView, Viewport};

use crate::notify::ChangeNotifier;

struct Inner {
    journal: JournalWriter,
    state: StoreState,
}

/// The single source of truth for every court's match state.
pub struct MatchCoordinator {
    inner: RwLock<Inner>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl MatchCoordinator {
    /// Open the store at `journal_path`, recovering any existing journal,
    /// and wire up the change notifier.
    pub fn open(
        journal_path: impl AsRef<Path>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Result<Self, CommandError> {
        let path: PathBuf = journal_path.as_ref().to_path_buf();
        let recovered = recover(&path).map_err(|e| CommandError::Storage {
            message: e.to_string(),
        })?;
        let mut journal = JournalWriter::open(&path)?;
        journal.set_next_sequence(recovered.next_sequence);

        Ok(Self {
            inner: RwLock::new(Inner {
                journal,
                state: recovered.state,
            }),
            notifier,
        })
    }

    // ── Commands ────────────────────────────────────────────────────

    /// Create a court. The display order is assigned as max(existing) + 1.
    pub fn create_court(&self, name: &str) -> Result<Court, CommandError> {
        let name = normalize_court_name(name).ok_or_else(|| CommandError::Validation {
            message: "court name must be 1-40 characters after trimming".to_string(),
        })?;

        let scoreboard;
        let court;
        {
            let mut inner = self.write_lock()?;
            if inner.state.court_by_name(&name).is_some() {
                return Err(CommandError::DuplicateName { name });
            }

            let now = Utc::now();
            court = Court::new(name, inner.state.next_display_order(), now);
            let op = StoreOp::CourtCreated {
                court: court.clone(),
            };
            inner.commit(&op)?;
            info!(court_id = %court.id, name = %court.name, "court created");
            scoreboard = build_scoreboard(&inner.state, None);
        }

        self.notifier.scoreboard_refresh(&scoreboard);
        Ok(court)
    }

    /// Start a match on a court, completing any live match already on it.
    pub fn start_match(
        &self,
        court_id: CourtId,
        team_a_name: &str,
        team_b_name: &str,
        best_of: BestOf,
    ) -> Result<MatchView, CommandError> {
        let team_a = normalize_team_name(team_a_name)?;
        let team_b = normalize_team_name(team_b_name)?;

        let view;
        let scoreboard;
        {
            let mut inner = self.write_lock()?;
            if inner.state.court(court_id).is_none() {
                return Err(CommandError::CourtNotFound { court_id });
            }

            let now = Utc::now();
            let completed_previous =
                inner
                    .state
                    .live_match_on_court(court_id)
                    .map(|prev| CompletedPrevious {
                        match_id: prev.id,
                        completed_at: now,
                    });
            if let Some(prev) = &completed_previous {
                info!(match_id = %prev.match_id, %court_id, "completing superseded match");
            }

            let record = MatchRecord::new(court_id, team_a, team_b, now);
            let match_id = record.id;
            let op = StoreOp::MatchStarted {
                record,
                best_of,
                completed_previous,
            };
            inner.commit(&op)?;
            info!(%match_id, %court_id, "match started");

            view = build_view(&inner.state, match_id).ok_or_else(|| storage_missing(match_id))?;
            scoreboard = build_scoreboard(&inner.state, None);
        }

        self.notifier.match_updated(&view);
        self.notifier.scoreboard_refresh(&scoreboard);
        Ok(view)
    }

    /// Score a point. With `expected_seq` supplied, the command is rejected
    /// unless it equals the sequence the event would be appended at; without
    /// it the event applies unconditionally (last writer wins).
    pub fn apply_point_event(
        &self,
        match_id: MatchId,
        winner: TeamSide,
        source_device: &str,
        expected_seq: Option<u64>,
    ) -> Result<MatchView, CommandError> {
        let view;
        let scoreboard;
        {
            let mut inner = self.write_lock()?;
            let record = inner
                .state
                .match_record(match_id)
                .ok_or(CommandError::MatchNotFound { match_id })?;
            if !record.is_live() {
                return Err(CommandError::MatchNotLive { match_id });
            }
            let snapshot = inner
                .state
                .snapshot(match_id)
                .ok_or_else(|| storage_missing(match_id))?;

            let server_next_seq = snapshot.seq + 1;
            if let Some(client_supplied_seq) = expected_seq {
                if client_supplied_seq != server_next_seq {
                    warn!(
                        %match_id,
                        server_next_seq,
                        client_supplied_seq,
                        "stale scorer rejected"
                    );
                    return Err(CommandError::SequenceConflict {
                        server_next_seq,
                        client_supplied_seq,
                    });
                }
            }

            let event = ScoreEvent::new(
                match_id,
                server_next_seq,
                ScoreEventKind::PointWon { winner },
                source_device.to_string(),
                Utc::now(),
            );
            let op = StoreOp::PointScored { event };
            inner.commit(&op)?;

            view = build_view(&inner.state, match_id).ok_or_else(|| storage_missing(match_id))?;
            scoreboard = build_scoreboard(&inner.state, None);
        }

        self.notifier.match_updated(&view);
        self.notifier.scoreboard_refresh(&scoreboard);
        Ok(view)
    }

    /// Delete the most recent event and rebuild the snapshot by full replay.
    /// A no-op (current state returned) when the log is empty.
    pub fn undo_last_event(&self, match_id: MatchId) -> Result<MatchView, CommandError> {
        let view;
        let scoreboard;
        {
            let mut inner = self.write_lock()?;
            if inner.state.match_record(match_id).is_none() {
                return Err(CommandError::MatchNotFound { match_id });
            }
            let log = inner
                .state
                .events(match_id)
                .ok_or_else(|| storage_missing(match_id))?;
            if log.is_empty() {
                return build_view(&inner.state, match_id)
                    .ok_or_else(|| storage_missing(match_id));
            }

            let op = StoreOp::LastEventUndone { match_id };
            inner.commit(&op)?;
            info!(%match_id, "last event undone");

            view = build_view(&inner.state, match_id).ok_or_else(|| storage_missing(match_id))?;
            scoreboard = build_scoreboard(&inner.state, None);
        }

        self.notifier.match_updated(&view);
        self.notifier.scoreboard_refresh(&scoreboard);
        Ok(view)
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn list_courts(&self) -> Result<Vec<Court>, CommandError> {
        let inner = self.read_lock()?;
        Ok(inner.state.courts_ordered().into_iter().cloned().collect())
    }

    /// All live matches, ordered by court display order.
    pub fn active_matches(&self) -> Result<Vec<MatchView>, CommandError> {
        let inner = self.read_lock()?;
        Ok(live_views(&inner.state, None))
    }

    pub fn match_by_id(&self, match_id: MatchId) -> Result<Option<MatchView>, CommandError> {
        let inner = self.read_lock()?;
        Ok(build_view(&inner.state, match_id))
    }

    /// Live matches for the wall, optionally filtered by court. An empty or
    /// absent filter means all courts.
    pub fn scoreboard_view(
        &self,
        court_ids: Option<&[CourtId]>,
    ) -> Result<ScoreboardView, CommandError> {
        let inner = self.read_lock()?;
        Ok(build_scoreboard(&inner.state, court_ids))
    }

    // ── Lock helpers ────────────────────────────────────────────────

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, Inner>, CommandError> {
        self.inner.write().map_err(|_| CommandError::Storage {
            message: "store lock poisoned".to_string(),
        })
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<'_, Inner>, CommandError> {
        self.inner.read().map_err(|_| CommandError::Storage {
            message: "store lock poisoned".to_string(),
        })
    }
}

impl Inner {
    /// Durably journal the op, then apply it to the tables. The journal is
    /// written first: after a crash, replay reproduces exactly the committed
    /// prefix. An apply failure after a successful append means a coordinator
    /// validation bug; it is surfaced as a storage failure, never swallowed.
    fn commit(&mut self, op: &StoreOp) -> Result<(), CommandError> {
        self.journal.append(op, Utc::now())?;
        if let Err(e) = self.state.apply_op(op) {
            error!(op = op.label(), error = %e, "journaled op failed to apply");
            return Err(e.into());
        }
        Ok(())
    }
}

// ── View assembly ───────────────────────────────────────────────────

fn build_view(state: &StoreState, match_id: MatchId) -> Option<MatchView> {
    let meta = state.match_record(match_id)?.clone();
    let snapshot = state.snapshot(match_id)?.clone();
    let display = scoring_engine::game_display(&snapshot.game);
    Some(MatchView {
        meta,
        snapshot,
        display,
    })
}

fn live_views(state: &StoreState, court_ids: Option<&[CourtId]>) -> Vec<MatchView> {
    state
        .live_matches_ordered()
        .into_iter()
        .filter(|m| match court_ids {
            Some(ids) if !ids.is_empty() => ids.contains(&m.court_id),
            _ => true,
        })
        .filter_map(|m| build_view(state, m.id))
        .collect()
}

fn build_scoreboard(state: &StoreState, court_ids: Option<&[CourtId]>) -> ScoreboardView {
    ScoreboardView {
        viewport: Viewport::default(),
        matches: live_views(state, court_ids),
    }
}

fn normalize_team_name(raw: &str) -> Result<String, CommandError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CommandError::Validation {
            message: "team name must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn storage_missing(match_id: MatchId) -> CommandError {
    CommandError::Storage {
        message: format!("snapshot missing for match {}", match_id),
    }
}

// ── Tests ───────────────────────────────────────────────────────────
