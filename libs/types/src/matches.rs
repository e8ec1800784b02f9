//! Match lifecycle types
//!
//! A match is live or complete. At most one live match exists per court at any
//! time; starting a new match on a court completes the previous one.

use crate::ids::{CourtId, MatchId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Match lifecycle status. A complete match accepts no further events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Live,
    Complete,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Live => write!(f, "live"),
            MatchStatus::Complete => write!(f, "complete"),
        }
    }
}

/// A match row: metadata only. The score itself lives in the event log and
/// its materialized snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub court_id: CourtId,
    pub team_a_name: String,
    pub team_b_name: String,
    pub status: MatchStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl MatchRecord {
    /// Create a new live match.
    pub fn new(
        court_id: CourtId,
        team_a_name: String,
        team_b_name: String,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MatchId::new(),
            court_id,
            team_a_name,
            team_b_name,
            status: MatchStatus::Live,
            started_at,
            completed_at: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == MatchStatus::Live
    }

    /// Transition to complete at the given instant.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.status = MatchStatus::Complete;
        self.completed_at = Some(at);
    }

    /// Transition back to live (undo can reopen a completed match).
    pub fn reopen(&mut self) {
        self.status = MatchStatus::Live;
        self.completed_at = None;
    }
}
