//! Score event log entries
//!
//! Events are the sole ground truth of match history. They are immutable once
//! written; the only mutation the log permits is deleting the single
//! most-recent event (undo).

use crate::ids::{EventId, MatchId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    A,
    B,
}

impl TeamSide {
    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::A => TeamSide::B,
            TeamSide::B => TeamSide::A,
        }
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamSide::A => write!(f, "A"),
            TeamSide::B => write!(f, "B"),
        }
    }
}

/// Closed set of score event kinds. New kinds (fault, timeout, ...) extend the
/// engine through exhaustive matching rather than ad hoc branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreEventKind {
    PointWon { winner: TeamSide },
}

impl ScoreEventKind {
    /// Event kind as a string label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            ScoreEventKind::PointWon { .. } => "point_won",
        }
    }
}

/// A single entry in a match's append-only event log.
///
/// `seq` is 1-based, strictly increasing per match with no gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub id: EventId,
    pub match_id: MatchId,
    pub seq: u64,
    pub kind: ScoreEventKind,
    pub source_device: String,
    pub created_at: DateTime<Utc>,
}

impl ScoreEvent {
    pub fn new(
        match_id: MatchId,
        seq: u64,
        kind: ScoreEventKind,
        source_device: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::new(),
            match_id,
            seq,
            kind,
            source_device,
            created_at,
        }
    }
}

/// Events order by per-match sequence number.
impl Ord for ScoreEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.seq.cmp(&other.seq)
    }
}

impl PartialOrd for ScoreEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(seq: u64) -> ScoreEvent {
        ScoreEvent::new(
            MatchId::new(),
            seq,
            ScoreEventKind::PointWon { winner: TeamSide::A },
            "scorer-1".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_opponent() {
        assert_eq!(TeamSide::A.opponent(), TeamSide::B);
        assert_eq!(TeamSide::B.opponent(), TeamSide::A);
    }

    #[test]
    fn test_events_sort_by_sequence() {
        let mut events = vec![sample_event(3), sample_event(1), sample_event(2)];
        events.sort();
        let seqs: Vec<u64> = events.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let e = sample_event(1);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"]["point_won"]["winner"], "A");
    }

    #[test]
    fn test_event_serialization_roundtrip() {
        let e = sample_event(7);
        let json = serde_json::to_string(&e).unwrap();
        let decoded: ScoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(e, decoded);
    }
}
