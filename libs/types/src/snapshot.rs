//! Materialized match state
//!
//! A snapshot is a cache over the event log, never an independent source of
//! truth: `seq` always equals the number of events in the log, and the
//! snapshot must be re-derivable from the log at any time.

use crate::event::TeamSide;
use crate::ids::MatchId;
use crate::matches::MatchStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Best-of-N set format. Only 3 and 5 are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BestOf {
    Three,
    Five,
}

impl BestOf {
    /// Sets required to win the match: floor(best_of / 2) + 1.
    pub fn required_sets(self) -> u32 {
        match self {
            BestOf::Three => 2,
            BestOf::Five => 3,
        }
    }
}

impl Default for BestOf {
    fn default() -> Self {
        BestOf::Three
    }
}

impl TryFrom<u8> for BestOf {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(BestOf::Three),
            5 => Ok(BestOf::Five),
            other => Err(format!("best_of must be 3 or 5, got {}", other)),
        }
    }
}

impl From<BestOf> for u8 {
    fn from(value: BestOf) -> Self {
        match value {
            BestOf::Three => 3,
            BestOf::Five => 5,
        }
    }
}

/// Games won by each side within one set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScore {
    pub games_a: u32,
    pub games_b: u32,
}

impl SetScore {
    pub fn games(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::A => self.games_a,
            TeamSide::B => self.games_b,
        }
    }
}

/// Raw point counters within the current game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameScore {
    pub points_a: u32,
    pub points_b: u32,
}

impl GameScore {
    pub fn points(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::A => self.points_a,
            TeamSide::B => self.points_b,
        }
    }
}

/// The materialized current state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_id: MatchId,
    pub status: MatchStatus,
    /// Ordered sets; sets before `current_set` are finished.
    pub sets: Vec<SetScore>,
    pub current_set: usize,
    pub game: GameScore,
    pub server: TeamSide,
    pub best_of: BestOf,
    /// Count of events applied; equals the length of the match's event log.
    pub seq: u64,
    pub winner: Option<TeamSide>,
    pub updated_at: DateTime<Utc>,
}

impl MatchSnapshot {
    /// Sets won by `side` among finished sets. The set at `current_set`
    /// counts only once the match is complete.
    pub fn sets_won(&self, side: TeamSide) -> u32 {
        let finished = if self.status == MatchStatus::Complete {
            self.current_set + 1
        } else {
            self.current_set
        };
        self.sets
            .iter()
            .take(finished)
            .filter(|s| s.games(side) > s.games(side.opponent()))
            .count() as u32
    }
}
