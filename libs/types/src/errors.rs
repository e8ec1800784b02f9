//! Command error taxonomy
//!
//! All command failures are value-returned, never used for control flow. A
//! failed command leaves the event log and snapshot exactly as they were.

use crate::ids::{CourtId, MatchId};
use thiserror::Error;

/// Every way a coordinator command can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("court name already in use: {name}")]
    DuplicateName { name: String },

    #[error("court not found: {court_id}")]
    CourtNotFound { court_id: CourtId },

    #[error("match not found: {match_id}")]
    MatchNotFound { match_id: MatchId },

    #[error("match is not live: {match_id}")]
    MatchNotLive { match_id: MatchId },

    /// The caller's view is stale: another device scored first. Recoverable
    /// by refetch-and-retry; carries both sequence values so the client can
    /// tell how far behind it is.
    #[error("sequence conflict: server expects {server_next_seq}, client supplied {client_supplied_seq}")]
    SequenceConflict {
        server_next_seq: u64,
        client_supplied_seq: u64,
    },

    #[error("invalid command: {message}")]
    Validation { message: String },

    /// Persistence failure. Fatal to the individual request; the transactional
    /// journal guarantees the log itself is not corrupted.
    #[error("storage failure: {message}")]
    Storage { message: String },
}

impl CommandError {
    /// Short machine-readable code for transport error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::DuplicateName { .. } => "DUPLICATE_NAME",
            CommandError::CourtNotFound { .. } => "COURT_NOT_FOUND",
            CommandError::MatchNotFound { .. } => "MATCH_NOT_FOUND",
            CommandError::MatchNotLive { .. } => "MATCH_NOT_LIVE",
            CommandError::SequenceConflict { .. } => "SEQUENCE_CONFLICT",
            CommandError::Validation { .. } => "VALIDATION_FAILURE",
            CommandError::Storage { .. } => "STORAGE_FAILURE",
        }
    }
}
