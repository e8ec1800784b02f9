//! Crash recovery — rebuild the store by journal replay
//!
//! Boot sequence:
//! 1. Scan the journal, verifying checksums; drop a torn tail record.
//! 2. Re-apply every operation to a fresh [`StoreState`] — this rebuilds the
//!    tables and re-derives every snapshot through the scoring engine.
//! 3. Cross-check the snapshot/log sequence invariant.
//!
//! Because snapshots are never read from disk, a crash can never leave an
//! appended event without its snapshot update (or the reverse).

use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::journal::{self, JournalError};
use crate::state::{StateError, StoreState};

#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("replay error at journal seq {sequence}: {source}")]
    Replay {
        sequence: u64,
        #[source]
        source: StateError,
    },

    #[error("state verification failed after replay: {0}")]
    Verification(#[from] StateError),
}

/// Outcome of a successful recovery.
pub struct Recovered {
    pub state: StoreState,
    /// The journal sequence the writer should continue from.
    pub next_sequence: u64,
}

/// Rebuild store state from the journal at `path`.
pub fn recover(path: &Path) -> Result<Recovered, RecoveryError> {
    let outcome = journal::scan(path)?;
    if let Some(tail) = &outcome.torn_tail {
        warn!(
            offset = tail.offset,
            detail = %tail.detail,
            "dropping torn journal tail"
        );
    }

    let mut state = StoreState::new();
    let mut next_sequence = 1u64;
    let replayed = outcome.ops.len();
    for (sequence, op) in outcome.ops {
        state
            .apply_op(&op)
            .map_err(|source| RecoveryError::Replay { sequence, source })?;
        next_sequence = sequence + 1;
    }

    state.verify()?;
    info!(replayed, next_sequence, "store recovered from journal");

    Ok(Recovered {
        state,
        next_sequence,
    })
}

// ── Tests ───────────────────────────────────────────────────────────
