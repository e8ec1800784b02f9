//! Operation journal — append-only log with checksums
//!
//! One record per committed store transaction. Multi-row transactions (a
//! match start that also completes the previous match on the court) are a
//! single record, which is what makes them atomic across a crash.
//!
//! # Binary format (per record)
//! ```text
//! [body_len:  u32]
//! [sequence:  u64]   global monotonic journal sequence, 1-based
//! [timestamp: i64]   unix microseconds, diagnostic only
//! [payload_len: u32][payload: bincode(StoreOp)]
//! [checksum: u32]    CRC32C over sequence + timestamp + payload
//! ```

use chrono::{DateTime, Utc};
use crc32c::crc32c;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use types::errors::CommandError;
use types::event::ScoreEvent;
use types::ids::MatchId;
use types::matches::MatchRecord;
use types::snapshot::BestOf;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("journal corrupt at byte offset {offset}: {detail}")]
    Corrupt { offset: u64, detail: String },

    #[error("journal sequence gap: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },
}

impl From<JournalError> for CommandError {
    fn from(err: JournalError) -> Self {
        CommandError::Storage {
            message: err.to_string(),
        }
    }
}

// ── Store Operations ────────────────────────────────────────────────

/// Previous live match completed as part of starting a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedPrevious {
    pub match_id: MatchId,
    pub completed_at: DateTime<Utc>,
}

/// A committed store transaction. Replaying these in journal order rebuilds
/// the whole store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreOp {
    CourtCreated {
        court: types::court::Court,
    },
    MatchStarted {
        record: MatchRecord,
        best_of: BestOf,
        completed_previous: Option<CompletedPrevious>,
    },
    PointScored {
        event: ScoreEvent,
    },
    LastEventUndone {
        match_id: MatchId,
    },
}

impl StoreOp {
    /// Operation label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            StoreOp::CourtCreated { .. } => "court_created",
            StoreOp::MatchStarted { .. } => "match_started",
            StoreOp::PointScored { .. } => "point_scored",
            StoreOp::LastEventUndone { .. } => "last_event_undone",
        }
    }
}

// ── Journal Record ──────────────────────────────────────────────────

/// A single framed record in the journal file.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalRecord {
    pub sequence: u64,
    pub timestamp: i64,
    pub payload: Vec<u8>,
    pub checksum: u32,
}

impl JournalRecord {
    pub fn new(sequence: u64, timestamp: i64, payload: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(sequence, timestamp, &payload);
        Self {
            sequence,
            timestamp,
            payload,
            checksum,
        }
    }

    fn compute_checksum(sequence: u64, timestamp: i64, payload: &[u8]) -> u32 {
        let mut buf = Vec::with_capacity(16 + payload.len());
        buf.extend_from_slice(&sequence.to_le_bytes());
        buf.extend_from_slice(&timestamp.to_le_bytes());
        buf.extend_from_slice(payload);
        crc32c(&buf)
    }

    pub fn verify_checksum(&self) -> bool {
        Self::compute_checksum(self.sequence, self.timestamp, &self.payload) == self.checksum
    }

    /// Decode the payload back into a store operation.
    pub fn decode_op(&self) -> Result<StoreOp, JournalError> {
        bincode::deserialize(&self.payload).map_err(|e| JournalError::Encode(e.to_string()))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let payload_len = self.payload.len() as u32;
        // body = 8 (seq) + 8 (ts) + 4 (payload_len) + payload + 4 (crc)
        let body_len: u32 = 8 + 8 + 4 + payload_len + 4;

        let mut buf = Vec::with_capacity(4 + body_len as usize);
        buf.extend_from_slice(&body_len.to_le_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&payload_len.to_le_bytes());
        buf.extend_from_slice(&self.payload);
        buf.extend_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    /// Decode one record from `data`, returning `(record, bytes_consumed)`.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), JournalError> {
        let fail = |detail: String| JournalError::Corrupt { offset: 0, detail };

        if data.len() < 4 {
            return Err(fail("not enough data for length prefix".into()));
        }
        let body_len = u32::from_le_bytes(data[0..4].try_into().unwrap()) as usize;

        // Smallest body: empty payload. Reject absurd lengths as corruption.
        if body_len < 24 || body_len > 16_000_000 {
            return Err(fail(format!("implausible body length {}", body_len)));
        }
        let total = 4 + body_len;
        if data.len() < total {
            return Err(fail(format!(
                "incomplete record: need {} bytes, have {}",
                total,
                data.len()
            )));
        }

        let body = &data[4..total];
        let sequence = u64::from_le_bytes(body[0..8].try_into().unwrap());
        let timestamp = i64::from_le_bytes(body[8..16].try_into().unwrap());
        let payload_len = u32::from_le_bytes(body[16..20].try_into().unwrap()) as usize;
        if 20 + payload_len + 4 != body.len() {
            return Err(fail(format!(
                "payload length {} disagrees with body length {}",
                payload_len, body_len
            )));
        }
        let payload = body[20..20 + payload_len].to_vec();
        let checksum = u32::from_le_bytes(body[20 + payload_len..].try_into().unwrap());

        Ok((
            Self {
                sequence,
                timestamp,
                payload,
                checksum,
            },
            total,
        ))
    }
}

// ── Journal Writer ──────────────────────────────────────────────────

/// Append-only journal writer. Every append is flushed and fsynced before it
/// returns; a record that made it back to the caller is durable.
pub struct JournalWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    next_sequence: u64,
}

impl JournalWriter {
    /// Open the journal file for appending, creating parent directories as
    /// needed. The caller sets the next sequence after recovery.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            next_sequence: 1,
        })
    }

    pub fn set_next_sequence(&mut self, seq: u64) {
        self.next_sequence = seq;
    }

    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one operation durably. Returns the record's journal sequence.
    pub fn append(&mut self, op: &StoreOp, at: DateTime<Utc>) -> Result<u64, JournalError> {
        let payload = bincode::serialize(op).map_err(|e| JournalError::Encode(e.to_string()))?;
        let record = JournalRecord::new(self.next_sequence, at.timestamp_micros(), payload);

        self.writer.write_all(&record.to_bytes())?;
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;

        let seq = self.next_sequence;
        self.next_sequence += 1;
        Ok(seq)
    }
}

// ── Journal Scan ────────────────────────────────────────────────────

/// A torn or corrupt tail found while scanning. Everything before it was
/// read and verified; everything from `offset` on is discarded.
#[derive(Debug, Clone)]
pub struct TornTail {
    pub offset: u64,
    pub detail: String,
}

/// Result of scanning a journal file.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Verified operations in journal order.
    pub ops: Vec<(u64, StoreOp)>,
    /// Present when the file ended in an unreadable record.
    pub torn_tail: Option<TornTail>,
}

/// Read and verify every record in the journal.
///
/// A missing file is an empty journal. A record that fails to frame or
/// checksum terminates the scan: an interrupted final write is expected
/// after a crash, so the valid prefix is returned and the tail reported.
/// A sequence gap inside the valid prefix is real corruption and is an error.
pub fn scan(path: &Path) -> Result<ScanOutcome, JournalError> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(ScanOutcome {
                ops: Vec::new(),
                torn_tail: None,
            })
        }
        Err(e) => return Err(e.into()),
    };

    let mut ops = Vec::new();
    let mut pos = 0usize;
    let mut expected_seq = 1u64;

    while pos < data.len() {
        match JournalRecord::from_bytes(&data[pos..]) {
            Ok((record, consumed)) => {
                if !record.verify_checksum() {
                    return Ok(ScanOutcome {
                        ops,
                        torn_tail: Some(TornTail {
                            offset: pos as u64,
                            detail: format!("checksum mismatch for seq={}", record.sequence),
                        }),
                    });
                }
                if record.sequence != expected_seq {
                    return Err(JournalError::SequenceGap {
                        expected: expected_seq,
                        got: record.sequence,
                    });
                }
                let op = match record.decode_op() {
                    Ok(op) => op,
                    Err(_) => {
                        return Ok(ScanOutcome {
                            ops,
                            torn_tail: Some(TornTail {
                                offset: pos as u64,
                                detail: format!("undecodable payload at seq={}", record.sequence),
                            }),
                        })
                    }
                };
                ops.push((record.sequence, op));
                expected_seq += 1;
                pos += consumed;
            }
            Err(_) => {
                return Ok(ScanOutcome {
                    ops,
                    torn_tail: Some(TornTail {
                        offset: pos as u64,
                        detail: format!("unparseable record, {} bytes remaining", data.len() - pos),
                    }),
                });
            }
        }
    }

    Ok(ScanOutcome {
        ops,
        torn_tail: None,
    })
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use types::ids::CourtId;

    // Alternate op shapes so payload sizes vary across records.
    fn sample_op(n: u64) -> StoreOp {
        if n % 2 == 0 {
            StoreOp::CourtCreated {
                court: types::court::Court::new(format!("Court {}", n), n as u32, Utc::now()),
            }
        } else {
            StoreOp::LastEventUndone {
                match_id: MatchId::new(),
            }
        }
    }

    #[test]
    fn test_record_checksum_roundtrip() {
        let record = JournalRecord::new(1, 123_456, vec![1, 2, 3]);
        assert!(record.verify_checksum());

        let bytes = record.to_bytes();
        let (decoded, consumed) = JournalRecord::from_bytes(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(record, decoded);
    }

    #[test]
    fn test_record_checksum_detects_tamper() {
        let mut record = JournalRecord::new(1, 123_456, vec![1, 2, 3]);
        record.payload[0] ^= 0xFF;
        assert!(!record.verify_checksum());
    }

    #[test]
    fn test_append_and_scan() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("journal.bin");
        let mut writer = JournalWriter::open(&path).unwrap();

        for n in 1..=10u64 {
            let seq = writer.append(&sample_op(n), Utc::now()).unwrap();
            assert_eq!(seq, n);
        }

        let outcome = scan(&path).unwrap();
        assert_eq!(outcome.ops.len(), 10);
        assert!(outcome.torn_tail.is_none());
        assert_eq!(outcome.ops[0].0, 1);
        assert_eq!(outcome.ops[9].0, 10);
    }

    #[test]
    fn test_scan_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let outcome = scan(&tmp.path().join("nope.bin")).unwrap();
        assert!(outcome.ops.is_empty());
        assert!(outcome.torn_tail.is_none());
    }

    #[test]
    fn test_scan_tolerates_torn_tail() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("journal.bin");
        let mut writer = JournalWriter::open(&path).unwrap();
        for n in 1..=5u64 {
            writer.append(&sample_op(n), Utc::now()).unwrap();
        }
        drop(writer);

        // Simulate a crash mid-write: append half a record.
        let mut data = fs::read(&path).unwrap();
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&[0xAB; 7]);
        fs::write(&path, &data).unwrap();

        let outcome = scan(&path).unwrap();
        assert_eq!(outcome.ops.len(), 5);
        assert!(outcome.torn_tail.is_some());
    }

    #[test]
    fn test_scan_stops_at_flipped_byte() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("journal.bin");
        let mut writer = JournalWriter::open(&path).unwrap();
        for n in 1..=3u64 {
            writer.append(&sample_op(n), Utc::now()).unwrap();
        }
        drop(writer);

        let mut data = fs::read(&path).unwrap();
        let last = data.len() - 6; // inside the final record's checksum/payload
        data[last] ^= 0xFF;
        fs::write(&path, &data).unwrap();

        let outcome = scan(&path).unwrap();
        assert!(outcome.ops.len() < 3);
        assert!(outcome.torn_tail.is_some());
    }

    #[test]
    fn test_op_bincode_roundtrip() {
        let op = StoreOp::MatchStarted {
            record: MatchRecord::new(CourtId::new(), "Aces".into(), "Lobbers".into(), Utc::now()),
            best_of: BestOf::Five,
            completed_previous: Some(CompletedPrevious {
                match_id: MatchId::new(),
                completed_at: Utc::now(),
            }),
        };
        let bytes = bincode::serialize(&op).unwrap();
        let decoded: StoreOp = bincode::deserialize(&bytes).unwrap();
        assert_eq!(op, decoded);
    }

    #[test]
    fn test_op_labels() {
        let op = StoreOp::LastEventUndone {
            match_id: MatchId::new(),
        };
        assert_eq!(op.label(), "last_event_undone");
    }
}
