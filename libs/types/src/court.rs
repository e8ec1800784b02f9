//! Court records
//!
//! Courts are created by admin action and never deleted. `display_order` is a
//! monotonic insertion index used to keep scoreboard layout stable.

use crate::ids::CourtId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a court name after trimming.
pub const MAX_COURT_NAME_LEN: usize = 40;

/// A physical court known to the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    /// Unique, trimmed, 1-40 characters.
    pub name: String,
    /// Monotonic insertion index: assigned as max(existing) + 1.
    pub display_order: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Court {
    /// Create a new active court. `name` must already be normalized.
    pub fn new(name: String, display_order: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            id: CourtId::new(),
            name,
            display_order,
            is_active: true,
            created_at,
        }
    }
}

/// Normalize a raw court name: trim whitespace and enforce the 1-40 char
/// bound. Returns `None` when the trimmed name is empty or too long.
pub fn normalize_court_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_COURT_NAME_LEN {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize_court_name("  Court 1  ").as_deref(), Some("Court 1"));
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(normalize_court_name("   ").is_none());
        assert!(normalize_court_name("").is_none());
    }

    #[test]
    fn test_normalize_rejects_overlong() {
        let long = "x".repeat(MAX_COURT_NAME_LEN + 1);
        assert!(normalize_court_name(&long).is_none());

        let exact = "x".repeat(MAX_COURT_NAME_LEN);
        assert_eq!(normalize_court_name(&exact).as_deref(), Some(exact.as_str()));
    }

    #[test]
    fn test_court_serialization_roundtrip() {
        let court = Court::new("Center Court".to_string(), 3, Utc::now());
        let json = serde_json::to_string(&court).unwrap();
        let decoded: Court = serde_json::from_str(&json).unwrap();
        assert_eq!(court, decoded);
    }
}
