//! Client-facing projections
//!
//! `MatchView` bundles match metadata, the current snapshot, and the derived
//! tennis-notation point display. `ScoreboardView` adds the fixed LED-wall
//! viewport descriptor.

use crate::matches::MatchRecord;
use crate::snapshot::MatchSnapshot;
use serde::{Deserialize, Serialize};

/// Current game points rendered in tennis notation ("0", "15", "30", "40",
/// "AD"). Derived from the snapshot, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDisplay {
    pub points_a: String,
    pub points_b: String,
}

/// Full per-match view returned by every command and query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchView {
    pub meta: MatchRecord,
    pub snapshot: MatchSnapshot,
    pub display: GameDisplay,
}

/// Fixed geometry of the LED wall renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub border: u32,
    pub y_offset_only: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 384,
            height: 256,
            border: 0,
            y_offset_only: true,
        }
    }
}

/// Live matches ordered by court display order, plus the wall geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardView {
    pub viewport: Viewport,
    pub matches: Vec<MatchView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_defaults() {
        let vp = Viewport::default();
        assert_eq!(vp.width, 384);
        assert_eq!(vp.height, 256);
        assert_eq!(vp.border, 0);
        assert!(vp.y_offset_only);
    }

    #[test]
    fn test_viewport_serialization() {
        let json = serde_json::to_value(Viewport::default()).unwrap();
        assert_eq!(json["width"], 384);
        assert_eq!(json["y_offset_only"], true);
    }
}
