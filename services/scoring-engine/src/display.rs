//! Tennis-notation display projection
//!
//! Maps raw point counts to the familiar 0/15/30/40/AD call. A pure read-side
//! function of the snapshot; the result is never stored.

use types::snapshot::GameScore;
use types::view::GameDisplay;

const CALLS: [&str; 4] = ["0", "15", "30", "40"];

/// Render the current game's points.
///
/// With both sides at 3+ points: equal is deuce ("40"/"40"), a one-point lead
/// is advantage ("AD" vs "40").
pub fn game_display(game: &GameScore) -> GameDisplay {
    let (a, b) = (game.points_a, game.points_b);
    let (points_a, points_b) = if a >= 3 && b >= 3 {
        if a == b {
            ("40", "40")
        } else if a > b {
            ("AD", "40")
        } else {
            ("40", "AD")
        }
    } else {
        (CALLS[(a as usize).min(3)], CALLS[(b as usize).min(3)])
    };

    GameDisplay {
        points_a: points_a.to_string(),
        points_b: points_b.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(a: u32, b: u32) -> (String, String) {
        let d = game_display(&GameScore { points_a: a, points_b: b });
        (d.points_a, d.points_b)
    }

    #[test]
    fn test_basic_calls() {
        assert_eq!(show(0, 0), ("0".into(), "0".into()));
        assert_eq!(show(1, 0), ("15".into(), "0".into()));
        assert_eq!(show(2, 1), ("30".into(), "15".into()));
        assert_eq!(show(3, 0), ("40".into(), "0".into()));
    }

    #[test]
    fn test_deuce() {
        assert_eq!(show(3, 3), ("40".into(), "40".into()));
        assert_eq!(show(5, 5), ("40".into(), "40".into()));
    }

    #[test]
    fn test_advantage() {
        assert_eq!(show(4, 3), ("AD".into(), "40".into()));
        assert_eq!(show(3, 4), ("40".into(), "AD".into()));
        assert_eq!(show(7, 6), ("AD".into(), "40".into()));
    }
}
