//! Scoring state machine core
//!
//! Standard-game tennis: a game goes to the first side with 4+ points and a
//! 2-point lead, a set to the first side with 6+ games and a 2-game lead.
//! There is no tie-break game; a set at 6-6 continues until one side leads by
//! two (documented current behavior, see the crate tests).

use chrono::{DateTime, Utc};
use types::event::{ScoreEvent, ScoreEventKind, TeamSide};
use types::ids::MatchId;
use types::matches::MatchStatus;
use types::snapshot::{BestOf, GameScore, MatchSnapshot, SetScore};

/// The snapshot every match starts from: one open set, love-all, side A
/// serving by convention, `seq` 0.
pub fn initial_snapshot(
    match_id: MatchId,
    best_of: BestOf,
    started_at: DateTime<Utc>,
) -> MatchSnapshot {
    MatchSnapshot {
        match_id,
        status: MatchStatus::Live,
        sets: vec![SetScore::default()],
        current_set: 0,
        game: GameScore::default(),
        server: TeamSide::A,
        best_of,
        seq: 0,
        winner: None,
        updated_at: started_at,
    }
}

/// Apply one event to a snapshot, producing the next snapshot.
///
/// A complete snapshot absorbs events unchanged: the returned snapshot is a
/// clone of the input, including `seq`. Callers that must reject late events
/// do so before reaching the engine.
pub fn apply(snapshot: &MatchSnapshot, event: &ScoreEvent) -> MatchSnapshot {
    if snapshot.status == MatchStatus::Complete {
        return snapshot.clone();
    }

    let mut next = snapshot.clone();
    match event.kind {
        ScoreEventKind::PointWon { winner } => award_point(&mut next, winner),
    }
    next.seq += 1;
    next.updated_at = event.created_at;
    next
}

fn award_point(snap: &mut MatchSnapshot, winner: TeamSide) {
    match winner {
        TeamSide::A => snap.game.points_a += 1,
        TeamSide::B => snap.game.points_b += 1,
    }

    let won = snap.game.points(winner);
    let lost = snap.game.points(winner.opponent());
    if won >= 4 && won >= lost + 2 {
        award_game(snap, winner);
    }
}

fn award_game(snap: &mut MatchSnapshot, winner: TeamSide) {
    {
        let set = &mut snap.sets[snap.current_set];
        match winner {
            TeamSide::A => set.games_a += 1,
            TeamSide::B => set.games_b += 1,
        }
    }
    snap.game = GameScore::default();
    snap.server = snap.server.opponent();

    let set = snap.sets[snap.current_set];
    let won = set.games(winner);
    let lost = set.games(winner.opponent());
    if won >= 6 && won >= lost + 2 {
        award_set(snap, winner);
    }
}

fn award_set(snap: &mut MatchSnapshot, winner: TeamSide) {
    // The just-finished set sits at current_set; counting finished sets
    // before it plus this one gives the winner's total.
    let won_before = snap
        .sets
        .iter()
        .take(snap.current_set)
        .filter(|s| s.games(winner) > s.games(winner.opponent()))
        .count() as u32;

    if won_before + 1 >= snap.best_of.required_sets() {
        snap.status = MatchStatus::Complete;
        snap.winner = Some(winner);
    } else {
        snap.sets.push(SetScore::default());
        snap.current_set += 1;
    }
}
