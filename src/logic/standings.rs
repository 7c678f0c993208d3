//! Standings: rebuild a player's league record from the match set.

use crate::models::{
    GameMatch, PlayerId, Standing, TournamentId, POINTS_PER_DRAW, POINTS_PER_WIN,
};
use std::cmp::Ordering;

/// Recompute `player`'s standing in `tournament_id` from scratch.
///
/// Every match involving the player that is PLAYED or LOCKED counts. Win/draw/loss comes
/// from the raw score only; extra time, penalties and explicit winners are ignored here.
/// The result does not depend on match order, and a player with no qualifying
/// matches gets a zeroed row.
pub fn compute_standing(
    tournament_id: TournamentId,
    player: PlayerId,
    matches: &[GameMatch],
) -> Standing {
    let mut standing = Standing::empty(tournament_id, player);

    let counted = matches
        .iter()
        .filter(|m| m.tournament_id == tournament_id && m.state.counts_for_standings());

    for m in counted {
        let Some((scored, conceded)) = m.goals_for(player) else {
            continue;
        };
        standing.played += 1;
        standing.goals_for += i64::from(scored);
        standing.goals_against += i64::from(conceded);
        match scored.cmp(&conceded) {
            Ordering::Greater => standing.wins += 1,
            Ordering::Equal => standing.draws += 1,
            Ordering::Less => standing.losses += 1,
        }
    }

    standing.goal_difference = standing.goals_for - standing.goals_against;
    standing.points =
        i64::from(standing.wins) * POINTS_PER_WIN + i64::from(standing.draws) * POINTS_PER_DRAW;
    standing
}

/// Sort into table order (points, goal difference, goals for; all descending).
pub fn rank_standings(standings: &mut [Standing]) {
    standings.sort_by(Standing::table_order);
}

/// Top of the table, if any rows exist.
pub fn league_leader(standings: &[Standing]) -> Option<&Standing> {
    standings.iter().min_by(|a, b| Standing::table_order(a, b))
}
