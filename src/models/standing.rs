//! League standing row.

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Points for a win. A draw is worth one, a loss nothing.
pub const POINTS_PER_WIN: i64 = 3;
pub const POINTS_PER_DRAW: i64 = 1;

/// Aggregated record of one player within one tournament. Derived state only:
/// always rebuilt from the match set, never patched.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: i64,
    pub goals_against: i64,
    pub goal_difference: i64,
    pub points: i64,
}

impl Standing {
    /// Zeroed standing.
    pub fn empty(tournament_id: TournamentId, player_id: PlayerId) -> Self {
        Self {
            tournament_id,
            player_id,
            ..Self::default()
        }
    }

    /// Table order: points desc, goal difference desc, goals for desc.
    pub fn table_order(a: &Standing, b: &Standing) -> Ordering {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
    }

    /// Group qualification order: points desc, goal difference desc.
    pub fn group_order(a: &Standing, b: &Standing) -> Ordering {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
    }
}
