//! Tournament business logic: fixtures, standings, round progression.
//!
//! Everything here is pure over plain data; persistence lives in the hub.

mod fixtures;
mod progression;
mod standings;

pub use fixtures::{generate_fixtures, round_robin_pairings, FixturePlan};
pub use progression::{
    all_locked, current_stage, group_top_two, next_stage, plan_advance, round_is_closed,
    round_winners, Advancement, CurrentStage,
};
pub use standings::{compute_standing, league_leader, rank_standings};
