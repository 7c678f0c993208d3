//! Standings aggregation from the match set.

use tournament_hub::{
    compute_standing, DecisionMethod, GameMatch, MatchState, PlayerId, RoundLabel, TournamentId,
};
use uuid::Uuid;

fn played(
    tournament_id: TournamentId,
    a: PlayerId,
    b: PlayerId,
    score: (u32, u32),
    state: MatchState,
) -> GameMatch {
    let mut m = GameMatch::new(tournament_id, RoundLabel::League { round: 1 }, a, b);
    m.score_1 = score.0;
    m.score_2 = score.1;
    m.state = state;
    m
}

#[test]
fn no_matches_gives_zeroed_standing() {
    let t = Uuid::new_v4();
    let p = Uuid::new_v4();
    let s = compute_standing(t, p, &[]);
    assert_eq!(s.played, 0);
    assert_eq!(s.points, 0);
    assert_eq!(s.goal_difference, 0);
    assert_eq!(s.player_id, p);
}

#[test]
fn aggregates_wins_draws_losses_from_both_sides() {
    let t = Uuid::new_v4();
    let (p, q, r) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let matches = vec![
        played(t, p, q, (3, 1), MatchState::Locked),
        played(t, r, p, (2, 2), MatchState::Played),
        played(t, q, p, (4, 0), MatchState::Locked),
    ];

    let s = compute_standing(t, p, &matches);
    assert_eq!(s.played, 3);
    assert_eq!((s.wins, s.draws, s.losses), (1, 1, 1));
    assert_eq!(s.goals_for, 5);
    assert_eq!(s.goals_against, 7);
    assert_eq!(s.goal_difference, -2);
    assert_eq!(s.points, 4);
    assert_eq!(s.points, i64::from(s.wins) * 3 + i64::from(s.draws));
    assert_eq!(s.goal_difference, s.goals_for - s.goals_against);
}

#[test]
fn scheduled_and_foreign_matches_are_ignored() {
    let t = Uuid::new_v4();
    let (p, q) = (Uuid::new_v4(), Uuid::new_v4());
    let matches = vec![
        played(t, p, q, (5, 0), MatchState::Scheduled),
        played(Uuid::new_v4(), p, q, (5, 0), MatchState::Locked),
        played(t, q, Uuid::new_v4(), (1, 0), MatchState::Locked),
    ];
    assert_eq!(compute_standing(t, p, &matches).played, 0);
}

#[test]
fn penalties_do_not_change_a_draw() {
    let t = Uuid::new_v4();
    let (p, q) = (Uuid::new_v4(), Uuid::new_v4());
    let mut m = played(t, p, q, (1, 1), MatchState::Locked);
    m.decision = DecisionMethod::Penalties;
    m.winner = Some(p);

    let s = compute_standing(t, p, &[m]);
    assert_eq!((s.wins, s.draws, s.losses), (0, 1, 0));
    assert_eq!(s.points, 1);
}

#[test]
fn recomputation_is_idempotent_and_order_independent() {
    let t = Uuid::new_v4();
    let (p, q, r) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let mut matches = vec![
        played(t, p, q, (2, 0), MatchState::Locked),
        played(t, p, r, (0, 1), MatchState::Played),
        played(t, q, p, (3, 3), MatchState::Locked),
    ];

    let first = compute_standing(t, p, &matches);
    let again = compute_standing(t, p, &matches);
    assert_eq!(first, again);

    matches.reverse();
    assert_eq!(compute_standing(t, p, &matches), first);
}
