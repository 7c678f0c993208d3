//! Tournament lifecycle through the hub: start, results, round advancement, completion.

mod common;

use common::{hub, lock_all, locked, new_tournament, players, tournament_with};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use tournament_hub::{
    DecisionMethod, Group, InMemoryStore, KnockoutStage, MatchState, NotificationKind,
    NotificationSink, NotifyError, PlayerId, ResultUpdate, RoundLabel, RoundOutcome,
    TournamentError, TournamentFormat, TournamentHub, TournamentState, TournamentStore, Visibility,
};

#[test]
fn league_start_schedules_full_round_robin() {
    let hub = hub();
    let ps = players(&hub, 4);
    let t = tournament_with(&hub, TournamentFormat::League, &ps);

    let started = hub.start(ps[0], t.id).unwrap();
    assert_eq!(started.state, TournamentState::Ongoing);

    let matches = hub.matches(t.id).unwrap();
    assert_eq!(matches.len(), 6);
    let pairs: HashSet<_> = matches
        .iter()
        .map(|m| {
            let mut pair = [m.player_1, m.player_2];
            pair.sort();
            pair
        })
        .collect();
    assert_eq!(pairs.len(), 6);
    assert!(matches.iter().all(|m| m.state == MatchState::Scheduled));
}

#[test]
fn start_twice_is_rejected() {
    let hub = hub();
    let ps = players(&hub, 2);
    let t = tournament_with(&hub, TournamentFormat::League, &ps);
    hub.start(ps[0], t.id).unwrap();
    assert_eq!(hub.start(ps[0], t.id), Err(TournamentError::AlreadyStarted));
}

#[test]
fn only_admin_drives_the_tournament() {
    let hub = hub();
    let ps = players(&hub, 4);
    let t = tournament_with(&hub, TournamentFormat::Cup, &ps);

    assert_eq!(hub.start(ps[1], t.id), Err(TournamentError::Authorization));
    hub.start(ps[0], t.id).unwrap();

    let m = hub.matches(t.id).unwrap().remove(0);
    assert_eq!(
        hub.record_result(ps[1], m.id, locked(1, 0)),
        Err(TournamentError::Authorization)
    );
    assert_eq!(
        hub.advance_round(ps[2], t.id),
        Err(TournamentError::Authorization)
    );
}

#[test]
fn cup_with_bad_roster_rolls_back_to_draft() {
    let hub = hub();
    let ps = players(&hub, 8);
    let t = tournament_with(&hub, TournamentFormat::Cup, &ps[..6]);

    assert!(matches!(
        hub.start(ps[0], t.id),
        Err(TournamentError::InvalidRoster(_))
    ));
    assert_eq!(hub.tournament(ps[0], t.id).unwrap().state, TournamentState::Draft);
    assert!(hub.matches(t.id).unwrap().is_empty());

    // Still open: two more players make a valid bracket.
    for &p in &ps[6..] {
        hub.join(p, t.id, t.join_code.as_deref()).unwrap();
    }
    hub.start(ps[0], t.id).unwrap();
    assert_eq!(hub.matches(t.id).unwrap().len(), 4);
}

#[test]
fn hybrid_with_three_players_rolls_back_without_groups() {
    let hub = hub();
    let ps = players(&hub, 3);
    let t = tournament_with(&hub, TournamentFormat::Hybrid, &ps);

    assert!(matches!(
        hub.start(ps[0], t.id),
        Err(TournamentError::InvalidRoster(_))
    ));
    assert_eq!(hub.tournament(ps[0], t.id).unwrap().state, TournamentState::Draft);
    assert!(hub
        .participants(t.id)
        .unwrap()
        .iter()
        .all(|p| p.group.is_none()));
}

#[test]
fn eight_player_cup_runs_to_a_champion() {
    let hub = hub();
    let ps = players(&hub, 8);
    let admin = ps[0];
    let t = tournament_with(&hub, TournamentFormat::Cup, &ps);
    hub.start(admin, t.id).unwrap();

    let quarters = hub.matches(t.id).unwrap();
    assert_eq!(quarters.len(), 4);
    assert!(quarters
        .iter()
        .all(|m| m.round == RoundLabel::Knockout(KnockoutStage::QF)));
    lock_all(&hub, admin, &quarters);

    let RoundOutcome::NextRound { stage, matches: semis } = hub.advance_round(admin, t.id).unwrap()
    else {
        panic!("expected semi-finals");
    };
    assert_eq!(stage, KnockoutStage::SF);
    assert_eq!(semis.len(), 2);
    let quarter_winners: HashSet<PlayerId> = quarters.iter().map(|m| m.player_1).collect();
    assert!(semis
        .iter()
        .all(|m| quarter_winners.contains(&m.player_1) && quarter_winners.contains(&m.player_2)));
    lock_all(&hub, admin, &semis);

    let RoundOutcome::NextRound { stage, matches: finals } =
        hub.advance_round(admin, t.id).unwrap()
    else {
        panic!("expected the final");
    };
    assert_eq!(stage, KnockoutStage::Final);
    assert_eq!(finals.len(), 1);
    lock_all(&hub, admin, &finals);

    let champion = finals[0].player_1;
    assert_eq!(
        hub.advance_round(admin, t.id),
        Ok(RoundOutcome::Finished { winner: champion })
    );
    let done = hub.tournament(ps[0], t.id).unwrap();
    assert_eq!(done.state, TournamentState::Finished);
    assert_eq!(done.winner, Some(champion));
    assert!(hub.standings(t.id).unwrap().is_empty(), "cups keep no standings");

    assert_eq!(
        hub.advance_round(admin, t.id),
        Ok(RoundOutcome::AlreadyFinished)
    );
    assert_eq!(hub.matches(t.id).unwrap().len(), 7);
}

#[test]
fn tied_knockout_match_blocks_until_decided() {
    let hub = hub();
    let ps = players(&hub, 4);
    let admin = ps[0];
    let t = tournament_with(&hub, TournamentFormat::Cup, &ps);
    hub.start(admin, t.id).unwrap();

    let semis = hub.matches(t.id).unwrap();
    hub.record_result(admin, semis[0].id, locked(1, 1)).unwrap();
    hub.record_result(admin, semis[1].id, locked(3, 0)).unwrap();

    assert_eq!(
        hub.advance_round(admin, t.id),
        Err(TournamentError::UndecidedMatch(semis[0].id))
    );
    assert_eq!(hub.matches(t.id).unwrap().len(), 2);

    let shootout = ResultUpdate {
        decision: DecisionMethod::Penalties,
        winner: Some(semis[0].player_2),
        ..locked(1, 1)
    };
    hub.record_result(admin, semis[0].id, shootout).unwrap();

    let RoundOutcome::NextRound { matches, .. } = hub.advance_round(admin, t.id).unwrap() else {
        panic!("expected the final");
    };
    let finalists: HashSet<_> = [matches[0].player_1, matches[0].player_2].into();
    assert_eq!(
        finalists,
        HashSet::from([semis[0].player_2, semis[1].player_1])
    );
}

#[test]
fn unfinished_round_cannot_advance() {
    let hub = hub();
    let ps = players(&hub, 4);
    let t = tournament_with(&hub, TournamentFormat::Cup, &ps);
    hub.start(ps[0], t.id).unwrap();

    let semis = hub.matches(t.id).unwrap();
    hub.record_result(ps[0], semis[0].id, locked(2, 0)).unwrap();
    assert_eq!(
        hub.advance_round(ps[0], t.id),
        Err(TournamentError::IncompleteResults)
    );
}

#[test]
fn advance_round_needs_a_running_knockout() {
    let hub = hub();
    let ps = players(&hub, 4);
    let league = tournament_with(&hub, TournamentFormat::League, &ps);
    let cup = tournament_with(&hub, TournamentFormat::Cup, &ps);

    assert_eq!(
        hub.advance_round(ps[0], cup.id),
        Err(TournamentError::NotStarted)
    );
    hub.start(ps[0], league.id).unwrap();
    assert_eq!(
        hub.advance_round(ps[0], league.id),
        Err(TournamentError::InvalidState)
    );
}

#[test]
fn hybrid_runs_groups_then_knockout() {
    let hub = hub();
    let ps = players(&hub, 4);
    let admin = ps[0];
    let t = tournament_with(&hub, TournamentFormat::Hybrid, &ps);
    hub.start(admin, t.id).unwrap();

    let participants = hub.participants(t.id).unwrap();
    let in_a = participants.iter().filter(|p| p.group == Some(Group::A)).count();
    let in_b = participants.iter().filter(|p| p.group == Some(Group::B)).count();
    assert_eq!((in_a, in_b), (2, 2));

    let group_matches = hub.matches(t.id).unwrap();
    assert_eq!(group_matches.len(), 2);
    assert!(group_matches.iter().all(|m| m.round.is_group()));
    lock_all(&hub, admin, &group_matches);
    assert_eq!(
        hub.tournament(ps[0], t.id).unwrap().state,
        TournamentState::Ongoing,
        "group stage alone does not finish a hybrid"
    );
    assert_eq!(hub.standings(t.id).unwrap().len(), 4);

    let RoundOutcome::NextRound { stage, matches: semis } = hub.advance_round(admin, t.id).unwrap()
    else {
        panic!("expected semi-finals");
    };
    assert_eq!(stage, KnockoutStage::SF);
    let group_of = |p: PlayerId| participants.iter().find(|x| x.player_id == p).unwrap().group;
    for m in &semis {
        assert_ne!(group_of(m.player_1), group_of(m.player_2));
    }
    lock_all(&hub, admin, &semis);

    let RoundOutcome::NextRound { matches: finals, .. } = hub.advance_round(admin, t.id).unwrap()
    else {
        panic!("expected the final");
    };
    lock_all(&hub, admin, &finals);
    assert_eq!(
        hub.advance_round(admin, t.id),
        Ok(RoundOutcome::Finished {
            winner: finals[0].player_1
        })
    );
}

#[test]
fn negative_score_is_rejected_and_match_untouched() {
    let hub = hub();
    let ps = players(&hub, 2);
    let t = tournament_with(&hub, TournamentFormat::League, &ps);
    hub.start(ps[0], t.id).unwrap();
    let before = hub.matches(t.id).unwrap().remove(0);

    assert_eq!(
        hub.record_result(ps[0], before.id, locked(-1, 2)),
        Err(TournamentError::InvalidScore)
    );
    assert_eq!(hub.store().game_match(before.id), Some(before));
}

#[test]
fn winner_must_match_players_and_score() {
    let hub = hub();
    let ps = players(&hub, 3);
    let t = tournament_with(&hub, TournamentFormat::Cup, &ps[..2]);
    hub.start(ps[0], t.id).unwrap();
    let m = hub.matches(t.id).unwrap().remove(0);

    let outsider = ResultUpdate {
        winner: Some(ps[2]),
        ..locked(1, 0)
    };
    assert_eq!(
        hub.record_result(ps[0], m.id, outsider),
        Err(TournamentError::InvalidWinner)
    );
    let loser = ResultUpdate {
        winner: Some(m.player_2),
        ..locked(1, 0)
    };
    assert_eq!(
        hub.record_result(ps[0], m.id, loser),
        Err(TournamentError::InvalidWinner)
    );
}

#[test]
fn league_standings_follow_results_and_crown_the_leader() {
    let hub = hub();
    let ps = players(&hub, 3);
    let admin = ps[0];
    let star = ps[1];
    let t = tournament_with(&hub, TournamentFormat::League, &ps);
    hub.start(admin, t.id).unwrap();

    let matches = hub.matches(t.id).unwrap();
    assert_eq!(matches.len(), 3);
    for (i, m) in matches.iter().enumerate() {
        let update = if m.player_1 == star {
            locked(3, 0)
        } else if m.player_2 == star {
            locked(0, 3)
        } else {
            locked(1, 1)
        };
        let recorded = hub.record_result(admin, m.id, update).unwrap();
        assert!(recorded.played_at.is_some());
        let expected = if i + 1 == matches.len() {
            TournamentState::Finished
        } else {
            TournamentState::Ongoing
        };
        assert_eq!(hub.tournament(ps[0], t.id).unwrap().state, expected);
    }

    let table = hub.standings(t.id).unwrap();
    assert_eq!(table[0].player_id, star);
    assert_eq!(table[0].points, 6);
    assert_eq!(table[0].goal_difference, 6);
    for row in &table[1..] {
        assert_eq!((row.draws, row.losses, row.points), (1, 1, 1));
    }
    assert_eq!(hub.tournament(ps[0], t.id).unwrap().winner, Some(star));
    assert_eq!(
        hub.record_result(admin, matches[0].id, locked(0, 0)),
        Err(TournamentError::AlreadyFinished)
    );
}

#[test]
fn played_results_update_standings_without_finishing() {
    let hub = hub();
    let ps = players(&hub, 2);
    let t = tournament_with(&hub, TournamentFormat::League, &ps);
    hub.start(ps[0], t.id).unwrap();
    let m = hub.matches(t.id).unwrap().remove(0);

    let played = ResultUpdate {
        state: MatchState::Played,
        ..locked(4, 1)
    };
    hub.record_result(ps[0], m.id, played).unwrap();

    let table = hub.standings(t.id).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].player_id, m.player_1);
    assert_eq!(table[0].points, 3);
    assert_eq!(table[1].losses, 1);
    assert_eq!(hub.tournament(ps[0], t.id).unwrap().state, TournamentState::Ongoing);

    // Recomputing by hand changes nothing.
    let again = hub.recompute_standing(t.id, m.player_1).unwrap();
    assert_eq!(again, table[0]);
}

#[test]
fn both_players_hear_about_a_result() {
    let hub = hub();
    let ps = players(&hub, 2);
    let t = tournament_with(&hub, TournamentFormat::League, &ps);
    hub.start(ps[0], t.id).unwrap();
    let m = hub.matches(t.id).unwrap().remove(0);
    hub.record_result(ps[0], m.id, locked(2, 0)).unwrap();

    for p in [m.player_1, m.player_2] {
        assert!(hub
            .notifier()
            .for_receiver(p)
            .iter()
            .any(|n| n.kind == NotificationKind::MatchResult));
    }
}

struct BrokenSink;

impl NotificationSink for BrokenSink {
    fn notify(&self, _: PlayerId, _: NotificationKind, _: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Unavailable("offline".to_string()))
    }
}

#[test]
fn notification_failure_does_not_fail_the_operation() {
    let hub = TournamentHub::new(InMemoryStore::new(), BrokenSink, StdRng::seed_from_u64(9));
    let a = hub.register_player("Ann").unwrap().id;
    let b = hub.register_player("Bob").unwrap().id;
    let t = hub
        .create_tournament(a, new_tournament(TournamentFormat::Cup, Visibility::Private))
        .unwrap();
    hub.join(b, t.id, t.join_code.as_deref()).unwrap();
    hub.start(a, t.id).unwrap();

    let m = hub.matches(t.id).unwrap().remove(0);
    let recorded = hub.record_result(a, m.id, locked(0, 2)).unwrap();
    assert_eq!(recorded.state, MatchState::Locked);
    assert_eq!(
        hub.advance_round(a, t.id),
        Ok(RoundOutcome::Finished { winner: m.player_2 })
    );
}

#[test]
fn concurrent_advances_generate_one_round() {
    let hub = hub();
    let ps = players(&hub, 8);
    let t = tournament_with(&hub, TournamentFormat::Cup, &ps);
    hub.start(ps[0], t.id).unwrap();
    lock_all(&hub, ps[0], &hub.matches(t.id).unwrap());

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| hub.advance_round(ps[0], t.id)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let advanced = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(advanced, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| *e == TournamentError::IncompleteResults));
    let semis = hub
        .matches(t.id)
        .unwrap()
        .into_iter()
        .filter(|m| m.round == RoundLabel::Knockout(KnockoutStage::SF))
        .count();
    assert_eq!(semis, 2);
}

#[test]
fn earlier_knockout_rounds_close_once_the_next_is_drawn() {
    let hub = hub();
    let ps = players(&hub, 4);
    let admin = ps[0];
    let t = tournament_with(&hub, TournamentFormat::Cup, &ps);
    hub.start(admin, t.id).unwrap();

    let semis = hub.matches(t.id).unwrap();
    lock_all(&hub, admin, &semis);
    // Still editable while the final has not been drawn.
    hub.record_result(admin, semis[0].id, locked(3, 1)).unwrap();

    let RoundOutcome::NextRound { matches: finals, .. } = hub.advance_round(admin, t.id).unwrap()
    else {
        panic!("expected the final");
    };
    assert_eq!(
        hub.record_result(admin, semis[0].id, locked(0, 2)),
        Err(TournamentError::RoundClosed("SF".to_string()))
    );
    let untouched = hub
        .matches(t.id)
        .unwrap()
        .into_iter()
        .find(|m| m.id == semis[0].id)
        .unwrap();
    assert_eq!((untouched.score_1, untouched.score_2), (3, 1));

    hub.record_result(admin, finals[0].id, locked(1, 0)).unwrap();
}

#[test]
fn group_matches_close_when_the_semi_finals_are_drawn() {
    let hub = hub();
    let ps = players(&hub, 4);
    let admin = ps[0];
    let t = tournament_with(&hub, TournamentFormat::Hybrid, &ps);
    hub.start(admin, t.id).unwrap();

    let group_matches = hub.matches(t.id).unwrap();
    lock_all(&hub, admin, &group_matches);
    hub.advance_round(admin, t.id).unwrap();

    let closed = &group_matches[0];
    assert_eq!(
        hub.record_result(admin, closed.id, locked(0, 5)),
        Err(TournamentError::RoundClosed(closed.round.to_string()))
    );
}
