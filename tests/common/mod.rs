//! Helpers shared by the hub tests.
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use tournament_hub::{
    DecisionMethod, GameMatch, InMemoryNotifier, InMemoryStore, MatchState, NewTournament,
    PlayerId, ResultUpdate, Tournament, TournamentFormat, TournamentHub, Visibility,
};

pub type Hub = TournamentHub<InMemoryStore, InMemoryNotifier>;

pub fn hub() -> Hub {
    TournamentHub::new(
        InMemoryStore::new(),
        InMemoryNotifier::new(),
        StdRng::seed_from_u64(2024),
    )
}

pub fn players(hub: &Hub, n: usize) -> Vec<PlayerId> {
    (0..n)
        .map(|i| hub.register_player(&format!("P{i}")).unwrap().id)
        .collect()
}

pub fn new_tournament(format: TournamentFormat, visibility: Visibility) -> NewTournament {
    NewTournament {
        name: format!("{format:?} night"),
        description: String::new(),
        format,
        visibility,
        max_players: None,
    }
}

/// Private tournament run by `players[0]`; everyone else joins with the code.
pub fn tournament_with(hub: &Hub, format: TournamentFormat, players: &[PlayerId]) -> Tournament {
    let t = hub
        .create_tournament(players[0], new_tournament(format, Visibility::Private))
        .unwrap();
    for &p in &players[1..] {
        hub.join(p, t.id, t.join_code.as_deref()).unwrap();
    }
    t
}

pub fn locked(score_1: i64, score_2: i64) -> ResultUpdate {
    ResultUpdate {
        score_1,
        score_2,
        state: MatchState::Locked,
        decision: DecisionMethod::Normal,
        winner: None,
    }
}

/// Lock every match in `matches` as a 2-1 win for `player_1`.
pub fn lock_all(hub: &Hub, admin: PlayerId, matches: &[GameMatch]) {
    for m in matches {
        hub.record_result(admin, m.id, locked(2, 1)).unwrap();
    }
}
