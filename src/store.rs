//! Persistence interface used by the hub, and an in-memory implementation.

use crate::models::{
    Friendship, GameMatch, Invitation, JoinRequest, MatchId, Participant, Player, PlayerId,
    Standing, Tournament, TournamentError, TournamentId,
};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Record storage. Enforces (tournament, player) uniqueness for participants and standings.
///
/// Bulk match insertion is all-or-nothing.
pub trait TournamentStore: Send + Sync {
    fn insert_player(&self, player: Player) -> Result<(), TournamentError>;
    fn player(&self, id: PlayerId) -> Option<Player>;
    fn players(&self) -> Vec<Player>;

    fn insert_tournament(&self, tournament: Tournament) -> Result<(), TournamentError>;
    fn tournament(&self, id: TournamentId) -> Option<Tournament>;
    fn tournaments(&self) -> Vec<Tournament>;
    fn update_tournament(&self, tournament: &Tournament) -> Result<(), TournamentError>;
    /// Removes the tournament with its participants, matches, standings, requests and invitations.
    fn delete_tournament(&self, id: TournamentId) -> Result<(), TournamentError>;

    /// Fails with `AlreadyJoined` if the pair already exists.
    fn insert_participant(&self, participant: Participant) -> Result<(), TournamentError>;
    /// Participants in join order.
    fn participants(&self, tournament_id: TournamentId) -> Vec<Participant>;
    fn update_participant(&self, participant: &Participant) -> Result<(), TournamentError>;

    fn insert_matches(&self, matches: Vec<GameMatch>) -> Result<(), TournamentError>;
    /// Matches in creation order.
    fn matches(&self, tournament_id: TournamentId) -> Vec<GameMatch>;
    fn game_match(&self, id: MatchId) -> Option<GameMatch>;
    fn update_match(&self, game_match: &GameMatch) -> Result<(), TournamentError>;

    /// Insert or replace the (tournament, player) row.
    fn upsert_standing(&self, standing: Standing) -> Result<(), TournamentError>;
    fn standings(&self, tournament_id: TournamentId) -> Vec<Standing>;

    fn insert_join_request(&self, request: JoinRequest) -> Result<(), TournamentError>;
    fn join_request(&self, id: Uuid) -> Option<JoinRequest>;
    fn join_requests(&self) -> Vec<JoinRequest>;
    fn update_join_request(&self, request: &JoinRequest) -> Result<(), TournamentError>;

    fn insert_invitation(&self, invitation: Invitation) -> Result<(), TournamentError>;
    fn invitation(&self, id: Uuid) -> Option<Invitation>;
    fn invitations(&self) -> Vec<Invitation>;
    fn update_invitation(&self, invitation: &Invitation) -> Result<(), TournamentError>;

    fn insert_friendship(&self, friendship: Friendship) -> Result<(), TournamentError>;
    fn friendship(&self, id: Uuid) -> Option<Friendship>;
    fn friendships(&self) -> Vec<Friendship>;
    fn update_friendship(&self, friendship: &Friendship) -> Result<(), TournamentError>;
}

#[derive(Default)]
struct Tables {
    players: Vec<Player>,
    tournaments: HashMap<TournamentId, Tournament>,
    participants: HashMap<TournamentId, Vec<Participant>>,
    matches: HashMap<TournamentId, Vec<GameMatch>>,
    standings: HashMap<(TournamentId, PlayerId), Standing>,
    join_requests: Vec<JoinRequest>,
    invitations: Vec<Invitation>,
    friendships: Vec<Friendship>,
}

/// Store kept in process memory behind a single lock. A poisoned lock is recovered,
/// since every write leaves the tables consistent.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Replace the element matching `same` in `rows`, or fail with `missing`.
fn replace<T: Clone>(
    rows: &mut [T],
    row: &T,
    same: impl Fn(&T) -> bool,
    missing: TournamentError,
) -> Result<(), TournamentError> {
    let slot = rows.iter_mut().find(|r| same(r)).ok_or(missing)?;
    *slot = row.clone();
    Ok(())
}

impl TournamentStore for InMemoryStore {
    fn insert_player(&self, player: Player) -> Result<(), TournamentError> {
        let mut t = self.write();
        if t.players.iter().any(|p| p.name.eq_ignore_ascii_case(&player.name)) {
            return Err(TournamentError::DuplicatePlayerName);
        }
        t.players.push(player);
        Ok(())
    }

    fn player(&self, id: PlayerId) -> Option<Player> {
        self.read().players.iter().find(|p| p.id == id).cloned()
    }

    fn players(&self) -> Vec<Player> {
        self.read().players.clone()
    }

    fn insert_tournament(&self, tournament: Tournament) -> Result<(), TournamentError> {
        self.write().tournaments.insert(tournament.id, tournament);
        Ok(())
    }

    fn tournament(&self, id: TournamentId) -> Option<Tournament> {
        self.read().tournaments.get(&id).cloned()
    }

    fn tournaments(&self) -> Vec<Tournament> {
        let mut all: Vec<_> = self.read().tournaments.values().cloned().collect();
        all.sort_by_key(|t| t.created_at);
        all
    }

    fn update_tournament(&self, tournament: &Tournament) -> Result<(), TournamentError> {
        let mut t = self.write();
        let slot = t
            .tournaments
            .get_mut(&tournament.id)
            .ok_or(TournamentError::TournamentNotFound(tournament.id))?;
        *slot = tournament.clone();
        Ok(())
    }

    fn delete_tournament(&self, id: TournamentId) -> Result<(), TournamentError> {
        let mut t = self.write();
        t.tournaments
            .remove(&id)
            .ok_or(TournamentError::TournamentNotFound(id))?;
        t.participants.remove(&id);
        t.matches.remove(&id);
        t.standings.retain(|(tid, _), _| *tid != id);
        t.join_requests.retain(|r| r.tournament_id != id);
        t.invitations.retain(|i| i.tournament_id != id);
        Ok(())
    }

    fn insert_participant(&self, participant: Participant) -> Result<(), TournamentError> {
        let mut t = self.write();
        let rows = t.participants.entry(participant.tournament_id).or_default();
        if rows.iter().any(|p| p.player_id == participant.player_id) {
            return Err(TournamentError::AlreadyJoined);
        }
        rows.push(participant);
        Ok(())
    }

    fn participants(&self, tournament_id: TournamentId) -> Vec<Participant> {
        self.read()
            .participants
            .get(&tournament_id)
            .cloned()
            .unwrap_or_default()
    }

    fn update_participant(&self, participant: &Participant) -> Result<(), TournamentError> {
        let mut t = self.write();
        let rows = t
            .participants
            .get_mut(&participant.tournament_id)
            .ok_or(TournamentError::PlayerNotFound(participant.player_id))?;
        replace(
            rows,
            participant,
            |p| p.player_id == participant.player_id,
            TournamentError::PlayerNotFound(participant.player_id),
        )
    }

    fn insert_matches(&self, matches: Vec<GameMatch>) -> Result<(), TournamentError> {
        let mut t = self.write();
        if let Some(m) = matches.iter().find(|m| !t.tournaments.contains_key(&m.tournament_id)) {
            return Err(TournamentError::TournamentNotFound(m.tournament_id));
        }
        for m in matches {
            t.matches.entry(m.tournament_id).or_default().push(m);
        }
        Ok(())
    }

    fn matches(&self, tournament_id: TournamentId) -> Vec<GameMatch> {
        self.read()
            .matches
            .get(&tournament_id)
            .cloned()
            .unwrap_or_default()
    }

    fn game_match(&self, id: MatchId) -> Option<GameMatch> {
        self.read()
            .matches
            .values()
            .flatten()
            .find(|m| m.id == id)
            .cloned()
    }

    fn update_match(&self, game_match: &GameMatch) -> Result<(), TournamentError> {
        let mut t = self.write();
        let rows = t
            .matches
            .get_mut(&game_match.tournament_id)
            .ok_or(TournamentError::MatchNotFound(game_match.id))?;
        replace(
            rows,
            game_match,
            |m| m.id == game_match.id,
            TournamentError::MatchNotFound(game_match.id),
        )
    }

    fn upsert_standing(&self, standing: Standing) -> Result<(), TournamentError> {
        self.write()
            .standings
            .insert((standing.tournament_id, standing.player_id), standing);
        Ok(())
    }

    fn standings(&self, tournament_id: TournamentId) -> Vec<Standing> {
        self.read()
            .standings
            .values()
            .filter(|s| s.tournament_id == tournament_id)
            .cloned()
            .collect()
    }

    fn insert_join_request(&self, request: JoinRequest) -> Result<(), TournamentError> {
        self.write().join_requests.push(request);
        Ok(())
    }

    fn join_request(&self, id: Uuid) -> Option<JoinRequest> {
        self.read().join_requests.iter().find(|r| r.id == id).cloned()
    }

    fn join_requests(&self) -> Vec<JoinRequest> {
        self.read().join_requests.clone()
    }

    fn update_join_request(&self, request: &JoinRequest) -> Result<(), TournamentError> {
        replace(
            &mut self.write().join_requests,
            request,
            |r| r.id == request.id,
            TournamentError::RequestNotFound(request.id),
        )
    }

    fn insert_invitation(&self, invitation: Invitation) -> Result<(), TournamentError> {
        self.write().invitations.push(invitation);
        Ok(())
    }

    fn invitation(&self, id: Uuid) -> Option<Invitation> {
        self.read().invitations.iter().find(|i| i.id == id).cloned()
    }

    fn invitations(&self) -> Vec<Invitation> {
        self.read().invitations.clone()
    }

    fn update_invitation(&self, invitation: &Invitation) -> Result<(), TournamentError> {
        replace(
            &mut self.write().invitations,
            invitation,
            |i| i.id == invitation.id,
            TournamentError::InvitationNotFound(invitation.id),
        )
    }

    fn insert_friendship(&self, friendship: Friendship) -> Result<(), TournamentError> {
        self.write().friendships.push(friendship);
        Ok(())
    }

    fn friendship(&self, id: Uuid) -> Option<Friendship> {
        self.read().friendships.iter().find(|f| f.id == id).cloned()
    }

    fn friendships(&self) -> Vec<Friendship> {
        self.read().friendships.clone()
    }

    fn update_friendship(&self, friendship: &Friendship) -> Result<(), TournamentError> {
        replace(
            &mut self.write().friendships,
            friendship,
            |f| f.id == friendship.id,
            TournamentError::FriendshipNotFound(friendship.id),
        )
    }
}
