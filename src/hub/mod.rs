//! The hub: every operation a caller can perform, run against a store and a notification sink.
//!
//! All work on one tournament is serialized through a per-tournament lock, so two
//! concurrent "advance round" or "record result" calls never see a half-written match set.
//! The caller's identity is always passed explicitly.

mod friends;
mod lifecycle;
mod membership;

pub use lifecycle::{ResultUpdate, RoundOutcome};
pub use membership::JoinOutcome;

use crate::logic::{current_stage, rank_standings, CurrentStage};
use crate::models::{
    GameMatch, NotificationKind, Participant, Player, PlayerId, Role, Standing, Tournament,
    TournamentError, TournamentFormat, TournamentId, Visibility, DEFAULT_MAX_PLAYERS,
};
use crate::notify::NotificationSink;
use crate::store::TournamentStore;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Fields supplied when creating a tournament.
#[derive(Clone, Debug, Deserialize)]
pub struct NewTournament {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub format: TournamentFormat,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub max_players: Option<u32>,
}

pub struct TournamentHub<S, N> {
    store: S,
    notifier: N,
    rng: Mutex<StdRng>,
    locks: Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>,
    /// Serializes friendship check-then-insert.
    social: Mutex<()>,
}

fn lock_ignoring_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: TournamentStore, N: NotificationSink> TournamentHub<S, N> {
    pub fn new(store: S, notifier: N, rng: StdRng) -> Self {
        Self {
            store,
            notifier,
            rng: Mutex::new(rng),
            locks: Mutex::new(HashMap::new()),
            social: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn tournament_lock(&self, id: TournamentId) -> Arc<Mutex<()>> {
        lock_ignoring_poison(&self.locks)
            .entry(id)
            .or_default()
            .clone()
    }

    fn load_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.store
            .tournament(id)
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    fn load_player(&self, id: PlayerId) -> Result<Player, TournamentError> {
        self.store.player(id).ok_or(TournamentError::PlayerNotFound(id))
    }

    fn display_name(&self, id: PlayerId) -> String {
        self.store
            .player(id)
            .map(|p| p.name)
            .unwrap_or_else(|| id.to_string())
    }

    /// Fire-and-forget delivery. Failures are logged and never reach the caller.
    fn send(&self, receiver: PlayerId, kind: NotificationKind, message: &str) {
        if let Err(e) = self.notifier.notify(receiver, kind, message) {
            log::warn!("Dropping {:?} notification for {}: {}", kind, receiver, e);
        }
    }

    /// Register a player in the directory. Names are unique, case-insensitive.
    pub fn register_player(&self, name: &str) -> Result<Player, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::InvalidName);
        }
        let player = Player::new(name);
        self.store.insert_player(player.clone())?;
        Ok(player)
    }

    pub fn player(&self, id: PlayerId) -> Result<Player, TournamentError> {
        self.load_player(id)
    }

    /// Player directory ordered by name, for picking invite and friend targets.
    pub fn players(&self) -> Vec<Player> {
        let mut players = self.store.players();
        players.sort_by_cached_key(|p| p.name.to_lowercase());
        players
    }

    /// Create a tournament in Draft; the caller becomes its admin and first participant.
    pub fn create_tournament(
        &self,
        caller: PlayerId,
        new: NewTournament,
    ) -> Result<Tournament, TournamentError> {
        self.load_player(caller)?;
        let name = new.name.trim();
        if name.is_empty() {
            return Err(TournamentError::InvalidName);
        }
        let mut tournament = Tournament::new(name, new.format, new.visibility, caller);
        tournament.description = new.description;
        tournament.max_players = new.max_players.unwrap_or(DEFAULT_MAX_PLAYERS);

        self.store.insert_tournament(tournament.clone())?;
        self.store
            .insert_participant(Participant::new(tournament.id, caller, Role::Admin))?;
        log::info!(
            "Created {:?} tournament '{}' ({})",
            tournament.format,
            tournament.name,
            tournament.id
        );
        Ok(tournament)
    }

    fn is_participant(&self, tournament_id: TournamentId, player: PlayerId) -> bool {
        self.store
            .participants(tournament_id)
            .iter()
            .any(|p| p.player_id == player)
    }

    fn can_view(&self, tournament: &Tournament, caller: PlayerId) -> bool {
        tournament.visibility == Visibility::Public
            || tournament.is_admin(caller)
            || self.is_participant(tournament.id, caller)
    }

    /// Fetch a tournament the caller may see. The join code is only shown to the admin.
    pub fn tournament(
        &self,
        caller: PlayerId,
        id: TournamentId,
    ) -> Result<Tournament, TournamentError> {
        let tournament = self.load_tournament(id)?;
        if !self.can_view(&tournament, caller) {
            return Err(TournamentError::Authorization);
        }
        Ok(tournament.seen_by(caller))
    }

    /// Public tournaments plus the ones the caller plays in or administers.
    pub fn visible_tournaments(&self, caller: PlayerId) -> Vec<Tournament> {
        self.store
            .tournaments()
            .into_iter()
            .filter(|t| self.can_view(t, caller))
            .map(|t| t.seen_by(caller))
            .collect()
    }

    /// Admin-only. Removes the tournament and everything it owns.
    pub fn delete_tournament(
        &self,
        caller: PlayerId,
        id: TournamentId,
    ) -> Result<(), TournamentError> {
        let lock = self.tournament_lock(id);
        let _guard = lock_ignoring_poison(&lock);
        self.load_tournament(id)?.require_admin(caller)?;
        self.store.delete_tournament(id)?;
        log::info!("Deleted tournament {}", id);
        Ok(())
    }

    pub fn participants(&self, id: TournamentId) -> Result<Vec<Participant>, TournamentError> {
        self.load_tournament(id)?;
        Ok(self.store.participants(id))
    }

    pub fn matches(&self, id: TournamentId) -> Result<Vec<GameMatch>, TournamentError> {
        self.load_tournament(id)?;
        Ok(self.store.matches(id))
    }

    /// Standings in table order.
    pub fn standings(&self, id: TournamentId) -> Result<Vec<Standing>, TournamentError> {
        self.load_tournament(id)?;
        let mut rows = self.store.standings(id);
        rank_standings(&mut rows);
        Ok(rows)
    }

    /// Stage the tournament's knockout side is in, derived from its matches.
    pub fn current_stage(&self, id: TournamentId) -> Result<Option<CurrentStage>, TournamentError> {
        let tournament = self.load_tournament(id)?;
        Ok(current_stage(tournament.format, &self.store.matches(id)))
    }
}
