//! Lifecycle: start (Draft → Ongoing), record results, advance rounds, finish.

use super::{lock_ignoring_poison, TournamentHub};
use crate::logic::{
    all_locked, compute_standing, generate_fixtures, league_leader, plan_advance,
    round_is_closed, Advancement,
};
use crate::models::{
    DecisionMethod, GameMatch, KnockoutStage, MatchId, MatchState, NotificationKind, Participant,
    PlayerId, RoundLabel, Standing, Tournament, TournamentError, TournamentFormat, TournamentId,
    TournamentState,
};
use crate::notify::NotificationSink;
use crate::store::TournamentStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// New result for a match. Scores are signed so that negative input can be rejected.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ResultUpdate {
    pub score_1: i64,
    pub score_2: i64,
    pub state: MatchState,
    #[serde(default)]
    pub decision: DecisionMethod,
    #[serde(default)]
    pub winner: Option<PlayerId>,
}

/// Result of `advance_round`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoundOutcome {
    NextRound {
        stage: KnockoutStage,
        matches: Vec<GameMatch>,
    },
    Finished {
        winner: PlayerId,
    },
    /// The tournament was already over; nothing changed.
    AlreadyFinished,
}

impl<S: TournamentStore, N: NotificationSink> TournamentHub<S, N> {
    /// Start a Draft tournament: generate its fixtures and move it to Ongoing.
    ///
    /// If the roster does not fit the format, the tournament is put back to Draft
    /// and the error returned; no matches or group assignments are left behind.
    pub fn start(&self, caller: PlayerId, id: TournamentId) -> Result<Tournament, TournamentError> {
        let lock = self.tournament_lock(id);
        let _guard = lock_ignoring_poison(&lock);

        let mut tournament = self.load_tournament(id)?;
        tournament.require_admin(caller)?;
        match tournament.state {
            TournamentState::Draft => {}
            TournamentState::Ongoing => return Err(TournamentError::AlreadyStarted),
            TournamentState::Finished => return Err(TournamentError::AlreadyFinished),
        }

        tournament.state = TournamentState::Ongoing;
        self.store.update_tournament(&tournament)?;

        let participants = self.store.participants(id);
        if let Err(e) = self.schedule(&tournament, &participants) {
            log::warn!("Start of {} rejected, back to draft: {}", id, e);
            self.roll_back_start(&mut tournament, &participants)?;
            return Err(e);
        }

        log::info!(
            "Started {:?} tournament {} with {} players",
            tournament.format,
            id,
            participants.len()
        );
        Ok(tournament)
    }

    fn schedule(
        &self,
        tournament: &Tournament,
        participants: &[Participant],
    ) -> Result<(), TournamentError> {
        let roster: Vec<PlayerId> = participants.iter().map(|p| p.player_id).collect();
        let plan = {
            let mut rng = lock_ignoring_poison(&self.rng);
            generate_fixtures(tournament, &roster, &mut *rng)?
        };

        for (player, group) in plan.groups {
            if let Some(p) = participants.iter().find(|p| p.player_id == player) {
                let mut p = p.clone();
                p.group = Some(group);
                self.store.update_participant(&p)?;
            }
        }
        let count = plan.matches.len();
        self.store.insert_matches(plan.matches)?;
        log::debug!("Scheduled {} matches for {}", count, tournament.id);
        Ok(())
    }

    fn roll_back_start(
        &self,
        tournament: &mut Tournament,
        participants: &[Participant],
    ) -> Result<(), TournamentError> {
        // Rows as read before scheduling, i.e. without groups.
        for p in participants {
            self.store.update_participant(p)?;
        }
        tournament.state = TournamentState::Draft;
        self.store.update_tournament(tournament)
    }

    /// Record a match result (admin only).
    ///
    /// When the match ends up PLAYED or LOCKED, the standings of both players are rebuilt
    /// (LEAGUE and HYBRID) and league completion is checked.
    pub fn record_result(
        &self,
        caller: PlayerId,
        match_id: MatchId,
        update: ResultUpdate,
    ) -> Result<GameMatch, TournamentError> {
        let tournament_id = self
            .store
            .game_match(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?
            .tournament_id;
        let lock = self.tournament_lock(tournament_id);
        let _guard = lock_ignoring_poison(&lock);

        let mut tournament = self.load_tournament(tournament_id)?;
        tournament.require_admin(caller)?;
        match tournament.state {
            TournamentState::Draft => return Err(TournamentError::NotStarted),
            TournamentState::Finished => return Err(TournamentError::AlreadyFinished),
            TournamentState::Ongoing => {}
        }

        let mut game = self
            .store
            .game_match(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        if round_is_closed(tournament.format, &game.round, &self.store.matches(tournament_id)) {
            return Err(TournamentError::RoundClosed(game.round.to_string()));
        }
        let score_1 = u32::try_from(update.score_1).map_err(|_| TournamentError::InvalidScore)?;
        let score_2 = u32::try_from(update.score_2).map_err(|_| TournamentError::InvalidScore)?;
        if let Some(w) = update.winner {
            let leader = match score_1.cmp(&score_2) {
                std::cmp::Ordering::Greater => Some(game.player_1),
                std::cmp::Ordering::Less => Some(game.player_2),
                std::cmp::Ordering::Equal => None,
            };
            if !game.involves(w) || leader.is_some_and(|l| l != w) {
                return Err(TournamentError::InvalidWinner);
            }
        }

        game.score_1 = score_1;
        game.score_2 = score_2;
        game.decision = update.decision;
        game.winner = update.winner;
        game.state = update.state;
        if game.state.counts_for_standings() && game.played_at.is_none() {
            game.played_at = Some(Utc::now());
        }
        self.store.update_match(&game)?;

        if game.state.counts_for_standings() {
            if tournament.format.has_league_component() {
                for player in [game.player_1, game.player_2] {
                    self.recompute_standing(tournament_id, player)?;
                }
            }
            self.check_league_finished(&mut tournament)?;
        }

        let message = format!(
            "{} {}-{} {} in {}",
            self.display_name(game.player_1),
            game.score_1,
            game.score_2,
            self.display_name(game.player_2),
            tournament.name
        );
        self.send(game.player_1, NotificationKind::MatchResult, &message);
        self.send(game.player_2, NotificationKind::MatchResult, &message);
        Ok(game)
    }

    /// Add a match by hand to the league side of an Ongoing tournament. Any participant may
    /// do this; both players must be participants. LEAGUE takes league rounds, HYBRID takes
    /// group rounds between two members of that group while the group stage is open.
    pub fn create_match(
        &self,
        caller: PlayerId,
        tournament_id: TournamentId,
        round: RoundLabel,
        player_1: PlayerId,
        player_2: PlayerId,
    ) -> Result<GameMatch, TournamentError> {
        let lock = self.tournament_lock(tournament_id);
        let _guard = lock_ignoring_poison(&lock);

        let tournament = self.load_tournament(tournament_id)?;
        if !tournament.is_admin(caller) && !self.is_participant(tournament_id, caller) {
            return Err(TournamentError::Authorization);
        }
        match tournament.state {
            TournamentState::Draft => return Err(TournamentError::NotStarted),
            TournamentState::Finished => return Err(TournamentError::AlreadyFinished),
            TournamentState::Ongoing => {}
        }
        if player_1 == player_2 {
            return Err(TournamentError::InvalidRoster(
                "a player cannot face themselves".to_string(),
            ));
        }

        let participants = self.store.participants(tournament_id);
        let group_of = |player: PlayerId| {
            participants
                .iter()
                .find(|p| p.player_id == player)
                .map(|p| p.group)
                .ok_or_else(|| {
                    TournamentError::InvalidRoster(format!("{player} is not in this tournament"))
                })
        };
        let groups = (group_of(player_1)?, group_of(player_2)?);

        let fits = match (tournament.format, &round) {
            (TournamentFormat::League, RoundLabel::League { .. }) => true,
            (TournamentFormat::Hybrid, RoundLabel::Group { group, .. }) => {
                groups == (Some(*group), Some(*group))
            }
            _ => false,
        };
        if !fits {
            return Err(TournamentError::InvalidRound(round.to_string()));
        }
        if round_is_closed(tournament.format, &round, &self.store.matches(tournament_id)) {
            return Err(TournamentError::RoundClosed(round.to_string()));
        }

        let mut game = GameMatch::new(tournament_id, round, player_1, player_2);
        game.created_by = Some(caller);
        self.store.insert_matches(vec![game.clone()])?;
        log::info!(
            "{} added match {} ({}) to {}",
            self.display_name(caller),
            game.id,
            game.round,
            tournament_id
        );
        Ok(game)
    }

    /// Rebuild and store one player's standing from every counted match. The full match
    /// set is read fresh each time.
    pub fn recompute_standing(
        &self,
        tournament_id: TournamentId,
        player: PlayerId,
    ) -> Result<Standing, TournamentError> {
        let standing = compute_standing(tournament_id, player, &self.store.matches(tournament_id));
        log::debug!(
            "Standing of {} in {}: {} pts from {} played",
            player,
            tournament_id,
            standing.points,
            standing.played
        );
        self.store.upsert_standing(standing.clone())?;
        Ok(standing)
    }

    /// LEAGUE tournaments finish once every match is LOCKED; the table leader wins.
    /// HYBRID finishes through its final instead.
    fn check_league_finished(&self, tournament: &mut Tournament) -> Result<(), TournamentError> {
        if tournament.format != TournamentFormat::League
            || tournament.state == TournamentState::Finished
        {
            return Ok(());
        }
        if !all_locked(&self.store.matches(tournament.id)) {
            return Ok(());
        }
        let standings = self.store.standings(tournament.id);
        if let Some(leader) = league_leader(&standings) {
            self.finish(tournament, leader.player_id)?;
        }
        Ok(())
    }

    fn finish(&self, tournament: &mut Tournament, winner: PlayerId) -> Result<(), TournamentError> {
        tournament.finish(winner);
        self.store.update_tournament(tournament)?;
        log::info!("Tournament {} finished, winner {}", tournament.id, winner);

        let message = format!("{} won {}", self.display_name(winner), tournament.name);
        for p in self.store.participants(tournament.id) {
            self.send(p.player_id, NotificationKind::MatchResult, &message);
        }
        Ok(())
    }

    /// Move a CUP or HYBRID tournament to its next knockout round, or finish it after the
    /// final. Calling this on a finished tournament is a no-op.
    pub fn advance_round(
        &self,
        caller: PlayerId,
        id: TournamentId,
    ) -> Result<RoundOutcome, TournamentError> {
        let lock = self.tournament_lock(id);
        let _guard = lock_ignoring_poison(&lock);

        let mut tournament = self.load_tournament(id)?;
        tournament.require_admin(caller)?;
        match tournament.state {
            TournamentState::Finished => return Ok(RoundOutcome::AlreadyFinished),
            TournamentState::Draft => return Err(TournamentError::NotStarted),
            TournamentState::Ongoing => {}
        }
        if !tournament.format.has_knockout() {
            return Err(TournamentError::InvalidState);
        }

        let participants = self.store.participants(id);
        let matches = self.store.matches(id);
        let advancement = {
            let mut rng = lock_ignoring_poison(&self.rng);
            plan_advance(&tournament, &participants, &matches, &mut *rng)?
        };

        match advancement {
            Advancement::NextRound { stage, matches } => {
                self.store.insert_matches(matches.clone())?;
                log::info!(
                    "Tournament {} advanced to {} ({} matches)",
                    id,
                    stage.as_str(),
                    matches.len()
                );
                Ok(RoundOutcome::NextRound { stage, matches })
            }
            Advancement::Champion(winner) => {
                self.finish(&mut tournament, winner)?;
                Ok(RoundOutcome::Finished { winner })
            }
        }
    }
}
