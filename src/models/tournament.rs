//! Tournament, participants, and the error type shared by every operation.

use crate::models::game::MatchId;
use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Wrong participant count or shape for the tournament format.
    #[error("Invalid roster: {0}")]
    InvalidRoster(String),
    /// Knockout match tied with no explicit winner.
    #[error("Match {0} is tied and has no winner")]
    UndecidedMatch(MatchId),
    /// Winner count that maps to no knockout stage.
    #[error("Cannot build a knockout round from {0} winners")]
    BracketSize(usize),
    /// A group has fewer than two ranked players after the group stage.
    #[error("Group {group} has fewer than 2 ranked players")]
    InsufficientPlayers { group: Group },
    #[error("Scores cannot be negative")]
    InvalidScore,
    #[error("Tournament has already started")]
    AlreadyStarted,
    #[error("Tournament is already finished")]
    AlreadyFinished,
    #[error("Tournament has not started yet")]
    NotStarted,
    #[error("Not authorized")]
    Authorization,
    /// Not every match of the current round is locked.
    #[error("Not all matches of the current round are locked")]
    IncompleteResults,
    /// Tournament is not in a state that allows this action.
    #[error("Invalid state for this action")]
    InvalidState,
    #[error("Name cannot be empty")]
    InvalidName,
    /// Round label does not belong to a stage that accepts hand-made matches.
    #[error("Round {0} does not fit this tournament")]
    InvalidRound(String),
    /// The match belongs to a round the tournament has already moved past.
    #[error("Round {0} is closed")]
    RoundClosed(String),
    /// Winner is not one of the two players, or contradicts the score.
    #[error("Winner must be one of the players and agree with the score")]
    InvalidWinner,
    #[error("Tournament not found")]
    TournamentNotFound(TournamentId),
    #[error("Match not found")]
    MatchNotFound(MatchId),
    #[error("Player not found")]
    PlayerNotFound(PlayerId),
    #[error("Join request not found")]
    RequestNotFound(Uuid),
    #[error("Invitation not found")]
    InvitationNotFound(Uuid),
    #[error("Friendship not found")]
    FriendshipNotFound(Uuid),
    #[error("Already joined")]
    AlreadyJoined,
    #[error("Request already sent or exists")]
    DuplicateRequest,
    #[error("Invalid join code")]
    InvalidJoinCode,
    #[error("Tournament is full")]
    TournamentFull,
    #[error("A player with this name already exists")]
    DuplicatePlayerName,
    #[error("Cannot add yourself")]
    SelfFriendship,
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentFormat {
    /// Round-robin, champion from the standings.
    #[default]
    League,
    /// Single elimination.
    Cup,
    /// Two round-robin groups, then semi-finals and final.
    Hybrid,
}

impl TournamentFormat {
    /// LEAGUE and HYBRID keep standings; CUP never does.
    pub fn has_league_component(self) -> bool {
        matches!(self, TournamentFormat::League | TournamentFormat::Hybrid)
    }

    pub fn has_knockout(self) -> bool {
        matches!(self, TournamentFormat::Cup | TournamentFormat::Hybrid)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// Lifecycle of a tournament. Only moves forward, except the rollback to Draft when
/// fixture generation fails during start.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentState {
    /// Players join; no fixtures yet.
    #[default]
    Draft,
    Ongoing,
    Finished,
}

/// Group of a HYBRID tournament.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Group {
    A,
    B,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::A => f.write_str("A"),
            Group::B => f.write_str("B"),
        }
    }
}

impl FromStr for Group {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Group::A),
            "B" => Ok(Group::B),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    #[default]
    Player,
}

/// Membership of a player in a tournament. Unique per (tournament, player).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    pub role: Role,
    /// Set when a HYBRID tournament starts.
    pub group: Option<Group>,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(tournament_id: TournamentId, player_id: PlayerId, role: Role) -> Self {
        Self {
            tournament_id,
            player_id,
            role,
            group: None,
            joined_at: Utc::now(),
        }
    }
}

/// Tournament record. `winner` is set only once the tournament is Finished.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub description: String,
    pub format: TournamentFormat,
    pub visibility: Visibility,
    /// Present only for private tournaments.
    pub join_code: Option<String>,
    pub max_players: u32,
    pub state: TournamentState,
    pub admin: PlayerId,
    pub winner: Option<PlayerId>,
    pub created_at: DateTime<Utc>,
}

/// Default cap on participants.
pub const DEFAULT_MAX_PLAYERS: u32 = 16;

impl Tournament {
    /// Create a new tournament in Draft. Private tournaments get an 8-character join code.
    pub fn new(
        name: impl Into<String>,
        format: TournamentFormat,
        visibility: Visibility,
        admin: PlayerId,
    ) -> Self {
        let join_code = match visibility {
            Visibility::Private => Some(generate_join_code()),
            Visibility::Public => None,
        };
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            format,
            visibility,
            join_code,
            max_players: DEFAULT_MAX_PLAYERS,
            state: TournamentState::Draft,
            admin,
            winner: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self, player: PlayerId) -> bool {
        self.admin == player
    }

    /// Fail with `Authorization` unless `caller` administers this tournament.
    pub fn require_admin(&self, caller: PlayerId) -> Result<(), TournamentError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(TournamentError::Authorization)
        }
    }

    /// Move to Finished and record the champion.
    pub fn finish(&mut self, winner: PlayerId) {
        self.state = TournamentState::Finished;
        self.winner = Some(winner);
    }

    /// Copy as shown to `viewer`: only the admin sees the join code.
    pub fn seen_by(mut self, viewer: PlayerId) -> Self {
        if !self.is_admin(viewer) {
            self.join_code = None;
        }
        self
    }
}

fn generate_join_code() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_ascii_uppercase()
}
