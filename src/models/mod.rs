//! Data structures: players, tournaments, matches, standings, membership, notifications.

mod game;
mod membership;
mod notification;
mod player;
mod standing;
mod tournament;

pub use game::{DecisionMethod, GameMatch, KnockoutStage, MatchId, MatchState, RoundLabel};
pub use membership::{Friendship, Invitation, InvitationStatus, JoinRequest, RequestStatus};
pub use notification::{Notification, NotificationKind};
pub use player::{Player, PlayerId};
pub use standing::{Standing, POINTS_PER_DRAW, POINTS_PER_WIN};
pub use tournament::{
    Group, Participant, Role, Tournament, TournamentError, TournamentFormat, TournamentId,
    TournamentState, Visibility, DEFAULT_MAX_PLAYERS,
};
