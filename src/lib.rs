//! Tournament hub: leagues, cups and hybrid tournaments with automatic fixtures,
//! standings and knockout progression.

pub mod config;
pub mod hub;
pub mod logic;
pub mod models;
pub mod notify;
pub mod store;

pub use config::ServerConfig;
pub use hub::{JoinOutcome, NewTournament, ResultUpdate, RoundOutcome, TournamentHub};
pub use logic::{
    compute_standing, current_stage, generate_fixtures, plan_advance, round_is_closed,
    round_robin_pairings, Advancement, CurrentStage, FixturePlan,
};
pub use models::{
    DecisionMethod, Friendship, GameMatch, Group, Invitation, InvitationStatus, JoinRequest,
    KnockoutStage, MatchId, MatchState, Notification, NotificationKind, Participant, Player,
    PlayerId, RequestStatus, Role, RoundLabel, Standing, Tournament, TournamentError,
    TournamentFormat, TournamentId, TournamentState, Visibility,
};
pub use notify::{InMemoryNotifier, LogNotifier, NotificationSink, NotifyError};
pub use store::{InMemoryStore, TournamentStore};
