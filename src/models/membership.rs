//! Join requests, invitations, and friendships.

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// A player asking to join a public tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: Uuid,
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl JoinRequest {
    pub fn new(tournament_id: TournamentId, player_id: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            player_id,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

/// An admin inviting a player into a tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    pub tournament_id: TournamentId,
    pub sender: PlayerId,
    pub receiver: PlayerId,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn new(tournament_id: TournamentId, sender: PlayerId, receiver: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            sender,
            receiver,
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Friendship between two players. Directional until accepted.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Friendship {
    pub id: Uuid,
    pub sender: PlayerId,
    pub receiver: PlayerId,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    pub fn new(sender: PlayerId, receiver: PlayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            receiver,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// True when the friendship links `a` and `b`, in either direction.
    pub fn links(&self, a: PlayerId, b: PlayerId) -> bool {
        (self.sender == a && self.receiver == b) || (self.sender == b && self.receiver == a)
    }
}
