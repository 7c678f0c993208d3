//! Notification records produced for players.

use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    FriendRequest,
    TournamentRequest,
    Invitation,
    MatchResult,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub receiver: PlayerId,
    pub kind: NotificationKind,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(receiver: PlayerId, kind: NotificationKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            receiver,
            kind,
            content: content.into(),
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
