//! Notification sinks. Delivery is fire-and-forget: the hub logs failures and moves on.

use crate::models::{Notification, NotificationKind, PlayerId};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum NotifyError {
    #[error("notification sink unavailable: {0}")]
    Unavailable(String),
}

pub trait NotificationSink: Send + Sync {
    fn notify(
        &self,
        receiver: PlayerId,
        kind: NotificationKind,
        message: &str,
    ) -> Result<(), NotifyError>;
}

/// Writes notifications to the log only.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(
        &self,
        receiver: PlayerId,
        kind: NotificationKind,
        message: &str,
    ) -> Result<(), NotifyError> {
        log::info!("notify {} ({:?}): {}", receiver, kind, message);
        Ok(())
    }
}

/// Keeps notifications in memory so players can list them and mark them read.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    items: RwLock<Vec<Notification>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications for `receiver`, newest first.
    pub fn for_receiver(&self, receiver: PlayerId) -> Vec<Notification> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let mut mine: Vec<_> = items
            .iter()
            .filter(|n| n.receiver == receiver)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        mine
    }

    /// Mark one of `receiver`'s notifications read. False if it is not theirs or unknown.
    pub fn mark_read(&self, receiver: PlayerId, id: Uuid) -> bool {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        match items.iter_mut().find(|n| n.id == id && n.receiver == receiver) {
            Some(n) => {
                n.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&self, receiver: PlayerId) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items
            .iter_mut()
            .filter(|n| n.receiver == receiver)
            .for_each(|n| n.is_read = true);
    }
}

impl NotificationSink for InMemoryNotifier {
    fn notify(
        &self,
        receiver: PlayerId,
        kind: NotificationKind,
        message: &str,
    ) -> Result<(), NotifyError> {
        self.items
            .write()
            .map_err(|_| NotifyError::Unavailable("lock poisoned".to_string()))?
            .push(Notification::new(receiver, kind, message));
        Ok(())
    }
}
