//! Friend requests between players.

use super::{lock_ignoring_poison, TournamentHub};
use crate::models::{Friendship, NotificationKind, PlayerId, RequestStatus, TournamentError};
use crate::notify::NotificationSink;
use crate::store::TournamentStore;
use uuid::Uuid;

impl<S: TournamentStore, N: NotificationSink> TournamentHub<S, N> {
    /// Send a friend request. One friendship per pair, whichever side asked first.
    pub fn send_friend_request(
        &self,
        caller: PlayerId,
        receiver: PlayerId,
    ) -> Result<Friendship, TournamentError> {
        let _guard = lock_ignoring_poison(&self.social);
        let sender = self.load_player(caller)?;
        self.load_player(receiver)?;
        if caller == receiver {
            return Err(TournamentError::SelfFriendship);
        }
        if self
            .store
            .friendships()
            .iter()
            .any(|f| f.links(caller, receiver))
        {
            return Err(TournamentError::DuplicateRequest);
        }

        let friendship = Friendship::new(caller, receiver);
        self.store.insert_friendship(friendship.clone())?;
        self.send(
            receiver,
            NotificationKind::FriendRequest,
            &format!("{} sent you a friend request", sender.name),
        );
        Ok(friendship)
    }

    /// Accept or reject a pending request addressed to the caller.
    pub fn respond_to_friend_request(
        &self,
        caller: PlayerId,
        friendship_id: Uuid,
        accept: bool,
    ) -> Result<Friendship, TournamentError> {
        let _guard = lock_ignoring_poison(&self.social);
        let mut friendship = self
            .store
            .friendship(friendship_id)
            .filter(|f| f.receiver == caller && f.status == RequestStatus::Pending)
            .ok_or(TournamentError::FriendshipNotFound(friendship_id))?;

        friendship.status = if accept {
            RequestStatus::Accepted
        } else {
            RequestStatus::Rejected
        };
        self.store.update_friendship(&friendship)?;
        Ok(friendship)
    }

    /// Friendships the caller is part of.
    pub fn friendships_for(&self, caller: PlayerId) -> Vec<Friendship> {
        self.store
            .friendships()
            .into_iter()
            .filter(|f| f.sender == caller || f.receiver == caller)
            .collect()
    }
}
