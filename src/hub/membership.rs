//! Joining tournaments: join codes, join requests, and invitations.

use super::{lock_ignoring_poison, TournamentHub};
use crate::models::{
    Invitation, InvitationStatus, JoinRequest, NotificationKind, Participant, PlayerId,
    RequestStatus, Role, Tournament, TournamentError, TournamentId, TournamentState, Visibility,
};
use crate::notify::NotificationSink;
use crate::store::TournamentStore;
use serde::Serialize;
use uuid::Uuid;

/// What `join` did.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JoinOutcome {
    /// Private tournament, code matched: the caller is now a participant.
    Joined,
    /// Public tournament: a request now waits for the admin.
    Requested { request: JoinRequest },
}

impl<S: TournamentStore, N: NotificationSink> TournamentHub<S, N> {
    /// Add `player` as a participant. Only while Draft and below `max_players`.
    fn admit(&self, tournament: &Tournament, player: PlayerId) -> Result<(), TournamentError> {
        match tournament.state {
            TournamentState::Draft => {}
            TournamentState::Ongoing => return Err(TournamentError::AlreadyStarted),
            TournamentState::Finished => return Err(TournamentError::AlreadyFinished),
        }
        if self.store.participants(tournament.id).len() >= tournament.max_players as usize {
            return Err(TournamentError::TournamentFull);
        }
        self.store
            .insert_participant(Participant::new(tournament.id, player, Role::Player))
    }

    /// Join a tournament. Private ones need the join code and admit immediately; public
    /// ones create a pending request and notify the admin.
    pub fn join(
        &self,
        caller: PlayerId,
        id: TournamentId,
        join_code: Option<&str>,
    ) -> Result<JoinOutcome, TournamentError> {
        let lock = self.tournament_lock(id);
        let _guard = lock_ignoring_poison(&lock);

        let tournament = self.load_tournament(id)?;
        let player = self.load_player(caller)?;
        if self.is_participant(id, caller) {
            return Err(TournamentError::AlreadyJoined);
        }

        match tournament.visibility {
            Visibility::Private => {
                if join_code != tournament.join_code.as_deref() {
                    return Err(TournamentError::InvalidJoinCode);
                }
                self.admit(&tournament, caller)?;
                log::info!("{} joined {} with code", player.name, id);
                Ok(JoinOutcome::Joined)
            }
            Visibility::Public => {
                if tournament.state != TournamentState::Draft {
                    return Err(TournamentError::AlreadyStarted);
                }
                let pending = self.store.join_requests().into_iter().any(|r| {
                    r.tournament_id == id
                        && r.player_id == caller
                        && r.status == RequestStatus::Pending
                });
                if pending {
                    return Err(TournamentError::DuplicateRequest);
                }
                let request = JoinRequest::new(id, caller);
                self.store.insert_join_request(request.clone())?;
                self.send(
                    tournament.admin,
                    NotificationKind::TournamentRequest,
                    &format!("{} wants to join {}", player.name, tournament.name),
                );
                Ok(JoinOutcome::Requested { request })
            }
        }
    }

    /// Load a pending request and its tournament, checking the caller is the admin.
    fn pending_request_for_admin(
        &self,
        caller: PlayerId,
        request: &JoinRequest,
    ) -> Result<Tournament, TournamentError> {
        let tournament = self.load_tournament(request.tournament_id)?;
        tournament.require_admin(caller)?;
        if request.status != RequestStatus::Pending {
            return Err(TournamentError::InvalidState);
        }
        Ok(tournament)
    }

    fn load_request(&self, id: Uuid) -> Result<JoinRequest, TournamentError> {
        self.store
            .join_request(id)
            .ok_or(TournamentError::RequestNotFound(id))
    }

    /// Admin accepts a join request; the requester becomes a participant.
    pub fn approve_request(
        &self,
        caller: PlayerId,
        request_id: Uuid,
    ) -> Result<JoinRequest, TournamentError> {
        let tournament_id = self.load_request(request_id)?.tournament_id;
        let lock = self.tournament_lock(tournament_id);
        let _guard = lock_ignoring_poison(&lock);

        let mut request = self.load_request(request_id)?;
        let tournament = self.pending_request_for_admin(caller, &request)?;
        self.admit(&tournament, request.player_id)?;
        request.status = RequestStatus::Accepted;
        self.store.update_join_request(&request)?;

        self.send(
            request.player_id,
            NotificationKind::TournamentRequest,
            &format!("Your request to join {} was approved", tournament.name),
        );
        Ok(request)
    }

    /// Admin rejects a join request; the requester is told.
    pub fn reject_request(
        &self,
        caller: PlayerId,
        request_id: Uuid,
    ) -> Result<JoinRequest, TournamentError> {
        let tournament_id = self.load_request(request_id)?.tournament_id;
        let lock = self.tournament_lock(tournament_id);
        let _guard = lock_ignoring_poison(&lock);

        let mut request = self.load_request(request_id)?;
        let tournament = self.pending_request_for_admin(caller, &request)?;
        request.status = RequestStatus::Rejected;
        self.store.update_join_request(&request)?;

        self.send(
            request.player_id,
            NotificationKind::TournamentRequest,
            &format!("Your request to join {} was rejected", tournament.name),
        );
        Ok(request)
    }

    /// Requests for tournaments the caller administers, plus the caller's own.
    pub fn join_requests_for(&self, caller: PlayerId) -> Vec<JoinRequest> {
        self.store
            .join_requests()
            .into_iter()
            .filter(|r| {
                r.player_id == caller
                    || self
                        .store
                        .tournament(r.tournament_id)
                        .is_some_and(|t| t.is_admin(caller))
            })
            .collect()
    }

    /// Admin invites a player.
    pub fn invite(
        &self,
        caller: PlayerId,
        id: TournamentId,
        receiver: PlayerId,
    ) -> Result<Invitation, TournamentError> {
        let lock = self.tournament_lock(id);
        let _guard = lock_ignoring_poison(&lock);

        let tournament = self.load_tournament(id)?;
        tournament.require_admin(caller)?;
        if tournament.state != TournamentState::Draft {
            return Err(TournamentError::AlreadyStarted);
        }
        self.load_player(receiver)?;
        if self.is_participant(id, receiver) {
            return Err(TournamentError::AlreadyJoined);
        }
        let pending = self.store.invitations().into_iter().any(|i| {
            i.tournament_id == id && i.receiver == receiver && i.status == InvitationStatus::Pending
        });
        if pending {
            return Err(TournamentError::DuplicateRequest);
        }

        let invitation = Invitation::new(id, caller, receiver);
        self.store.insert_invitation(invitation.clone())?;
        self.send(
            receiver,
            NotificationKind::Invitation,
            &format!(
                "{} invited you to {}",
                self.display_name(caller),
                tournament.name
            ),
        );
        Ok(invitation)
    }

    /// Receiver accepts (joining the tournament) or declines an invitation.
    pub fn respond_to_invitation(
        &self,
        caller: PlayerId,
        invitation_id: Uuid,
        accept: bool,
    ) -> Result<Invitation, TournamentError> {
        let load = || {
            self.store
                .invitation(invitation_id)
                .ok_or(TournamentError::InvitationNotFound(invitation_id))
        };
        let lock = self.tournament_lock(load()?.tournament_id);
        let _guard = lock_ignoring_poison(&lock);

        let mut invitation = load()?;
        if invitation.receiver != caller {
            return Err(TournamentError::Authorization);
        }
        if invitation.status != InvitationStatus::Pending {
            return Err(TournamentError::InvalidState);
        }
        let tournament = self.load_tournament(invitation.tournament_id)?;

        let verb = if accept {
            self.admit(&tournament, caller)?;
            invitation.status = InvitationStatus::Accepted;
            "accepted"
        } else {
            invitation.status = InvitationStatus::Declined;
            "declined"
        };
        self.store.update_invitation(&invitation)?;

        self.send(
            invitation.sender,
            NotificationKind::Invitation,
            &format!(
                "{} {} your invitation to {}",
                self.display_name(caller),
                verb,
                tournament.name
            ),
        );
        Ok(invitation)
    }

    /// Invitations the caller sent or received.
    pub fn invitations_for(&self, caller: PlayerId) -> Vec<Invitation> {
        self.store
            .invitations()
            .into_iter()
            .filter(|i| i.sender == caller || i.receiver == caller)
            .collect()
    }
}
