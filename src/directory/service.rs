use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;

use super::domain::{
    ClientSubscription, Invitation, InvitationStatus, InvitationToken, Role, UserAccount, UserId,
    UserStatus,
};
use super::repository::{DirectoryStoreError, UserDirectory};
use crate::activity::{ActivityEntry, ActivityPriority, ActivityRecorder, ActivityType};

const INVITATION_VALIDITY_DAYS: i64 = 7;

/// Service covering admin user management: direct creation, invitations,
/// suspension, and subscription updates.
pub struct DirectoryService<D> {
    directory: Arc<D>,
    recorder: ActivityRecorder,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("administrator role required to {action}")]
    AdminRequired { action: &'static str },
    #[error("actor {0} is not a registered account")]
    UnknownActor(UserId),
    #[error("account is not active")]
    ActorInactive,
    #[error("account {0} not found")]
    UserNotFound(UserId),
    #[error("an account with email '{0}' already exists")]
    EmailTaken(String),
    #[error("invitation not found")]
    InvitationNotFound,
    #[error("invitation is no longer open")]
    InvitationClosed,
    #[error("subscriptions apply to client accounts only")]
    SubscriptionRequiresClient,
    #[error(transparent)]
    Store(#[from] DirectoryStoreError),
}

impl<D> DirectoryService<D>
where
    D: UserDirectory + 'static,
{
    pub fn new(directory: Arc<D>, recorder: ActivityRecorder) -> Self {
        Self {
            directory,
            recorder,
        }
    }

    fn require_admin(&self, actor_id: &UserId, action: &'static str) -> Result<UserAccount, DirectoryError> {
        let actor = self
            .directory
            .find_user(actor_id)?
            .ok_or(DirectoryError::UnknownActor(*actor_id))?;
        if actor.status != UserStatus::Active {
            return Err(DirectoryError::ActorInactive);
        }
        if actor.role != Role::Admin {
            return Err(DirectoryError::AdminRequired { action });
        }
        Ok(actor)
    }

    /// Direct account creation by an administrator; the account is active
    /// immediately.
    pub fn create_user(
        &self,
        actor_id: &UserId,
        email: impl Into<String>,
        full_name: impl Into<String>,
        role: Role,
        subscription: Option<ClientSubscription>,
    ) -> Result<UserAccount, DirectoryError> {
        let admin = self.require_admin(actor_id, "create accounts")?;
        let email = email.into();

        if self.directory.find_user_by_email(&email)?.is_some() {
            return Err(DirectoryError::EmailTaken(email));
        }

        let now = Utc::now();
        let account = UserAccount {
            id: UserId::generate(),
            email,
            full_name: full_name.into(),
            role,
            status: UserStatus::Active,
            subscription: if role == Role::Client {
                subscription
            } else {
                None
            },
            created_at: now,
            updated_at: now,
        };

        let stored = self.directory.insert_user(account)?;
        self.recorder.record(
            ActivityEntry::new(
                admin.id,
                ActivityType::AccountCreated,
                "Account created",
                format!(
                    "An administrator created your {} account.",
                    stored.role.label()
                ),
            )
            .for_user(stored.id)
            .metadata(json!({ "role": stored.role.label() })),
        );
        Ok(stored)
    }

    /// Issue an invitation. Acceptance creates the account.
    pub fn invite(
        &self,
        actor_id: &UserId,
        email: impl Into<String>,
        role: Role,
        message: Option<String>,
    ) -> Result<Invitation, DirectoryError> {
        let admin = self.require_admin(actor_id, "invite users")?;
        let email = email.into();

        if self.directory.find_user_by_email(&email)?.is_some() {
            return Err(DirectoryError::EmailTaken(email));
        }

        let now = Utc::now();
        let invitation = Invitation {
            token: InvitationToken::generate(),
            email,
            role,
            invited_by: admin.id,
            message,
            status: InvitationStatus::Pending,
            expires_at: now + Duration::days(INVITATION_VALIDITY_DAYS),
            accepted_by: None,
            created_at: now,
        };

        self.directory.insert_invitation(invitation.clone())?;
        self.recorder.record(
            ActivityEntry::new(
                admin.id,
                ActivityType::UserInvited,
                "Invitation sent",
                format!(
                    "You invited {} to join as {}.",
                    invitation.email,
                    invitation.role.label()
                ),
            )
            .priority(ActivityPriority::Low),
        );
        Ok(invitation)
    }

    /// Accept an open invitation, creating an active account with the
    /// invited role.
    pub fn accept_invitation(
        &self,
        token: &InvitationToken,
        full_name: impl Into<String>,
    ) -> Result<UserAccount, DirectoryError> {
        let mut invitation = self
            .directory
            .find_invitation(token)?
            .ok_or(DirectoryError::InvitationNotFound)?;

        let now = Utc::now();
        if !invitation.is_open(now) {
            if invitation.status == InvitationStatus::Pending {
                invitation.status = InvitationStatus::Expired;
                self.directory.update_invitation(invitation)?;
            }
            return Err(DirectoryError::InvitationClosed);
        }

        if self
            .directory
            .find_user_by_email(&invitation.email)?
            .is_some()
        {
            return Err(DirectoryError::EmailTaken(invitation.email));
        }

        let account = UserAccount {
            id: UserId::generate(),
            email: invitation.email.clone(),
            full_name: full_name.into(),
            role: invitation.role,
            status: UserStatus::Active,
            subscription: None,
            created_at: now,
            updated_at: now,
        };
        let stored = self.directory.insert_user(account)?;

        invitation.status = InvitationStatus::Accepted;
        invitation.accepted_by = Some(stored.id);
        self.directory.update_invitation(invitation.clone())?;

        self.recorder.record(
            ActivityEntry::new(
                stored.id,
                ActivityType::InvitationAccepted,
                "Invitation accepted",
                format!("{} accepted your invitation.", stored.email),
            )
            .for_user(invitation.invited_by),
        );
        Ok(stored)
    }

    /// Suspend an account. Accounts are never hard-deleted.
    pub fn suspend_user(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
    ) -> Result<UserAccount, DirectoryError> {
        self.set_status(actor_id, user_id, UserStatus::Suspended, "suspend accounts")
    }

    pub fn reactivate_user(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
    ) -> Result<UserAccount, DirectoryError> {
        self.set_status(actor_id, user_id, UserStatus::Active, "reactivate accounts")
    }

    fn set_status(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
        status: UserStatus,
        action: &'static str,
    ) -> Result<UserAccount, DirectoryError> {
        let admin = self.require_admin(actor_id, action)?;
        let mut account = self
            .directory
            .find_user(user_id)?
            .ok_or(DirectoryError::UserNotFound(*user_id))?;

        if account.status != status {
            account.status = status;
            account.updated_at = Utc::now();
            self.directory.update_user(account.clone())?;

            let (activity_type, title) = match status {
                UserStatus::Suspended => (ActivityType::UserSuspended, "Account suspended"),
                _ => (ActivityType::UserReactivated, "Account reactivated"),
            };
            self.recorder.record(
                ActivityEntry::new(
                    admin.id,
                    activity_type,
                    title,
                    format!("Your account status is now {}.", account.status.label()),
                )
                .for_user(account.id)
                .priority(ActivityPriority::High),
            );
        }
        Ok(account)
    }

    /// Replace a client's subscription.
    pub fn update_subscription(
        &self,
        actor_id: &UserId,
        user_id: &UserId,
        subscription: ClientSubscription,
    ) -> Result<UserAccount, DirectoryError> {
        let admin = self.require_admin(actor_id, "manage subscriptions")?;
        let mut account = self
            .directory
            .find_user(user_id)?
            .ok_or(DirectoryError::UserNotFound(*user_id))?;

        if account.role != Role::Client {
            return Err(DirectoryError::SubscriptionRequiresClient);
        }

        account.subscription = Some(subscription);
        account.updated_at = Utc::now();
        self.directory.update_user(account.clone())?;

        self.recorder.record(
            ActivityEntry::new(
                admin.id,
                ActivityType::SubscriptionUpdated,
                "Subscription updated",
                "Your subscription details were updated by an administrator.",
            )
            .for_user(account.id)
            .metadata(json!({
                "tier": subscription.tier,
                "status": subscription.status,
            })),
        );
        Ok(account)
    }

    pub fn find_user(&self, id: &UserId) -> Result<Option<UserAccount>, DirectoryError> {
        Ok(self.directory.find_user(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityRecorder, NoopNotifier};
    use crate::memory::{MemoryActivityStore, MemoryDirectory};
    use std::sync::Arc;

    fn service() -> (DirectoryService<MemoryDirectory>, Arc<MemoryDirectory>, UserId) {
        let directory = Arc::new(MemoryDirectory::default());
        let admin = directory.seed_admin("ops@greda.example", "Platform Ops");
        let recorder = ActivityRecorder::new(
            Arc::new(MemoryActivityStore::default()),
            Arc::new(NoopNotifier),
        );
        (
            DirectoryService::new(directory.clone(), recorder),
            directory,
            admin,
        )
    }

    #[test]
    fn invite_then_accept_creates_active_account() {
        let (service, _, admin) = service();
        let invitation = service
            .invite(&admin, "kwame@client.example", Role::Assessor, None)
            .expect("invitation issued");

        let account = service
            .accept_invitation(&invitation.token, "Kwame Mensah")
            .expect("invitation accepted");

        assert_eq!(account.role, Role::Assessor);
        assert_eq!(account.status, UserStatus::Active);
        assert_eq!(account.email, "kwame@client.example");
    }

    #[test]
    fn accepting_twice_fails_once_closed() {
        let (service, _, admin) = service();
        let invitation = service
            .invite(&admin, "ama@client.example", Role::Client, None)
            .expect("invitation issued");
        service
            .accept_invitation(&invitation.token, "Ama Owusu")
            .expect("first acceptance");

        match service.accept_invitation(&invitation.token, "Ama Owusu") {
            Err(DirectoryError::InvitationClosed) => {}
            other => panic!("expected closed invitation, got {other:?}"),
        }
    }

    #[test]
    fn non_admin_cannot_invite() {
        let (service, _, admin) = service();
        let assessor = service
            .create_user(&admin, "field@greda.example", "Field Assessor", Role::Assessor, None)
            .expect("assessor created");

        match service.invite(&assessor.id, "x@y.example", Role::Client, None) {
            Err(DirectoryError::AdminRequired { .. }) => {}
            other => panic!("expected admin requirement, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (service, _, admin) = service();
        service
            .create_user(&admin, "dup@greda.example", "First", Role::Client, None)
            .expect("first account");

        match service.create_user(&admin, "dup@greda.example", "Second", Role::Client, None) {
            Err(DirectoryError::EmailTaken(email)) => assert_eq!(email, "dup@greda.example"),
            other => panic!("expected email conflict, got {other:?}"),
        }
    }

    #[test]
    fn subscription_updates_require_client_accounts() {
        let (service, _, admin) = service();
        let assessor = service
            .create_user(&admin, "a@greda.example", "Assessor", Role::Assessor, None)
            .expect("assessor created");

        let subscription = ClientSubscription {
            tier: crate::directory::domain::SubscriptionTier::Professional,
            status: crate::directory::domain::SubscriptionStatus::Active,
        };
        match service.update_subscription(&admin, &assessor.id, subscription) {
            Err(DirectoryError::SubscriptionRequiresClient) => {}
            other => panic!("expected client requirement, got {other:?}"),
        }
    }

    #[test]
    fn suspension_flips_status_without_deleting() {
        let (service, directory, admin) = service();
        let client = service
            .create_user(&admin, "c@greda.example", "Client", Role::Client, None)
            .expect("client created");

        let suspended = service
            .suspend_user(&admin, &client.id)
            .expect("suspension applies");
        assert_eq!(suspended.status, UserStatus::Suspended);
        assert!(directory
            .find_user(&client.id)
            .expect("lookup succeeds")
            .is_some());

        let reactivated = service
            .reactivate_user(&admin, &client.id)
            .expect("reactivation applies");
        assert_eq!(reactivated.status, UserStatus::Active);
    }
}
