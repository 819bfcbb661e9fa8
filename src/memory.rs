//! In-memory reference adapters for the storage and transport ports. The
//! binary serves from these when no external collaborators are wired in, and
//! the test suites share them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::activity::{
    ActivityRecord, ActivityStore, ActivityStoreError, Notification, NotificationError,
    NotificationPort,
};
use crate::assessments::domain::{Assessment, PublicAssessmentId};
use crate::assessments::repository::{AssessmentRepository, RepositoryError};
use crate::directory::domain::{
    Invitation, InvitationToken, Role, UserAccount, UserId, UserStatus,
};
use crate::directory::repository::{DirectoryStoreError, UserDirectory};

#[derive(Default, Clone)]
pub struct MemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<PublicAssessmentId, Assessment>>>,
}

impl AssessmentRepository for MemoryAssessmentRepository {
    fn insert(&self, record: Assessment) -> Result<Assessment, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.public_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.public_id, record.clone());
        Ok(record)
    }

    fn update(&self, record: Assessment, expected_version: u64) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard
            .get(&record.public_id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != expected_version {
            return Err(RepositoryError::VersionMismatch);
        }
        guard.insert(record.public_id, record);
        Ok(())
    }

    fn fetch_by_public_id(
        &self,
        public_id: &PublicAssessmentId,
    ) -> Result<Option<Assessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(public_id).cloned())
    }

    fn list(&self) -> Result<Vec<Assessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<Assessment> = guard.values().cloned().collect();
        records.sort_by_key(|record| record.id);
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub struct MemoryDirectory {
    users: Arc<Mutex<HashMap<UserId, UserAccount>>>,
    invitations: Arc<Mutex<HashMap<InvitationToken, Invitation>>>,
}

impl MemoryDirectory {
    /// Seed a ready-to-use administrator, returning its id. Used by the
    /// server bootstrap and by tests.
    pub fn seed_admin(&self, email: &str, full_name: &str) -> UserId {
        let now = Utc::now();
        let account = UserAccount {
            id: UserId::generate(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            role: Role::Admin,
            status: UserStatus::Active,
            subscription: None,
            created_at: now,
            updated_at: now,
        };
        let id = account.id;
        self.users
            .lock()
            .expect("directory mutex poisoned")
            .insert(id, account);
        id
    }
}

impl UserDirectory for MemoryDirectory {
    fn insert_user(&self, account: UserAccount) -> Result<UserAccount, DirectoryStoreError> {
        let mut guard = self.users.lock().expect("directory mutex poisoned");
        if guard.contains_key(&account.id) {
            return Err(DirectoryStoreError::Conflict);
        }
        guard.insert(account.id, account.clone());
        Ok(account)
    }

    fn update_user(&self, account: UserAccount) -> Result<(), DirectoryStoreError> {
        let mut guard = self.users.lock().expect("directory mutex poisoned");
        if !guard.contains_key(&account.id) {
            return Err(DirectoryStoreError::NotFound);
        }
        guard.insert(account.id, account);
        Ok(())
    }

    fn find_user(&self, id: &UserId) -> Result<Option<UserAccount>, DirectoryStoreError> {
        let guard = self.users.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, DirectoryStoreError> {
        let guard = self.users.lock().expect("directory mutex poisoned");
        Ok(guard
            .values()
            .find(|account| account.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn admins(&self) -> Result<Vec<UserAccount>, DirectoryStoreError> {
        let guard = self.users.lock().expect("directory mutex poisoned");
        let mut admins: Vec<UserAccount> = guard
            .values()
            .filter(|account| account.role == Role::Admin && account.status == UserStatus::Active)
            .cloned()
            .collect();
        admins.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(admins)
    }

    fn insert_invitation(&self, invitation: Invitation) -> Result<(), DirectoryStoreError> {
        let mut guard = self.invitations.lock().expect("invitation mutex poisoned");
        if guard.contains_key(&invitation.token) {
            return Err(DirectoryStoreError::Conflict);
        }
        guard.insert(invitation.token, invitation);
        Ok(())
    }

    fn update_invitation(&self, invitation: Invitation) -> Result<(), DirectoryStoreError> {
        let mut guard = self.invitations.lock().expect("invitation mutex poisoned");
        if !guard.contains_key(&invitation.token) {
            return Err(DirectoryStoreError::NotFound);
        }
        guard.insert(invitation.token, invitation);
        Ok(())
    }

    fn find_invitation(
        &self,
        token: &InvitationToken,
    ) -> Result<Option<Invitation>, DirectoryStoreError> {
        let guard = self.invitations.lock().expect("invitation mutex poisoned");
        Ok(guard.get(token).cloned())
    }
}

#[derive(Default, Clone)]
pub struct MemoryActivityStore {
    records: Arc<Mutex<Vec<ActivityRecord>>>,
}

impl MemoryActivityStore {
    pub fn records(&self) -> Vec<ActivityRecord> {
        self.records.lock().expect("activity mutex poisoned").clone()
    }
}

impl ActivityStore for MemoryActivityStore {
    fn append(&self, record: ActivityRecord) -> Result<(), ActivityStoreError> {
        self.records
            .lock()
            .expect("activity mutex poisoned")
            .push(record);
        Ok(())
    }

    fn for_assessment(
        &self,
        assessment: &PublicAssessmentId,
    ) -> Result<Vec<ActivityRecord>, ActivityStoreError> {
        let guard = self.records.lock().expect("activity mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| record.assessment.as_ref() == Some(assessment))
            .cloned()
            .collect())
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<ActivityRecord>, ActivityStoreError> {
        let guard = self.records.lock().expect("activity mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| record.target_user.as_ref() == Some(user))
            .cloned()
            .collect())
    }
}

/// Notifier capturing deliveries so tests can assert fan-out.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    deliveries: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn deliveries(&self) -> Vec<Notification> {
        self.deliveries
            .lock()
            .expect("notifier mutex poisoned")
            .clone()
    }
}

impl NotificationPort for RecordingNotifier {
    fn deliver(&self, notification: Notification) -> Result<(), NotificationError> {
        self.deliveries
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}
