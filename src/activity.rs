//! Append-only activity log with best-effort notification fan-out.
//!
//! Recording is fire-and-forget: a failed append or delivery is reported via
//! `tracing` and swallowed so the triggering transition never rolls back. The
//! entry is appended before delivery is attempted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::assessments::domain::PublicAssessmentId;
use crate::directory::domain::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    AccountCreated,
    AssessmentCreated,
    AssessmentCompleted,
    AssessmentLocked,
    AssessmentUnlocked,
    AssessmentArchived,
    EditRequestCreated,
    EditRequestApproved,
    EditRequestDenied,
    UserInvited,
    InvitationAccepted,
    UserSuspended,
    UserReactivated,
    SubscriptionUpdated,
}

impl ActivityType {
    pub const fn key(self) -> &'static str {
        match self {
            Self::AccountCreated => "account_created",
            Self::AssessmentCreated => "assessment_created",
            Self::AssessmentCompleted => "assessment_completed",
            Self::AssessmentLocked => "assessment_locked",
            Self::AssessmentUnlocked => "assessment_unlocked",
            Self::AssessmentArchived => "assessment_archived",
            Self::EditRequestCreated => "edit_request_created",
            Self::EditRequestApproved => "edit_request_approved",
            Self::EditRequestDenied => "edit_request_denied",
            Self::UserInvited => "user_invited",
            Self::InvitationAccepted => "invitation_accepted",
            Self::UserSuspended => "user_suspended",
            Self::UserReactivated => "user_reactivated",
            Self::SubscriptionUpdated => "subscription_updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityPriority {
    Low,
    Medium,
    High,
}

/// One immutable audit-trail entry. Entries are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub actor: UserId,
    pub activity_type: ActivityType,
    pub title: String,
    pub description: String,
    pub target_user: Option<UserId>,
    pub assessment: Option<PublicAssessmentId>,
    pub priority: ActivityPriority,
    pub metadata: Value,
    pub recorded_at: DateTime<Utc>,
}

/// Builder-style input for one entry; the recorder stamps id and time.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub actor: UserId,
    pub activity_type: ActivityType,
    pub title: String,
    pub description: String,
    pub target_user: Option<UserId>,
    pub assessment: Option<PublicAssessmentId>,
    pub priority: ActivityPriority,
    pub metadata: Value,
}

impl ActivityEntry {
    pub fn new(
        actor: UserId,
        activity_type: ActivityType,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            actor,
            activity_type,
            title: title.into(),
            description: description.into(),
            target_user: None,
            assessment: None,
            priority: ActivityPriority::Medium,
            metadata: Value::Null,
        }
    }

    pub fn for_user(mut self, target: UserId) -> Self {
        self.target_user = Some(target);
        self
    }

    pub fn on_assessment(mut self, assessment: PublicAssessmentId) -> Self {
        self.assessment = Some(assessment);
        self
    }

    pub fn priority(mut self, priority: ActivityPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Durable sink for activity records.
pub trait ActivityStore: Send + Sync {
    fn append(&self, record: ActivityRecord) -> Result<(), ActivityStoreError>;
    fn for_assessment(
        &self,
        assessment: &PublicAssessmentId,
    ) -> Result<Vec<ActivityRecord>, ActivityStoreError>;
    fn for_user(&self, user: &UserId) -> Result<Vec<ActivityRecord>, ActivityStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ActivityStoreError {
    #[error("activity store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notice handed to the real-time transport once the entry is
/// durably recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub recipient: UserId,
    pub title: String,
    pub body: String,
    pub priority: ActivityPriority,
    pub assessment: Option<PublicAssessmentId>,
}

/// Push/email transport port. Deployments without one use [`NoopNotifier`].
pub trait NotificationPort: Send + Sync {
    fn deliver(&self, notification: Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl NotificationPort for NoopNotifier {
    fn deliver(&self, _notification: Notification) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// Records lifecycle activity and fans notices out to affected users.
#[derive(Clone)]
pub struct ActivityRecorder {
    store: Arc<dyn ActivityStore>,
    notifier: Arc<dyn NotificationPort>,
}

impl ActivityRecorder {
    pub fn new(store: Arc<dyn ActivityStore>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self { store, notifier }
    }

    /// Append one entry and, if that succeeds and the entry targets a user,
    /// attempt delivery. Failures on either side are reported and swallowed.
    pub fn record(&self, entry: ActivityEntry) {
        let record = ActivityRecord {
            id: Uuid::new_v4(),
            actor: entry.actor,
            activity_type: entry.activity_type,
            title: entry.title,
            description: entry.description,
            target_user: entry.target_user,
            assessment: entry.assessment,
            priority: entry.priority,
            metadata: entry.metadata,
            recorded_at: Utc::now(),
        };

        if let Err(error) = self.store.append(record.clone()) {
            warn!(
                activity_type = record.activity_type.key(),
                %error,
                "failed to append activity record"
            );
            return;
        }

        let Some(recipient) = record.target_user else {
            return;
        };

        let notification = Notification {
            recipient,
            title: record.title.clone(),
            body: record.description.clone(),
            priority: record.priority,
            assessment: record.assessment,
        };

        if let Err(error) = self.notifier.deliver(notification) {
            warn!(
                activity_type = record.activity_type.key(),
                recipient = %recipient,
                %error,
                "failed to deliver activity notification"
            );
        }
    }

    /// Record a batch of entries, typically the actor-side and
    /// counterpart-side perspectives of the same transition.
    pub fn record_all(&self, entries: impl IntoIterator<Item = ActivityEntry>) {
        for entry in entries {
            self.record(entry);
        }
    }

    pub fn for_assessment(
        &self,
        assessment: &PublicAssessmentId,
    ) -> Result<Vec<ActivityRecord>, ActivityStoreError> {
        self.store.for_assessment(assessment)
    }

    pub fn for_user(&self, user: &UserId) -> Result<Vec<ActivityRecord>, ActivityStoreError> {
        self.store.for_user(user)
    }
}

impl std::fmt::Debug for ActivityRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityRecorder").finish_non_exhaustive()
    }
}
