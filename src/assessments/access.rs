//! Role, ownership, and lock checks applied before the state machine mutates
//! anything. Cross-tenant lookups are reported as not-found by the service so
//! foreign assessments stay invisible; the errors here cover callers that can
//! legitimately see the assessment but may not act on it.

use super::domain::{Assessment, PublicAssessmentId};
use crate::directory::domain::{Role, UserAccount, UserId};

#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    #[error("actor {0} is not a registered account")]
    UnknownActor(UserId),
    #[error("account is suspended")]
    AccountSuspended,
    #[error("account is pending activation")]
    AccountPending,
    #[error("clients have read-only access to assessments")]
    ClientReadOnly,
    #[error("administrator role required to {action}")]
    AdminRequired { action: &'static str },
    #[error("only the conducting assessor may {action}")]
    OwnerRequired { action: &'static str },
    #[error("assessment {public_id} is locked; submit an edit request to resume editing")]
    AssessmentLocked { public_id: PublicAssessmentId },
    #[error("an active client subscription is required to view reports")]
    SubscriptionInactive,
}

pub fn ensure_active(account: &UserAccount) -> Result<(), PermissionError> {
    match account.status {
        crate::directory::domain::UserStatus::Active => Ok(()),
        crate::directory::domain::UserStatus::Suspended => Err(PermissionError::AccountSuspended),
        crate::directory::domain::UserStatus::Pending => Err(PermissionError::AccountPending),
    }
}

pub fn ensure_admin(account: &UserAccount, action: &'static str) -> Result<(), PermissionError> {
    if account.role == Role::Admin {
        Ok(())
    } else {
        Err(PermissionError::AdminRequired { action })
    }
}

/// Whether the actor may see this assessment at all. Callers translate a
/// `false` into not-found rather than a permission error.
pub fn can_view(account: &UserAccount, assessment: &Assessment) -> bool {
    match account.role {
        Role::Admin => true,
        Role::Assessor => assessment.assessor_id == account.id,
        Role::Client => assessment.client_id == account.id,
    }
}

/// Write access: admins and the owning assessor. Clients never write.
/// Visibility must already have been established via [`can_view`].
pub fn ensure_writer(account: &UserAccount, assessment: &Assessment) -> Result<(), PermissionError> {
    match account.role {
        Role::Admin => Ok(()),
        Role::Client => Err(PermissionError::ClientReadOnly),
        Role::Assessor if assessment.assessor_id == account.id => Ok(()),
        Role::Assessor => Err(PermissionError::OwnerRequired {
            action: "modify this assessment",
        }),
    }
}

/// Lock gate consulted on every mutation. Administrators bypass via the
/// single `Role::can_bypass_lock` capability.
pub fn ensure_unlocked(
    account: &UserAccount,
    assessment: &Assessment,
) -> Result<(), PermissionError> {
    if assessment.locked && !account.role.can_bypass_lock() {
        return Err(PermissionError::AssessmentLocked {
            public_id: assessment.public_id,
        });
    }
    Ok(())
}

/// Clients need an active subscription before report data is released.
pub fn ensure_report_access(account: &UserAccount) -> Result<(), PermissionError> {
    if account.role != Role::Client {
        return Ok(());
    }
    match account.subscription {
        Some(subscription) if subscription.is_active() => Ok(()),
        _ => Err(PermissionError::SubscriptionInactive),
    }
}
