//! Identity and role model: accounts, invitations, subscriptions, and the
//! admin management surface.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    ClientSubscription, Invitation, InvitationStatus, InvitationToken, Role, SubscriptionStatus,
    SubscriptionTier, UserAccount, UserId, UserStatus,
};
pub use repository::{DirectoryStoreError, UserDirectory};
pub use router::directory_router;
pub use service::{DirectoryError, DirectoryService};
