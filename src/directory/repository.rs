use super::domain::{Invitation, InvitationToken, UserAccount, UserId};

/// Storage abstraction for accounts and invitations so the directory service
/// can run against the relational store or an in-memory fake.
pub trait UserDirectory: Send + Sync {
    fn insert_user(&self, account: UserAccount) -> Result<UserAccount, DirectoryStoreError>;
    fn update_user(&self, account: UserAccount) -> Result<(), DirectoryStoreError>;
    fn find_user(&self, id: &UserId) -> Result<Option<UserAccount>, DirectoryStoreError>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, DirectoryStoreError>;
    fn admins(&self) -> Result<Vec<UserAccount>, DirectoryStoreError>;

    fn insert_invitation(&self, invitation: Invitation) -> Result<(), DirectoryStoreError>;
    fn update_invitation(&self, invitation: Invitation) -> Result<(), DirectoryStoreError>;
    fn find_invitation(
        &self,
        token: &InvitationToken,
    ) -> Result<Option<Invitation>, DirectoryStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryStoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}
