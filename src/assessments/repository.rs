use serde::{Deserialize, Serialize};

use super::domain::{Assessment, PublicAssessmentId, SectionType};
use crate::directory::domain::UserId;

/// Storage abstraction over the relational store so the service module can be
/// exercised in isolation. Updates carry the version the caller read, giving
/// optimistic concurrency over otherwise racing writers.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: Assessment) -> Result<Assessment, RepositoryError>;
    fn update(&self, record: Assessment, expected_version: u64) -> Result<(), RepositoryError>;
    fn fetch_by_public_id(
        &self,
        public_id: &PublicAssessmentId,
    ) -> Result<Option<Assessment>, RepositoryError>;
    fn list(&self) -> Result<Vec<Assessment>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("stored version does not match the expected version")]
    VersionMismatch,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

/// Reference to an uploaded evidence file. The bytes live in an external
/// media store; the core only consumes these references for advisory
/// evidence checks and the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub assessment: PublicAssessmentId,
    pub section_type: SectionType,
    pub field_name: String,
    pub kind: MediaKind,
    pub storage_key: String,
    pub uploaded_by: UserId,
}

/// Read-side port onto the external evidence store.
pub trait MediaCatalog: Send + Sync {
    fn refs_for(
        &self,
        assessment: &PublicAssessmentId,
    ) -> Result<Vec<MediaRef>, MediaCatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaCatalogError {
    #[error("media catalog unavailable: {0}")]
    Unavailable(String),
}

/// Media catalog for deployments without an evidence store attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMediaCatalog;

impl MediaCatalog for NoMediaCatalog {
    fn refs_for(
        &self,
        _assessment: &PublicAssessmentId,
    ) -> Result<Vec<MediaRef>, MediaCatalogError> {
        Ok(Vec::new())
    }
}
