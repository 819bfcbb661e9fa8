//! Building assessment scoring, lifecycle state machine, and audit surface.

pub mod access;
pub mod catalog;
pub mod domain;
pub mod export;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use access::PermissionError;
pub use catalog::{EvidenceGap, EvidenceRequirements, ValidationError, VariableDefinition};
pub use domain::{
    Assessment, AssessmentId, AssessmentSection, AssessmentStatus, BuildingMetadata, GeoPoint,
    ProgressStage, PublicAssessmentId, SectionSubmission, SectionType, TOTAL_SECTIONS,
};
pub use repository::{
    AssessmentRepository, MediaCatalog, MediaCatalogError, MediaKind, MediaRef, NoMediaCatalog,
    RepositoryError,
};
pub use router::assessment_router;
pub use scoring::{RatingTier, ScoreSummary, MAX_POSSIBLE_SCORE};
pub use service::{
    AssessmentDetail, AssessmentService, AssessmentServiceError, AssessmentSummary, ConflictError,
};
