use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use super::access::{self, PermissionError};
use super::catalog::{self, EvidenceGap, ValidationError};
use super::domain::{
    Assessment, AssessmentId, AssessmentSection, AssessmentStatus, BuildingMetadata,
    ProgressStage, PublicAssessmentId, SectionSubmission, SectionType, TOTAL_SECTIONS,
};
use super::export::{self, ExportError};
use super::repository::{
    AssessmentRepository, MediaCatalog, MediaCatalogError, MediaRef, RepositoryError,
};
use super::scoring::{self, RatingTier, MAX_POSSIBLE_SCORE};
use crate::activity::{
    ActivityEntry, ActivityPriority, ActivityRecord, ActivityRecorder, ActivityStoreError,
    ActivityType,
};
use crate::directory::domain::{Role, UserAccount, UserId};
use crate::directory::repository::{DirectoryStoreError, UserDirectory};

/// Service composing the access guard, scoring aggregator, repository, and
/// activity recorder into the assessment lifecycle state machine.
pub struct AssessmentService<R, D> {
    repository: Arc<R>,
    directory: Arc<D>,
    media: Arc<dyn MediaCatalog>,
    recorder: ActivityRecorder,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    AssessmentId(ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Permission(#[from] PermissionError),
    #[error("assessment not found")]
    NotFound,
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryStoreError),
    #[error(transparent)]
    Media(#[from] MediaCatalogError),
    #[error(transparent)]
    Activity(#[from] ActivityStoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Conflicts between the requested transition and the assessment's state.
#[derive(Debug, thiserror::Error)]
pub enum ConflictError {
    #[error("assessment was modified concurrently; reload and retry")]
    StaleWrite,
    #[error("assessment must be completed before it can be locked")]
    LockRequiresCompletion,
    #[error("edit requests apply to completed, locked assessments only")]
    EditRequestNotApplicable,
    #[error("an edit request is already pending")]
    EditRequestPending,
    #[error("no pending edit request to resolve")]
    NoPendingEditRequest,
    #[error("assessment is archived and read-only")]
    AssessmentArchived,
}

/// Flat listing projection.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSummary {
    pub public_id: PublicAssessmentId,
    pub building_name: String,
    pub assessor_id: UserId,
    pub client_id: UserId,
    pub status: AssessmentStatus,
    pub status_label: &'static str,
    pub locked: bool,
    pub archived: bool,
    pub has_pending_edit_request: bool,
    pub overall_score: u16,
    pub max_possible_score: u16,
    pub completed_sections: u8,
    pub total_sections: u8,
    pub progress: ProgressStage,
    pub progress_label: &'static str,
    pub rating: RatingTier,
    pub rating_label: &'static str,
    pub conducted_at: Option<chrono::DateTime<Utc>>,
}

impl From<&Assessment> for AssessmentSummary {
    fn from(assessment: &Assessment) -> Self {
        let progress = assessment.progress();
        let rating = RatingTier::for_score(assessment.overall_score);
        Self {
            public_id: assessment.public_id,
            building_name: assessment.building.building_name.clone(),
            assessor_id: assessment.assessor_id,
            client_id: assessment.client_id,
            status: assessment.status,
            status_label: assessment.status.label(),
            locked: assessment.locked,
            archived: assessment.archived,
            has_pending_edit_request: assessment.has_pending_edit_request(),
            overall_score: assessment.overall_score,
            max_possible_score: assessment.max_possible_score,
            completed_sections: assessment.completed_sections,
            total_sections: assessment.total_sections,
            progress,
            progress_label: progress.label(),
            rating,
            rating_label: rating.label(),
            conducted_at: assessment.conducted_at,
        }
    }
}

/// Full detail view: sections in catalog order, evidence references, and the
/// advisory evidence gaps.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentDetail {
    #[serde(flatten)]
    pub summary: AssessmentSummary,
    pub building: BuildingMetadata,
    pub sections: Vec<AssessmentSection>,
    pub media: Vec<MediaRef>,
    pub evidence_gaps: Vec<EvidenceGap>,
}

impl<R, D> AssessmentService<R, D>
where
    R: AssessmentRepository + 'static,
    D: UserDirectory + 'static,
{
    pub fn new(
        repository: Arc<R>,
        directory: Arc<D>,
        media: Arc<dyn MediaCatalog>,
        recorder: ActivityRecorder,
    ) -> Self {
        Self {
            repository,
            directory,
            media,
            recorder,
        }
    }

    fn resolve_actor(&self, actor_id: &UserId) -> Result<UserAccount, AssessmentServiceError> {
        let account = self
            .directory
            .find_user(actor_id)?
            .ok_or(PermissionError::UnknownActor(*actor_id))?;
        access::ensure_active(&account)?;
        Ok(account)
    }

    /// Fetch an assessment the actor is allowed to see. Unresolvable public
    /// ids and cross-tenant hits both surface as not-found so foreign
    /// assessments stay invisible.
    fn fetch_visible(
        &self,
        actor: &UserAccount,
        public_id: &PublicAssessmentId,
    ) -> Result<Assessment, AssessmentServiceError> {
        let assessment = self
            .repository
            .fetch_by_public_id(public_id)?
            .ok_or(AssessmentServiceError::NotFound)?;
        if !access::can_view(actor, &assessment) {
            return Err(AssessmentServiceError::NotFound);
        }
        Ok(assessment)
    }

    fn persist(
        &self,
        mut assessment: Assessment,
        read_version: u64,
    ) -> Result<Assessment, AssessmentServiceError> {
        assessment.version = read_version + 1;
        assessment.updated_at = Utc::now();
        match self.repository.update(assessment.clone(), read_version) {
            Ok(()) => Ok(assessment),
            Err(RepositoryError::VersionMismatch) => {
                Err(AssessmentServiceError::Conflict(ConflictError::StaleWrite))
            }
            Err(other) => Err(AssessmentServiceError::Repository(other)),
        }
    }

    fn admins(&self) -> Vec<UserAccount> {
        // Admin fan-out is part of best-effort notification; a directory
        // outage here must not fail the transition.
        self.directory.admins().unwrap_or_default()
    }

    /// Open a new draft evaluation for a client's building.
    pub fn create_assessment(
        &self,
        actor_id: &UserId,
        client_id: &UserId,
        building: BuildingMetadata,
    ) -> Result<Assessment, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        if !actor.role.can_conduct_assessments() {
            return Err(ValidationError::OwnerRoleRequired.into());
        }

        let client = self
            .directory
            .find_user(client_id)?
            .ok_or(ValidationError::UnknownClient(*client_id))?;
        if client.role != Role::Client {
            return Err(ValidationError::NotAClient(*client_id).into());
        }

        let now = Utc::now();
        let assessment = Assessment {
            id: next_assessment_id(),
            public_id: PublicAssessmentId::generate(),
            assessor_id: actor.id,
            client_id: client.id,
            building,
            status: AssessmentStatus::Draft,
            locked: false,
            locked_at: None,
            locked_by: None,
            edit_requested_by: None,
            edit_requested_at: None,
            overall_score: 0,
            max_possible_score: MAX_POSSIBLE_SCORE,
            completed_sections: 0,
            total_sections: TOTAL_SECTIONS,
            conducted_at: None,
            archived: false,
            version: 0,
            sections: Default::default(),
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(assessment)?;

        self.recorder.record_all([
            ActivityEntry::new(
                actor.id,
                ActivityType::AssessmentCreated,
                "Assessment started",
                format!(
                    "You started an assessment for {}.",
                    stored.building.building_name
                ),
            )
            .for_user(actor.id)
            .on_assessment(stored.public_id)
            .priority(ActivityPriority::Low),
            ActivityEntry::new(
                actor.id,
                ActivityType::AssessmentCreated,
                "Assessment started",
                format!(
                    "{} started a sustainability assessment for {}.",
                    actor.full_name, stored.building.building_name
                ),
            )
            .for_user(stored.client_id)
            .on_assessment(stored.public_id)
            .priority(ActivityPriority::Low),
        ]);

        Ok(stored)
    }

    /// Save one section. Validation and score recomputation are one atomic
    /// unit: nothing is persisted when the submission fails the catalog.
    pub fn upsert_section(
        &self,
        actor_id: &UserId,
        public_id: &PublicAssessmentId,
        submission: SectionSubmission,
    ) -> Result<Assessment, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        let mut assessment = self.fetch_visible(&actor, public_id)?;
        access::ensure_writer(&actor, &assessment)?;
        if assessment.archived {
            return Err(ConflictError::AssessmentArchived.into());
        }
        access::ensure_unlocked(&actor, &assessment)?;

        catalog::validate_submission(
            submission.section_type,
            &submission.variables,
            &submission.location_data,
        )?;

        let read_version = assessment.version;
        let section = AssessmentSection {
            section_type: submission.section_type,
            score: scoring::section_score(&submission.variables),
            max_score: scoring::section_max_score(submission.section_type),
            variables: submission.variables,
            location_data: submission.location_data,
            completed: submission.completed,
            updated_at: Utc::now(),
        };
        assessment.sections.insert(section.section_type, section);

        let summary = scoring::overall(assessment.sections.values());
        assessment.overall_score = summary.overall_score;
        assessment.completed_sections = summary.completed_sections;

        self.persist(assessment, read_version)
    }

    /// Move a draft (or re-confirm a completed assessment) to completed.
    /// Completion does not hard-block on unfinished sections; `conducted_at`
    /// is stamped exactly once.
    pub fn complete_assessment(
        &self,
        actor_id: &UserId,
        public_id: &PublicAssessmentId,
    ) -> Result<Assessment, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        let mut assessment = self.fetch_visible(&actor, public_id)?;
        access::ensure_writer(&actor, &assessment)?;
        if assessment.archived {
            return Err(ConflictError::AssessmentArchived.into());
        }
        access::ensure_unlocked(&actor, &assessment)?;

        let read_version = assessment.version;
        let first_completion = assessment.status != AssessmentStatus::Completed;
        assessment.status = AssessmentStatus::Completed;
        if assessment.conducted_at.is_none() {
            assessment.conducted_at = Some(Utc::now());
        }

        let stored = self.persist(assessment, read_version)?;

        if first_completion {
            let rating = RatingTier::for_score(stored.overall_score);
            let metadata = json!({
                "overall_score": stored.overall_score,
                "max_possible_score": stored.max_possible_score,
                "rating": rating.label(),
            });

            let mut entries = vec![
                ActivityEntry::new(
                    actor.id,
                    ActivityType::AssessmentCompleted,
                    "Assessment completed",
                    format!(
                        "You completed the assessment for {} with {} of {} points ({}).",
                        stored.building.building_name,
                        stored.overall_score,
                        stored.max_possible_score,
                        rating.label()
                    ),
                )
                .for_user(actor.id)
                .on_assessment(stored.public_id)
                .metadata(metadata.clone()),
                ActivityEntry::new(
                    actor.id,
                    ActivityType::AssessmentCompleted,
                    "Assessment completed",
                    format!(
                        "The sustainability assessment for {} is complete: {} rating.",
                        stored.building.building_name,
                        rating.label()
                    ),
                )
                .for_user(stored.client_id)
                .on_assessment(stored.public_id)
                .metadata(metadata.clone()),
            ];
            for admin in self.admins() {
                if admin.id == actor.id {
                    continue;
                }
                entries.push(
                    ActivityEntry::new(
                        actor.id,
                        ActivityType::AssessmentCompleted,
                        "Assessment completed",
                        format!(
                            "{} completed the assessment for {}.",
                            actor.full_name, stored.building.building_name
                        ),
                    )
                    .for_user(admin.id)
                    .on_assessment(stored.public_id)
                    .metadata(metadata.clone()),
                );
            }
            self.recorder.record_all(entries);
        }

        Ok(stored)
    }

    /// Admin-only lock of a completed assessment. Idempotent.
    pub fn lock_assessment(
        &self,
        actor_id: &UserId,
        public_id: &PublicAssessmentId,
        reason: Option<String>,
    ) -> Result<Assessment, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        access::ensure_admin(&actor, "lock assessments")?;
        let mut assessment = self.fetch_visible(&actor, public_id)?;

        if assessment.status != AssessmentStatus::Completed {
            return Err(ConflictError::LockRequiresCompletion.into());
        }
        if assessment.locked {
            return Ok(assessment);
        }

        let read_version = assessment.version;
        assessment.locked = true;
        assessment.locked_at = Some(Utc::now());
        assessment.locked_by = Some(actor.id);
        let stored = self.persist(assessment, read_version)?;

        let metadata = json!({ "reason": reason });
        self.recorder.record_all([
            ActivityEntry::new(
                actor.id,
                ActivityType::AssessmentLocked,
                "Assessment locked",
                format!(
                    "Your assessment for {} was locked by an administrator. Submit an edit request to make further changes.",
                    stored.building.building_name
                ),
            )
            .for_user(stored.assessor_id)
            .on_assessment(stored.public_id)
            .priority(ActivityPriority::High)
            .metadata(metadata.clone()),
            ActivityEntry::new(
                actor.id,
                ActivityType::AssessmentLocked,
                "Assessment locked",
                format!(
                    "The assessment for {} was locked against further edits.",
                    stored.building.building_name
                ),
            )
            .for_user(stored.client_id)
            .on_assessment(stored.public_id)
            .metadata(metadata),
        ]);

        Ok(stored)
    }

    /// Admin-only unlock. Clears any pending edit request as an implicit
    /// approval without the approval notice pair. Idempotent.
    pub fn unlock_assessment(
        &self,
        actor_id: &UserId,
        public_id: &PublicAssessmentId,
    ) -> Result<Assessment, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        access::ensure_admin(&actor, "unlock assessments")?;
        let mut assessment = self.fetch_visible(&actor, public_id)?;

        if !assessment.locked {
            return Ok(assessment);
        }

        let read_version = assessment.version;
        assessment.locked = false;
        assessment.locked_at = None;
        assessment.locked_by = None;
        assessment.edit_requested_by = None;
        assessment.edit_requested_at = None;
        let stored = self.persist(assessment, read_version)?;

        self.recorder.record_all([
            ActivityEntry::new(
                actor.id,
                ActivityType::AssessmentUnlocked,
                "Assessment unlocked",
                format!(
                    "Your assessment for {} was unlocked; you can edit it again.",
                    stored.building.building_name
                ),
            )
            .for_user(stored.assessor_id)
            .on_assessment(stored.public_id),
            ActivityEntry::new(
                actor.id,
                ActivityType::AssessmentUnlocked,
                "Assessment unlocked",
                format!(
                    "The assessment for {} was reopened for edits.",
                    stored.building.building_name
                ),
            )
            .for_user(stored.client_id)
            .on_assessment(stored.public_id),
        ]);

        Ok(stored)
    }

    /// Owning assessor appeals a locked, completed assessment.
    pub fn request_edit(
        &self,
        actor_id: &UserId,
        public_id: &PublicAssessmentId,
        reason: String,
    ) -> Result<Assessment, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        let mut assessment = self.fetch_visible(&actor, public_id)?;

        match actor.role {
            Role::Client => return Err(PermissionError::ClientReadOnly.into()),
            Role::Admin => {
                return Err(PermissionError::OwnerRequired {
                    action: "request an edit",
                }
                .into())
            }
            Role::Assessor => {}
        }

        if assessment.status != AssessmentStatus::Completed || !assessment.locked {
            return Err(ConflictError::EditRequestNotApplicable.into());
        }
        if assessment.has_pending_edit_request() {
            return Err(ConflictError::EditRequestPending.into());
        }

        let read_version = assessment.version;
        assessment.edit_requested_by = Some(actor.id);
        assessment.edit_requested_at = Some(Utc::now());
        let stored = self.persist(assessment, read_version)?;

        let metadata = json!({ "reason": reason });
        let mut entries = vec![ActivityEntry::new(
            actor.id,
            ActivityType::EditRequestCreated,
            "Edit request submitted",
            format!(
                "You asked to reopen the locked assessment for {}.",
                stored.building.building_name
            ),
        )
        .for_user(actor.id)
        .on_assessment(stored.public_id)
        .metadata(metadata.clone())];

        for admin in self.admins() {
            entries.push(
                ActivityEntry::new(
                    actor.id,
                    ActivityType::EditRequestCreated,
                    "Edit request awaiting review",
                    format!(
                        "{} requested to edit the locked assessment for {}: {}",
                        actor.full_name, stored.building.building_name, reason
                    ),
                )
                .for_user(admin.id)
                .on_assessment(stored.public_id)
                .priority(ActivityPriority::High)
                .metadata(metadata.clone()),
            );
        }
        self.recorder.record_all(entries);

        Ok(stored)
    }

    /// Admin grants a pending edit request, clearing the lock. Produces
    /// exactly two log entries: one per perspective.
    pub fn approve_edit(
        &self,
        actor_id: &UserId,
        public_id: &PublicAssessmentId,
    ) -> Result<Assessment, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        access::ensure_admin(&actor, "approve edit requests")?;
        let mut assessment = self.fetch_visible(&actor, public_id)?;

        let requester = assessment
            .edit_requested_by
            .ok_or(ConflictError::NoPendingEditRequest)?;

        let read_version = assessment.version;
        assessment.locked = false;
        assessment.locked_at = None;
        assessment.locked_by = None;
        assessment.edit_requested_by = None;
        assessment.edit_requested_at = None;
        let stored = self.persist(assessment, read_version)?;

        self.recorder.record_all([
            ActivityEntry::new(
                actor.id,
                ActivityType::EditRequestApproved,
                "Edit request approved",
                format!(
                    "Your edit request for {} was approved by {}; the assessment is unlocked.",
                    stored.building.building_name, actor.full_name
                ),
            )
            .for_user(requester)
            .on_assessment(stored.public_id)
            .priority(ActivityPriority::High),
            ActivityEntry::new(
                actor.id,
                ActivityType::EditRequestApproved,
                "Edit request approved",
                format!(
                    "You approved the edit request for {}.",
                    stored.building.building_name
                ),
            )
            .for_user(actor.id)
            .on_assessment(stored.public_id),
        ]);

        Ok(stored)
    }

    /// Admin declines a pending edit request; the lock stays in place.
    pub fn deny_edit(
        &self,
        actor_id: &UserId,
        public_id: &PublicAssessmentId,
        reason: Option<String>,
    ) -> Result<Assessment, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        access::ensure_admin(&actor, "deny edit requests")?;
        let mut assessment = self.fetch_visible(&actor, public_id)?;

        let requester = assessment
            .edit_requested_by
            .ok_or(ConflictError::NoPendingEditRequest)?;

        let read_version = assessment.version;
        assessment.edit_requested_by = None;
        assessment.edit_requested_at = None;
        let stored = self.persist(assessment, read_version)?;

        let detail = reason
            .clone()
            .unwrap_or_else(|| "no reason given".to_string());
        self.recorder.record_all([
            ActivityEntry::new(
                actor.id,
                ActivityType::EditRequestDenied,
                "Edit request denied",
                format!(
                    "Your edit request for {} was denied by {} ({}).",
                    stored.building.building_name, actor.full_name, detail
                ),
            )
            .for_user(requester)
            .on_assessment(stored.public_id)
            .priority(ActivityPriority::High)
            .metadata(json!({ "reason": reason })),
            ActivityEntry::new(
                actor.id,
                ActivityType::EditRequestDenied,
                "Edit request denied",
                format!(
                    "You denied the edit request for {}.",
                    stored.building.building_name
                ),
            )
            .for_user(actor.id)
            .on_assessment(stored.public_id),
        ]);

        Ok(stored)
    }

    /// Admin-only soft delete. Archived assessments stay readable but reject
    /// mutation.
    pub fn archive_assessment(
        &self,
        actor_id: &UserId,
        public_id: &PublicAssessmentId,
    ) -> Result<Assessment, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        access::ensure_admin(&actor, "archive assessments")?;
        let mut assessment = self.fetch_visible(&actor, public_id)?;

        if assessment.archived {
            return Ok(assessment);
        }

        let read_version = assessment.version;
        assessment.archived = true;
        let stored = self.persist(assessment, read_version)?;

        self.recorder.record_all([
            ActivityEntry::new(
                actor.id,
                ActivityType::AssessmentArchived,
                "Assessment archived",
                format!(
                    "Your assessment for {} was archived by an administrator.",
                    stored.building.building_name
                ),
            )
            .for_user(stored.assessor_id)
            .on_assessment(stored.public_id),
            ActivityEntry::new(
                actor.id,
                ActivityType::AssessmentArchived,
                "Assessment archived",
                format!(
                    "The assessment for {} was archived.",
                    stored.building.building_name
                ),
            )
            .for_user(stored.client_id)
            .on_assessment(stored.public_id),
        ]);

        Ok(stored)
    }

    /// Full assessment view for the admin, owning assessor, or owning
    /// client. Clients additionally need an active subscription.
    pub fn get_assessment(
        &self,
        actor_id: &UserId,
        public_id: &PublicAssessmentId,
    ) -> Result<AssessmentDetail, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        access::ensure_report_access(&actor)?;
        let assessment = self.fetch_visible(&actor, public_id)?;

        let media = self.media.refs_for(public_id)?;

        let mut sections = Vec::new();
        let mut evidence_gaps = Vec::new();
        for section_type in SectionType::ordered() {
            if let Some(section) = assessment.sections.get(&section_type) {
                evidence_gaps.extend(catalog::evidence_gaps(
                    section_type,
                    &section.variables,
                    &section.location_data,
                    &media,
                ));
                sections.push(section.clone());
            }
        }

        Ok(AssessmentDetail {
            summary: AssessmentSummary::from(&assessment),
            building: assessment.building.clone(),
            sections,
            media,
            evidence_gaps,
        })
    }

    /// CSV scorecard behind the same visibility and subscription checks as
    /// the detail view.
    pub fn scorecard_csv(
        &self,
        actor_id: &UserId,
        public_id: &PublicAssessmentId,
    ) -> Result<String, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        access::ensure_report_access(&actor)?;
        let assessment = self.fetch_visible(&actor, public_id)?;
        Ok(export::scorecard_csv(&assessment)?)
    }

    /// Listing for the caller's tenant view: admins see everything, others
    /// only their own.
    pub fn list_for_actor(
        &self,
        actor_id: &UserId,
    ) -> Result<Vec<AssessmentSummary>, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        access::ensure_report_access(&actor)?;
        let records = self.repository.list()?;
        Ok(records
            .iter()
            .filter(|record| access::can_view(&actor, record))
            .map(AssessmentSummary::from)
            .collect())
    }

    /// The caller's own notification feed.
    pub fn activity_feed(
        &self,
        actor_id: &UserId,
    ) -> Result<Vec<ActivityRecord>, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        Ok(self.recorder.for_user(&actor.id)?)
    }

    /// The append-only trail for one assessment, admin or owner visible.
    pub fn activity_for_assessment(
        &self,
        actor_id: &UserId,
        public_id: &PublicAssessmentId,
    ) -> Result<Vec<ActivityRecord>, AssessmentServiceError> {
        let actor = self.resolve_actor(actor_id)?;
        self.fetch_visible(&actor, public_id)?;
        Ok(self.recorder.for_assessment(public_id)?)
    }
}
