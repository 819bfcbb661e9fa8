use std::collections::BTreeMap;
use std::sync::Arc;

use super::common::*;
use crate::activity::{ActivityRecorder, NoopNotifier};
use crate::assessments::access::PermissionError;
use crate::assessments::catalog::ValidationError;
use crate::assessments::domain::{
    AssessmentStatus, ProgressStage, SectionSubmission, SectionType, TOTAL_SECTIONS,
};
use crate::assessments::repository::{MediaKind, MediaRef};
use crate::assessments::scoring::MAX_POSSIBLE_SCORE;
use crate::assessments::service::{AssessmentService, AssessmentServiceError, ConflictError};
use crate::directory::domain::UserStatus;
use crate::directory::repository::UserDirectory;
use crate::memory::{MemoryActivityStore, MemoryDirectory};

#[test]
fn create_initializes_a_zeroed_draft() {
    let harness = harness();
    let assessment = harness.create();

    assert_eq!(assessment.status, AssessmentStatus::Draft);
    assert_eq!(assessment.overall_score, 0);
    assert_eq!(assessment.max_possible_score, MAX_POSSIBLE_SCORE);
    assert_eq!(assessment.completed_sections, 0);
    assert_eq!(assessment.total_sections, TOTAL_SECTIONS);
    assert_eq!(assessment.version, 0);
    assert!(assessment.sections.is_empty());
    assert!(!assessment.locked);
    assert!(assessment.conducted_at.is_none());
    assert_eq!(assessment.progress(), ProgressStage::NotStarted);
}

#[test]
fn create_rejects_client_owners() {
    let harness = harness();
    match harness
        .service
        .create_assessment(&harness.client, &harness.client, building())
    {
        Err(AssessmentServiceError::Validation(ValidationError::OwnerRoleRequired)) => {}
        other => panic!("expected owner-role validation error, got {other:?}"),
    }
}

#[test]
fn create_requires_a_client_counterparty() {
    let harness = harness();
    match harness
        .service
        .create_assessment(&harness.assessor, &harness.other_assessor, building())
    {
        Err(AssessmentServiceError::Validation(ValidationError::NotAClient(id))) => {
            assert_eq!(id, harness.other_assessor);
        }
        other => panic!("expected not-a-client validation error, got {other:?}"),
    }
}

#[test]
fn upsert_section_recomputes_scores_and_completion() {
    let harness = harness();
    let assessment = harness.create();

    let updated = harness
        .service
        .upsert_section(&harness.assessor, &assessment.public_id, energy_submission(true))
        .expect("section saved");

    assert_eq!(updated.overall_score, 12);
    assert_eq!(updated.completed_sections, 1);
    let energy = updated
        .sections
        .get(&SectionType::EnergyEfficiency)
        .expect("energy section stored");
    assert_eq!(energy.score, 12);
    assert_eq!(energy.max_score, 34);
    assert!(energy.completed);
}

#[test]
fn upsert_is_idempotent_under_autosave_retries() {
    let harness = harness();
    let assessment = harness.create();

    let first = harness
        .service
        .upsert_section(&harness.assessor, &assessment.public_id, energy_submission(true))
        .expect("first save");
    let second = harness
        .service
        .upsert_section(&harness.assessor, &assessment.public_id, energy_submission(true))
        .expect("second save");

    assert_eq!(first.overall_score, second.overall_score);
    assert_eq!(first.completed_sections, second.completed_sections);
    assert_eq!(second.sections.len(), 1);
}

#[test]
fn aggregation_invariant_holds_after_every_mutation() {
    let harness = harness();
    let assessment = harness.create();

    harness
        .service
        .upsert_section(&harness.assessor, &assessment.public_id, energy_submission(true))
        .expect("energy saved");
    harness
        .service
        .upsert_section(&harness.assessor, &assessment.public_id, water_submission(false))
        .expect("water saved");

    let stored = harness.stored(&assessment.public_id);
    let section_sum: u16 = stored.sections.values().map(|section| section.score).sum();
    let completed = stored
        .sections
        .values()
        .filter(|section| section.completed)
        .count() as u8;

    assert_eq!(stored.overall_score, section_sum);
    assert_eq!(stored.completed_sections, completed);

    // Replacing a section keeps the invariant rather than double counting.
    let replacement = SectionSubmission {
        section_type: SectionType::EnergyEfficiency,
        variables: BTreeMap::from([("solarPanels".to_string(), 2u16)]),
        location_data: BTreeMap::new(),
        completed: false,
    };
    harness
        .service
        .upsert_section(&harness.assessor, &assessment.public_id, replacement)
        .expect("energy replaced");

    let stored = harness.stored(&assessment.public_id);
    let section_sum: u16 = stored.sections.values().map(|section| section.score).sum();
    assert_eq!(stored.overall_score, section_sum);
    assert_eq!(stored.overall_score, 2 + 7);
    assert_eq!(stored.completed_sections, 0);
}

#[test]
fn building_information_counts_toward_completion_without_points() {
    let harness = harness();
    let assessment = harness.create();

    let submission = SectionSubmission {
        section_type: SectionType::BuildingInformation,
        variables: BTreeMap::new(),
        location_data: BTreeMap::new(),
        completed: true,
    };
    let updated = harness
        .service
        .upsert_section(&harness.assessor, &assessment.public_id, submission)
        .expect("building information saved");

    assert_eq!(updated.overall_score, 0);
    assert_eq!(updated.completed_sections, 1);
}

#[test]
fn failed_validation_leaves_the_record_untouched() {
    let harness = harness();
    let assessment = harness.create();
    let before = harness.stored(&assessment.public_id);

    let submission = SectionSubmission {
        section_type: SectionType::EnergyEfficiency,
        variables: BTreeMap::from([("solarPanels".to_string(), 99u16)]),
        location_data: BTreeMap::new(),
        completed: true,
    };
    match harness
        .service
        .upsert_section(&harness.assessor, &assessment.public_id, submission)
    {
        Err(AssessmentServiceError::Validation(ValidationError::ScoreAboveMaximum {
            ..
        })) => {}
        other => panic!("expected validation error, got {other:?}"),
    }

    let after = harness.stored(&assessment.public_id);
    assert_eq!(after, before);
}

#[test]
fn clients_cannot_write_sections() {
    let harness = harness();
    let assessment = harness.create();

    match harness
        .service
        .upsert_section(&harness.client, &assessment.public_id, energy_submission(false))
    {
        Err(AssessmentServiceError::Permission(PermissionError::ClientReadOnly)) => {}
        other => panic!("expected client read-only error, got {other:?}"),
    }
}

#[test]
fn foreign_assessors_see_not_found() {
    let harness = harness();
    let assessment = harness.create();

    match harness
        .service
        .get_assessment(&harness.other_assessor, &assessment.public_id)
    {
        Err(AssessmentServiceError::NotFound) => {}
        other => panic!("expected not-found for cross-tenant read, got {other:?}"),
    }

    match harness.service.upsert_section(
        &harness.other_assessor,
        &assessment.public_id,
        energy_submission(false),
    ) {
        Err(AssessmentServiceError::NotFound) => {}
        other => panic!("expected not-found for cross-tenant write, got {other:?}"),
    }
}

#[test]
fn suspended_actors_are_rejected() {
    let harness = harness();
    let assessment = harness.create();

    let mut account = harness
        .directory
        .find_user(&harness.assessor)
        .expect("directory lookup")
        .expect("assessor present");
    account.status = UserStatus::Suspended;
    harness
        .directory
        .update_user(account)
        .expect("suspension stored");

    match harness
        .service
        .upsert_section(&harness.assessor, &assessment.public_id, energy_submission(false))
    {
        Err(AssessmentServiceError::Permission(PermissionError::AccountSuspended)) => {}
        other => panic!("expected suspended-account error, got {other:?}"),
    }
}

#[test]
fn owning_client_reads_the_detail_view() {
    let harness = harness();
    let assessment = harness.create();
    harness
        .service
        .upsert_section(&harness.assessor, &assessment.public_id, energy_submission(true))
        .expect("section saved");

    let detail = harness
        .service
        .get_assessment(&harness.client, &assessment.public_id)
        .expect("client reads detail");

    assert_eq!(detail.summary.public_id, assessment.public_id);
    assert_eq!(detail.sections.len(), 1);
    // solarPanels scored without an upload; the gap is advisory only.
    assert!(detail
        .evidence_gaps
        .iter()
        .any(|gap| gap.variable == "solarPanels"));
}

#[test]
fn delinquent_clients_are_refused_reports() {
    let harness = harness();
    let assessment = harness
        .service
        .create_assessment(&harness.assessor, &harness.delinquent_client, building())
        .expect("assessment created");

    match harness
        .service
        .get_assessment(&harness.delinquent_client, &assessment.public_id)
    {
        Err(AssessmentServiceError::Permission(PermissionError::SubscriptionInactive)) => {}
        other => panic!("expected subscription gate, got {other:?}"),
    }
}

#[test]
fn media_references_flow_into_the_detail_view() {
    let repository = Arc::new(crate::memory::MemoryAssessmentRepository::default());
    let directory = Arc::new(MemoryDirectory::default());
    let recorder = ActivityRecorder::new(
        Arc::new(MemoryActivityStore::default()),
        Arc::new(NoopNotifier),
    );
    let assessor = seed_user(
        &directory,
        "esi@greda.example",
        "Esi Boateng",
        crate::directory::domain::Role::Assessor,
        None,
    );
    let client = seed_user(
        &directory,
        "owner@client.example",
        "Owner",
        crate::directory::domain::Role::Client,
        Some(active_subscription()),
    );

    // Media catalog is attached after creation so the reference can carry
    // the real public id.
    let probe_service = AssessmentService::new(
        repository.clone(),
        directory.clone(),
        Arc::new(crate::assessments::repository::NoMediaCatalog),
        recorder.clone(),
    );
    let assessment = probe_service
        .create_assessment(&assessor, &client, building())
        .expect("assessment created");
    probe_service
        .upsert_section(&assessor, &assessment.public_id, energy_submission(true))
        .expect("section saved");

    let media = StaticMediaCatalog {
        refs: vec![MediaRef {
            assessment: assessment.public_id,
            section_type: SectionType::EnergyEfficiency,
            field_name: "solarPanels".to_string(),
            kind: MediaKind::Image,
            storage_key: "media/solar-array-roof.jpg".to_string(),
            uploaded_by: assessor,
        }],
    };
    let service = AssessmentService::new(repository, directory, Arc::new(media), recorder);

    let detail = service
        .get_assessment(&assessor, &assessment.public_id)
        .expect("detail with media");
    assert_eq!(detail.media.len(), 1);
    assert!(!detail
        .evidence_gaps
        .iter()
        .any(|gap| gap.variable == "solarPanels"));
}

#[test]
fn listing_is_scoped_per_tenant() {
    let harness = harness();
    let first = harness.create();
    let second = harness
        .service
        .create_assessment(&harness.other_assessor, &harness.client, building())
        .expect("second assessment");

    let admin_view = harness
        .service
        .list_for_actor(&harness.admin)
        .expect("admin listing");
    assert_eq!(admin_view.len(), 2);

    let assessor_view = harness
        .service
        .list_for_actor(&harness.assessor)
        .expect("assessor listing");
    assert_eq!(assessor_view.len(), 1);
    assert_eq!(assessor_view[0].public_id, first.public_id);

    let client_view = harness
        .service
        .list_for_actor(&harness.client)
        .expect("client listing");
    assert_eq!(client_view.len(), 2);
    assert!(client_view
        .iter()
        .any(|summary| summary.public_id == second.public_id));
}

#[test]
fn stale_writes_surface_as_conflicts() {
    let repository = Arc::new(StaleRepository::default());
    let directory = Arc::new(MemoryDirectory::default());
    let recorder = ActivityRecorder::new(
        Arc::new(MemoryActivityStore::default()),
        Arc::new(NoopNotifier),
    );
    let assessor = seed_user(
        &directory,
        "esi@greda.example",
        "Esi Boateng",
        crate::directory::domain::Role::Assessor,
        None,
    );
    let client = seed_user(
        &directory,
        "owner@client.example",
        "Owner",
        crate::directory::domain::Role::Client,
        Some(active_subscription()),
    );
    let service = AssessmentService::new(
        repository,
        directory,
        Arc::new(crate::assessments::repository::NoMediaCatalog),
        recorder,
    );

    let assessment = service
        .create_assessment(&assessor, &client, building())
        .expect("assessment created");

    match service.upsert_section(&assessor, &assessment.public_id, energy_submission(false)) {
        Err(AssessmentServiceError::Conflict(ConflictError::StaleWrite)) => {}
        other => panic!("expected stale-write conflict, got {other:?}"),
    }
}
