use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use crate::activity::{
    ActivityRecord, ActivityRecorder, ActivityStore, ActivityStoreError, ActivityType,
    Notification, NotificationError, NotificationPort,
};
use crate::assessments::domain::{
    Assessment, BuildingMetadata, PublicAssessmentId, SectionSubmission, SectionType,
};
use crate::assessments::repository::{
    AssessmentRepository, MediaCatalog, MediaCatalogError, MediaRef, NoMediaCatalog,
    RepositoryError,
};
use crate::assessments::service::AssessmentService;
use crate::directory::domain::{
    ClientSubscription, Role, SubscriptionStatus, SubscriptionTier, UserAccount, UserId,
    UserStatus,
};
use crate::directory::repository::UserDirectory;
use crate::memory::{
    MemoryActivityStore, MemoryAssessmentRepository, MemoryDirectory, RecordingNotifier,
};

pub(super) struct Harness {
    pub(super) service: AssessmentService<MemoryAssessmentRepository, MemoryDirectory>,
    pub(super) repository: Arc<MemoryAssessmentRepository>,
    pub(super) directory: Arc<MemoryDirectory>,
    pub(super) store: Arc<MemoryActivityStore>,
    pub(super) notifier: Arc<RecordingNotifier>,
    pub(super) admin: UserId,
    pub(super) assessor: UserId,
    pub(super) other_assessor: UserId,
    pub(super) client: UserId,
    pub(super) delinquent_client: UserId,
}

pub(super) fn seed_user(
    directory: &MemoryDirectory,
    email: &str,
    full_name: &str,
    role: Role,
    subscription: Option<ClientSubscription>,
) -> UserId {
    let now = Utc::now();
    let account = UserAccount {
        id: UserId::generate(),
        email: email.to_string(),
        full_name: full_name.to_string(),
        role,
        status: UserStatus::Active,
        subscription,
        created_at: now,
        updated_at: now,
    };
    let id = account.id;
    directory.insert_user(account).expect("seed user");
    id
}

pub(super) fn active_subscription() -> ClientSubscription {
    ClientSubscription {
        tier: SubscriptionTier::Professional,
        status: SubscriptionStatus::Active,
    }
}

pub(super) fn harness() -> Harness {
    let repository = Arc::new(MemoryAssessmentRepository::default());
    let directory = Arc::new(MemoryDirectory::default());
    let store = Arc::new(MemoryActivityStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let recorder = ActivityRecorder::new(store.clone(), notifier.clone());

    let admin = directory.seed_admin("ops@greda.example", "Platform Ops");
    let assessor = seed_user(
        &directory,
        "esi@greda.example",
        "Esi Boateng",
        Role::Assessor,
        None,
    );
    let other_assessor = seed_user(
        &directory,
        "kojo@greda.example",
        "Kojo Asante",
        Role::Assessor,
        None,
    );
    let client = seed_user(
        &directory,
        "owner@accra-towers.example",
        "Accra Towers Ltd",
        Role::Client,
        Some(active_subscription()),
    );
    let delinquent_client = seed_user(
        &directory,
        "billing-hold@client.example",
        "Harbour View Estates",
        Role::Client,
        Some(ClientSubscription {
            tier: SubscriptionTier::Basic,
            status: SubscriptionStatus::PastDue,
        }),
    );

    let service = AssessmentService::new(
        repository.clone(),
        directory.clone(),
        Arc::new(NoMediaCatalog),
        recorder,
    );

    Harness {
        service,
        repository,
        directory,
        store,
        notifier,
        admin,
        assessor,
        other_assessor,
        client,
        delinquent_client,
    }
}

pub(super) fn building() -> BuildingMetadata {
    BuildingMetadata {
        building_name: "Accra Towers".to_string(),
        address: "12 Independence Avenue, Accra".to_string(),
        building_type: Some("Commercial office".to_string()),
        floor_area_sqm: Some(5600),
    }
}

pub(super) fn energy_variables() -> BTreeMap<String, u16> {
    BTreeMap::from([
        ("solarPanels".to_string(), 5),
        ("energyEfficientLighting".to_string(), 4),
        ("naturalVentilation".to_string(), 3),
    ])
}

pub(super) fn energy_submission(completed: bool) -> SectionSubmission {
    SectionSubmission {
        section_type: SectionType::EnergyEfficiency,
        variables: energy_variables(),
        location_data: BTreeMap::new(),
        completed,
    }
}

pub(super) fn water_submission(completed: bool) -> SectionSubmission {
    SectionSubmission {
        section_type: SectionType::WaterEfficiency,
        variables: BTreeMap::from([
            ("rainwaterHarvesting".to_string(), 4),
            ("waterEfficientFixtures".to_string(), 3),
        ]),
        location_data: BTreeMap::new(),
        completed,
    }
}

impl Harness {
    /// A second service over the same shared adapters, for router fixtures
    /// that need the service behind an `Arc`.
    pub(super) fn service_handle(
        &self,
    ) -> AssessmentService<MemoryAssessmentRepository, MemoryDirectory> {
        AssessmentService::new(
            self.repository.clone(),
            self.directory.clone(),
            Arc::new(NoMediaCatalog),
            ActivityRecorder::new(self.store.clone(), self.notifier.clone()),
        )
    }

    pub(super) fn create(&self) -> Assessment {
        self.service
            .create_assessment(&self.assessor, &self.client, building())
            .expect("assessment created")
    }

    /// Create, score one section, complete, and lock; the common starting
    /// point for edit-request scenarios.
    pub(super) fn completed_locked(&self) -> PublicAssessmentId {
        let assessment = self.create();
        self.service
            .upsert_section(&self.assessor, &assessment.public_id, energy_submission(true))
            .expect("section saved");
        self.service
            .complete_assessment(&self.assessor, &assessment.public_id)
            .expect("assessment completed");
        self.service
            .lock_assessment(&self.admin, &assessment.public_id, None)
            .expect("assessment locked");
        assessment.public_id
    }

    pub(super) fn stored(&self, public_id: &PublicAssessmentId) -> Assessment {
        self.repository
            .fetch_by_public_id(public_id)
            .expect("repository fetch")
            .expect("record present")
    }

    pub(super) fn entries_of(&self, activity_type: ActivityType) -> Vec<ActivityRecord> {
        self.store
            .records()
            .into_iter()
            .filter(|record| record.activity_type == activity_type)
            .collect()
    }
}

/// Activity store that always fails, for fire-and-forget coverage.
#[derive(Default, Clone)]
pub(super) struct FailingActivityStore;

impl ActivityStore for FailingActivityStore {
    fn append(&self, _record: ActivityRecord) -> Result<(), ActivityStoreError> {
        Err(ActivityStoreError::Unavailable("audit db offline".to_string()))
    }

    fn for_assessment(
        &self,
        _assessment: &PublicAssessmentId,
    ) -> Result<Vec<ActivityRecord>, ActivityStoreError> {
        Ok(Vec::new())
    }

    fn for_user(&self, _user: &UserId) -> Result<Vec<ActivityRecord>, ActivityStoreError> {
        Ok(Vec::new())
    }
}

/// Notifier that always fails, for fire-and-forget coverage.
#[derive(Default, Clone)]
pub(super) struct FailingNotifier;

impl NotificationPort for FailingNotifier {
    fn deliver(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("push gateway offline".to_string()))
    }
}

/// Repository whose updates always report a concurrent write.
#[derive(Default, Clone)]
pub(super) struct StaleRepository {
    inner: MemoryAssessmentRepository,
}

impl AssessmentRepository for StaleRepository {
    fn insert(&self, record: Assessment) -> Result<Assessment, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, _record: Assessment, _expected_version: u64) -> Result<(), RepositoryError> {
        Err(RepositoryError::VersionMismatch)
    }

    fn fetch_by_public_id(
        &self,
        public_id: &PublicAssessmentId,
    ) -> Result<Option<Assessment>, RepositoryError> {
        self.inner.fetch_by_public_id(public_id)
    }

    fn list(&self) -> Result<Vec<Assessment>, RepositoryError> {
        self.inner.list()
    }
}

/// Media catalog serving a fixed set of references.
#[derive(Default, Clone)]
pub(super) struct StaticMediaCatalog {
    pub(super) refs: Vec<MediaRef>,
}

impl MediaCatalog for StaticMediaCatalog {
    fn refs_for(
        &self,
        assessment: &PublicAssessmentId,
    ) -> Result<Vec<MediaRef>, MediaCatalogError> {
        Ok(self
            .refs
            .iter()
            .filter(|media| media.assessment == *assessment)
            .cloned()
            .collect())
    }
}
