use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::domain::UserId;

/// Internal identifier used for ownership joins; never exposed externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub u64);

/// Opaque identifier shared with callers instead of the internal key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicAssessmentId(pub Uuid);

impl PublicAssessmentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PublicAssessmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The fixed, ordered catalog of assessment sections. Building information is
/// collected but never scored; the remaining seven carry the 130 available
/// points between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionType {
    BuildingInformation,
    SiteAndTransport,
    WaterEfficiency,
    EnergyEfficiency,
    IndoorEnvironmentalQuality,
    MaterialsAndResources,
    WasteAndPollution,
    Innovation,
}

impl SectionType {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::BuildingInformation,
            Self::SiteAndTransport,
            Self::WaterEfficiency,
            Self::EnergyEfficiency,
            Self::IndoorEnvironmentalQuality,
            Self::MaterialsAndResources,
            Self::WasteAndPollution,
            Self::Innovation,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::BuildingInformation => "building-information",
            Self::SiteAndTransport => "site-and-transport",
            Self::WaterEfficiency => "water-efficiency",
            Self::EnergyEfficiency => "energy-efficiency",
            Self::IndoorEnvironmentalQuality => "indoor-environmental-quality",
            Self::MaterialsAndResources => "materials-and-resources",
            Self::WasteAndPollution => "waste-and-pollution",
            Self::Innovation => "innovation",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::BuildingInformation => "Building Information",
            Self::SiteAndTransport => "Site & Transport",
            Self::WaterEfficiency => "Water Efficiency",
            Self::EnergyEfficiency => "Energy Efficiency",
            Self::IndoorEnvironmentalQuality => "Indoor Environmental Quality",
            Self::MaterialsAndResources => "Materials & Resources",
            Self::WasteAndPollution => "Waste & Pollution",
            Self::Innovation => "Innovation",
        }
    }

    /// Building information collects metadata only and contributes no points.
    pub const fn is_scored(self) -> bool {
        !matches!(self, Self::BuildingInformation)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ordered().into_iter().find(|section| section.key() == key)
    }
}

pub const TOTAL_SECTIONS: u8 = SectionType::ordered().len() as u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Draft,
    Completed,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Completed => "completed",
        }
    }
}

/// Geocoordinate captured for location-evidencing variables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// One scoring category of an assessment. Unique per (assessment, section
/// type); saves replace the previous state wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSection {
    pub section_type: SectionType,
    pub variables: BTreeMap<String, u16>,
    pub location_data: BTreeMap<String, GeoPoint>,
    pub score: u16,
    pub max_score: u16,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

/// Descriptive details of the building under evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingMetadata {
    pub building_name: String,
    pub address: String,
    pub building_type: Option<String>,
    pub floor_area_sqm: Option<u32>,
}

/// One building evaluation and its section state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub public_id: PublicAssessmentId,
    pub assessor_id: UserId,
    pub client_id: UserId,
    pub building: BuildingMetadata,
    pub status: AssessmentStatus,
    pub locked: bool,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<UserId>,
    pub edit_requested_by: Option<UserId>,
    pub edit_requested_at: Option<DateTime<Utc>>,
    pub overall_score: u16,
    pub max_possible_score: u16,
    pub completed_sections: u8,
    pub total_sections: u8,
    pub conducted_at: Option<DateTime<Utc>>,
    pub archived: bool,
    pub version: u64,
    pub sections: BTreeMap<SectionType, AssessmentSection>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assessment {
    pub fn has_pending_edit_request(&self) -> bool {
        self.edit_requested_by.is_some()
    }

    pub fn progress(&self) -> ProgressStage {
        ProgressStage::from_counts(self.completed_sections, self.total_sections)
    }
}

/// Assessor-provided snapshot of one section save. Replaces the stored
/// section state wholesale; autosave retries are idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSubmission {
    pub section_type: SectionType,
    pub variables: BTreeMap<String, u16>,
    pub location_data: BTreeMap<String, GeoPoint>,
    pub completed: bool,
}

/// UI projection of how far along an assessment is; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    NotStarted,
    InProgress,
    AlmostDone,
    Ready,
}

impl ProgressStage {
    pub fn from_counts(completed: u8, total: u8) -> Self {
        if completed == 0 {
            Self::NotStarted
        } else if completed >= total {
            Self::Ready
        } else if u16::from(completed) * 4 >= u16::from(total) * 3 {
            Self::AlmostDone
        } else {
            Self::InProgress
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::AlmostDone => "Almost Done",
            Self::Ready => "Ready",
        }
    }
}
