//! Static scoring catalog: the variables each section may score, their point
//! ceilings, and the supporting evidence each one expects.

use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{GeoPoint, SectionType};
use super::repository::{MediaKind, MediaRef};

/// Supporting evidence a variable expects. Advisory only; scoring is never
/// blocked on missing evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvidenceRequirements {
    pub images: bool,
    pub videos: bool,
    pub audio: bool,
    pub location: bool,
}

const NO_EVIDENCE: EvidenceRequirements = EvidenceRequirements {
    images: false,
    videos: false,
    audio: false,
    location: false,
};

const IMAGES: EvidenceRequirements = EvidenceRequirements {
    images: true,
    videos: false,
    audio: false,
    location: false,
};

const LOCATION: EvidenceRequirements = EvidenceRequirements {
    images: false,
    videos: false,
    audio: false,
    location: true,
};

const AUDIO: EvidenceRequirements = EvidenceRequirements {
    images: false,
    videos: false,
    audio: true,
    location: false,
};

const IMAGES_AND_VIDEOS: EvidenceRequirements = EvidenceRequirements {
    images: true,
    videos: true,
    audio: false,
    location: false,
};

/// Definition of one scorable item within a section.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VariableDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub max_score: u16,
    pub evidence: EvidenceRequirements,
}

const BUILDING_INFORMATION: &[VariableDefinition] = &[];

const SITE_AND_TRANSPORT: &[VariableDefinition] = &[
    VariableDefinition {
        id: "siteSelection",
        name: "Responsible site selection",
        max_score: 4,
        evidence: NO_EVIDENCE,
    },
    VariableDefinition {
        id: "publicTransportAccess",
        name: "Proximity to public transport",
        max_score: 4,
        evidence: LOCATION,
    },
    VariableDefinition {
        id: "cyclingFacilities",
        name: "Cycling facilities and storage",
        max_score: 3,
        evidence: IMAGES,
    },
    VariableDefinition {
        id: "heatIslandReduction",
        name: "Heat island reduction measures",
        max_score: 4,
        evidence: IMAGES,
    },
    VariableDefinition {
        id: "landscaping",
        name: "Indigenous landscaping and shading",
        max_score: 5,
        evidence: IMAGES,
    },
];

const WATER_EFFICIENCY: &[VariableDefinition] = &[
    VariableDefinition {
        id: "rainwaterHarvesting",
        name: "Rainwater harvesting system",
        max_score: 5,
        evidence: IMAGES,
    },
    VariableDefinition {
        id: "waterEfficientFixtures",
        name: "Water-efficient fixtures",
        max_score: 4,
        evidence: IMAGES,
    },
    VariableDefinition {
        id: "greywaterRecycling",
        name: "Greywater recycling",
        max_score: 4,
        evidence: NO_EVIDENCE,
    },
    VariableDefinition {
        id: "waterMetering",
        name: "Water sub-metering",
        max_score: 2,
        evidence: IMAGES,
    },
    VariableDefinition {
        id: "irrigationEfficiency",
        name: "Efficient irrigation",
        max_score: 2,
        evidence: NO_EVIDENCE,
    },
];

const ENERGY_EFFICIENCY: &[VariableDefinition] = &[
    VariableDefinition {
        id: "solarPanels",
        name: "On-site solar generation",
        max_score: 8,
        evidence: IMAGES,
    },
    VariableDefinition {
        id: "energyEfficientLighting",
        name: "Energy-efficient lighting",
        max_score: 5,
        evidence: IMAGES,
    },
    VariableDefinition {
        id: "naturalVentilation",
        name: "Natural ventilation design",
        max_score: 5,
        evidence: NO_EVIDENCE,
    },
    VariableDefinition {
        id: "buildingEnvelope",
        name: "Building envelope performance",
        max_score: 6,
        evidence: IMAGES,
    },
    VariableDefinition {
        id: "energyMonitoring",
        name: "Energy monitoring and controls",
        max_score: 4,
        evidence: NO_EVIDENCE,
    },
    VariableDefinition {
        id: "renewableWaterHeating",
        name: "Renewable water heating",
        max_score: 4,
        evidence: IMAGES,
    },
    VariableDefinition {
        id: "efficientAppliances",
        name: "Certified efficient appliances",
        max_score: 2,
        evidence: NO_EVIDENCE,
    },
];

const INDOOR_ENVIRONMENTAL_QUALITY: &[VariableDefinition] = &[
    VariableDefinition {
        id: "daylighting",
        name: "Daylighting of occupied spaces",
        max_score: 5,
        evidence: IMAGES,
    },
    VariableDefinition {
        id: "airQuality",
        name: "Indoor air quality provisions",
        max_score: 4,
        evidence: NO_EVIDENCE,
    },
    VariableDefinition {
        id: "thermalComfort",
        name: "Thermal comfort strategy",
        max_score: 4,
        evidence: NO_EVIDENCE,
    },
    VariableDefinition {
        id: "acousticComfort",
        name: "Acoustic comfort",
        max_score: 3,
        evidence: AUDIO,
    },
    VariableDefinition {
        id: "lowEmittingMaterials",
        name: "Low-emitting interior materials",
        max_score: 4,
        evidence: NO_EVIDENCE,
    },
];

const MATERIALS_AND_RESOURCES: &[VariableDefinition] = &[
    VariableDefinition {
        id: "recycledMaterials",
        name: "Recycled-content materials",
        max_score: 4,
        evidence: NO_EVIDENCE,
    },
    VariableDefinition {
        id: "localMaterials",
        name: "Locally sourced materials",
        max_score: 4,
        evidence: LOCATION,
    },
    VariableDefinition {
        id: "sustainableTimber",
        name: "Certified sustainable timber",
        max_score: 3,
        evidence: NO_EVIDENCE,
    },
    VariableDefinition {
        id: "durableDesign",
        name: "Durability and adaptability",
        max_score: 4,
        evidence: NO_EVIDENCE,
    },
];

const WASTE_AND_POLLUTION: &[VariableDefinition] = &[
    VariableDefinition {
        id: "constructionWastePlan",
        name: "Construction waste management plan",
        max_score: 4,
        evidence: NO_EVIDENCE,
    },
    VariableDefinition {
        id: "recyclingFacilities",
        name: "Operational recycling facilities",
        max_score: 4,
        evidence: IMAGES,
    },
    VariableDefinition {
        id: "wastewaterTreatment",
        name: "On-site wastewater treatment",
        max_score: 3,
        evidence: IMAGES,
    },
    VariableDefinition {
        id: "pollutionControl",
        name: "Light and noise pollution control",
        max_score: 3,
        evidence: NO_EVIDENCE,
    },
];

const INNOVATION: &[VariableDefinition] = &[
    VariableDefinition {
        id: "innovativeTechnologies",
        name: "Innovative green technologies",
        max_score: 5,
        evidence: IMAGES_AND_VIDEOS,
    },
    VariableDefinition {
        id: "greenEducation",
        name: "Occupant green education programme",
        max_score: 3,
        evidence: NO_EVIDENCE,
    },
    VariableDefinition {
        id: "performanceExceedance",
        name: "Exceeding category benchmarks",
        max_score: 2,
        evidence: NO_EVIDENCE,
    },
];

/// Variables scorable within the given section, in catalog order.
pub fn variables_for(section: SectionType) -> &'static [VariableDefinition] {
    match section {
        SectionType::BuildingInformation => BUILDING_INFORMATION,
        SectionType::SiteAndTransport => SITE_AND_TRANSPORT,
        SectionType::WaterEfficiency => WATER_EFFICIENCY,
        SectionType::EnergyEfficiency => ENERGY_EFFICIENCY,
        SectionType::IndoorEnvironmentalQuality => INDOOR_ENVIRONMENTAL_QUALITY,
        SectionType::MaterialsAndResources => MATERIALS_AND_RESOURCES,
        SectionType::WasteAndPollution => WASTE_AND_POLLUTION,
        SectionType::Innovation => INNOVATION,
    }
}

pub fn find_variable(section: SectionType, id: &str) -> Option<&'static VariableDefinition> {
    variables_for(section).iter().find(|variable| variable.id == id)
}

/// Validation errors raised before any section state is mutated.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown section type '{0}'")]
    UnknownSection(String),
    #[error("section '{section}' has no variable '{variable}'")]
    UnknownVariable {
        section: &'static str,
        variable: String,
    },
    #[error("variable '{variable}' accepts at most {max} points (found {found})")]
    ScoreAboveMaximum {
        variable: String,
        max: u16,
        found: u16,
    },
    #[error("variable '{variable}' does not expect a location")]
    UnexpectedLocation { variable: String },
    #[error("assessor or administrator role required to own assessments")]
    OwnerRoleRequired,
    #[error("client account {0} not found")]
    UnknownClient(crate::directory::domain::UserId),
    #[error("account {0} does not hold the client role")]
    NotAClient(crate::directory::domain::UserId),
}

/// Validate a section submission against the catalog. Values outside
/// `[0, max_score]` and keys outside the catalog are rejected here so the
/// scoring aggregator can stay a pure sum.
pub fn validate_submission(
    section: SectionType,
    variables: &BTreeMap<String, u16>,
    location_data: &BTreeMap<String, GeoPoint>,
) -> Result<(), ValidationError> {
    for (id, value) in variables {
        let definition =
            find_variable(section, id).ok_or_else(|| ValidationError::UnknownVariable {
                section: section.key(),
                variable: id.clone(),
            })?;
        if *value > definition.max_score {
            return Err(ValidationError::ScoreAboveMaximum {
                variable: id.clone(),
                max: definition.max_score,
                found: *value,
            });
        }
    }

    for id in location_data.keys() {
        let definition =
            find_variable(section, id).ok_or_else(|| ValidationError::UnknownVariable {
                section: section.key(),
                variable: id.clone(),
            })?;
        if !definition.evidence.location {
            return Err(ValidationError::UnexpectedLocation {
                variable: id.clone(),
            });
        }
    }

    Ok(())
}

/// One advisory gap between a scored variable and the evidence it expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceGap {
    pub section: SectionType,
    pub variable: &'static str,
    pub missing: Vec<MediaKind>,
    pub missing_location: bool,
}

/// Compare scored variables against their declared evidence requirements and
/// the media uploaded so far. Purely informational.
pub fn evidence_gaps(
    section: SectionType,
    variables: &BTreeMap<String, u16>,
    location_data: &BTreeMap<String, GeoPoint>,
    media: &[MediaRef],
) -> Vec<EvidenceGap> {
    let mut gaps = Vec::new();

    for definition in variables_for(section) {
        let scored = variables.get(definition.id).copied().unwrap_or(0) > 0;
        if !scored {
            continue;
        }

        let has_kind = |kind: MediaKind| {
            media.iter().any(|item| {
                item.section_type == section && item.field_name == definition.id && item.kind == kind
            })
        };

        let mut missing = Vec::new();
        if definition.evidence.images && !has_kind(MediaKind::Image) {
            missing.push(MediaKind::Image);
        }
        if definition.evidence.videos && !has_kind(MediaKind::Video) {
            missing.push(MediaKind::Video);
        }
        if definition.evidence.audio && !has_kind(MediaKind::Audio) {
            missing.push(MediaKind::Audio);
        }
        let missing_location =
            definition.evidence.location && !location_data.contains_key(definition.id);

        if !missing.is_empty() || missing_location {
            gaps.push(EvidenceGap {
                section,
                variable: definition.id,
                missing,
                missing_location,
            });
        }
    }

    gaps
}
