//! Pure score aggregation. No side effects; every function is safe to call
//! repeatedly with the same input.

use std::collections::BTreeMap;

use serde::Serialize;

use super::catalog;
use super::domain::{AssessmentSection, SectionType};

/// Domain ceiling for a fully scored assessment.
pub const MAX_POSSIBLE_SCORE: u16 = 130;

const FIVE_STAR_THRESHOLD: u16 = 106;
const FOUR_STAR_THRESHOLD: u16 = 80;
const THREE_STAR_THRESHOLD: u16 = 60;
const TWO_STAR_THRESHOLD: u16 = 45;
const ONE_STAR_THRESHOLD: u16 = 1;

/// Sum of the submitted variable values. Bounds are enforced at write time,
/// so no clamping happens here.
pub fn section_score(variables: &BTreeMap<String, u16>) -> u16 {
    variables.values().copied().sum()
}

/// Sum of the section's catalog maxima.
pub fn section_max_score(section: SectionType) -> u16 {
    catalog::variables_for(section)
        .iter()
        .map(|variable| variable.max_score)
        .sum()
}

/// Aggregate view over an assessment's stored sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    pub overall_score: u16,
    pub max_possible_score: u16,
    pub completed_sections: u8,
}

pub fn overall<'a, I>(sections: I) -> ScoreSummary
where
    I: IntoIterator<Item = &'a AssessmentSection>,
{
    let mut summary = ScoreSummary {
        overall_score: 0,
        max_possible_score: 0,
        completed_sections: 0,
    };

    for section in sections {
        summary.overall_score += section.score;
        summary.max_possible_score += section.max_score;
        if section.completed {
            summary.completed_sections += 1;
        }
    }

    summary
}

/// Discrete certification tier derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingTier {
    Unrated,
    OneStar,
    TwoStar,
    ThreeStar,
    FourStar,
    FiveStarDiamond,
}

impl RatingTier {
    pub const fn for_score(overall_score: u16) -> Self {
        if overall_score >= FIVE_STAR_THRESHOLD {
            Self::FiveStarDiamond
        } else if overall_score >= FOUR_STAR_THRESHOLD {
            Self::FourStar
        } else if overall_score >= THREE_STAR_THRESHOLD {
            Self::ThreeStar
        } else if overall_score >= TWO_STAR_THRESHOLD {
            Self::TwoStar
        } else if overall_score >= ONE_STAR_THRESHOLD {
            Self::OneStar
        } else {
            Self::Unrated
        }
    }

    pub const fn stars(self) -> u8 {
        match self {
            Self::Unrated => 0,
            Self::OneStar => 1,
            Self::TwoStar => 2,
            Self::ThreeStar => 3,
            Self::FourStar => 4,
            Self::FiveStarDiamond => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Unrated => "Unrated",
            Self::OneStar => "1-Star",
            Self::TwoStar => "2-Star",
            Self::ThreeStar => "3-Star",
            Self::FourStar => "4-Star",
            Self::FiveStarDiamond => "5-Star (Diamond)",
        }
    }
}
