use super::common::*;
use crate::assessments::export::scorecard_csv;
use crate::assessments::scoring::RatingTier;

#[test]
fn scorecard_covers_every_section_plus_an_overall_row() {
    let harness = harness();
    let assessment = harness.create();
    harness
        .service
        .upsert_section(&harness.assessor, &assessment.public_id, energy_submission(true))
        .expect("section saved");

    let stored = harness.stored(&assessment.public_id);
    let csv = scorecard_csv(&stored).expect("scorecard renders");
    let lines: Vec<&str> = csv.lines().collect();

    // Header, eight catalog sections, one overall row.
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0], "section,label,score,max_score,completed");
    assert!(lines
        .iter()
        .any(|line| line.starts_with("energy-efficiency,") && line.contains(",12,34,true")));
    assert!(lines.last().expect("overall row").starts_with("overall,"));
}

#[test]
fn unsaved_sections_render_with_catalog_maxima_and_zero_scores() {
    let harness = harness();
    let assessment = harness.create();

    let stored = harness.stored(&assessment.public_id);
    let csv = scorecard_csv(&stored).expect("scorecard renders");

    assert!(csv.contains("water-efficiency,Water Efficiency,0,17,false"));
    assert!(csv.contains("building-information,Building Information,0,0,false"));
}

#[test]
fn overall_row_carries_the_rating_label() {
    let harness = harness();
    let assessment = harness.create();
    harness
        .service
        .upsert_section(&harness.assessor, &assessment.public_id, energy_submission(true))
        .expect("section saved");

    let stored = harness.stored(&assessment.public_id);
    let csv = scorecard_csv(&stored).expect("scorecard renders");
    let overall = csv
        .lines()
        .last()
        .expect("overall row")
        .to_string();

    let expected = RatingTier::for_score(stored.overall_score).label();
    assert!(overall.contains(expected));
    assert!(overall.contains(&format!(",{},130,", stored.overall_score)));
}
