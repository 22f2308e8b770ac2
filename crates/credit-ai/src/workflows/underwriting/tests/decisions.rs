use super::common::*;

use crate::workflows::underwriting::domain::{
    Decision, Grade, PredictiveAssessment, RiskAppetite, ValidationError,
};
use crate::workflows::underwriting::evaluation::{AssessmentError, OverrideRule};

#[test]
fn balanced_appetite_approves_agreeing_methods() {
    let verdict = engine()
        .assess(&approvable_record(), RiskAppetite::Balanced, &predictive(0.185))
        .expect("assessment succeeds");

    assert_eq!(verdict.decision, Decision::Approve);
    assert_eq!(verdict.grade, Grade::B);
    assert_eq!(verdict.threshold, 0.25);
    assert!(!verdict.conflict);
    assert_eq!(verdict.forced_by(), None);
    assert_eq!(verdict.traditional_score, 10);
    assert_eq!(verdict.traditional_recommendation, Decision::Approve);
    assert_eq!(verdict.top_factors.len(), 2);

    let tail = &verdict.rationale[verdict.rationale.len() - 3..];
    assert_eq!(
        tail,
        [
            "traditional score 10/13 recommends APPROVE".to_string(),
            "no conflict: model and traditional assessment both lean APPROVE".to_string(),
            "probability 0.185 below threshold 0.250 (balanced): APPROVE".to_string(),
        ]
    );
}

#[test]
fn weak_profile_with_extreme_risk_is_rejected_by_override() {
    let verdict = engine()
        .assess(&distressed_record(), RiskAppetite::Balanced, &predictive(0.60))
        .expect("assessment succeeds");

    assert_eq!(verdict.decision, Decision::Reject);
    assert_eq!(verdict.grade, Grade::F);
    assert_eq!(verdict.forced_by(), Some(OverrideRule::ExtremeRiskWeakProfile));
    assert!(verdict.rationale[0]
        .starts_with("override extreme_risk_weak_profile forced REJECT: default probability 0.600"));
    assert!(verdict.rationale[1].starts_with("override excessive_prior_defaults also triggered"));
    assert_eq!(
        verdict.rationale.last().map(String::as_str),
        Some("threshold 0.250 (balanced) not applied: decision forced by policy override")
    );
}

#[test]
fn conservative_conflict_is_sent_to_review() {
    let verdict = engine()
        .assess(
            &approvable_record(),
            RiskAppetite::Conservative,
            &predictive(0.30),
        )
        .expect("assessment succeeds");

    assert_eq!(verdict.traditional_recommendation, Decision::Approve);
    assert!(verdict.conflict);
    assert_eq!(verdict.decision, Decision::Review);
    assert_eq!(verdict.grade, Grade::C);
    assert_eq!(verdict.forced_by(), None);
    assert!(verdict.rationale.iter().any(|entry| entry.starts_with(
        "conflict: model leans REJECT at probability 0.300 at or above threshold 0.150"
    )));
    assert_eq!(
        verdict.rationale.last().map(String::as_str),
        Some("probability 0.300 at or above threshold 0.150 (conservative): REJECT, downgraded to REVIEW on method conflict")
    );
}

#[test]
fn reject_recommendation_with_low_probability_is_a_conflict() {
    let verdict = engine()
        .assess(&thin_file_record(), RiskAppetite::Balanced, &predictive(0.05))
        .expect("assessment succeeds");

    assert_eq!(verdict.traditional_recommendation, Decision::Reject);
    assert!(verdict.conflict);
    assert_eq!(verdict.decision, Decision::Review);
    assert_eq!(verdict.grade, Grade::A);
}

#[test]
fn neutral_review_follows_the_threshold() {
    let engine = engine();
    for appetite in RiskAppetite::ALL {
        let threshold = engine.threshold(appetite);
        for probability in [0.0, 0.05, 0.149, 0.15, 0.25, 0.3499, 0.45, 0.70, 0.84] {
            let verdict = engine
                .assess(&borderline_record(), appetite, &predictive(probability))
                .expect("assessment succeeds");
            assert!(!verdict.conflict);
            assert!(verdict.overrides.iter().all(|entry| !entry.triggered));
            let expected = if probability >= threshold {
                Decision::Reject
            } else {
                Decision::Approve
            };
            assert_eq!(verdict.decision, expected, "{appetite} at {probability}");
        }
    }
}

#[test]
fn greater_appetite_never_turns_an_approval_into_a_rejection() {
    let engine = engine();
    let mut approved = false;
    for appetite in RiskAppetite::ALL {
        let verdict = engine
            .assess(&borderline_record(), appetite, &predictive(0.30))
            .expect("assessment succeeds");
        if approved {
            assert_eq!(verdict.decision, Decision::Approve, "{appetite}");
        }
        approved = verdict.decision == Decision::Approve;
    }
    assert!(approved);
}

#[test]
fn rationale_places_overrides_before_scores_and_threshold_last() {
    let verdict = engine()
        .assess(&strong_record(), RiskAppetite::Balanced, &predictive(0.05))
        .expect("assessment succeeds");

    assert_eq!(verdict.forced_by(), Some(OverrideRule::StrongProfile));
    assert!(verdict.rationale[0].starts_with("override strong_profile forced APPROVE"));
    assert!(verdict.rationale[1].starts_with("override seasoned_low_leverage also triggered"));
    assert_eq!(verdict.rationale[2], "annual income 120000 at or above 100000 (+3)");
    let score_line = verdict
        .rationale
        .iter()
        .position(|entry| entry.starts_with("traditional score"))
        .expect("score summary present");
    let conflict_line = verdict
        .rationale
        .iter()
        .position(|entry| entry.starts_with("no conflict") || entry.starts_with("conflict"))
        .expect("conflict note present");
    assert!(score_line < conflict_line);
    assert_eq!(conflict_line, verdict.rationale.len() - 2);
}

#[test]
fn identical_inputs_produce_identical_verdicts() {
    let engine = engine();
    let first = engine
        .assess(&approvable_record(), RiskAppetite::Aggressive, &predictive(0.42))
        .expect("assessment succeeds");
    let second = engine
        .assess(&approvable_record(), RiskAppetite::Aggressive, &predictive(0.42))
        .expect("assessment succeeds");
    assert_eq!(first, second);
}

#[test]
fn probability_outside_unit_interval_fails_validation() {
    let err = engine()
        .assess(
            &approvable_record(),
            RiskAppetite::Balanced,
            &PredictiveAssessment::new(1.2),
        )
        .expect_err("probability above one");
    match err {
        AssessmentError::Validation(ValidationError::OutOfRange { field, .. }) => {
            assert_eq!(field, "probability")
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn invalid_applicant_produces_no_verdict() {
    let mut record = approvable_record();
    record.age = 16;
    let err = engine()
        .assess(&record, RiskAppetite::Balanced, &predictive(0.10))
        .expect_err("minor rejected");
    assert_eq!(
        err.to_string(),
        "invalid application: age value 16 is outside the allowed range 18..=120"
    );
}

#[test]
fn summary_mentions_the_forcing_rule() {
    let verdict = engine()
        .assess(&distressed_record(), RiskAppetite::Balanced, &predictive(0.60))
        .expect("assessment succeeds");
    assert_eq!(
        verdict.summary(),
        "REJECT (grade F, probability 0.600 vs threshold 0.250), forced by extreme_risk_weak_profile"
    );
}
