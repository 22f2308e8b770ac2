mod config;
mod conflict;
mod policy;
mod rules;

pub use config::{
    EngineConfig, GradeBands, OverrideBounds, ThresholdTable, TraditionalRules, MAX_SCORE,
};
pub use conflict::{detect_conflict, model_lean};
pub use policy::{forcing_override, OverrideRule, PolicyOverride, PolicyOverrideEngine};
pub use rules::{RuleContribution, TraditionalAssessment, TraditionalRule, TraditionalScorer};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    ApplicantRecord, ConfigurationError, Decision, FeatureContribution, Grade,
    PredictiveAssessment, RiskAppetite, ValidationError,
};

/// Sequential stages of a single assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentStage {
    Validate,
    ScoreTraditional,
    DetectConflict,
    EvaluateOverrides,
    ThresholdCompare,
    Finalize,
}

/// Fatal error for one assessment; no partial verdict is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error("invalid application: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Final verdict handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub decision: Decision,
    pub effective_probability: f64,
    pub threshold: f64,
    pub risk_appetite: RiskAppetite,
    pub grade: Grade,
    pub conflict: bool,
    /// Override justifications, traditional reasons, conflict note, threshold note.
    pub rationale: Vec<String>,
    pub traditional_score: u8,
    pub traditional_recommendation: Decision,
    pub overrides: Vec<PolicyOverride>,
    pub top_factors: Vec<FeatureContribution>,
}

impl Verdict {
    pub fn forced_by(&self) -> Option<OverrideRule> {
        forcing_override(&self.overrides).map(|entry| entry.rule)
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{} (grade {}, probability {:.3} vs threshold {:.3})",
            self.decision, self.grade, self.effective_probability, self.threshold
        );
        if let Some(rule) = self.forced_by() {
            summary.push_str(&format!(", forced by {}", rule.name()));
        } else if self.conflict {
            summary.push_str(", methods disagree");
        }
        summary
    }
}

/// Stateless engine combining the traditional rubric, overrides, and threshold policy.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: EngineConfig,
    scorer: TraditionalScorer,
    overrides: PolicyOverrideEngine,
}

impl DecisionEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            scorer: TraditionalScorer::new(config.traditional),
            overrides: PolicyOverrideEngine::new(config.overrides),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn threshold(&self, appetite: RiskAppetite) -> f64 {
        self.config.thresholds.select(appetite)
    }

    pub fn assess(
        &self,
        record: &ApplicantRecord,
        appetite: RiskAppetite,
        predictive: &PredictiveAssessment,
    ) -> Result<Verdict, AssessmentError> {
        debug!(stage = ?AssessmentStage::Validate);
        record.validate()?;
        predictive.validate()?;
        let probability = predictive.probability;
        let threshold = self.threshold(appetite);

        debug!(stage = ?AssessmentStage::ScoreTraditional);
        let traditional = self.scorer.score(record)?;

        debug!(stage = ?AssessmentStage::DetectConflict, score = traditional.score);
        let conflict = detect_conflict(probability, traditional.recommendation, threshold);

        debug!(stage = ?AssessmentStage::EvaluateOverrides, conflict);
        let overrides = self
            .overrides
            .apply(record, predictive, &traditional, threshold);

        let mut rationale = Vec::new();
        let forced = forcing_override(&overrides);
        if let Some(entry) = forced {
            rationale.push(format!(
                "override {} forced {}: {}",
                entry.rule.name(),
                entry.rule.forces(),
                entry.justification
            ));
        }
        for entry in overrides
            .iter()
            .filter(|entry| entry.triggered && entry.forced_decision.is_none())
        {
            rationale.push(format!(
                "override {} also triggered: {}",
                entry.rule.name(),
                entry.justification
            ));
        }

        rationale.extend(traditional.reasons.iter().cloned());
        rationale.push(format!(
            "traditional score {}/{} recommends {}",
            traditional.score, MAX_SCORE, traditional.recommendation
        ));
        rationale.push(conflict::conflict_note(
            probability,
            traditional.recommendation,
            threshold,
        ));

        let decision = match forced.and_then(|entry| entry.forced_decision) {
            Some(decision) => {
                rationale.push(format!(
                    "threshold {threshold:.3} ({appetite}) not applied: decision forced by policy override"
                ));
                decision
            }
            None => {
                debug!(stage = ?AssessmentStage::ThresholdCompare, probability, threshold);
                threshold_decision(probability, threshold, appetite, conflict, &mut rationale)
            }
        };

        debug!(stage = ?AssessmentStage::Finalize, decision = %decision);
        Ok(Verdict {
            decision,
            effective_probability: probability,
            threshold,
            risk_appetite: appetite,
            grade: self.config.grades.grade(probability),
            conflict,
            rationale,
            traditional_score: traditional.score,
            traditional_recommendation: traditional.recommendation,
            overrides,
            top_factors: predictive.top_factors.clone(),
        })
    }
}

fn threshold_decision(
    probability: f64,
    threshold: f64,
    appetite: RiskAppetite,
    conflict: bool,
    rationale: &mut Vec<String>,
) -> Decision {
    let compared = model_lean(probability, threshold);
    let relation = if compared == Decision::Reject {
        "at or above"
    } else {
        "below"
    };
    let mut note = format!(
        "probability {probability:.3} {relation} threshold {threshold:.3} ({appetite}): {compared}"
    );

    let decision = if conflict {
        note.push_str(", downgraded to REVIEW on method conflict");
        Decision::Review
    } else {
        compared
    };
    rationale.push(note);
    decision
}
