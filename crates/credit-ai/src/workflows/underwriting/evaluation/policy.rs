use serde::{Deserialize, Serialize};

use super::super::domain::{ApplicantRecord, Decision, EmploymentStatus, PredictiveAssessment};
use super::config::OverrideBounds;
use super::rules::TraditionalAssessment;

/// Hard business rules, declared in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideRule {
    ExtremeRiskWeakProfile,
    ExcessivePriorDefaults,
    ProbabilityCeiling,
    StrongProfile,
    SeasonedLowLeverage,
}

impl OverrideRule {
    pub const PRIORITY: [OverrideRule; 5] = [
        OverrideRule::ExtremeRiskWeakProfile,
        OverrideRule::ExcessivePriorDefaults,
        OverrideRule::ProbabilityCeiling,
        OverrideRule::StrongProfile,
        OverrideRule::SeasonedLowLeverage,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            OverrideRule::ExtremeRiskWeakProfile => "extreme_risk_weak_profile",
            OverrideRule::ExcessivePriorDefaults => "excessive_prior_defaults",
            OverrideRule::ProbabilityCeiling => "probability_ceiling",
            OverrideRule::StrongProfile => "strong_profile",
            OverrideRule::SeasonedLowLeverage => "seasoned_low_leverage",
        }
    }

    /// Outcome the rule forces when it is the highest-priority trigger.
    pub const fn forces(self) -> Decision {
        match self {
            OverrideRule::ExtremeRiskWeakProfile
            | OverrideRule::ExcessivePriorDefaults
            | OverrideRule::ProbabilityCeiling => Decision::Reject,
            OverrideRule::StrongProfile | OverrideRule::SeasonedLowLeverage => Decision::Approve,
        }
    }
}

/// Audit entry for one evaluated rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyOverride {
    pub rule: OverrideRule,
    pub triggered: bool,
    pub adjusted_probability: Option<f64>,
    pub forced_decision: Option<Decision>,
    pub justification: String,
}

/// Evaluates every override rule and lets the first trigger force the outcome.
#[derive(Debug, Clone, Copy)]
pub struct PolicyOverrideEngine {
    bounds: OverrideBounds,
}

impl PolicyOverrideEngine {
    pub fn new(bounds: OverrideBounds) -> Self {
        Self { bounds }
    }

    pub fn apply(
        &self,
        record: &ApplicantRecord,
        predictive: &PredictiveAssessment,
        traditional: &TraditionalAssessment,
        threshold: f64,
    ) -> Vec<PolicyOverride> {
        let mut forced = false;

        OverrideRule::PRIORITY
            .iter()
            .map(|rule| {
                let (triggered, justification) =
                    self.evaluate(*rule, record, predictive, traditional, threshold);
                let forced_decision = if triggered && !forced {
                    forced = true;
                    Some(rule.forces())
                } else {
                    None
                };
                PolicyOverride {
                    rule: *rule,
                    triggered,
                    adjusted_probability: None,
                    forced_decision,
                    justification,
                }
            })
            .collect()
    }

    /// Returns whether the rule fired and its justification. An untriggered
    /// rule lists every condition that failed.
    fn evaluate(
        &self,
        rule: OverrideRule,
        record: &ApplicantRecord,
        predictive: &PredictiveAssessment,
        traditional: &TraditionalAssessment,
        threshold: f64,
    ) -> (bool, String) {
        let bounds = &self.bounds;
        let probability = predictive.probability;
        let score = traditional.score;
        let mut unmet = Vec::new();

        let fired = match rule {
            OverrideRule::ExtremeRiskWeakProfile => {
                if probability < bounds.extreme_risk_probability {
                    unmet.push(format!(
                        "probability {probability:.3} below {:.3}",
                        bounds.extreme_risk_probability
                    ));
                }
                if score >= bounds.weak_score_floor {
                    unmet.push(format!(
                        "traditional score {score} at or above floor {}",
                        bounds.weak_score_floor
                    ));
                }
                format!(
                    "default probability {probability:.3} at or above {:.3} \
                     with traditional score {score} below {}",
                    bounds.extreme_risk_probability, bounds.weak_score_floor
                )
            }
            OverrideRule::ExcessivePriorDefaults => {
                if record.prior_defaults <= bounds.max_prior_defaults {
                    unmet.push(format!(
                        "{} prior default(s) within the cap of {}",
                        record.prior_defaults, bounds.max_prior_defaults
                    ));
                }
                format!(
                    "{} prior default(s) exceed the cap of {}",
                    record.prior_defaults, bounds.max_prior_defaults
                )
            }
            OverrideRule::ProbabilityCeiling => {
                if probability < bounds.probability_ceiling {
                    unmet.push(format!(
                        "probability {probability:.3} below hard ceiling {:.3}",
                        bounds.probability_ceiling
                    ));
                }
                format!(
                    "default probability {probability:.3} at or above hard ceiling {:.3}",
                    bounds.probability_ceiling
                )
            }
            OverrideRule::StrongProfile => {
                if probability >= bounds.strong_profile_max_probability {
                    unmet.push(format!(
                        "probability {probability:.3} not below {:.3}",
                        bounds.strong_profile_max_probability
                    ));
                }
                if score < bounds.strong_profile_min_score {
                    unmet.push(format!(
                        "traditional score {score} below {}",
                        bounds.strong_profile_min_score
                    ));
                }
                if record.prior_defaults > 0 {
                    unmet.push(format!("{} prior default(s) on file", record.prior_defaults));
                }
                format!(
                    "default probability {probability:.3} below {:.3} (threshold {threshold:.3}) \
                     with traditional score {score} of at least {} and no prior defaults",
                    bounds.strong_profile_max_probability, bounds.strong_profile_min_score
                )
            }
            OverrideRule::SeasonedLowLeverage => {
                let ratio = record.debt_to_income();
                if probability >= bounds.seasoned_max_probability {
                    unmet.push(format!(
                        "probability {probability:.3} not below {:.3}",
                        bounds.seasoned_max_probability
                    ));
                }
                if record.credit_history_years < bounds.seasoned_min_history_years {
                    unmet.push(format!(
                        "credit history {:.1} years below {:.1}",
                        record.credit_history_years, bounds.seasoned_min_history_years
                    ));
                }
                if ratio > bounds.seasoned_max_debt_to_income {
                    unmet.push(format!(
                        "loan-to-income {ratio:.2} above {:.2}",
                        bounds.seasoned_max_debt_to_income
                    ));
                }
                if record.prior_defaults > 0 {
                    unmet.push(format!("{} prior default(s) on file", record.prior_defaults));
                }
                if record.employment_status != EmploymentStatus::FullTime {
                    unmet.push(format!(
                        "employment status {} is not full_time",
                        record.employment_status.label()
                    ));
                }
                format!(
                    "default probability {probability:.3} below {:.3} with {:.1} years of \
                     credit history, loan-to-income {ratio:.2} and full-time employment",
                    bounds.seasoned_max_probability, record.credit_history_years
                )
            }
        };

        if unmet.is_empty() {
            (true, fired)
        } else {
            (false, format!("not triggered: {}", unmet.join("; ")))
        }
    }
}

impl Default for PolicyOverrideEngine {
    fn default() -> Self {
        Self::new(OverrideBounds::default())
    }
}

/// First override that forced an outcome, if any.
pub fn forcing_override(overrides: &[PolicyOverride]) -> Option<&PolicyOverride> {
    overrides
        .iter()
        .find(|entry| entry.forced_decision.is_some())
}
