use serde::{Deserialize, Serialize};

use super::super::domain::{
    ApplicantRecord, Decision, EmploymentStatus, HomeOwnership, ValidationError,
};
use super::config::{TraditionalRules, MAX_SCORE};

/// Rules of the traditional rubric, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraditionalRule {
    AnnualIncome,
    DebtToIncome,
    CreditHistory,
    PriorDefaults,
    Employment,
    HomeOwnership,
}

/// Points a single rule contributed, kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleContribution {
    pub rule: TraditionalRule,
    pub points: i16,
    pub note: String,
}

/// Rule-based credit assessment computed without the predictive model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraditionalAssessment {
    pub score: u8,
    pub recommendation: Decision,
    pub reasons: Vec<String>,
    pub components: Vec<RuleContribution>,
}

/// Deterministic scorer over the fixed rule table.
#[derive(Debug, Clone, Copy)]
pub struct TraditionalScorer {
    rules: TraditionalRules,
}

impl TraditionalScorer {
    pub fn new(rules: TraditionalRules) -> Self {
        Self { rules }
    }

    pub fn score(
        &self,
        record: &ApplicantRecord,
    ) -> Result<TraditionalAssessment, ValidationError> {
        record.validate()?;

        let components: Vec<RuleContribution> = [
            income_points(record),
            debt_to_income_points(record),
            credit_history_points(record),
            prior_default_points(record),
            employment_points(record),
            home_ownership_points(record),
        ]
        .into_iter()
        .flatten()
        .collect();

        let raw: i16 = components.iter().map(|component| component.points).sum();
        let score = raw.clamp(0, i16::from(MAX_SCORE)) as u8;

        let recommendation = if score >= self.rules.approve_cut {
            Decision::Approve
        } else if score <= self.rules.reject_cut {
            Decision::Reject
        } else {
            Decision::Review
        };

        let reasons = components
            .iter()
            .map(|component| component.note.clone())
            .collect();

        Ok(TraditionalAssessment {
            score,
            recommendation,
            reasons,
            components,
        })
    }
}

impl Default for TraditionalScorer {
    fn default() -> Self {
        Self::new(TraditionalRules::default())
    }
}

fn contribution(rule: TraditionalRule, points: i16, detail: String) -> Option<RuleContribution> {
    if points == 0 {
        return None;
    }
    Some(RuleContribution {
        rule,
        points,
        note: format!("{detail} ({points:+})"),
    })
}

fn income_points(record: &ApplicantRecord) -> Option<RuleContribution> {
    let income = record.annual_income;
    let (points, band) = if income >= 100_000.0 {
        (3, 100_000)
    } else if income >= 60_000.0 {
        (2, 60_000)
    } else if income >= 30_000.0 {
        (1, 30_000)
    } else {
        return None;
    };
    contribution(
        TraditionalRule::AnnualIncome,
        points,
        format!("annual income {income:.0} at or above {band}"),
    )
}

fn debt_to_income_points(record: &ApplicantRecord) -> Option<RuleContribution> {
    let ratio = record.debt_to_income();
    let (points, band) = if ratio <= 0.20 {
        (2, 0.20)
    } else if ratio <= 0.40 {
        (1, 0.40)
    } else {
        return None;
    };
    contribution(
        TraditionalRule::DebtToIncome,
        points,
        format!("loan-to-income ratio {ratio:.2} within {band:.2}"),
    )
}

fn credit_history_points(record: &ApplicantRecord) -> Option<RuleContribution> {
    let years = record.credit_history_years;
    let (points, band) = if years >= 10.0 {
        (3, 10)
    } else if years >= 5.0 {
        (2, 5)
    } else if years >= 2.0 {
        (1, 2)
    } else {
        return None;
    };
    contribution(
        TraditionalRule::CreditHistory,
        points,
        format!("credit history of {years:.1} years at or above {band}"),
    )
}

fn prior_default_points(record: &ApplicantRecord) -> Option<RuleContribution> {
    match record.prior_defaults {
        0 => contribution(
            TraditionalRule::PriorDefaults,
            2,
            "no prior defaults".to_string(),
        ),
        count => contribution(
            TraditionalRule::PriorDefaults,
            -2 * count as i16,
            format!("{count} prior default(s)"),
        ),
    }
}

fn employment_points(record: &ApplicantRecord) -> Option<RuleContribution> {
    let points = match record.employment_status {
        EmploymentStatus::FullTime => 2,
        EmploymentStatus::PartTime
        | EmploymentStatus::SelfEmployed
        | EmploymentStatus::Retired => 1,
        EmploymentStatus::Unemployed => -1,
    };
    contribution(
        TraditionalRule::Employment,
        points,
        format!("employment status {}", record.employment_status.label()),
    )
}

fn home_ownership_points(record: &ApplicantRecord) -> Option<RuleContribution> {
    let points = match record.home_ownership {
        HomeOwnership::Own | HomeOwnership::Mortgage => 1,
        HomeOwnership::Rent | HomeOwnership::Other => 0,
    };
    contribution(
        TraditionalRule::HomeOwnership,
        points,
        format!("home ownership {}", record.home_ownership.label()),
    )
}
