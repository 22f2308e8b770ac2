use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for persisted assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

pub const MIN_APPLICANT_AGE: u16 = 18;
pub const MAX_APPLICANT_AGE: u16 = 120;
pub const MAX_MONETARY_AMOUNT: f64 = 100_000_000.0;
pub const MAX_INTEREST_RATE: f64 = 100.0;
pub const MAX_PRIOR_DEFAULTS: u16 = 50;

/// Validated loan application attributes consumed by both assessment methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub age: u16,
    pub annual_income: f64,
    pub loan_amount: f64,
    /// Annual percentage, e.g. `11.5`.
    pub interest_rate: f64,
    pub credit_history_years: f64,
    pub prior_defaults: u16,
    pub employment_status: EmploymentStatus,
    pub home_ownership: HomeOwnership,
    pub loan_purpose: LoanPurpose,
}

impl ApplicantRecord {
    /// Reject out-of-range input; values are never clamped.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_APPLICANT_AGE..=MAX_APPLICANT_AGE).contains(&self.age) {
            return Err(ValidationError::OutOfRange {
                field: "age",
                value: f64::from(self.age),
                min: f64::from(MIN_APPLICANT_AGE),
                max: f64::from(MAX_APPLICANT_AGE),
            });
        }

        check_range("annual_income", self.annual_income, 1.0, MAX_MONETARY_AMOUNT)?;
        check_range("loan_amount", self.loan_amount, 1.0, MAX_MONETARY_AMOUNT)?;
        check_range("interest_rate", self.interest_rate, 0.0, MAX_INTEREST_RATE)?;
        check_range(
            "credit_history_years",
            self.credit_history_years,
            0.0,
            f64::from(self.age),
        )?;

        if self.prior_defaults > MAX_PRIOR_DEFAULTS {
            return Err(ValidationError::OutOfRange {
                field: "prior_defaults",
                value: f64::from(self.prior_defaults),
                min: 0.0,
                max: f64::from(MAX_PRIOR_DEFAULTS),
            });
        }

        Ok(())
    }

    pub fn debt_to_income(&self) -> f64 {
        self.loan_amount / self.annual_income
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field, value });
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    FullTime,
    PartTime,
    SelfEmployed,
    Retired,
    Unemployed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeOwnership {
    Own,
    Mortgage,
    Rent,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPurpose {
    Personal,
    Education,
    Medical,
    Venture,
    HomeImprovement,
    DebtConsolidation,
}

impl EmploymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EmploymentStatus::FullTime => "full_time",
            EmploymentStatus::PartTime => "part_time",
            EmploymentStatus::SelfEmployed => "self_employed",
            EmploymentStatus::Retired => "retired",
            EmploymentStatus::Unemployed => "unemployed",
        }
    }
}

impl HomeOwnership {
    pub const fn label(self) -> &'static str {
        match self {
            HomeOwnership::Own => "own",
            HomeOwnership::Mortgage => "mortgage",
            HomeOwnership::Rent => "rent",
            HomeOwnership::Other => "other",
        }
    }
}

impl LoanPurpose {
    pub const fn label(self) -> &'static str {
        match self {
            LoanPurpose::Personal => "personal",
            LoanPurpose::Education => "education",
            LoanPurpose::Medical => "medical",
            LoanPurpose::Venture => "venture",
            LoanPurpose::HomeImprovement => "home_improvement",
            LoanPurpose::DebtConsolidation => "debt_consolidation",
        }
    }
}

/// Lowercases and folds `-`/space separators so `"Full Time"` matches `full_time`.
pub(crate) fn normalize_category(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

impl FromStr for EmploymentStatus {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_category(raw).as_str() {
            "full_time" | "fulltime" | "employed" => Ok(Self::FullTime),
            "part_time" | "parttime" => Ok(Self::PartTime),
            "self_employed" => Ok(Self::SelfEmployed),
            "retired" => Ok(Self::Retired),
            "unemployed" => Ok(Self::Unemployed),
            _ => Err(()),
        }
    }
}

impl FromStr for HomeOwnership {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_category(raw).as_str() {
            "own" | "owner" => Ok(Self::Own),
            "mortgage" => Ok(Self::Mortgage),
            "rent" | "renter" => Ok(Self::Rent),
            "other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

impl FromStr for LoanPurpose {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_category(raw).as_str() {
            "personal" => Ok(Self::Personal),
            "education" => Ok(Self::Education),
            "medical" => Ok(Self::Medical),
            "venture" => Ok(Self::Venture),
            "home_improvement" | "homeimprovement" => Ok(Self::HomeImprovement),
            "debt_consolidation" | "debtconsolidation" => Ok(Self::DebtConsolidation),
            _ => Err(()),
        }
    }
}

/// Single signed feature contribution reported by the predictive scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub contribution: f64,
}

/// Output of the external predictive scorer for one applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictiveAssessment {
    pub probability: f64,
    /// Ordered by descending magnitude.
    #[serde(default)]
    pub top_factors: Vec<FeatureContribution>,
}

impl PredictiveAssessment {
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            top_factors: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("probability", self.probability, 0.0, 1.0)?;
        for factor in &self.top_factors {
            if factor.feature.trim().is_empty() {
                return Err(ValidationError::Missing {
                    field: "top_factors.feature",
                });
            }
            if !factor.contribution.is_finite() {
                return Err(ValidationError::NotFinite {
                    field: "top_factors.contribution",
                    value: factor.contribution,
                });
            }
        }
        Ok(())
    }
}

/// Categorical outcome shared by the traditional recommendation and the final verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    Reject,
    Review,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Decision::Approve => "APPROVE",
            Decision::Reject => "REJECT",
            Decision::Review => "REVIEW",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Business appetite for default risk, ordered from most to least cautious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAppetite {
    Conservative,
    Balanced,
    Aggressive,
    VeryAggressive,
}

impl RiskAppetite {
    pub const ALL: [RiskAppetite; 4] = [
        RiskAppetite::Conservative,
        RiskAppetite::Balanced,
        RiskAppetite::Aggressive,
        RiskAppetite::VeryAggressive,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            RiskAppetite::Conservative => "conservative",
            RiskAppetite::Balanced => "balanced",
            RiskAppetite::Aggressive => "aggressive",
            RiskAppetite::VeryAggressive => "very_aggressive",
        }
    }
}

impl fmt::Display for RiskAppetite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskAppetite {
    type Err = ConfigurationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_category(raw).as_str() {
            "conservative" => Ok(Self::Conservative),
            "balanced" => Ok(Self::Balanced),
            "aggressive" => Ok(Self::Aggressive),
            "very_aggressive" | "veryaggressive" => Ok(Self::VeryAggressive),
            _ => Err(ConfigurationError::UnknownRiskAppetite(raw.to_string())),
        }
    }
}

/// Letter grade derived from the effective default probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub const fn label(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Malformed or out-of-range applicant input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a finite number (found {value})")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} value {value} is outside the allowed range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} has unrecognized value '{value}'")]
    UnknownCategory { field: &'static str, value: String },
    #[error("{field} could not be parsed as a number (found '{value}')")]
    Malformed { field: &'static str, value: String },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotFinite { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::UnknownCategory { field, .. }
            | ValidationError::Malformed { field, .. } => field,
        }
    }
}

/// Invalid or incomplete engine configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unrecognized risk appetite '{0}'")]
    UnknownRiskAppetite(String),
    #[error("threshold for {appetite} must lie strictly between 0 and 1 (found {value})")]
    ThresholdOutOfRange { appetite: RiskAppetite, value: f64 },
    #[error("threshold for {higher} ({higher_value}) must exceed {lower} ({lower_value})")]
    NonMonotonicThresholds {
        lower: RiskAppetite,
        lower_value: f64,
        higher: RiskAppetite,
        higher_value: f64,
    },
    #[error("grade band upper bounds must be strictly increasing within (0, 1]")]
    InvalidGradeBands,
    #[error("traditional cut-points invalid (reject <= {reject_cut}, approve >= {approve_cut})")]
    InvalidCutPoints { reject_cut: u8, approve_cut: u8 },
    #[error("override bound {name} is invalid (found {value})")]
    InvalidOverrideBound { name: &'static str, value: f64 },
}
