use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicantRecord, EmploymentStatus, HomeOwnership, LoanPurpose, ValidationError,
};

/// Raw application as captured by forms, CSV exports, or API callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationForm {
    #[serde(default)]
    pub age: Option<u16>,
    #[serde(default)]
    pub annual_income: Option<f64>,
    #[serde(default)]
    pub loan_amount: Option<f64>,
    #[serde(default)]
    pub interest_rate: Option<f64>,
    #[serde(default)]
    pub credit_history_years: Option<f64>,
    #[serde(default)]
    pub prior_defaults: Option<u16>,
    #[serde(default)]
    pub employment_status: Option<String>,
    #[serde(default)]
    pub home_ownership: Option<String>,
    #[serde(default)]
    pub loan_purpose: Option<String>,
}

impl ApplicationForm {
    /// Convert the raw form into a validated record, naming the first offending field.
    pub fn into_record(self) -> Result<ApplicantRecord, ValidationError> {
        let record = ApplicantRecord {
            age: required("age", self.age)?,
            annual_income: required("annual_income", self.annual_income)?,
            loan_amount: required("loan_amount", self.loan_amount)?,
            interest_rate: required("interest_rate", self.interest_rate)?,
            credit_history_years: required("credit_history_years", self.credit_history_years)?,
            prior_defaults: required("prior_defaults", self.prior_defaults)?,
            employment_status: category::<EmploymentStatus>(
                "employment_status",
                self.employment_status,
            )?,
            home_ownership: category::<HomeOwnership>("home_ownership", self.home_ownership)?,
            loan_purpose: category::<LoanPurpose>("loan_purpose", self.loan_purpose)?,
        };

        record.validate()?;
        Ok(record)
    }
}

impl From<&ApplicantRecord> for ApplicationForm {
    fn from(record: &ApplicantRecord) -> Self {
        Self {
            age: Some(record.age),
            annual_income: Some(record.annual_income),
            loan_amount: Some(record.loan_amount),
            interest_rate: Some(record.interest_rate),
            credit_history_years: Some(record.credit_history_years),
            prior_defaults: Some(record.prior_defaults),
            employment_status: Some(record.employment_status.label().to_string()),
            home_ownership: Some(record.home_ownership.label().to_string()),
            loan_purpose: Some(record.loan_purpose.label().to_string()),
        }
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::Missing { field })
}

fn category<T: FromStr>(field: &'static str, raw: Option<String>) -> Result<T, ValidationError> {
    let raw = raw
        .filter(|value| !value.trim().is_empty())
        .ok_or(ValidationError::Missing { field })?;
    raw.parse::<T>()
        .map_err(|_| ValidationError::UnknownCategory { field, value: raw })
}
