use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{ApplicantRecord, PredictiveAssessment, ValidationError};
use super::intake::ApplicationForm;

#[derive(Debug)]
pub enum ApplicationImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ApplicationImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationImportError::Io(err) => {
                write!(f, "failed to read application export: {}", err)
            }
            ApplicationImportError::Csv(err) => {
                write!(f, "invalid application CSV data: {}", err)
            }
        }
    }
}

impl std::error::Error for ApplicationImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicationImportError::Io(err) => Some(err),
            ApplicationImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ApplicationImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ApplicationImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// One imported row: the raw form plus an optional precomputed probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedApplication {
    pub reference: String,
    pub form: ApplicationForm,
    pub predictive: Option<PredictiveAssessment>,
    /// First numeric cell that failed to parse. Such a row must not be assessed.
    pub malformed: Option<ValidationError>,
}

impl ImportedApplication {
    pub fn record(&self) -> Result<ApplicantRecord, ValidationError> {
        if let Some(err) = &self.malformed {
            return Err(err.clone());
        }
        self.form.clone().into_record()
    }
}

/// Reads applicant exports. Blank cells become missing fields; unparsable cells mark the row.
pub struct ApplicationCsvImporter;

impl ApplicationCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<ImportedApplication>, ApplicationImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<ImportedApplication>, ApplicationImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut applications = Vec::new();

        for (index, row) in csv_reader.deserialize::<ApplicationRow>().enumerate() {
            let row = row?;
            applications.push(row.into_import(index + 1));
        }

        Ok(applications)
    }
}

#[derive(Debug, Deserialize)]
struct ApplicationRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    reference: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    age: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    annual_income: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    loan_amount: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    interest_rate: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    credit_history_years: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    prior_defaults: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    employment_status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    home_ownership: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    loan_purpose: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    default_probability: Option<String>,
}

impl ApplicationRow {
    fn into_import(self, line: usize) -> ImportedApplication {
        let mut malformed = None;
        let form = ApplicationForm {
            age: parse_cell("age", self.age, &mut malformed),
            annual_income: parse_cell("annual_income", self.annual_income, &mut malformed),
            loan_amount: parse_cell("loan_amount", self.loan_amount, &mut malformed),
            interest_rate: parse_cell("interest_rate", self.interest_rate, &mut malformed),
            credit_history_years: parse_cell(
                "credit_history_years",
                self.credit_history_years,
                &mut malformed,
            ),
            prior_defaults: parse_cell("prior_defaults", self.prior_defaults, &mut malformed),
            employment_status: self.employment_status,
            home_ownership: self.home_ownership,
            loan_purpose: self.loan_purpose,
        };
        let predictive = parse_cell::<f64>(
            "default_probability",
            self.default_probability,
            &mut malformed,
        )
        .map(PredictiveAssessment::new);

        ImportedApplication {
            reference: self.reference.unwrap_or_else(|| format!("row-{line}")),
            form,
            predictive,
            malformed,
        }
    }
}

/// Thousands separators are stripped; the first failure per row is kept.
fn parse_cell<T: std::str::FromStr>(
    field: &'static str,
    raw: Option<String>,
    malformed: &mut Option<ValidationError>,
) -> Option<T> {
    let raw = raw?;
    match raw.replace(',', "").parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            if malformed.is_none() {
                *malformed = Some(ValidationError::Malformed { field, value: raw });
            }
            None
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
