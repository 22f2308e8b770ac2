use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::underwriting::domain::{
    ApplicantRecord, AssessmentId, Decision, EmploymentStatus, FeatureContribution,
    HomeOwnership, LoanPurpose, PredictiveAssessment,
};
use crate::workflows::underwriting::evaluation::{DecisionEngine, EngineConfig};
use crate::workflows::underwriting::intake::ApplicationForm;
use crate::workflows::underwriting::repository::{
    AlertError, AlertPublisher, AssessmentRecord, AssessmentRepository, RepositoryError,
    UnderwriterAlert,
};
use crate::workflows::underwriting::scorer::{PredictiveScorer, ScorerError};
use crate::workflows::underwriting::{underwriting_router, UnderwritingService};

/// Scores 10/13: approvable, but outside every auto-approve rule.
pub(super) fn approvable_record() -> ApplicantRecord {
    ApplicantRecord {
        age: 38,
        annual_income: 72_000.0,
        loan_amount: 18_000.0,
        interest_rate: 10.5,
        credit_history_years: 8.0,
        prior_defaults: 0,
        employment_status: EmploymentStatus::FullTime,
        home_ownership: HomeOwnership::Mortgage,
        loan_purpose: LoanPurpose::HomeImprovement,
    }
}

/// Scores the full 13 points.
pub(super) fn strong_record() -> ApplicantRecord {
    ApplicantRecord {
        age: 47,
        annual_income: 120_000.0,
        loan_amount: 20_000.0,
        interest_rate: 7.25,
        credit_history_years: 15.0,
        prior_defaults: 0,
        employment_status: EmploymentStatus::FullTime,
        home_ownership: HomeOwnership::Own,
        loan_purpose: LoanPurpose::DebtConsolidation,
    }
}

/// Scores 6/13: traditional REVIEW.
pub(super) fn borderline_record() -> ApplicantRecord {
    ApplicantRecord {
        age: 31,
        annual_income: 45_000.0,
        loan_amount: 15_000.0,
        interest_rate: 13.0,
        credit_history_years: 4.0,
        prior_defaults: 0,
        employment_status: EmploymentStatus::SelfEmployed,
        home_ownership: HomeOwnership::Rent,
        loan_purpose: LoanPurpose::Venture,
    }
}

/// Scores 0/13 with three prior defaults.
pub(super) fn distressed_record() -> ApplicantRecord {
    ApplicantRecord {
        age: 27,
        annual_income: 35_000.0,
        loan_amount: 20_000.0,
        interest_rate: 19.5,
        credit_history_years: 3.0,
        prior_defaults: 3,
        employment_status: EmploymentStatus::PartTime,
        home_ownership: HomeOwnership::Rent,
        loan_purpose: LoanPurpose::Personal,
    }
}

/// Scores 0/13 with a single prior default: traditional REJECT, no override.
pub(super) fn thin_file_record() -> ApplicantRecord {
    ApplicantRecord {
        age: 22,
        annual_income: 25_000.0,
        loan_amount: 15_000.0,
        interest_rate: 21.0,
        credit_history_years: 1.0,
        prior_defaults: 1,
        employment_status: EmploymentStatus::Unemployed,
        home_ownership: HomeOwnership::Rent,
        loan_purpose: LoanPurpose::Medical,
    }
}

pub(super) fn form(record: &ApplicantRecord) -> ApplicationForm {
    ApplicationForm::from(record)
}

pub(super) fn predictive(probability: f64) -> PredictiveAssessment {
    PredictiveAssessment {
        probability,
        top_factors: vec![
            FeatureContribution {
                feature: "interest_rate".to_string(),
                contribution: 0.041,
            },
            FeatureContribution {
                feature: "annual_income".to_string(),
                contribution: -0.027,
            },
        ],
    }
}

pub(super) fn engine() -> DecisionEngine {
    DecisionEngine::new(EngineConfig::default()).expect("default config validates")
}

pub(super) struct FixedScorer(pub(super) f64);

impl PredictiveScorer for FixedScorer {
    fn predict(&self, _record: &ApplicantRecord) -> Result<PredictiveAssessment, ScorerError> {
        Ok(predictive(self.0))
    }
}

pub(super) struct OfflineScorer;

impl PredictiveScorer for OfflineScorer {
    fn predict(&self, _record: &ApplicantRecord) -> Result<PredictiveAssessment, ScorerError> {
        Err(ScorerError::Unavailable("model endpoint timed out".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl AssessmentRepository for MemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.assessment_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.assessment_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn pending_review(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.verdict.decision == Decision::Review)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAlerts {
    events: Arc<Mutex<Vec<UnderwriterAlert>>>,
}

impl MemoryAlerts {
    pub(super) fn events(&self) -> Vec<UnderwriterAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

impl AlertPublisher for MemoryAlerts {
    fn publish(&self, alert: UnderwriterAlert) -> Result<(), AlertError> {
        self.events
            .lock()
            .expect("alert mutex poisoned")
            .push(alert);
        Ok(())
    }
}

pub(super) struct ConflictRepository;

impl AssessmentRepository for ConflictRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(None)
    }

    fn pending_review(&self, _limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending_review(&self, _limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type TestService = UnderwritingService<FixedScorer, MemoryRepository, MemoryAlerts>;

pub(super) fn build_service(
    probability: f64,
) -> (TestService, Arc<MemoryRepository>, Arc<MemoryAlerts>) {
    let repository = Arc::new(MemoryRepository::default());
    let alerts = Arc::new(MemoryAlerts::default());
    let service = UnderwritingService::new(
        Arc::new(FixedScorer(probability)),
        repository.clone(),
        alerts.clone(),
        EngineConfig::default(),
    )
    .expect("default config validates");
    (service, repository, alerts)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    underwriting_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
