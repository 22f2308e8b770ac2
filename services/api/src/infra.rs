use credit_ai::workflows::underwriting::{
    AlertError, AlertPublisher, ApplicantRecord, AssessmentId, AssessmentRecord,
    AssessmentRepository, Decision, DecisionEngine, EmploymentStatus, FeatureContribution,
    HomeOwnership, PredictiveAssessment, PredictiveScorer, RepositoryError, RiskAppetite,
    ScorerError, UnderwriterAlert, UnderwritingService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

pub(crate) type DemoUnderwritingService =
    UnderwritingService<ReferenceScorer, InMemoryAssessmentRepository, InMemoryAlertPublisher>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) engine: Arc<DecisionEngine>,
    pub(crate) default_appetite: RiskAppetite,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().map_err(|_| poisoned())?;
        if guard.contains_key(&record.assessment_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.assessment_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().map_err(|_| poisoned())?;
        Ok(guard.get(id).cloned())
    }

    fn pending_review(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().map_err(|_| poisoned())?;
        let mut pending: Vec<AssessmentRecord> = guard
            .values()
            .filter(|record| record.verdict.decision == Decision::Review)
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.assessed_at.cmp(&b.assessed_at));
        pending.truncate(limit);
        Ok(pending)
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("repository mutex poisoned".to_string())
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAlertPublisher {
    events: Arc<Mutex<Vec<UnderwriterAlert>>>,
}

impl AlertPublisher for InMemoryAlertPublisher {
    fn publish(&self, alert: UnderwriterAlert) -> Result<(), AlertError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| AlertError::Transport("alert mutex poisoned".to_string()))?;
        guard.push(alert);
        Ok(())
    }
}

impl InMemoryAlertPublisher {
    pub(crate) fn events(&self) -> Vec<UnderwriterAlert> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// Fixed-coefficient logistic scorer standing in for the production model.
///
/// Coefficients are illustrative only; they were never fitted to data.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ReferenceScorer;

const INTERCEPT: f64 = -1.2;
const TOP_FACTOR_COUNT: usize = 3;

impl ReferenceScorer {
    fn contributions(record: &ApplicantRecord) -> Vec<FeatureContribution> {
        let employment = match record.employment_status {
            EmploymentStatus::FullTime => -0.2,
            EmploymentStatus::PartTime => 0.3,
            EmploymentStatus::SelfEmployed => 0.2,
            EmploymentStatus::Retired => 0.0,
            EmploymentStatus::Unemployed => 0.9,
        };
        let home = match record.home_ownership {
            HomeOwnership::Own => -0.2,
            HomeOwnership::Mortgage => -0.1,
            HomeOwnership::Rent => 0.15,
            HomeOwnership::Other => 0.0,
        };

        [
            ("interest_rate", 0.11 * (record.interest_rate - 12.0)),
            ("debt_to_income", 2.4 * (record.debt_to_income() - 0.30)),
            ("prior_defaults", 0.65 * f64::from(record.prior_defaults)),
            (
                "credit_history_years",
                -0.06 * (record.credit_history_years - 5.0),
            ),
            (
                "annual_income",
                -0.5 * (record.annual_income / 60_000.0).ln(),
            ),
            ("employment_status", employment),
            ("home_ownership", home),
        ]
        .into_iter()
        .map(|(feature, contribution)| FeatureContribution {
            feature: feature.to_string(),
            contribution,
        })
        .collect()
    }
}

impl PredictiveScorer for ReferenceScorer {
    fn predict(&self, record: &ApplicantRecord) -> Result<PredictiveAssessment, ScorerError> {
        let mut factors = Self::contributions(record);
        let logit = INTERCEPT + factors.iter().map(|f| f.contribution).sum::<f64>();
        let probability = 1.0 / (1.0 + (-logit).exp());
        if !probability.is_finite() {
            return Err(ScorerError::InvalidOutput(format!(
                "logit {logit} produced a non-finite probability"
            )));
        }

        factors.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
        factors.truncate(TOP_FACTOR_COUNT);

        Ok(PredictiveAssessment {
            probability,
            top_factors: factors,
        })
    }
}

pub(crate) fn build_service(
    engine: Arc<DecisionEngine>,
) -> (DemoUnderwritingService, InMemoryAlertPublisher) {
    let alerts = InMemoryAlertPublisher::default();
    let service = UnderwritingService::with_engine(
        engine,
        Arc::new(ReferenceScorer),
        Arc::new(InMemoryAssessmentRepository::default()),
        Arc::new(alerts.clone()),
    );
    (service, alerts)
}
