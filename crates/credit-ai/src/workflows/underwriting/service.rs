use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    AssessmentId, ConfigurationError, Decision, PredictiveAssessment, RiskAppetite,
};
use super::evaluation::{AssessmentError, DecisionEngine, EngineConfig, Verdict};
use super::intake::ApplicationForm;
use super::repository::{
    AlertError, AlertPublisher, AssessmentRecord, AssessmentRepository, RepositoryError,
    UnderwriterAlert,
};
use super::scorer::{PredictiveScorer, ScorerError};

/// Service composing intake, the predictive scorer, the decision engine, and storage.
pub struct UnderwritingService<S, R, A> {
    scorer: Arc<S>,
    repository: Arc<R>,
    alerts: Arc<A>,
    engine: Arc<DecisionEngine>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asm-{id:06}"))
}

impl<S, R, A> UnderwritingService<S, R, A>
where
    S: PredictiveScorer + 'static,
    R: AssessmentRepository + 'static,
    A: AlertPublisher + 'static,
{
    pub fn new(
        scorer: Arc<S>,
        repository: Arc<R>,
        alerts: Arc<A>,
        config: EngineConfig,
    ) -> Result<Self, ConfigurationError> {
        let engine = Arc::new(DecisionEngine::new(config)?);
        Ok(Self::with_engine(engine, scorer, repository, alerts))
    }

    pub fn with_engine(
        engine: Arc<DecisionEngine>,
        scorer: Arc<S>,
        repository: Arc<R>,
        alerts: Arc<A>,
    ) -> Self {
        Self {
            scorer,
            repository,
            alerts,
            engine,
        }
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Score a new application with the predictive model and persist the verdict.
    pub fn submit(
        &self,
        form: ApplicationForm,
        appetite: &str,
    ) -> Result<AssessmentRecord, UnderwritingServiceError> {
        let appetite = parse_appetite(appetite)?;
        let applicant = form.into_record().map_err(|err| {
            warn!(field = err.field(), "application rejected at intake");
            AssessmentError::from(err)
        })?;

        let predictive = self.scorer.predict(&applicant)?;
        predictive
            .validate()
            .map_err(|err| ScorerError::InvalidOutput(err.to_string()))?;
        let verdict = self.engine.assess(&applicant, appetite, &predictive)?;

        let record = AssessmentRecord {
            assessment_id: next_assessment_id(),
            applicant,
            verdict,
            assessed_at: Utc::now(),
        };
        let stored = self.repository.insert(record)?;

        info!(
            assessment_id = %stored.assessment_id.0,
            decision = %stored.verdict.decision,
            grade = %stored.verdict.grade,
            conflict = stored.verdict.conflict,
            "assessment recorded"
        );

        if stored.verdict.decision == Decision::Review {
            self.alerts.publish(review_alert(&stored))?;
        }

        Ok(stored)
    }

    /// Assess with a caller-supplied predictive output; nothing is persisted.
    pub fn assess_with(
        &self,
        form: ApplicationForm,
        appetite: &str,
        predictive: &PredictiveAssessment,
    ) -> Result<Verdict, UnderwritingServiceError> {
        let appetite = parse_appetite(appetite)?;
        let applicant = form.into_record().map_err(AssessmentError::from)?;
        let verdict = self.engine.assess(&applicant, appetite, predictive)?;
        Ok(verdict)
    }

    /// Fetch a stored assessment for API responses.
    pub fn get(&self, id: &AssessmentId) -> Result<AssessmentRecord, UnderwritingServiceError> {
        let record = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn review_queue(
        &self,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, UnderwritingServiceError> {
        Ok(self.repository.pending_review(limit)?)
    }
}

fn parse_appetite(raw: &str) -> Result<RiskAppetite, AssessmentError> {
    raw.parse::<RiskAppetite>().map_err(AssessmentError::from)
}

fn review_alert(record: &AssessmentRecord) -> UnderwriterAlert {
    let mut details = BTreeMap::new();
    details.insert("grade".to_string(), record.verdict.grade.to_string());
    details.insert(
        "probability".to_string(),
        format!("{:.3}", record.verdict.effective_probability),
    );
    details.insert(
        "traditional_score".to_string(),
        record.verdict.traditional_score.to_string(),
    );
    details.insert("conflict".to_string(), record.verdict.conflict.to_string());
    UnderwriterAlert {
        template: "manual_review_required".to_string(),
        assessment_id: record.assessment_id.clone(),
        details,
    }
}

/// Error raised by the underwriting service.
#[derive(Debug, thiserror::Error)]
pub enum UnderwritingServiceError {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Scorer(#[from] ScorerError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Alert(#[from] AlertError),
}
