use super::domain::{ApplicantRecord, PredictiveAssessment};

/// External model producing a default probability and its top contributing factors.
pub trait PredictiveScorer: Send + Sync {
    fn predict(&self, record: &ApplicantRecord) -> Result<PredictiveAssessment, ScorerError>;
}

/// Failure reported by a predictive scorer adapter.
#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    #[error("predictive scorer unavailable: {0}")]
    Unavailable(String),
    #[error("predictive scorer returned an invalid assessment: {0}")]
    InvalidOutput(String),
}
