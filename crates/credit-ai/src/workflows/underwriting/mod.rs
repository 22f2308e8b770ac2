//! Loan underwriting: intake, dual assessment, policy overrides, and the service facade.
//!
//! The decision engine itself is pure; the service layers the external predictive scorer,
//! persistence, and underwriter alerts around it.

pub mod domain;
pub mod evaluation;
pub mod import;
pub mod intake;
pub mod repository;
pub mod router;
pub mod scorer;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantRecord, AssessmentId, ConfigurationError, Decision, EmploymentStatus,
    FeatureContribution, Grade, HomeOwnership, LoanPurpose, PredictiveAssessment, RiskAppetite,
    ValidationError,
};
pub use evaluation::{
    detect_conflict, AssessmentError, DecisionEngine, EngineConfig, OverrideBounds, OverrideRule,
    PolicyOverride, PolicyOverrideEngine, ThresholdTable, TraditionalAssessment,
    TraditionalScorer, Verdict,
};
pub use import::{ApplicationCsvImporter, ApplicationImportError, ImportedApplication};
pub use intake::ApplicationForm;
pub use repository::{
    AlertError, AlertPublisher, AssessmentRecord, AssessmentRepository, AssessmentStatusView,
    RepositoryError, UnderwriterAlert,
};
pub use router::underwriting_router;
pub use scorer::{PredictiveScorer, ScorerError};
pub use service::{UnderwritingService, UnderwritingServiceError};
