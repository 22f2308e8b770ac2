use super::super::domain::Decision;

/// Lean implied by the predictive probability alone.
pub fn model_lean(probability: f64, threshold: f64) -> Decision {
    if probability >= threshold {
        Decision::Reject
    } else {
        Decision::Approve
    }
}

/// True when the model lean disagrees with a definite traditional recommendation.
///
/// A traditional `Review` is neutral and never conflicts.
pub fn detect_conflict(probability: f64, recommendation: Decision, threshold: f64) -> bool {
    match recommendation {
        Decision::Review => false,
        definite => model_lean(probability, threshold) != definite,
    }
}

pub(crate) fn conflict_note(probability: f64, recommendation: Decision, threshold: f64) -> String {
    let lean = model_lean(probability, threshold);
    if recommendation == Decision::Review {
        return format!(
            "no conflict: model leans {lean} at probability {probability:.3}; traditional REVIEW is neutral"
        );
    }
    if lean == recommendation {
        format!("no conflict: model and traditional assessment both lean {lean}")
    } else {
        let relation = if lean == Decision::Reject {
            "at or above"
        } else {
            "below"
        };
        format!(
            "conflict: model leans {lean} at probability {probability:.3} {relation} threshold {threshold:.3} while traditional assessment recommends {recommendation}"
        )
    }
}
