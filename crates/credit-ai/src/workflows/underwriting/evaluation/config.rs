use serde::{Deserialize, Serialize};

use super::super::domain::{ConfigurationError, Grade, RiskAppetite};

/// Sum of the maximum points awarded by every traditional rule.
pub const MAX_SCORE: u8 = 13;

/// Read-only configuration shared by every assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub thresholds: ThresholdTable,
    pub traditional: TraditionalRules,
    pub overrides: OverrideBounds,
    pub grades: GradeBands,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.thresholds.validate()?;
        self.traditional.validate()?;
        self.overrides.validate()?;
        self.grades.validate()
    }
}

/// Decision threshold per risk appetite; strictly increasing in enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    conservative: f64,
    balanced: f64,
    aggressive: f64,
    very_aggressive: f64,
}

impl ThresholdTable {
    pub fn new(
        conservative: f64,
        balanced: f64,
        aggressive: f64,
        very_aggressive: f64,
    ) -> Result<Self, ConfigurationError> {
        let table = Self {
            conservative,
            balanced,
            aggressive,
            very_aggressive,
        };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        let mut previous: Option<(RiskAppetite, f64)> = None;
        for appetite in RiskAppetite::ALL {
            let value = self.select(appetite);
            if !value.is_finite() || value <= 0.0 || value >= 1.0 {
                return Err(ConfigurationError::ThresholdOutOfRange { appetite, value });
            }
            if let Some((lower, lower_value)) = previous {
                if value <= lower_value {
                    return Err(ConfigurationError::NonMonotonicThresholds {
                        lower,
                        lower_value,
                        higher: appetite,
                        higher_value: value,
                    });
                }
            }
            previous = Some((appetite, value));
        }
        Ok(())
    }

    pub fn select(&self, appetite: RiskAppetite) -> f64 {
        match appetite {
            RiskAppetite::Conservative => self.conservative,
            RiskAppetite::Balanced => self.balanced,
            RiskAppetite::Aggressive => self.aggressive,
            RiskAppetite::VeryAggressive => self.very_aggressive,
        }
    }

    pub fn entries(&self) -> Vec<(RiskAppetite, f64)> {
        RiskAppetite::ALL
            .iter()
            .map(|appetite| (*appetite, self.select(*appetite)))
            .collect()
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            conservative: 0.15,
            balanced: 0.25,
            aggressive: 0.35,
            very_aggressive: 0.45,
        }
    }
}

/// Cut-points mapping the traditional score to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraditionalRules {
    /// Scores at or above this recommend approval.
    pub approve_cut: u8,
    /// Scores at or below this recommend rejection.
    pub reject_cut: u8,
}

impl TraditionalRules {
    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.reject_cut >= self.approve_cut || self.approve_cut > MAX_SCORE {
            return Err(ConfigurationError::InvalidCutPoints {
                reject_cut: self.reject_cut,
                approve_cut: self.approve_cut,
            });
        }
        Ok(())
    }
}

impl Default for TraditionalRules {
    fn default() -> Self {
        Self {
            approve_cut: 9,
            reject_cut: 4,
        }
    }
}

/// Triggering bounds for the hard policy overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverrideBounds {
    pub extreme_risk_probability: f64,
    pub weak_score_floor: u8,
    pub max_prior_defaults: u16,
    pub probability_ceiling: f64,
    pub strong_profile_max_probability: f64,
    pub strong_profile_min_score: u8,
    pub seasoned_max_probability: f64,
    pub seasoned_min_history_years: f64,
    pub seasoned_max_debt_to_income: f64,
}

impl OverrideBounds {
    fn validate(&self) -> Result<(), ConfigurationError> {
        let probabilities = [
            ("extreme_risk_probability", self.extreme_risk_probability),
            ("probability_ceiling", self.probability_ceiling),
            (
                "strong_profile_max_probability",
                self.strong_profile_max_probability,
            ),
            ("seasoned_max_probability", self.seasoned_max_probability),
        ];
        for (name, value) in probabilities {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::InvalidOverrideBound { name, value });
            }
        }

        if !self.seasoned_min_history_years.is_finite() || self.seasoned_min_history_years < 0.0 {
            return Err(ConfigurationError::InvalidOverrideBound {
                name: "seasoned_min_history_years",
                value: self.seasoned_min_history_years,
            });
        }
        if !self.seasoned_max_debt_to_income.is_finite() || self.seasoned_max_debt_to_income <= 0.0
        {
            return Err(ConfigurationError::InvalidOverrideBound {
                name: "seasoned_max_debt_to_income",
                value: self.seasoned_max_debt_to_income,
            });
        }
        if self.weak_score_floor > MAX_SCORE {
            return Err(ConfigurationError::InvalidOverrideBound {
                name: "weak_score_floor",
                value: f64::from(self.weak_score_floor),
            });
        }
        if self.strong_profile_min_score > MAX_SCORE {
            return Err(ConfigurationError::InvalidOverrideBound {
                name: "strong_profile_min_score",
                value: f64::from(self.strong_profile_min_score),
            });
        }
        Ok(())
    }
}

impl Default for OverrideBounds {
    fn default() -> Self {
        Self {
            extreme_risk_probability: 0.50,
            weak_score_floor: 5,
            max_prior_defaults: 2,
            probability_ceiling: 0.85,
            strong_profile_max_probability: 0.10,
            strong_profile_min_score: 11,
            seasoned_max_probability: 0.20,
            seasoned_min_history_years: 10.0,
            seasoned_max_debt_to_income: 0.20,
        }
    }
}

/// Exclusive upper bounds of the A-D probability bands; anything above is F.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeBands {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl GradeBands {
    fn validate(&self) -> Result<(), ConfigurationError> {
        let bounds = [self.a, self.b, self.c, self.d];
        let in_range = bounds
            .iter()
            .all(|bound| bound.is_finite() && *bound > 0.0 && *bound <= 1.0);
        let increasing = bounds.windows(2).all(|pair| pair[0] < pair[1]);
        if in_range && increasing {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidGradeBands)
        }
    }

    pub fn grade(&self, probability: f64) -> Grade {
        if probability < self.a {
            Grade::A
        } else if probability < self.b {
            Grade::B
        } else if probability < self.c {
            Grade::C
        } else if probability < self.d {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl Default for GradeBands {
    fn default() -> Self {
        Self {
            a: 0.10,
            b: 0.20,
            c: 0.35,
            d: 0.50,
        }
    }
}
