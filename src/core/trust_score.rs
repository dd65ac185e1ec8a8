//! Trust Score Module
//! Composes detector risk factors into a 0-100 trust score and letter grade
//!
//! Starts from a baseline of 100 and subtracts one penalty per factor:
//!
//!   penalty = |impact| * severity_multiplier * category_weight
//!
//! The running total is clamped to [0, 100] after every factor.
//! - A: 90-100, B: 80-89, C: 70-79, D: 60-69, F: below 60
//! - trusted: 80+, warning: 50-79, danger: below 50

use tracing::{debug, warn};

use crate::models::config::TrustPolicy;
use crate::models::types::{Grade, RiskFactor, StatusTone, TrustScore};
use crate::utils::constants::{TRUST_SCORE_MAX, TRUST_SCORE_MIN};

/// How much a single risk factor lowers the trust score
pub trait PenaltyModel {
    fn penalty(&self, factor: &RiskFactor) -> f64;
}

impl PenaltyModel for TrustPolicy {
    fn penalty(&self, factor: &RiskFactor) -> f64 {
        if !factor.impact.is_finite() {
            warn!(
                category = %factor.category,
                impact = factor.impact,
                "Ignoring risk factor with non-finite impact"
            );
            return 0.0;
        }

        factor.impact.abs()
            * self.severity.for_severity(factor.severity)
            * self.categories.weight(&factor.category)
    }
}

/// Compose with the default policy. An empty list scores 100 / A.
pub fn compose_trust_score(risk_factors: &[RiskFactor]) -> TrustScore {
    TrustPolicy::default().compose(risk_factors)
}

/// Status tone for a score under the default bands
pub fn status_tone(trust_score: u8) -> StatusTone {
    TrustPolicy::default().tone(trust_score)
}

impl TrustPolicy {
    pub fn compose(&self, risk_factors: &[RiskFactor]) -> TrustScore {
        self.compose_with(self, risk_factors)
    }

    /// Compose using an alternative penalty model but this policy's bands
    pub fn compose_with<M: PenaltyModel + ?Sized>(
        &self,
        model: &M,
        risk_factors: &[RiskFactor],
    ) -> TrustScore {
        let clamp = |v: f64| v.clamp(TRUST_SCORE_MIN, TRUST_SCORE_MAX);

        let total = risk_factors
            .iter()
            .fold(clamp(self.baseline), |running, factor| {
                let penalty = model.penalty(factor);
                debug!(
                    category = %factor.category,
                    severity = ?factor.severity,
                    penalty,
                    "Applied risk factor"
                );
                clamp(running - penalty)
            });

        // Clamped to [0, 100] above, so the cast cannot truncate
        let trust_score = total.round() as u8;

        TrustScore {
            trust_score,
            grade: self.grade(trust_score),
        }
    }

    pub fn grade(&self, trust_score: u8) -> Grade {
        self.grade_bands
            .iter()
            .find(|band| trust_score >= band.min_score)
            .map(|band| band.grade)
            .unwrap_or(Grade::F)
    }

    pub fn tone(&self, trust_score: u8) -> StatusTone {
        if trust_score >= self.tones.trusted_min {
            StatusTone::Trusted
        } else if trust_score >= self.tones.warning_min {
            StatusTone::Warning
        } else {
            StatusTone::Danger
        }
    }
}
