//! Approval Risk Engine
//!
//! Classifies a single approval as low / medium / high from two inputs:
//! whether the allowance is unlimited, and the USD exposure if known.
//!
//! - limited allowance                          -> low
//! - unlimited, exposure unknown or < threshold -> medium
//! - unlimited, exposure >= threshold           -> high

use tracing::debug;

use crate::models::config::ApprovalPolicy;
use crate::models::types::{Approval, ApprovalRisk, PricedApproval, RiskLevel};

/// Score one approval with the default policy ($10,000 threshold, K = 1)
pub fn calculate_approval_risk(approval: &Approval, value_usd: Option<f64>) -> ApprovalRisk {
    ApprovalPolicy::default().assess(approval, value_usd)
}

/// Score a batch of priced approvals. Items are independent; order is kept.
pub fn score_approvals(policy: &ApprovalPolicy, approvals: &[PricedApproval]) -> Vec<ApprovalRisk> {
    approvals
        .iter()
        .map(|p| policy.assess(&p.approval, p.value_usd))
        .collect()
}

impl ApprovalPolicy {
    /// Classify `approval` under this policy. Total: never fails.
    pub fn assess(&self, approval: &Approval, value_usd: Option<f64>) -> ApprovalRisk {
        let (risk_level, reason) = self.classify(approval, value_usd);

        debug!(
            token = %approval.token,
            spender = %approval.spender,
            level = %risk_level,
            "Approval scored"
        );

        ApprovalRisk {
            approval: approval.clone(),
            risk_level,
            reason,
        }
    }

    fn classify(&self, approval: &Approval, value_usd: Option<f64>) -> (RiskLevel, String) {
        if !self.is_unlimited(approval.allowance) {
            return (RiskLevel::Low, "Limited allowance".to_string());
        }

        // NaN never compares >= threshold, so it lands with "unknown"
        match value_usd.filter(|v| !v.is_nan()) {
            Some(v) if v >= self.high_value_threshold_usd => (
                RiskLevel::High,
                format!(
                    "Unlimited allowance with high exposure (${:.2} >= ${:.2})",
                    v, self.high_value_threshold_usd
                ),
            ),
            Some(v) => (
                RiskLevel::Medium,
                format!(
                    "Unlimited allowance, exposure ${:.2} below ${:.2}",
                    v, self.high_value_threshold_usd
                ),
            ),
            None => (
                RiskLevel::Medium,
                "Unlimited allowance, exposure unknown".to_string(),
            ),
        }
    }
}
