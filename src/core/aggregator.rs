//! Approval Aggregator
//! Reduces scored approvals into summary counts

use crate::models::config::ApprovalPolicy;
use crate::models::types::{ApprovalRisk, ApprovalStats, RiskLevel};

/// Tally approvals by risk level and count unlimited ones.
///
/// "Unlimited" is re-derived from each allowance, not read off the risk
/// level: an unlimited approval with low exposure is `medium` but still
/// counts as unlimited.
pub fn get_approval_stats(approvals: &[ApprovalRisk]) -> ApprovalStats {
    ApprovalPolicy::default().stats(approvals)
}

impl ApprovalPolicy {
    /// `get_approval_stats` under this policy's tolerance
    pub fn stats(&self, approvals: &[ApprovalRisk]) -> ApprovalStats {
        approvals
            .iter()
            .map(|risk| self.tally_one(risk))
            .fold(ApprovalStats::default(), ApprovalStats::merge)
    }

    fn tally_one(&self, risk: &ApprovalRisk) -> ApprovalStats {
        let mut stats = ApprovalStats {
            total: 1,
            unlimited: u64::from(self.is_unlimited(risk.approval.allowance)),
            ..Default::default()
        };
        match risk.risk_level {
            RiskLevel::Low => stats.low = 1,
            RiskLevel::Medium => stats.medium = 1,
            RiskLevel::High => stats.high = 1,
        }
        stats
    }
}
