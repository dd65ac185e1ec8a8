//! Scan assembly
//!
//! Turns one scan invocation's inputs into the immutable `Scan` record the
//! persistence collaborator stores. Nothing here writes anywhere.

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::models::config::EngineConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    parse_address, ApprovalStats, Grade, PricedApproval, RawPricedApproval, RiskFactor, Scan,
    ScanMeta, ScanTotals, ScanType, StatusTone,
};
use crate::core::approval_risk::score_approvals;
use crate::utils::time::format_elapsed;

/// Everything the orchestrator gathered for one scan
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawScanInput")]
pub struct ScanInput {
    pub target_address: Address,
    pub scan_type: ScanType,
    pub chains: Vec<String>,
    pub risk_factors: Vec<RiskFactor>,
    pub approvals: Vec<PricedApproval>,
}

/// Scan document as decoded from JSON, before address and allowance checks
#[derive(Debug, Clone, Deserialize)]
pub struct RawScanInput {
    pub target_address: String,
    pub scan_type: ScanType,
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<RiskFactor>,
    #[serde(default)]
    pub approvals: Vec<RawPricedApproval>,
}

impl TryFrom<RawScanInput> for ScanInput {
    type Error = AppError;

    fn try_from(raw: RawScanInput) -> AppResult<Self> {
        Ok(ScanInput {
            target_address: parse_address("target", &raw.target_address)?,
            scan_type: raw.scan_type,
            chains: raw.chains,
            risk_factors: raw.risk_factors,
            approvals: raw
                .approvals
                .into_iter()
                .map(PricedApproval::try_from)
                .collect::<AppResult<_>>()?,
        })
    }
}

/// Compose a new scan record stamped at `now`
pub fn assemble_scan(config: &EngineConfig, input: ScanInput, now: DateTime<Utc>) -> Scan {
    let composed = config.trust.compose(&input.risk_factors);

    let approvals = if input.approvals.is_empty() {
        ApprovalStats::default()
    } else {
        config.approval.stats(&score_approvals(&config.approval, &input.approvals))
    };

    let scan = Scan {
        id: Uuid::new_v4(),
        target_address: input.target_address,
        scan_type: input.scan_type,
        trust_score: composed.trust_score,
        grade: composed.grade,
        meta: ScanMeta {
            chains: input.chains,
            last_scan_at: now,
            totals: ScanTotals {
                risk_factors: input.risk_factors.len() as u64,
                approvals,
            },
        },
        risk_factors: input.risk_factors,
        created_at: now,
    };

    info!(
        scan_id = %scan.id,
        target = %scan.target_address,
        score = scan.trust_score,
        grade = %scan.grade,
        "Scan composed"
    );

    scan
}

/// Most recent scan by creation time
pub fn latest_scan(scans: &[Scan]) -> Option<&Scan> {
    scans.iter().max_by_key(|scan| scan.created_at)
}

/// Presentation view of a scan: score, grade, tone and freshness
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub id: Uuid,
    pub target_address: Address,
    pub trust_score: u8,
    pub grade: Grade,
    pub tone: StatusTone,
    pub last_scanned: String,
}

impl Scan {
    pub fn summary(&self, config: &EngineConfig, now: DateTime<Utc>) -> ScanSummary {
        ScanSummary {
            id: self.id,
            target_address: self.target_address,
            trust_score: self.trust_score,
            grade: self.grade,
            tone: config.trust.tone(self.trust_score),
            last_scanned: format_elapsed(self.meta.last_scan_at, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{Approval, RiskCategory, Severity};
    use alloy_primitives::U256;
    use chrono::Duration;

    fn input() -> ScanInput {
        ScanInput {
            target_address: Address::repeat_byte(0x42),
            scan_type: ScanType::Wallet,
            chains: vec!["ethereum".into(), "base".into()],
            risk_factors: vec![RiskFactor::new(
                RiskCategory::Mixer,
                Severity::High,
                20.0,
                "Funds received from mixer",
            )],
            approvals: vec![
                PricedApproval {
                    approval: Approval {
                        token: Address::repeat_byte(1),
                        spender: Address::repeat_byte(2),
                        allowance: U256::MAX,
                        symbol: "USDC".into(),
                        decimals: 6,
                    },
                    value_usd: Some(12_000.0),
                },
                PricedApproval {
                    approval: Approval {
                        token: Address::repeat_byte(3),
                        spender: Address::repeat_byte(2),
                        allowance: U256::from(10u64),
                        symbol: "WETH".into(),
                        decimals: 18,
                    },
                    value_usd: None,
                },
            ],
        }
    }

    #[test]
    fn test_assemble_scan() {
        let now = Utc::now();
        let scan = assemble_scan(&EngineConfig::default(), input(), now);

        // 20 * 1.5 (high) * 1.3 (mixer) = 39
        assert_eq!(scan.trust_score, 61);
        assert_eq!(scan.grade, Grade::D);
        assert_eq!(scan.created_at, now);
        assert_eq!(scan.meta.last_scan_at, now);
        assert_eq!(scan.meta.chains.len(), 2);
        assert_eq!(scan.meta.totals.risk_factors, 1);
        assert_eq!(
            scan.meta.totals.approvals,
            ApprovalStats { total: 2, unlimited: 1, high: 1, medium: 0, low: 1 }
        );
    }

    #[test]
    fn test_scans_get_distinct_ids() {
        let now = Utc::now();
        let a = assemble_scan(&EngineConfig::default(), input(), now);
        let b = assemble_scan(&EngineConfig::default(), input(), now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_scan_document_validation() {
        let json = r#"{"target_address":"0xdead","scan_type":"wallet"}"#;
        let err = serde_json::from_str::<ScanInput>(json).unwrap_err();
        assert!(err.to_string().contains("ADDRESS_INVALID"), "{}", err);

        let raw: RawScanInput = serde_json::from_str(
            r#"{"target_address":"0x000000000000000000000000000000000000dead","scan_type":"contract"}"#,
        )
        .unwrap();
        let input = ScanInput::try_from(raw).unwrap();
        assert_eq!(input.scan_type, ScanType::Contract);
        assert!(input.approvals.is_empty() && input.chains.is_empty());
    }

    #[test]
    fn test_latest_scan_by_created_at() {
        let config = EngineConfig::default();
        let t0 = Utc::now();
        let older = assemble_scan(&config, input(), t0 - Duration::hours(5));
        let newest = assemble_scan(&config, input(), t0);
        let middle = assemble_scan(&config, input(), t0 - Duration::hours(1));

        let scans = vec![older, newest.clone(), middle];
        assert_eq!(latest_scan(&scans).map(|s| s.id), Some(newest.id));
        assert!(latest_scan(&[]).is_none());
    }

    #[test]
    fn test_summary() {
        let config = EngineConfig::default();
        let t0 = Utc::now();
        let scan = assemble_scan(&config, input(), t0 - Duration::hours(3));
        let summary = scan.summary(&config, t0);
        assert_eq!(summary.tone, StatusTone::Warning);
        assert_eq!(summary.last_scanned, "3h ago");
    }
}
