//! Allowance Sentinel Library
//!
//! Deterministic rule engine for wallet token approvals and trust scores:
//! - Unlimited-allowance detection over exact 256-bit integers
//! - Human-readable allowance formatting ("5.00K", "2.00M", "Unlimited")
//! - Value-weighted approval risk (low / medium / high) and summary stats
//! - Trust score (0-100), letter grade and status tone from detector findings

pub mod api;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::core::aggregator::get_approval_stats;
pub use crate::core::allowance::{format_allowance, is_unlimited, parse_allowance};
pub use crate::core::approval_risk::{calculate_approval_risk, score_approvals};
pub use crate::core::scan::{assemble_scan, latest_scan, RawScanInput, ScanInput, ScanSummary};
pub use crate::core::trust_score::{compose_trust_score, status_tone, PenaltyModel};
pub use models::config::{ApiConfig, ApprovalPolicy, EngineConfig, TrustPolicy};
pub use models::errors::{AppError, AppResult, ErrorCode};
pub use models::types::{
    Approval, ApprovalRisk, ApprovalStats, Grade, PricedApproval, RiskCategory, RiskFactor,
    RiskLevel, Scan, ScanType, Severity, StatusTone, TrustScore,
};
pub use utils::telemetry::{TelemetryCollector, TelemetryStats};
pub use utils::time::time_ago;
