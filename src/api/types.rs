//! API Request/Response Types

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::core::scan::ScanSummary;
use crate::models::errors::{AppError, ErrorCode};
use crate::models::types::{
    ApprovalRisk, ApprovalStats, Grade, RawPricedApproval, RiskFactor, Scan, StatusTone,
};
use crate::utils::telemetry::TelemetryStats;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message.clone(),
            details: None,
        }
    }
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self {
            code: ErrorCode::ApiUnauthorized.as_str().to_string(),
            message: "Invalid API key".to_string(),
            details: None,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: ErrorCode::ApiRateLimited.as_str().to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }
}

/// Error half of every handler's return type
pub type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

/// Handler result
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiFailure>;

pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Map an `AppError` to its HTTP status and error envelope
pub fn failure(err: AppError, start: Instant) -> ApiFailure {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::error(ApiError::from(&err), elapsed_ms(start))))
}

// ============================================
// Approvals
// ============================================

#[derive(Debug, Deserialize)]
pub struct ScoreApprovalsRequest {
    pub approvals: Vec<RawPricedApproval>,
}

#[derive(Debug, Serialize)]
pub struct ScoredApproval {
    #[serde(flatten)]
    pub risk: ApprovalRisk,
    pub value_usd: Option<f64>,
    pub is_unlimited: bool,
    pub formatted_allowance: String,
}

#[derive(Debug, Serialize)]
pub struct ScoreApprovalsData {
    pub approvals: Vec<ScoredApproval>,
    pub stats: ApprovalStats,
}

#[derive(Debug, Deserialize)]
pub struct FormatAllowanceRequest {
    /// Decimal or `0x` hex string
    pub allowance: String,
    /// Wider than `u8` so out-of-range values reach validation
    pub decimals: u64,
}

#[derive(Debug, Serialize)]
pub struct FormatAllowanceData {
    pub formatted: String,
    pub is_unlimited: bool,
}

// ============================================
// Trust score
// ============================================

#[derive(Debug, Deserialize)]
pub struct ComposeTrustRequest {
    #[serde(default)]
    pub risk_factors: Vec<RiskFactor>,
}

#[derive(Debug, Serialize)]
pub struct ComposeTrustData {
    pub trust_score: u8,
    pub grade: Grade,
    pub tone: StatusTone,
    pub factor_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct TimeAgoRequest {
    pub timestamp: String,
    #[serde(default)]
    pub now: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TimeAgoData {
    pub label: String,
}

// ============================================
// Scans
// ============================================

#[derive(Debug, Serialize)]
pub struct ScanData {
    pub scan: Scan,
    pub summary: ScanSummary,
}

// ============================================
// Stats / Health
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub telemetry: TelemetryStats,
    pub uptime_seconds: u64,
    pub api_version: String,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
