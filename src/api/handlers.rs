//! API Request Handlers
//!
//! Handlers only decode, call the pure engine and encode. No I/O beyond
//! the HTTP exchange itself.

use axum::{
    async_trait,
    extract::{FromRequest, Json, Request, State},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::middleware::RateLimiter;
use super::types::*;
use crate::core::allowance::{format_allowance_with, parse_allowance};
use crate::core::scan::{assemble_scan, RawScanInput, ScanInput};
use crate::models::config::{ApiConfig, EngineConfig};
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::PricedApproval;
use crate::utils::constants::{
    MAX_APPROVALS_PER_REQUEST, MAX_RISK_FACTORS_PER_REQUEST, MAX_TOKEN_DECIMALS,
};
use crate::utils::telemetry::TelemetryCollector;
use crate::utils::time::time_ago;

/// Shared application state
pub struct AppState {
    pub engine: EngineConfig,
    pub telemetry: Arc<TelemetryCollector>,
    pub rate_limiter: Arc<RateLimiter>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: EngineConfig, api: &ApiConfig, telemetry: Arc<TelemetryCollector>) -> Self {
        Self {
            engine,
            telemetry,
            rate_limiter: Arc::new(RateLimiter::new(api.rate_limit.clone())),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ============================================
// JSON extractor
// ============================================

/// `Json<T>` whose rejection uses the API error envelope.
///
/// Only the body's shape is checked here; request types keep addresses and
/// allowances raw so handlers validate them into typed `AppError`s.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiFailure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let start = Instant::now();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                warn!(%message, "Rejected request body");
                Err(failure(AppError::bad_request(message), start))
            }
        }
    }
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Approvals
// ============================================

pub async fn score_approvals(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ScoreApprovalsRequest>,
) -> ApiResult<ScoreApprovalsData> {
    let start = Instant::now();

    if req.approvals.len() > MAX_APPROVALS_PER_REQUEST {
        return Err(failure(
            AppError::new(
                ErrorCode::ApiPayloadTooLarge,
                format!("Maximum {} approvals per request", MAX_APPROVALS_PER_REQUEST),
            ),
            start,
        ));
    }

    let policy = &state.engine.approval;
    let priced: Vec<PricedApproval> = req
        .approvals
        .into_iter()
        .map(PricedApproval::try_from)
        .collect::<AppResult<_>>()
        .map_err(|e| failure(e, start))?;

    let mut approvals = Vec::with_capacity(priced.len());
    for priced in priced {
        let formatted_allowance =
            format_allowance_with(policy, priced.approval.allowance, priced.approval.decimals)
                .map_err(|e| failure(e, start))?;
        let is_unlimited = policy.is_unlimited(priced.approval.allowance);
        let risk = policy.assess(&priced.approval, priced.value_usd);

        approvals.push(ScoredApproval {
            risk,
            value_usd: priced.value_usd,
            is_unlimited,
            formatted_allowance,
        });
    }

    let risks: Vec<_> = approvals.iter().map(|a| a.risk.clone()).collect();
    let stats = policy.stats(&risks);
    state.telemetry.record_approvals(&stats);

    info!(
        total = stats.total,
        unlimited = stats.unlimited,
        high = stats.high,
        "Scored approvals"
    );

    Ok(Json(ApiResponse::success(
        ScoreApprovalsData { approvals, stats },
        elapsed_ms(start),
    )))
}

pub async fn format_allowance(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<FormatAllowanceRequest>,
) -> ApiResult<FormatAllowanceData> {
    let start = Instant::now();
    let policy = &state.engine.approval;

    let raw = parse_allowance(&req.allowance).map_err(|e| failure(e, start))?;
    let is_unlimited = policy.is_unlimited(raw);

    // Same bound as approval decoding; 78..=255 only matters for limited amounts
    let decimals = u8::try_from(req.decimals).map_err(|_| {
        failure(AppError::invalid_decimals(req.decimals, MAX_TOKEN_DECIMALS), start)
    })?;

    let formatted = format_allowance_with(policy, raw, decimals).map_err(|e| failure(e, start))?;

    Ok(Json(ApiResponse::success(
        FormatAllowanceData { formatted, is_unlimited },
        elapsed_ms(start),
    )))
}

// ============================================
// Trust score
// ============================================

pub async fn compose_trust(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ComposeTrustRequest>,
) -> ApiResult<ComposeTrustData> {
    let start = Instant::now();

    if req.risk_factors.len() > MAX_RISK_FACTORS_PER_REQUEST {
        return Err(failure(
            AppError::new(
                ErrorCode::ApiPayloadTooLarge,
                format!("Maximum {} risk factors per request", MAX_RISK_FACTORS_PER_REQUEST),
            ),
            start,
        ));
    }

    let trust = &state.engine.trust;
    let composed = trust.compose(&req.risk_factors);
    state.telemetry.record_trust_score(composed.grade);

    Ok(Json(ApiResponse::success(
        ComposeTrustData {
            trust_score: composed.trust_score,
            grade: composed.grade,
            tone: trust.tone(composed.trust_score),
            factor_count: req.risk_factors.len(),
        },
        elapsed_ms(start),
    )))
}

pub async fn get_time_ago(ApiJson(req): ApiJson<TimeAgoRequest>) -> ApiResult<TimeAgoData> {
    let start = Instant::now();
    let label = time_ago(&req.timestamp, req.now.as_deref()).map_err(|e| failure(e, start))?;
    Ok(Json(ApiResponse::success(TimeAgoData { label }, elapsed_ms(start))))
}

// ============================================
// Scans
// ============================================

pub async fn create_scan(
    State(state): State<Arc<AppState>>,
    ApiJson(raw): ApiJson<RawScanInput>,
) -> Result<(StatusCode, Json<ApiResponse<ScanData>>), ApiFailure> {
    let start = Instant::now();

    if raw.approvals.len() > MAX_APPROVALS_PER_REQUEST
        || raw.risk_factors.len() > MAX_RISK_FACTORS_PER_REQUEST
    {
        return Err(failure(
            AppError::new(ErrorCode::ApiPayloadTooLarge, "Scan input exceeds request limits"),
            start,
        ));
    }

    let input = ScanInput::try_from(raw).map_err(|e| failure(e, start))?;

    // Reject approvals the formatter would refuse, same as /approvals/score
    for priced in &input.approvals {
        format_allowance_with(
            &state.engine.approval,
            priced.approval.allowance,
            priced.approval.decimals,
        )
        .map_err(|e| failure(e, start))?;
    }

    let now = chrono::Utc::now();
    let scan = assemble_scan(&state.engine, input, now);
    let summary = scan.summary(&state.engine, now);
    state.telemetry.record_scan(scan.grade);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ScanData { scan, summary }, elapsed_ms(start))),
    ))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();

    let data = StatsData {
        telemetry: state.telemetry.get_stats(),
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
