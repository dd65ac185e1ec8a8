//! Configuration module for Allowance Sentinel
//!
//! Policies start from `utils::constants` and can be overridden from the
//! environment. They are plain values passed into the engine; there is no
//! global configuration state.

use alloy_primitives::U256;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{Grade, RiskCategory, Severity};
use crate::utils::constants::*;

// ============================================
// Approval policy
// ============================================

/// Thresholds used to classify single approvals
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalPolicy {
    /// Allowances within this distance of 2^256-1 count as unlimited
    pub unlimited_tolerance: U256,
    /// Exposure at or above which an unlimited approval is high risk
    pub high_value_threshold_usd: f64,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            unlimited_tolerance: U256::from(UNLIMITED_TOLERANCE),
            high_value_threshold_usd: HIGH_VALUE_THRESHOLD_USD,
        }
    }
}

impl ApprovalPolicy {
    /// Smallest allowance classified as unlimited
    pub fn unlimited_floor(&self) -> U256 {
        MAX_UINT256.saturating_sub(self.unlimited_tolerance)
    }

    pub fn validate(&self) -> AppResult<()> {
        if !self.high_value_threshold_usd.is_finite() || self.high_value_threshold_usd < 0.0 {
            return Err(AppError::invalid_config(format!(
                "high_value_threshold_usd must be a non-negative number, got {}",
                self.high_value_threshold_usd
            )));
        }
        Ok(())
    }

    /// Apply `SENTINEL_HIGH_VALUE_USD` / `SENTINEL_UNLIMITED_TOLERANCE`
    pub fn from_env() -> AppResult<Self> {
        let mut policy = Self::default();

        if let Some(raw) = env_var(ENV_HIGH_VALUE_USD) {
            policy.high_value_threshold_usd = parse_env(ENV_HIGH_VALUE_USD, &raw)?;
            info!(threshold = policy.high_value_threshold_usd, "High-value threshold overridden");
        }
        if let Some(raw) = env_var(ENV_UNLIMITED_TOLERANCE) {
            let tolerance: u64 = parse_env(ENV_UNLIMITED_TOLERANCE, &raw)?;
            policy.unlimited_tolerance = U256::from(tolerance);
            info!(tolerance, "Unlimited tolerance overridden");
        }

        policy.validate()?;
        Ok(policy)
    }
}

// ============================================
// Trust policy
// ============================================

/// Penalty multipliers per detector severity
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityMultipliers {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for SeverityMultipliers {
    fn default() -> Self {
        Self {
            low: SEVERITY_MULTIPLIER_LOW,
            medium: SEVERITY_MULTIPLIER_MEDIUM,
            high: SEVERITY_MULTIPLIER_HIGH,
        }
    }
}

impl SeverityMultipliers {
    pub fn for_severity(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
        }
    }
}

/// Penalty weight per detector category.
/// Known categories have explicit weights; anything else gets `default`.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWeights {
    pub approvals: f64,
    pub honeypot: f64,
    pub hidden_mint: f64,
    pub reputation: f64,
    pub mixer: f64,
    pub age: f64,
    pub liquidity: f64,
    pub taxes: f64,
    pub contract: f64,
    pub other: f64,
    pub default: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            approvals: CATEGORY_WEIGHT_APPROVALS,
            honeypot: CATEGORY_WEIGHT_HONEYPOT,
            hidden_mint: CATEGORY_WEIGHT_HIDDEN_MINT,
            reputation: CATEGORY_WEIGHT_REPUTATION,
            mixer: CATEGORY_WEIGHT_MIXER,
            age: CATEGORY_WEIGHT_AGE,
            liquidity: CATEGORY_WEIGHT_LIQUIDITY,
            taxes: CATEGORY_WEIGHT_TAXES,
            contract: CATEGORY_WEIGHT_CONTRACT,
            other: CATEGORY_WEIGHT_OTHER,
            default: DEFAULT_CATEGORY_WEIGHT,
        }
    }
}

impl CategoryWeights {
    pub fn weight(&self, category: &RiskCategory) -> f64 {
        match category {
            RiskCategory::Approvals => self.approvals,
            RiskCategory::Honeypot => self.honeypot,
            RiskCategory::HiddenMint => self.hidden_mint,
            RiskCategory::Reputation => self.reputation,
            RiskCategory::Mixer => self.mixer,
            RiskCategory::Age => self.age,
            RiskCategory::Liquidity => self.liquidity,
            RiskCategory::Taxes => self.taxes,
            RiskCategory::Contract => self.contract,
            RiskCategory::Other => self.other,
            RiskCategory::Unknown(_) => self.default,
        }
    }

    fn all(&self) -> [(&'static str, f64); 11] {
        [
            ("approvals", self.approvals),
            ("honeypot", self.honeypot),
            ("hidden_mint", self.hidden_mint),
            ("reputation", self.reputation),
            ("mixer", self.mixer),
            ("age", self.age),
            ("liquidity", self.liquidity),
            ("taxes", self.taxes),
            ("contract", self.contract),
            ("other", self.other),
            ("default", self.default),
        ]
    }
}

/// Minimum score (inclusive) for a grade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeBand {
    pub min_score: u8,
    pub grade: Grade,
}

/// Status tone cut points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneBands {
    pub trusted_min: u8,
    pub warning_min: u8,
}

impl Default for ToneBands {
    fn default() -> Self {
        Self {
            trusted_min: TONE_TRUSTED_MIN,
            warning_min: TONE_WARNING_MIN,
        }
    }
}

/// Everything the trust score composer needs
#[derive(Debug, Clone, PartialEq)]
pub struct TrustPolicy {
    pub baseline: f64,
    pub severity: SeverityMultipliers,
    pub categories: CategoryWeights,
    /// Highest band first; scores below every band grade `F`
    pub grade_bands: Vec<GradeBand>,
    pub tones: ToneBands,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            baseline: TRUST_SCORE_BASELINE,
            severity: SeverityMultipliers::default(),
            categories: CategoryWeights::default(),
            grade_bands: vec![
                GradeBand { min_score: GRADE_A_MIN, grade: Grade::A },
                GradeBand { min_score: GRADE_B_MIN, grade: Grade::B },
                GradeBand { min_score: GRADE_C_MIN, grade: Grade::C },
                GradeBand { min_score: GRADE_D_MIN, grade: Grade::D },
            ],
            tones: ToneBands::default(),
        }
    }
}

impl TrustPolicy {
    pub fn validate(&self) -> AppResult<()> {
        if !(TRUST_SCORE_MIN..=TRUST_SCORE_MAX).contains(&self.baseline) {
            return Err(AppError::invalid_config(format!(
                "baseline must be within [0, 100], got {}",
                self.baseline
            )));
        }

        let severities = [
            ("low", self.severity.low),
            ("medium", self.severity.medium),
            ("high", self.severity.high),
        ];
        for (name, value) in severities.into_iter().chain(self.categories.all()) {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::invalid_config(format!(
                    "weight {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !(self.severity.low <= self.severity.medium && self.severity.medium <= self.severity.high) {
            return Err(AppError::invalid_config(
                "severity multipliers must not decrease from low to high",
            ));
        }

        let mut previous: Option<u8> = None;
        for band in &self.grade_bands {
            if band.min_score > 100 {
                return Err(AppError::invalid_config(format!(
                    "grade {} cut point {} exceeds 100",
                    band.grade, band.min_score
                )));
            }
            if let Some(prev) = previous {
                if band.min_score >= prev {
                    return Err(AppError::invalid_config(
                        "grade bands must be strictly descending",
                    ));
                }
            }
            previous = Some(band.min_score);
        }

        if self.tones.trusted_min <= self.tones.warning_min || self.tones.trusted_min > 100 {
            return Err(AppError::invalid_config(format!(
                "tone bands invalid: trusted_min {} must exceed warning_min {} and be <= 100",
                self.tones.trusted_min, self.tones.warning_min
            )));
        }

        Ok(())
    }
}

// ============================================
// Engine / API configuration
// ============================================

/// Both policies, as handed to the API and CLI
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub approval: ApprovalPolicy,
    pub trust: TrustPolicy,
}

impl EngineConfig {
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            approval: ApprovalPolicy::from_env()?,
            trust: TrustPolicy::default(),
        };
        config.trust.validate()?;
        Ok(config)
    }
}

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    /// Window duration
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: RATE_LIMIT_REQUESTS_PER_WINDOW,
            window_duration: Duration::from_secs(RATE_LIMIT_WINDOW_SECS),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit: RateLimitConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_API_PORT,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Hosting platforms set `PORT`; `SENTINEL_PORT` is for local runs
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(host) = env_var(ENV_HOST) {
            config.host = host;
        }
        if let Some(raw) = env_var("PORT").or_else(|| env_var(ENV_PORT)) {
            config.port = parse_env("PORT", &raw)?;
        }

        Ok(config)
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: FromStr>(key: &str, raw: &str) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| AppError::invalid_config(format!("{}={:?}: {}", key, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies_are_valid() {
        ApprovalPolicy::default().validate().unwrap();
        TrustPolicy::default().validate().unwrap();
    }

    #[test]
    fn test_unlimited_floor() {
        let policy = ApprovalPolicy::default();
        assert_eq!(policy.unlimited_floor(), U256::MAX - U256::from(1u64));

        let all = ApprovalPolicy { unlimited_tolerance: U256::MAX, ..Default::default() };
        assert_eq!(all.unlimited_floor(), U256::ZERO);
    }

    #[test]
    fn test_unknown_category_uses_default_weight() {
        let weights = CategoryWeights { default: 0.7, ..Default::default() };
        assert_eq!(weights.weight(&RiskCategory::Unknown("Bridge".into())), 0.7);
        assert_eq!(weights.weight(&RiskCategory::Honeypot), CATEGORY_WEIGHT_HONEYPOT);
    }

    #[test]
    fn test_rejects_non_descending_grade_bands() {
        let mut policy = TrustPolicy::default();
        policy.grade_bands[1].min_score = 95;
        let err = policy.validate().unwrap_err();
        assert_eq!(err.code_str(), "CFG_INVALID_VALUE");
    }

    #[test]
    fn test_rejects_negative_weight_and_bad_threshold() {
        let mut policy = TrustPolicy::default();
        policy.categories.mixer = -1.0;
        assert!(policy.validate().is_err());

        let approval = ApprovalPolicy { high_value_threshold_usd: f64::NAN, ..Default::default() };
        assert!(approval.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_tones() {
        let policy = TrustPolicy {
            tones: ToneBands { trusted_min: 40, warning_min: 60 },
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }
}
