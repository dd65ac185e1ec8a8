//! Constants Module - Single Source of Truth
//!
//! Every threshold, weight and band used by the scoring engine is defined
//! here. Policies in `models::config` start from these values; nothing else
//! in the crate hardcodes a scoring number.

use alloy_primitives::U256;

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "AllowanceSentinel";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// ALLOWANCE CLASSIFICATION
// ============================================

/// Largest ERC-20 allowance (2^256 - 1)
pub const MAX_UINT256: U256 = U256::MAX;

/// Distance below `MAX_UINT256` still treated as unlimited.
/// Covers the literal maximum and the `MAX - 1` some wallets approve.
pub const UNLIMITED_TOLERANCE: u64 = 1;

/// Largest decimals for which 10^decimals fits in 256 bits
pub const MAX_TOKEN_DECIMALS: u8 = 77;

/// Label rendered for unlimited allowances
pub const UNLIMITED_LABEL: &str = "Unlimited";

// ============================================
// APPROVAL RISK
// ============================================

/// Exposure (USD) at which an unlimited approval escalates to high risk
pub const HIGH_VALUE_THRESHOLD_USD: f64 = 10_000.0;

// ============================================
// TRUST SCORE
// ============================================

/// Score before any penalty is applied
pub const TRUST_SCORE_BASELINE: f64 = 100.0;

/// Lower bound of the trust score
pub const TRUST_SCORE_MIN: f64 = 0.0;

/// Upper bound of the trust score
pub const TRUST_SCORE_MAX: f64 = 100.0;

/// Severity multipliers applied to |impact|
pub const SEVERITY_MULTIPLIER_LOW: f64 = 0.5;
pub const SEVERITY_MULTIPLIER_MEDIUM: f64 = 1.0;
pub const SEVERITY_MULTIPLIER_HIGH: f64 = 1.5;

/// Category weights for known detector categories
pub const CATEGORY_WEIGHT_APPROVALS: f64 = 1.0;
pub const CATEGORY_WEIGHT_HONEYPOT: f64 = 1.5;
pub const CATEGORY_WEIGHT_HIDDEN_MINT: f64 = 1.3;
pub const CATEGORY_WEIGHT_REPUTATION: f64 = 0.8;
pub const CATEGORY_WEIGHT_MIXER: f64 = 1.3;
pub const CATEGORY_WEIGHT_AGE: f64 = 0.6;
pub const CATEGORY_WEIGHT_LIQUIDITY: f64 = 1.0;
pub const CATEGORY_WEIGHT_TAXES: f64 = 0.9;
pub const CATEGORY_WEIGHT_CONTRACT: f64 = 1.0;
pub const CATEGORY_WEIGHT_OTHER: f64 = 1.0;

/// Weight for categories this build does not know about
pub const DEFAULT_CATEGORY_WEIGHT: f64 = 1.0;

/// Grade cut points (minimum score, inclusive)
pub const GRADE_A_MIN: u8 = 90;
pub const GRADE_B_MIN: u8 = 80;
pub const GRADE_C_MIN: u8 = 70;
pub const GRADE_D_MIN: u8 = 60;

/// Status tone cut points (minimum score, inclusive)
pub const TONE_TRUSTED_MIN: u8 = 80;
pub const TONE_WARNING_MIN: u8 = 50;

// ============================================
// API LIMITS
// ============================================

/// Maximum approvals accepted in one scoring request
pub const MAX_APPROVALS_PER_REQUEST: usize = 1000;

/// Maximum risk factors accepted in one compose request
pub const MAX_RISK_FACTORS_PER_REQUEST: usize = 500;

/// Default API port
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default rate limit window
pub const RATE_LIMIT_REQUESTS_PER_WINDOW: u32 = 100;
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

// ============================================
// ENVIRONMENT KEYS
// ============================================

pub const ENV_HIGH_VALUE_USD: &str = "SENTINEL_HIGH_VALUE_USD";
pub const ENV_UNLIMITED_TOLERANCE: &str = "SENTINEL_UNLIMITED_TOLERANCE";
pub const ENV_HOST: &str = "SENTINEL_HOST";
pub const ENV_PORT: &str = "SENTINEL_PORT";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bands_descend() {
        assert!(GRADE_A_MIN > GRADE_B_MIN);
        assert!(GRADE_B_MIN > GRADE_C_MIN);
        assert!(GRADE_C_MIN > GRADE_D_MIN);
        assert!(TONE_TRUSTED_MIN > TONE_WARNING_MIN);
    }

    #[test]
    fn test_max_decimals_fits_u256() {
        let ten = U256::from(10u64);
        assert!(ten.checked_pow(U256::from(MAX_TOKEN_DECIMALS)).is_some());
        assert!(ten.checked_pow(U256::from(MAX_TOKEN_DECIMALS + 1)).is_none());
    }
}
