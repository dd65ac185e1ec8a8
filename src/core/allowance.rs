//! Allowance classification and formatting
//!
//! All comparisons and scaling run on exact integers. `U256` holds the raw
//! allowance; formatting widens to `U512` so `raw * 200` and
//! `10^decimals * 10^6` never overflow.

use alloy_primitives::{U256, U512};
use tracing::debug;

use crate::models::config::ApprovalPolicy;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{MAX_TOKEN_DECIMALS, UNLIMITED_LABEL, UNLIMITED_TOLERANCE};

const THOUSAND: u64 = 1_000;
const MILLION: u64 = 1_000_000;

/// Parse a raw allowance string (decimal, or hex with `0x` prefix).
///
/// Rejects empty, negative, fractional and non-numeric input with
/// `ALLOWANCE_INVALID`, and anything above 2^256-1 with `ALLOWANCE_OVERFLOW`.
pub fn parse_allowance(raw: &str) -> AppResult<U256> {
    let s = raw.trim();

    if s.is_empty() {
        return Err(AppError::invalid_allowance("Allowance is empty"));
    }
    if s.starts_with('-') {
        return Err(AppError::invalid_allowance(format!(
            "Allowance must be non-negative, got {}",
            s
        )));
    }

    let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (s, 10),
    };

    let well_formed = !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    if !well_formed {
        return Err(AppError::invalid_allowance(format!(
            "Allowance must be an integer, got {:?}",
            s
        )));
    }

    // Digits are validated above, so the only remaining failure is width
    U256::from_str_radix(digits, radix as u64).map_err(|_| AppError::allowance_overflow(s))
}

/// True when `allowance` is at, or within the default tolerance of, 2^256-1
pub fn is_unlimited(allowance: U256) -> bool {
    allowance >= U256::MAX - U256::from(UNLIMITED_TOLERANCE)
}

impl ApprovalPolicy {
    /// `is_unlimited` under this policy's tolerance
    pub fn is_unlimited(&self, allowance: U256) -> bool {
        allowance >= self.unlimited_floor()
    }
}

/// Render a raw allowance as a human-readable amount.
///
/// Unlimited allowances render as `"Unlimited"`. Everything else is scaled by
/// `10^decimals` and shown with two decimals, using `K` from one thousand and
/// `M` from one million (e.g. `"5.00K"`, `"2.00M"`, `"0.10"`).
pub fn format_allowance(raw: U256, decimals: u8) -> AppResult<String> {
    format_allowance_with(&ApprovalPolicy::default(), raw, decimals)
}

/// `format_allowance` under an explicit policy
pub fn format_allowance_with(policy: &ApprovalPolicy, raw: U256, decimals: u8) -> AppResult<String> {
    if policy.is_unlimited(raw) {
        return Ok(UNLIMITED_LABEL.to_string());
    }
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(AppError::invalid_decimals(u64::from(decimals), MAX_TOKEN_DECIMALS));
    }

    let amount = widen(raw);
    let scale = U512::from(10u64).pow(U512::from(decimals));

    let (unit, suffix) = if amount >= scale * U512::from(MILLION) {
        (MILLION, "M")
    } else if amount >= scale * U512::from(THOUSAND) {
        (THOUSAND, "K")
    } else {
        (1, "")
    };

    let hundredths = round_half_up_hundredths(amount, scale * U512::from(unit));
    let whole = hundredths / U512::from(100u64);
    let frac = hundredths % U512::from(100u64);

    let formatted = format!("{}.{:02}{}", whole, frac.as_limbs()[0], suffix);
    debug!(raw = %raw, decimals, formatted = %formatted, "Formatted allowance");
    Ok(formatted)
}

/// `round(amount / divisor, 2)` expressed in hundredths, half rounding up
fn round_half_up_hundredths(amount: U512, divisor: U512) -> U512 {
    let two = U512::from(2u64);
    (amount * U512::from(200u64) + divisor) / (divisor * two)
}

fn widen(value: U256) -> U512 {
    U512::from_be_slice(&value.to_be_bytes::<32>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eth(units: u64) -> U256 {
        U256::from(units) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_max_and_max_minus_one_are_unlimited() {
        assert!(is_unlimited(U256::MAX));
        assert!(is_unlimited(U256::MAX - U256::from(1u64)));
        assert!(!is_unlimited(U256::MAX - U256::from(2u64)));
    }

    #[test]
    fn test_ordinary_amounts_are_limited() {
        assert!(!is_unlimited(U256::ZERO));
        assert!(!is_unlimited(eth(1)));
        assert!(!is_unlimited(U256::MAX >> 1));
    }

    #[test]
    fn test_policy_tolerance() {
        let wide = ApprovalPolicy { unlimited_tolerance: U256::from(1000u64), ..Default::default() };
        assert!(wide.is_unlimited(U256::MAX - U256::from(1000u64)));
        assert!(!wide.is_unlimited(U256::MAX - U256::from(1001u64)));

        let exact = ApprovalPolicy { unlimited_tolerance: U256::ZERO, ..Default::default() };
        assert!(exact.is_unlimited(U256::MAX));
        assert!(!exact.is_unlimited(U256::MAX - U256::from(1u64)));
    }

    #[test]
    fn test_parse_allowance() {
        assert_eq!(parse_allowance("0").unwrap(), U256::ZERO);
        assert_eq!(parse_allowance(" 1000 ").unwrap(), U256::from(1000u64));
        assert_eq!(parse_allowance("0xFF").unwrap(), U256::from(255u64));
        assert_eq!(
            parse_allowance(&U256::MAX.to_string()).unwrap(),
            U256::MAX
        );
        assert_eq!(
            parse_allowance(&format!("0x{}", "f".repeat(64))).unwrap(),
            U256::MAX
        );
    }

    #[test]
    fn test_parse_allowance_rejects_bad_input() {
        for bad in ["", "-1", "1.0", "1e18", "abc", "0x", "0xzz", "+5"] {
            let err = parse_allowance(bad).unwrap_err();
            assert_eq!(err.code_str(), "ALLOWANCE_INVALID", "input {:?}", bad);
        }
    }

    #[test]
    fn test_parse_allowance_rejects_overflow() {
        // 2^256 = MAX + 1
        let too_big = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        let err = parse_allowance(too_big).unwrap_err();
        assert_eq!(err.code_str(), "ALLOWANCE_OVERFLOW");

        let err = parse_allowance(&format!("0x1{}", "0".repeat(64))).unwrap_err();
        assert_eq!(err.code_str(), "ALLOWANCE_OVERFLOW");
    }

    #[test]
    fn test_format_unlimited_ignores_decimals() {
        assert_eq!(format_allowance(U256::MAX, 18).unwrap(), "Unlimited");
        assert_eq!(format_allowance(U256::MAX, 0).unwrap(), "Unlimited");
        assert_eq!(format_allowance(U256::MAX, 200).unwrap(), "Unlimited");
    }

    #[test]
    fn test_format_magnitudes() {
        assert_eq!(format_allowance(eth(5000), 18).unwrap(), "5.00K");
        assert_eq!(format_allowance(eth(2_000_000), 18).unwrap(), "2.00M");
        assert_eq!(
            format_allowance(U256::from(100_000_000_000_000_000u64), 18).unwrap(),
            "0.10"
        );
        assert_eq!(format_allowance(U256::from(999u64), 0).unwrap(), "999.00");
        assert_eq!(format_allowance(U256::from(1000u64), 0).unwrap(), "1.00K");
        assert_eq!(format_allowance(U256::from(1_234_567u64), 0).unwrap(), "1.23M");
        assert_eq!(format_allowance(U256::ZERO, 6).unwrap(), "0.00");
    }

    #[test]
    fn test_format_rounds_half_up() {
        // 1.005 USDC -> 1.01, 1.004 USDC -> 1.00
        assert_eq!(format_allowance(U256::from(1_005_000u64), 6).unwrap(), "1.01");
        assert_eq!(format_allowance(U256::from(1_004_999u64), 6).unwrap(), "1.00");
        // 12_345 tokens -> 12.345K -> 12.35K
        assert_eq!(format_allowance(U256::from(12_345u64), 0).unwrap(), "12.35K");
    }

    #[test]
    fn test_format_huge_limited_amount() {
        // Just below the unlimited floor, with zero decimals
        let almost = U256::MAX - U256::from(2u64);
        let out = format_allowance(almost, 0).unwrap();
        assert!(out.ends_with('M'));
        assert!(out.starts_with("115792089237316195423570985008687907853269984665640564039457584007913"));
    }

    #[test]
    fn test_format_rejects_excessive_decimals() {
        let err = format_allowance(U256::from(1u64), 78).unwrap_err();
        assert_eq!(err.code_str(), "DECIMALS_INVALID");
        assert_eq!(format_allowance(U256::from(1u64), 77).unwrap(), "0.00");
    }
}
