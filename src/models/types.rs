//! Type definitions for Allowance Sentinel
//! All value objects consumed and produced by the scoring engine

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::core::allowance::parse_allowance;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::MAX_TOKEN_DECIMALS;

// ============================================
// Approvals
// ============================================

/// A token approval as reported by the indexer
///
/// Deserializes through [`RawApproval`], so a malformed address, allowance
/// or decimals value fails with its own error code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawApproval")]
pub struct Approval {
    /// ERC-20 token contract
    pub token: Address,
    /// Contract allowed to spend on the holder's behalf
    pub spender: Address,
    /// Raw allowance in the token's smallest unit, serialized as a decimal string
    #[serde(serialize_with = "serialize_allowance")]
    pub allowance: U256,
    pub symbol: String,
    pub decimals: u8,
}

/// An approval plus the pricing collaborator's USD exposure, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPricedApproval")]
pub struct PricedApproval {
    #[serde(flatten)]
    pub approval: Approval,
    pub value_usd: Option<f64>,
}

/// Risk level classification for a single approval
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An approval together with its assessed risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRisk {
    #[serde(flatten)]
    pub approval: Approval,
    pub risk_level: RiskLevel,
    /// Why this level was assigned; never empty
    pub reason: String,
}

/// Summary counts over a set of scored approvals
///
/// `low + medium + high == total` and `unlimited <= total` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApprovalStats {
    pub total: u64,
    pub unlimited: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

impl ApprovalStats {
    /// Combine two partial tallies. Associative and commutative.
    pub fn merge(self, other: ApprovalStats) -> ApprovalStats {
        ApprovalStats {
            total: self.total + other.total,
            unlimited: self.unlimited + other.unlimited,
            high: self.high + other.high,
            medium: self.medium + other.medium,
            low: self.low + other.low,
        }
    }
}

// ============================================
// Risk factors
// ============================================

/// Detector category of a risk factor.
///
/// Open-ended: names this build does not recognise deserialize into
/// `Unknown` and are scored with the default weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RiskCategory {
    Approvals,
    Honeypot,
    HiddenMint,
    Reputation,
    Mixer,
    Age,
    Liquidity,
    Taxes,
    Contract,
    Other,
    Unknown(String),
}

impl RiskCategory {
    pub fn as_str(&self) -> &str {
        match self {
            RiskCategory::Approvals => "Approvals",
            RiskCategory::Honeypot => "Honeypot",
            RiskCategory::HiddenMint => "HiddenMint",
            RiskCategory::Reputation => "Reputation",
            RiskCategory::Mixer => "Mixer",
            RiskCategory::Age => "Age",
            RiskCategory::Liquidity => "Liquidity",
            RiskCategory::Taxes => "Taxes",
            RiskCategory::Contract => "Contract",
            RiskCategory::Other => "Other",
            RiskCategory::Unknown(name) => name,
        }
    }

    /// Parse a detector category name. Matching ignores case, `_` and `-`.
    pub fn from_name(name: &str) -> Self {
        let key: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "approvals" => RiskCategory::Approvals,
            "honeypot" => RiskCategory::Honeypot,
            "hiddenmint" => RiskCategory::HiddenMint,
            "reputation" => RiskCategory::Reputation,
            "mixer" => RiskCategory::Mixer,
            "age" => RiskCategory::Age,
            "liquidity" => RiskCategory::Liquidity,
            "taxes" => RiskCategory::Taxes,
            "contract" => RiskCategory::Contract,
            "other" => RiskCategory::Other,
            _ => RiskCategory::Unknown(name.to_string()),
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RiskCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(RiskCategory::from_name(&name))
    }
}

/// Detector-assigned severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One atomic finding from a security detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub category: RiskCategory,
    /// Magnitude of the finding; the sign is ignored when scoring
    pub impact: f64,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl RiskFactor {
    pub fn new(
        category: RiskCategory,
        severity: Severity,
        impact: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            impact,
            severity,
            description: description.into(),
            meta: None,
        }
    }
}

// ============================================
// Trust score
// ============================================

/// Letter grade summarising a trust score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse presentation banding of a trust score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Trusted,
    Warning,
    Danger,
}

impl StatusTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTone::Trusted => "trusted",
            StatusTone::Warning => "warning",
            StatusTone::Danger => "danger",
        }
    }
}

/// Composed trust score (0-100) and its grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustScore {
    pub trust_score: u8,
    pub grade: Grade,
}

// ============================================
// Scans
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Wallet,
    Contract,
}

/// Freshness and volume metadata attached to a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanMeta {
    pub chains: Vec<String>,
    pub last_scan_at: DateTime<Utc>,
    pub totals: ScanTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanTotals {
    pub risk_factors: u64,
    pub approvals: ApprovalStats,
}

/// Immutable record of one scan, handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub id: Uuid,
    pub target_address: Address,
    pub scan_type: ScanType,
    pub trust_score: u8,
    pub grade: Grade,
    pub risk_factors: Vec<RiskFactor>,
    pub meta: ScanMeta,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Wire forms
// ============================================

/// Allowance as it arrives on the wire: a decimal or `0x` hex string, or a
/// JSON number. Numbers only cover the `u64` range; larger allowances must be
/// sent as strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAllowance {
    Text(String),
    Number(serde_json::Number),
}

impl RawAllowance {
    pub fn parse(&self) -> AppResult<U256> {
        match self {
            RawAllowance::Text(text) => parse_allowance(text),
            RawAllowance::Number(n) => {
                if let Some(v) = n.as_u64() {
                    return Ok(U256::from(v));
                }
                if let Some(v) = n.as_i64() {
                    return Err(AppError::invalid_allowance(format!(
                        "Allowance must be non-negative, got {}",
                        v
                    )));
                }
                match n.as_f64() {
                    Some(v) if v.fract() == 0.0 && v >= u64::MAX as f64 => {
                        Err(AppError::invalid_allowance(
                            "Allowance exceeds the JSON integer range (2^64-1); \
                             send it as a decimal string",
                        ))
                    }
                    Some(v) if v < 0.0 => Err(AppError::invalid_allowance(format!(
                        "Allowance must be non-negative, got {}",
                        v
                    ))),
                    _ => Err(AppError::invalid_allowance(format!(
                        "Allowance must be an integer, got {}",
                        n
                    ))),
                }
            }
        }
    }
}

/// Unvalidated approval as decoded from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct RawApproval {
    pub token: String,
    pub spender: String,
    pub allowance: RawAllowance,
    pub symbol: String,
    pub decimals: u64,
}

impl TryFrom<RawApproval> for Approval {
    type Error = AppError;

    fn try_from(raw: RawApproval) -> AppResult<Self> {
        // Anything past u8 can never be a token's decimals; 78..=255 is left
        // to the formatter so unlimited allowances still score.
        let decimals = u8::try_from(raw.decimals)
            .map_err(|_| AppError::invalid_decimals(raw.decimals, MAX_TOKEN_DECIMALS))?;

        Ok(Approval {
            token: parse_address("token", &raw.token)?,
            spender: parse_address("spender", &raw.spender)?,
            allowance: raw.allowance.parse()?,
            symbol: raw.symbol,
            decimals,
        })
    }
}

/// Unvalidated priced approval as decoded from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct RawPricedApproval {
    #[serde(flatten)]
    pub approval: RawApproval,
    #[serde(default)]
    pub value_usd: Option<f64>,
}

impl TryFrom<RawPricedApproval> for PricedApproval {
    type Error = AppError;

    fn try_from(raw: RawPricedApproval) -> AppResult<Self> {
        Ok(PricedApproval {
            approval: Approval::try_from(raw.approval)?,
            value_usd: raw.value_usd,
        })
    }
}

/// Parse a 20-byte hex address, naming `field` in the error
pub fn parse_address(field: &str, raw: &str) -> AppResult<Address> {
    Address::from_str(raw.trim()).map_err(|e| {
        AppError::invalid_address(format!("Invalid {} address {:?}: {}", field, raw, e))
    })
}

fn serialize_allowance<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn test_category_from_name() {
        assert_eq!(RiskCategory::from_name("Honeypot"), RiskCategory::Honeypot);
        assert_eq!(RiskCategory::from_name("hidden_mint"), RiskCategory::HiddenMint);
        assert_eq!(RiskCategory::from_name("HIDDEN-MINT"), RiskCategory::HiddenMint);
        assert_eq!(
            RiskCategory::from_name("FlashLoan"),
            RiskCategory::Unknown("FlashLoan".to_string())
        );
    }

    #[test]
    fn test_unknown_category_survives_serde() {
        let json = r#"{"category":"Bridge","impact":12.5,"severity":"high","description":"x"}"#;
        let factor: RiskFactor = serde_json::from_str(json).unwrap();
        assert_eq!(factor.category, RiskCategory::Unknown("Bridge".to_string()));

        let back = serde_json::to_value(&factor).unwrap();
        assert_eq!(back["category"], "Bridge");
        assert!(back.get("meta").is_none());
    }

    #[test]
    fn test_approval_allowance_accepts_string_hex_and_number() {
        let base = r#""token":"0x0000000000000000000000000000000000000001","spender":"0x0000000000000000000000000000000000000002","symbol":"USDC","decimals":6"#;

        let dec: Approval =
            serde_json::from_str(&format!(r#"{{{},"allowance":"1000000"}}"#, base)).unwrap();
        assert_eq!(dec.allowance, U256::from(1_000_000u64));

        let hex: Approval =
            serde_json::from_str(&format!(r#"{{{},"allowance":"0xff"}}"#, base)).unwrap();
        assert_eq!(hex.allowance, U256::from(255u64));

        let num: Approval =
            serde_json::from_str(&format!(r#"{{{},"allowance":42}}"#, base)).unwrap();
        assert_eq!(num.allowance, U256::from(42u64));
    }

    #[test]
    fn test_approval_allowance_rejects_malformed() {
        let base = r#""token":"0x0000000000000000000000000000000000000001","spender":"0x0000000000000000000000000000000000000002","symbol":"USDC","decimals":6"#;

        for bad in [r#""-5""#, "-5", "1.5", r#""1.5""#, r#""abc""#] {
            let json = format!(r#"{{{},"allowance":{}}}"#, base, bad);
            let err = serde_json::from_str::<Approval>(&json).unwrap_err();
            assert!(err.to_string().contains("ALLOWANCE_INVALID"), "{}: {}", bad, err);
        }

        let too_big = format!(r#"{{{},"allowance":"1{}"}}"#, base, "0".repeat(80));
        let err = serde_json::from_str::<Approval>(&too_big).unwrap_err();
        assert!(err.to_string().contains("ALLOWANCE_OVERFLOW"));
    }

    #[test]
    fn test_wide_json_number_asks_for_string() {
        // 2^64 does not fit a JSON integer; it must not be read as a float
        let raw: RawAllowance = serde_json::from_str("18446744073709551616").unwrap();
        let err = raw.parse().unwrap_err();
        assert_eq!(err.code, ErrorCode::AllowanceInvalid);
        assert!(err.message.contains("decimal string"), "{}", err.message);
        assert!(!err.message.contains("18446744073709552000"));

        let raw: RawAllowance = serde_json::from_str(r#""18446744073709551616""#).unwrap();
        assert_eq!(raw.parse().unwrap(), U256::from(u64::MAX) + U256::from(1u64));

        let raw: RawAllowance = serde_json::from_str(&u64::MAX.to_string()).unwrap();
        assert_eq!(raw.parse().unwrap(), U256::from(u64::MAX));
    }

    #[test]
    fn test_raw_approval_errors_are_typed() {
        let raw = |token: &str, decimals: u64| RawApproval {
            token: token.to_string(),
            spender: "0x0000000000000000000000000000000000000002".to_string(),
            allowance: RawAllowance::Text("1".to_string()),
            symbol: "USDC".to_string(),
            decimals,
        };

        let err = Approval::try_from(raw("0xnot-an-address", 6)).unwrap_err();
        assert_eq!(err.code, ErrorCode::AddressInvalid);
        assert!(err.message.contains("token"));

        let err = Approval::try_from(raw("0x0000000000000000000000000000000000000001", 256))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DecimalsInvalid);

        let ok = Approval::try_from(raw("0x0000000000000000000000000000000000000001", 200)).unwrap();
        assert_eq!(ok.decimals, 200);
    }

    #[test]
    fn test_bad_address_surfaces_code_through_serde() {
        let json = r#"{"token":"0x12","spender":"0x0000000000000000000000000000000000000002","allowance":"1","symbol":"X","decimals":0}"#;
        let err = serde_json::from_str::<Approval>(json).unwrap_err();
        assert!(err.to_string().contains("ADDRESS_INVALID"), "{}", err);
    }

    #[test]
    fn test_stats_merge() {
        let a = ApprovalStats { total: 2, unlimited: 1, high: 1, medium: 0, low: 1 };
        let b = ApprovalStats { total: 1, unlimited: 1, high: 0, medium: 1, low: 0 };
        assert_eq!(a.merge(b), b.merge(a));
        assert_eq!(a.merge(ApprovalStats::default()), a);
        assert_eq!(a.merge(b).total, 3);
    }
}
