//! Centralized Error Handling Module
//!
//! Every failure carries a unique, stable error code so API clients and log
//! pipelines can branch on it without parsing messages.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - ALLOWANCE_xxx / DECIMALS_xxx / TIMESTAMP_xxx: input validation errors
//! - API_xxx: API errors
//! - CFG_xxx: Configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Validation Errors (1xx)
    // ============================================
    /// Allowance is negative, fractional, empty or not a number
    AllowanceInvalid,
    /// Allowance does not fit in 256 bits
    AllowanceOverflow,
    /// Token decimals out of the supported range
    DecimalsInvalid,
    /// Timestamp is not RFC 3339
    TimestampInvalid,
    /// Address is not a 20-byte hex string
    AddressInvalid,

    // ============================================
    // API Errors (3xx)
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Unauthorized (invalid API key)
    ApiUnauthorized,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Batch larger than the server accepts
    ApiPayloadTooLarge,

    // ============================================
    // Configuration Errors (4xx)
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllowanceInvalid => "ALLOWANCE_INVALID",
            Self::AllowanceOverflow => "ALLOWANCE_OVERFLOW",
            Self::DecimalsInvalid => "DECIMALS_INVALID",
            Self::TimestampInvalid => "TIMESTAMP_INVALID",
            Self::AddressInvalid => "ADDRESS_INVALID",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiUnauthorized => "API_UNAUTHORIZED",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiPayloadTooLarge => "API_PAYLOAD_TOO_LARGE",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::AllowanceInvalid
            | Self::AllowanceOverflow
            | Self::DecimalsInvalid
            | Self::TimestampInvalid
            | Self::AddressInvalid
            | Self::ApiBadRequest => 400,
            Self::ApiUnauthorized => 401,
            Self::ApiPayloadTooLarge => 413,
            Self::ApiRateLimited => 429,
            Self::ConfigInvalidValue => 500,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Allowance failed validation
    pub fn invalid_allowance(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AllowanceInvalid, msg)
    }

    /// Allowance exceeds 2^256-1
    pub fn allowance_overflow(raw: &str) -> Self {
        Self::new(
            ErrorCode::AllowanceOverflow,
            format!("Allowance {} exceeds 256-bit range", raw),
        )
    }

    /// Decimals out of range
    pub fn invalid_decimals(decimals: u64, max: u8) -> Self {
        Self::new(
            ErrorCode::DecimalsInvalid,
            format!("Token decimals {} out of range (max {})", decimals, max),
        )
    }

    /// Timestamp could not be parsed
    pub fn invalid_timestamp(raw: &str, source: chrono::ParseError) -> Self {
        Self::with_source(
            ErrorCode::TimestampInvalid,
            format!("Invalid RFC 3339 timestamp: {:?}", raw),
            source,
        )
    }

    /// Address could not be parsed
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AddressInvalid, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::allowance_overflow("1".repeat(90).as_str());
        assert_eq!(err.code, ErrorCode::AllowanceOverflow);
        assert_eq!(err.code_str(), "ALLOWANCE_OVERFLOW");
        assert!(err.to_string().starts_with("[ALLOWANCE_OVERFLOW]"));
    }

    #[test]
    fn test_validation_errors_map_to_400() {
        for err in [
            AppError::invalid_allowance("-1"),
            AppError::invalid_decimals(80, 77),
            AppError::invalid_address("0x12"),
            AppError::bad_request("missing field"),
        ] {
            assert_eq!(err.code.http_status(), 400, "{}", err);
        }
        assert_eq!(AppError::invalid_config("port").code.http_status(), 500);
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ApiBadRequest.http_status(), 400);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::ApiPayloadTooLarge.http_status(), 413);
        assert_eq!(ErrorCode::ConfigInvalidValue.http_status(), 500);
    }
}
