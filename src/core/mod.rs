//! Core Module - Scoring Engine
//!
//! Pure, synchronous functions: allowance classification and formatting,
//! per-approval risk, aggregation, trust score composition, scan assembly.

pub mod aggregator;
pub mod allowance;
pub mod approval_risk;
pub mod scan;
pub mod trust_score;

pub use aggregator::*;
pub use allowance::*;
pub use approval_risk::*;
pub use scan::*;
pub use trust_score::*;
