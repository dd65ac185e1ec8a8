//! Utils Module - Shared Helpers
//!
//! Constants, timestamp formatting and telemetry counters.

pub mod constants;
pub mod telemetry;
pub mod time;

pub use constants::*;
pub use telemetry::*;
pub use time::*;
