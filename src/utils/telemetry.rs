//! Telemetry Module for Allowance Sentinel
//!
//! In-process counters of what the API has scored, exposed on `/v1/stats`.
//! Privacy-first: only counts are kept, never addresses.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::types::{ApprovalStats, Grade};

/// Snapshot of telemetry counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct TelemetryStats {
    pub requests: u64,
    pub approvals_scored: u64,
    pub unlimited_approvals: u64,
    pub high_risk_approvals: u64,
    pub trust_scores_composed: u64,
    pub failing_grades: u64,
    pub scans_assembled: u64,
    pub avg_latency_ms: f64,
}

/// Lock-free counter set shared across request handlers
pub struct TelemetryCollector {
    requests: AtomicU64,
    approvals_scored: AtomicU64,
    unlimited_approvals: AtomicU64,
    high_risk_approvals: AtomicU64,
    trust_scores_composed: AtomicU64,
    failing_grades: AtomicU64,
    scans_assembled: AtomicU64,
    total_latency_us: AtomicU64,
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            approvals_scored: AtomicU64::new(0),
            unlimited_approvals: AtomicU64::new(0),
            high_risk_approvals: AtomicU64::new(0),
            trust_scores_composed: AtomicU64::new(0),
            failing_grades: AtomicU64::new(0),
            scans_assembled: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
        }
    }

    /// Record one handled request and its latency
    pub fn record_request(&self, latency_us: u64) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
    }

    pub fn record_approvals(&self, stats: &ApprovalStats) {
        self.approvals_scored.fetch_add(stats.total, Ordering::Relaxed);
        self.unlimited_approvals.fetch_add(stats.unlimited, Ordering::Relaxed);
        self.high_risk_approvals.fetch_add(stats.high, Ordering::Relaxed);
    }

    pub fn record_trust_score(&self, grade: Grade) {
        self.trust_scores_composed.fetch_add(1, Ordering::Relaxed);
        if grade == Grade::F {
            self.failing_grades.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_scan(&self, grade: Grade) {
        self.scans_assembled.fetch_add(1, Ordering::Relaxed);
        self.record_trust_score(grade);
    }

    pub fn get_stats(&self) -> TelemetryStats {
        let requests = self.requests.load(Ordering::Relaxed);
        let total_latency_us = self.total_latency_us.load(Ordering::Relaxed);
        let avg_latency_ms = if requests > 0 {
            total_latency_us as f64 / requests as f64 / 1000.0
        } else {
            0.0
        };

        TelemetryStats {
            requests,
            approvals_scored: self.approvals_scored.load(Ordering::Relaxed),
            unlimited_approvals: self.unlimited_approvals.load(Ordering::Relaxed),
            high_risk_approvals: self.high_risk_approvals.load(Ordering::Relaxed),
            trust_scores_composed: self.trust_scores_composed.load(Ordering::Relaxed),
            failing_grades: self.failing_grades.load(Ordering::Relaxed),
            scans_assembled: self.scans_assembled.load(Ordering::Relaxed),
            avg_latency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let telemetry = TelemetryCollector::new();
        telemetry.record_approvals(&ApprovalStats { total: 3, unlimited: 2, high: 1, medium: 1, low: 1 });
        telemetry.record_approvals(&ApprovalStats { total: 1, unlimited: 1, high: 1, medium: 0, low: 0 });
        telemetry.record_trust_score(Grade::A);
        telemetry.record_scan(Grade::F);

        let stats = telemetry.get_stats();
        assert_eq!(stats.approvals_scored, 4);
        assert_eq!(stats.unlimited_approvals, 3);
        assert_eq!(stats.high_risk_approvals, 2);
        assert_eq!(stats.trust_scores_composed, 2);
        assert_eq!(stats.failing_grades, 1);
        assert_eq!(stats.scans_assembled, 1);
    }

    #[test]
    fn test_average_latency() {
        let telemetry = TelemetryCollector::new();
        assert_eq!(telemetry.get_stats().avg_latency_ms, 0.0);

        telemetry.record_request(1_000);
        telemetry.record_request(3_000);
        let stats = telemetry.get_stats();
        assert_eq!(stats.requests, 2);
        assert!((stats.avg_latency_ms - 2.0).abs() < f64::EPSILON);
    }
}
