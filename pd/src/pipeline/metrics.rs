//! Pipeline metrics
//!
//! Process-wide counters incremented by the orchestrator. Modeled as an
//! injected struct of atomics rather than true global state, with a snapshot
//! accessor for observability and a reset for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shared counters for pipeline activity (thread-safe)
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    skeleton_calls: AtomicU64,
    expand_attempts: AtomicU64,
    parse_failures: AtomicU64,
    validation_failures: AtomicU64,
    accepted: AtomicU64,
    fallbacks: AtomicU64,
    generation_time_ms: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skeleton_call(&self) {
        self.skeleton_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expand_attempt(&self) {
        self.expand_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_time(&self, elapsed_ms: u64) {
        self.generation_time_ms.fetch_add(elapsed_ms, Ordering::Relaxed);
    }

    /// Read-only snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        debug!("PipelineMetrics::snapshot: called");
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            skeleton_calls: self.skeleton_calls.load(Ordering::Relaxed),
            expand_attempts: self.expand_attempts.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            generation_time_ms: self.generation_time_ms.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter (tests only need this between runs)
    pub fn reset(&self) {
        debug!("PipelineMetrics::reset: called");
        self.requests.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.skeleton_calls.store(0, Ordering::Relaxed);
        self.expand_attempts.store(0, Ordering::Relaxed);
        self.parse_failures.store(0, Ordering::Relaxed);
        self.validation_failures.store(0, Ordering::Relaxed);
        self.accepted.store(0, Ordering::Relaxed);
        self.fallbacks.store(0, Ordering::Relaxed);
        self.generation_time_ms.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub cache_hits: u64,
    pub skeleton_calls: u64,
    pub expand_attempts: u64,
    pub parse_failures: u64,
    pub validation_failures: u64,
    pub accepted: u64,
    pub fallbacks: u64,
    pub generation_time_ms: u64,
}
