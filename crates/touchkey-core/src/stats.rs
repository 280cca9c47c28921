//! Touch statistics for diagnostics and accuracy reporting.
//!
//! The tracker keeps running sums only, so every update and every snapshot is
//! O(1) apart from the per-key scan that finds the most and least hit keys.
//!
//! # Counting model
//!
//! - **successful** – a confirmed touch.
//! - **missed** – a touch candidate that was abandoned before confirmation
//!   because the finger lifted, moved to another key, or the hand was lost.
//! - **invalid** – a touch candidate that was rejected (fingertip left the
//!   keyboard, shadow mismatch, low confidence, malformed sample).
//!
//! `total = successful + missed + invalid`.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

/// Immutable statistics snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TouchStatistics {
    pub total_touches: u64,
    pub successful_touches: u64,
    pub missed_touches: u64,
    pub invalid_touches: u64,
    /// Mean combined confidence of successful touches (0 when there are none).
    pub average_confidence: f64,
    /// Mean time from the first hover frame on a key to its confirmed touch.
    pub average_hover_to_touch_latency: Option<Duration>,
    pub most_hit_key: Option<String>,
    pub least_hit_key: Option<String>,
}

impl TouchStatistics {
    /// Successful touches divided by all counted touches.
    ///
    /// Returns `None` before anything has been counted.
    pub fn accuracy(&self) -> Option<f64> {
        (self.total_touches > 0).then(|| self.successful_touches as f64 / self.total_touches as f64)
    }
}

/// Accumulates touch outcomes.
#[derive(Debug, Clone, Default)]
pub struct TouchStatisticsTracker {
    successful: u64,
    missed: u64,
    invalid: u64,
    confidence_sum: f64,
    latency_sum: Duration,
    latency_samples: u32,
    key_hits: HashMap<String, u64>,
}

impl TouchStatisticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a confirmed touch on `key_id`.
    pub fn record_success(&mut self, key_id: &str, confidence: f64) {
        self.successful += 1;
        self.confidence_sum += confidence;
        match self.key_hits.get_mut(key_id) {
            Some(count) => *count += 1,
            None => {
                self.key_hits.insert(key_id.to_string(), 1);
            }
        }
    }

    pub fn record_missed(&mut self) {
        self.missed += 1;
    }

    pub fn record_invalid(&mut self) {
        self.invalid += 1;
    }

    pub fn record_hover_to_touch_latency(&mut self, latency: Duration) {
        self.latency_sum = self.latency_sum.saturating_add(latency);
        self.latency_samples = self.latency_samples.saturating_add(1);
    }

    /// Hit count for one key.
    pub fn hits_for(&self, key_id: &str) -> u64 {
        self.key_hits.get(key_id).copied().unwrap_or(0)
    }

    /// Builds a snapshot from the running sums.
    ///
    /// Ties for most/least hit key are broken by identifier so snapshots are
    /// deterministic regardless of hash order.
    pub fn snapshot(&self) -> TouchStatistics {
        let average_confidence = if self.successful > 0 {
            self.confidence_sum / self.successful as f64
        } else {
            0.0
        };
        let average_hover_to_touch_latency =
            (self.latency_samples > 0).then(|| self.latency_sum / self.latency_samples);

        let most_hit_key = self
            .key_hits
            .iter()
            .max_by(|(a_id, a), (b_id, b)| a.cmp(b).then_with(|| b_id.cmp(a_id)))
            .map(|(id, _)| id.clone());
        let least_hit_key = self
            .key_hits
            .iter()
            .min_by(|(a_id, a), (b_id, b)| a.cmp(b).then_with(|| a_id.cmp(b_id)))
            .map(|(id, _)| id.clone());

        TouchStatistics {
            total_touches: self.successful + self.missed + self.invalid,
            successful_touches: self.successful,
            missed_touches: self.missed,
            invalid_touches: self.invalid,
            average_confidence,
            average_hover_to_touch_latency,
            most_hit_key,
            least_hit_key,
        }
    }

    /// Clears every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
