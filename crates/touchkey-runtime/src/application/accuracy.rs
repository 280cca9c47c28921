//! Accuracy reporting against a target success rate.

use std::fmt;

use serde::Serialize;
use touchkey_core::TouchStatistics;

/// Accuracy the project aims for when no target is given.
pub const DEFAULT_TARGET_ACCURACY: f64 = 0.95;

/// Summary of a session's statistics judged against `target`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub total_touches: u64,
    pub successful_touches: u64,
    pub missed_touches: u64,
    pub invalid_touches: u64,
    /// `None` when nothing was counted.
    pub accuracy: Option<f64>,
    pub target: f64,
    /// `false` when nothing was counted.
    pub meets_target: bool,
    pub average_confidence: f64,
    pub average_hover_to_touch_latency_ms: Option<f64>,
    pub most_hit_key: Option<String>,
    pub least_hit_key: Option<String>,
}

impl AccuracyReport {
    pub fn from_statistics(stats: &TouchStatistics, target: f64) -> Self {
        let accuracy = stats.accuracy();
        Self {
            total_touches: stats.total_touches,
            successful_touches: stats.successful_touches,
            missed_touches: stats.missed_touches,
            invalid_touches: stats.invalid_touches,
            accuracy,
            target,
            meets_target: accuracy.is_some_and(|a| a >= target),
            average_confidence: stats.average_confidence,
            average_hover_to_touch_latency_ms: stats
                .average_hover_to_touch_latency
                .map(|d| d.as_secs_f64() * 1000.0),
            most_hit_key: stats.most_hit_key.clone(),
            least_hit_key: stats.least_hit_key.clone(),
        }
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "touches: {} total, {} successful, {} missed, {} invalid",
            self.total_touches, self.successful_touches, self.missed_touches, self.invalid_touches
        )?;
        match self.accuracy {
            Some(a) => writeln!(
                f,
                "accuracy: {:.1}% (target {:.1}%) {}",
                a * 100.0,
                self.target * 100.0,
                if self.meets_target { "PASS" } else { "FAIL" }
            )?,
            None => writeln!(f, "accuracy: n/a (no touches counted)")?,
        }
        writeln!(f, "average confidence: {:.3}", self.average_confidence)?;
        if let Some(ms) = self.average_hover_to_touch_latency_ms {
            writeln!(f, "average hover-to-touch latency: {ms:.1} ms")?;
        }
        if let (Some(most), Some(least)) = (&self.most_hit_key, &self.least_hit_key) {
            writeln!(f, "most hit key: {most}, least hit key: {least}")?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
