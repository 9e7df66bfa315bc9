//! Fluency plateau detection.
//!
//! Two independent completion signals for a speed drill:
//! - flatline: latency coefficient of variation over a full window drops
//!   below threshold (the student's speed has stopped changing)
//! - fixed target: a streak of fast correct answers with high recent accuracy
//!
//! Either signal alone completes the drill.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::FluencyParams;
use crate::types::MasteryRecord;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatlineCheck {
    pub is_flatline: bool,
    pub coefficient_of_variation: f64,
    pub sample_count: usize,
}

/// Test the latency window for a speed plateau. Fewer than `window` samples
/// is insufficient data, never a plateau.
pub fn check_flatline(latencies: &[u64], params: &FluencyParams) -> FlatlineCheck {
    let window = if latencies.len() > params.window {
        &latencies[latencies.len() - params.window..]
    } else {
        latencies
    };
    let sample_count = window.len();
    if sample_count == 0 {
        return FlatlineCheck {
            is_flatline: false,
            coefficient_of_variation: 0.0,
            sample_count,
        };
    }

    let mean = window.iter().map(|&v| v as f64).sum::<f64>() / sample_count as f64;
    let coefficient_of_variation = if mean > 0.0 {
        let variance = window
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / sample_count as f64;
        variance.sqrt() / mean
    } else {
        // Non-positive latencies are corrupt telemetry; never flatline on them.
        0.0
    };

    let is_flatline = sample_count >= params.window
        && mean > 0.0
        && coefficient_of_variation < params.flatline_cov;

    FlatlineCheck {
        is_flatline,
        coefficient_of_variation,
        sample_count,
    }
}

/// Rolling state for the fixed-target rule, maintained by the caller across
/// a drill and persisted between requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillProgress {
    pub fast_correct_streak: u32,
    pub recent_outcomes: VecDeque<bool>,
}

impl DrillProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one drill answer. Only answers at or under the benchmark
    /// latency extend the streak.
    pub fn record(
        &mut self,
        correct: bool,
        latency_ms: u64,
        benchmark_ms: u64,
        params: &FluencyParams,
    ) {
        if correct && latency_ms <= benchmark_ms {
            self.fast_correct_streak += 1;
        } else {
            self.fast_correct_streak = 0;
        }
        self.recent_outcomes.push_back(correct);
        while self.recent_outcomes.len() > params.accuracy_window {
            self.recent_outcomes.pop_front();
        }
    }

    pub fn recent_accuracy(&self) -> f64 {
        if self.recent_outcomes.is_empty() {
            return 0.0;
        }
        let correct = self.recent_outcomes.iter().filter(|&&c| c).count();
        correct as f64 / self.recent_outcomes.len() as f64
    }

    pub fn target_reached(&self, params: &FluencyParams) -> bool {
        self.fast_correct_streak >= params.target_streak
            && self.recent_accuracy() >= params.min_recent_accuracy
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillAssessment {
    pub flatline: FlatlineCheck,
    pub target_reached: bool,
    pub complete: bool,
}

/// Combined drill-completion check: flatline OR fixed target.
pub fn assess_drill(
    latencies: &[u64],
    progress: &DrillProgress,
    params: &FluencyParams,
) -> DrillAssessment {
    let flatline = check_flatline(latencies, params);
    let target_reached = progress.target_reached(params);
    DrillAssessment {
        complete: flatline.is_flatline || target_reached,
        flatline,
        target_reached,
    }
}

/// Track the personal best latency on the mastery record.
pub fn note_latency(record: &MasteryRecord, latency_ms: u64) -> MasteryRecord {
    let mut next = record.clone();
    next.personal_best_latency_ms = Some(match record.personal_best_latency_ms {
        Some(best) => best.min(latency_ms),
        None => latency_ms,
    });
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// Twenty samples alternating around `mean` by `spread`: CoV = spread/mean.
    fn window(mean: u64, spread: u64) -> Vec<u64> {
        (0..20)
            .map(|i| if i % 2 == 0 { mean - spread } else { mean + spread })
            .collect()
    }

    #[test]
    fn test_low_variation_flatlines() {
        let check = check_flatline(&window(1000, 100), &FluencyParams::default());
        assert!((check.coefficient_of_variation - 0.10).abs() < 1e-9);
        assert!(check.is_flatline);
    }

    #[test]
    fn test_high_variation_does_not_flatline() {
        let check = check_flatline(&window(1000, 200), &FluencyParams::default());
        assert!((check.coefficient_of_variation - 0.20).abs() < 1e-9);
        assert!(!check.is_flatline);
    }

    #[test]
    fn test_short_window_is_insufficient_data() {
        let flat = vec![1000u64; 19];
        let check = check_flatline(&flat, &FluencyParams::default());
        assert!(!check.is_flatline);
        assert_eq!(check.sample_count, 19);
    }

    #[test]
    fn test_only_last_window_counts() {
        // Old noisy samples followed by twenty identical ones.
        let mut latencies = vec![100u64, 9000, 50, 7000];
        latencies.extend(vec![1000u64; 20]);
        let check = check_flatline(&latencies, &FluencyParams::default());
        assert!(check.is_flatline);
        assert_eq!(check.sample_count, 20);
    }

    #[test]
    fn test_zero_latencies_never_flatline() {
        let check = check_flatline(&vec![0u64; 20], &FluencyParams::default());
        assert!(!check.is_flatline);
    }

    #[test]
    fn test_fixed_target_requires_streak_and_accuracy() {
        let params = FluencyParams::default();
        let mut progress = DrillProgress::new();
        for _ in 0..10 {
            progress.record(true, 1500, 2000, &params);
        }
        assert!(progress.target_reached(&params));

        // A slow answer breaks the streak even when correct.
        progress.record(true, 5000, 2000, &params);
        assert!(!progress.target_reached(&params));
    }

    #[test]
    fn test_either_signal_completes_the_drill() {
        let params = FluencyParams::default();
        let mut progress = DrillProgress::new();
        for _ in 0..10 {
            progress.record(true, 1500, 2000, &params);
        }
        // Noisy latencies: no flatline, but the target carries it.
        let noisy: Vec<u64> = (0..20).map(|i| 500 + i * 150).collect();
        let assessment = assess_drill(&noisy, &progress, &params);
        assert!(!assessment.flatline.is_flatline);
        assert!(assessment.target_reached);
        assert!(assessment.complete);
    }

    #[test]
    fn test_personal_best_only_improves() {
        let record = MasteryRecord::new("s1", "c1", 0.9, Utc::now());
        let record = note_latency(&record, 1800);
        assert_eq!(record.personal_best_latency_ms, Some(1800));
        let record = note_latency(&record, 2500);
        assert_eq!(record.personal_best_latency_ms, Some(1800));
        let record = note_latency(&record, 1200);
        assert_eq!(record.personal_best_latency_ms, Some(1200));
    }
}
