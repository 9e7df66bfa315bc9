use serde::{Deserialize, Serialize};

/// Knowledge-tracing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BktParams {
    /// Probability of learning a concept from one practice opportunity.
    pub p_learn: f64,
    /// Probability of answering correctly without knowing the concept.
    pub p_guess: f64,
    /// Probability of answering incorrectly despite knowing the concept.
    pub p_slip: f64,
    /// Initial knowledge probability for a never-observed concept.
    pub prior_known: f64,
}

impl Default for BktParams {
    fn default() -> Self {
        Self {
            p_learn: 0.3,
            p_guess: 0.2,
            p_slip: 0.1,
            prior_known: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerParams {
    /// Intervals for the first four successful reviews, in days.
    pub fixed_steps: [i64; 4],
    /// Easiness deduction applied on a failed review.
    pub easiness_penalty: f64,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            fixed_steps: [1, 3, 7, 16],
            easiness_penalty: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluencyParams {
    /// Latency window size for plateau detection.
    pub window: usize,
    /// Coefficient-of-variation threshold below which latency has flatlined.
    pub flatline_cov: f64,
    /// Consecutive fast-correct answers required by the fixed-target rule.
    pub target_streak: u32,
    /// Minimum recent accuracy required by the fixed-target rule.
    pub min_recent_accuracy: f64,
    /// Number of recent outcomes used to compute accuracy.
    pub accuracy_window: usize,
}

impl Default for FluencyParams {
    fn default() -> Self {
        Self {
            window: 20,
            flatline_cov: 0.15,
            target_streak: 10,
            min_recent_accuracy: 0.9,
            accuracy_window: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticParams {
    /// Hard cap on diagnostic questions; the effective cap is
    /// min(max_questions, concept space size).
    pub max_questions: usize,
}

impl Default for DiagnosticParams {
    fn default() -> Self {
        Self { max_questions: 20 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub bkt: BktParams,
    pub scheduler: SchedulerParams,
    pub fluency: FluencyParams,
    pub diagnostic: DiagnosticParams,
}
