//! Bayesian knowledge tracing.
//!
//! Two-state model updated per observed answer:
//! - posterior P(known | observation) from the guess/slip likelihoods
//! - learning step: one practice opportunity moves unknown mass toward known
//!
//! The update is a pure function: load the record, apply, store the result.

use chrono::{DateTime, Duration, Utc};

use crate::config::BktParams;
use crate::types::{MasteryLevel, MasteryRecord};

/// Coarse review offset seeded by practice; superseded by the spaced
/// repetition scheduler once active teaching ends.
pub(crate) fn coarse_review_days(probability: f64) -> i64 {
    if probability < 0.5 {
        1
    } else if probability < 0.7 {
        3
    } else if probability < 0.9 {
        7
    } else {
        21
    }
}

/// Apply one observed answer to a mastery record.
pub fn update(
    record: &MasteryRecord,
    correct: bool,
    now: DateTime<Utc>,
    params: &BktParams,
) -> MasteryRecord {
    let p = record.probability.clamp(0.0, 1.0);

    // 1. Posterior P(known | observation).
    let posterior = observation_posterior(p, correct, params);

    // 2. Learning step: practice moves the remaining unknown mass.
    let probability = (posterior + (1.0 - posterior) * params.p_learn).clamp(0.0, 1.0);

    let mut next = record.clone();
    next.probability = probability;
    next.level = MasteryLevel::from_probability(probability);
    next.practice_count += 1;
    if correct {
        next.correct_count += 1;
        next.consecutive_correct += 1;
    } else {
        next.consecutive_correct = 0;
    }
    next.last_practiced_at = now;
    next.next_review_at = now + Duration::days(coarse_review_days(probability));
    next
}

fn observation_posterior(p: f64, correct: bool, params: &BktParams) -> f64 {
    let (numerator, denominator) = if correct {
        let hit = p * (1.0 - params.p_slip);
        (hit, hit + (1.0 - p) * params.p_guess)
    } else {
        let slip = p * params.p_slip;
        (slip, slip + (1.0 - p) * (1.0 - params.p_guess))
    };
    // Degenerate parameterizations can zero the denominator at p ∈ {0, 1};
    // the evidence is uninformative there, so the prior stands.
    if denominator.abs() < 1e-12 {
        p
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(probability: f64) -> MasteryRecord {
        MasteryRecord::new("s1", "c1", probability, Utc::now())
    }

    #[test]
    fn test_correct_raises_incorrect_lowers() {
        let record = fresh(0.5);
        let now = Utc::now();
        let params = BktParams::default();
        let up = update(&record, true, now, &params);
        let down = update(&record, false, now, &params);
        assert!(up.probability > down.probability);
        assert!(up.probability > record.probability);
    }

    #[test]
    fn test_ten_correct_converges_past_advance_threshold() {
        let params = BktParams::default();
        let mut record = fresh(params.prior_known);
        for _ in 0..10 {
            record = update(&record, true, Utc::now(), &params);
        }
        assert!(record.probability > 0.9, "got {}", record.probability);
        assert_eq!(record.level, MasteryLevel::Mastered);
        assert!(record.should_advance());
    }

    #[test]
    fn test_ten_incorrect_never_goes_negative() {
        let params = BktParams::default();
        let mut record = fresh(0.5);
        for _ in 0..10 {
            record = update(&record, false, Utc::now(), &params);
            assert!(record.probability >= 0.0);
            assert!(record.probability.is_finite());
        }
    }

    #[test]
    fn test_boundaries_stay_finite() {
        let params = BktParams::default();
        for p in [0.0, 1.0] {
            for correct in [true, false] {
                let next = update(&fresh(p), correct, Utc::now(), &params);
                assert!(next.probability.is_finite());
                assert!((0.0..=1.0).contains(&next.probability));
            }
        }
    }

    #[test]
    fn test_zero_denominator_keeps_prior() {
        // p = 0 with zero guess probability makes a correct answer
        // unexplainable; the posterior must fall back to the prior.
        let params = BktParams {
            p_guess: 0.0,
            ..BktParams::default()
        };
        let next = update(&fresh(0.0), true, Utc::now(), &params);
        assert!((next.probability - params.p_learn).abs() < 1e-12);
    }

    #[test]
    fn test_counts_and_streak() {
        let params = BktParams::default();
        let mut record = fresh(0.3);
        record = update(&record, true, Utc::now(), &params);
        record = update(&record, true, Utc::now(), &params);
        record = update(&record, false, Utc::now(), &params);
        assert_eq!(record.practice_count, 3);
        assert_eq!(record.correct_count, 2);
        assert_eq!(record.consecutive_correct, 0);
        assert!(record.correct_count <= record.practice_count);
    }

    #[test]
    fn test_coarse_review_offsets() {
        assert_eq!(coarse_review_days(0.2), 1);
        assert_eq!(coarse_review_days(0.6), 3);
        assert_eq!(coarse_review_days(0.8), 7);
        assert_eq!(coarse_review_days(0.95), 21);
    }
}
