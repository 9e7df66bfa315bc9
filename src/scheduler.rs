//! Spaced repetition scheduling.
//!
//! SM-2-like: fixed early intervals, then multiplicative growth by a
//! per-concept easiness factor. A failed review resets the interval and
//! penalizes easiness; easiness never leaves [1.3, 2.5].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerParams;
use crate::types::{MasteryRecord, MAX_EASINESS, MIN_EASINESS};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleUpdate {
    pub interval_days: i64,
    pub review_count: i32,
    pub easiness_factor: f64,
    pub next_review_at: DateTime<Utc>,
}

/// Compute the next review from one review outcome. `now` is read, never
/// mutated; the result is a value for the caller to persist.
pub fn schedule_next(
    record: &MasteryRecord,
    correct: bool,
    now: DateTime<Utc>,
    params: &SchedulerParams,
) -> ScheduleUpdate {
    let easiness = record.easiness();
    let review_count = record.review_count + 1;

    let (interval_days, easiness_factor) = if correct {
        let interval = match review_count {
            1..=4 => params.fixed_steps[(review_count - 1) as usize],
            _ => (record.review_interval_days as f64 * easiness).round() as i64,
        };
        (interval.max(1), easiness)
    } else {
        let penalized = (easiness - params.easiness_penalty).clamp(MIN_EASINESS, MAX_EASINESS);
        (1, penalized)
    };

    ScheduleUpdate {
        interval_days,
        review_count,
        easiness_factor,
        next_review_at: now + Duration::days(interval_days),
    }
}

/// Fold a schedule update back into the record.
pub fn apply(record: &MasteryRecord, update: &ScheduleUpdate) -> MasteryRecord {
    let mut next = record.clone();
    next.review_interval_days = update.interval_days;
    next.review_count = update.review_count;
    next.easiness_factor = update.easiness_factor;
    next.next_review_at = update.next_review_at;
    next
}
