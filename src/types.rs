use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Probability at which a concept is considered ready to advance past.
pub const ADVANCE_PROBABILITY: f64 = 0.9;
/// Below this probability a stale concept is flagged for review.
pub const REVIEW_PROBABILITY_CEILING: f64 = 0.7;
/// Days without practice before a concept counts as stale.
pub const REVIEW_STALE_DAYS: i64 = 3;

/// Easiness factor bounds, enforced on every read and write.
pub const MIN_EASINESS: f64 = 1.3;
pub const MAX_EASINESS: f64 = 2.5;
pub const INITIAL_EASINESS: f64 = 2.5;

/// A single concept in the curriculum. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptNode {
    pub code: String,
    pub grade_rank: i32,
    /// 1 (introductory) to 10 (hardest within the grade).
    pub difficulty: u8,
    pub title: String,
    pub domain: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryLevel {
    Novice,
    Developing,
    Proficient,
    Advanced,
    Mastered,
}

impl MasteryLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.3 {
            Self::Novice
        } else if probability < 0.5 {
            Self::Developing
        } else if probability < 0.7 {
            Self::Proficient
        } else if probability < 0.9 {
            Self::Advanced
        } else {
            Self::Mastered
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Novice => "novice",
            Self::Developing => "developing",
            Self::Proficient => "proficient",
            Self::Advanced => "advanced",
            Self::Mastered => "mastered",
        }
    }
}

/// Per-(student, concept) knowledge state. Created on the first observation,
/// mutated on every subsequent response, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRecord {
    pub student_id: String,
    pub concept_id: String,
    pub probability: f64,
    pub level: MasteryLevel,
    pub practice_count: i32,
    pub correct_count: i32,
    pub last_practiced_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
    pub review_interval_days: i64,
    pub review_count: i32,
    pub easiness_factor: f64,
    pub consecutive_correct: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_best_latency_ms: Option<u64>,
}

impl MasteryRecord {
    pub fn new(
        student_id: impl Into<String>,
        concept_id: impl Into<String>,
        probability: f64,
        now: DateTime<Utc>,
    ) -> Self {
        let probability = probability.clamp(0.0, 1.0);
        Self {
            student_id: student_id.into(),
            concept_id: concept_id.into(),
            probability,
            level: MasteryLevel::from_probability(probability),
            practice_count: 0,
            correct_count: 0,
            last_practiced_at: now,
            next_review_at: now + Duration::days(crate::bkt::coarse_review_days(probability)),
            review_interval_days: 1,
            review_count: 0,
            easiness_factor: INITIAL_EASINESS,
            consecutive_correct: 0,
            personal_best_latency_ms: None,
        }
    }

    /// Easiness factor, clamped on read regardless of what was persisted.
    pub fn easiness(&self) -> f64 {
        self.easiness_factor.clamp(MIN_EASINESS, MAX_EASINESS)
    }

    pub fn should_advance(&self) -> bool {
        self.probability >= ADVANCE_PROBABILITY
    }

    pub fn should_review(&self, now: DateTime<Utc>) -> bool {
        let stale = (now - self.last_practiced_at).num_days() > REVIEW_STALE_DAYS;
        stale && self.probability < REVIEW_PROBABILITY_CEILING
    }

    pub fn accuracy(&self) -> f64 {
        if self.practice_count > 0 {
            self.correct_count as f64 / self.practice_count as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bands() {
        assert_eq!(MasteryLevel::from_probability(0.0), MasteryLevel::Novice);
        assert_eq!(MasteryLevel::from_probability(0.3), MasteryLevel::Developing);
        assert_eq!(MasteryLevel::from_probability(0.5), MasteryLevel::Proficient);
        assert_eq!(MasteryLevel::from_probability(0.7), MasteryLevel::Advanced);
        assert_eq!(MasteryLevel::from_probability(0.9), MasteryLevel::Mastered);
        assert_eq!(MasteryLevel::from_probability(1.0), MasteryLevel::Mastered);
    }

    #[test]
    fn test_easiness_clamped_on_read() {
        let now = Utc::now();
        let mut record = MasteryRecord::new("s1", "c1", 0.3, now);
        record.easiness_factor = 9.0;
        assert_eq!(record.easiness(), MAX_EASINESS);
        record.easiness_factor = 0.1;
        assert_eq!(record.easiness(), MIN_EASINESS);
    }

    #[test]
    fn test_should_review_requires_staleness_and_low_probability() {
        let now = Utc::now();
        let mut record = MasteryRecord::new("s1", "c1", 0.4, now);
        assert!(!record.should_review(now + Duration::days(2)));
        assert!(record.should_review(now + Duration::days(4)));
        record.probability = 0.8;
        assert!(!record.should_review(now + Duration::days(4)));
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let record = MasteryRecord::new("s1", "FRAC-ADD", 0.55, Utc::now());
        let json = serde_json::to_string(&record).unwrap();
        let back: MasteryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.concept_id, "FRAC-ADD");
        assert_eq!(back.level, MasteryLevel::Proficient);
    }
}
