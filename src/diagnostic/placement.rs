//! Placement result synthesis.
//!
//! Pure projections of a terminal diagnostic state: the frontier concept, a
//! confidence score, the gap list, and (goal-aware mode) a per-concept skill
//! map with estimated remaining effort. No hidden randomness; the same
//! terminal state always yields the same result.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::BktParams;
use crate::diagnostic::search::DiagnosticSession;
use crate::types::{ConceptNode, MasteryRecord};

const CONFIDENCE_FLOOR: f64 = 0.5;
const CONFIDENCE_CAP: f64 = 0.99;
const RANGE_WEIGHT: f64 = 0.3;
const COVERAGE_WEIGHT: f64 = 0.2;

/// Seed probabilities for mastery records created from placement evidence.
pub const SEED_KNOWN_PROBABILITY: f64 = 0.9;
pub const SEED_GAP_PROBABILITY: f64 = 0.15;
/// Estimate for untested concepts below the frontier.
const INFERRED_MASTERED_PROBABILITY: f64 = 0.75;
/// A persisted record below this probability contradicts an inferred
/// "likely mastered" tag.
const CONTRADICTION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResult {
    pub frontier_concept: ConceptNode,
    pub grade_estimate: i32,
    pub confidence: f64,
    pub mastered_concepts: Vec<String>,
    pub gap_concepts: Vec<String>,
    pub recommended_start_concept: ConceptNode,
    pub summary: String,
    pub questions_asked: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillStatus {
    /// Demonstrated in this diagnostic.
    Mastered,
    /// Missed in this diagnostic.
    Unmastered,
    /// Untested, below the frontier.
    LikelyMastered,
    /// Untested, at or beyond the frontier.
    LikelyUnmastered,
}

impl SkillStatus {
    pub fn is_mastered(&self) -> bool {
        matches!(self, Self::Mastered | Self::LikelyMastered)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMapEntry {
    pub code: String,
    pub title: String,
    pub difficulty: u8,
    pub status: SkillStatus,
    pub probability: f64,
    pub estimated_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMap {
    pub entries: Vec<SkillMapEntry>,
    pub estimated_hours_remaining: f64,
}

/// The frontier: one past the highest demonstrated index, clamped to the
/// space; index 0 when nothing was demonstrated.
pub(crate) fn frontier_index(session: &DiagnosticSession) -> usize {
    session
        .confirmed_known
        .iter()
        .next_back()
        .map(|&highest| (highest + 1).min(session.space.len() - 1))
        .unwrap_or(0)
}

/// Synthesize the placement result from terminal search state.
pub fn synthesize(session: &DiagnosticSession) -> PlacementResult {
    let space = &session.space;
    let n = space.len();
    let frontier_index = frontier_index(session);
    let frontier_concept = space.concepts()[frontier_index].clone();

    // Narrower surviving bounds and more questions asked both mean more
    // certainty; the base keeps the floor at 0.5.
    let remaining = (session.search_high - session.search_low + 1).max(0) as f64;
    let coverage = if session.question_cap > 0 {
        session.questions_asked() as f64 / session.question_cap as f64
    } else {
        0.0
    };
    let confidence = (CONFIDENCE_FLOOR
        + RANGE_WEIGHT * (1.0 - remaining / n as f64)
        + COVERAGE_WEIGHT * coverage)
        .min(CONFIDENCE_CAP);

    let mastered_concepts: Vec<String> = session
        .confirmed_known
        .iter()
        .map(|&i| space.concepts()[i].code.clone())
        .collect();

    // A confirmed miss counts as a gap only behind the frontier; the frontier
    // concept itself is neither gap nor mastered.
    let gap_concepts: Vec<String> = session
        .confirmed_unknown
        .iter()
        .filter(|&&i| i < frontier_index)
        .map(|&i| space.concepts()[i].code.clone())
        .collect();

    let recommended_start_concept = gap_concepts
        .first()
        .and_then(|code| space.index_of(code))
        .map(|i| space.concepts()[i].clone())
        .unwrap_or_else(|| frontier_concept.clone());

    let summary = format!(
        "Frontier at {} ({}) with {:.0}% confidence after {} questions; {} demonstrated, {} gaps to close",
        frontier_concept.code,
        frontier_concept.title,
        confidence * 100.0,
        session.questions_asked(),
        mastered_concepts.len(),
        gap_concepts.len(),
    );

    PlacementResult {
        grade_estimate: frontier_concept.grade_rank,
        confidence,
        mastered_concepts,
        gap_concepts,
        recommended_start_concept,
        summary,
        questions_asked: session.questions_asked(),
        frontier_concept,
    }
}

/// Estimated hours to learn a concept of the given difficulty. Monotonic in
/// difficulty.
pub fn estimated_hours(difficulty: u8) -> f64 {
    match difficulty {
        0 | 1 => 0.5,
        2 => 1.0,
        3 => 1.5,
        4 => 2.0,
        5 => 3.0,
        6 => 4.0,
        7 => 5.5,
        8 => 7.0,
        9 => 9.0,
        _ => 12.0,
    }
}

/// Goal-aware projection: one entry per concept in the space. Tested
/// concepts are tagged from evidence; untested concepts are inferred from
/// their position relative to the frontier, with persisted prior records
/// overriding the inferred estimate.
pub fn skill_map(
    session: &DiagnosticSession,
    prior: &HashMap<String, MasteryRecord>,
    params: &BktParams,
) -> SkillMap {
    let frontier_index = frontier_index(session);
    let mut entries = Vec::with_capacity(session.space.len());

    for (index, concept) in session.space.concepts().iter().enumerate() {
        let (status, probability) = if session.confirmed_known.contains(&index) {
            (SkillStatus::Mastered, SEED_KNOWN_PROBABILITY)
        } else if session.confirmed_unknown.contains(&index) {
            (SkillStatus::Unmastered, SEED_GAP_PROBABILITY)
        } else if index < frontier_index {
            match prior.get(&concept.code) {
                Some(record) if record.probability < CONTRADICTION_THRESHOLD => {
                    (SkillStatus::LikelyUnmastered, record.probability)
                }
                Some(record) => (SkillStatus::LikelyMastered, record.probability),
                None => (SkillStatus::LikelyMastered, INFERRED_MASTERED_PROBABILITY),
            }
        } else {
            let probability = prior
                .get(&concept.code)
                .map(|record| record.probability)
                .unwrap_or(params.prior_known);
            (SkillStatus::LikelyUnmastered, probability)
        };

        let hours = if status.is_mastered() {
            0.0
        } else {
            estimated_hours(concept.difficulty)
        };
        entries.push(SkillMapEntry {
            code: concept.code.clone(),
            title: concept.title.clone(),
            difficulty: concept.difficulty,
            status,
            probability,
            estimated_hours: hours,
        });
    }

    let estimated_hours_remaining = entries.iter().map(|e| e.estimated_hours).sum();
    SkillMap {
        entries,
        estimated_hours_remaining,
    }
}

/// Seed mastery records from direct placement evidence. Only tested concepts
/// get records; inferred tags live in the skill map until the concept is
/// actually observed in practice.
pub fn seed_records(session: &DiagnosticSession, now: DateTime<Utc>) -> Vec<MasteryRecord> {
    let space = &session.space;
    let mut records = Vec::with_capacity(session.questions_asked());
    for &index in &session.confirmed_known {
        records.push(MasteryRecord::new(
            session.student_id.clone(),
            space.concepts()[index].code.clone(),
            SEED_KNOWN_PROBABILITY,
            now,
        ));
    }
    for &index in &session.confirmed_unknown {
        records.push(MasteryRecord::new(
            session.student_id.clone(),
            space.concepts()[index].code.clone(),
            SEED_GAP_PROBABILITY,
            now,
        ));
    }
    records
}
