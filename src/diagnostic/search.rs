//! Knowledge-frontier search.
//!
//! Binary search over the concept space, with two deviations from the
//! textbook form:
//! - the first probe is seeded from the student's grade or the goal midpoint
//! - bounds move only from direct per-question evidence; nothing is
//!   re-derived from aggregates, so a noisily-ordered space cannot corrupt
//!   the bounds
//!
//! When the midpoint was already probed, selection scans outward with an
//! expanding offset until an unasked index inside the bounds is found. Both
//! directions exhausting the bounds completes the search early; that is a
//! normal terminal condition, not an error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::OrderedConceptSpace;
use crate::error::EngineError;
use crate::types::ConceptNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchStatus {
    InProgress,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskedResponse {
    pub code: String,
    pub correct: bool,
}

/// One in-flight diagnostic. A plain serializable value: the orchestrator
/// loads it, applies one step, and stores it back, so a pending diagnostic
/// survives across requests with no in-memory session affinity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSession {
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    pub space: OrderedConceptSpace,
    pub asked: Vec<AskedResponse>,
    pub search_low: i32,
    pub search_high: i32,
    pub confirmed_known: BTreeSet<usize>,
    pub confirmed_unknown: BTreeSet<usize>,
    pub status: SearchStatus,
    pub question_cap: usize,
    pub first_probe: usize,
}

impl DiagnosticSession {
    pub fn new(
        student_id: impl Into<String>,
        goal_id: Option<String>,
        space: OrderedConceptSpace,
        first_probe: usize,
        max_questions: usize,
    ) -> Self {
        let question_cap = max_questions.min(space.len());
        let search_high = space.len() as i32 - 1;
        let first_probe = first_probe.min(space.len().saturating_sub(1));
        Self {
            student_id: student_id.into(),
            goal_id,
            space,
            asked: Vec::new(),
            search_low: 0,
            search_high,
            confirmed_known: BTreeSet::new(),
            confirmed_unknown: BTreeSet::new(),
            status: SearchStatus::InProgress,
            question_cap,
            first_probe,
        }
    }

    pub fn questions_asked(&self) -> usize {
        self.asked.len()
    }

    pub fn is_complete(&self) -> bool {
        self.status == SearchStatus::Complete
    }

    fn is_probed(&self, index: usize) -> bool {
        self.confirmed_known.contains(&index) || self.confirmed_unknown.contains(&index)
    }

    /// Pick the next probe index, or None when the search is over: cap
    /// reached, bounds crossed, or no unasked index left inside the bounds.
    pub fn select_next(&self) -> Option<usize> {
        if self.status == SearchStatus::Complete
            || self.asked.len() >= self.question_cap
            || self.search_low > self.search_high
        {
            return None;
        }

        // First question starts from the grade/goal-informed seed; afterwards
        // the probe is the midpoint of the remaining bounds.
        let mid = if self.asked.is_empty() {
            (self.first_probe as i32).clamp(self.search_low, self.search_high)
        } else {
            (self.search_low + self.search_high) / 2
        };
        if !self.is_probed(mid as usize) {
            return Some(mid as usize);
        }

        // Linear probing around the midpoint, alternating above/below. The
        // offset never exceeds the span, so the loop is bounded by the space
        // size.
        let span = self.search_high - self.search_low;
        for offset in 1..=span.max(0) {
            for candidate in [mid + offset, mid - offset] {
                if candidate < self.search_low || candidate > self.search_high {
                    continue;
                }
                if !self.is_probed(candidate as usize) {
                    return Some(candidate as usize);
                }
            }
        }
        None
    }

    /// Next concept to ask, marking the session complete when nothing
    /// remains to probe.
    pub fn next_probe(&mut self) -> Option<&ConceptNode> {
        match self.select_next() {
            Some(index) => self.space.get(index),
            None => {
                self.status = SearchStatus::Complete;
                None
            }
        }
    }

    /// Apply one answer. Correct evidence raises the low bound past the
    /// probed index; incorrect evidence lowers the high bound below it.
    pub fn record_answer(&mut self, code: &str, correct: bool) -> Result<(), EngineError> {
        let index = self
            .space
            .index_of(code)
            .ok_or_else(|| EngineError::UnknownConcept(code.to_string()))?;
        if self.is_probed(index) {
            return Err(EngineError::DuplicateAnswer(code.to_string()));
        }

        self.asked.push(AskedResponse {
            code: code.to_string(),
            correct,
        });

        let signed = index as i32;
        if correct {
            self.confirmed_known.insert(index);
            self.search_low = self.search_low.max(signed + 1);
        } else {
            self.confirmed_unknown.insert(index);
            self.search_high = self.search_high.min(signed - 1);
        }

        if self.asked.len() >= self.question_cap || self.search_low > self.search_high {
            self.status = SearchStatus::Complete;
        }
        Ok(())
    }
}
