//! Ordered concept spaces.
//!
//! A diagnostic session runs against one immutable `OrderedConceptSpace`,
//! built either from the default curriculum slice or from a goal's required
//! concepts. Both paths produce the same value, so nothing downstream needs
//! to know which mode produced it.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::ConceptNode;

/// Read side of the concept-graph store.
pub trait ConceptCatalog {
    /// The default curriculum slice, in catalog order.
    fn default_ordering(&self) -> Vec<ConceptNode>;
    /// Concepts required by a goal, in catalog order. Fails when the goal is
    /// unknown.
    fn ordered_by_goal(&self, goal_id: &str) -> Result<Vec<ConceptNode>, EngineError>;
}

/// Index-addressable concept sequence, strictly sorted by
/// (grade rank, difficulty), with unique codes. Built once per diagnostic
/// session and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedConceptSpace {
    concepts: Vec<ConceptNode>,
}

impl OrderedConceptSpace {
    /// Build from the default curriculum slice.
    pub fn from_default(catalog: &dyn ConceptCatalog) -> Result<Self, EngineError> {
        Self::from_nodes(catalog.default_ordering())
    }

    /// Build from a goal's required-concept set.
    pub fn for_goal(catalog: &dyn ConceptCatalog, goal_id: &str) -> Result<Self, EngineError> {
        let nodes = catalog.ordered_by_goal(goal_id)?;
        if nodes.is_empty() {
            return Err(EngineError::EmptyGoal(goal_id.to_string()));
        }
        Self::from_nodes(nodes)
    }

    /// Sort and validate a raw concept list. Empty input and duplicate codes
    /// fail fast; no partial space is ever produced.
    pub fn from_nodes(mut nodes: Vec<ConceptNode>) -> Result<Self, EngineError> {
        if nodes.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }
        nodes.sort_by(|a, b| {
            (a.grade_rank, a.difficulty).cmp(&(b.grade_rank, b.difficulty))
        });
        let mut codes: Vec<&str> = nodes.iter().map(|n| n.code.as_str()).collect();
        codes.sort_unstable();
        for pair in codes.windows(2) {
            if pair[0] == pair[1] {
                return Err(EngineError::DuplicateConcept(pair[0].to_string()));
            }
        }
        Ok(Self { concepts: nodes })
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn concepts(&self) -> &[ConceptNode] {
        &self.concepts
    }

    pub fn get(&self, index: usize) -> Option<&ConceptNode> {
        self.concepts.get(index)
    }

    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.concepts.iter().position(|c| c.code == code)
    }

    /// Middle index of the space; the seed probe for goal-derived sessions.
    pub fn midpoint(&self) -> usize {
        self.concepts.len() / 2
    }

    /// Middle index of the band matching `grade_rank`. When the grade has no
    /// concepts the nearest edge is used: the first concept of the next grade
    /// up, or the last index when the grade is above everything in the space.
    pub fn grade_midpoint(&self, grade_rank: i32) -> usize {
        let first = self.concepts.iter().position(|c| c.grade_rank == grade_rank);
        if let Some(first) = first {
            let last = self
                .concepts
                .iter()
                .rposition(|c| c.grade_rank == grade_rank)
                .unwrap_or(first);
            (first + last) / 2
        } else if let Some(next) = self.concepts.iter().position(|c| c.grade_rank > grade_rank) {
            next
        } else {
            self.concepts.len() - 1
        }
    }
}
