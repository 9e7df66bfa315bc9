use thiserror::Error;

/// Failures surfaced by the engine. Exhausting the diagnostic search space is
/// deliberately absent: running out of probes is a normal terminal condition,
/// not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("goal {0} has no required concepts")]
    EmptyGoal(String),
    #[error("concept catalog returned no concepts")]
    EmptyCatalog,
    #[error("duplicate concept code in catalog: {0}")]
    DuplicateConcept(String),
    #[error("unknown concept code: {0}")]
    UnknownConcept(String),
    #[error("concept {0} was already answered in this diagnostic")]
    DuplicateAnswer(String),
}
