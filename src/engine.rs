//! Engine facade.
//!
//! Thin orchestration over the pure modules: owns the concept catalog, the
//! clock, and the tuning config, and exposes the operations a session
//! orchestrator drives. Every operation is load-compute-store: state comes
//! in from the caller, a new value goes back out. The caller serializes
//! writes per (student, concept) key; different students or concepts need
//! no coordination.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::bkt;
use crate::catalog::{ConceptCatalog, OrderedConceptSpace};
use crate::config::EngineConfig;
use crate::diagnostic::placement::{self, PlacementResult, SkillMap};
use crate::diagnostic::search::DiagnosticSession;
use crate::error::EngineError;
use crate::fluency::{self, DrillAssessment, DrillProgress, FlatlineCheck};
use crate::scheduler::{self, ScheduleUpdate};
use crate::types::{ConceptNode, MasteryRecord};

/// Injectable time source; swap in a fixed clock for deterministic tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl SystemClock {
    pub fn shared() -> Arc<dyn Clock> {
        Arc::new(SystemClock)
    }
}

/// Persistence seam for mastery records. The engine never touches storage
/// directly; it reads prior records for skill-map inference and hands new
/// values back to the caller.
pub trait MasteryStore {
    fn get(&self, student_id: &str, concept_id: &str) -> Option<MasteryRecord>;
    fn put(&mut self, record: MasteryRecord);
}

/// In-memory store, mainly for tests and single-process embedding.
#[derive(Debug, Default)]
pub struct MemoryMasteryStore {
    records: HashMap<(String, String), MasteryRecord>,
}

impl MemoryMasteryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MasteryStore for MemoryMasteryStore {
    fn get(&self, student_id: &str, concept_id: &str) -> Option<MasteryRecord> {
        self.records
            .get(&(student_id.to_string(), concept_id.to_string()))
            .cloned()
    }

    fn put(&mut self, record: MasteryRecord) {
        self.records
            .insert((record.student_id.clone(), record.concept_id.clone()), record);
    }
}

pub struct LearningEngine {
    catalog: Arc<dyn ConceptCatalog + Send + Sync>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl LearningEngine {
    pub fn new(catalog: Arc<dyn ConceptCatalog + Send + Sync>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(catalog, clock, EngineConfig::default())
    }

    pub fn with_config(
        catalog: Arc<dyn ConceptCatalog + Send + Sync>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open a diagnostic session. With a goal the space is the goal's
    /// required concepts seeded at its midpoint; otherwise the default
    /// curriculum slice seeded at the student's grade band.
    pub fn place_student(
        &self,
        student_id: &str,
        grade_level: i32,
        goal_id: Option<&str>,
    ) -> Result<DiagnosticSession, EngineError> {
        let (space, goal_id, first_probe) = match goal_id {
            Some(goal) => {
                let space = OrderedConceptSpace::for_goal(self.catalog.as_ref(), goal)?;
                let probe = space.midpoint();
                (space, Some(goal.to_string()), probe)
            }
            None => {
                let space = OrderedConceptSpace::from_default(self.catalog.as_ref())?;
                let probe = space.grade_midpoint(grade_level);
                (space, None, probe)
            }
        };
        tracing::info!(
            student_id,
            concepts = space.len(),
            first_probe,
            goal = goal_id.as_deref().unwrap_or("-"),
            "diagnostic session opened"
        );
        Ok(DiagnosticSession::new(
            student_id,
            goal_id,
            space,
            first_probe,
            self.config.diagnostic.max_questions,
        ))
    }

    /// Next concept to probe, or None once the session is complete.
    pub fn next_diagnostic_probe<'a>(
        &self,
        session: &'a mut DiagnosticSession,
    ) -> Option<&'a ConceptNode> {
        session.next_probe()
    }

    pub fn record_diagnostic_answer(
        &self,
        session: &mut DiagnosticSession,
        code: &str,
        correct: bool,
    ) -> Result<(), EngineError> {
        session.record_answer(code, correct)
    }

    pub fn finalize_placement(&self, session: &DiagnosticSession) -> PlacementResult {
        let result = placement::synthesize(session);
        tracing::info!(
            student_id = %session.student_id,
            frontier = %result.frontier_concept.code,
            confidence = result.confidence,
            gaps = result.gap_concepts.len(),
            "placement finalized"
        );
        result
    }

    /// Goal-aware finalization: the placement result plus a skill map over
    /// the whole space, with persisted prior records informing the
    /// untested entries.
    pub fn finalize_placement_with_skill_map(
        &self,
        session: &DiagnosticSession,
        store: &dyn MasteryStore,
    ) -> (PlacementResult, SkillMap) {
        let result = self.finalize_placement(session);
        let mut prior = HashMap::new();
        for concept in session.space.concepts() {
            if let Some(record) = store.get(&session.student_id, &concept.code) {
                prior.insert(concept.code.clone(), record);
            }
        }
        let map = placement::skill_map(session, &prior, &self.config.bkt);
        (result, map)
    }

    /// Mastery records seeded from direct placement evidence, ready for the
    /// caller to persist.
    pub fn seed_mastery_records(&self, session: &DiagnosticSession) -> Vec<MasteryRecord> {
        placement::seed_records(session, self.clock.now())
    }

    /// A fresh record at the prior for a never-observed concept.
    pub fn initial_record(&self, student_id: &str, concept_id: &str) -> MasteryRecord {
        MasteryRecord::new(
            student_id,
            concept_id,
            self.config.bkt.prior_known,
            self.clock.now(),
        )
    }

    pub fn record_practice_answer(&self, record: &MasteryRecord, correct: bool) -> MasteryRecord {
        let updated = bkt::update(record, correct, self.clock.now(), &self.config.bkt);
        if updated.level != record.level {
            tracing::debug!(
                student_id = %record.student_id,
                concept_id = %record.concept_id,
                from = record.level.as_str(),
                to = updated.level.as_str(),
                "mastery level changed"
            );
        }
        updated
    }

    pub fn record_practice_latency(&self, record: &MasteryRecord, latency_ms: u64) -> MasteryRecord {
        fluency::note_latency(record, latency_ms)
    }

    pub fn schedule_review(&self, record: &MasteryRecord, correct: bool) -> ScheduleUpdate {
        scheduler::schedule_next(record, correct, self.clock.now(), &self.config.scheduler)
    }

    pub fn apply_schedule(&self, record: &MasteryRecord, update: &ScheduleUpdate) -> MasteryRecord {
        scheduler::apply(record, update)
    }

    pub fn check_flatline(&self, latencies: &[u64]) -> FlatlineCheck {
        let check = fluency::check_flatline(latencies, &self.config.fluency);
        if check.is_flatline {
            tracing::debug!(
                cov = check.coefficient_of_variation,
                samples = check.sample_count,
                "latency flatline detected"
            );
        }
        check
    }

    pub fn assess_drill(&self, latencies: &[u64], progress: &DrillProgress) -> DrillAssessment {
        fluency::assess_drill(latencies, progress, &self.config.fluency)
    }
}
