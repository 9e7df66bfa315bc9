//! # tutor-core - adaptive tutoring core algorithms
//!
//! Pure Rust implementations of the decision engines behind an adaptive
//! tutoring product:
//!
//! - **Knowledge tracing** - per-concept mastery probability updated from
//!   each observed answer (guess/slip/learn model)
//! - **Diagnostic placement** - bounded frontier search over an ordered
//!   concept space, with result synthesis and a goal-aware skill map
//! - **Spaced repetition** - SM-2-style interval scheduling with an
//!   adaptive easiness factor
//! - **Fluency detection** - latency coefficient-of-variation plateau
//!   signal as an alternate drill-completion trigger
//!
//! ## Design
//!
//! Every engine is a pure, synchronous function over immutable inputs:
//! load the state, apply the function, store the result. There is no shared
//! mutable state, no blocking I/O, and no hidden randomness, so decisions
//! are deterministic and replayable, and computation parallelizes across
//! students with no coordination. The caller serializes the
//! load-compute-store cycle per (student, concept) key.
//!
//! ## Modules
//!
//! - [`bkt`] - Bayesian knowledge tracing update
//! - [`catalog`] - ordered concept spaces and the catalog seam
//! - [`diagnostic`] - frontier search and placement synthesis
//! - [`scheduler`] - spaced repetition scheduling
//! - [`fluency`] - plateau detection and drill completion
//! - [`engine`] - facade wiring catalog, clock, and config together
//! - [`config`] / [`types`] / [`error`] - parameters, domain types, errors
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use tutor_core::{bkt, BktParams, MasteryRecord};
//!
//! let params = BktParams::default();
//! let mut record = MasteryRecord::new("s1", "FRAC-ADD", params.prior_known, Utc::now());
//! for _ in 0..10 {
//!     record = bkt::update(&record, true, Utc::now(), &params);
//! }
//! assert!(record.should_advance());
//! ```

pub mod bkt;
pub mod catalog;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod fluency;
pub mod scheduler;
pub mod types;

pub use catalog::{ConceptCatalog, OrderedConceptSpace};
pub use config::{BktParams, DiagnosticParams, EngineConfig, FluencyParams, SchedulerParams};
pub use diagnostic::placement::{PlacementResult, SkillMap, SkillMapEntry, SkillStatus};
pub use diagnostic::search::{AskedResponse, DiagnosticSession, SearchStatus};
pub use engine::{Clock, LearningEngine, MasteryStore, MemoryMasteryStore, SystemClock};
pub use error::EngineError;
pub use fluency::{DrillAssessment, DrillProgress, FlatlineCheck};
pub use scheduler::ScheduleUpdate;
pub use types::{ConceptNode, MasteryLevel, MasteryRecord};
