//! Property-based tests for the core invariants:
//! - knowledge tracing stays inside [0,1] and never produces NaN
//! - the scheduler keeps easiness bounded and intervals positive
//! - the diagnostic search terminates within its cap, asks nothing twice,
//!   and yields confidence inside [0.5, 0.99]

use proptest::prelude::*;
use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use tutor_core::diagnostic::placement;
use tutor_core::{
    bkt, scheduler, BktParams, ConceptNode, DiagnosticSession, MasteryRecord,
    OrderedConceptSpace, SchedulerParams,
};

// ============================================================================
// Generators
// ============================================================================

fn arb_probability() -> impl Strategy<Value = f64> {
    (0u64..=1000u64).prop_map(|v| v as f64 / 1000.0)
}

/// Parameter sets including the degenerate edges that zero the Bayesian
/// denominator at p ∈ {0, 1}.
fn arb_bkt_params() -> impl Strategy<Value = BktParams> {
    (
        (0u64..=1000u64).prop_map(|v| v as f64 / 1000.0), // p_learn
        (0u64..=500u64).prop_map(|v| v as f64 / 1000.0),  // p_guess
        (0u64..=500u64).prop_map(|v| v as f64 / 1000.0),  // p_slip
    )
        .prop_map(|(p_learn, p_guess, p_slip)| BktParams {
            p_learn,
            p_guess,
            p_slip,
            ..BktParams::default()
        })
}

fn concept_space(n: usize) -> OrderedConceptSpace {
    let nodes: Vec<ConceptNode> = (0..n)
        .map(|i| ConceptNode {
            code: format!("C{i:03}"),
            grade_rank: (i / 3) as i32,
            difficulty: (i % 3 + 1) as u8,
            title: format!("Concept {i}"),
            domain: "math".to_string(),
        })
        .collect();
    OrderedConceptSpace::from_nodes(nodes).expect("valid space")
}

fn record_at(probability: f64) -> MasteryRecord {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    MasteryRecord::new("s1", "c1", probability, now)
}

// ============================================================================
// Knowledge tracing
// ============================================================================

proptest! {
    #[test]
    fn bkt_update_stays_in_unit_interval(p in arb_probability(), correct in any::<bool>()) {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let next = bkt::update(&record_at(p), correct, now, &BktParams::default());
        prop_assert!(next.probability.is_finite());
        prop_assert!((0.0..=1.0).contains(&next.probability));
        prop_assert!(next.correct_count <= next.practice_count);
    }

    #[test]
    fn bkt_update_survives_degenerate_params(
        p in arb_probability(),
        correct in any::<bool>(),
        params in arb_bkt_params(),
    ) {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let next = bkt::update(&record_at(p), correct, now, &params);
        prop_assert!(next.probability.is_finite());
        prop_assert!((0.0..=1.0).contains(&next.probability));
    }

    #[test]
    fn bkt_correct_beats_incorrect(p in 1u64..=999u64) {
        let p = p as f64 / 1000.0;
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let params = BktParams::default();
        let up = bkt::update(&record_at(p), true, now, &params);
        let down = bkt::update(&record_at(p), false, now, &params);
        prop_assert!(up.probability > down.probability);
    }
}

// ============================================================================
// Scheduler
// ============================================================================

proptest! {
    #[test]
    fn scheduler_invariants_hold_for_any_history(outcomes in prop::collection::vec(any::<bool>(), 1..30)) {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let params = SchedulerParams::default();
        let mut record = record_at(0.9);
        for (i, &correct) in outcomes.iter().enumerate() {
            let update = scheduler::schedule_next(&record, correct, now, &params);
            prop_assert!(update.interval_days >= 1);
            prop_assert!((1.3..=2.5).contains(&update.easiness_factor));
            prop_assert_eq!(update.review_count, i as i32 + 1);
            if !correct {
                prop_assert_eq!(update.interval_days, 1);
            }
            record = scheduler::apply(&record, &update);
        }
    }
}

// ============================================================================
// Diagnostic search
// ============================================================================

proptest! {
    #[test]
    fn diagnostic_terminates_within_cap_without_repeats(
        n in 1usize..40,
        seed in 0usize..40,
        answers in prop::collection::vec(any::<bool>(), 40),
    ) {
        let space = concept_space(n);
        let mut session = DiagnosticSession::new("s1", None, space, seed % n, 20);
        let cap = session.question_cap;
        prop_assert_eq!(cap, n.min(20));

        let mut asked_codes = HashSet::new();
        let mut count = 0usize;
        loop {
            let code = match session.next_probe() {
                Some(probe) => probe.code.clone(),
                None => break,
            };
            prop_assert!(asked_codes.insert(code.clone()), "asked {} twice", code);
            session.record_answer(&code, answers[count]).unwrap();
            count += 1;
            prop_assert!(count <= cap);

            let result = placement::synthesize(&session);
            prop_assert!(result.confidence >= 0.5);
            prop_assert!(result.confidence <= 0.99);
        }

        prop_assert!(session.is_complete());
        prop_assert!(session.search_low <= session.search_high + 1);
        prop_assert!(session.confirmed_known.is_disjoint(&session.confirmed_unknown));
    }
}
