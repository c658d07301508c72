//! Structural consistency checks for debug builds.
//!
//! Violations of the invariants checked here are programmer bugs, never input errors, so the
//! checks run as assertions between search steps in debug builds and are compiled out of
//! release builds.
use std::collections::BTreeMap;

use partial_ref::{partial, PartialRef};

use chronosat_formula::Lit;

use crate::clause::ClauseRef;
use crate::context::{parts::*, Context};
use crate::prop::AssignmentKind;

/// Check the invariants tying together assignment, trail, clauses and watchlists.
///
/// Has to run between top level search steps, where no conflict is pending; a pending conflict
/// is the one transient state where a clause may have both watched literals false.
pub fn check_solver_invariants(
    ctx: partial!(Context, AssignmentP, ClauseAllocP, ClauseDbP, TrailP, WatchlistsP),
) {
    let assignment = ctx.part(AssignmentP);
    let alloc = ctx.part(ClauseAllocP);
    let db = ctx.part(ClauseDbP);
    let trail = ctx.part(TrailP);
    let watchlists = ctx.part(WatchlistsP);

    // The processed trail prefix is asserted, the queued suffix is not, and nothing on the
    // trail sits above the current decision level.
    for (position, &lit) in trail.trail().iter().enumerate() {
        if position < trail.propagated_len() {
            assert!(
                assignment.lit_is_satisfied(lit),
                "processed trail entry {:?} is not asserted",
                lit
            );
        } else {
            assert!(
                assignment.lit_is_queued(lit),
                "queued trail entry {:?} is asserted",
                lit
            );
        }
        assert!(
            (assignment.level(lit.var()) as usize) <= trail.current_level(),
            "trail entry {:?} has a level above the current one",
            lit
        );
    }

    // Exactly the variables on the trail carry a value.
    let assigned = assignment
        .assignment()
        .iter()
        .filter(|value| value.is_some())
        .count();
    assert_eq!(assigned, trail.trail().len(), "assignment and trail disagree");

    // Each open level is headed by a decision recorded at that level.
    for level in 1..=trail.current_level() {
        let decision = trail.decision_at_level(level);
        assert_eq!(
            assignment.kind(decision.var()),
            AssignmentKind::Decision,
            "level {} is not headed by a decision",
            level
        );
        assert_eq!(
            assignment.level(decision.var()) as usize,
            level,
            "decision {:?} recorded at the wrong level",
            decision
        );
    }

    let mut extinct_count = 0;
    let live_clauses: Vec<ClauseRef> = db
        .input_clauses()
        .iter()
        .chain(db.learned_clauses().iter())
        .cloned()
        .filter(|&cref| {
            let extinct = alloc.header(cref).is_extinct();
            extinct_count += extinct as usize;
            !extinct
        })
        .collect();

    assert_eq!(
        extinct_count,
        db.extinct_count(),
        "extinction counter is stale"
    );

    // Watched slots of a live clause are never both false between search steps.
    for &cref in live_clauses.iter() {
        let lits = alloc.clause(cref).lits();
        assert!(
            !(assignment.lit_is_false(lits[0]) && assignment.lit_is_false(lits[1])),
            "both watched literals of {:?} are false",
            lits
        );
    }

    // Every live clause is watched through exactly its two leading literals, and every live
    // watch entry points back at a clause with the watched literal in front. Stale entries of
    // extinguished clauses are allowed to linger.
    let mut watch_entries: BTreeMap<(ClauseRef, usize), usize> = BTreeMap::new();

    for code in 0..assignment.var_count() * 2 {
        let trigger = Lit::from_code(code);
        for watch in watchlists.watched_by(trigger) {
            let clause = alloc.clause(watch.cref);
            if clause.header().is_extinct() {
                continue;
            }
            let watched = !trigger;
            assert!(
                clause.lits()[0] == watched || clause.lits()[1] == watched,
                "watch entry of {:?} does not match the watched slots of {:?}",
                watched,
                clause.lits()
            );
            assert!(
                clause.lits().contains(&watch.blocking),
                "blocking literal {:?} is not part of {:?}",
                watch.blocking,
                clause.lits()
            );
            *watch_entries
                .entry((watch.cref, watched.code()))
                .or_insert(0) += 1;
        }
    }

    for &cref in live_clauses.iter() {
        let lits = alloc.clause(cref).lits();
        for &watched in &lits[..2] {
            assert_eq!(
                watch_entries.get(&(cref, watched.code())).cloned(),
                Some(1),
                "clause {:?} is not watched through {:?} exactly once",
                lits,
                watched
            );
        }
    }

    // The occurrence counts match the live clauses exactly.
    let mut occurrence = vec![0; assignment.var_count() * 2];
    for &cref in live_clauses.iter() {
        for &lit in alloc.clause(cref).lits() {
            occurrence[lit.code()] += 1;
        }
    }
    for (code, &count) in occurrence.iter().enumerate() {
        assert_eq!(
            count,
            db.occurrence(Lit::from_code(code)),
            "occurrence count of {:?} is stale",
            Lit::from_code(code)
        );
    }
}
