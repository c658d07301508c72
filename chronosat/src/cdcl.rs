//! The conflict driven search loop.
use log::info;

use partial_ref::{partial, PartialRef};

use crate::context::{parts::*, Context};
use crate::decision::make_decision;
use crate::prop::{propagate, Conflict};
use crate::repair::{repair_conflict, RepairResult};
use crate::state::SatState;
use crate::verify::check_solver_invariants;

/// States of the search state machine.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Step {
    /// Pick and queue the next decision, or finish when all variables are assigned.
    Decide,
    /// Drain the propagation queue.
    Propagate,
    /// Undo the most recent decision, or finish when there is none.
    Conflict(Conflict),
    /// All variables assigned with the queue drained, the assignment is a model.
    Success,
}

/// Run the search until the formula is solved.
///
/// Leaves the verdict in [`SolverState`](crate::state::SolverState). Each round trip through
/// the states is driven by this single dispatch loop; there is no other control flow between
/// the solver components.
pub fn search(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut SolverStateP,
        mut StatsP,
        mut TmpDataP,
        mut TrailP,
        mut WatchlistsP,
        SolverConfigP,
    ),
) {
    let mut step = if ctx.part(TrailP).fully_propagated() {
        Step::Decide
    } else {
        // The loader queued unit clauses which still need their consequences.
        Step::Propagate
    };

    loop {
        step = match step {
            Step::Decide => {
                if make_decision(ctx.borrow()) {
                    Step::Propagate
                } else {
                    Step::Success
                }
            }
            Step::Propagate => match propagate(ctx.borrow()) {
                Ok(()) => Step::Decide,
                Err(conflict) => Step::Conflict(conflict),
            },
            Step::Conflict(conflict) => match repair_conflict(ctx.borrow(), conflict) {
                RepairResult::Unsat => {
                    ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
                    return;
                }
                RepairResult::Repaired => {
                    log_progress(ctx.borrow());
                    Step::Propagate
                }
            },
            Step::Success => {
                ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
                return;
            }
        };

        // A pending conflict is the one transient state where a clause may have both watched
        // literals false, so the consistency checks skip it.
        if cfg!(debug_assertions) && !matches!(step, Step::Conflict(_)) {
            check_solver_invariants(ctx.borrow());
        }
    }
}

/// Emit a progress line every configured number of conflicts.
fn log_progress(ctx: partial!(Context, SolverConfigP, StatsP)) {
    let interval = ctx.part(SolverConfigP).progress_log_interval;
    let stats = ctx.part(StatsP);

    if interval > 0 && stats.conflicts % interval == 0 {
        info!(
            "conflicts: {} decisions: {} propagations: {} learned: {}",
            stats.conflicts, stats.decisions, stats.propagations, stats.learned_clauses
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use partial_ref::IntoPartialRefMut;

    use chronosat_formula::{
        cnf_formula,
        test::{pigeon_hole_formula, sat_formula},
        CnfFormula,
    };

    use crate::context::set_var_count;
    use crate::load::load_clause;

    fn load_and_solve(ctx: &mut Context, formula: &CnfFormula) {
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), formula.var_count());

        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }

        if ctx.part(SolverStateP).sat_state == SatState::Unknown {
            search(ctx.borrow());
        }
    }

    #[test]
    fn level_0_unsat() {
        let mut ctx = Context::default();

        let formula = cnf_formula![
            1, 2, 3;
            -1;
            1, -2;
            2, -3;
        ];

        load_and_solve(&mut ctx, &formula);

        let ctx = ctx.into_partial_ref_mut();
        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
        assert_eq!(ctx.part(StatsP).conflicts, 1);
    }

    #[test]
    fn stepwise_search_upholds_invariants() {
        let mut ctx = Context::default();

        // All eight sign combinations over three variables, so every branch of the search tree
        // ends in a conflict and repair has to walk all the way back up.
        let formula = cnf_formula![
            1, 2, 3;
            1, 2, -3;
            1, -2, 3;
            1, -2, -3;
            -1, 2, 3;
            -1, 2, -3;
            -1, -2, 3;
            -1, -2, -3;
        ];

        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), formula.var_count());

        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }

        let mut step = Step::Propagate;
        let mut unsat = false;
        let mut rounds = 0;

        loop {
            step = match step {
                Step::Decide => {
                    if make_decision(ctx.borrow()) {
                        Step::Propagate
                    } else {
                        Step::Success
                    }
                }
                Step::Propagate => match propagate(ctx.borrow()) {
                    Ok(()) => Step::Decide,
                    Err(conflict) => Step::Conflict(conflict),
                },
                Step::Conflict(conflict) => match repair_conflict(ctx.borrow(), conflict) {
                    RepairResult::Unsat => {
                        unsat = true;
                        break;
                    }
                    RepairResult::Repaired => Step::Propagate,
                },
                Step::Success => break,
            };

            // A pending conflict is the one transient state where a clause may have both
            // watched literals false.
            if !matches!(step, Step::Conflict(_)) {
                check_solver_invariants(ctx.borrow());
            }

            rounds += 1;
            assert!(rounds < 1000, "search does not terminate");
        }

        assert!(unsat);
        assert!(ctx.part(StatsP).learned_clauses > 0);
        assert!(ctx.part(StatsP).conflicts >= 4);
    }

    #[test]
    fn counters_track_the_search() {
        let mut ctx = Context::default();

        // Needs at least one conflict before the right branch is found.
        let formula = cnf_formula![
            1, 2;
            -1, 2;
            -2;
        ];

        load_and_solve(&mut ctx, &formula);

        let ctx = ctx.into_partial_ref_mut();
        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
        assert!(ctx.part(StatsP).conflicts >= 1);
    }

    proptest! {
        #[test]
        fn pigeon_hole_unsat(formula in pigeon_hole_formula(1..5usize)) {
            let mut ctx = Context::default();

            load_and_solve(&mut ctx, &formula);

            let ctx = ctx.into_partial_ref_mut();
            prop_assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
        }

        #[test]
        fn sat(formula in sat_formula(4..15usize, 5..60usize, 0.05..0.2, 0.9..1.0)) {
            let mut ctx = Context::default();

            load_and_solve(&mut ctx, &formula);

            let ctx = ctx.into_partial_ref_mut();
            prop_assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Sat);

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|&lit| ctx.part(AssignmentP).lit_is_true(lit)));
            }
        }
    }
}
