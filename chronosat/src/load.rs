//! Loading a formula into the solver.
use partial_ref::{partial, PartialRef};

use chronosat_formula::Lit;

use crate::clause::db;
use crate::context::{parts::*, Context};
use crate::prop::{enqueue_assignment, AssignmentKind};
use crate::state::SatState;

/// Adds a clause to the current formula.
///
/// Removes duplicated literals and ignores tautological clauses (eg. x v -x v y). An empty
/// clause makes the formula unsatisfiable, a unit clause is queued as a root level propagation
/// and never stored, everything wider is stored with its first two literals watched.
///
/// Does not adjust the solver's variable count. If necessary that has to be done before calling
/// this.
pub fn load_clause(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lits: &[Lit],
) {
    if ctx.part(SolverStateP).sat_state == SatState::Unsat {
        return;
    }

    let (tmp_data, mut ctx) = ctx.split_part_mut(TmpDataP);

    tmp_data.lits.clear();
    tmp_data.lits.extend_from_slice(lits);
    let lits = &mut tmp_data.lits;

    lits.sort_unstable();
    lits.dedup();

    // Complementary literals are adjacent after sorting by code.
    let mut last = None;
    for &lit in lits.iter() {
        if last == Some(!lit) {
            return;
        }
        last = Some(lit);
    }

    match lits[..] {
        [] => ctx.part_mut(SolverStateP).sat_state = SatState::Unsat,
        [lit] => match ctx.part(AssignmentP).lit_value(lit) {
            Some(false) => ctx.part_mut(SolverStateP).sat_state = SatState::Unsat,
            Some(true) => {}
            None => enqueue_assignment(ctx.borrow(), lit, AssignmentKind::Propagation),
        },
        _ => {
            db::add_clause(ctx.borrow(), false, lits);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use chronosat_formula::{lit, lits};

    use crate::context::set_var_count;

    #[test]
    fn unsat_on_empty_clause() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &[]);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
    }

    #[test]
    fn unit_clauses() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &lits![1]);

        assert_eq!(ctx.part(TrailP).trail().len(), 1);

        load_clause(ctx.borrow(), &lits![3, -3]);

        assert_eq!(ctx.part(TrailP).trail().len(), 1);

        load_clause(ctx.borrow(), &lits![-2]);

        assert_eq!(ctx.part(TrailP).trail().len(), 2);

        load_clause(ctx.borrow(), &lits![1, 1]);

        assert_eq!(ctx.part(TrailP).trail().len(), 2);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);

        load_clause(ctx.borrow(), &lits![2]);

        assert_eq!(ctx.part(TrailP).trail().len(), 2);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
    }

    #[test]
    fn stored_clauses() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 10);

        load_clause(ctx.borrow(), &lits![1, 2]);

        assert_eq!(ctx.part(ClauseDbP).input_clauses().len(), 1);

        load_clause(ctx.borrow(), &lits![-2, 3, 3, 4]);

        assert_eq!(ctx.part(ClauseDbP).input_clauses().len(), 2);

        load_clause(ctx.borrow(), &lits![4, -5, 5, 2]);

        assert_eq!(ctx.part(ClauseDbP).input_clauses().len(), 2);

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);

        // Duplicates are removed before the clause is stored.
        let stored = ctx.part(ClauseDbP).input_clauses()[1];
        assert_eq!(ctx.part(ClauseAllocP).clause(stored).lits().len(), 3);

        assert_eq!(ctx.part(ClauseDbP).occurrence(lit!(2)), 1);
        assert_eq!(ctx.part(ClauseDbP).occurrence(lit!(-2)), 1);
        assert_eq!(ctx.part(ClauseDbP).occurrence(lit!(4)), 1);
    }
}
