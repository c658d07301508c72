//! Boolean satisfiability solver.
use std::io;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use anyhow::Error;
use log::info;

use chronosat_dimacs::DimacsParser;
use chronosat_formula::{CnfFormula, Lit};

use crate::cdcl::search;
use crate::config::SolverConfigUpdate;
use crate::context::{ensure_var_count, parts::*, Context};
use crate::load::load_clause;
use crate::state::SatState;
use crate::stats::Stats;

/// A boolean satisfiability solver.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Change the solver configuration.
    pub fn config(&mut self, update: &SolverConfigUpdate) {
        self.ctx.solver_config.apply(update);
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Reads and adds a formula in DIMACS CNF format.
    ///
    /// Using this avoids creating a temporary [`CnfFormula`].
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        let parser = DimacsParser::parse_incremental(input, |parser| {
            self.add_formula(&parser.take_formula());
            Ok(())
        })?;

        info!(
            "parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        Ok(())
    }

    /// Decide the satisfiability of the loaded formula.
    pub fn solve(&mut self) -> bool {
        let (verdict, check_model) = {
            let mut ctx = self.ctx.into_partial_ref_mut();

            if ctx.part(SolverStateP).sat_state == SatState::Unknown {
                search(ctx.borrow());
            }

            (
                ctx.part(SolverStateP).sat_state == SatState::Sat,
                ctx.part(SolverConfigP).check_model,
            )
        };

        if verdict && check_model {
            assert!(
                self.model_satisfies_stored_clauses(),
                "stored formula not satisfied by the found assignment"
            );
        }

        verdict
    }

    /// Set of literals that satisfy the formula.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).sat_state == SatState::Sat {
            Some(
                ctx.part(AssignmentP)
                    .assignment()
                    .iter()
                    .enumerate()
                    .flat_map(|(index, assignment)| {
                        assignment.map(|value| Lit::from_index(index, value))
                    })
                    .collect(),
            )
        } else {
            None
        }
    }

    /// Counters tracked during the search.
    pub fn stats(&self) -> Stats {
        self.ctx.stats
    }

    /// Whether every stored clause has a true literal under the current assignment.
    ///
    /// Extinct clauses are satisfied by a root level assignment, which is never undone, so they
    /// are checked the same way as live ones.
    fn model_satisfies_stored_clauses(&self) -> bool {
        let ctx = self.ctx.into_partial_ref();
        let alloc = ctx.part(ClauseAllocP);
        let assignment = ctx.part(AssignmentP);

        ctx.part(ClauseDbP).input_clauses().iter().all(|&cref| {
            alloc
                .clause(cref)
                .lits()
                .iter()
                .any(|&lit| assignment.lit_is_true(lit))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use chronosat_dimacs::write_dimacs;
    use chronosat_formula::{
        cnf_formula,
        test::{pigeon_hole_formula, sat_formula},
    };

    #[test]
    fn empty_formula_is_sat() {
        let mut solver = Solver::new();
        assert!(solver.solve());
        assert_eq!(solver.model(), Some(vec![]));
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut solver = Solver::new();
        solver.add_formula(&CnfFormula::from(Some(Vec::<Lit>::new())));
        assert!(!solver.solve());
        assert_eq!(solver.model(), None);
    }

    #[test]
    fn empty_clause_via_dimacs_is_unsat() {
        let mut solver = Solver::new();
        solver.add_dimacs_cnf(&b"p cnf 0 1\n0\n"[..]).unwrap();
        assert!(!solver.solve());
    }

    #[test]
    fn consistent_units_are_sat_without_decisions() {
        let mut solver = Solver::new();
        solver.add_formula(&cnf_formula![
            1;
            -2;
            3;
        ]);
        assert!(solver.solve());

        let stats = solver.stats();
        assert_eq!(stats.decisions, 0);
        assert_eq!(stats.conflicts, 0);

        let model = solver.model().unwrap();
        assert!(model.contains(&chronosat_formula::lit!(1)));
        assert!(model.contains(&chronosat_formula::lit!(-2)));
        assert!(model.contains(&chronosat_formula::lit!(3)));
    }

    #[test]
    fn contradicting_units_are_unsat_without_conflicts() {
        let mut solver = Solver::new();
        solver.add_formula(&cnf_formula![
            1;
            -1;
        ]);
        assert!(!solver.solve());
        assert_eq!(solver.stats().conflicts, 0);
    }

    #[test]
    fn check_model_is_a_noop_on_correct_models() {
        let mut solver = Solver::new();

        let update: SolverConfigUpdate = toml::from_str("check_model = true").unwrap();
        solver.config(&update);

        solver.add_formula(&cnf_formula![
            1, 2;
            -1, 3;
            -2, -3, 1;
        ]);
        assert!(solver.solve());
    }

    proptest! {
        #[test]
        fn pigeon_hole_unsat(formula in pigeon_hole_formula(1..5usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert!(!solver.solve());
            prop_assert!(solver.stats().conflicts > 0);
        }

        #[test]
        fn sat(formula in sat_formula(4..15usize, 5..60usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert!(solver.solve());

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sat_via_dimacs(formula in sat_formula(4..15usize, 5..60usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            let mut dimacs = vec![];

            write_dimacs(&mut dimacs, &formula).unwrap();

            solver.add_dimacs_cnf(&mut &dimacs[..]).unwrap();

            prop_assert!(solver.solve());

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }
    }
}
