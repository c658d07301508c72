use std::collections::HashSet;

use chronosat::dimacs::DimacsParser;
use chronosat::{Lit, Solver};

macro_rules! test_cnf {
    ($name:ident, $result:expr) => {
        #[test]
        fn $name() {
            let _ = env_logger::builder().is_test(true).try_init();
            let cnf = include_bytes!(concat!("cnfs/", stringify!($name), ".cnf"));
            let formula = DimacsParser::parse(&cnf[..]).expect("parsing failed");
            let mut solver = Solver::new();
            solver.add_formula(&formula);
            let result = $result;
            assert_eq!(solver.solve(), result);
            if result {
                let model: HashSet<Lit> = solver.model().unwrap().into_iter().collect();
                for clause in formula.iter() {
                    assert!(clause.iter().any(|lit| model.contains(lit)));
                }
            }
        }
    };
}

test_cnf!(unit_contradiction, false);
test_cnf!(two_clause_sat, true);
test_cnf!(forced_conflict_unsat, false);
test_cnf!(branching_sat, true);
test_cnf!(no_clauses_sat, true);
test_cnf!(seven_of_eight_sat, true);
test_cnf!(pigeon_hole_unsat, false);
