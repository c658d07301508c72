//! Watchlists to detect clauses that became unit.
//!
//! Every stored clause is watched through two of its literals, kept in positions 0 and 1 of the
//! clause. Whenever the watches move to different literals, the literals of the clause are
//! permuted so the watched ones stay in front.
//!
//! The watch entries for a clause live in the lists of the *complements* of the watched
//! literals: when a literal is made true its complement becomes false, and exactly the clauses
//! watching that complement have to be re-examined. Unless one of them has run out of non-false
//! literals (a conflict), the scan either finds a replacement watch, finds the clause satisfied,
//! or detects a new unit. There is no need to touch watchlists on backtracking, since
//! unassigning variables cannot invalidate the watch invariant.
//!
//! See [Section 4.5.1 of the "Handbook of Satisfiability"][handbook-ch4] for more details and
//! references.
//!
//! Each watch additionally carries a blocking literal, some other literal of the same clause.
//! When the blocking literal is already true, the clause is satisfied and the scan can skip it
//! without touching the clause data. This variant was introduced by [Niklas Sörensson and Niklas
//! Eén in "MINISAT 2.1 and MINISAT++1.0 — SAT Race 2008 Editions"][minisat-2.1].
//!
//! Watch entries of extinguished clauses are not removed eagerly. They remain as stale entries
//! that the scan drops when it next comes across them.
//!
//! [handbook-ch4]: https://www.satassociation.org/articles/FAIA185-0131.pdf
//! [minisat-2.1]: https://www.cril.univ-artois.fr/SAT09/solvers/booklet.pdf

use chronosat_formula::Lit;

use crate::clause::ClauseRef;

/// A watch on a stored clause.
#[derive(Copy, Clone)]
pub struct Watch {
    /// Clause which has the referring lit in position 0 or 1.
    pub cref: ClauseRef,
    /// A lit of the clause, different from the referring lit.
    pub blocking: Lit,
}

/// Watchlists to detect clauses that became unit.
#[derive(Default)]
pub struct Watchlists {
    /// Indexed by the code of the literal whose becoming true triggers the re-examination.
    watches: Vec<Vec<Watch>>,
}

impl Watchlists {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize(count * 2, vec![]);
    }

    /// Start watching a clause.
    ///
    /// `lits` have to be the first two literals of the given clause.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        for i in 0..2 {
            let watch = Watch {
                cref,
                blocking: lits[i ^ 1],
            };
            self.add_watch(lits[i], watch);
        }
    }

    /// Return watches triggered by the given literal becoming true.
    pub fn watched_by_mut(&mut self, lit: Lit) -> &mut Vec<Watch> {
        &mut self.watches[lit.code()]
    }

    /// Read-only variant of [`watched_by_mut`](Watchlists::watched_by_mut).
    pub fn watched_by(&self, lit: Lit) -> &[Watch] {
        &self.watches[lit.code()]
    }

    /// Make a literal watch a clause.
    ///
    /// The watch is stored in the list of the literal's complement, which is the literal whose
    /// becoming true invalidates the watch.
    pub fn add_watch(&mut self, watched: Lit, watch: Watch) {
        self.watches[(!watched).code()].push(watch)
    }
}
