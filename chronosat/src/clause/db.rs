//! Clause database.
use partial_ref::{partial, PartialRef};

use chronosat_formula::{lit::LitIdx, Lit};

use crate::context::{parts::*, Context};

use super::{ClauseHeader, ClauseRef};

/// Clause database.
///
/// Tracks the stored clauses of the input formula and the learned clauses, together with a
/// per-literal count of the live clauses containing each literal. The clause data itself lives
/// in the [`ClauseAlloc`](super::ClauseAlloc); the input references are fixed once loading
/// finishes while the learned references keep growing during the search.
#[derive(Default)]
pub struct ClauseDb {
    input: Vec<ClauseRef>,
    learned: Vec<ClauseRef>,

    /// Number of live stored clauses containing each literal, indexed by the literal code.
    occurrence: Vec<LitIdx>,

    extinct_count: usize,
}

impl ClauseDb {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.occurrence.resize(count * 2, 0);
    }

    /// Stored clauses of the input formula.
    pub fn input_clauses(&self) -> &[ClauseRef] {
        &self.input
    }

    /// Clauses learned during the search so far.
    pub fn learned_clauses(&self) -> &[ClauseRef] {
        &self.learned
    }

    /// Number of live stored clauses containing the given literal.
    pub fn occurrence(&self, lit: Lit) -> usize {
        self.occurrence[lit.code()] as usize
    }

    /// Number of clauses extinguished so far.
    pub fn extinct_count(&self) -> usize {
        self.extinct_count
    }
}

/// Store a new clause and watch its first two literals.
///
/// The caller has to ensure the clause has at least two literals and no repeated variables.
pub fn add_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, mut WatchlistsP),
    learned: bool,
    lits: &[Lit],
) -> ClauseRef {
    let cref = ctx
        .part_mut(ClauseAllocP)
        .add_clause(ClauseHeader::new(), lits);

    let db = ctx.part_mut(ClauseDbP);
    if learned {
        db.learned.push(cref);
    } else {
        db.input.push(cref);
    }
    for &lit in lits {
        db.occurrence[lit.code()] += 1;
    }

    ctx.part_mut(WatchlistsP)
        .watch_clause(cref, [lits[0], lits[1]]);

    cref
}

/// Extinguish a clause that was found satisfied at the root level.
///
/// The clause drops out of the live literal counts and is skipped by all later scans. Watch
/// entries still pointing at it are discarded lazily when the propagator next sees them.
pub fn extinguish_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, mut StatsP),
    cref: ClauseRef,
) {
    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);

    let header = alloc.header_mut(cref);
    debug_assert!(!header.is_extinct());
    header.set_extinct();

    let db = ctx.part_mut(ClauseDbP);
    for &lit in alloc.clause(cref).lits() {
        debug_assert!(db.occurrence[lit.code()] > 0);
        db.occurrence[lit.code()] -= 1;
    }
    db.extinct_count += 1;

    ctx.part_mut(StatsP).extinguished_clauses += 1;
}
