//! Conflict repair by chronological backtracking.
//!
//! The learned clause is the negation of the decision path that led to the conflict, deepest
//! decision first. Asserting it is equivalent to flipping the most recent decision, so instead
//! of re-deciding, repair backtracks a single level and queues the complement of the undone
//! decision as a forced assignment. Every conflict therefore removes the refuted branch from
//! the search tree for good, which is what guarantees termination.
//!
//! This is deliberately simpler than first-UIP learning: no implication graph is consulted, the
//! clause is read off the trail's decision positions.
use log::debug;

use partial_ref::{partial, PartialRef};

use crate::clause::db;
use crate::context::{parts::*, Context};
use crate::prop::{backtrack, enqueue_assignment, AssignmentKind, Conflict};

/// Result of [`repair_conflict`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RepairResult {
    /// The conflict happened with no decision active, the formula is unsatisfiable.
    Unsat,
    /// A decision was flipped, propagation can resume.
    Repaired,
}

/// Undo the most recent decision after a conflict.
///
/// With no decision on the trail the conflict is final. With a single decision there is nothing
/// worth learning, the decision is just flipped. Below deeper paths a clause built from the
/// negated decisions is learned first, watching the negations of the two deepest decisions.
pub fn repair_conflict(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut StatsP,
        mut TmpDataP,
        mut TrailP,
        mut WatchlistsP,
    ),
    conflict: Conflict,
) -> RepairResult {
    ctx.part_mut(StatsP).conflicts += 1;

    debug!(
        "conflict in clause {:?}",
        ctx.part(ClauseAllocP).clause(conflict.cref).lits()
    );

    let level = ctx.part(TrailP).current_level();

    if level == 0 {
        return RepairResult::Unsat;
    }

    let (tmp_data, mut ctx) = ctx.split_part_mut(TmpDataP);

    if level >= 2 {
        tmp_data.lits.clear();
        for open_level in (1..=level).rev() {
            tmp_data
                .lits
                .push(!ctx.part(TrailP).decision_at_level(open_level));
        }

        db::add_clause(ctx.borrow(), true, &tmp_data.lits);
        ctx.part_mut(StatsP).learned_clauses += 1;

        debug!("learned clause {:?}", tmp_data.lits);
    }

    let flipped = !ctx.part(TrailP).decision_at_level(level);

    backtrack(ctx.borrow(), level - 1);
    enqueue_assignment(ctx.borrow(), flipped, AssignmentKind::ConflictFlip);

    debug!("flipped decision to {:?}", flipped);

    RepairResult::Repaired
}
