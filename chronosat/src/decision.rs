//! Decision heuristic.
use partial_ref::{partial, PartialRef};

use chronosat_formula::Var;

use crate::context::{parts::*, Context};
use crate::prop::{enqueue_assignment, AssignmentKind};

/// Make a decision and enqueue it.
///
/// Picks the unassigned variable with the smallest index and queues its positive literal. The
/// deterministic order keeps runs reproducible; any heuristic that picks some unassigned
/// variable could be substituted here.
///
/// Returns `false` if no decision was made because all variables are assigned.
pub fn make_decision(
    mut ctx: partial!(Context, mut AssignmentP, mut StatsP, mut TrailP),
) -> bool {
    if let Some(index) = ctx
        .part(AssignmentP)
        .assignment()
        .iter()
        .position(|value| value.is_none())
    {
        let decision = Var::from_index(index).positive();
        debug_assert!(ctx.part(AssignmentP).lit_is_unassigned(decision));

        ctx.part_mut(TrailP).new_decision_level();
        ctx.part_mut(StatsP).decisions += 1;

        enqueue_assignment(ctx.borrow(), decision, AssignmentKind::Decision);

        true
    } else {
        false
    }
}
