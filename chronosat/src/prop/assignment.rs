//! Partial assignment, trail and backtracking.
use partial_ref::{partial, PartialRef};

use chronosat_formula::{lit::LitIdx, Lit, Var};

use crate::context::{parts::*, Context};

/// How an assignment entered the trail.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AssignmentKind {
    /// Free choice of the decision heuristic.
    Decision,
    /// Forced by a clause that became unit, or an input unit clause.
    Propagation,
    /// The complement of an undone decision, forced by conflict repair.
    ConflictFlip,
}

/// Decision level recorded for unassigned variables.
pub const LEVEL_UNASSIGNED: LitIdx = LitIdx::max_value();

/// Current partial assignment.
///
/// A variable is unassigned, queued or asserted. Queued variables sit on the trail with their
/// value and decision level already fixed, but the propagation engine has not processed them
/// yet; asserted variables have been processed. Both literals of a variable always observe the
/// paired state: while the variable is queued, both literals count as queued, and once it is
/// asserted the literal matching the value is satisfied while its complement is falsified.
#[derive(Default)]
pub struct Assignment {
    /// Value each variable is queued or asserted to, `None` while unassigned.
    value: Vec<Option<bool>>,
    /// Whether the queued value was processed by the propagation engine.
    asserted: Vec<bool>,
    /// Decision level of the assignment, `LEVEL_UNASSIGNED` while unassigned.
    level: Vec<LitIdx>,
    /// How the assignment entered the trail, stale while unassigned.
    kind: Vec<AssignmentKind>,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.value.resize(count, None);
        self.asserted.resize(count, false);
        self.level.resize(count, LEVEL_UNASSIGNED);
        self.kind.resize(count, AssignmentKind::Propagation);
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.value.len()
    }

    /// Current partial assignment as slice.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.value
    }

    /// Value queued or asserted for a literal.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.value[lit.index()].map(|value| value ^ lit.is_negative())
    }

    /// Whether the literal is queued or asserted to be true.
    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.lit_value(lit) == Some(true)
    }

    /// Whether the literal is queued or asserted to be false.
    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.lit_value(lit) == Some(false)
    }

    /// Whether the literal's variable is unassigned.
    pub fn lit_is_unassigned(&self, lit: Lit) -> bool {
        self.lit_value(lit).is_none()
    }

    /// Whether the literal's variable is on the trail but not processed yet.
    pub fn lit_is_queued(&self, lit: Lit) -> bool {
        self.value[lit.index()].is_some() && !self.asserted[lit.index()]
    }

    /// Whether the literal is true and processed by the propagation engine.
    pub fn lit_is_satisfied(&self, lit: Lit) -> bool {
        self.asserted[lit.index()] && self.lit_value(lit) == Some(true)
    }

    /// Whether the literal is false and processed by the propagation engine.
    pub fn lit_is_falsified(&self, lit: Lit) -> bool {
        self.asserted[lit.index()] && self.lit_value(lit) == Some(false)
    }

    /// Whether the literal is satisfied at the root level and thus satisfied for good.
    pub fn lit_is_true_at_root(&self, lit: Lit) -> bool {
        self.lit_is_satisfied(lit) && self.level[lit.index()] == 0
    }

    /// Decision level of an assigned variable, `LEVEL_UNASSIGNED` otherwise.
    pub fn level(&self, var: Var) -> LitIdx {
        self.level[var.index()]
    }

    /// How an assigned variable entered the trail.
    ///
    /// Returns stale data if the variable isn't assigned.
    pub fn kind(&self, var: Var) -> AssignmentKind {
        self.kind[var.index()]
    }

    /// Queue a value for an unassigned variable.
    fn queue_lit(&mut self, lit: Lit, level: usize, kind: AssignmentKind) {
        debug_assert!(self.lit_value(lit).is_none());
        self.value[lit.index()] = Some(lit.is_positive());
        self.asserted[lit.index()] = false;
        self.level[lit.index()] = level as LitIdx;
        self.kind[lit.index()] = kind;
    }

    /// Process a queued literal, making it satisfied and its complement falsified.
    pub fn assert_lit(&mut self, lit: Lit) {
        debug_assert!(self.lit_is_true(lit));
        debug_assert!(!self.asserted[lit.index()]);
        self.asserted[lit.index()] = true;
    }

    /// Return a variable to the unassigned state.
    fn unassign(&mut self, var: Var) {
        self.value[var.index()] = None;
        self.asserted[var.index()] = false;
        self.level[var.index()] = LEVEL_UNASSIGNED;
    }
}

/// Decision and propagation history.
#[derive(Default)]
pub struct Trail {
    /// Stack of all queued assignments in assignment order.
    trail: Vec<Lit>,
    /// Position of the next assignment to propagate.
    ///
    /// Everything before this position is asserted, everything from here on is queued.
    queue_head_pos: usize,
    /// Trail position of the decision opening each level, indexed by level - 1.
    decisions: Vec<LitIdx>,
}

impl Trail {
    /// Return the next queued literal to propagate.
    pub fn queue_head(&self) -> Option<Lit> {
        self.trail.get(self.queue_head_pos).cloned()
    }

    /// Move the propagation cursor past the current queue head.
    pub fn advance_queue(&mut self) {
        debug_assert!(self.queue_head_pos < self.trail.len());
        self.queue_head_pos += 1;
    }

    /// Assigned literals in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Number of trail entries processed by the propagation engine.
    pub fn propagated_len(&self) -> usize {
        self.queue_head_pos
    }

    /// Whether all queued assignments are processed.
    pub fn fully_propagated(&self) -> bool {
        self.queue_head_pos == self.trail.len()
    }

    /// Start a new decision level.
    ///
    /// Does not enqueue the decision itself.
    pub fn new_decision_level(&mut self) {
        self.decisions.push(self.trail.len() as LitIdx)
    }

    /// Current decision level.
    pub fn current_level(&self) -> usize {
        self.decisions.len()
    }

    /// The decision literal that opened the given level.
    ///
    /// The level has to be positive and at most the current level.
    pub fn decision_at_level(&self, level: usize) -> Lit {
        self.trail[self.decisions[level - 1] as usize]
    }
}

/// Enqueue the assignment of true to a literal.
///
/// This updates the assignment and the trail, but does not perform any propagation. The
/// literal's variable has to be unassigned when calling this.
pub fn enqueue_assignment(
    mut ctx: partial!(Context, mut AssignmentP, mut TrailP),
    lit: Lit,
    kind: AssignmentKind,
) {
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    ctx.part_mut(AssignmentP)
        .queue_lit(lit, trail.current_level(), kind);
    trail.trail.push(lit);
}

/// Undo all assignments in decision levels deeper than the given level.
///
/// Backtracking to the current level is a no-op, which in particular keeps root level
/// assignments permanent.
pub fn backtrack(mut ctx: partial!(Context, mut AssignmentP, mut TrailP), level: usize) {
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    let assignment = ctx.part_mut(AssignmentP);

    debug_assert!(level <= trail.decisions.len());

    if level == trail.decisions.len() {
        // Nothing to undo; this only happens outside of conflict repair, with a drained queue.
        debug_assert!(trail.fully_propagated());
        return;
    }

    let new_trail_len = trail.decisions[level] as usize;

    for &lit in &trail.trail[new_trail_len..] {
        debug_assert!(assignment.level(lit.var()) as usize > level);
        assignment.unassign(lit.var());
    }

    trail.trail.truncate(new_trail_len);
    trail.decisions.truncate(level);
    trail.queue_head_pos = new_trail_len;
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use chronosat_formula::lits;

    use crate::context::set_var_count;

    #[test]
    fn queue_assert_backtrack_roundtrip() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 4);

        let [a, b, c] = lits![1, -2, 3];

        enqueue_assignment(ctx.borrow(), a, AssignmentKind::Propagation);

        ctx.part_mut(TrailP).new_decision_level();
        enqueue_assignment(ctx.borrow(), b, AssignmentKind::Decision);
        enqueue_assignment(ctx.borrow(), c, AssignmentKind::Propagation);

        {
            let assignment = ctx.part(AssignmentP);
            assert!(assignment.lit_is_true(a));
            assert!(assignment.lit_is_false(!b));
            assert!(assignment.lit_is_queued(c));
            assert!(!assignment.lit_is_satisfied(c));
            assert_eq!(assignment.level(b.var()), 1);
            assert_eq!(assignment.kind(b.var()), AssignmentKind::Decision);
        }

        while let Some(lit) = ctx.part(TrailP).queue_head() {
            ctx.part_mut(AssignmentP).assert_lit(lit);
            ctx.part_mut(TrailP).advance_queue();
        }

        assert!(ctx.part(AssignmentP).lit_is_satisfied(c));
        assert!(ctx.part(AssignmentP).lit_is_falsified(!c));
        assert!(ctx.part(AssignmentP).lit_is_true_at_root(a));
        assert!(!ctx.part(AssignmentP).lit_is_true_at_root(b));

        // Backtracking to the current level must change nothing.
        backtrack(ctx.borrow(), 1);
        assert_eq!(ctx.part(TrailP).trail().len(), 3);
        assert!(ctx.part(TrailP).fully_propagated());

        backtrack(ctx.borrow(), 0);

        let assignment = ctx.part(AssignmentP);
        assert!(assignment.lit_is_satisfied(a));
        assert!(assignment.lit_is_unassigned(b));
        assert!(assignment.lit_is_unassigned(c));
        assert_eq!(assignment.level(b.var()), LEVEL_UNASSIGNED);
        assert_eq!(ctx.part(TrailP).trail(), &[a]);
        assert_eq!(ctx.part(TrailP).current_level(), 0);
    }
}
