//! Unit propagation.
//!
//! The engine processes the queued suffix of the trail one literal at a time. Processing a
//! literal asserts it, which falsifies its complement, and then re-examines every clause
//! watching that complement. Each such clause is either satisfied, re-watched through another
//! non-false literal, extinguished because it is satisfied at the root level, found unit, or
//! found conflicting. A conflict aborts the scan; the watches not examined yet are preserved
//! for the re-scan after conflict repair.

pub mod assignment;
pub mod watch;

pub use assignment::{
    backtrack, enqueue_assignment, Assignment, AssignmentKind, Trail, LEVEL_UNASSIGNED,
};
pub use watch::{Watch, Watchlists};

use std::mem::take;

use partial_ref::{partial, PartialRef};

use chronosat_formula::Lit;

use crate::clause::{db, ClauseRef};
use crate::context::{parts::*, Context};

/// A clause found with all literals false or queued to become false.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Conflict {
    pub cref: ClauseRef,
}

/// What the scan decided to do with a watched clause.
enum ClauseAction {
    /// Keep the watch, the clause needs no further attention.
    Retain { blocking: Lit },
    /// The clause is satisfied at the root level and leaves propagation for good.
    Extinguish,
    /// The watch moved to another literal of the clause.
    Rewatch { watched: Lit, blocking: Lit },
    /// All unwatched literals are false, the other watched literal is forced.
    Unit { forced: Lit },
}

/// Propagate all assignments queued on the trail.
///
/// Each iteration asserts the literal at the queue head and scans the clauses watching its
/// complement. The head only advances once the scan for a literal finishes without conflict, so
/// after an aborted scan the same literal is rescanned after conflict repair.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut StatsP,
        mut TrailP,
        mut WatchlistsP,
    ),
) -> Result<(), Conflict> {
    while let Some(lit) = ctx.part(TrailP).queue_head() {
        ctx.part_mut(AssignmentP).assert_lit(lit);

        propagate_literal(ctx.borrow(), lit)?;

        ctx.part_mut(TrailP).advance_queue();
    }

    Ok(())
}

/// Re-examine all clauses watching the complement of a newly asserted literal.
fn propagate_literal(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut StatsP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    let false_lit = !lit;

    // The list is rebuilt while it is scanned: entries that stay put are compacted towards the
    // front, entries that move or die leave no trace.
    let mut watches = take(ctx.part_mut(WatchlistsP).watched_by_mut(lit));

    let mut read = 0;
    let mut write = 0;
    let mut conflict = None;

    while read < watches.len() {
        let watch = watches[read];
        read += 1;

        // A true blocking literal means the clause is satisfied without clause access.
        if ctx.part(AssignmentP).lit_is_true(watch.blocking) {
            watches[write] = watch;
            write += 1;
            continue;
        }

        let cref = watch.cref;

        // Stale entry of a clause extinguished through its other watch.
        if ctx.part(ClauseAllocP).header(cref).is_extinct() {
            continue;
        }

        let action = examine_clause(ctx.borrow(), cref, false_lit);

        match action {
            ClauseAction::Retain { blocking } => {
                watches[write] = Watch { cref, blocking };
                write += 1;
            }
            ClauseAction::Extinguish => {
                db::extinguish_clause(ctx.borrow(), cref);
            }
            ClauseAction::Rewatch { watched, blocking } => {
                // The new watch never lands in the list taken out above, since a variable
                // occurs at most once per clause.
                debug_assert_ne!(watched.var(), false_lit.var());
                ctx.part_mut(WatchlistsP)
                    .add_watch(watched, Watch { cref, blocking });
            }
            ClauseAction::Unit { forced } => {
                watches[write] = Watch {
                    cref,
                    blocking: forced,
                };
                write += 1;

                match ctx.part(AssignmentP).lit_value(forced) {
                    None => {
                        ctx.part_mut(StatsP).propagations += 1;
                        enqueue_assignment(ctx.borrow(), forced, AssignmentKind::Propagation);
                    }
                    Some(true) => {
                        // Already queued to become true, nothing to do.
                    }
                    Some(false) => {
                        conflict = Some(Conflict { cref });

                        // Preserve the watches not examined yet for the rescan after repair.
                        while read < watches.len() {
                            watches[write] = watches[read];
                            write += 1;
                            read += 1;
                        }
                        break;
                    }
                }
            }
        }
    }

    watches.truncate(write);
    *ctx.part_mut(WatchlistsP).watched_by_mut(lit) = watches;

    match conflict {
        Some(conflict) => Err(conflict),
        None => Ok(()),
    }
}

/// Scan a single clause whose watched literal `false_lit` was just falsified.
///
/// Permutes the clause literals so that `false_lit` sits in position 0 and a replacement watch,
/// if one is found, takes its place there.
fn examine_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, AssignmentP),
    cref: ClauseRef,
    false_lit: Lit,
) -> ClauseAction {
    let (alloc, ctx) = ctx.split_part_mut(ClauseAllocP);
    let assignment = ctx.part(AssignmentP);

    let lits = alloc.clause_mut(cref).lits_mut();

    if lits[0] != false_lit {
        debug_assert_eq!(lits[1], false_lit);
        lits.swap(0, 1);
    }
    let other = lits[1];

    if assignment.lit_is_true(other) {
        if assignment.lit_is_true_at_root(other) {
            return ClauseAction::Extinguish;
        }
        return ClauseAction::Retain { blocking: other };
    }

    for position in 2..lits.len() {
        let candidate = lits[position];

        if assignment.lit_is_true_at_root(candidate) {
            return ClauseAction::Extinguish;
        }

        // Anything not yet falsified can take over the watch; a literal that is merely queued
        // to become false still counts, its complement's scan will revisit this clause.
        if !assignment.lit_is_falsified(candidate) {
            lits.swap(0, position);
            return ClauseAction::Rewatch {
                watched: candidate,
                blocking: other,
            };
        }
    }

    ClauseAction::Unit { forced: other }
}
