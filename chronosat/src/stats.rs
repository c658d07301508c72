//! Search statistics.

/// Counters tracked during the search.
///
/// `propagations` counts units as they are detected by the watch scan, not when the implied
/// assignment is later processed by the queue.
#[derive(Copy, Clone, Default, Debug)]
pub struct Stats {
    pub decisions: u64,
    pub conflicts: u64,
    pub propagations: u64,
    pub learned_clauses: u64,
    pub extinguished_clauses: u64,
}
