//! Temporary data.
use chronosat_formula::Lit;

/// Scratch buffers shared by passes that never run at the same time.
///
/// Make sure to check any documented invariants when using this. Also make sure to check all
/// existing users when adding invariants.
#[derive(Default)]
pub struct TmpData {
    pub lits: Vec<Lit>,
}
