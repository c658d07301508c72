//! Verdict and statistics reporting.
use std::io::{self, Write};
use std::time::Duration;

use chronosat::Stats;

/// Print the verdict followed by the search statistics to stderr.
///
/// Stderr keeps the verdict apart from the comment lines the logger writes to stdout, so
/// scripts can consume it without filtering.
pub fn report_verdict(verdict: bool, stats: Stats, elapsed: Duration) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    // Failing to write the report is not worth masking the verdict's exit code.
    let _ = writeln!(out, "v {}", if verdict { "SAT" } else { "UNSAT" });
    let _ = writeln!(out, "c conflicts:    {}", stats.conflicts);
    let _ = writeln!(out, "c decisions:    {}", stats.decisions);
    let _ = writeln!(out, "c propagations: {}", stats.propagations);
    let _ = writeln!(out, "c learned:      {}", stats.learned_clauses);
    let _ = writeln!(out, "c wall time:    {:.3} s", elapsed.as_secs_f64());

    match peak_rss_kb() {
        Some(kb) => {
            let _ = writeln!(out, "c peak rss:     {} kB", kb);
        }
        None => {
            let _ = writeln!(out, "c peak rss:     unavailable");
        }
    }
}

/// Peak resident set size of this process in kilobytes, where the platform exposes it.
fn peak_rss_kb() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|line| line.starts_with("VmHWM:"))?;
    line.split_whitespace().nth(1)?.parse().ok()
}
