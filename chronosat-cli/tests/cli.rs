use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn chronosat() -> Command {
    Command::cargo_bin("chronosat").unwrap()
}

#[test]
fn sat_verdict_goes_to_stderr() {
    chronosat()
        .write_stdin("p cnf 3 2\n1 2 0\n-1 3 0\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("v SAT"));
}

#[test]
fn unsat_verdict_goes_to_stderr() {
    chronosat()
        .write_stdin("p cnf 3 3\n1 2 0\n-1 2 0\n-2 0\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("v UNSAT"));
}

#[test]
fn statistics_follow_the_verdict() {
    chronosat()
        .write_stdin("p cnf 4 4\n1 2 0\n-1 3 0\n-2 -3 0\n-1 -3 4 0\n")
        .assert()
        .success()
        .stderr(
            predicate::str::contains("c conflicts:")
                .and(predicate::str::contains("c decisions:"))
                .and(predicate::str::contains("c propagations:"))
                .and(predicate::str::contains("c wall time:"))
                .and(predicate::str::contains("c peak rss:")),
        );
}

#[test]
fn reads_input_from_a_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "p cnf 2 0\n").unwrap();

    chronosat()
        .arg(file.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("v SAT"));
}

#[test]
fn parse_errors_are_fatal() {
    chronosat()
        .write_stdin("p cnf 1 1\nnonsense\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn header_mismatch_is_fatal() {
    chronosat()
        .write_stdin("p cnf 1 1\n2 0\n")
        .assert()
        .failure();
}

#[test]
fn config_options_are_accepted() {
    chronosat()
        .arg("-C")
        .arg("check_model=true")
        .write_stdin("p cnf 3 2\n1 2 0\n-1 3 0\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("v SAT"));
}

#[test]
fn unknown_config_options_are_rejected() {
    chronosat()
        .arg("-C")
        .arg("no_such_option=1")
        .write_stdin("p cnf 2 0\n")
        .assert()
        .failure();
}

#[test]
fn config_help_lists_options() {
    chronosat()
        .arg("-C")
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check_model"));
}
