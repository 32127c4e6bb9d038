use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;

fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.parent().unwrap().parent().unwrap().to_path_buf()
}

fn write_program(dir: &tempfile::TempDir, src: &str) -> PathBuf {
    let path = dir.path().join("prog.pas");
    std::fs::write(&path, src).unwrap();
    path
}

#[test]
fn runs_factorial_demo() {
    let root = workspace_root();
    let mut cmd = Command::cargo_bin("minipas").unwrap();
    cmd.arg(root.join("demos/factorial.pas"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Factorial(6) = 720"));
}

#[test]
fn runs_scoping_demo() {
    let root = workspace_root();
    let mut cmd = Command::cargo_bin("minipas").unwrap();
    cmd.arg(root.join("demos/scoping.pas"));
    cmd.assert().success().stdout(
        "local x = 110\nglobal x = 1\nx after Shadow = 1, nested calls = 2\n",
    );
}

#[test]
fn runs_arrays_demo() {
    let root = workspace_root();
    let mut cmd = Command::cargo_bin("minipas").unwrap();
    cmd.arg(root.join("demos/arrays.pas"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("sum = 15"))
        .stdout(predicate::str::contains("halved squares: 2.0 0.5 0.0 0.5 2.0"))
        .stdout(predicate::str::contains("halved down to 1, done = TRUE"));
}

#[test]
fn reads_from_stdin() {
    let root = workspace_root();
    let mut cmd = assert_cmd::Command::cargo_bin("minipas").unwrap();
    cmd.arg(root.join("demos/greet.pas")).write_stdin("Ada 2\n");
    cmd.assert()
        .success()
        .stdout("Hello, Ada!\nHello, Ada!\n");
}

#[test]
fn wrong_argument_count_prints_usage() {
    let mut cmd = Command::cargo_bin("minipas").unwrap();
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Usage: minipas <file.pas>"));

    let mut cmd = Command::cargo_bin("minipas").unwrap();
    cmd.args(["a.pas", "b.pas"]);
    cmd.assert().code(2);
}

#[test]
fn missing_file_is_nonzero() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("minipas").unwrap();
    cmd.arg(tmp_dir.path().join("absent.pas"));
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn parse_error_is_nonzero() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let bad_path = write_program(&tmp_dir, "program P;\nbegin\n  x := \nend.\n");

    let mut cmd = Command::cargo_bin("minipas").unwrap();
    cmd.arg(bad_path);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Syntax error"))
        .stderr(predicate::str::contains("line 4"));
}

#[test]
fn semantic_error_stops_before_running() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = write_program(
        &tmp_dir,
        "program P;\nvar x, y : integer;\n    y : real;\nbegin writeln('ran') end.\n",
    );

    let mut cmd = Command::cargo_bin("minipas").unwrap();
    cmd.arg(path);
    cmd.assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Semantic error"))
        .stderr(predicate::str::contains("Duplicate identifier 'y'"));
}

#[test]
fn runtime_error_keeps_earlier_output() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = write_program(
        &tmp_dir,
        "program P;\nvar a : array [1..2] of integer;\nbegin writeln('before'); a[3] := 1 end.\n",
    );

    let mut cmd = Command::cargo_bin("minipas").unwrap();
    cmd.arg(path);
    cmd.assert()
        .code(1)
        .stdout("before\n")
        .stderr(predicate::str::contains("Runtime error"))
        .stderr(predicate::str::contains("out of bounds"));
}

#[test]
fn stats_are_reported_on_request() {
    let root = workspace_root();
    let mut cmd = Command::cargo_bin("minipas").unwrap();
    cmd.arg(root.join("demos/factorial.pas")).env("MINIPAS_STATS", "1");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("calls made:"))
        .stderr(predicate::str::contains("max frame depth:     7"));
}
