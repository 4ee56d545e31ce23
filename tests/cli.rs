//! CLI smoke tests over the compiled binary.

use assert_cmd::Command;

#[test]
fn test_check_outputs_correction_as_json() {
    let mut cmd = Command::cargo_bin("hanchk").unwrap();
    cmd.args([
        "나는 가방에 드러갓어.",
        "--mode",
        "balanced",
        "--format",
        "json",
        "--no-color",
    ]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("들어갔어"))
        .stdout(predicates::str::contains("correctedText"));
}

#[test]
fn test_profanity_allow_exits_zero() {
    let mut cmd = Command::cargo_bin("hanchk").unwrap();
    cmd.args(["profanity", "시발점부터 다시 시작합니다", "--no-color"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("allow"));
}

#[test]
fn test_profanity_block_exits_nonzero() {
    let mut cmd = Command::cargo_bin("hanchk").unwrap();
    cmd.args(["profanity", "씨발", "--no-color"]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("block"));
}

#[test]
fn test_profanity_no_fail_overrides_exit_code() {
    let mut cmd = Command::cargo_bin("hanchk").unwrap();
    cmd.args(["profanity", "씨발", "--no-color", "--no-fail"]);
    cmd.assert().success();
}

#[test]
fn test_quick_subcommand_applies_basic_rules() {
    let mut cmd = Command::cargo_bin("hanchk").unwrap();
    cmd.args(["quick", "이제 됬다", "--no-color"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("이제 됐다"));
}

#[test]
fn test_smoke_harness_passes() {
    let mut cmd = Command::cargo_bin("hanchk").unwrap();
    cmd.arg("smoke");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("lyrics-board"));
}

#[test]
fn test_empty_input_fails() {
    let mut cmd = Command::cargo_bin("hanchk").unwrap();
    cmd.write_stdin("");
    cmd.assert().failure();
}
