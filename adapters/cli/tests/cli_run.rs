use std::process::{Command, Output};

fn codecraft(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_codecraft"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch codecraft")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn levels_lists_the_builtin_curriculum() {
    let output = codecraft(&["levels"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("tutorial"));
    assert_eq!(text.lines().count(), 21);
    assert!(text.contains("Lesson 15: Power Up [fuel]"));
}

#[test]
fn solving_a_level_exits_successfully() {
    let output = codecraft(&["run", "--level", "1", "--script", "start move"]);

    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("Level 1 complete!"));
}

#[test]
fn overshooting_the_goal_fails() {
    let output = codecraft(&["run", "--level", "1", "--script", "move move"]);

    assert!(!output.status.success());
    assert!(stdout(&output).contains("Not at the star yet."));
}

#[test]
fn unreadable_script_runs_as_an_empty_program() {
    let output = codecraft(&["run", "--level", "1", "--script", "start jump"]);

    assert!(!output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Attach some blocks under the start block first."), "{text}");
    assert!(String::from_utf8_lossy(&output.stderr).is_empty());
}

#[test]
fn stepping_solves_the_fuel_level() {
    let output = codecraft(&[
        "run",
        "--level",
        "15",
        "--step",
        "--script",
        "repeat 2 { move } collect repeat 2 { move }",
    ]);

    assert!(output.status.success(), "{}", stdout(&output));
}

#[test]
fn share_codes_replay_on_their_level() {
    let share = codecraft(&["share", "--level", "2", "--script", "start; repeat 3 { move }"]);
    assert!(share.status.success());
    let code = stdout(&share).trim().to_owned();
    assert!(code.starts_with("kru:v1:"));

    let output = codecraft(&["run", "--share", &code]);

    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("Lesson 2"));
}

#[test]
fn unknown_level_is_an_error() {
    let output = codecraft(&["run", "--level", "42", "--script", "move"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("level 42"));
}
