use codecraft_core::{BlockKind, Command, Heading, Level, LevelId, Position};
use codecraft_system_compiler::{
    Block, CommandSource, CompileError, Program, Script, WorkspaceJson, MAX_DEPTH,
};

fn level_with_toolbox(toolbox: Vec<BlockKind>, ideal: u32) -> Level {
    Level::new(
        LevelId::new(2),
        5,
        Position::new(1, 2),
        Heading::East,
        Position::new(4, 2),
    )
    .with_toolbox(toolbox)
    .with_ideal_block_count(ideal)
}

#[test]
fn json_workspace_compiles_in_order() {
    let source = WorkspaceJson(
        r#"{
            "blocks": [
                { "type": "start" },
                { "type": "move" },
                { "type": "repeat", "times": 2, "body": [
                    { "type": "turn_left" },
                    { "type": "collect" }
                ] },
                { "type": "turn_right" }
            ]
        }"#
        .to_owned(),
    );

    assert_eq!(
        source.commands(),
        vec![
            Command::Move,
            Command::TurnLeft,
            Command::Collect,
            Command::TurnLeft,
            Command::Collect,
            Command::TurnRight,
        ]
    );
}

#[test]
fn malformed_json_degrades_to_an_empty_program() {
    let source = WorkspaceJson("{ \"blocks\": [ { \"type\": \"jump\" } ] }".to_owned());
    assert!(source.commands().is_empty());

    let source = WorkspaceJson("not json at all".to_owned());
    assert!(source.commands().is_empty());
}

#[test]
fn script_notation_matches_block_tree() {
    let script = Script("start\nrepeat 3 { move; right }\ncollect # refuel".to_owned());

    let program = script.parse().expect("script parses");

    assert_eq!(
        program,
        Program::new(vec![
            Block::Start,
            Block::Repeat {
                times: 3,
                body: vec![Block::Move, Block::TurnRight],
            },
            Block::Collect,
        ])
    );
    assert_eq!(script.commands().len(), 7);
}

#[test]
fn script_errors_report_offsets() {
    let error = Script("move jump".to_owned()).parse().expect_err("unknown word");
    assert!(matches!(
        error,
        CompileError::UnexpectedToken { ref token, offset: 5 } if token == "jump"
    ));

    let error = Script("repeat 2 { move".to_owned()).parse().expect_err("unclosed");
    assert!(matches!(error, CompileError::UnclosedRepeat { offset: 9 }));

    let error = Script("move }".to_owned()).parse().expect_err("unmatched");
    assert!(matches!(error, CompileError::UnmatchedBrace { offset: 5 }));

    let error = Script("repeat { move }".to_owned()).parse().expect_err("no count");
    assert!(matches!(error, CompileError::MissingRepeatCount { offset: 0 }));

    let error = Script("repeat 2 move".to_owned()).parse().expect_err("no body");
    assert!(matches!(error, CompileError::MissingRepeatBody { offset: 0 }));
}

#[test]
fn broken_script_degrades_to_an_empty_program() {
    assert!(Script("repeat 2 { move".to_owned()).commands().is_empty());
}

#[test]
fn runaway_nesting_degrades_to_an_empty_program() {
    let script = Script("repeat 1 { ".repeat(200_000));

    assert!(script.commands().is_empty());
    assert!(matches!(
        script.parse(),
        Err(CompileError::NestingTooDeep { offset, limit }) if offset == 11 * MAX_DEPTH
            && limit == MAX_DEPTH
    ));
}

#[test]
fn nesting_up_to_the_limit_compiles() {
    let source = format!(
        "{}move{}",
        "repeat 1 { ".repeat(MAX_DEPTH),
        " }".repeat(MAX_DEPTH)
    );

    assert_eq!(Script(source).commands(), vec![Command::Move]);
}

#[test]
fn empty_inputs_produce_no_commands() {
    assert!(Script(String::new()).commands().is_empty());
    assert!(Script("start # nothing else".to_owned()).commands().is_empty());
    assert!(Program::default().commands().is_empty());
}

#[test]
fn commands_do_not_depend_on_the_level() {
    let script = Script("move; left; move".to_owned());
    let first = script.commands();
    let second = script.commands();
    assert_eq!(first, second);
    assert_eq!(first, vec![Command::Move, Command::TurnLeft, Command::Move]);
}

#[test]
fn toolbox_and_block_budget_checks() {
    let program = Script("start; repeat 4 { move }".to_owned())
        .parse()
        .expect("parses");
    let restricted = level_with_toolbox(vec![BlockKind::Start, BlockKind::Move], 2);
    let generous = level_with_toolbox(
        vec![BlockKind::Start, BlockKind::Move, BlockKind::Repeat],
        3,
    );

    assert_eq!(program.disallowed(&restricted), vec![BlockKind::Repeat]);
    assert!(program.exceeds_ideal(&restricted));
    assert!(program.disallowed(&generous).is_empty());
    assert!(!program.exceeds_ideal(&generous));
}

#[test]
fn precompiled_sequences_pass_through() {
    let commands = vec![Command::Collect, Command::Move];
    assert_eq!(commands.commands(), commands);
    assert_eq!(commands.as_slice().commands(), commands);
}
