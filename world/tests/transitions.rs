use codecraft_core::{Command, Heading, Level, LevelId, Message, Outcome, Position};
use codecraft_world::{apply, SimulationState};

const HEADINGS: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

fn open_level(size: u32, start: Position, heading: Heading) -> Level {
    Level::new(LevelId::new(1), size, start, heading, Position::new(size - 1, size - 1))
}

fn run(state: &mut SimulationState, level: &Level, commands: &[Command]) -> Vec<Outcome> {
    let mut events = Vec::new();
    commands
        .iter()
        .map(|command| apply(state, level, *command, &mut events))
        .collect()
}

#[test]
fn opposite_turns_cancel_out() {
    for heading in HEADINGS {
        let level = open_level(5, Position::new(2, 2), heading);
        for pair in [
            [Command::TurnLeft, Command::TurnRight],
            [Command::TurnRight, Command::TurnLeft],
        ] {
            let mut state = SimulationState::at_start(&level);
            let outcomes = run(&mut state, &level, &pair);

            assert_eq!(outcomes, vec![Outcome::Turned, Outcome::Turned]);
            assert_eq!(state.heading(), heading);
            assert_eq!(state.position(), level.start());
        }
    }
}

#[test]
fn four_right_turns_return_to_the_start_heading() {
    for heading in HEADINGS {
        let level = open_level(5, Position::new(2, 2), heading);
        let mut state = SimulationState::at_start(&level);

        let _ = run(&mut state, &level, &[Command::TurnRight; 4]);

        assert_eq!(state.heading(), heading);
    }
}

#[test]
fn moves_never_leave_the_grid() {
    let size = 4;
    for x in 0..size {
        for y in 0..size {
            for heading in HEADINGS {
                let level = open_level(size, Position::new(x, y), heading);
                let mut state = SimulationState::at_start(&level);
                let script = [
                    Command::Move,
                    Command::Move,
                    Command::TurnRight,
                    Command::TurnRight,
                    Command::Move,
                    Command::Move,
                    Command::Move,
                    Command::Move,
                    Command::Move,
                ];
                let mut events = Vec::new();
                for command in script {
                    let _ = apply(&mut state, &level, command, &mut events);
                    assert!(
                        level.contains(state.position()),
                        "character escaped the grid at {:?}",
                        state.position()
                    );
                }
            }
        }
    }
}

#[test]
fn obstacles_reject_moves() {
    let level = open_level(5, Position::new(0, 0), Heading::East)
        .with_obstacles(vec![Position::new(1, 0)]);
    let mut state = SimulationState::at_start(&level);

    let outcomes = run(&mut state, &level, &[Command::Move]);

    assert_eq!(outcomes, vec![Outcome::Blocked]);
    assert_eq!(state.position(), Position::new(0, 0));
    assert!(state.visited().contains(&Position::new(0, 0)));
}

#[test]
fn collecting_twice_is_idempotent() {
    let level = open_level(5, Position::new(2, 2), Heading::East).with_fuel(Position::new(2, 2));
    let mut state = SimulationState::at_start(&level);

    let outcomes = run(&mut state, &level, &[Command::Collect, Command::Collect]);

    assert_eq!(outcomes, vec![Outcome::Collected, Outcome::Collected]);
    assert!(state.fuel_collected());
    assert_eq!(state.position(), level.start());
    assert_eq!(state.message(), Some(Message::FuelCollected));
}

#[test]
fn collected_fuel_stays_collected_after_moving_away() {
    let level = open_level(5, Position::new(2, 2), Heading::East).with_fuel(Position::new(2, 2));
    let mut state = SimulationState::at_start(&level);

    let _ = run(
        &mut state,
        &level,
        &[Command::Collect, Command::Move, Command::Collect],
    );

    assert!(state.fuel_collected());
    assert_eq!(state.message(), Some(Message::NothingToCollect));
}

#[test]
fn collect_without_fuel_target_fails() {
    let level = open_level(5, Position::new(2, 2), Heading::East);
    let mut state = SimulationState::at_start(&level);

    let outcomes = run(&mut state, &level, &[Command::Collect]);

    assert_eq!(outcomes, vec![Outcome::CollectFailed]);
    assert!(!state.has_fuel());
    assert!(!state.fuel_collected());
}

#[test]
fn visited_set_only_grows() {
    let level = open_level(5, Position::new(0, 0), Heading::East);
    let mut state = SimulationState::at_start(&level);
    let mut events = Vec::new();
    let mut previous = 0;

    for command in [
        Command::Move,
        Command::Move,
        Command::TurnRight,
        Command::Move,
        Command::TurnRight,
        Command::Move,
    ] {
        let _ = apply(&mut state, &level, command, &mut events);
        assert!(state.visited().len() >= previous);
        previous = state.visited().len();
    }

    assert_eq!(previous, 4);
}
