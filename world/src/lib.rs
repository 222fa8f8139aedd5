#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Code Craft.
//!
//! The world owns nothing but the character's run-time state. Levels are
//! borrowed immutably and every command flows through the single [`apply`]
//! entry point, which is shared by the paced and the single-step execution
//! modes.

use std::collections::BTreeSet;

use codecraft_core::{Command, Event, Heading, Level, Message, Outcome, Position};

/// Mutable run-time state of the character on a level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationState {
    position: Position,
    heading: Heading,
    visited: BTreeSet<Position>,
    has_fuel: bool,
    fuel_collected: bool,
    message: Option<Message>,
    completed: bool,
    running: bool,
}

impl SimulationState {
    /// Creates a fresh state at the start configuration of the level.
    #[must_use]
    pub fn at_start(level: &Level) -> Self {
        Self {
            position: level.start(),
            heading: level.start_heading(),
            visited: BTreeSet::new(),
            has_fuel: level.has_fuel(),
            fuel_collected: false,
            message: None,
            completed: false,
            running: false,
        }
    }

    /// Cell occupied by the character.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Facing of the character.
    #[must_use]
    pub const fn heading(&self) -> Heading {
        self.heading
    }

    /// Cells recorded as visited during the current run.
    #[must_use]
    pub const fn visited(&self) -> &BTreeSet<Position> {
        &self.visited
    }

    /// Reports whether the level requires fuel.
    #[must_use]
    pub const fn has_fuel(&self) -> bool {
        self.has_fuel
    }

    /// Reports whether fuel was collected during the current run.
    #[must_use]
    pub const fn fuel_collected(&self) -> bool {
        self.fuel_collected
    }

    /// Report left by the last command or evaluation.
    #[must_use]
    pub const fn message(&self) -> Option<Message> {
        self.message
    }

    /// Reports whether the level was solved.
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }

    /// Reports whether a run is in progress.
    #[must_use]
    pub const fn running(&self) -> bool {
        self.running
    }

    /// Marks the start of a run and clears the previous report.
    pub fn begin_run(&mut self) {
        self.running = true;
        self.message = None;
    }

    /// Replaces the current report without touching the run.
    pub fn report(&mut self, message: Message) {
        self.message = Some(message);
    }

    /// Stops the run, optionally replacing the current report.
    pub fn halt(&mut self, message: Option<Message>) {
        self.running = false;
        if let Some(message) = message {
            self.message = Some(message);
        }
    }

    /// Stops the run and marks the level as solved.
    pub fn complete(&mut self) {
        self.running = false;
        self.completed = true;
        self.message = Some(Message::Success);
    }
}

/// Applies a single command to the state, deterministically.
///
/// The pre-command position is recorded as visited before anything else, so a
/// rejected move still leaves its last valid cell on the trail. Completed
/// states are terminal and report [`Outcome::Ignored`].
pub fn apply(
    state: &mut SimulationState,
    level: &Level,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Outcome {
    if state.completed {
        return Outcome::Ignored;
    }

    let _ = state.visited.insert(state.position);

    match command {
        Command::Move => {
            let from = state.position;
            match query::candidate(level, from, state.heading) {
                Ok(to) => {
                    state.position = to;
                    state.message = None;
                    out_events.push(Event::CharacterMoved { from, to });
                    Outcome::Moved
                }
                Err(reason) => {
                    state.message = Some(Message::Collision);
                    out_events.push(Event::MoveBlocked {
                        at: from,
                        heading: state.heading,
                        reason,
                    });
                    Outcome::Blocked
                }
            }
        }
        Command::TurnLeft | Command::TurnRight => {
            let from = state.heading;
            let to = if command == Command::TurnLeft {
                from.turned_left()
            } else {
                from.turned_right()
            };
            state.heading = to;
            state.message = None;
            out_events.push(Event::CharacterTurned { from, to });
            Outcome::Turned
        }
        Command::Collect => {
            let at = state.position;
            if level.fuel() == Some(at) {
                state.fuel_collected = true;
                state.message = Some(Message::FuelCollected);
                out_events.push(Event::FuelCollected { at });
                Outcome::Collected
            } else {
                state.message = Some(Message::NothingToCollect);
                out_events.push(Event::NothingToCollect { at });
                Outcome::CollectFailed
            }
        }
    }
}

/// Query functions that provide read-only access to the simulation.
pub mod query {
    use super::SimulationState;
    use codecraft_core::{BlockReason, Heading, Level, Position, Snapshot};

    /// Captures a read-only snapshot of the state for presentation.
    #[must_use]
    pub fn snapshot(state: &SimulationState) -> Snapshot {
        Snapshot {
            position: state.position,
            heading: state.heading,
            visited: state.visited.iter().copied().collect(),
            has_fuel: state.has_fuel,
            fuel_collected: state.fuel_collected,
            completed: state.completed,
            running: state.running,
            message: state.message,
        }
    }

    /// Explains why the character may not occupy `cell`, if it may not.
    ///
    /// Bounds are checked before obstacles.
    #[must_use]
    pub fn blocked_reason(level: &Level, cell: Position) -> Option<BlockReason> {
        if !level.contains(cell) {
            Some(BlockReason::OutOfBounds)
        } else if level.is_obstacle(cell) {
            Some(BlockReason::Obstacle)
        } else {
            None
        }
    }

    /// Resolves the destination of a move from `from` along `heading`.
    pub fn candidate(
        level: &Level,
        from: Position,
        heading: Heading,
    ) -> Result<Position, BlockReason> {
        let to = from.step(heading).ok_or(BlockReason::OutOfBounds)?;
        match blocked_reason(level, to) {
            Some(reason) => Err(reason),
            None => Ok(to),
        }
    }
}
