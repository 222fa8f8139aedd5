#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Execution controller that paces command sequences through the world.
//!
//! The [`Controller`] owns everything scoped to a run: the compiled command
//! queue, the step cursor, the sticky collision flag and a [`Timeline`] of
//! cancellable continuations. Time only moves through [`Controller::advance`],
//! so adapters decide how virtual time maps onto wall-clock time and tests can
//! replay runs deterministically. Every command, in either mode, goes through
//! the same `codecraft_world::apply` call.

mod progress;
mod timeline;

use std::time::Duration;

use codecraft_core::{
    Command, Curriculum, Event, Level, Message, Outcome, RunMode, Snapshot, Verdict,
};
use codecraft_system_compiler::CommandSource;
use codecraft_system_evaluation::{evaluate, GoalCheck};
use codecraft_world::{self as world, query, SimulationState};
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

pub use progress::Progress;
pub use timeline::{Timeline, TimerId};

/// Delays that pace runs so presentation can animate each transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// Delay before each command of a paced run, in milliseconds.
    pub command_interval_ms: u64,
    /// Delay between the last command and the goal evaluation, in milliseconds.
    pub settle_delay_ms: u64,
    /// Delay before the first command of a stepped run, in milliseconds.
    pub first_step_delay_ms: u64,
    /// Delay between solving the final level and announcing it, in milliseconds.
    pub curriculum_delay_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            command_interval_ms: 800,
            settle_delay_ms: 500,
            first_step_delay_ms: 100,
            curriculum_delay_ms: 1500,
        }
    }
}

impl Pacing {
    /// Delay before each command of a paced run.
    #[must_use]
    pub const fn command_interval(&self) -> Duration {
        Duration::from_millis(self.command_interval_ms)
    }

    /// Delay between the last command and the goal evaluation.
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Delay before the first command of a stepped run.
    #[must_use]
    pub const fn first_step_delay(&self) -> Duration {
        Duration::from_millis(self.first_step_delay_ms)
    }

    /// Delay between solving the final level and announcing it.
    #[must_use]
    pub const fn curriculum_delay(&self) -> Duration {
        Duration::from_millis(self.curriculum_delay_ms)
    }
}

/// Level currently loaded into the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// The tutorial level outside the catalog numbering.
    Tutorial,
    /// Catalog level at the provided index.
    Level(usize),
}

/// Lifecycle of the current run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// Nothing has run since the last reset.
    Idle,
    /// Commands are being applied.
    Running,
    /// The run stopped without solving the level.
    Halted,
    /// The run solved the level.
    Completed,
}

/// Reasons a level selection is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The index does not address a catalog level.
    #[error("level index {index} is outside the curriculum of {len} levels")]
    OutOfRange {
        /// Requested catalog index.
        index: usize,
        /// Number of catalog levels.
        len: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Continuation {
    ApplyNext,
    Step,
    Evaluate,
    CurriculumCompleted,
}

/// State scoped to a single run, rebuilt on every reset.
#[derive(Debug, Default)]
struct Run {
    queue: Vec<Command>,
    cursor: usize,
    collided: bool,
    mode: Option<RunMode>,
}

impl Run {
    fn exhausted(&self) -> bool {
        self.cursor >= self.queue.len()
    }
}

/// Orchestrates compilation, pacing, evaluation and level selection.
#[derive(Debug)]
pub struct Controller {
    curriculum: Curriculum,
    tutorial: bool,
    index: usize,
    level: Level,
    state: SimulationState,
    run: Run,
    status: RunStatus,
    timeline: Timeline<Continuation>,
    progress: Progress,
    pacing: Pacing,
}

impl Controller {
    /// Creates a controller on the first catalog level, or on the tutorial
    /// when the catalog is empty.
    #[must_use]
    pub fn new(curriculum: Curriculum, pacing: Pacing) -> Self {
        let tutorial = curriculum.is_empty();
        let level = active_level(&curriculum, tutorial, 0);
        let state = SimulationState::at_start(&level);
        Self {
            curriculum,
            tutorial,
            index: 0,
            level,
            state,
            run: Run::default(),
            status: RunStatus::Idle,
            timeline: Timeline::new(),
            progress: Progress::default(),
            pacing,
        }
    }

    /// Curriculum the controller draws levels from.
    #[must_use]
    pub const fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    /// Level currently loaded.
    #[must_use]
    pub const fn level(&self) -> &Level {
        &self.level
    }

    /// Which level is loaded.
    #[must_use]
    pub const fn selection(&self) -> Selection {
        if self.tutorial {
            Selection::Tutorial
        } else {
            Selection::Level(self.index)
        }
    }

    /// Lifecycle of the current run.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Completed catalog levels.
    #[must_use]
    pub const fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Delays used to pace runs.
    #[must_use]
    pub const fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    /// Read-only copy of the simulation state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        query::snapshot(&self.state)
    }

    /// Commands queued for the current run.
    #[must_use]
    pub fn queue(&self) -> &[Command] {
        &self.run.queue
    }

    /// Index of the next command to apply.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.run.cursor
    }

    /// Reports whether a blocked move ended the current run.
    #[must_use]
    pub const fn collided(&self) -> bool {
        self.run.collided
    }

    /// Number of scheduled continuations that have not fired.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timeline.len()
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.timeline.now()
    }

    /// Time at which the next scheduled continuation fires.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.timeline.next_due()
    }

    /// Returns to the start configuration of the current level.
    ///
    /// Every pending continuation is cancelled, so nothing scheduled before
    /// the reset can touch the fresh state.
    pub fn reset(&mut self, out: &mut Vec<Event>) {
        let cancelled = self.timeline.cancel_all();
        if cancelled > 0 {
            debug!("reset cancelled {cancelled} pending continuations");
        }
        self.run = Run::default();
        self.state = SimulationState::at_start(&self.level);
        self.status = RunStatus::Idle;
        out.push(Event::LevelReset {
            level: self.level.id(),
        });
    }

    /// Loads the catalog level at `index` and resets.
    pub fn select_level(
        &mut self,
        index: usize,
        out: &mut Vec<Event>,
    ) -> Result<(), SelectionError> {
        if index >= self.curriculum.len() {
            return Err(SelectionError::OutOfRange {
                index,
                len: self.curriculum.len(),
            });
        }
        self.tutorial = false;
        self.index = index;
        self.load(out);
        Ok(())
    }

    /// Switches between the tutorial level and the catalog, then resets.
    ///
    /// Leaving the tutorial returns to the catalog level selected before. An
    /// empty catalog keeps the tutorial loaded.
    pub fn set_tutorial(&mut self, enabled: bool, out: &mut Vec<Event>) {
        self.tutorial = enabled || self.curriculum.is_empty();
        self.load(out);
    }

    /// Moves to the following catalog level; returns whether the level changed.
    pub fn next_level(&mut self, out: &mut Vec<Event>) -> bool {
        if self.tutorial || self.curriculum.is_final(self.index) {
            return false;
        }
        self.index += 1;
        self.load(out);
        true
    }

    /// Moves to the preceding catalog level; returns whether the level changed.
    pub fn previous_level(&mut self, out: &mut Vec<Event>) -> bool {
        if self.tutorial || self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.load(out);
        true
    }

    /// Compiles the program and runs every command on the pacing timer.
    ///
    /// Ignored while a run is in progress. An empty program is reported and
    /// nothing else changes.
    pub fn run_all<S>(&mut self, source: &S, out: &mut Vec<Event>)
    where
        S: CommandSource + ?Sized,
    {
        if self.status == RunStatus::Running {
            debug!("run request ignored: a run is already in progress");
            out.push(Event::RunIgnored);
            return;
        }

        let Some(commands) = self.compile(source, out) else {
            return;
        };
        self.start_run(commands, RunMode::RunAll, out);
        let _ = self
            .timeline
            .schedule(self.pacing.command_interval(), Continuation::ApplyNext);
    }

    /// Applies a single command, starting a stepped run when none is active.
    ///
    /// The first command of a fresh run waits for the first-step delay; later
    /// requests apply immediately. Once the queue is exhausted the next
    /// request evaluates the goal instead.
    pub fn step<S>(&mut self, source: &S, out: &mut Vec<Event>)
    where
        S: CommandSource + ?Sized,
    {
        if self.status != RunStatus::Running {
            let Some(commands) = self.compile(source, out) else {
                return;
            };
            self.start_run(commands, RunMode::Step, out);
            let _ = self
                .timeline
                .schedule(self.pacing.first_step_delay(), Continuation::Step);
            return;
        }

        if self.run.mode != Some(RunMode::Step) {
            debug!("step request ignored: a paced run is in progress");
            out.push(Event::RunIgnored);
            return;
        }

        if self.timeline.cancel_all() > 0 {
            // The delayed first step has not fired yet; apply it now.
            self.execute_step(out);
            if self.status != RunStatus::Running {
                return;
            }
        }
        self.execute_step(out);
    }

    /// Advances virtual time, firing every continuation that comes due.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let until = self.timeline.now().saturating_add(dt);
        while let Some((id, continuation)) = self.timeline.pop_due(until) {
            debug!("timer {} fired: {continuation:?}", id.get());
            self.fire(continuation, out);
        }
        self.timeline.settle_at(until);
    }

    fn load(&mut self, out: &mut Vec<Event>) {
        self.level = active_level(&self.curriculum, self.tutorial, self.index);
        self.reset(out);
    }

    fn compile<S>(&mut self, source: &S, out: &mut Vec<Event>) -> Option<Vec<Command>>
    where
        S: CommandSource + ?Sized,
    {
        let commands = source.commands();
        if commands.is_empty() {
            info!("level {}: program is empty", self.level.id().get());
            self.state.report(Message::EmptyProgram);
            out.push(Event::ProgramEmpty);
            return None;
        }
        Some(commands)
    }

    fn start_run(&mut self, commands: Vec<Command>, mode: RunMode, out: &mut Vec<Event>) {
        self.reset(out);
        info!(
            "level {}: starting {mode:?} run with {} commands",
            self.level.id().get(),
            commands.len()
        );
        out.push(Event::RunStarted {
            mode,
            commands: commands.len(),
        });
        self.run = Run {
            queue: commands,
            cursor: 0,
            collided: false,
            mode: Some(mode),
        };
        self.state.begin_run();
        self.status = RunStatus::Running;
    }

    fn fire(&mut self, continuation: Continuation, out: &mut Vec<Event>) {
        match continuation {
            Continuation::ApplyNext => {
                let _ = self.apply_next(out);
                let (delay, next) = if self.run.collided || self.run.exhausted() {
                    (self.pacing.settle_delay(), Continuation::Evaluate)
                } else {
                    (self.pacing.command_interval(), Continuation::ApplyNext)
                };
                let _ = self.timeline.schedule(delay, next);
            }
            Continuation::Step => self.execute_step(out),
            Continuation::Evaluate => self.conclude(out),
            Continuation::CurriculumCompleted => {
                info!("final level solved; curriculum complete");
                out.push(Event::CurriculumCompleted);
            }
        }
    }

    fn execute_step(&mut self, out: &mut Vec<Event>) {
        if self.run.collided || self.run.exhausted() {
            self.conclude(out);
            return;
        }
        if self.apply_next(out) == Outcome::Blocked {
            self.conclude(out);
        }
    }

    fn apply_next(&mut self, out: &mut Vec<Event>) -> Outcome {
        let index = self.run.cursor;
        let Some(command) = self.run.queue.get(index).copied() else {
            return Outcome::Ignored;
        };
        self.run.cursor += 1;

        let outcome = world::apply(&mut self.state, &self.level, command, out);
        if outcome == Outcome::Blocked {
            self.run.collided = true;
        }
        debug!("command #{index} {command:?}: {outcome:?}");
        out.push(Event::CommandApplied {
            index,
            command,
            outcome,
        });
        outcome
    }

    fn conclude(&mut self, out: &mut Vec<Event>) {
        let verdict = evaluate(
            &self.level,
            GoalCheck {
                position: self.state.position(),
                fuel_collected: self.state.fuel_collected(),
                is_terminal: true,
                collided: self.run.collided,
            },
        );
        out.push(Event::GoalEvaluated { verdict });

        match verdict {
            Verdict::Pending => return,
            Verdict::Success => {
                self.state.complete();
                self.status = RunStatus::Completed;
                self.record_completion(out);
            }
            Verdict::Collided | Verdict::GoalNotReached | Verdict::MissingFuel => {
                self.state.halt(verdict.message());
                self.status = RunStatus::Halted;
            }
        }

        info!("level {}: run ended with {verdict:?}", self.level.id().get());
        out.push(Event::RunHalted);
    }

    fn record_completion(&mut self, out: &mut Vec<Event>) {
        if self.tutorial {
            return;
        }
        let level = self.level.id();
        if self.progress.record(level) {
            out.push(Event::LevelCompleted { level });
        }
        if self.curriculum.is_final(self.index) {
            let _ = self.timeline.schedule(
                self.pacing.curriculum_delay(),
                Continuation::CurriculumCompleted,
            );
        }
    }
}

fn active_level(curriculum: &Curriculum, tutorial: bool, index: usize) -> Level {
    if tutorial {
        return curriculum.tutorial().clone();
    }
    curriculum
        .get(index)
        .unwrap_or_else(|| curriculum.tutorial())
        .clone()
}
