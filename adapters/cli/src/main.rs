#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Code Craft levels.

mod config;
mod program_transfer;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    thread,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use codecraft_core::{BlockKind, Curriculum, Event, Level};
use codecraft_rendering::{compose_frame, RenderingBackend, TextBackend};
use codecraft_system_bootstrap::{load_curriculum_from_path, Bootstrap};
use codecraft_system_compiler::{CompileError, Program, Script};
use codecraft_system_execution::{Controller, RunStatus};
use log::{info, warn};

use crate::{config::Config, program_transfer::SharedProgram};

#[derive(Parser, Debug)]
#[command(name = "codecraft", about = "Guide the rocket to the star with block programs", version)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// List the levels of the curriculum
    Levels {
        /// Level catalog to use instead of the built-in curriculum
        #[arg(long)]
        levels: Option<PathBuf>,
    },
    /// Run a program against a level
    Run(RunArgs),
    /// Print a share code for a program
    Share {
        #[command(flatten)]
        input: ProgramInput,
        /// Level the program was written for
        #[arg(long)]
        level: Option<u32>,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    input: ProgramInput,

    /// Level id to play; defaults to the shared level or the first level
    #[arg(long, conflicts_with = "tutorial")]
    level: Option<u32>,

    /// Play the tutorial level
    #[arg(long)]
    tutorial: bool,

    /// Apply one command per step instead of running the whole program
    #[arg(long)]
    step: bool,

    /// Wait out the pacing delays in real time
    #[arg(long)]
    realtime: bool,

    /// TOML file with a [pacing] table
    #[arg(long)]
    config: Option<PathBuf>,

    /// Level catalog to use instead of the built-in curriculum
    #[arg(long)]
    levels: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct ProgramInput {
    /// JSON program exported by the block editor
    #[arg(long)]
    program: Option<PathBuf>,

    /// Program in text notation, e.g. "start; repeat 3 { move }"
    #[arg(long)]
    script: Option<String>,

    /// Share code produced by the share command
    #[arg(long)]
    share: Option<String>,
}

impl ProgramInput {
    /// Reads the program; malformed programs load as empty ones.
    fn load(&self) -> Result<SharedProgram> {
        if let Some(path) = &self.program {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading program {}", path.display()))?;
            return Ok(SharedProgram {
                level: None,
                program: fail_soft(Program::from_json(&json)),
            });
        }
        if let Some(script) = &self.script {
            return Ok(SharedProgram {
                level: None,
                program: fail_soft(Script(script.clone()).parse()),
            });
        }
        if let Some(code) = &self.share {
            return SharedProgram::decode(code).context("decoding share code");
        }
        bail!("no program provided")
    }
}

fn fail_soft(parsed: Result<Program, CompileError>) -> Program {
    parsed.unwrap_or_else(|error| {
        warn!("program could not be read: {error}");
        Program::default()
    })
}

/// Entry point for the Code Craft command-line interface.
fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match cli.command {
        CliCommand::Levels { levels } => {
            list_levels(&curriculum(levels.as_deref())?)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Run(args) => run(&args),
        CliCommand::Share { input, level } => {
            let mut shared = input.load()?;
            shared.level = level.or(shared.level);
            println!("{}", shared.encode()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn curriculum(path: Option<&Path>) -> Result<Curriculum> {
    match path {
        Some(path) => load_curriculum_from_path(path)
            .with_context(|| format!("loading levels from {}", path.display())),
        None => Bootstrap
            .builtin_curriculum()
            .context("loading built-in levels"),
    }
}

fn list_levels(curriculum: &Curriculum) -> Result<()> {
    let mut out = io::stdout().lock();
    let tutorial = curriculum.tutorial();
    writeln!(out, "tutorial  {}", tutorial.title())?;
    for level in curriculum.levels() {
        let fuel = if level.has_fuel() { " [fuel]" } else { "" };
        writeln!(
            out,
            "{:>8}  {}{fuel}  ({} blocks: {})",
            level.id().get(),
            level.title(),
            level.ideal_block_count(),
            toolbox_names(level).join(", ")
        )?;
    }
    Ok(())
}

fn toolbox_names(level: &Level) -> Vec<&'static str> {
    level
        .toolbox()
        .iter()
        .map(|kind| match kind {
            BlockKind::Start => "start",
            BlockKind::Move => "move",
            BlockKind::TurnLeft => "turn_left",
            BlockKind::TurnRight => "turn_right",
            BlockKind::Collect => "collect",
            BlockKind::Repeat => "repeat",
        })
        .collect()
}

fn run(args: &RunArgs) -> Result<ExitCode> {
    let curriculum = curriculum(args.levels.as_deref())?;
    let config = args
        .config
        .as_deref()
        .map(Config::load)
        .transpose()?
        .unwrap_or_default();
    let shared = args.input.load()?;

    let mut controller = Controller::new(curriculum, config.pacing);
    let mut events = Vec::new();
    if args.tutorial {
        controller.set_tutorial(true, &mut events);
    } else {
        let id = args.level.or(shared.level).unwrap_or(1);
        let index = controller
            .curriculum()
            .levels()
            .iter()
            .position(|level| level.id().get() == id)
            .with_context(|| format!("level {id} is not in the curriculum"))?;
        controller.select_level(index, &mut events)?;
    }

    let program = shared.program;
    let disallowed = program.disallowed(controller.level());
    if !disallowed.is_empty() {
        warn!("program uses blocks this level does not offer: {disallowed:?}");
    }

    let mut backend = TextBackend::new(io::stdout().lock());
    backend.present(&compose_frame(controller.level(), &controller.snapshot()))?;

    events.clear();
    if args.step {
        controller.step(&program, &mut events);
    } else {
        controller.run_all(&program, &mut events);
    }

    loop {
        let changed = report(&mut backend, &mut events)?;
        if changed {
            backend.present(&compose_frame(controller.level(), &controller.snapshot()))?;
        }

        let awaiting_step = args.step
            && controller.status() == RunStatus::Running
            && controller.pending_timers() == 0;
        if awaiting_step {
            if args.realtime {
                thread::sleep(controller.pacing().command_interval());
            }
            controller.step(&program, &mut events);
            continue;
        }

        let Some(due) = controller.next_due() else {
            break;
        };
        let dt = due.saturating_sub(controller.now());
        if args.realtime {
            thread::sleep(dt);
        }
        controller.advance(dt, &mut events);
    }

    let completed = controller.status() == RunStatus::Completed;
    if completed && program.exceeds_ideal(controller.level()) {
        backend.announce(&format!(
            "Solved with {} blocks; it can be done with {}.",
            program.block_count(),
            controller.level().ideal_block_count()
        ))?;
    }
    info!("run finished with status {:?}", controller.status());

    Ok(if completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Announces milestones and reports whether the frame needs redrawing.
fn report<B: RenderingBackend>(backend: &mut B, events: &mut Vec<Event>) -> Result<bool> {
    let mut changed = false;
    for event in events.drain(..) {
        match event {
            Event::LevelCompleted { level } => {
                backend.announce(&format!("Level {} complete!", level.get()))?;
            }
            Event::CurriculumCompleted => {
                backend.announce("Every level complete. Certificate earned!")?;
            }
            Event::RunIgnored | Event::RunStarted { .. } | Event::GoalEvaluated { .. } => {}
            _ => changed = true,
        }
    }
    Ok(changed)
}
