#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure compiler that turns authored block programs into command sequences.
//!
//! Programs are plain data: a tree of [`Block`] values either deserialized
//! from the JSON emitted by an authoring tool or parsed from the compact
//! [`Script`] notation. Compilation is a traversal that appends to an explicit
//! command list; nothing is ever evaluated dynamically. The public
//! [`CommandSource`] surface is total: malformed input degrades to an empty
//! list and a logged diagnostic.

mod script;

use std::collections::BTreeSet;

use codecraft_core::{BlockKind, Command, Level};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use script::Script;

/// Upper bound on the number of commands a single program may expand to.
pub const MAX_COMMANDS: usize = 10_000;

/// Deepest `repeat` nesting the text notation accepts.
pub const MAX_DEPTH: usize = 64;

/// Single block placed in the authoring workspace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Hat block anchoring the program.
    Start,
    /// Advance one cell.
    Move,
    /// Quarter turn counter-clockwise.
    TurnLeft,
    /// Quarter turn clockwise.
    TurnRight,
    /// Collect fuel.
    Collect,
    /// Repeat the nested blocks a fixed number of times.
    Repeat {
        /// Number of repetitions; zero skips the body.
        times: u32,
        /// Blocks nested inside the loop.
        #[serde(default)]
        body: Vec<Block>,
    },
}

impl Block {
    /// Toolbox entry this block was taken from.
    #[must_use]
    pub const fn kind(&self) -> BlockKind {
        match self {
            Self::Start => BlockKind::Start,
            Self::Move => BlockKind::Move,
            Self::TurnLeft => BlockKind::TurnLeft,
            Self::TurnRight => BlockKind::TurnRight,
            Self::Collect => BlockKind::Collect,
            Self::Repeat { .. } => BlockKind::Repeat,
        }
    }
}

/// Ordered top-level blocks of an authored program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Blocks in execution order.
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Program {
    /// Creates a program from its top-level blocks.
    #[must_use]
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Parses the JSON representation emitted by an authoring tool.
    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of blocks, nested blocks and the start block included.
    #[must_use]
    pub fn block_count(&self) -> usize {
        fn count(blocks: &[Block]) -> usize {
            blocks
                .iter()
                .map(|block| match block {
                    Block::Repeat { body, .. } => 1 + count(body),
                    _ => 1,
                })
                .sum()
        }
        count(&self.blocks)
    }

    /// Distinct toolbox entries used anywhere in the program.
    #[must_use]
    pub fn kinds(&self) -> BTreeSet<BlockKind> {
        fn collect(blocks: &[Block], out: &mut BTreeSet<BlockKind>) {
            for block in blocks {
                let _ = out.insert(block.kind());
                if let Block::Repeat { body, .. } = block {
                    collect(body, out);
                }
            }
        }
        let mut kinds = BTreeSet::new();
        collect(&self.blocks, &mut kinds);
        kinds
    }

    /// Blocks used by the program that the level toolbox does not offer.
    #[must_use]
    pub fn disallowed(&self, level: &Level) -> Vec<BlockKind> {
        self.kinds()
            .into_iter()
            .filter(|kind| !level.allows(*kind))
            .collect()
    }

    /// Reports whether the program uses more blocks than the reference solution.
    #[must_use]
    pub fn exceeds_ideal(&self, level: &Level) -> bool {
        let ideal = usize::try_from(level.ideal_block_count()).unwrap_or(usize::MAX);
        ideal > 0 && self.block_count() > ideal
    }
}

/// Reasons a program fails to compile.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The authoring tool emitted JSON that does not describe a program.
    #[error("malformed program json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// The script contains a word that is not a block name.
    #[error("unexpected `{token}` at byte {offset}")]
    UnexpectedToken {
        /// Offending text.
        token: String,
        /// Byte offset of the token within the script.
        offset: usize,
    },
    /// A `repeat` is not followed by its count.
    #[error("repeat at byte {offset} is missing its count")]
    MissingRepeatCount {
        /// Byte offset of the `repeat` keyword.
        offset: usize,
    },
    /// A `repeat` count is not followed by an opening brace.
    #[error("repeat at byte {offset} is missing its opening brace")]
    MissingRepeatBody {
        /// Byte offset of the `repeat` keyword.
        offset: usize,
    },
    /// A `repeat` body was never closed.
    #[error("repeat body opened at byte {offset} is never closed")]
    UnclosedRepeat {
        /// Byte offset of the opening brace.
        offset: usize,
    },
    /// A closing brace has no matching `repeat`.
    #[error("unmatched closing brace at byte {offset}")]
    UnmatchedBrace {
        /// Byte offset of the closing brace.
        offset: usize,
    },
    /// Repeats are nested deeper than [`MAX_DEPTH`].
    #[error("repeat at byte {offset} is nested deeper than {limit} levels")]
    NestingTooDeep {
        /// Byte offset of the `repeat` keyword.
        offset: usize,
        /// Limit that was exceeded.
        limit: usize,
    },
    /// The expanded program would exceed [`MAX_COMMANDS`].
    #[error("program expands to more than {limit} commands")]
    TooManyCommands {
        /// Limit that was exceeded.
        limit: usize,
    },
}

/// Expands a program into its ordered command sequence.
///
/// The result depends on the program alone, never on a level.
pub fn compile_program(program: &Program) -> Result<Vec<Command>, CompileError> {
    let mut out = Vec::new();
    emit(&program.blocks, &mut out)?;
    Ok(out)
}

fn emit(blocks: &[Block], out: &mut Vec<Command>) -> Result<(), CompileError> {
    for block in blocks {
        let command = match block {
            Block::Start => continue,
            Block::Move => Command::Move,
            Block::TurnLeft => Command::TurnLeft,
            Block::TurnRight => Command::TurnRight,
            Block::Collect => Command::Collect,
            Block::Repeat { times, body } => {
                for _ in 0..*times {
                    let before = out.len();
                    emit(body, out)?;
                    // Every pass emits the same commands, so an empty pass ends the loop.
                    if out.len() == before {
                        break;
                    }
                }
                continue;
            }
        };
        if out.len() >= MAX_COMMANDS {
            return Err(CompileError::TooManyCommands {
                limit: MAX_COMMANDS,
            });
        }
        out.push(command);
    }
    Ok(())
}

/// Anything that can hand the controller a command sequence.
///
/// Implementations never fail: translation problems are logged and reported
/// as an empty sequence, which the controller treats as "no program".
pub trait CommandSource {
    /// Produces the ordered commands to run.
    fn commands(&self) -> Vec<Command>;
}

fn fail_soft(result: Result<Vec<Command>, CompileError>) -> Vec<Command> {
    result.unwrap_or_else(|error| {
        warn!("program failed to compile: {error}");
        Vec::new()
    })
}

impl CommandSource for Program {
    fn commands(&self) -> Vec<Command> {
        fail_soft(compile_program(self))
    }
}

impl CommandSource for [Command] {
    fn commands(&self) -> Vec<Command> {
        self.to_vec()
    }
}

impl CommandSource for Vec<Command> {
    fn commands(&self) -> Vec<Command> {
        self.clone()
    }
}

/// Raw JSON workspace exported by an authoring tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceJson(pub String);

impl CommandSource for WorkspaceJson {
    fn commands(&self) -> Vec<Command> {
        fail_soft(Program::from_json(&self.0).and_then(|program| compile_program(&program)))
    }
}

#[cfg(test)]
mod tests {
    use super::{compile_program, Block, CompileError, Program, MAX_COMMANDS};
    use codecraft_core::Command;

    #[test]
    fn start_block_emits_nothing() {
        let program = Program::new(vec![Block::Start, Block::Move]);
        assert_eq!(compile_program(&program).expect("compiles"), vec![Command::Move]);
    }

    #[test]
    fn nested_repeats_multiply() {
        let program = Program::new(vec![Block::Repeat {
            times: 2,
            body: vec![
                Block::Move,
                Block::Repeat {
                    times: 3,
                    body: vec![Block::TurnRight],
                },
            ],
        }]);

        let commands = compile_program(&program).expect("compiles");

        assert_eq!(commands.len(), 8);
        assert_eq!(commands[0], Command::Move);
        assert_eq!(commands[4], Command::Move);
        assert_eq!(program.block_count(), 4);
    }

    #[test]
    fn huge_repeat_is_rejected() {
        let program = Program::new(vec![Block::Repeat {
            times: u32::MAX,
            body: vec![Block::Move],
        }]);

        let error = compile_program(&program).expect_err("expansion must be capped");

        assert!(matches!(
            error,
            CompileError::TooManyCommands { limit } if limit == MAX_COMMANDS
        ));
    }

    #[test]
    fn empty_repeat_with_huge_count_terminates() {
        let program = Program::new(vec![Block::Repeat {
            times: u32::MAX,
            body: Vec::new(),
        }]);

        assert!(compile_program(&program).expect("compiles").is_empty());
    }
}
