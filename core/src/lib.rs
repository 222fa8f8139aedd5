#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Code Craft engine.
//!
//! This crate defines the vocabulary that connects the block compiler, the
//! simulation world, the execution controller and presentation adapters.
//! Compilers emit [`Command`] sequences, the world applies them one at a time
//! against an immutable [`Level`], and every observable change is broadcast as
//! an [`Event`] so adapters can render [`Snapshot`] values without ever
//! querying back into the simulation.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Code Craft.";

/// Location of a single grid cell, zero-indexed from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Returns the neighbouring cell one unit along `heading`.
    ///
    /// Steps that would leave the non-negative quadrant yield `None`; the
    /// upper bound depends on the level and is checked by the world.
    #[must_use]
    pub fn step(self, heading: Heading) -> Option<Self> {
        let (dx, dy) = heading.offset();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self { x, y })
    }
}

/// Cardinal facing of the character.
///
/// Ordinals start at north and increase clockwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Heading {
    /// Facing toward decreasing rows.
    North,
    /// Facing toward increasing columns.
    East,
    /// Facing toward increasing rows.
    South,
    /// Facing toward decreasing columns.
    West,
}

impl Heading {
    const CLOCKWISE: [Heading; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Ordinal of the heading, `0` for north through `3` for west.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Resolves a heading from its ordinal.
    #[must_use]
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::CLOCKWISE.get(usize::from(ordinal)).copied()
    }

    /// Heading after a quarter turn clockwise.
    #[must_use]
    pub fn turned_right(self) -> Self {
        Self::CLOCKWISE[usize::from((self.ordinal() + 1) % 4)]
    }

    /// Heading after a quarter turn counter-clockwise.
    #[must_use]
    pub fn turned_left(self) -> Self {
        Self::CLOCKWISE[usize::from((self.ordinal() + 3) % 4)]
    }

    /// Unit vector `(dx, dy)` travelled by a single move.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Discrete instruction produced by compiling a block program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Advance one cell along the current heading.
    Move,
    /// Rotate a quarter turn counter-clockwise.
    TurnLeft,
    /// Rotate a quarter turn clockwise.
    TurnRight,
    /// Pick up fuel from the current cell.
    Collect,
}

/// Result of applying a single command to the simulation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The character entered the neighbouring cell.
    Moved,
    /// The move was rejected by the grid edge or an obstacle.
    Blocked,
    /// The heading changed.
    Turned,
    /// Fuel was collected (or had already been collected) on this cell.
    Collected,
    /// There was no fuel to collect on this cell.
    CollectFailed,
    /// The state had already completed the level, so nothing was applied.
    Ignored,
}

/// Reasons a move may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockReason {
    /// The destination lies outside the grid.
    OutOfBounds,
    /// The destination is occupied by a wall.
    Obstacle,
}

/// Transient report shown to the player after a command or evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Message {
    /// The character bumped into a wall or the grid edge.
    Collision,
    /// Fuel was collected.
    FuelCollected,
    /// A collect command was issued away from the fuel tank.
    NothingToCollect,
    /// The program compiled to no commands.
    EmptyProgram,
    /// The run ended without reaching the goal.
    GoalNotReached,
    /// The goal was reached but the required fuel was never collected.
    MissingFuel,
    /// The level was solved.
    Success,
}

/// Decision produced by the goal evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Nothing to decide yet; the run continues.
    Pending,
    /// A collision already ended the run; halt without a new report.
    Collided,
    /// The run ended away from the goal.
    GoalNotReached,
    /// The goal was reached without the required fuel.
    MissingFuel,
    /// The goal was reached with every requirement satisfied.
    Success,
}

impl Verdict {
    /// Message reported to the player for this verdict, if any.
    #[must_use]
    pub const fn message(self) -> Option<Message> {
        match self {
            Self::Pending | Self::Collided => None,
            Self::GoalNotReached => Some(Message::GoalNotReached),
            Self::MissingFuel => Some(Message::MissingFuel),
            Self::Success => Some(Message::Success),
        }
    }

    /// Reports whether the verdict ends the current run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Pacing style of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunMode {
    /// Every command is applied on a fixed timer until the queue drains.
    RunAll,
    /// One command is applied per step request.
    Step,
}

/// Blocks offered by the authoring toolbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Hat block that anchors a program; produces no command.
    Start,
    /// Emits a move command.
    Move,
    /// Emits a left turn.
    TurnLeft,
    /// Emits a right turn.
    TurnRight,
    /// Emits a collect command.
    Collect,
    /// Repeats its body a fixed number of times.
    Repeat,
}

/// Stable identifier assigned to a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable description of a single puzzle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    id: LevelId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    hint: String,
    grid_size: u32,
    start: Position,
    start_heading: Heading,
    goal: Position,
    #[serde(default)]
    fuel: Option<Position>,
    #[serde(default)]
    obstacles: Vec<Position>,
    #[serde(default = "default_toolbox")]
    toolbox: Vec<BlockKind>,
    #[serde(default)]
    ideal_block_count: u32,
}

fn default_toolbox() -> Vec<BlockKind> {
    vec![
        BlockKind::Start,
        BlockKind::Move,
        BlockKind::TurnLeft,
        BlockKind::TurnRight,
        BlockKind::Collect,
        BlockKind::Repeat,
    ]
}

impl Level {
    /// Creates a level with no obstacles, no fuel and the full toolbox.
    #[must_use]
    pub fn new(
        id: LevelId,
        grid_size: u32,
        start: Position,
        start_heading: Heading,
        goal: Position,
    ) -> Self {
        Self {
            id,
            title: String::new(),
            description: String::new(),
            hint: String::new(),
            grid_size,
            start,
            start_heading,
            goal,
            fuel: None,
            obstacles: Vec::new(),
            toolbox: default_toolbox(),
            ideal_block_count: 0,
        }
    }

    /// Replaces the walls placed on the grid.
    #[must_use]
    pub fn with_obstacles(mut self, obstacles: Vec<Position>) -> Self {
        self.obstacles = obstacles;
        self
    }

    /// Places a fuel tank that must be collected before the goal counts.
    #[must_use]
    pub fn with_fuel(mut self, fuel: Position) -> Self {
        self.fuel = Some(fuel);
        self
    }

    /// Attaches the player-facing texts.
    #[must_use]
    pub fn with_texts(
        mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        self.title = title.into();
        self.description = description.into();
        self.hint = hint.into();
        self
    }

    /// Restricts the blocks offered for this level.
    #[must_use]
    pub fn with_toolbox(mut self, toolbox: Vec<BlockKind>) -> Self {
        self.toolbox = toolbox;
        self
    }

    /// Sets the block count of the reference solution.
    #[must_use]
    pub fn with_ideal_block_count(mut self, count: u32) -> Self {
        self.ideal_block_count = count;
        self
    }

    /// Stable identifier of the level.
    #[must_use]
    pub const fn id(&self) -> LevelId {
        self.id
    }

    /// Short title shown above the puzzle.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Puzzle description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Hint offered to the player.
    #[must_use]
    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// Edge length of the square grid.
    #[must_use]
    pub const fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Cell where the character starts.
    #[must_use]
    pub const fn start(&self) -> Position {
        self.start
    }

    /// Heading the character starts with.
    #[must_use]
    pub const fn start_heading(&self) -> Heading {
        self.start_heading
    }

    /// Cell the character must reach.
    #[must_use]
    pub const fn goal(&self) -> Position {
        self.goal
    }

    /// Cell holding the fuel tank, if the level requires fuel.
    #[must_use]
    pub const fn fuel(&self) -> Option<Position> {
        self.fuel
    }

    /// Walls placed on the grid.
    #[must_use]
    pub fn obstacles(&self) -> &[Position] {
        &self.obstacles
    }

    /// Blocks offered for this level.
    #[must_use]
    pub fn toolbox(&self) -> &[BlockKind] {
        &self.toolbox
    }

    /// Block count of the reference solution, zero when unknown.
    #[must_use]
    pub const fn ideal_block_count(&self) -> u32 {
        self.ideal_block_count
    }

    /// Reports whether the goal is gated behind collecting fuel.
    #[must_use]
    pub const fn has_fuel(&self) -> bool {
        self.fuel.is_some()
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: Position) -> bool {
        cell.x < self.grid_size && cell.y < self.grid_size
    }

    /// Reports whether a wall occupies the cell.
    #[must_use]
    pub fn is_obstacle(&self, cell: Position) -> bool {
        self.obstacles.contains(&cell)
    }

    /// Reports whether the toolbox offers the block.
    #[must_use]
    pub fn allows(&self, kind: BlockKind) -> bool {
        self.toolbox.contains(&kind)
    }
}

/// Ordered level catalog plus the tutorial level kept outside its numbering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curriculum {
    tutorial: Level,
    levels: Vec<Level>,
}

impl Curriculum {
    /// Creates a curriculum from a tutorial level and the ordered catalog.
    #[must_use]
    pub fn new(tutorial: Level, levels: Vec<Level>) -> Self {
        Self { tutorial, levels }
    }

    /// Level played in tutorial mode.
    #[must_use]
    pub const fn tutorial(&self) -> &Level {
        &self.tutorial
    }

    /// Catalog levels in progression order.
    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Level at the provided catalog index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Number of catalog levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether the catalog holds no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Reports whether `index` addresses the last catalog level.
    #[must_use]
    pub fn is_final(&self, index: usize) -> bool {
        !self.levels.is_empty() && index + 1 == self.levels.len()
    }
}

/// Read-only copy of the simulation state handed to presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// Cell occupied by the character.
    pub position: Position,
    /// Facing of the character.
    pub heading: Heading,
    /// Cells left behind by the character, sorted by column then row.
    pub visited: Vec<Position>,
    /// Indicates whether the level requires fuel.
    pub has_fuel: bool,
    /// Indicates whether fuel has been collected during this run.
    pub fuel_collected: bool,
    /// Indicates whether the level was solved.
    pub completed: bool,
    /// Indicates whether a run is in progress.
    pub running: bool,
    /// Report left by the last command or evaluation.
    pub message: Option<Message>,
}

/// Events broadcast while commands are applied and runs progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The character advanced between two cells.
    CharacterMoved {
        /// Cell occupied before the move.
        from: Position,
        /// Cell occupied after the move.
        to: Position,
    },
    /// A move was rejected and the character stayed in place.
    MoveBlocked {
        /// Cell the character remains on.
        at: Position,
        /// Heading of the rejected move.
        heading: Heading,
        /// Why the destination was rejected.
        reason: BlockReason,
    },
    /// The character changed heading.
    CharacterTurned {
        /// Heading before the turn.
        from: Heading,
        /// Heading after the turn.
        to: Heading,
    },
    /// Fuel was collected on the provided cell.
    FuelCollected {
        /// Cell holding the fuel tank.
        at: Position,
    },
    /// A collect command found no fuel.
    NothingToCollect {
        /// Cell where the collect was attempted.
        at: Position,
    },
    /// A run request compiled to no commands.
    ProgramEmpty,
    /// A run request was ignored because another run is active.
    RunIgnored,
    /// A run began with the provided number of queued commands.
    RunStarted {
        /// Pacing of the run.
        mode: RunMode,
        /// Number of compiled commands queued for the run.
        commands: usize,
    },
    /// The controller applied a queued command.
    CommandApplied {
        /// Position of the command within the queue.
        index: usize,
        /// Command that was applied.
        command: Command,
        /// Result reported by the world.
        outcome: Outcome,
    },
    /// The goal evaluator produced a decision.
    GoalEvaluated {
        /// Decision returned by the evaluator.
        verdict: Verdict,
    },
    /// The run stopped; no further commands will be applied.
    RunHalted,
    /// A catalog level was recorded as completed.
    LevelCompleted {
        /// Identifier of the completed level.
        level: LevelId,
    },
    /// The final catalog level was completed.
    CurriculumCompleted,
    /// The simulation returned to the start configuration of a level.
    LevelReset {
        /// Identifier of the active level.
        level: LevelId,
    },
}
