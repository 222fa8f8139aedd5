#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Code Craft adapters.
//!
//! Frames are composed purely from a [`Level`] and a [`Snapshot`]; adapters
//! never query the simulation directly. Backends decide how a [`Frame`]
//! reaches the player.

use std::{fmt, io::Write};

use anyhow::{Context, Result as AnyResult};
use codecraft_core::{Heading, Level, Message, Position, Snapshot};

/// Glyph drawn for an empty cell.
pub const EMPTY_GLYPH: char = ' ';
/// Glyph drawn for a wall.
pub const OBSTACLE_GLYPH: char = '#';
/// Glyph drawn for the goal star until the level is completed.
pub const GOAL_GLYPH: char = '*';
/// Glyph drawn for the fuel tank until it is collected.
pub const FUEL_GLYPH: char = 'F';
/// Glyph drawn for cells the character has left behind.
pub const TRAIL_GLYPH: char = '.';

/// Text rendition of a single simulation snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Level title shown above the grid.
    pub title: String,
    /// Grid rows from top to bottom, one glyph per cell.
    pub rows: Vec<String>,
    /// Status line summarising fuel and run state.
    pub status: String,
    /// Player-facing report, if any.
    pub message: Option<&'static str>,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        let width = self.rows.first().map_or(0, |row| row.chars().count());
        let border = "-".repeat(width);
        writeln!(f, "+{border}+")?;
        for row in &self.rows {
            writeln!(f, "|{row}|")?;
        }
        writeln!(f, "+{border}+")?;
        writeln!(f, "{}", self.status)?;
        if let Some(message) = self.message {
            writeln!(f, "> {message}")?;
        }
        Ok(())
    }
}

/// Composes the frame describing `snapshot` on `level`.
///
/// Later layers win: trail, then fuel, goal, walls and finally the
/// character itself.
#[must_use]
pub fn compose_frame(level: &Level, snapshot: &Snapshot) -> Frame {
    let size = level.grid_size();
    let rows = (0..size)
        .map(|y| {
            (0..size)
                .map(|x| glyph_at(level, snapshot, Position::new(x, y)))
                .collect()
        })
        .collect();

    Frame {
        title: frame_title(level),
        rows,
        status: status_line(level, snapshot),
        message: snapshot.message.map(message_text),
    }
}

fn frame_title(level: &Level) -> String {
    if level.title().is_empty() {
        format!("Level {}", level.id().get())
    } else {
        level.title().to_owned()
    }
}

fn glyph_at(level: &Level, snapshot: &Snapshot, cell: Position) -> char {
    if cell == snapshot.position {
        return heading_glyph(snapshot.heading);
    }
    if level.is_obstacle(cell) {
        return OBSTACLE_GLYPH;
    }
    if cell == level.goal() && !snapshot.completed {
        return GOAL_GLYPH;
    }
    if level.fuel() == Some(cell) && !snapshot.fuel_collected {
        return FUEL_GLYPH;
    }
    if snapshot.visited.binary_search(&cell).is_ok() {
        return TRAIL_GLYPH;
    }
    EMPTY_GLYPH
}

fn status_line(level: &Level, snapshot: &Snapshot) -> String {
    let mut status = format!(
        "at ({}, {}) facing {}",
        snapshot.position.x(),
        snapshot.position.y(),
        heading_name(snapshot.heading)
    );
    if level.has_fuel() {
        let fuel = if snapshot.fuel_collected { "full" } else { "empty" };
        status.push_str(&format!(" | fuel {fuel}"));
    }
    if snapshot.running {
        status.push_str(" | running");
    } else if snapshot.completed {
        status.push_str(" | complete");
    }
    status
}

/// Arrow glyph used to draw the character.
#[must_use]
pub const fn heading_glyph(heading: Heading) -> char {
    match heading {
        Heading::North => '^',
        Heading::East => '>',
        Heading::South => 'v',
        Heading::West => '<',
    }
}

/// Lower-case name of the heading.
#[must_use]
pub const fn heading_name(heading: Heading) -> &'static str {
    match heading {
        Heading::North => "north",
        Heading::East => "east",
        Heading::South => "south",
        Heading::West => "west",
    }
}

/// Player-facing wording of a report.
#[must_use]
pub const fn message_text(message: Message) -> &'static str {
    match message {
        Message::Collision => "Bump! The rocket hit a wall.",
        Message::FuelCollected => "Fuel collected!",
        Message::NothingToCollect => "There is no fuel here.",
        Message::EmptyProgram => "Attach some blocks under the start block first.",
        Message::GoalNotReached => "Not at the star yet.",
        Message::MissingFuel => "Reached the star, but forgot to collect the fuel!",
        Message::Success => "Well done! Level complete.",
    }
}

/// Rendering backend capable of presenting Code Craft frames.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;

    /// Presents a line of free text outside any frame.
    fn announce(&mut self, text: &str) -> AnyResult<()>;
}

/// Backend that writes frames as plain text.
#[derive(Debug)]
pub struct TextBackend<W> {
    writer: W,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing to `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the backend and returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, frame: &Frame) -> AnyResult<()> {
        writeln!(self.writer, "{frame}").context("failed to write frame")?;
        self.writer.flush().context("failed to flush frame")
    }

    fn announce(&mut self, text: &str) -> AnyResult<()> {
        writeln!(self.writer, "{text}").context("failed to write announcement")
    }
}
