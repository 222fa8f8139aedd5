#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Code Craft curriculum.
//!
//! The built-in catalog ships inside the crate as a TOML asset. Custom
//! catalogs use the same format: one `[tutorial]` table followed by
//! `[[level]]` entries in progression order.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use codecraft_core::{Curriculum, Level, Position, WELCOME_BANNER};
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

const BUILTIN_LEVELS: &str = include_str!("../assets/levels.toml");

/// Produces data required to greet the player and start the curriculum.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        WELCOME_BANNER
    }

    /// Loads the curriculum bundled with the crate.
    pub fn builtin_curriculum(&self) -> Result<Curriculum, CatalogError> {
        load_curriculum(BUILTIN_LEVELS)
    }
}

/// Reasons a level catalog is rejected.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read level catalog {path}")]
    Io {
        /// Location of the catalog.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The catalog is not valid TOML or does not describe levels.
    #[error("malformed level catalog: {0}")]
    Parse(#[from] toml::de::Error),
    /// A level declares a grid without cells.
    #[error("level {level} has an empty grid")]
    EmptyGrid {
        /// Identifier of the offending level.
        level: u32,
    },
    /// A start, goal or fuel cell lies outside the grid.
    #[error("level {level} places its {feature} at ({x}, {y}), outside a {size}x{size} grid")]
    OutsideGrid {
        /// Identifier of the offending level.
        level: u32,
        /// Which feature is misplaced.
        feature: &'static str,
        /// Column of the misplaced feature.
        x: u32,
        /// Row of the misplaced feature.
        y: u32,
        /// Side length of the grid.
        size: u32,
    },
    /// Two catalog levels share an identifier.
    #[error("level id {level} appears more than once")]
    DuplicateId {
        /// The repeated identifier.
        level: u32,
    },
    /// A catalog level reuses the tutorial identifier.
    #[error("level id {level} is reserved for the tutorial")]
    TutorialIdReused {
        /// The reserved identifier.
        level: u32,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    tutorial: Level,
    #[serde(default, rename = "level")]
    levels: Vec<Level>,
}

/// Parses and validates a curriculum from its TOML representation.
pub fn load_curriculum(source: &str) -> Result<Curriculum, CatalogError> {
    let catalog: CatalogFile = toml::from_str(source)?;
    validate(&catalog).map_err(|error| {
        warn!("rejected level catalog: {error}");
        error
    })?;
    debug!("loaded curriculum with {} levels", catalog.levels.len());
    Ok(Curriculum::new(catalog.tutorial, catalog.levels))
}

/// Reads, parses and validates a curriculum file.
pub fn load_curriculum_from_path(path: &Path) -> Result<Curriculum, CatalogError> {
    let source = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_curriculum(&source)
}

fn validate(catalog: &CatalogFile) -> Result<(), CatalogError> {
    validate_level(&catalog.tutorial)?;

    let tutorial = catalog.tutorial.id();
    let mut seen = BTreeSet::new();
    for level in &catalog.levels {
        validate_level(level)?;
        if level.id() == tutorial {
            return Err(CatalogError::TutorialIdReused {
                level: tutorial.get(),
            });
        }
        if !seen.insert(level.id()) {
            return Err(CatalogError::DuplicateId {
                level: level.id().get(),
            });
        }
    }
    Ok(())
}

fn validate_level(level: &Level) -> Result<(), CatalogError> {
    if level.grid_size() == 0 {
        return Err(CatalogError::EmptyGrid {
            level: level.id().get(),
        });
    }

    let features = [
        ("start", Some(level.start())),
        ("goal", Some(level.goal())),
        ("fuel", level.fuel()),
    ];
    for (feature, cell) in features {
        let Some(cell) = cell else {
            continue;
        };
        ensure_inside(level, feature, cell)?;
    }
    Ok(())
}

fn ensure_inside(level: &Level, feature: &'static str, cell: Position) -> Result<(), CatalogError> {
    if level.contains(cell) {
        return Ok(());
    }
    Err(CatalogError::OutsideGrid {
        level: level.id().get(),
        feature,
        x: cell.x(),
        y: cell.y(),
        size: level.grid_size(),
    })
}

#[cfg(test)]
mod tests {
    use super::{load_curriculum, CatalogError};

    const MINIMAL: &str = r#"
        [tutorial]
        id = 0
        grid_size = 3
        start = { x = 0, y = 0 }
        start_heading = "EAST"
        goal = { x = 2, y = 0 }
    "#;

    #[test]
    fn catalog_without_levels_is_tutorial_only() {
        let curriculum = load_curriculum(MINIMAL).expect("minimal catalog loads");

        assert!(curriculum.is_empty());
        assert_eq!(curriculum.tutorial().goal().x(), 2);
        assert!(curriculum.tutorial().title().is_empty());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let error = load_curriculum("[tutorial\nid = ").expect_err("invalid toml");
        assert!(matches!(error, CatalogError::Parse(_)));
    }

    #[test]
    fn unknown_heading_is_a_parse_error() {
        let source = MINIMAL.replace("EAST", "UP");
        let error = load_curriculum(&source).expect_err("unknown heading");
        assert!(matches!(error, CatalogError::Parse(_)));
    }
}
