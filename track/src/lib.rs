#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text-grid race tracks for Vector Race.
//!
//! Each line of the source is a row and each character a cell: `S` marks a
//! start, `F` a finish, `#` an obstacle, and every other character is free
//! ground. Rows shorter than the widest row are padded with free cells.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use thiserror::Error;
use tracing::debug;
use vector_race_core::{Position, Track};

const START_SYMBOL: char = 'S';
const FINISH_SYMBOL: char = 'F';
const OBSTACLE_SYMBOL: char = '#';

/// Errors raised while loading a track.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The track file could not be read.
    #[error("could not read track file {path}")]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The source contained no cells.
    #[error("track source is empty")]
    Empty,
    /// The source contained no `S` cell.
    #[error("track has no start position")]
    MissingStart,
    /// The grid is too large to address with signed 32-bit coordinates.
    #[error("track dimensions {columns}x{rows} exceed the supported size")]
    TooLarge {
        /// Number of columns in the source.
        columns: usize,
        /// Number of rows in the source.
        rows: usize,
    },
}

/// Immutable grid track parsed from its text representation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridTrack {
    width: u32,
    height: u32,
    obstacles: Vec<bool>,
    starts: Vec<Position>,
    finishes: Vec<Position>,
}

impl GridTrack {
    /// Parses a track from its text representation.
    pub fn parse(source: &str) -> Result<Self, TrackError> {
        let rows: Vec<Vec<char>> = source
            .lines()
            .map(|line| line.trim_end_matches('\r').chars().collect())
            .collect();
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if rows.is_empty() || columns == 0 {
            return Err(TrackError::Empty);
        }

        let too_large = || TrackError::TooLarge {
            columns,
            rows: rows.len(),
        };
        let width = i32::try_from(columns).map_err(|_| too_large())?;
        let height = i32::try_from(rows.len()).map_err(|_| too_large())?;

        let mut obstacles = Vec::with_capacity(columns * rows.len());
        let mut starts = Vec::new();
        let mut finishes = Vec::new();
        for (y, row) in (0..height).zip(&rows) {
            for x in 0..width {
                let symbol = row.get(x as usize).copied();
                let position = Position::new(x, y);
                match symbol {
                    Some(START_SYMBOL) => starts.push(position),
                    Some(FINISH_SYMBOL) => finishes.push(position),
                    _ => {}
                }
                obstacles.push(symbol == Some(OBSTACLE_SYMBOL));
            }
        }

        if starts.is_empty() {
            return Err(TrackError::MissingStart);
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
            obstacles,
            starts,
            finishes,
        })
    }

    /// Reads and parses the track stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| TrackError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let track = Self::parse(&source)?;
        debug!(
            path = %path.display(),
            width = track.width,
            height = track.height,
            starts = track.starts.len(),
            finishes = track.finishes.len(),
            "loaded track"
        );
        Ok(track)
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        let x = usize::try_from(position.x()).ok()?;
        let y = usize::try_from(position.y()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(y * width + x)
    }
}

impl FromStr for GridTrack {
    type Err = TrackError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

impl Track for GridTrack {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_free(&self, position: Position) -> bool {
        self.index(position)
            .and_then(|index| self.obstacles.get(index))
            .is_some_and(|obstacle| !obstacle)
    }

    fn is_finish(&self, position: Position) -> bool {
        self.finishes.contains(&position)
    }

    fn start_positions(&self) -> &[Position] {
        &self.starts
    }

    fn finish_positions(&self) -> &[Position] {
        &self.finishes
    }
}
