#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Vector Race adapters.
//!
//! A [`Scene`] is a detached snapshot of the grid, the player markers and the
//! per-player status lines. Backends only ever see scenes, never the engine.

use std::{fmt, io::Write};

use anyhow::{Context, Result as AnyResult};
use vector_race_core::{Direction, Position, Track, Velocity};

/// Marker used for players whose name is empty.
pub const ANONYMOUS_MARKER: char = 'P';

/// Placeholder printed for players that have not chosen a heading yet.
pub const NO_HEADING: &str = "N/D";

const SEPARATOR: &str = "--------------------------------------------------";

/// Terrain shown for a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Drivable cell.
    Free,
    /// Blocked cell.
    Obstacle,
    /// Start cell.
    Start,
    /// Finish cell.
    Finish,
}

impl CellKind {
    /// Character drawn for the cell when no player stands on it.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Free => '.',
            Self::Obstacle => '#',
            Self::Start => 'S',
            Self::Finish => 'F',
        }
    }
}

/// Player drawn on top of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerMarker {
    /// Cell the player occupies.
    pub position: Position,
    /// Character drawn in place of the cell.
    pub glyph: char,
}

impl PlayerMarker {
    /// Creates a marker showing the first character of `name`.
    #[must_use]
    pub fn for_player(name: &str, position: Position) -> Self {
        Self {
            position,
            glyph: name.chars().next().unwrap_or(ANONYMOUS_MARKER),
        }
    }
}

/// Summary line printed under the grid for one player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    /// Display name.
    pub name: String,
    /// Current speed.
    pub velocity: Velocity,
    /// Current cell.
    pub position: Position,
    /// Last heading, if the player has moved.
    pub heading: Option<Direction>,
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - velocity: {}, position: {}, direction: ",
            self.name, self.velocity, self.position
        )?;
        match self.heading {
            Some(heading) => write!(f, "{heading}"),
            None => f.write_str(NO_HEADING),
        }
    }
}

/// Snapshot of the race grid and its players.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    /// Turn the snapshot was taken after; zero before the race starts.
    pub turn: u32,
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Row-major terrain.
    pub cells: Vec<CellKind>,
    /// Players drawn on the grid. Earlier markers win shared cells.
    pub markers: Vec<PlayerMarker>,
    /// Status lines in display order.
    pub statuses: Vec<StatusLine>,
}

impl Scene {
    /// Captures the terrain of `track`. Players are added afterwards.
    #[must_use]
    pub fn from_track(turn: u32, track: &dyn Track) -> Self {
        let (width, height) = (track.width(), track.height());
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                let position = Position::new(x, y);
                cells.push(if track.is_finish(position) {
                    CellKind::Finish
                } else if track.is_start(position) {
                    CellKind::Start
                } else if track.is_obstacle(position) {
                    CellKind::Obstacle
                } else {
                    CellKind::Free
                });
            }
        }
        Self {
            turn,
            width,
            height,
            cells,
            markers: Vec::new(),
            statuses: Vec::new(),
        }
    }

    /// Adds a player: a marker on the grid and a status line below it.
    pub fn push_player(
        &mut self,
        name: &str,
        position: Position,
        velocity: Velocity,
        heading: Option<Direction>,
    ) {
        self.markers.push(PlayerMarker::for_player(name, position));
        self.statuses.push(StatusLine {
            name: name.to_owned(),
            velocity,
            position,
            heading,
        });
    }

    /// Character drawn at `position`, or `None` outside the grid.
    #[must_use]
    pub fn glyph_at(&self, position: Position) -> Option<char> {
        let cell = self.cell(position)?;
        let marker = self
            .markers
            .iter()
            .find(|marker| marker.position == position);
        Some(marker.map_or(cell.glyph(), |marker| marker.glyph))
    }

    fn cell(&self, position: Position) -> Option<CellKind> {
        let (x, y) = (position.x(), position.y());
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        self.cells
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Turn {}", self.turn)?;
        for y in 0..self.height as i32 {
            let row: String = (0..self.width as i32)
                .filter_map(|x| self.glyph_at(Position::new(x, y)))
                .collect();
            writeln!(f, "{row}")?;
        }
        writeln!(f)?;
        writeln!(f, "Players:")?;
        for status in &self.statuses {
            writeln!(f, "{status}")?;
        }
        writeln!(f, "{SEPARATOR}")
    }
}

/// Rendering backend capable of presenting Vector Race scenes.
pub trait RenderingBackend {
    /// Presents a single snapshot.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Backend that prints scenes as plain text.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Releases the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        write!(self.out, "{scene}")
            .and_then(|()| self.out.flush())
            .with_context(|| format!("failed to draw turn {}", scene.turn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vector_race_track::GridTrack;

    fn scene(source: &str) -> Scene {
        let track: GridTrack = source.parse().expect("valid track");
        Scene::from_track(0, &track)
    }

    #[test]
    fn terrain_uses_cell_glyphs() {
        let scene = scene("#####\n#S.F#\n#####");

        assert_eq!(scene.glyph_at(Position::new(0, 0)), Some('#'));
        assert_eq!(scene.glyph_at(Position::new(1, 1)), Some('S'));
        assert_eq!(scene.glyph_at(Position::new(2, 1)), Some('.'));
        assert_eq!(scene.glyph_at(Position::new(3, 1)), Some('F'));
        assert_eq!(scene.glyph_at(Position::new(5, 1)), None);
    }

    #[test]
    fn first_registered_marker_wins_a_shared_cell() {
        let mut scene = scene("S..");
        scene.push_player("alice", Position::new(0, 0), Velocity::ZERO, None);
        scene.push_player("bob", Position::new(0, 0), Velocity::ZERO, None);
        scene.push_player("", Position::new(2, 0), Velocity::ZERO, None);

        assert_eq!(scene.glyph_at(Position::new(0, 0)), Some('a'));
        assert_eq!(scene.glyph_at(Position::new(2, 0)), Some(ANONYMOUS_MARKER));
    }

    #[test]
    fn status_line_reports_missing_heading() {
        let line = StatusLine {
            name: "greedy".into(),
            velocity: Velocity::clamped(2),
            position: Position::new(3, 1),
            heading: None,
        };
        assert_eq!(
            line.to_string(),
            "greedy - velocity: 2, position: (3, 1), direction: N/D"
        );

        let moved = StatusLine {
            heading: Some(Direction::SouthEast),
            ..line
        };
        assert!(moved.to_string().ends_with("direction: SE"));
    }

    #[test]
    fn text_backend_prints_grid_then_statuses() {
        let mut scene = scene("S.F\n...");
        scene.turn = 4;
        scene.push_player(
            "zed",
            Position::new(1, 0),
            Velocity::clamped(1),
            Some(Direction::East),
        );

        let mut backend = TextBackend::new(Vec::new());
        backend.present(&scene).expect("writing to memory");
        let text = String::from_utf8(backend.into_inner()).expect("utf-8 output");

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Turn 4");
        assert_eq!(lines[1], "SzF");
        assert_eq!(lines[2], "...");
        assert_eq!(lines[4], "Players:");
        assert_eq!(
            lines[5],
            "zed - velocity: 1, position: (1, 0), direction: E"
        );
        assert_eq!(lines[6], SEPARATOR);
    }
}
