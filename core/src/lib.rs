#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Vector Race engine.
//!
//! This crate defines the vocabulary that connects the track loader, the
//! authoritative board, the turn engine, and the pluggable player strategies.
//! Tracks are consumed exclusively through the read-only [`Track`] contract,
//! strategies through [`Strategy`], and the turn engine reports every
//! observable transition as an [`Event`] so adapters can present the race
//! without reaching into engine state.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Vector Race.";

/// Location of a single grid cell expressed as column (`x`) and row (`y`).
///
/// Row zero is the first line of the track source. Coordinates are signed so
/// that candidate moves past the left or top edge remain representable and
/// can be classified as out of bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the position.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position reached by moving `step` cells along `direction`.
    ///
    /// Diagonal directions move `step` cells along both axes at once.
    #[must_use]
    pub const fn advanced(self, direction: Direction, step: i32) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x.saturating_add(dx.saturating_mul(step)),
            y: self.y.saturating_add(dy.saturating_mul(step)),
        }
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Eight-way compass headings available to players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing columns and decreasing rows.
    NorthEast,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing columns and increasing rows.
    SouthEast,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing columns and increasing rows.
    SouthWest,
    /// Movement toward decreasing column indices.
    West,
    /// Movement toward decreasing columns and decreasing rows.
    NorthWest,
}

impl Direction {
    /// Every direction in canonical clockwise order starting at north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Heading angle in degrees, measured counter-clockwise from east.
    #[must_use]
    pub const fn angle_degrees(self) -> u16 {
        match self {
            Self::East => 0,
            Self::NorthEast => 45,
            Self::North => 90,
            Self::NorthWest => 135,
            Self::West => 180,
            Self::SouthWest => 225,
            Self::South => 270,
            Self::SouthEast => 315,
        }
    }

    /// Circular angle distance to `other`, in the range `0..=180` degrees.
    #[must_use]
    pub const fn angle_distance(self, other: Direction) -> u16 {
        let raw = self.angle_degrees().abs_diff(other.angle_degrees());
        if raw > 180 {
            360 - raw
        } else {
            raw
        }
    }

    /// Unit displacement `(dx, dy)` for a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Compass abbreviation such as `"NE"`.
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::NorthEast => "NE",
            Self::East => "E",
            Self::SouthEast => "SE",
            Self::South => "S",
            Self::SouthWest => "SW",
            Self::West => "W",
            Self::NorthWest => "NW",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Direction {
    type Err = DirectionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Direction::ALL
            .into_iter()
            .find(|direction| direction.abbreviation().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DirectionParseError(trimmed.to_owned()))
    }
}

/// Reported when text does not name one of the eight compass directions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a compass direction")]
pub struct DirectionParseError(String);

/// Set of directions with deterministic iteration order.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DirectionSet {
    bits: u8,
}

impl DirectionSet {
    /// Set containing no directions.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Set containing all eight directions.
    #[must_use]
    pub const fn all() -> Self {
        Self { bits: u8::MAX }
    }

    /// Adds `direction` to the set.
    pub fn insert(&mut self, direction: Direction) {
        self.bits |= direction.bit();
    }

    /// Reports whether `direction` is a member of the set.
    #[must_use]
    pub const fn contains(&self, direction: Direction) -> bool {
        self.bits & direction.bit() != 0
    }

    /// Number of directions in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns `true` when the set holds no direction.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Iterates the members in canonical order (N, NE, E, ... NW).
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = Self::empty();
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}

impl fmt::Debug for DirectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for DirectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for direction in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            f.write_str(direction.abbreviation())?;
        }
        Ok(())
    }
}

/// Scalar speed of a player, always within `0..=Velocity::MAX`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Velocity(u8);

impl Velocity {
    /// Fastest permitted speed; also the largest displacement per turn.
    pub const MAX: u8 = 3;

    /// Player at rest.
    pub const ZERO: Velocity = Velocity(0);

    /// Creates a velocity, clamping `value` into `0..=Velocity::MAX`.
    #[must_use]
    pub fn clamped(value: i32) -> Self {
        Self(value.clamp(0, i32::from(Self::MAX)) as u8)
    }

    /// Retrieves the numeric speed.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Applies an acceleration, clamping the result.
    #[must_use]
    pub fn accelerated(self, acceleration: Acceleration) -> Self {
        Self::clamped(i32::from(self.0) + i32::from(acceleration.delta()))
    }

    /// Number of cells travelled in one turn at this speed.
    #[must_use]
    pub fn step(&self) -> i32 {
        i32::from(self.0.min(Self::MAX))
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Change of speed a player requests for the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Acceleration {
    /// Reduce speed by one.
    Decelerate,
    /// Keep the current speed.
    Hold,
    /// Increase speed by one.
    Accelerate,
}

impl Acceleration {
    /// Signed speed delta represented by the acceleration.
    #[must_use]
    pub const fn delta(self) -> i8 {
        match self {
            Self::Decelerate => -1,
            Self::Hold => 0,
            Self::Accelerate => 1,
        }
    }
}

impl TryFrom<i8> for Acceleration {
    type Error = AccelerationOutOfRange;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Decelerate),
            0 => Ok(Self::Hold),
            1 => Ok(Self::Accelerate),
            other => Err(AccelerationOutOfRange(other)),
        }
    }
}

/// Reported when a raw acceleration lies outside `-1..=1`.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("acceleration {0} is outside -1..=1")]
pub struct AccelerationOutOfRange(pub i8);

/// Unique identifier assigned to a registered player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
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

/// Read-only query contract over a loaded race track.
///
/// Every in-bounds cell is either free or an obstacle. Any position outside
/// `width() x height()` reports as an obstacle and never as free. Start and
/// finish cells are free for movement and additionally recorded in their own
/// lists.
pub trait Track {
    /// Number of columns in the grid.
    fn width(&self) -> u32;

    /// Number of rows in the grid.
    fn height(&self) -> u32;

    /// Reports whether `position` is an in-bounds, non-obstacle cell.
    fn is_free(&self, position: Position) -> bool;

    /// Reports whether `position` finishes the race.
    fn is_finish(&self, position: Position) -> bool;

    /// Start cells in load order. Valid tracks hold at least one.
    fn start_positions(&self) -> &[Position];

    /// Finish cells in load order.
    fn finish_positions(&self) -> &[Position];

    /// Reports whether `position` is an obstacle or out of bounds.
    fn is_obstacle(&self, position: Position) -> bool {
        !self.is_free(position)
    }

    /// Reports whether `position` is a start cell.
    fn is_start(&self, position: Position) -> bool {
        self.start_positions().contains(&position)
    }

    /// Reports whether `position` lies inside the grid.
    fn contains(&self, position: Position) -> bool {
        u32::try_from(position.x()).is_ok_and(|x| x < self.width())
            && u32::try_from(position.y()).is_ok_and(|y| y < self.height())
    }
}

/// Policy restricting the headings available to a player at speed.
pub trait InertiaPolicy {
    /// Computes the directions permitted this turn.
    fn allowed_directions(&self, velocity: Velocity, previous: Direction) -> DirectionSet;
}

/// Read-only information a strategy may consult while deciding.
#[derive(Clone, Copy)]
pub struct DecisionContext<'a> {
    position: Position,
    velocity: Velocity,
    track: &'a dyn Track,
    rivals: &'a [Position],
}

impl<'a> DecisionContext<'a> {
    /// Captures a decision context for a single player.
    #[must_use]
    pub fn new(
        position: Position,
        velocity: Velocity,
        track: &'a dyn Track,
        rivals: &'a [Position],
    ) -> Self {
        Self {
            position,
            velocity,
            track,
            rivals,
        }
    }

    /// Position of the deciding player.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current speed of the deciding player.
    #[must_use]
    pub const fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// Track the race is run on.
    #[must_use]
    pub fn track(&self) -> &'a dyn Track {
        self.track
    }

    /// Positions of every other player still on the board.
    #[must_use]
    pub fn rivals(&self) -> &'a [Position] {
        self.rivals
    }
}

impl fmt::Debug for DecisionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionContext")
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("rivals", &self.rivals)
            .finish_non_exhaustive()
    }
}

/// Decision capability the turn engine calls for every player.
pub trait Strategy {
    /// Picks a heading from `allowed`, or `None` to stay put this turn.
    ///
    /// Returning a direction outside `allowed` is a contract violation and
    /// forfeits the turn.
    fn choose_direction(
        &mut self,
        allowed: &DirectionSet,
        context: &DecisionContext<'_>,
    ) -> Option<Direction>;

    /// Picks a speed change in `-1..=1`. Other values forfeit the turn.
    fn choose_acceleration(&mut self, context: &DecisionContext<'_>) -> i8;
}

/// Racer identity and kinematic state paired with its decision strategy.
pub struct Player {
    id: PlayerId,
    name: String,
    position: Position,
    velocity: Velocity,
    strategy: Box<dyn Strategy>,
}

impl Player {
    /// Creates a player at rest on `start`.
    #[must_use]
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        start: Position,
        strategy: Box<dyn Strategy>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            position: start,
            velocity: Velocity::ZERO,
            strategy,
        }
    }

    /// Identifier assigned at registration.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name of the player.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Replaces the stored position.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Current speed.
    #[must_use]
    pub const fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// Stores a new speed, clamping it into `0..=Velocity::MAX`.
    pub fn set_velocity(&mut self, value: i32) {
        self.velocity = Velocity::clamped(value);
    }

    /// Mutable access to the decision strategy.
    pub fn strategy_mut(&mut self) -> &mut dyn Strategy {
        self.strategy.as_mut()
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .finish_non_exhaustive()
    }
}

/// Ways a strategy can break its decision contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyViolation {
    /// The chosen heading was not in the allowed set.
    DirectionNotAllowed {
        /// Heading returned by the strategy.
        direction: Direction,
        /// Set the strategy had to choose from.
        allowed: DirectionSet,
    },
    /// The chosen acceleration lay outside `-1..=1`.
    AccelerationOutOfRange {
        /// Raw value returned by the strategy.
        value: i8,
    },
}

impl fmt::Display for StrategyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectionNotAllowed { direction, allowed } => {
                write!(f, "direction {direction} is not one of [{allowed}]")
            }
            Self::AccelerationOutOfRange { value } => {
                write!(f, "{}", AccelerationOutOfRange(*value))
            }
        }
    }
}

/// Lifecycle stage of a race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RaceState {
    /// Turns are still being played.
    Running,
    /// A player reached a finish cell.
    Finished {
        /// First player to reach a finish cell.
        winner: PlayerId,
    },
    /// The turn limit elapsed without a winner.
    Exhausted {
        /// Configured number of turns.
        turn_limit: u32,
    },
    /// Every player was eliminated.
    AllEliminated,
}

impl RaceState {
    /// Returns `true` for every state other than [`RaceState::Running`].
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Observable transitions broadcast by the turn engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A new turn began.
    TurnStarted {
        /// One-based turn number.
        turn: u32,
    },
    /// A player declined to pick a direction and stays put.
    DirectionDeclined {
        /// Player that declined.
        player: PlayerId,
    },
    /// A player's decision broke the strategy contract; the turn was forfeited.
    StrategyViolated {
        /// Offending player.
        player: PlayerId,
        /// Specific contract breach.
        violation: StrategyViolation,
    },
    /// A player moved to a free cell.
    PlayerMoved {
        /// Player that moved.
        player: PlayerId,
        /// Cell occupied before the move.
        from: Position,
        /// Cell occupied after the move.
        to: Position,
        /// Heading of the move.
        direction: Direction,
        /// Speed after the acceleration was applied.
        velocity: Velocity,
    },
    /// A player's target cell was held by another player; the move was rejected.
    MoveBlocked {
        /// Player whose move was rejected.
        player: PlayerId,
        /// Cell the player attempted to enter.
        target: Position,
        /// Speed after the acceleration was applied; it persists.
        velocity: Velocity,
    },
    /// A player hit an obstacle or left the grid and is out of the race.
    PlayerEliminated {
        /// Eliminated player.
        player: PlayerId,
        /// Cell the player attempted to enter.
        at: Position,
    },
    /// A player reached a finish cell.
    PlayerFinished {
        /// Player that finished.
        player: PlayerId,
        /// Finish cell reached.
        at: Position,
    },
    /// Every active player acted in the turn.
    TurnCompleted {
        /// One-based turn number.
        turn: u32,
    },
    /// The race reached a terminal state.
    RaceEnded {
        /// Terminal state reached.
        state: RaceState,
    },
}
