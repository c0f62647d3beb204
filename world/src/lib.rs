#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for Vector Race.
//!
//! The board pairs the static [`Track`] with the live occupancy map of every
//! tracked player. The occupancy map is the single source of truth for where
//! players stand; the turn engine keeps each player's own stored position in
//! sync with it on every committed move and removes entries on elimination.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;
use vector_race_core::{PlayerId, Position, Track};

/// Errors raised while constructing a board.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// The track does not declare any start position.
    #[error("track has no start position")]
    NoStartPositions,
}

/// Track plus the positions of every tracked player.
#[derive(Debug)]
pub struct Board<T> {
    track: T,
    positions: BTreeMap<PlayerId, Position>,
    next_start: usize,
    last_start: Position,
}

impl<T: Track> Board<T> {
    /// Creates an empty board over `track`.
    pub fn new(track: T) -> Result<Self, BoardError> {
        let last_start = track
            .start_positions()
            .last()
            .copied()
            .ok_or(BoardError::NoStartPositions)?;
        Ok(Self {
            track,
            positions: BTreeMap::new(),
            next_start: 0,
            last_start,
        })
    }

    /// Read-only access to the underlying track.
    #[must_use]
    pub fn track(&self) -> &T {
        &self.track
    }

    /// Binds `player` to the next unused start position and returns it.
    ///
    /// Starts are handed out in load order. Once every start has been used the
    /// last one is reused for any further player, so surplus players share a
    /// cell until they move off it.
    pub fn assign_start(&mut self, player: PlayerId) -> Position {
        let start = self
            .track
            .start_positions()
            .get(self.next_start)
            .copied()
            .unwrap_or(self.last_start);
        self.next_start = self.next_start.saturating_add(1);
        let _ = self.positions.insert(player, start);
        debug!(player = player.get(), %start, "assigned start position");
        start
    }

    /// Reports whether `position` is track-free and held by no tracked player.
    #[must_use]
    pub fn is_free(&self, position: Position) -> bool {
        self.track.is_free(position) && self.occupant(position).is_none()
    }

    /// Same as [`Board::is_free`], ignoring `player`'s own entry.
    #[must_use]
    pub fn is_free_for(&self, position: Position, player: PlayerId) -> bool {
        self.track.is_free(position)
            && !self
                .positions
                .iter()
                .any(|(id, held)| *id != player && *held == position)
    }

    /// Reports whether `position` is an obstacle or outside the grid.
    #[must_use]
    pub fn is_obstacle(&self, position: Position) -> bool {
        self.track.is_obstacle(position)
    }

    /// Reports whether `position` is a finish cell.
    #[must_use]
    pub fn is_finish(&self, position: Position) -> bool {
        self.track.is_finish(position)
    }

    /// Replaces the stored position of `player`.
    ///
    /// Freeness is not validated here; callers resolve collisions first.
    pub fn update_position(&mut self, player: PlayerId, position: Position) {
        let _ = self.positions.insert(player, position);
    }

    /// Stops tracking `player`, returning its last position.
    pub fn remove(&mut self, player: PlayerId) -> Option<Position> {
        self.positions.remove(&player)
    }

    /// Position currently held by `player`.
    #[must_use]
    pub fn position_of(&self, player: PlayerId) -> Option<Position> {
        self.positions.get(&player).copied()
    }

    /// Lowest-numbered player standing on `position`, if any.
    #[must_use]
    pub fn occupant(&self, position: Position) -> Option<PlayerId> {
        self.positions
            .iter()
            .find_map(|(id, held)| (*held == position).then_some(*id))
    }

    /// Positions of every tracked player other than `player`.
    pub fn rival_positions(&self, player: PlayerId) -> impl Iterator<Item = Position> + '_ {
        self.positions
            .iter()
            .filter(move |(id, _)| **id != player)
            .map(|(_, position)| *position)
    }

    /// Every tracked player with its position, ordered by identifier.
    pub fn positions(&self) -> impl Iterator<Item = (PlayerId, Position)> + '_ {
        self.positions.iter().map(|(id, position)| (*id, *position))
    }
}
