#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn engine that drives a Vector Race from the start line to a terminal state.
//!
//! Each turn every active player acts once, in registration order. A player's
//! turn asks the inertia policy which headings remain available, lets the
//! strategy pick a heading and an acceleration, moves the player by its new
//! speed, and resolves the landing cell against the board. Every transition is
//! appended to the caller's event buffer.
//!
//! The first player to land on a finish cell wins, but the turn in which that
//! happens is still completed for the players that follow it; the race stops
//! once the turn ends.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use vector_race_core::{
    Acceleration, DecisionContext, Direction, Event, InertiaPolicy, Player, PlayerId, Position,
    RaceState, Strategy, StrategyViolation, Track,
};
use vector_race_world::{Board, BoardError};

/// Heading assumed for a player that has not moved yet.
pub const INITIAL_HEADING: Direction = Direction::East;

/// Errors raised while setting up a race.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RaceError {
    /// The turn limit must allow at least one turn.
    #[error("turn limit must be at least 1")]
    ZeroTurnLimit,
    /// The board could not be built from the track.
    #[error(transparent)]
    Board(#[from] BoardError),
    /// Players can only join before the first turn.
    #[error("players cannot join a race that has already started")]
    AlreadyStarted,
}

/// Standing of a registered player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlayerStatus {
    /// Still racing.
    Active,
    /// Reached a finish cell during the given turn.
    Finished {
        /// Turn in which the player finished.
        turn: u32,
    },
    /// Left the race after a collision during the given turn.
    Eliminated {
        /// Turn in which the player crashed.
        turn: u32,
    },
}

#[derive(Debug)]
struct Entrant {
    player: Player,
    status: PlayerStatus,
}

/// Outcome of resolving a single player's landing cell.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Landing {
    Moved,
    Finished,
    Blocked,
    Crashed,
}

/// Authoritative race: board, roster, heading history and turn counter.
#[derive(Debug)]
pub struct Race<T, I> {
    board: Board<T>,
    inertia: I,
    entrants: Vec<Entrant>,
    active: Vec<PlayerId>,
    finishers: Vec<PlayerId>,
    headings: BTreeMap<PlayerId, Direction>,
    turn: u32,
    turn_limit: u32,
    state: RaceState,
}

impl<T: Track, I: InertiaPolicy> Race<T, I> {
    /// Creates a race over `track` that ends after at most `turn_limit` turns.
    pub fn new(track: T, inertia: I, turn_limit: u32) -> Result<Self, RaceError> {
        if turn_limit == 0 {
            return Err(RaceError::ZeroTurnLimit);
        }
        Ok(Self {
            board: Board::new(track)?,
            inertia,
            entrants: Vec::new(),
            active: Vec::new(),
            finishers: Vec::new(),
            headings: BTreeMap::new(),
            turn: 0,
            turn_limit,
            state: RaceState::Running,
        })
    }

    /// Adds a player on the next start position and returns its identifier.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        strategy: Box<dyn Strategy>,
    ) -> Result<PlayerId, RaceError> {
        if self.turn > 0 || self.state.is_terminal() {
            return Err(RaceError::AlreadyStarted);
        }
        let id = PlayerId::new(self.entrants.len() as u32);
        let start = self.board.assign_start(id);
        let player = Player::new(id, name, start, strategy);
        info!(player = id.get(), name = player.name(), %start, "player registered");
        self.entrants.push(Entrant {
            player,
            status: PlayerStatus::Active,
        });
        self.active.push(id);
        Ok(id)
    }

    /// Plays one full turn and returns the resulting state.
    ///
    /// Does nothing once the race has reached a terminal state.
    pub fn play_turn(&mut self, out_events: &mut Vec<Event>) -> RaceState {
        if self.state.is_terminal() {
            return self.state;
        }

        self.turn = self.turn.saturating_add(1);
        let turn = self.turn;
        out_events.push(Event::TurnStarted { turn });
        debug!(turn, active = self.active.len(), "turn started");

        let roster = self.active.clone();
        for id in roster {
            if self.active.contains(&id) {
                self.play_player(id, out_events);
            }
        }

        out_events.push(Event::TurnCompleted { turn });
        self.state = self.resolve_state();
        if self.state.is_terminal() {
            info!(turn, state = ?self.state, "race ended");
            out_events.push(Event::RaceEnded { state: self.state });
        }
        self.state
    }

    /// Plays turns until the race ends.
    pub fn run(&mut self, out_events: &mut Vec<Event>) -> RaceState {
        while !self.state.is_terminal() {
            let _ = self.play_turn(out_events);
        }
        self.state
    }

    /// Plays turns until the race ends, handing each turn's events to `observe`.
    pub fn run_with<F>(&mut self, mut observe: F) -> RaceState
    where
        F: FnMut(&Self, &[Event]),
    {
        let mut events = Vec::new();
        while !self.state.is_terminal() {
            events.clear();
            let _ = self.play_turn(&mut events);
            observe(self, &events);
        }
        self.state
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn state(&self) -> RaceState {
        self.state
    }

    /// Number of turns played so far.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Maximum number of turns before the race is exhausted.
    #[must_use]
    pub fn turn_limit(&self) -> u32 {
        self.turn_limit
    }

    /// Board holding the track and the live occupancy map.
    #[must_use]
    pub fn board(&self) -> &Board<T> {
        &self.board
    }

    /// Players still racing, in registration order.
    #[must_use]
    pub fn active_players(&self) -> &[PlayerId] {
        &self.active
    }

    /// Players that reached a finish cell, in the order they arrived.
    #[must_use]
    pub fn finishers(&self) -> &[PlayerId] {
        &self.finishers
    }

    /// Every registered player with its standing, in registration order.
    pub fn players(&self) -> impl Iterator<Item = (&Player, PlayerStatus)> + '_ {
        self.entrants
            .iter()
            .map(|entrant| (&entrant.player, entrant.status))
    }

    /// Looks up a registered player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.entrant(id).map(|entrant| &entrant.player)
    }

    /// Standing of a registered player.
    #[must_use]
    pub fn status(&self, id: PlayerId) -> Option<PlayerStatus> {
        self.entrant(id).map(|entrant| entrant.status)
    }

    /// Last heading chosen by a player still on the board.
    #[must_use]
    pub fn heading(&self, id: PlayerId) -> Option<Direction> {
        self.headings.get(&id).copied()
    }

    fn entrant(&self, id: PlayerId) -> Option<&Entrant> {
        self.entrants.get(id.get() as usize)
    }

    fn play_player(&mut self, id: PlayerId, out_events: &mut Vec<Event>) {
        let index = id.get() as usize;
        let Some(entrant) = self.entrants.get_mut(index) else {
            return;
        };
        let player = &mut entrant.player;
        let origin = player.position();
        let velocity = player.velocity();
        let previous = self.headings.get(&id).copied().unwrap_or(INITIAL_HEADING);
        let allowed = self.inertia.allowed_directions(velocity, previous);

        let rivals: Vec<Position> = self.board.rival_positions(id).collect();
        let context = DecisionContext::new(origin, velocity, self.board.track(), &rivals);
        let strategy = player.strategy_mut();

        let Some(direction) = strategy.choose_direction(&allowed, &context) else {
            debug!(player = id.get(), "declined to move");
            out_events.push(Event::DirectionDeclined { player: id });
            return;
        };
        if !allowed.contains(direction) {
            let violation = StrategyViolation::DirectionNotAllowed { direction, allowed };
            forfeit(id, violation, out_events);
            return;
        }
        let raw = strategy.choose_acceleration(&context);
        let Ok(acceleration) = Acceleration::try_from(raw) else {
            let violation = StrategyViolation::AccelerationOutOfRange { value: raw };
            forfeit(id, violation, out_events);
            return;
        };

        let _ = self.headings.insert(id, direction);
        let velocity = velocity.accelerated(acceleration);
        player.set_velocity(i32::from(velocity.get()));
        let target = origin.advanced(direction, velocity.step());

        let landing = self.land(id, target);
        let turn = self.turn;
        let entrant = &mut self.entrants[index];
        match landing {
            Landing::Moved | Landing::Finished => {
                entrant.player.set_position(target);
                debug!(
                    player = id.get(),
                    from = %origin,
                    to = %target,
                    %direction,
                    %velocity,
                    "moved"
                );
                out_events.push(Event::PlayerMoved {
                    player: id,
                    from: origin,
                    to: target,
                    direction,
                    velocity,
                });
                if landing == Landing::Finished {
                    entrant.status = PlayerStatus::Finished { turn };
                    info!(player = id.get(), at = %target, turn, "reached the finish");
                    out_events.push(Event::PlayerFinished {
                        player: id,
                        at: target,
                    });
                }
            }
            Landing::Blocked => {
                debug!(player = id.get(), %target, %velocity, "target occupied; move rejected");
                out_events.push(Event::MoveBlocked {
                    player: id,
                    target,
                    velocity,
                });
            }
            Landing::Crashed => {
                entrant.status = PlayerStatus::Eliminated { turn };
                info!(player = id.get(), %target, turn, "crashed and was eliminated");
                out_events.push(Event::PlayerEliminated {
                    player: id,
                    at: target,
                });
            }
        }
    }

    /// Resolves `target` for `id` and applies the board and roster side effects.
    fn land(&mut self, id: PlayerId, target: Position) -> Landing {
        if self.board.is_free_for(target, id) {
            if self.board.is_finish(target) {
                // Frozen at the finish: no longer occupies a cell.
                let _ = self.board.remove(id);
                self.active.retain(|active| *active != id);
                self.finishers.push(id);
                return Landing::Finished;
            }
            self.board.update_position(id, target);
            return Landing::Moved;
        }

        if self.board.is_obstacle(target) {
            let _ = self.board.remove(id);
            let _ = self.headings.remove(&id);
            self.active.retain(|active| *active != id);
            return Landing::Crashed;
        }

        Landing::Blocked
    }

    fn resolve_state(&self) -> RaceState {
        if let Some(winner) = self.finishers.first() {
            RaceState::Finished { winner: *winner }
        } else if self.active.is_empty() {
            RaceState::AllEliminated
        } else if self.turn >= self.turn_limit {
            RaceState::Exhausted {
                turn_limit: self.turn_limit,
            }
        } else {
            RaceState::Running
        }
    }
}

fn forfeit(id: PlayerId, violation: StrategyViolation, out_events: &mut Vec<Event>) {
    warn!(player = id.get(), %violation, "strategy broke its contract; turn forfeited");
    out_events.push(Event::StrategyViolated {
        player: id,
        violation,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use vector_race_core::DirectionSet;
    use vector_race_system_inertia::DefaultInertia;
    use vector_race_track::GridTrack;

    struct Eastward;

    impl Strategy for Eastward {
        fn choose_direction(
            &mut self,
            _allowed: &DirectionSet,
            _context: &DecisionContext<'_>,
        ) -> Option<Direction> {
            Some(Direction::East)
        }

        fn choose_acceleration(&mut self, _context: &DecisionContext<'_>) -> i8 {
            1
        }
    }

    fn race(source: &str, turn_limit: u32) -> Race<GridTrack, DefaultInertia> {
        let track: GridTrack = source.parse().expect("valid track");
        Race::new(track, DefaultInertia, turn_limit).expect("valid race")
    }

    #[test]
    fn finishing_on_the_last_turn_beats_exhaustion() {
        let mut race = race("SF", 1);
        let id = race.register("east", Box::new(Eastward)).expect("registration");

        let mut events = Vec::new();
        assert_eq!(race.play_turn(&mut events), RaceState::Finished { winner: id });
    }

    #[test]
    fn crashing_on_the_last_turn_ends_with_no_survivors() {
        let mut race = race("S#", 1);
        let _ = race.register("east", Box::new(Eastward)).expect("registration");

        let mut events = Vec::new();
        assert_eq!(race.play_turn(&mut events), RaceState::AllEliminated);
    }

    #[test]
    fn unmoved_players_default_to_an_eastward_heading() {
        let mut race = race("S..", 2);
        let id = race.register("east", Box::new(Eastward)).expect("registration");

        assert_eq!(race.heading(id), None);
        let mut events = Vec::new();
        let _ = race.play_turn(&mut events);
        assert_eq!(race.heading(id), Some(INITIAL_HEADING));
        assert_eq!(race.status(id), Some(PlayerStatus::Active));
    }
}
