#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player strategies for Vector Race.
//!
//! Every bot owns its own seeded [`ChaCha8Rng`] so that races replay
//! identically for a given seed. None of the strategies depend on engine
//! internals: they see only the allowed heading set and the read-only
//! [`DecisionContext`] the engine hands them.

mod cautious;
mod greedy;
mod human;
mod random;

use std::{fmt, str::FromStr};

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vector_race_core::{DecisionContext, Direction, DirectionSet, Position, Strategy};

pub use self::cautious::{Aware, Defensive, SpeedControl};
pub use self::greedy::Greedy;
pub use self::human::{Human, SharedStdin};
pub use self::random::{Aggressive, Wanderer};

/// Named strategy variants that can be selected from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Random heading and random acceleration.
    Wanderer,
    /// Random heading, accelerates to top speed.
    Aggressive,
    /// Prefers safe headings and brakes.
    Defensive,
    /// Heads for the nearest finish.
    Greedy,
    /// Safe headings, oscillates around top speed.
    SpeedControl,
    /// Avoids rivals and slows down near them.
    Aware,
    /// Reads decisions from standard input.
    Human,
}

impl StrategyKind {
    /// Every selectable variant.
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::Wanderer,
        StrategyKind::Aggressive,
        StrategyKind::Defensive,
        StrategyKind::Greedy,
        StrategyKind::SpeedControl,
        StrategyKind::Aware,
        StrategyKind::Human,
    ];

    /// Configuration name of the variant.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wanderer => "wanderer",
            Self::Aggressive => "aggressive",
            Self::Defensive => "defensive",
            Self::Greedy => "greedy",
            Self::SpeedControl => "speed-control",
            Self::Aware => "aware",
            Self::Human => "human",
        }
    }

    /// Builds a strategy instance. Bots draw from a generator seeded with `seed`.
    #[must_use]
    pub fn build(self, seed: u64) -> Box<dyn Strategy> {
        match self {
            Self::Wanderer => Box::new(Wanderer::new(seed)),
            Self::Aggressive => Box::new(Aggressive::new(seed)),
            Self::Defensive => Box::new(Defensive::new(seed)),
            Self::Greedy => Box::new(Greedy::new(seed)),
            Self::SpeedControl => Box::new(SpeedControl::new(seed)),
            Self::Aware => Box::new(Aware::new(seed)),
            Self::Human => Box::new(Human::stdio()),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownStrategy(trimmed.to_owned()))
    }
}

/// Reported when a configuration names a strategy that does not exist.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown strategy '{0}'")]
pub struct UnknownStrategy(String);

pub(crate) fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub(crate) fn pick(rng: &mut ChaCha8Rng, options: &[Direction]) -> Option<Direction> {
    options.choose(rng).copied()
}

/// Cell one unit step from the deciding player along `direction`.
pub(crate) fn unit_step(position: Position, direction: Direction) -> Position {
    position.advanced(direction, 1)
}

/// Allowed headings whose adjacent cell is track-free.
pub(crate) fn safe_directions(
    allowed: &DirectionSet,
    context: &DecisionContext<'_>,
) -> Vec<Direction> {
    allowed
        .iter()
        .filter(|direction| {
            context
                .track()
                .is_free(unit_step(context.position(), *direction))
        })
        .collect()
}
