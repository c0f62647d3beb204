use rand_chacha::ChaCha8Rng;
use vector_race_core::{DecisionContext, Direction, DirectionSet, Strategy, Velocity};

use crate::{pick, safe_directions, seeded, unit_step};

/// Rivals within this Manhattan distance make an [`Aware`] bot brake.
const RIVAL_CAUTION_DISTANCE: u32 = 3;

/// Prefers headings whose next cell is free and keeps braking.
#[derive(Clone, Debug)]
pub struct Defensive {
    rng: ChaCha8Rng,
}

impl Defensive {
    /// Creates a defensive bot drawing from a generator seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: seeded(seed) }
    }
}

impl Strategy for Defensive {
    fn choose_direction(
        &mut self,
        allowed: &DirectionSet,
        context: &DecisionContext<'_>,
    ) -> Option<Direction> {
        let safe = safe_directions(allowed, context);
        if !safe.is_empty() {
            return pick(&mut self.rng, &safe);
        }
        let options: Vec<_> = allowed.iter().collect();
        pick(&mut self.rng, &options)
    }

    fn choose_acceleration(&mut self, context: &DecisionContext<'_>) -> i8 {
        if context.velocity() > Velocity::ZERO {
            -1
        } else {
            0
        }
    }
}

/// Takes safe headings only and oscillates around top speed.
#[derive(Clone, Debug)]
pub struct SpeedControl {
    rng: ChaCha8Rng,
}

impl SpeedControl {
    /// Creates a speed-control bot drawing from a generator seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: seeded(seed) }
    }
}

impl Strategy for SpeedControl {
    fn choose_direction(
        &mut self,
        allowed: &DirectionSet,
        context: &DecisionContext<'_>,
    ) -> Option<Direction> {
        pick(&mut self.rng, &safe_directions(allowed, context))
    }

    fn choose_acceleration(&mut self, context: &DecisionContext<'_>) -> i8 {
        if context.velocity().get() < Velocity::MAX {
            1
        } else {
            -1
        }
    }
}

/// Steers clear of rivals and slows down when one is close.
#[derive(Clone, Debug)]
pub struct Aware {
    rng: ChaCha8Rng,
}

impl Aware {
    /// Creates an aware bot drawing from a generator seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: seeded(seed) }
    }
}

impl Strategy for Aware {
    fn choose_direction(
        &mut self,
        allowed: &DirectionSet,
        context: &DecisionContext<'_>,
    ) -> Option<Direction> {
        let clear: Vec<_> = safe_directions(allowed, context)
            .into_iter()
            .filter(|direction| {
                let next = unit_step(context.position(), *direction);
                !context.rivals().contains(&next)
            })
            .collect();
        pick(&mut self.rng, &clear)
    }

    fn choose_acceleration(&mut self, context: &DecisionContext<'_>) -> i8 {
        let crowded = context
            .rivals()
            .iter()
            .any(|rival| context.position().manhattan_distance(*rival) <= RIVAL_CAUTION_DISTANCE);
        match (crowded, context.velocity() > Velocity::ZERO) {
            (true, true) => -1,
            (true, false) => 0,
            (false, _) => 1,
        }
    }
}
