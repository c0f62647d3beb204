use rand::Rng;
use rand_chacha::ChaCha8Rng;
use vector_race_core::{DecisionContext, Direction, DirectionSet, Strategy, Velocity};

use crate::{pick, seeded};

/// Picks headings and accelerations uniformly at random.
#[derive(Clone, Debug)]
pub struct Wanderer {
    rng: ChaCha8Rng,
}

impl Wanderer {
    /// Creates a wanderer drawing from a generator seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: seeded(seed) }
    }
}

impl Strategy for Wanderer {
    fn choose_direction(
        &mut self,
        allowed: &DirectionSet,
        _context: &DecisionContext<'_>,
    ) -> Option<Direction> {
        let options: Vec<_> = allowed.iter().collect();
        pick(&mut self.rng, &options)
    }

    fn choose_acceleration(&mut self, _context: &DecisionContext<'_>) -> i8 {
        self.rng.gen_range(-1..=1)
    }
}

/// Random heading, but always pushes toward top speed.
#[derive(Clone, Debug)]
pub struct Aggressive {
    rng: ChaCha8Rng,
}

impl Aggressive {
    /// Creates an aggressive bot drawing from a generator seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: seeded(seed) }
    }
}

impl Strategy for Aggressive {
    fn choose_direction(
        &mut self,
        allowed: &DirectionSet,
        _context: &DecisionContext<'_>,
    ) -> Option<Direction> {
        let options: Vec<_> = allowed.iter().collect();
        pick(&mut self.rng, &options)
    }

    fn choose_acceleration(&mut self, context: &DecisionContext<'_>) -> i8 {
        if context.velocity().get() < Velocity::MAX {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use vector_race_core::Position;

    #[test]
    fn wanderer_stays_inside_allowed_subset() {
        let track = testing::track("S....");
        let context = testing::context(&track, Position::new(0, 0), 2, &[]);
        let allowed: DirectionSet = [Direction::East, Direction::SouthEast, Direction::South]
            .into_iter()
            .collect();
        let mut bot = Wanderer::new(11);

        for _ in 0..64 {
            let chosen = bot.choose_direction(&allowed, &context).expect("non-empty set");
            assert!(allowed.contains(chosen));
            assert!((-1..=1).contains(&bot.choose_acceleration(&context)));
        }
    }

    #[test]
    fn same_seed_replays_same_choices() {
        let track = testing::track("S....");
        let context = testing::context(&track, Position::new(0, 0), 0, &[]);
        let mut first = Wanderer::new(99);
        let mut second = Wanderer::new(99);

        for _ in 0..16 {
            assert_eq!(
                first.choose_direction(&DirectionSet::all(), &context),
                second.choose_direction(&DirectionSet::all(), &context)
            );
            assert_eq!(
                first.choose_acceleration(&context),
                second.choose_acceleration(&context)
            );
        }
    }

    #[test]
    fn empty_allowed_set_yields_no_direction() {
        let track = testing::track("S");
        let context = testing::context(&track, Position::new(0, 0), 0, &[]);

        assert_eq!(
            Aggressive::new(1).choose_direction(&DirectionSet::empty(), &context),
            None
        );
    }

    #[test]
    fn aggressive_accelerates_until_top_speed() {
        let track = testing::track("S....");
        let mut bot = Aggressive::new(5);

        let slow = testing::context(&track, Position::new(0, 0), 1, &[]);
        assert_eq!(bot.choose_acceleration(&slow), 1);
        let fast = testing::context(&track, Position::new(0, 0), 3, &[]);
        assert_eq!(bot.choose_acceleration(&fast), 0);
    }
}
