use rand_chacha::ChaCha8Rng;
use vector_race_core::{DecisionContext, Direction, DirectionSet, Position, Strategy, Track};

use crate::{pick, safe_directions, seeded, unit_step};

/// Heads for the nearest finish cell while preferring open corridors.
///
/// Each safe heading is scored as the free run length ahead of the next cell
/// minus the Manhattan distance from that cell to the nearest finish. The
/// first best-scoring heading in canonical order wins.
#[derive(Clone, Debug)]
pub struct Greedy {
    rng: ChaCha8Rng,
}

impl Greedy {
    /// Creates a greedy bot. The generator is only used on tracks without a finish.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: seeded(seed) }
    }
}

impl Strategy for Greedy {
    fn choose_direction(
        &mut self,
        allowed: &DirectionSet,
        context: &DecisionContext<'_>,
    ) -> Option<Direction> {
        let safe = safe_directions(allowed, context);
        let track = context.track();
        if track.finish_positions().is_empty() {
            return pick(&mut self.rng, &safe);
        }

        let mut best: Option<(i64, Direction)> = None;
        for direction in safe {
            let next = unit_step(context.position(), direction);
            let Some(distance) = nearest_finish(track, next) else {
                continue;
            };
            let score = i64::from(free_run(track, next, direction)) - i64::from(distance);
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, direction));
            }
        }
        best.map(|(_, direction)| direction)
    }

    fn choose_acceleration(&mut self, _context: &DecisionContext<'_>) -> i8 {
        1
    }
}

fn nearest_finish(track: &dyn Track, from: Position) -> Option<u32> {
    track
        .finish_positions()
        .iter()
        .map(|finish| from.manhattan_distance(*finish))
        .min()
}

/// Number of free cells beyond `start` before the first obstacle.
fn free_run(track: &dyn Track, start: Position, direction: Direction) -> u32 {
    let mut run = 0;
    let mut current = start;
    loop {
        let next = unit_step(current, direction);
        if !track.is_free(next) {
            return run;
        }
        run += 1;
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn heads_toward_the_finish() {
        let track = testing::track(".....\nS...F\n.....");
        let context = testing::context(&track, Position::new(0, 1), 0, &[]);

        assert_eq!(
            Greedy::new(0).choose_direction(&DirectionSet::all(), &context),
            Some(Direction::East)
        );
    }

    #[test]
    fn respects_the_allowed_set() {
        let track = testing::track(".....\nS...F\n.....");
        let context = testing::context(&track, Position::new(0, 1), 3, &[]);
        let allowed: DirectionSet = [Direction::North, Direction::NorthEast, Direction::NorthWest]
            .into_iter()
            .collect();

        assert_eq!(
            Greedy::new(0).choose_direction(&allowed, &context),
            Some(Direction::NorthEast)
        );
    }

    #[test]
    fn declines_when_no_heading_is_safe() {
        let track = testing::track("#####\n#S#F#\n#####");
        let context = testing::context(&track, Position::new(1, 1), 0, &[]);

        assert_eq!(
            Greedy::new(0).choose_direction(&DirectionSet::all(), &context),
            None
        );
    }

    #[test]
    fn free_run_stops_at_the_grid_edge() {
        let track = testing::track("S....");
        assert_eq!(free_run(&track, Position::new(0, 0), Direction::East), 4);
        assert_eq!(free_run(&track, Position::new(0, 0), Direction::West), 0);
    }

    #[test]
    fn always_accelerates() {
        let track = testing::track("S.F");
        let context = testing::context(&track, Position::new(0, 0), 3, &[]);
        assert_eq!(Greedy::new(0).choose_acceleration(&context), 1);
    }
}
