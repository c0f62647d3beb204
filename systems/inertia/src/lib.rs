#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Inertia policy that narrows the available headings as speed grows.

use vector_race_core::{Direction, DirectionSet, InertiaPolicy, Velocity};

/// Widest turn permitted at medium speed, in degrees.
const MEDIUM_SPEED_CONE: u16 = 90;
/// Widest turn permitted at top speed, in degrees.
const TOP_SPEED_CONE: u16 = 45;

/// Standard inertia rule.
///
/// At speed 0 or 1 every heading is available. At speed 2 the player may turn
/// up to 90 degrees from its previous heading, and at speed 3 only up to 45.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultInertia;

impl InertiaPolicy for DefaultInertia {
    fn allowed_directions(&self, velocity: Velocity, previous: Direction) -> DirectionSet {
        let cone = match velocity.get() {
            0 | 1 => return DirectionSet::all(),
            2 => MEDIUM_SPEED_CONE,
            _ => TOP_SPEED_CONE,
        };
        within_cone(previous, cone)
    }
}

fn within_cone(heading: Direction, cone: u16) -> DirectionSet {
    Direction::ALL
        .into_iter()
        .filter(|direction| direction.angle_distance(heading) <= cone)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_neighbours(heading: Direction, reach: usize) -> DirectionSet {
        let index = Direction::ALL
            .iter()
            .position(|direction| *direction == heading)
            .expect("direction in ring");
        (0..=2 * reach)
            .map(|offset| Direction::ALL[(index + 8 - reach + offset) % 8])
            .collect()
    }

    #[test]
    fn low_speed_allows_every_heading() {
        for velocity in [0, 1] {
            for previous in Direction::ALL {
                let allowed =
                    DefaultInertia.allowed_directions(Velocity::clamped(velocity), previous);
                assert_eq!(allowed, DirectionSet::all());
            }
        }
    }

    #[test]
    fn medium_speed_allows_quarter_turns() {
        for previous in Direction::ALL {
            let allowed = DefaultInertia.allowed_directions(Velocity::clamped(2), previous);
            assert_eq!(allowed, ring_neighbours(previous, 2), "previous {previous}");
            assert_eq!(allowed.len(), 5);
        }
    }

    #[test]
    fn medium_speed_heading_north_matches_compass() {
        let allowed = DefaultInertia.allowed_directions(Velocity::clamped(2), Direction::North);
        let expected: DirectionSet = [
            Direction::West,
            Direction::NorthWest,
            Direction::North,
            Direction::NorthEast,
            Direction::East,
        ]
        .into_iter()
        .collect();
        assert_eq!(allowed, expected);
    }

    #[test]
    fn top_speed_allows_previous_and_its_neighbours() {
        for previous in Direction::ALL {
            let allowed = DefaultInertia.allowed_directions(Velocity::clamped(3), previous);
            assert_eq!(allowed, ring_neighbours(previous, 1), "previous {previous}");
            assert_eq!(allowed.len(), 3);
            assert!(allowed.contains(previous));
        }
    }

    #[test]
    fn top_speed_wraps_across_east() {
        let allowed = DefaultInertia.allowed_directions(Velocity::clamped(3), Direction::SouthEast);
        let expected: DirectionSet = [Direction::East, Direction::SouthEast, Direction::South]
            .into_iter()
            .collect();
        assert_eq!(allowed, expected);
    }
}
