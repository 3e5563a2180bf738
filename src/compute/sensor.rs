//! Directional ray sensing for the agent.

use super::geometry::{CellPos, Direction};
use super::grid::Grid;
use crate::schema::SENSOR_INPUTS;

/// Feature channels reported per direction, in vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Wall,
    Dot,
    Bonus,
    Pursuer,
}

impl Channel {
    pub const COUNT: usize = 4;
}

/// Index of a feature in the sensor vector.
#[inline]
pub fn feature_index(dir: Direction, channel: Channel) -> usize {
    dir.index() * Channel::COUNT + channel as usize
}

/// Scan outward from `origin` in each direction up to `range` cells.
///
/// Every channel records its first hit at distance `d` as `1 - d / range`;
/// a wall (or the grid edge) ends the scan in that direction.
pub fn sense(
    origin: CellPos,
    grid: &Grid,
    pursuers: &[CellPos],
    range: usize,
) -> [f32; SENSOR_INPUTS] {
    let mut features = [0.0; SENSOR_INPUTS];
    if range == 0 {
        return features;
    }
    let closeness = |d: usize| 1.0 - d as f32 / range as f32;

    for dir in Direction::ALL {
        let mut dot = false;
        let mut bonus = false;
        let mut pursuer = false;

        for d in 1..=range {
            let pos = origin.offset(dir, d as i32);
            if grid.is_wall(pos) {
                features[feature_index(dir, Channel::Wall)] = closeness(d);
                break;
            }
            if !dot && grid.has_dot(pos) {
                dot = true;
                features[feature_index(dir, Channel::Dot)] = closeness(d);
            }
            if !bonus && grid.has_bonus(pos) {
                bonus = true;
                features[feature_index(dir, Channel::Bonus)] = closeness(d);
            }
            if !pursuer && pursuers.contains(&pos) {
                pursuer = true;
                features[feature_index(dir, Channel::Pursuer)] = closeness(d);
            }
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Grid {
        Grid::from_rows(&[
            "#########", //
            "#  . o  #", //
            "#########",
        ])
    }

    #[test]
    fn test_features_in_corridor() {
        let grid = corridor();
        let origin = CellPos::new(1, 1);
        let features = sense(origin, &grid, &[CellPos::new(6, 1)], 5);

        // Dot at distance 2, bonus at 4, pursuer at 5.
        assert!((features[feature_index(Direction::Right, Channel::Dot)] - 0.6).abs() < 1e-6);
        assert!((features[feature_index(Direction::Right, Channel::Bonus)] - 0.2).abs() < 1e-6);
        assert_eq!(features[feature_index(Direction::Right, Channel::Pursuer)], 0.0);
        assert_eq!(features[feature_index(Direction::Right, Channel::Wall)], 0.0);

        // Walls directly adjacent above, below and to the left.
        for dir in [Direction::Up, Direction::Down, Direction::Left] {
            assert!((features[feature_index(dir, Channel::Wall)] - 0.8).abs() < 1e-6);
        }
    }

    #[test]
    fn test_wall_blocks_scan() {
        let grid = Grid::from_rows(&[
            "#######", //
            "#  # .#", //
            "#######",
        ]);
        let features = sense(CellPos::new(1, 1), &grid, &[CellPos::new(4, 1)], 5);
        assert!((features[feature_index(Direction::Right, Channel::Wall)] - 0.6).abs() < 1e-6);
        assert_eq!(features[feature_index(Direction::Right, Channel::Dot)], 0.0);
        assert_eq!(features[feature_index(Direction::Right, Channel::Pursuer)], 0.0);
    }

    #[test]
    fn test_all_features_in_unit_range() {
        let grid = corridor();
        let features = sense(CellPos::new(4, 1), &grid, &[CellPos::new(2, 1)], 5);
        assert_eq!(features.len(), SENSOR_INPUTS);
        assert!(features.iter().all(|f| (0.0..1.0).contains(f)));
        assert!((features[feature_index(Direction::Left, Channel::Pursuer)] - 0.6).abs() < 1e-6);
    }
}
