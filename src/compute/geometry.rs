//! Cardinal directions and integer cell positions.

use serde::{Deserialize, Serialize};

/// One of the four movement directions.
///
/// The declaration order (up, right, down, left) is the order used for
/// sensor features and brain outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit step in grid coordinates (y grows downwards).
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Position in [`Direction::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Direction::index`], wrapping modulo 4.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }
}

/// Integer grid coordinate. May lie outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
}

impl CellPos {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing a continuous position in cell units.
    #[inline]
    pub fn containing(x: f32, y: f32) -> Self {
        Self::new(x.floor() as i32, y.floor() as i32)
    }

    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        self.offset(dir, 1)
    }

    #[inline]
    pub fn offset(self, dir: Direction, distance: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx * distance, self.y + dy * distance)
    }

    #[inline]
    pub fn manhattan(self, other: CellPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Center of the cell in continuous cell units.
    #[inline]
    pub fn center(self) -> (f32, f32) {
        (self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dy) = dir.delta();
            let (ox, oy) = dir.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
            assert_eq!(Direction::from_index(dir.index()), dir);
        }
    }

    #[test]
    fn test_cell_math() {
        let a = CellPos::new(2, 3);
        assert_eq!(a.step(Direction::Up), CellPos::new(2, 2));
        assert_eq!(a.offset(Direction::Right, 4), CellPos::new(6, 3));
        assert_eq!(a.manhattan(CellPos::new(-1, 5)), 5);
        assert_eq!(CellPos::containing(2.99, 0.01), CellPos::new(2, 0));
        assert_eq!(CellPos::containing(-0.2, 0.0), CellPos::new(-1, 0));
        assert_eq!(a.center(), (2.5, 3.5));
    }
}
