//! Maze grid: cell storage, procedural generation and collectible bookkeeping.
//!
//! Generation places walls around randomly sampled anchor points, then
//! repairs connectivity so every open cell is reachable from the spawn cell
//! at the grid center.

use std::collections::VecDeque;

use super::geometry::{CellPos, Direction};
use super::rng::SimRng;
use crate::schema::MazeConfig;

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pos: CellPos,
    pub wall: bool,
    pub dot: bool,
    pub bonus: bool,
}

impl Cell {
    fn open(pos: CellPos) -> Self {
        Self {
            pos,
            wall: false,
            dot: false,
            bonus: false,
        }
    }

    #[inline]
    pub fn pos(&self) -> CellPos {
        self.pos
    }
}

/// Fixed-size maze.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    spawn: CellPos,
}

impl Grid {
    /// Generate a maze from configuration.
    ///
    /// The same `rng` state always yields the same grid.
    pub fn generate(config: &MazeConfig, rng: &mut SimRng) -> Self {
        let (width, height) = config.clamped_dimensions();
        let mut grid = Self::open(width, height);

        grid.build_border();
        grid.place_anchor_walls(config.wall_probability, rng);
        if config.thin_wall_clusters {
            grid.thin_wall_clusters();
        }

        let spawn = grid.spawn;
        grid.set_wall(spawn, false);
        let carved = grid.carve_unreached();
        grid.clear_around_spawn(config.spawn_clear_radius);
        if carved > 0 {
            log::debug!("Maze repair carved {} paths to spawn", carved);
        }

        grid.scatter_dots(config.dot_probability, rng);
        grid.place_bonuses(config.bonus_count, rng);
        grid
    }

    /// Build a grid from ASCII rows: `#` wall, `.` dot, `o` bonus, anything
    /// else open. Short rows are padded with walls. The spawn cell is the
    /// grid center.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len().max(1);
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0).max(1);
        let mut grid = Self::open(width, height);

        for (y, row) in rows.iter().enumerate() {
            let mut chars = row.chars();
            for x in 0..width {
                let pos = CellPos::new(x as i32, y as i32);
                let Some(i) = grid.index(pos) else { continue };
                let cell = &mut grid.cells[i];
                match chars.next() {
                    Some('#') | None => cell.wall = true,
                    Some('.') => cell.dot = true,
                    Some('o') => cell.bonus = true,
                    Some(_) => {}
                }
            }
        }
        grid
    }

    fn open(width: usize, height: usize) -> Self {
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::open(CellPos::new(x as i32, y as i32))))
            .collect();
        Self {
            width,
            height,
            cells,
            spawn: CellPos::new((width / 2) as i32, (height / 2) as i32),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Spawn cell for the agent; every open cell is reachable from it.
    #[inline]
    pub fn spawn(&self) -> CellPos {
        self.spawn
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    fn index(&self, pos: CellPos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Cell lookup; `None` outside the grid.
    #[inline]
    pub fn get(&self, pos: CellPos) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    #[inline]
    pub fn in_bounds(&self, pos: CellPos) -> bool {
        self.index(pos).is_some()
    }

    /// Out-of-bounds positions count as walls.
    #[inline]
    pub fn is_wall(&self, pos: CellPos) -> bool {
        self.get(pos).is_none_or(|c| c.wall)
    }

    #[inline]
    pub fn has_dot(&self, pos: CellPos) -> bool {
        self.get(pos).is_some_and(|c| c.dot)
    }

    #[inline]
    pub fn has_bonus(&self, pos: CellPos) -> bool {
        self.get(pos).is_some_and(|c| c.bonus)
    }

    /// Remove the dot at `pos`, returning whether one was there.
    pub fn collect_dot(&mut self, pos: CellPos) -> bool {
        match self.index(pos) {
            Some(i) if self.cells[i].dot => {
                self.cells[i].dot = false;
                true
            }
            _ => false,
        }
    }

    /// Remove the bonus item at `pos`, returning whether one was there.
    pub fn collect_bonus(&mut self, pos: CellPos) -> bool {
        match self.index(pos) {
            Some(i) if self.cells[i].bonus => {
                self.cells[i].bonus = false;
                true
            }
            _ => false,
        }
    }

    pub fn dots_remaining(&self) -> usize {
        self.cells.iter().filter(|c| c.dot).count()
    }

    pub fn bonuses_remaining(&self) -> usize {
        self.cells.iter().filter(|c| c.bonus).count()
    }

    /// Manhattan distance to the nearest cell holding a dot or bonus item.
    pub fn nearest_goal_distance(&self, from: CellPos) -> Option<u32> {
        self.cells
            .iter()
            .filter(|c| c.dot || c.bonus)
            .map(|c| c.pos.manhattan(from))
            .min()
    }

    /// Number of open 4-neighbours of `pos`.
    pub fn open_neighbours(&self, pos: CellPos) -> usize {
        Direction::ALL
            .iter()
            .filter(|d| !self.is_wall(pos.step(**d)))
            .count()
    }

    /// Breadth-first flood fill over open cells, indexed `y * width + x`.
    pub fn reachable_from(&self, start: CellPos) -> Vec<bool> {
        let mut seen = vec![false; self.cells.len()];
        let Some(start_idx) = self.index(start).filter(|&i| !self.cells[i].wall) else {
            return seen;
        };

        let mut queue = VecDeque::new();
        seen[start_idx] = true;
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            for dir in Direction::ALL {
                let next = pos.step(dir);
                if let Some(i) = self.index(next)
                    && !self.cells[i].wall
                    && !seen[i]
                {
                    seen[i] = true;
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Whether every open cell is reachable from the spawn cell.
    pub fn is_connected(&self) -> bool {
        let seen = self.reachable_from(self.spawn);
        self.cells
            .iter()
            .zip(&seen)
            .all(|(cell, reached)| cell.wall || *reached)
    }

    fn set_wall(&mut self, pos: CellPos, wall: bool) {
        if let Some(i) = self.index(pos) {
            self.cells[i].wall = wall;
        }
    }

    fn is_interior(&self, pos: CellPos) -> bool {
        pos.x >= 1
            && pos.y >= 1
            && (pos.x as usize) < self.width - 1
            && (pos.y as usize) < self.height - 1
    }

    fn build_border(&mut self) {
        let (w, h) = (self.width, self.height);
        for cell in &mut self.cells {
            let (x, y) = (cell.pos.x as usize, cell.pos.y as usize);
            if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                cell.wall = true;
            }
        }
    }

    /// Walls at even interior anchors, each extended one cell in a random
    /// direction that keeps the ring inside the border open.
    fn place_anchor_walls(&mut self, probability: f32, rng: &mut SimRng) {
        let (w, h) = (self.width as i32, self.height as i32);
        let mut extensions = Vec::with_capacity(4);

        for y in (2..h - 2).step_by(2) {
            for x in (2..w - 2).step_by(2) {
                if !rng.chance(probability) {
                    continue;
                }
                let anchor = CellPos::new(x, y);
                self.set_wall(anchor, true);

                extensions.clear();
                if y > 2 {
                    extensions.push(Direction::Up);
                }
                if x < w - 3 {
                    extensions.push(Direction::Right);
                }
                if y < h - 3 {
                    extensions.push(Direction::Down);
                }
                if x > 2 {
                    extensions.push(Direction::Left);
                }
                if let Some(dir) = rng.pick(&extensions) {
                    self.set_wall(anchor.step(*dir), true);
                }
            }
        }
    }

    /// Open interior walls that touch more than two other walls.
    fn thin_wall_clusters(&mut self) {
        let (w, h) = (self.width as i32, self.height as i32);
        for y in 2..h - 2 {
            for x in 2..w - 2 {
                let pos = CellPos::new(x, y);
                if !self.is_wall(pos) {
                    continue;
                }
                let walls = Direction::ALL
                    .iter()
                    .filter(|d| self.is_wall(pos.step(**d)))
                    .count();
                if walls > 2 {
                    self.set_wall(pos, false);
                }
            }
        }
    }

    /// Carve an axis-then-axis path back to spawn from every open cell the
    /// flood fill missed. Returns the number of carved paths.
    fn carve_unreached(&mut self) -> usize {
        let mut reached = self.reachable_from(self.spawn);
        let mut carved = 0;

        for i in 0..self.cells.len() {
            if self.cells[i].wall || reached[i] {
                continue;
            }
            carved += 1;

            let mut pos = self.cells[i].pos;
            let target = self.spawn;
            loop {
                if let Some(j) = self.index(pos) {
                    self.cells[j].wall = false;
                    reached[j] = true;
                }
                if pos == target {
                    break;
                }
                if pos.x != target.x {
                    pos.x += (target.x - pos.x).signum();
                } else {
                    pos.y += (target.y - pos.y).signum();
                }
            }
        }
        carved
    }

    fn clear_around_spawn(&mut self, radius: usize) {
        let r = radius as i32;
        let spawn = self.spawn;
        for dy in -r..=r {
            for dx in -r..=r {
                let pos = CellPos::new(spawn.x + dx, spawn.y + dy);
                if self.is_interior(pos) {
                    self.set_wall(pos, false);
                }
            }
        }
    }

    fn scatter_dots(&mut self, probability: f32, rng: &mut SimRng) {
        for cell in &mut self.cells {
            if !cell.wall && rng.chance(probability) {
                cell.dot = true;
            }
        }
    }

    /// Place up to `count` bonus items on distinct open cells with an open
    /// neighbour; a dot under a bonus is removed.
    fn place_bonuses(&mut self, count: usize, rng: &mut SimRng) {
        let mut eligible: Vec<usize> = (0..self.cells.len())
            .filter(|&i| {
                let cell = &self.cells[i];
                !cell.wall && !cell.bonus && self.open_neighbours(cell.pos) > 0
            })
            .collect();

        for _ in 0..count {
            if eligible.is_empty() {
                break;
            }
            let i = eligible.swap_remove(rng.index(eligible.len()));
            let cell = &mut self.cells[i];
            cell.bonus = true;
            cell.dot = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn generated(seed: u64, width: usize, height: usize) -> Grid {
        let config = MazeConfig {
            width,
            height,
            ..Default::default()
        };
        Grid::generate(&config, &mut SimRng::new(seed))
    }

    #[test]
    fn test_border_is_walled() {
        let grid = generated(3, 20, 15);
        for x in 0..20 {
            assert!(grid.is_wall(CellPos::new(x, 0)));
            assert!(grid.is_wall(CellPos::new(x, 14)));
        }
        for y in 0..15 {
            assert!(grid.is_wall(CellPos::new(0, y)));
            assert!(grid.is_wall(CellPos::new(19, y)));
        }
    }

    #[test]
    fn test_same_seed_same_grid() {
        assert_eq!(generated(11, 20, 20), generated(11, 20, 20));
    }

    #[test]
    fn test_spawn_surroundings_open() {
        let grid = generated(5, 20, 20);
        let spawn = grid.spawn();
        assert_eq!(spawn, CellPos::new(10, 10));
        for dir in Direction::ALL {
            assert!(!grid.is_wall(spawn.step(dir)));
        }
    }

    #[test]
    fn test_interior_corners_open() {
        let grid = generated(9, 20, 20);
        for pos in [(1, 1), (18, 1), (1, 18), (18, 18)] {
            assert!(!grid.is_wall(CellPos::new(pos.0, pos.1)));
        }
    }

    #[test]
    fn test_bonus_placement() {
        let grid = generated(21, 20, 20);
        assert_eq!(grid.bonuses_remaining(), 5);
        for cell in grid.cells().iter().filter(|c| c.bonus) {
            assert!(!cell.wall);
            assert!(!cell.dot);
            assert!(grid.open_neighbours(cell.pos()) > 0);
        }
    }

    #[test]
    fn test_tiny_grid() {
        let grid = generated(1, 3, 3);
        assert_eq!(grid.spawn(), CellPos::new(1, 1));
        assert!(!grid.is_wall(grid.spawn()));
        assert!(grid.is_connected());
        // The only open cell has no open neighbour, so no bonus fits.
        assert_eq!(grid.bonuses_remaining(), 0);
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let grid = generated(2, 10, 10);
        assert!(grid.get(CellPos::new(-1, 0)).is_none());
        assert!(grid.get(CellPos::new(10, 3)).is_none());
        assert!(!grid.in_bounds(CellPos::new(10, 3)));
        assert!(!grid.in_bounds(CellPos::new(0, -1)));
        assert!(grid.in_bounds(CellPos::new(0, 0)));
        assert!(grid.in_bounds(CellPos::new(9, 9)));
        assert!(grid.is_wall(CellPos::new(-1, 4)));
        assert!(!grid.has_dot(CellPos::new(50, 50)));
    }

    #[test]
    fn test_carving_reconnects_enclosed_cells() {
        // Open cell at (1,1) sealed off from the center.
        let mut grid = Grid::from_rows(&[
            "#######", //
            "# #   #", //
            "###   #", //
            "#     #", //
            "#     #", //
            "#     #", //
            "#######",
        ]);
        assert!(!grid.is_connected());
        assert_eq!(grid.carve_unreached(), 1);
        assert!(grid.is_connected());
    }

    #[test]
    fn test_collectibles() {
        let mut grid = Grid::from_rows(&[
            "#####", //
            "#.o #", //
            "#   #", //
            "#####",
        ]);
        assert_eq!(grid.nearest_goal_distance(CellPos::new(3, 2)), Some(2));
        assert_eq!(grid.dots_remaining(), 1);
        assert_eq!(grid.bonuses_remaining(), 1);
        assert!(grid.collect_dot(CellPos::new(1, 1)));
        assert!(!grid.collect_dot(CellPos::new(1, 1)));
        assert_eq!(grid.dots_remaining(), 0);
        assert!(grid.collect_bonus(CellPos::new(2, 1)));
        assert_eq!(grid.bonuses_remaining(), 0);
        assert_eq!(grid.nearest_goal_distance(CellPos::new(3, 2)), None);
    }

    proptest! {
        #[test]
        fn prop_generated_grid_is_connected(seed in any::<u64>(), w in 3usize..40, h in 3usize..40) {
            let grid = generated(seed, w, h);
            let seen = grid.reachable_from(grid.spawn());
            for (cell, reached) in grid.cells().iter().zip(&seen) {
                prop_assert!(cell.wall || *reached, "unreachable open cell at {:?}", cell.pos());
            }
        }

        #[test]
        fn prop_bonus_count_bounded(seed in any::<u64>()) {
            let grid = generated(seed, 20, 20);
            prop_assert!(grid.bonuses_remaining() <= 5);
        }
    }
}
