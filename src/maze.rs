use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::rng::Rng;
use crate::types::Cell;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    Wall,
    Open,
}

/// Generated level layout. Immutable once returned by [`generate_maze`].
#[derive(Clone, Debug)]
pub struct MazeGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    start: Option<Cell>,
}

const CARVE_STEPS: [(i32, i32); 4] = [(0, -2), (0, 2), (-2, 0), (2, 0)];

/// Carves a perfect maze on the odd lattice starting at (1, 1), then injects
/// `width * height * loop_density` loop trials.
pub fn generate_maze(width: i32, height: i32, loop_density: f32, rng: &mut Rng) -> MazeGrid {
    let width = width.max(0);
    let height = height.max(0);
    let mut grid = MazeGrid {
        width,
        height,
        tiles: vec![Tile::Wall; (width * height) as usize],
        start: None,
    };
    if width < 3 || height < 3 {
        log::debug!("maze {width}x{height} has no interior; leaving it solid");
        return grid;
    }

    let start = Cell::new(1, 1);
    grid.set(start, Tile::Open);
    grid.start = Some(start);
    carve(&mut grid, start, rng);
    let opened = inject_loops(&mut grid, loop_density, rng);
    log::debug!("maze {width}x{height}: {} loop cells opened", opened.len());
    grid
}

/// Depth-first carve. Each frame keeps its own shuffled step order, so the
/// visit order matches the recursive formulation without growing the call stack.
fn carve(grid: &mut MazeGrid, start: Cell, rng: &mut Rng) {
    let mut stack: Vec<(Cell, [(i32, i32); 4], usize)> = Vec::new();
    let mut steps = CARVE_STEPS;
    rng.shuffle(&mut steps);
    stack.push((start, steps, 0));

    while let Some((cell, steps, next)) = stack.last_mut() {
        if *next >= steps.len() {
            stack.pop();
            continue;
        }
        let (dx, dy) = steps[*next];
        *next += 1;
        let target = Cell::new(cell.x + dx, cell.y + dy);
        if !grid.is_interior(target) || grid.tile(target) != Tile::Wall {
            continue;
        }
        let between = Cell::new(cell.x + dx / 2, cell.y + dy / 2);
        grid.set(between, Tile::Open);
        grid.set(target, Tile::Open);

        let mut child_steps = CARVE_STEPS;
        rng.shuffle(&mut child_steps);
        stack.push((target, child_steps, 0));
    }
}

/// Returns the cells opened, in the order they were opened.
fn inject_loops(grid: &mut MazeGrid, loop_density: f32, rng: &mut Rng) -> Vec<Cell> {
    let trials = ((grid.width * grid.height) as f32 * loop_density.max(0.0)).ceil() as usize;
    let mut opened = Vec::new();
    for _ in 0..trials {
        let cell = Cell::new(
            rng.int(1, grid.width - 2),
            rng.int(1, grid.height - 2),
        );
        if grid.tile(cell) == Tile::Wall && grid.open_neighbor_count(cell) >= 2 {
            grid.set(cell, Tile::Open);
            opened.push(cell);
        }
    }
    opened
}

impl MazeGrid {
    /// Builds a grid from rows of `#` (wall) and `.` (open). The first open
    /// cell in reading order becomes the start cell.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as i32;
        let mut grid = MazeGrid {
            width,
            height,
            tiles: vec![Tile::Wall; (width * height) as usize],
            start: None,
        };
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.bytes().enumerate() {
                if ch == b'.' {
                    let cell = Cell::new(x as i32, y as i32);
                    grid.set(cell, Tile::Open);
                    if grid.start.is_none() {
                        grid.start = Some(cell);
                    }
                }
            }
        }
        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn start(&self) -> Option<Cell> {
        self.start
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    fn is_interior(&self, cell: Cell) -> bool {
        cell.x > 0 && cell.y > 0 && cell.x < self.width - 1 && cell.y < self.height - 1
    }

    /// Out-of-bounds cells read as walls.
    pub fn tile(&self, cell: Cell) -> Tile {
        if !self.in_bounds(cell) {
            return Tile::Wall;
        }
        self.tiles[(cell.y * self.width + cell.x) as usize]
    }

    pub fn is_open(&self, cell: Cell) -> bool {
        self.tile(cell) == Tile::Open
    }

    pub fn is_wall(&self, cell: Cell) -> bool {
        self.tile(cell) == Tile::Wall
    }

    fn set(&mut self, cell: Cell, tile: Tile) {
        if self.in_bounds(cell) {
            let idx = (cell.y * self.width + cell.x) as usize;
            self.tiles[idx] = tile;
        }
    }

    pub fn open_neighbor_count(&self, cell: Cell) -> usize {
        cell.neighbors()
            .into_iter()
            .filter(|neighbor| self.is_open(*neighbor))
            .count()
    }

    pub fn open_cells(&self) -> Vec<Cell> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = Cell::new(x, y);
                if self.is_open(cell) {
                    out.push(cell);
                }
            }
        }
        out
    }

    pub fn open_count(&self) -> usize {
        self.tiles.iter().filter(|tile| **tile == Tile::Open).count()
    }

    /// 4-directional flood fill over open cells.
    pub fn reachable_from(&self, start: Cell) -> HashSet<Cell> {
        let mut out = HashSet::new();
        if !self.is_open(start) {
            return out;
        }
        let mut queue = VecDeque::new();
        out.insert(start);
        queue.push_back(start);
        while let Some(cell) = queue.pop_front() {
            for next in cell.neighbors() {
                if self.is_open(next) && out.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        out
    }

    /// Open cell with the smallest Manhattan distance to `target`, ties broken
    /// by row then column.
    pub fn nearest_open(&self, target: Cell) -> Option<Cell> {
        let mut best: Option<(i32, i32, i32, Cell)> = None;
        for cell in self.open_cells() {
            let dist = (cell.x - target.x).abs() + (cell.y - target.y).abs();
            let key = (dist, cell.y, cell.x, cell);
            if best
                .map(|v| (v.0, v.1, v.2) > (key.0, key.1, key.2))
                .unwrap_or(true)
            {
                best = Some(key);
            }
        }
        best.map(|(_, _, _, cell)| cell)
    }

    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| match self.tile(Cell::new(x, y)) {
                        Tile::Wall => '#',
                        Tile::Open => '.',
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{generate_maze, inject_loops, MazeGrid, Tile};
    use crate::rng::Rng;
    use crate::types::Cell;

    fn assert_fully_connected(grid: &MazeGrid) {
        let start = grid.start().expect("maze has a start cell");
        let reachable = grid.reachable_from(start);
        assert_eq!(reachable.len(), grid.open_count());
    }

    #[test]
    fn every_open_cell_is_reachable_from_start() {
        for seed in 0..200u64 {
            let mut rng = Rng::new(seed);
            let grid = generate_maze(15, 11, 0.25, &mut rng);
            assert_fully_connected(&grid);
        }
    }

    #[test]
    fn perfect_maze_visits_every_lattice_cell() {
        let mut rng = Rng::new(11);
        let grid = generate_maze(21, 15, 0.0, &mut rng);
        for y in (1..14).step_by(2) {
            for x in (1..20).step_by(2) {
                assert!(grid.is_open(Cell::new(x, y)), "lattice cell {x},{y} stayed closed");
            }
        }
        // A spanning tree over 10x7 lattice cells has exactly 69 connectors.
        assert_eq!(grid.open_count(), 70 + 69);
    }

    #[test]
    fn border_stays_solid() {
        let mut rng = Rng::new(5);
        let grid = generate_maze(17, 13, 1.0, &mut rng);
        for x in 0..grid.width() {
            assert!(grid.is_wall(Cell::new(x, 0)));
            assert!(grid.is_wall(Cell::new(x, grid.height() - 1)));
        }
        for y in 0..grid.height() {
            assert!(grid.is_wall(Cell::new(0, y)));
            assert!(grid.is_wall(Cell::new(grid.width() - 1, y)));
        }
    }

    #[test]
    fn loop_injection_adds_cycles() {
        let mut rng = Rng::new(42);
        let perfect = generate_maze(15, 11, 0.0, &mut rng);
        let mut rng = Rng::new(42);
        let loopy = generate_maze(15, 11, 0.25, &mut rng);
        assert!(loopy.open_count() > perfect.open_count());
    }

    #[test]
    fn degenerate_sizes_do_not_panic() {
        for (w, h) in [(0, 0), (1, 1), (2, 7), (7, 2), (3, 3), (4, 4), (-3, 5)] {
            let mut rng = Rng::new(1);
            let grid = generate_maze(w, h, 0.5, &mut rng);
            if w >= 3 && h >= 3 {
                assert_fully_connected(&grid);
            } else {
                assert_eq!(grid.open_count(), 0);
                assert!(grid.start().is_none());
            }
        }
    }

    #[test]
    fn nearest_open_prefers_manhattan_then_row() {
        let grid = MazeGrid::from_rows(&["#####", "#.#.#", "#####"]);
        assert_eq!(grid.nearest_open(Cell::new(2, 1)), Some(Cell::new(1, 1)));
        assert_eq!(grid.nearest_open(Cell::new(4, 2)), Some(Cell::new(3, 1)));
        assert_eq!(grid.start(), Some(Cell::new(1, 1)));
    }

    #[test]
    fn from_rows_round_trips_layout() {
        let rows = ["#####", "#...#", "#.#.#", "#####"];
        let grid = MazeGrid::from_rows(&rows);
        assert_eq!(grid.to_rows(), rows.iter().map(|r| r.to_string()).collect::<Vec<_>>());
        assert_eq!(grid.tile(Cell::new(-1, 0)), Tile::Wall);
    }

    proptest! {
        #[test]
        fn generated_mazes_are_connected(
            seed in any::<u64>(),
            half_w in 2i32..12,
            half_h in 2i32..12,
            density in 0.0f32..1.0,
        ) {
            let mut rng = Rng::new(seed);
            let grid = generate_maze(half_w * 2 + 1, half_h * 2 + 1, density, &mut rng);
            let start = grid.start().expect("start exists");
            prop_assert_eq!(grid.reachable_from(start).len(), grid.open_count());
        }

        #[test]
        fn loop_injection_only_opens_cells_with_two_open_neighbors(
            seed in any::<u64>(),
            density in 0.05f32..1.0,
        ) {
            let mut rng = Rng::new(seed);
            let mut grid = generate_maze(19, 15, 0.0, &mut rng);
            let mut replay = grid.clone();
            let opened = inject_loops(&mut grid, density, &mut rng);
            for cell in opened {
                prop_assert!(replay.is_wall(cell));
                prop_assert!(replay.open_neighbor_count(cell) >= 2);
                replay.set(cell, Tile::Open);
            }
            prop_assert_eq!(replay.to_rows(), grid.to_rows());
        }
    }
}
