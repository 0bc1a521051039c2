//! Maze generation.
//!
//! Mazes are square boolean grids of odd dimension. Corridors run along odd
//! coordinates and walls sit on even ones, so the outer ring is always solid
//! until the caller carves an exit.
//!
//! Generation is a randomized depth-first backtracker over the odd lattice,
//! starting at [`START_CELL`]. It is a pure function of `(dimension, seed)`.

use std::collections::VecDeque;
use std::fmt;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cell every generated corridor is reachable from.
pub const START_CELL: Cell = Cell::new(1, 1);

/// Lattice steps: up, right, down, left.
const STEPS: [(isize, isize); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Maze and session errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MazeError {
    /// Dimension was even or smaller than 3.
    InvalidDimension(usize),
    /// No passable cell exists to place the ball on.
    NoValidCellFound,
    /// The configured start cell is a wall or lies outside the grid.
    StartCellBlocked(Cell),
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MazeError::InvalidDimension(d) => {
                write!(f, "invalid maze dimension {d}: must be odd and at least 3")
            }
            MazeError::NoValidCellFound => write!(f, "no passable cell found in maze"),
            MazeError::StartCellBlocked(cell) => {
                write!(f, "start cell {cell} is not a corridor cell")
            }
        }
    }
}

impl std::error::Error for MazeError {}

/// Checks the generation input contract.
pub fn validate_dimension(dimension: usize) -> Result<(), MazeError> {
    if dimension < 3 || dimension % 2 == 0 {
        return Err(MazeError::InvalidDimension(dimension));
    }
    Ok(())
}

/// Checks that `start` is an odd lattice cell inside a `dimension` grid.
///
/// Every such cell is a corridor in a generated maze.
pub fn validate_start_cell(start: Cell, dimension: usize) -> Result<(), MazeError> {
    let inside = start.x < dimension && start.y < dimension;
    if !inside || start.x % 2 == 0 || start.y % 2 == 0 {
        return Err(MazeError::StartCellBlocked(start));
    }
    Ok(())
}

/// Square wall/path grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    dimension: usize,
    /// Column-major: `walls[x * dimension + y]`.
    walls: Vec<bool>,
}

impl Maze {
    /// A grid that is wall everywhere.
    fn solid(dimension: usize) -> Self {
        Self {
            dimension,
            walls: vec![true; dimension * dimension],
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        x * self.dimension + y
    }

    fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.dimension && y < self.dimension
    }

    /// Returns true for walls. Out-of-bounds coordinates count as wall.
    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        if !self.in_bounds(x, y) {
            return true;
        }
        self.walls[self.idx(x, y)]
    }

    pub fn is_passable(&self, cell: Cell) -> bool {
        !self.is_wall(cell.x, cell.y)
    }

    /// Opens a cell. Out-of-bounds coordinates are ignored.
    pub fn carve(&mut self, x: usize, y: usize) {
        if self.in_bounds(x, y) {
            let i = self.idx(x, y);
            self.walls[i] = false;
        }
    }

    fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let d = self.dimension;
        (0..d).flat_map(move |x| (0..d).map(move |y| Cell::new(x, y)))
    }

    /// All passable cells, in column-major order.
    pub fn passable_cells(&self) -> Vec<Cell> {
        self.cells().filter(|c| self.is_passable(*c)).collect()
    }

    /// All wall cells, in column-major order.
    pub fn wall_cells(&self) -> Vec<Cell> {
        self.cells().filter(|c| !self.is_passable(*c)).collect()
    }

    /// Picks a passable cell uniformly at random.
    pub fn random_passable_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Cell, MazeError> {
        self.passable_cells()
            .choose(rng)
            .copied()
            .ok_or(MazeError::NoValidCellFound)
    }

    fn neighbor(&self, cell: Cell, dx: isize, dy: isize) -> Option<Cell> {
        let x = cell.x.checked_add_signed(dx)?;
        let y = cell.y.checked_add_signed(dy)?;
        self.in_bounds(x, y).then_some(Cell::new(x, y))
    }

    /// Passable cells reachable from `start` under 4-directional adjacency.
    ///
    /// Empty when `start` itself is a wall.
    pub fn reachable_from(&self, start: Cell) -> Vec<Cell> {
        if !self.is_passable(start) {
            return Vec::new();
        }
        let mut seen = vec![false; self.walls.len()];
        let mut queue = VecDeque::from([start]);
        let mut reached = Vec::new();
        seen[self.idx(start.x, start.y)] = true;

        while let Some(cell) = queue.pop_front() {
            reached.push(cell);
            for (dx, dy) in STEPS {
                if let Some(n) = self.neighbor(cell, dx, dy) {
                    let i = self.idx(n.x, n.y);
                    if !seen[i] && !self.walls[i] {
                        seen[i] = true;
                        queue.push_back(n);
                    }
                }
            }
        }
        reached
    }

    /// True when every passable cell is reachable from `start`.
    pub fn is_connected_from(&self, start: Cell) -> bool {
        self.reachable_from(start).len() == self.passable_cells().len()
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.dimension {
            for x in 0..self.dimension {
                f.write_str(if self.is_wall(x, y) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Seeded maze generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MazeGenerator {
    seed: u64,
}

impl MazeGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Generates a maze of the given odd dimension.
    pub fn generate(&self, dimension: usize) -> Result<Maze, MazeError> {
        validate_dimension(dimension)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut maze = Maze::solid(dimension);
        maze.carve(START_CELL.x, START_CELL.y);

        let mut stack = vec![START_CELL];
        while let Some(&cell) = stack.last() {
            // Unvisited lattice cells are exactly the ones still walled.
            let mut options = [(cell, cell); 4];
            let mut n = 0usize;
            for (dx, dy) in STEPS {
                // Odd cells stop at dimension - 2, so the border is never crossed.
                let Some(next) = maze.neighbor(cell, dx * 2, dy * 2) else {
                    continue;
                };
                if maze.is_wall(next.x, next.y) {
                    let between = Cell::new((cell.x + next.x) / 2, (cell.y + next.y) / 2);
                    options[n] = (between, next);
                    n += 1;
                }
            }

            if n == 0 {
                stack.pop();
                continue;
            }

            let (between, next) = options[rng.gen_range(0..n)];
            maze.carve(between.x, between.y);
            maze.carve(next.x, next.y);
            stack.push(next);
        }

        debug!(
            dimension,
            seed = self.seed,
            passable = maze.passable_cells().len(),
            "Maze generated"
        );
        Ok(maze)
    }
}
