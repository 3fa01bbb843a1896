/*!
* A live cell dies if it has fewer than two live neighbors.
* A live cell with two or three live neighbors lives on to the next generation.
* A live cell with more than three live neighbors dies.
* A dead cell will be brought back to live if it has exactly three live neighbors.
*/
use std::fmt;

use rand::Rng;

use crate::error::{LifeError, Result};
use crate::patterns::Pattern;

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum CellState {
    #[default]
    Dead,
    Alive,
}

impl CellState {
    pub fn is_alive(self) -> bool {
        self == CellState::Alive
    }

    pub fn toggled(self) -> Self {
        match self {
            CellState::Dead => CellState::Alive,
            CellState::Alive => CellState::Dead,
        }
    }
}

impl From<bool> for CellState {
    fn from(alive: bool) -> Self {
        if alive {
            CellState::Alive
        } else {
            CellState::Dead
        }
    }
}

/// A cell as seen from outside the grid: its position plus whether it is alive.
///
/// The grid never stores these; they are built on demand from the flat
/// storage, so the coordinates always match the position they came from.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub alive: bool,
}

/// Moore neighbourhood, column offset first.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One generation of a bounded `width x height` board.
///
/// Cells live in a single row-major vector; `(x, y)` maps to `y * width + x`.
/// Positions outside the board simply do not exist: there is no wraparound.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

impl Grid {
    /// An all-dead grid.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LifeError::InvalidDimensions {
                width,
                height,
                reason: "width and height must be positive".into(),
            });
        }
        let len = width
            .checked_mul(height)
            .filter(|&len| len <= isize::MAX as usize)
            .ok_or_else(|| LifeError::InvalidDimensions {
                width,
                height,
                reason: "cell count does not fit in memory".into(),
            })?;
        Ok(Grid {
            width,
            height,
            cells: vec![CellState::Dead; len],
        })
    }

    /// Builds a grid from column-major data, `columns[x][y]`.
    pub fn from_columns(columns: &[Vec<bool>]) -> Result<Self> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        let mut grid = Grid::new(width, height)?;

        for (x, column) in columns.iter().enumerate() {
            if column.len() != height {
                return Err(LifeError::InvalidDimensions {
                    width,
                    height,
                    reason: "columns have differing lengths".into(),
                });
            }
            for (y, &alive) in column.iter().enumerate() {
                let index = grid.index(x, y);
                grid.cells[index] = alive.into();
            }
        }
        Ok(grid)
    }

    /// Parses ASCII rows, top row first: `#` or `O` is alive, `.` is dead.
    pub fn from_rows(rows: &[&str]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut grid = Grid::new(width, height)?;

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(LifeError::InvalidDimensions {
                    width,
                    height,
                    reason: "rows have differing lengths".into(),
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let state = match ch {
                    '#' | 'O' => CellState::Alive,
                    '.' => CellState::Dead,
                    found => {
                        return Err(LifeError::InvalidCharacter {
                            found,
                            row: y,
                            column: x,
                        })
                    }
                };
                let index = grid.index(x, y);
                grid.cells[index] = state;
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    fn checked_index(&self, x: usize, y: usize) -> Result<usize> {
        if x < self.width && y < self.height {
            Ok(self.index(x, y))
        } else {
            Err(LifeError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<CellState> {
        self.checked_index(x, y).ok().map(|index| self.cells[index])
    }

    pub fn is_alive(&self, x: usize, y: usize) -> Result<bool> {
        let index = self.checked_index(x, y)?;
        Ok(self.cells[index].is_alive())
    }

    pub fn set(&mut self, x: usize, y: usize, state: CellState) -> Result<()> {
        let index = self.checked_index(x, y)?;
        self.cells[index] = state;
        Ok(())
    }

    /// Flips one cell in place and returns its new state.
    pub fn toggle(&mut self, x: usize, y: usize) -> Result<CellState> {
        let index = self.checked_index(x, y)?;
        let toggled = self.cells[index].toggled();
        self.cells[index] = toggled;
        Ok(toggled)
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().enumerate().map(|(index, state)| Cell {
            x: index % self.width,
            y: index / self.width,
            alive: state.is_alive(),
        })
    }

    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|state| state.is_alive()).count()
    }

    /// The up-to-8 in-bounds neighbours of `(x, y)`.
    pub fn neighbors(&self, x: usize, y: usize) -> Result<Vec<Cell>> {
        self.checked_index(x, y)?;
        Ok(self
            .neighbor_positions(x, y)
            .map(|(nx, ny)| Cell {
                x: nx,
                y: ny,
                alive: self.cells[self.index(nx, ny)].is_alive(),
            })
            .collect())
    }

    pub fn alive_neighbors(&self, x: usize, y: usize) -> Result<usize> {
        self.checked_index(x, y)?;
        Ok(self.count_alive_neighbors(x, y))
    }

    fn neighbor_positions(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            (nx < self.width && ny < self.height).then_some((nx, ny))
        })
    }

    /// Caller guarantees `(x, y)` is in bounds.
    fn count_alive_neighbors(&self, x: usize, y: usize) -> usize {
        self.neighbor_positions(x, y)
            .filter(|&(nx, ny)| self.cells[self.index(nx, ny)].is_alive())
            .count()
    }

    /// Computes the following generation without touching this one.
    pub fn next_generation(&self) -> Grid {
        let mut next_cells = Vec::with_capacity(self.cells.len());

        for y in 0..self.height {
            for x in 0..self.width {
                let alive_neighbors = self.count_alive_neighbors(x, y);
                let state = self.cells[self.index(x, y)];

                // Apply Game of Life rules
                next_cells.push(match (state, alive_neighbors) {
                    (CellState::Alive, 2..=3) => CellState::Alive, // Survives
                    (CellState::Dead, 3) => CellState::Alive,      // Becomes alive
                    _ => CellState::Dead,                          // Dies or remains dead
                });
            }
        }

        Grid {
            width: self.width,
            height: self.height,
            cells: next_cells,
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(CellState::Dead);
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for cell in &mut self.cells {
            *cell = rng.random_bool(0.5).into();
        }
    }

    /// Marks the pattern's cells alive with its top-left corner at `origin`.
    /// Nothing is written unless the whole pattern fits.
    pub fn stamp(&mut self, pattern: &Pattern, origin: (usize, usize)) -> Result<()> {
        let mut indices = Vec::with_capacity(pattern.cells.len());
        for &(dx, dy) in pattern.cells {
            indices.push(self.checked_index(origin.0.saturating_add(dx), origin.1.saturating_add(dy))?);
        }
        for index in indices {
            self.cells[index] = CellState::Alive;
        }
        Ok(())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            for state in row {
                f.write_str(if state.is_alive() { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
