/// Static grid geometry — wall rules, bounds, coordinate conversion.
///
/// ## Wall rule
///
/// Walls are never stored; they are derived from coordinates:
///   - **Parity wall**: both coordinates even (the classic pillar lattice).
///   - **Border wall**: `x == 0` or `y == 0`.
///
/// ## Two bounds
///
/// Movement and blast propagation use *different* bounds:
///   - `in_move_bounds` excludes the border ring entirely — a movable
///     entity can never stand on row/column 0 or past the far edge.
///   - `in_blast_bounds` includes the border cells — a blast ray walks
///     up to the border cell and is then stopped by its wall, so the
///     wall check (not the bounds check) is what terminates it there.

use serde::{Deserialize, Serialize};

/// Pixel size of one grid cell. Continuous coordinates exist only for
/// announcements and rendering; simulation logic is whole-cell.
pub const TILE: f32 = 64.0;

/// A grid cell, addressed by integer column/row.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    /// The neighboring cell one step in `dir`.
    pub fn step(self, dir: Dir) -> Cell {
        let (dx, dy) = dir.delta();
        Cell { x: self.x + dx, y: self.y + dy }
    }

    /// Is this cell a permanent wall (parity or border)?
    pub fn is_wall(self) -> bool {
        if self.x == 0 || self.y == 0 {
            return true;
        }
        self.x % 2 == 0 && self.y % 2 == 0
    }

    /// Continuous center of this cell, in pixels.
    pub fn center(self) -> (f32, f32) {
        (
            self.x as f32 * TILE + TILE / 2.0,
            self.y as f32 * TILE + TILE / 2.0,
        )
    }

    /// The cell containing a continuous position.
    pub fn containing(px: f32, py: f32) -> Cell {
        Cell {
            x: (px / TILE).floor() as i32,
            y: (py / TILE).floor() as i32,
        }
    }
}

/// The four cardinal directions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// Grid dimensions, in cells.
#[derive(Clone, Copy, Debug)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Grid { width, height }
    }

    /// Bounds for movable entities. Excludes the border ring: row/column 0
    /// is wall, and the far edge is simply out of reach.
    pub fn in_move_bounds(&self, cell: Cell) -> bool {
        cell.x >= 1 && cell.y >= 1 && cell.x < self.width && cell.y < self.height
    }

    /// Bounds for blast propagation. Includes the border cells — the ray
    /// reaches them and stops on the wall rule, not the bounds rule.
    pub fn in_blast_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    /// A cell movable entities may in principle occupy: in move bounds
    /// and not a wall. Occupancy (blocks, bombs) is a separate question.
    pub fn is_floor(&self, cell: Cell) -> bool {
        self.in_move_bounds(cell) && !cell.is_wall()
    }
}
