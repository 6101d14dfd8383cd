/// Arena construction from ASCII maps.
///
/// Walls are never written in the map — they follow from the parity and
/// border rules. The map describes only what sits on floor cells:
///
///   `.` or ` `  floor
///   `B`         destructible block
///   `#`         indestructible block (rare; walls usually suffice)
///   `1`..`8`    player spawn point (index = digit - 1)
///
/// Spawn corners are cleared: a spawn cell and its cardinal neighbors
/// never keep a block, so a freshly joined player is not boxed in.

use std::fmt;

use crate::domain::grid::{Cell, Dir, Grid};

#[derive(Clone, Debug)]
pub struct Arena {
    pub grid: Grid,
    /// (cell, destructible)
    pub blocks: Vec<(Cell, bool)>,
    /// Spawn cells ordered by their digit.
    pub spawns: Vec<Cell>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArenaError {
    Empty,
    NotRectangular { row: usize },
    EntityOnWall { x: i32, y: i32 },
    UnknownTile { ch: char, x: i32, y: i32 },
    DuplicateSpawn { digit: u8 },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::Empty => write!(f, "arena map is empty"),
            ArenaError::NotRectangular { row } => {
                write!(f, "arena row {row} has a different width")
            }
            ArenaError::EntityOnWall { x, y } => {
                write!(f, "entity placed on wall cell ({x}, {y})")
            }
            ArenaError::UnknownTile { ch, x, y } => {
                write!(f, "unknown tile {ch:?} at ({x}, {y})")
            }
            ArenaError::DuplicateSpawn { digit } => {
                write!(f, "spawn point {digit} appears twice")
            }
        }
    }
}

impl Arena {
    /// Parse an ASCII arena. Row 0 of the slice is grid row 0 (the border).
    pub fn parse(rows: &[&str]) -> Result<Arena, ArenaError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(ArenaError::Empty);
        }
        let width = rows[0].chars().count();

        let mut blocks: Vec<(Cell, bool)> = Vec::new();
        let mut spawns: Vec<(u8, Cell)> = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(ArenaError::NotRectangular { row: y });
            }
            for (x, ch) in row.chars().enumerate() {
                let cell = Cell::new(x as i32, y as i32);
                let on_wall = cell.is_wall();
                match ch {
                    '.' | ' ' => {}
                    'B' | '#' => {
                        if on_wall {
                            return Err(ArenaError::EntityOnWall { x: cell.x, y: cell.y });
                        }
                        blocks.push((cell, ch == 'B'));
                    }
                    '1'..='8' => {
                        if on_wall {
                            return Err(ArenaError::EntityOnWall { x: cell.x, y: cell.y });
                        }
                        let digit = ch as u8 - b'0';
                        if spawns.iter().any(|(d, _)| *d == digit) {
                            return Err(ArenaError::DuplicateSpawn { digit });
                        }
                        spawns.push((digit, cell));
                    }
                    _ => return Err(ArenaError::UnknownTile { ch, x: cell.x, y: cell.y }),
                }
            }
        }

        spawns.sort_by_key(|(d, _)| *d);
        let spawns: Vec<Cell> = spawns.into_iter().map(|(_, c)| c).collect();

        // Clear spawn corners: no block on a spawn cell or its neighbors.
        let mut cleared = Vec::new();
        for s in &spawns {
            cleared.push(*s);
            for d in Dir::ALL {
                cleared.push(s.step(d));
            }
        }
        blocks.retain(|(c, _)| !cleared.contains(c));

        Ok(Arena {
            grid: Grid::new(width as i32, rows.len() as i32),
            blocks,
            spawns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dimensions_blocks_and_spawns() {
        let arena = Arena::parse(&[
            ".......",
            ".1..B..",
            ".......",
            ".B...2.",
            ".......",
        ])
        .unwrap();

        assert_eq!(arena.grid.width, 7);
        assert_eq!(arena.grid.height, 5);
        assert_eq!(arena.spawns, vec![Cell::new(1, 1), Cell::new(5, 3)]);
        assert!(arena.blocks.contains(&(Cell::new(4, 1), true)));
        assert!(arena.blocks.contains(&(Cell::new(1, 3), true)));
    }

    #[test]
    fn spawn_corners_are_cleared() {
        let arena = Arena::parse(&[
            ".....",
            ".1B..",
            ".B...",
            ".....",
        ])
        .unwrap();
        // Both blocks neighbor the spawn at (1, 1) and are dropped.
        assert!(arena.blocks.is_empty());
    }

    #[test]
    fn entity_on_wall_is_rejected() {
        // (2, 2) is a parity wall
        let err = Arena::parse(&[
            ".....",
            ".....",
            "..B..",
            ".....",
        ])
        .unwrap_err();
        assert_eq!(err, ArenaError::EntityOnWall { x: 2, y: 2 });
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Arena::parse(&["....", ".."]).unwrap_err();
        assert_eq!(err, ArenaError::NotRectangular { row: 1 });
    }

    #[test]
    fn unknown_tiles_are_rejected() {
        let err = Arena::parse(&["...", ".X."]).unwrap_err();
        assert!(matches!(err, ArenaError::UnknownTile { ch: 'X', .. }));
    }

    #[test]
    fn indestructible_blocks_parse() {
        let arena = Arena::parse(&[
            ".....",
            "...#.",
            ".....",
        ])
        .unwrap();
        assert_eq!(arena.blocks, vec![(Cell::new(3, 1), false)]);
    }
}
