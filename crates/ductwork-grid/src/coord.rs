//! World-qualified cell coordinates and the six axis directions.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Identifies a world (dimension). Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorldId(pub u32);

/// The six axis directions between adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All six directions, in the order neighbors are visited.
    pub fn all() -> [Direction; 6] {
        [
            Direction::Up,
            Direction::Down,
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }

    /// Offset for this direction as `(dx, dy, dz)`.
    pub fn offset(&self) -> (i32, i32, i32) {
        match self {
            Direction::Up => (0, 1, 0),
            Direction::Down => (0, -1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::East => (1, 0, 0),
            Direction::West => (-1, 0, 0),
        }
    }

    /// The direction pointing the opposite way.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

/// A cell position in a specific world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub world: WorldId,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellCoord {
    pub fn new(world: WorldId, x: i32, y: i32, z: i32) -> Self {
        Self { world, x, y, z }
    }

    /// The adjacent cell one step in `dir`.
    pub fn relative(&self, dir: Direction) -> CellCoord {
        let (dx, dy, dz) = dir.offset();
        CellCoord {
            world: self.world,
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// All six adjacent cells, in [`Direction::all`] order.
    pub fn neighbors(&self) -> [CellCoord; 6] {
        Direction::all().map(|dir| self.relative(dir))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}({}, {}, {})", self.world.0, self.x, self.y, self.z)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
