//! # Game Module
//!
//! Runtime state of a dungeon-crawl session.
//!
//! This module contains the building blocks the simulation core runs on:
//! - Grid primitives (positions and directions)
//! - Level representation with fog-of-war masks
//! - The generational actor arena
//! - The player character record and the item system
//! - The [`Game`] aggregator, turn scheduler, combat, and AI

pub mod character;
pub mod combat;
pub mod entities;
pub mod events;
pub mod items;
pub mod level;
pub mod pathing;
pub mod state;
pub mod visibility;

pub use character::*;
pub use entities::*;
pub use events::*;
pub use items::*;
pub use level::*;
pub use pathing::*;
pub use state::*;

use serde::{Deserialize, Serialize};

/// A 2D coordinate on the tile grid.
///
/// # Examples
///
/// ```
/// use gloam::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.manhattan_distance(Position::new(13, 9)), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Chebyshev distance: number of 8-directional steps between positions.
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        (self.x - other.x).abs().max((self.y - other.y).abs()) as u32
    }

    /// All 8 neighboring positions, diagonals included.
    pub fn neighbors8(self) -> [Position; 8] {
        [
            Position::new(self.x - 1, self.y - 1),
            Position::new(self.x, self.y - 1),
            Position::new(self.x + 1, self.y - 1),
            Position::new(self.x - 1, self.y),
            Position::new(self.x + 1, self.y),
            Position::new(self.x - 1, self.y + 1),
            Position::new(self.x, self.y + 1),
            Position::new(self.x + 1, self.y + 1),
        ]
    }

    /// The 4 orthogonal neighbors.
    pub fn neighbors4(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1),
            Position::new(self.x - 1, self.y),
            Position::new(self.x + 1, self.y),
            Position::new(self.x, self.y + 1),
        ]
    }

    /// Offsets this position by a direction.
    pub fn step(self, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        Position::new(self.x + dx, self.y + dy)
    }
}

/// The 8 movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Direction {
    /// Grid delta for this direction. North is negative y.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Northeast => (1, -1),
            Direction::Northwest => (-1, -1),
            Direction::Southeast => (1, 1),
            Direction::Southwest => (-1, 1),
        }
    }

    /// Direction matching a unit delta, if any.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx, dy) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (1, -1) => Some(Direction::Northeast),
            (-1, -1) => Some(Direction::Northwest),
            (1, 1) => Some(Direction::Southeast),
            (-1, 1) => Some(Direction::Southwest),
            _ => None,
        }
    }

    /// All 8 directions in a fixed order.
    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::Northeast,
            Direction::Northwest,
            Direction::Southeast,
            Direction::Southwest,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(a.manhattan_distance(b), 7);
        assert_eq!(b.manhattan_distance(a), 7);
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = Position::new(2, 2);
        let b = Position::new(5, 3);
        assert_eq!(a.chebyshev_distance(b), 3);
    }

    #[test]
    fn test_neighbors() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.neighbors8().len(), 8);
        assert!(pos.neighbors8().contains(&Position::new(4, 4)));
        assert_eq!(pos.neighbors4().len(), 4);
        assert!(!pos.neighbors4().contains(&Position::new(4, 4)));
    }

    #[test]
    fn test_direction_round_trip() {
        for dir in Direction::all() {
            let (dx, dy) = dir.delta();
            assert_eq!(Direction::from_delta(dx, dy), Some(dir));
        }
        assert_eq!(Direction::from_delta(2, 0), None);
    }

    #[test]
    fn test_step() {
        let pos = Position::new(3, 3);
        assert_eq!(pos.step(Direction::North), Position::new(3, 2));
        assert_eq!(pos.step(Direction::Southwest), Position::new(2, 4));
    }
}
