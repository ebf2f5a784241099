//! # Level Representation
//!
//! One dungeon level's walkable structure: the tile grid, the rooms the
//! generator carved, traps, secret doors, and the fog-of-war masks.

use crate::data::TrapKind;
use crate::Position;
use serde::{Deserialize, Serialize};

/// Terrain kind of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Floor,
    DoorClosed,
    DoorOpen,
    /// A concealed passage; rendered as wall until discovered.
    SecretWall,
    TrapHidden,
    TrapRevealed,
    /// Descent point to the next depth.
    Portal,
}

impl Tile {
    /// Whether an actor can occupy this tile. Closed doors count: they
    /// auto-open on traversal.
    pub fn is_walkable(self) -> bool {
        matches!(
            self,
            Tile::Floor
                | Tile::DoorOpen
                | Tile::DoorClosed
                | Tile::TrapHidden
                | Tile::TrapRevealed
                | Tile::Portal
        )
    }

    /// Whether this tile stops a sight ray.
    pub fn blocks_sight(self) -> bool {
        matches!(self, Tile::Wall | Tile::SecretWall | Tile::DoorClosed)
    }
}

/// A generator-carved rectangle. Coordinates are the carved floor area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub secret: bool,
}

impl Room {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            secret: false,
        }
    }

    /// Center tile of the room.
    pub fn center(&self) -> Position {
        Position::new(
            self.x + self.width as i32 / 2,
            self.y + self.height as i32 / 2,
        )
    }

    /// Whether a position lies inside the carved area.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x < self.x + self.width as i32
            && pos.y < self.y + self.height as i32
    }

    /// Whether this room intersects another, requiring at least a
    /// `buffer`-tile gap to count as separate.
    pub fn intersects_with_buffer(&self, other: &Room, buffer: i32) -> bool {
        !(self.x + self.width as i32 + buffer <= other.x
            || other.x + other.width as i32 + buffer <= self.x
            || self.y + self.height as i32 + buffer <= other.y
            || other.y + other.height as i32 + buffer <= self.y)
    }

    /// All positions of the carved area.
    pub fn floor_positions(&self) -> Vec<Position> {
        let mut out = Vec::with_capacity((self.width * self.height) as usize);
        for y in self.y..self.y + self.height as i32 {
            for x in self.x..self.x + self.width as i32 {
                out.push(Position::new(x, y));
            }
        }
        out
    }
}

/// A hidden hazard placed by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub pos: Position,
    pub kind: TrapKind,
    pub revealed: bool,
}

/// A concealed passage into a secret room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretDoor {
    pub pos: Position,
}

/// One dungeon level: tile grid, generator output, and fog-of-war masks.
///
/// `explored` is monotonic; bits are only ever set. `visible` is cleared and
/// rebuilt on every visibility computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub tiles: Vec<Tile>,
    pub visible: Vec<bool>,
    pub explored: Vec<bool>,
    pub rooms: Vec<Room>,
    pub traps: Vec<Trap>,
    pub secret_doors: Vec<SecretDoor>,
    /// Flavor theme key for presentation layers.
    pub theme: String,
}

impl Level {
    /// Creates an all-wall level of the given dimensions.
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            width,
            height,
            depth,
            tiles: vec![Tile::Wall; size],
            visible: vec![false; size],
            explored: vec![false; size],
            rooms: Vec::new(),
            traps: Vec::new(),
            secret_doors: Vec::new(),
            theme: String::new(),
        }
    }

    /// Whether a position lies inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: Position) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    /// Tile at a position, or `None` when out of bounds.
    pub fn tile(&self, pos: Position) -> Option<Tile> {
        if self.in_bounds(pos) {
            Some(self.tiles[self.index(pos)])
        } else {
            None
        }
    }

    /// Sets a tile; out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) {
        if self.in_bounds(pos) {
            let idx = self.index(pos);
            self.tiles[idx] = tile;
        }
    }

    /// Whether an actor can step onto the tile at `pos`.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile(pos).map(Tile::is_walkable).unwrap_or(false)
    }

    /// Whether the tile at `pos` is currently lit by line of sight.
    pub fn is_visible(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.visible[self.index(pos)]
    }

    /// Whether the tile at `pos` has ever been seen.
    pub fn is_explored(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.explored[self.index(pos)]
    }

    /// Clears the visible mask. Exploration state is preserved.
    pub fn clear_visibility(&mut self) {
        self.visible.iter_mut().for_each(|v| *v = false);
    }

    /// Marks a tile visible and explored.
    pub fn mark_seen(&mut self, pos: Position) {
        if self.in_bounds(pos) {
            let idx = self.index(pos);
            self.visible[idx] = true;
            self.explored[idx] = true;
        }
    }

    /// Marks every tile explored. Used by the magic-mapping scroll.
    pub fn explore_all(&mut self) {
        self.explored.iter_mut().for_each(|e| *e = true);
    }

    /// The trap record at `pos`, if one exists.
    pub fn trap_at(&self, pos: Position) -> Option<&Trap> {
        self.traps.iter().find(|t| t.pos == pos)
    }

    /// Reveals the trap at `pos` and converts its tile permanently.
    pub fn reveal_trap(&mut self, pos: Position) {
        if let Some(trap) = self.traps.iter_mut().find(|t| t.pos == pos) {
            trap.revealed = true;
        }
        self.set_tile(pos, Tile::TrapRevealed);
    }

    /// Converts a secret wall at `pos` into a closed door.
    ///
    /// Returns true if there was a secret door to discover.
    pub fn discover_secret_door(&mut self, pos: Position) -> bool {
        if self.tile(pos) != Some(Tile::SecretWall) {
            return false;
        }
        self.set_tile(pos, Tile::DoorClosed);
        self.secret_doors.retain(|d| d.pos != pos);
        true
    }

    /// All walkable floor positions, for random placement.
    pub fn floor_positions(&self) -> Vec<Position> {
        let mut out = Vec::new();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let pos = Position::new(x, y);
                if self.tile(pos) == Some(Tile::Floor) {
                    out.push(pos);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_level_is_all_wall() {
        let level = Level::new(10, 8, 1);
        assert_eq!(level.tiles.len(), 80);
        assert!(level.tiles.iter().all(|&t| t == Tile::Wall));
        assert!(!level.is_walkable(Position::new(5, 5)));
    }

    #[test]
    fn test_bounds() {
        let level = Level::new(10, 8, 1);
        assert!(level.in_bounds(Position::new(0, 0)));
        assert!(level.in_bounds(Position::new(9, 7)));
        assert!(!level.in_bounds(Position::new(10, 7)));
        assert!(!level.in_bounds(Position::new(-1, 0)));
        assert_eq!(level.tile(Position::new(-1, 0)), None);
    }

    #[test]
    fn test_walkability() {
        let mut level = Level::new(10, 8, 1);
        let pos = Position::new(3, 3);
        level.set_tile(pos, Tile::Floor);
        assert!(level.is_walkable(pos));
        level.set_tile(pos, Tile::DoorClosed);
        assert!(level.is_walkable(pos)); // doors auto-open on traversal
        level.set_tile(pos, Tile::SecretWall);
        assert!(!level.is_walkable(pos));
    }

    #[test]
    fn test_explored_is_monotonic() {
        let mut level = Level::new(10, 8, 1);
        let pos = Position::new(2, 2);
        level.mark_seen(pos);
        assert!(level.is_visible(pos));
        assert!(level.is_explored(pos));

        level.clear_visibility();
        assert!(!level.is_visible(pos));
        assert!(level.is_explored(pos));
    }

    #[test]
    fn test_room_buffer_overlap() {
        let a = Room::new(5, 5, 4, 4);
        let b = Room::new(10, 5, 4, 4); // 1-tile gap
        let c = Room::new(9, 5, 4, 4); // touching
        assert!(!a.intersects_with_buffer(&b, 1));
        assert!(a.intersects_with_buffer(&c, 1));
    }

    #[test]
    fn test_secret_door_discovery() {
        let mut level = Level::new(10, 8, 1);
        let pos = Position::new(4, 4);
        level.set_tile(pos, Tile::SecretWall);
        level.secret_doors.push(SecretDoor { pos });

        assert!(level.discover_secret_door(pos));
        assert_eq!(level.tile(pos), Some(Tile::DoorClosed));
        assert!(level.secret_doors.is_empty());
        assert!(!level.discover_secret_door(pos));
    }
}
