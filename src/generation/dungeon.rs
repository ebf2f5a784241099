//! # Dungeon Generation
//!
//! Procedural level layout: rejection-sampled room placement, L-shaped
//! corridors, doors, traps, secret rooms, and descent portals.
//!
//! Every placement phase has an attempt budget; exhausting a budget yields
//! fewer features, never an error. The generator always returns a usable
//! grid.

use crate::data::{GameData, TrapKind};
use crate::game::{Level, Position, Room, SecretDoor, Tile, Trap};
use crate::generation::{GenerationConfig, Generator};
use crate::{GloamError, GloamResult};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Primary level generator.
///
/// Phases, in order: carve rooms, connect with corridors, place doors on
/// corridor entrances, hide traps, attach a secret room, place portals.
#[derive(Debug, Clone, Default)]
pub struct DungeonGenerator;

impl DungeonGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Number of rooms to aim for at a depth, capped at 12.
    fn target_room_count(depth: u32) -> u32 {
        ((4.0 + depth as f64 * 0.8).floor() as u32).min(12)
    }

    /// Rejection-samples room rectangles. Fewer rooms than requested is an
    /// accepted outcome once the attempt budget runs out.
    fn place_rooms(
        &self,
        level: &mut Level,
        config: &GenerationConfig,
        depth: u32,
        rng: &mut StdRng,
    ) -> Vec<Room> {
        let target = Self::target_room_count(depth);
        let min_size = 3;
        let max_size = ((config.width.min(config.height) / 4).max(4)).min(10);

        let mut rooms: Vec<Room> = Vec::new();
        let mut attempts = 0;
        while rooms.len() < target as usize && attempts < config.room_attempts {
            attempts += 1;
            let width = rng.gen_range(min_size..=max_size);
            let height = rng.gen_range(min_size..=max_size);
            if config.width <= width + 2 || config.height <= height + 2 {
                continue;
            }
            let x = rng.gen_range(1..(config.width - width - 1)) as i32;
            let y = rng.gen_range(1..(config.height - height - 1)) as i32;
            let candidate = Room::new(x, y, width, height);

            if rooms
                .iter()
                .any(|room| candidate.intersects_with_buffer(room, 1))
            {
                continue;
            }

            for pos in candidate.floor_positions() {
                level.set_tile(pos, Tile::Floor);
            }
            rooms.push(candidate);
        }
        rooms
    }

    /// Carves an L-shaped corridor between two points with a randomized bend
    /// order.
    fn carve_l_corridor(&self, level: &mut Level, from: Position, to: Position, rng: &mut StdRng) {
        let bend = if rng.gen_bool(0.5) {
            Position::new(to.x, from.y)
        } else {
            Position::new(from.x, to.y)
        };
        self.carve_straight(level, from, bend);
        self.carve_straight(level, bend, to);
    }

    /// Carves an axis-aligned segment, converting only wall tiles.
    fn carve_straight(&self, level: &mut Level, from: Position, to: Position) {
        let (x0, x1) = (from.x.min(to.x), from.x.max(to.x));
        let (y0, y1) = (from.y.min(to.y), from.y.max(to.y));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let pos = Position::new(x, y);
                if level.tile(pos) == Some(Tile::Wall) {
                    level.set_tile(pos, Tile::Floor);
                }
            }
        }
    }

    /// Connects consecutive rooms, then adds redundant random-pair
    /// corridors. Does not guarantee full connectivity; the sequential chain
    /// keeps the spawn room and the exit room connected.
    fn connect_rooms(
        &self,
        level: &mut Level,
        rooms: &[Room],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        for pair in rooms.windows(2) {
            self.carve_l_corridor(level, pair[0].center(), pair[1].center(), rng);
        }

        let extra = (rooms.len() as f64 * config.extra_corridor_ratio).floor() as usize;
        for _ in 0..extra {
            let a = rng.gen_range(0..rooms.len());
            let b = rng.gen_range(0..rooms.len());
            if a != b {
                self.carve_l_corridor(level, rooms[a].center(), rooms[b].center(), rng);
            }
        }
    }

    /// Whether a carved tile is a door candidate: a corridor threading
    /// through it with walls flanking the perpendicular axis.
    fn is_door_candidate(level: &Level, pos: Position) -> bool {
        let wall = |p: Position| matches!(level.tile(p), Some(Tile::Wall) | None);
        let open = |p: Position| matches!(level.tile(p), Some(t) if t.is_walkable());
        let n = Position::new(pos.x, pos.y - 1);
        let s = Position::new(pos.x, pos.y + 1);
        let w = Position::new(pos.x - 1, pos.y);
        let e = Position::new(pos.x + 1, pos.y);

        (wall(n) && wall(s) && open(w) && open(e)) || (wall(w) && wall(e) && open(n) && open(s))
    }

    /// Places closed doors where corridors enter rooms.
    fn place_doors(
        &self,
        level: &mut Level,
        rooms: &[Room],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        for room in rooms {
            for pos in room_perimeter(room) {
                if level.tile(pos) != Some(Tile::Floor) {
                    continue;
                }
                if Self::is_door_candidate(level, pos) && rng.gen_bool(config.door_chance) {
                    level.set_tile(pos, Tile::DoorClosed);
                }
            }
        }
    }

    /// Hides traps on floor tiles inside rooms.
    fn place_traps(&self, level: &mut Level, rooms: &[Room], depth: u32, rng: &mut StdRng) {
        let count = (1.0 + depth as f64 * 0.6).floor() as u32;
        let kinds = TrapKind::all();
        for _ in 0..count {
            let Some(room) = rooms.choose(rng) else {
                break;
            };
            let positions = room.floor_positions();
            let Some(&pos) = positions.choose(rng) else {
                continue;
            };
            if level.tile(pos) != Some(Tile::Floor) {
                continue;
            }
            let kind = *kinds.choose(rng).unwrap_or(&TrapKind::Spike);
            level.set_tile(pos, Tile::TrapHidden);
            level.traps.push(Trap {
                pos,
                kind,
                revealed: false,
            });
        }
    }

    /// Tries to attach one walled-off secret room to a random existing room,
    /// entered through a single secret wall tile.
    fn place_secret_room(
        &self,
        level: &mut Level,
        rooms: &mut Vec<Room>,
        config: &GenerationConfig,
        depth: u32,
        rng: &mut StdRng,
    ) {
        let chance =
            config.secret_room_base_chance + depth as f64 * config.secret_room_depth_chance;
        if !rng.gen_bool(chance.min(1.0)) {
            return;
        }

        for _ in 0..config.secret_room_attempts {
            let Some(&host) = rooms.choose(rng) else {
                return;
            };
            let size = rng.gen_range(3..=4) as i32;
            // Pick a side of the host room; the secret room sits two tiles
            // out so one wall tile separates them.
            let (sx, sy, door, vertical) = match rng.gen_range(0..4) {
                0 => {
                    let y = host.y - size - 2;
                    let x = host.x + rng.gen_range(0..host.width as i32);
                    (x - size / 2, y, Position::new(x, host.y - 1), true)
                }
                1 => {
                    let y = host.y + host.height as i32 + 2;
                    let x = host.x + rng.gen_range(0..host.width as i32);
                    (
                        x - size / 2,
                        y,
                        Position::new(x, host.y + host.height as i32),
                        true,
                    )
                }
                2 => {
                    let x = host.x - size - 2;
                    let y = host.y + rng.gen_range(0..host.height as i32);
                    (x, y - size / 2, Position::new(host.x - 1, y), false)
                }
                _ => {
                    let x = host.x + host.width as i32 + 2;
                    let y = host.y + rng.gen_range(0..host.height as i32);
                    (
                        x,
                        y - size / 2,
                        Position::new(host.x + host.width as i32, y),
                        false,
                    )
                }
            };

            let candidate = Room::new(sx, sy, size as u32, size as u32);
            if !self.footprint_is_untouched(level, &candidate) {
                continue;
            }
            if level.tile(door) != Some(Tile::Wall) {
                continue;
            }

            for pos in candidate.floor_positions() {
                level.set_tile(pos, Tile::Floor);
            }
            // Carve the approach along the door's axis so the secret wall is
            // the sole gap between host and secret room.
            let inner = if vertical {
                Position::new(door.x, candidate.center().y)
            } else {
                Position::new(candidate.center().x, door.y)
            };
            self.carve_straight(level, door, inner);
            level.set_tile(door, Tile::SecretWall);
            level.secret_doors.push(SecretDoor { pos: door });

            let mut secret = candidate;
            secret.secret = true;
            rooms.push(secret);
            return;
        }
    }

    /// A secret room may only be carved into fully untouched wall, including
    /// a one-tile shell around it.
    fn footprint_is_untouched(&self, level: &Level, room: &Room) -> bool {
        for y in (room.y - 1)..=(room.y + room.height as i32) {
            for x in (room.x - 1)..=(room.x + room.width as i32) {
                let pos = Position::new(x, y);
                if !level.in_bounds(pos) || level.tile(pos) != Some(Tile::Wall) {
                    return false;
                }
            }
        }
        true
    }

    /// Places the guaranteed exit portal in the last room, plus occasional
    /// extra portals on deeper levels.
    fn place_portals(
        &self,
        level: &mut Level,
        rooms: &[Room],
        config: &GenerationConfig,
        depth: u32,
        rng: &mut StdRng,
    ) {
        if let Some(exit_room) = rooms.iter().rev().find(|r| !r.secret) {
            level.set_tile(exit_room.center(), Tile::Portal);
        }

        if depth > config.extra_portal_min_depth && rng.gen_bool(config.extra_portal_chance) {
            let floors = level.floor_positions();
            let extra = rng.gen_range(1..=3);
            for &pos in floors.choose_multiple(rng, extra) {
                level.set_tile(pos, Tile::Portal);
            }
        }
    }
}

/// The one-tile ring just outside a room's carved area.
fn room_perimeter(room: &Room) -> Vec<Position> {
    let mut out = Vec::new();
    let (x0, y0) = (room.x - 1, room.y - 1);
    let (x1, y1) = (room.x + room.width as i32, room.y + room.height as i32);
    for x in x0..=x1 {
        out.push(Position::new(x, y0));
        out.push(Position::new(x, y1));
    }
    for y in (y0 + 1)..y1 {
        out.push(Position::new(x0, y));
        out.push(Position::new(x1, y));
    }
    out
}

impl Generator<Level> for DungeonGenerator {
    fn generate(
        &self,
        config: &GenerationConfig,
        data: &GameData,
        depth: u32,
        rng: &mut StdRng,
    ) -> GloamResult<Level> {
        let mut level = Level::new(config.width, config.height, depth);
        level.theme = data.theme_for_depth(depth).key.to_string();

        let mut rooms = self.place_rooms(&mut level, config, depth, rng);
        if rooms.is_empty() {
            return Err(GloamError::GenerationFailed(
                "failed to place any rooms".to_string(),
            ));
        }

        self.connect_rooms(&mut level, &rooms, config, rng);
        self.place_doors(&mut level, &rooms, config, rng);
        self.place_traps(&mut level, &rooms, depth, rng);
        self.place_secret_room(&mut level, &mut rooms, config, depth, rng);
        self.place_portals(&mut level, &rooms, config, depth, rng);

        debug!(
            "generated depth {}: {} rooms, {} traps, {} secret doors",
            depth,
            rooms.len(),
            level.traps.len(),
            level.secret_doors.len()
        );

        level.rooms = rooms;
        self.validate(&level, config)?;
        Ok(level)
    }

    fn validate(&self, level: &Level, config: &GenerationConfig) -> GloamResult<()> {
        if level.width != config.width || level.height != config.height {
            return Err(GloamError::GenerationFailed(
                "grid dimensions do not match request".to_string(),
            ));
        }
        for room in &level.rooms {
            let inside = room.x >= 1
                && room.y >= 1
                && room.x + (room.width as i32) < level.width as i32
                && room.y + (room.height as i32) < level.height as i32;
            if !inside {
                return Err(GloamError::GenerationFailed(format!(
                    "room at ({}, {}) escapes level bounds",
                    room.x, room.y
                )));
            }
        }
        if level.floor_positions().is_empty() {
            return Err(GloamError::GenerationFailed(
                "level has no floor tiles".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn generate(seed: u64, depth: u32) -> Level {
        let config = GenerationConfig::new(60, 40);
        let data = GameData::standard();
        let mut rng = StdRng::seed_from_u64(seed);
        DungeonGenerator::new()
            .generate(&config, &data, depth, &mut rng)
            .unwrap()
    }

    #[test]
    fn test_room_count_scaling() {
        assert_eq!(DungeonGenerator::target_room_count(1), 4);
        assert_eq!(DungeonGenerator::target_room_count(5), 8);
        assert_eq!(DungeonGenerator::target_room_count(30), 12);
    }

    #[test]
    fn test_depth_one_room_band() {
        for seed in 0..10 {
            let level = generate(seed, 1);
            let normal_rooms = level.rooms.iter().filter(|r| !r.secret).count();
            assert!(
                (1..=12).contains(&normal_rooms),
                "seed {seed}: got {normal_rooms} rooms"
            );
        }
    }

    #[test]
    fn test_rooms_never_overlap_within_buffer() {
        for seed in 0..10 {
            let level = generate(seed, 5);
            let normal: Vec<_> = level.rooms.iter().filter(|r| !r.secret).collect();
            for (i, a) in normal.iter().enumerate() {
                for b in normal.iter().skip(i + 1) {
                    assert!(!a.intersects_with_buffer(b, 1));
                }
            }
        }
    }

    #[test]
    fn test_rooms_carved_to_floor() {
        let level = generate(3, 1);
        for room in level.rooms.iter().filter(|r| !r.secret) {
            for pos in room.floor_positions() {
                let tile = level.tile(pos).unwrap();
                assert!(
                    tile.is_walkable(),
                    "room tile at {pos:?} is {tile:?}"
                );
            }
        }
    }

    #[test]
    fn test_exit_portal_exists() {
        for seed in 0..10 {
            let level = generate(seed, 1);
            let portals = level.tiles.iter().filter(|&&t| t == Tile::Portal).count();
            assert!(portals >= 1, "seed {seed}: no descent portal");
        }
    }

    #[test]
    fn test_trap_count_scales_with_depth() {
        let level = generate(11, 6);
        // floor(1 + 6*0.6) = 4 attempts; collisions may drop some.
        assert!(level.traps.len() <= 4);
        for trap in &level.traps {
            assert!(!trap.revealed);
            assert_eq!(level.tile(trap.pos), Some(Tile::TrapHidden));
        }
    }

    #[test]
    fn test_secret_room_has_secret_wall_entrance() {
        let mut config = GenerationConfig::new(60, 40);
        config.secret_room_base_chance = 1.0;
        let data = GameData::standard();
        let mut found = false;
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let level = DungeonGenerator::new()
                .generate(&config, &data, 2, &mut rng)
                .unwrap();
            if let Some(secret) = level.rooms.iter().find(|r| r.secret) {
                found = true;
                assert_eq!(level.secret_doors.len(), 1);
                let door = level.secret_doors[0].pos;
                assert_eq!(level.tile(door), Some(Tile::SecretWall));
                for pos in secret.floor_positions() {
                    assert_eq!(level.tile(pos), Some(Tile::Floor));
                }
            }
        }
        assert!(found, "no secret room attached across 20 seeds");
    }

    #[test]
    fn test_generation_never_fails_on_odd_dimensions() {
        let data = GameData::standard();
        for (w, h) in [(20, 15), (80, 50), (30, 30)] {
            let config = GenerationConfig::new(w, h);
            let mut rng = StdRng::seed_from_u64(99);
            let level = DungeonGenerator::new()
                .generate(&config, &data, 1, &mut rng)
                .unwrap();
            assert_eq!(level.width, w);
            assert_eq!(level.height, h);
        }
    }
}
