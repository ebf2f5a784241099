//! # Visibility Engine
//!
//! Ray-cast fog of war. Rays fan out from the player in a full circle; each
//! ray marks tiles visible and explored until it hits an opaque tile, which
//! is itself included. The explored mask only ever grows; the visible mask
//! is rebuilt from scratch on every call.

use crate::game::{Level, Position};

/// Recomputes the level's visible mask from `origin` out to `sight_range`,
/// folding the result into the monotonic explored mask.
pub fn compute_visibility(level: &mut Level, origin: Position, sight_range: i32) {
    level.clear_visibility();
    level.mark_seen(origin);

    let rays = crate::config::VISIBILITY_RAYS;
    for ray in 0..rays {
        let angle = ray as f64 / rays as f64 * std::f64::consts::TAU;
        let (dy, dx) = angle.sin_cos();
        cast_ray(level, origin, dx, dy, sight_range);
    }
}

/// Steps outward in unit increments, rounding each sample to the nearest
/// cell. Stops at the first opaque tile, inclusive.
fn cast_ray(level: &mut Level, origin: Position, dx: f64, dy: f64, sight_range: i32) {
    for step in 1..=sight_range {
        let x = (origin.x as f64 + dx * step as f64).round() as i32;
        let y = (origin.y as f64 + dy * step as f64).round() as i32;
        let pos = Position::new(x, y);

        let Some(tile) = level.tile(pos) else {
            return;
        };
        level.mark_seen(pos);
        if tile.blocks_sight() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Tile;

    /// An open 21x21 level with floor everywhere but the border.
    fn open_level() -> Level {
        let mut level = Level::new(21, 21, 1);
        for y in 1..20 {
            for x in 1..20 {
                level.set_tile(Position::new(x, y), Tile::Floor);
            }
        }
        level
    }

    #[test]
    fn test_origin_always_seen() {
        let mut level = open_level();
        let origin = Position::new(10, 10);
        compute_visibility(&mut level, origin, 5);
        assert!(level.is_visible(origin));
        assert!(level.is_explored(origin));
    }

    #[test]
    fn test_range_limit() {
        let mut level = open_level();
        let origin = Position::new(10, 10);
        compute_visibility(&mut level, origin, 4);

        assert!(level.is_visible(Position::new(14, 10)));
        assert!(!level.is_visible(Position::new(15, 10)));
        assert!(!level.is_visible(Position::new(10, 16)));
    }

    #[test]
    fn test_walls_block_and_are_seen() {
        let mut level = open_level();
        let origin = Position::new(10, 10);
        // Wall column two tiles east.
        for y in 1..20 {
            level.set_tile(Position::new(12, y), Tile::Wall);
        }
        compute_visibility(&mut level, origin, 8);

        // The blocking wall itself is lit; the tile behind it is not.
        assert!(level.is_visible(Position::new(12, 10)));
        assert!(!level.is_visible(Position::new(13, 10)));
        assert!(!level.is_visible(Position::new(16, 10)));
    }

    #[test]
    fn test_closed_door_blocks_sight() {
        let mut level = open_level();
        let origin = Position::new(10, 10);
        for y in 1..20 {
            level.set_tile(Position::new(13, y), Tile::Wall);
        }
        level.set_tile(Position::new(13, 10), Tile::DoorClosed);
        compute_visibility(&mut level, origin, 8);
        assert!(level.is_visible(Position::new(13, 10)));
        assert!(!level.is_visible(Position::new(14, 10)));

        // Opening the door lets the ray continue.
        level.set_tile(Position::new(13, 10), Tile::DoorOpen);
        compute_visibility(&mut level, origin, 8);
        assert!(level.is_visible(Position::new(14, 10)));
    }

    #[test]
    fn test_recompute_clears_stale_visibility() {
        let mut level = open_level();
        compute_visibility(&mut level, Position::new(3, 3), 4);
        assert!(level.is_visible(Position::new(4, 3)));

        compute_visibility(&mut level, Position::new(17, 17), 4);
        assert!(!level.is_visible(Position::new(4, 3)));
        // But exploration persists.
        assert!(level.is_explored(Position::new(4, 3)));
    }
}
