//! # Generation Module
//!
//! Procedural content generation: dungeon layout, monster encounters, and
//! loot. Every generator draws from an explicit [`StdRng`] so a session can
//! be replayed deterministically from a seed.

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;

use crate::data::GameData;
use crate::GloamResult;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Tuning knobs for procedural generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Level width in tiles.
    pub width: u32,
    /// Level height in tiles.
    pub height: u32,
    /// Attempt budget for random room placement.
    pub room_attempts: u32,
    /// Probability of a door on an eligible room-edge tile.
    pub door_chance: f64,
    /// Fraction of the room count added as extra redundant corridors.
    pub extra_corridor_ratio: f64,
    /// Base chance of a secret room, grown by depth.
    pub secret_room_base_chance: f64,
    /// Per-depth growth of the secret room chance.
    pub secret_room_depth_chance: f64,
    /// Attempt budget for secret-room attachment.
    pub secret_room_attempts: u32,
    /// Chance of extra portals on levels past `extra_portal_min_depth`.
    pub extra_portal_chance: f64,
    /// Depth after which extra portals may appear.
    pub extra_portal_min_depth: u32,
    /// Monsters per level, before depth scaling.
    pub base_monster_count: u32,
    /// Ground items per level, before depth scaling.
    pub base_item_count: u32,
}

impl GenerationConfig {
    /// Standard tuning for the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            room_attempts: 200,
            door_chance: 0.5,
            extra_corridor_ratio: 0.3,
            secret_room_base_chance: 0.2,
            secret_room_depth_chance: 0.06,
            secret_room_attempts: 20,
            extra_portal_chance: 0.15,
            extra_portal_min_depth: 3,
            base_monster_count: 3,
            base_item_count: 3,
        }
    }

    /// Small, feature-light levels for tests.
    pub fn for_testing() -> Self {
        Self {
            secret_room_base_chance: 0.0,
            secret_room_depth_chance: 0.0,
            extra_portal_chance: 0.0,
            ..Self::new(40, 30)
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_DUNGEON_WIDTH,
            crate::config::DEFAULT_DUNGEON_HEIGHT,
        )
    }
}

/// Trait for procedural generators.
///
/// All generation systems implement this, keeping the data catalogs and the
/// random source explicit parameters rather than ambient state.
pub trait Generator<T> {
    /// Generates content for a depth using the provided configuration,
    /// catalogs, and random source.
    fn generate(
        &self,
        config: &GenerationConfig,
        data: &GameData,
        depth: u32,
        rng: &mut StdRng,
    ) -> GloamResult<T>;

    /// Validates that generated content meets structural requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> GloamResult<()>;

    /// Generator type name for logging.
    fn generator_type(&self) -> &'static str;
}
