//! # Gloam
//!
//! Simulation core of a turn-based dungeon crawler.
//!
//! ## Architecture Overview
//!
//! Gloam owns everything that must stay consistent turn over turn:
//!
//! - **Game State**: a single [`Game`] aggregator that owns the level, the
//!   actor arena, the player character, and the event bus
//! - **Turn Scheduler**: energy-based cooperative scheduling of the player
//!   and all monsters
//! - **Generation System**: procedural dungeon, encounter, and loot creation
//!   driven by an explicit random source
//! - **Visibility Engine**: ray-cast fog of war recomputed every settled turn
//! - **Event Stream**: a closed, typed event union broadcast to subscribers
//!
//! Presentation, input translation, audio, tutorials, and persistence are
//! external consumers of the event stream and the read-only state snapshot;
//! none of them live in this crate.

pub mod data;
pub mod game;
pub mod generation;

pub use game::*;
pub use generation::{
    DungeonGenerator, EncounterGenerator, GenerationConfig, Generator, LootGenerator,
};

pub use data::GameData;

/// Core error type for the Gloam engine.
#[derive(thiserror::Error, Debug)]
pub enum GloamError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Gloam codebase.
pub type GloamResult<T> = Result<T, GloamError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_DUNGEON_WIDTH: u32 = 60;

    /// Default dungeon height in tiles
    pub const DEFAULT_DUNGEON_HEIGHT: u32 = 40;

    /// Energy an actor must accrue before its action fires
    pub const ACTION_COST: i32 = 100;

    /// Safety cap on drain-loop iterations per accepted action
    pub const DRAIN_LOOP_CAP: u32 = 1000;

    /// Player sight range in tiles
    pub const SIGHT_RANGE: i32 = 8;

    /// Number of rays cast per visibility computation
    pub const VISIBILITY_RAYS: u32 = 240;

    /// Depth of the final level; the boss lives here
    pub const MAX_DEPTH: u32 = 10;

    /// Manhattan distance at which a wandering monster can notice the player
    pub const MONSTER_SIGHT_RANGE: u32 = 6;
}
