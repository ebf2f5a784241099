//! # Event Stream
//!
//! The publication contract between the simulation core and its consumers
//! (renderer, tutorial sequencer, audio). A closed, typed union per event
//! kind, broadcast synchronously to a list of subscribed listeners.

use crate::data::TrapKind;
use crate::Position;
use serde::{Deserialize, Serialize};

/// Which direction a melee exchange ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatKind {
    /// Player striking a monster.
    Melee,
    /// Monster striking the player.
    MonsterAttack,
}

/// Session status exposed in the read-only snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Playing,
    Dead,
    Won,
    Paused,
}

/// Everything the core broadcasts. Consumers must ignore variants they do
/// not understand; new variants may appear in later versions.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A scheduler turn settled.
    Tick { turn: u64 },
    /// A new level became current.
    LevelChange { depth: u32 },
    /// The player cast a spell.
    SpellCast {
        spell: String,
        target: Option<String>,
        damage: i32,
    },
    /// A monster died.
    MonsterKilled { name: String, xp: u32 },
    /// A melee exchange resolved.
    Combat {
        kind: CombatKind,
        attacker: String,
        defender: String,
        damage: i32,
    },
    /// A closed door was opened by traversal.
    DoorOpen { pos: Position },
    /// A secret wall was converted into a door.
    SecretFound { pos: Position },
    /// A hidden trap fired.
    TrapTriggered { pos: Position, kind: TrapKind },
    /// The whole level layout was revealed.
    MagicMap,
    /// The player was relocated.
    Teleport { to: Position },
    /// An item moved from the ground into the inventory.
    ItemPickup { name: String },
    /// Inventory or equipment contents changed.
    InventoryChange,
    /// The player gained a character level.
    LevelUp { level: u32 },
    /// A user-facing message.
    Log { text: String },
    /// The session reached a terminal state.
    GameOver { status: Status },
}

/// Listener handle invoked for every broadcast event.
pub type Listener = Box<dyn FnMut(&GameEvent)>;

/// Synchronous fan-out of game events to subscribers.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers a listener for all future events.
    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Delivers an event to every listener in subscription order.
    pub fn broadcast(&mut self, event: &GameEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
