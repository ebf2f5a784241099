//! # Actor Arena
//!
//! Turn-taking entities (the player and all monsters on the current level)
//! stored in a generational-index arena. Death frees a slot and bumps its
//! generation instead of removing a map entry, so the drain loop can hold a
//! stable snapshot of ids while combat mutates the arena.

use crate::data::Ability;
use crate::Position;
use serde::{Deserialize, Serialize};

/// Stable handle to an arena slot. A stale id (freed slot, older
/// generation) simply resolves to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId {
    pub index: u32,
    pub generation: u32,
}

/// Monster behavior state. Chase is sticky: there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    Wander,
    Chase,
}

/// What kind of actor occupies a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    Monster {
        template_key: String,
        ai: AiState,
        boss: bool,
        ability: Option<Ability>,
    },
}

/// A turn-taking entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub pos: Position,
    pub hp: i32,
    pub max_hp: i32,
    pub power: i32,
    pub defense: i32,
    /// Energy gained per scheduler tick. 100 is baseline.
    pub speed: i32,
    /// Readiness accumulator; an action fires at 100 and costs 100.
    pub energy: i32,
    pub xp_reward: u32,
    pub name: String,
    pub kind: ActorKind,
}

impl Actor {
    /// Creates the player actor at a spawn position.
    pub fn player(pos: Position, hp: i32, speed: i32) -> Self {
        Self {
            pos,
            hp,
            max_hp: hp,
            power: 0,
            defense: 0,
            speed,
            energy: 100,
            xp_reward: 0,
            name: "player".to_string(),
            kind: ActorKind::Player,
        }
    }

    /// Current AI state, for monsters.
    pub fn ai_state(&self) -> Option<AiState> {
        match &self.kind {
            ActorKind::Monster { ai, .. } => Some(*ai),
            ActorKind::Player => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    actor: Option<Actor>,
}

/// Generational arena of actors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ActorArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an actor, reusing a freed slot when one exists.
    pub fn insert(&mut self, actor: Actor) -> ActorId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.actor = Some(actor);
            ActorId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                actor: Some(actor),
            });
            ActorId {
                index,
                generation: 0,
            }
        }
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.actor.as_ref()
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.actor.as_mut()
    }

    /// Frees a slot and invalidates all outstanding ids for it.
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation || slot.actor.is_none() {
            return None;
        }
        let actor = slot.actor.take();
        slot.generation += 1;
        self.free.push(id.index);
        actor
    }

    /// Removes every actor and resets all slots. Used on level change.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Snapshot of all live ids, in slot order. Safe to iterate while
    /// mutating the arena: stale ids resolve to `None`.
    pub fn live_ids(&self) -> Vec<ActorId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.actor.is_some())
            .map(|(index, slot)| ActorId {
                index: index as u32,
                generation: slot.generation,
            })
            .collect()
    }

    /// Iterates live actors with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.actor.as_ref().map(|actor| {
                (
                    ActorId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    actor,
                )
            })
        })
    }

    /// The live actor occupying `pos`, if any.
    pub fn actor_at(&self, pos: Position) -> Option<ActorId> {
        self.iter()
            .find(|(_, actor)| actor.pos == pos)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.actor.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
