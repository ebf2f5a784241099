//! # Combat and Monster AI
//!
//! Melee resolution in both directions, monster abilities, death and
//! experience handling, and the per-action AI step the scheduler drives.
//!
//! Monsters run a two-state machine: `Wander` drifts randomly until the
//! player comes into mutual sight at close range, then `Chase` closes in
//! and attacks. Chase is sticky for the rest of the monster's life.

use crate::data::Ability;
use crate::game::{ActorId, ActorKind, AiState, CombatKind, GameEvent, Position, Status};
use crate::generation::{EncounterGenerator, LootGenerator};
use crate::{config, GroundItem};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use super::state::Game;

/// Loot drop chance on a regular monster death.
const DROP_CHANCE: f64 = 0.3;

/// Loot drop chance on a boss death.
const BOSS_DROP_CHANCE: f64 = 0.9;

impl Game {
    // ------------------------------------------------------------------
    // Player melee
    // ------------------------------------------------------------------

    /// Resolves the player striking a monster. Damage has a floor of 1 so
    /// armor stacking never makes an attack meaningless.
    pub(crate) fn player_attack(&mut self, target: ActorId) {
        let Some(monster) = self.arena.get(target) else {
            return;
        };
        let defense = monster.defense;
        let name = monster.name.clone();

        let swing: i32 = self.rng.gen_range(0..=3);
        let damage = (self.character.melee_power() + swing - defense).max(1);

        self.emit(GameEvent::Combat {
            kind: CombatKind::Melee,
            attacker: "player".to_string(),
            defender: name.clone(),
            damage,
        });
        self.log(format!("You hit the {name} for {damage}."));
        self.damage_monster(target, damage);
    }

    /// Applies damage to a monster and handles its death.
    pub(crate) fn damage_monster(&mut self, target: ActorId, damage: i32) {
        let dead = match self.arena.get_mut(target) {
            Some(monster) => {
                monster.hp -= damage;
                monster.hp <= 0
            }
            None => return,
        };
        if dead {
            self.monster_died(target);
        }
    }

    fn monster_died(&mut self, target: ActorId) {
        let Some(monster) = self.arena.remove(target) else {
            return;
        };
        let boss = matches!(monster.kind, ActorKind::Monster { boss: true, .. });

        self.emit(GameEvent::MonsterKilled {
            name: monster.name.clone(),
            xp: monster.xp_reward,
        });
        self.log(format!("The {} dies.", monster.name));
        debug!("killed {} for {} xp", monster.name, monster.xp_reward);

        let levels = self.character.gain_xp(&self.data, monster.xp_reward);
        for _ in 0..levels {
            let level = self.character.level;
            self.emit(GameEvent::LevelUp { level });
            self.log(format!("Welcome to level {level}!"));
        }
        self.sync_player_actor();

        let drop_chance = if boss { BOSS_DROP_CHANCE } else { DROP_CHANCE };
        if self.rng.gen_bool(drop_chance) {
            let item = LootGenerator::roll_item(&self.data, self.depth, &mut self.rng);
            self.ground_items.push(GroundItem {
                pos: monster.pos,
                item,
            });
        }

        if boss && self.depth >= config::MAX_DEPTH && self.status == Status::Playing {
            self.status = Status::Won;
            self.log("The dungeon lord falls. The depths are yours!");
            self.emit(GameEvent::GameOver {
                status: Status::Won,
            });
        }
    }

    // ------------------------------------------------------------------
    // Monster AI
    // ------------------------------------------------------------------

    /// One monster action, driven by the scheduler when the monster's
    /// energy reaches the action threshold.
    pub(crate) fn ai_step(&mut self, id: ActorId) {
        let Some(monster) = self.arena.get(id) else {
            return;
        };
        let pos = monster.pos;
        let state = monster.ai_state().unwrap_or(AiState::Wander);

        match state {
            AiState::Wander => {
                if self.notices_player(pos) {
                    self.set_ai_state(id, AiState::Chase);
                    // Noticing and closing in happen on the same action.
                    self.chase_step(id);
                } else {
                    self.wander_step(id);
                }
            }
            AiState::Chase => self.chase_step(id),
        }
    }

    /// A wandering monster notices the player when it stands in the
    /// player's lit area close enough to matter. Sight is symmetric, so
    /// the player's visibility mask serves both directions.
    fn notices_player(&self, pos: Position) -> bool {
        self.level.is_visible(pos)
            && pos.manhattan_distance(self.player_pos()) <= config::MONSTER_SIGHT_RANGE
    }

    fn set_ai_state(&mut self, id: ActorId, state: AiState) {
        if let Some(monster) = self.arena.get_mut(id) {
            if let ActorKind::Monster { ai, .. } = &mut monster.kind {
                *ai = state;
            }
        }
    }

    /// Random drift onto any free adjacent tile. Staying put is fine.
    fn wander_step(&mut self, id: ActorId) {
        let Some(monster) = self.arena.get(id) else {
            return;
        };
        let pos = monster.pos;
        let candidates: Vec<Position> = pos
            .neighbors8()
            .into_iter()
            .filter(|&next| self.level.is_walkable(next) && self.arena.actor_at(next).is_none())
            .collect();
        if let Some(&next) = candidates.choose(&mut self.rng) {
            if let Some(monster) = self.arena.get_mut(id) {
                monster.pos = next;
            }
        }
    }

    /// Close in on the player, attack when adjacent, and roll any innate
    /// ability along the way.
    fn chase_step(&mut self, id: ActorId) {
        let Some(monster) = self.arena.get(id) else {
            return;
        };
        let pos = monster.pos;
        let ability = match &monster.kind {
            ActorKind::Monster { ability, .. } => *ability,
            ActorKind::Player => None,
        };
        let player = self.player_pos();

        if let Some(ability) = ability {
            if self.try_ability(id, ability, pos, player) {
                return;
            }
        }

        if pos.manhattan_distance(player) <= 1 {
            self.monster_attack(id, None);
            return;
        }
        self.step_toward(id, pos, player);
    }

    /// Moves one tile toward the target: the axis with the greater delta
    /// first, then the other axis, then a random drift when both are
    /// blocked.
    fn step_toward(&mut self, id: ActorId, from: Position, target: Position) {
        let dx = (target.x - from.x).signum();
        let dy = (target.y - from.y).signum();

        let major_first = (target.x - from.x).abs() >= (target.y - from.y).abs();
        let axis_steps = if major_first {
            [Position::new(from.x + dx, from.y), Position::new(from.x, from.y + dy)]
        } else {
            [Position::new(from.x, from.y + dy), Position::new(from.x + dx, from.y)]
        };

        for next in axis_steps {
            if next != from
                && self.level.is_walkable(next)
                && self.arena.actor_at(next).is_none()
            {
                if let Some(monster) = self.arena.get_mut(id) {
                    monster.pos = next;
                }
                return;
            }
        }
        self.wander_step(id);
    }

    /// Resolves a monster striking the player. `heal_fraction` lets drain
    /// attacks recover part of the damage dealt.
    fn monster_attack(&mut self, id: ActorId, heal_fraction: Option<f64>) {
        let Some(monster) = self.arena.get(id) else {
            return;
        };
        let power = monster.power;
        let name = monster.name.clone();

        let swing: i32 = self.rng.gen_range(0..=2);
        let damage = (power + swing - self.character.mitigation()).max(1);

        self.emit(GameEvent::Combat {
            kind: CombatKind::MonsterAttack,
            attacker: name.clone(),
            defender: "player".to_string(),
            damage,
        });
        self.log(format!("The {name} hits you for {damage}."));

        if let Some(fraction) = heal_fraction {
            let healed = ((damage as f64) * fraction).round() as i32;
            if let Some(monster) = self.arena.get_mut(id) {
                monster.hp = (monster.hp + healed).min(monster.max_hp);
            }
        }

        self.damage_player(damage);
        self.travel = None;
    }

    // ------------------------------------------------------------------
    // Abilities
    // ------------------------------------------------------------------

    /// Rolls the monster's innate ability. Returns true when the ability
    /// consumed the action.
    fn try_ability(
        &mut self,
        id: ActorId,
        ability: Ability,
        pos: Position,
        player: Position,
    ) -> bool {
        match ability {
            Ability::Teleport => {
                if pos.manhattan_distance(player) <= 6 && self.rng.gen_bool(0.08) {
                    self.log("Space folds around you!");
                    self.teleport_player("You are wrenched elsewhere.");
                    return true;
                }
                false
            }
            Ability::Summon => {
                if self.rng.gen_bool(0.08) {
                    return self.summon_minion(id, pos);
                }
                false
            }
            Ability::Drain => {
                // Drain rides the melee attack instead of replacing it.
                if pos.manhattan_distance(player) <= 1 {
                    self.monster_attack(id, Some(0.5));
                    return true;
                }
                false
            }
            Ability::Paralyze => {
                if pos.manhattan_distance(player) <= 1 && self.rng.gen_bool(0.25) {
                    self.log("A numbing venom locks your muscles!");
                    if let Some(player) = self.arena.get_mut(self.player_id) {
                        player.energy = 0;
                    }
                    self.monster_attack(id, None);
                    return true;
                }
                false
            }
        }
    }

    /// Spawns a depth-appropriate minion on a free tile next to the
    /// summoner.
    fn summon_minion(&mut self, id: ActorId, pos: Position) -> bool {
        let Some(summoner_name) = self.arena.get(id).map(|m| m.name.clone()) else {
            return false;
        };
        let key = {
            let eligible = self.data.monsters_for_depth(self.depth);
            let Some(def) = eligible.choose(&mut self.rng) else {
                return false;
            };
            def.key
        };
        let spot = pos
            .neighbors8()
            .into_iter()
            .find(|&next| self.level.is_walkable(next) && self.arena.actor_at(next).is_none());
        let Some(spot) = spot else {
            return false;
        };

        match EncounterGenerator::spawn_from_template(&self.data, key, spot) {
            Ok(mut minion) => {
                if let ActorKind::Monster { ai, .. } = &mut minion.kind {
                    *ai = AiState::Chase;
                }
                let name = minion.name.clone();
                self.arena.insert(minion);
                self.log(format!("The {summoner_name} calls a {name} from the dark!"));
                true
            }
            Err(_) => false,
        }
    }
}
