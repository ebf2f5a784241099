//! # Encounter Generation
//!
//! Monster placement for a freshly generated level: depth-gated template
//! selection, counts scaled by depth, and the boss spawn at the final depth.

use crate::data::GameData;
use crate::game::{Actor, ActorKind, AiState, Level, Position};
use crate::generation::GenerationConfig;
use crate::{GloamError, GloamResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Spawns monsters onto room floor tiles of a carved level.
#[derive(Debug, Clone, Default)]
pub struct EncounterGenerator;

impl EncounterGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Instantiates an actor from a monster template.
    pub fn spawn_from_template(
        data: &GameData,
        template_key: &str,
        pos: Position,
    ) -> GloamResult<Actor> {
        let def = data.monster(template_key).ok_or_else(|| {
            GloamError::GenerationFailed(format!("unknown monster template: {template_key}"))
        })?;
        Ok(Actor {
            pos,
            hp: def.hp,
            max_hp: def.hp,
            power: def.power,
            defense: def.defense,
            speed: def.speed,
            energy: 0,
            xp_reward: def.xp,
            name: def.name.to_string(),
            kind: ActorKind::Monster {
                template_key: def.key.to_string(),
                ai: AiState::Wander,
                boss: def.boss,
                ability: def.ability,
            },
        })
    }

    /// Picks a floor tile inside a non-spawn room that no one occupies yet.
    fn free_room_tile(level: &Level, taken: &[Position], rng: &mut StdRng) -> Option<Position> {
        // The first room is the player spawn room; leave it empty.
        let rooms = level.rooms.get(1..).filter(|r| !r.is_empty())?;
        for _ in 0..40 {
            let room = rooms.choose(rng)?;
            let positions = room.floor_positions();
            let &pos = positions.choose(rng)?;
            if level.tile(pos) == Some(crate::Tile::Floor) && !taken.contains(&pos) {
                return Some(pos);
            }
        }
        None
    }

    /// Populates a level with depth-appropriate monsters. At the final depth
    /// the boss is added on top of the regular population.
    pub fn populate(
        &self,
        level: &Level,
        config: &GenerationConfig,
        data: &GameData,
        rng: &mut StdRng,
    ) -> GloamResult<Vec<Actor>> {
        let depth = level.depth;
        let eligible = data.monsters_for_depth(depth);
        if eligible.is_empty() {
            return Ok(Vec::new());
        }

        let count = config.base_monster_count + depth / 2;
        let mut monsters = Vec::new();
        let mut taken: Vec<Position> = Vec::new();

        for _ in 0..count {
            let Some(def) = eligible.choose(rng) else {
                break;
            };
            let Some(pos) = Self::free_room_tile(level, &taken, rng) else {
                continue;
            };
            taken.push(pos);
            monsters.push(Self::spawn_from_template(data, def.key, pos)?);
        }

        if depth >= crate::config::MAX_DEPTH {
            if let Some(boss) = data.monsters.iter().find(|m| m.boss) {
                if let Some(pos) = Self::free_room_tile(level, &taken, rng) {
                    monsters.push(Self::spawn_from_template(data, boss.key, pos)?);
                }
            }
        }

        Ok(monsters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{DungeonGenerator, Generator};
    use rand::SeedableRng;

    fn level_for(depth: u32, seed: u64) -> (Level, GameData, GenerationConfig) {
        let config = GenerationConfig::for_testing();
        let data = GameData::standard();
        let mut rng = StdRng::seed_from_u64(seed);
        let level = DungeonGenerator::new()
            .generate(&config, &data, depth, &mut rng)
            .unwrap();
        (level, data, config)
    }

    #[test]
    fn test_populated_monsters_respect_depth_gate() {
        let (level, data, config) = level_for(1, 42);
        let mut rng = StdRng::seed_from_u64(42);
        let monsters = EncounterGenerator::new()
            .populate(&level, &config, &data, &mut rng)
            .unwrap();

        assert!(!monsters.is_empty());
        for monster in &monsters {
            let ActorKind::Monster { template_key, ai, boss, .. } = &monster.kind else {
                panic!("non-monster actor spawned");
            };
            let def = data.monster(template_key).unwrap();
            assert!(def.min_depth <= 1);
            assert!(!boss);
            assert_eq!(*ai, AiState::Wander);
            assert!(level.is_walkable(monster.pos));
        }
    }

    #[test]
    fn test_boss_spawns_at_max_depth() {
        let (level, data, config) = level_for(crate::config::MAX_DEPTH, 7);
        let mut rng = StdRng::seed_from_u64(7);
        let monsters = EncounterGenerator::new()
            .populate(&level, &config, &data, &mut rng)
            .unwrap();

        let boss_count = monsters
            .iter()
            .filter(|m| matches!(m.kind, ActorKind::Monster { boss: true, .. }))
            .count();
        assert_eq!(boss_count, 1);
    }

    #[test]
    fn test_monsters_start_with_zero_energy() {
        let (level, data, config) = level_for(2, 13);
        let mut rng = StdRng::seed_from_u64(13);
        let monsters = EncounterGenerator::new()
            .populate(&level, &config, &data, &mut rng)
            .unwrap();
        assert!(monsters.iter().all(|m| m.energy == 0));
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let data = GameData::standard();
        let result =
            EncounterGenerator::spawn_from_template(&data, "dragon", Position::new(1, 1));
        assert!(result.is_err());
    }
}
