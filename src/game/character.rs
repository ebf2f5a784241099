//! # Player Character
//!
//! The persistent player record: race/class choice, stat pools, leveling,
//! equipment slots, spell cooldowns, and the inventory list. Created once per
//! session; mutated throughout; only death or victory end its story.

use crate::data::{EquipSlot, GameData};
use crate::game::items::Item;
use crate::{GloamError, GloamResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persistent player stats and possessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub race_key: String,
    pub class_key: String,
    pub level: u32,
    pub xp: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    /// Energy gained per scheduler tick.
    pub speed: i32,
    pub inventory: Vec<Item>,
    pub equipment: HashMap<EquipSlot, Item>,
    /// Remaining cooldown turns per spell key; entries decay to 0.
    pub cooldowns: HashMap<String, u32>,
}

impl Character {
    /// Builds a level-1 character from a race and class choice.
    pub fn new(data: &GameData, race_key: &str, class_key: &str) -> GloamResult<Self> {
        let race = data
            .race(race_key)
            .ok_or_else(|| GloamError::InvalidState(format!("unknown race: {race_key}")))?;
        let class = data
            .class(class_key)
            .ok_or_else(|| GloamError::InvalidState(format!("unknown class: {class_key}")))?;

        let max_hp = ((20 + class.hp_per_level) as f64 * race.hp_mult).round() as i32;
        let max_mp = ((10 + class.mp_per_level) as f64 * race.mp_mult).round() as i32;

        Ok(Self {
            race_key: race_key.to_string(),
            class_key: class_key.to_string(),
            level: 1,
            xp: 0,
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            strength: class.base_str + race.str_bonus,
            dexterity: class.base_dex + race.dex_bonus,
            intelligence: class.base_int + race.int_bonus,
            speed: 100,
            inventory: Vec::new(),
            equipment: HashMap::new(),
            cooldowns: HashMap::new(),
        })
    }

    /// XP required to advance from the current level.
    pub fn xp_threshold(&self) -> u32 {
        self.level * 25
    }

    /// Grants XP and applies every level-up it pays for. Growth scales with
    /// the race multipliers and class per-level gains. Returns the number of
    /// levels gained.
    pub fn gain_xp(&mut self, data: &GameData, amount: u32) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        while self.xp >= self.xp_threshold() {
            self.xp -= self.xp_threshold();
            self.level += 1;
            gained += 1;
            self.apply_level_growth(data);
        }
        gained
    }

    fn apply_level_growth(&mut self, data: &GameData) {
        let race = data.race(&self.race_key);
        let class = data.class(&self.class_key);
        let (hp_mult, mp_mult) = race.map(|r| (r.hp_mult, r.mp_mult)).unwrap_or((1.0, 1.0));
        let (hp_gain, mp_gain) = class
            .map(|c| (c.hp_per_level, c.mp_per_level))
            .unwrap_or((5, 2));

        let hp_gain = ((hp_gain as f64) * hp_mult).round() as i32;
        let mp_gain = ((mp_gain as f64) * mp_mult).round() as i32;
        self.max_hp += hp_gain.max(1);
        self.max_mp += mp_gain.max(0);
        self.hp = self.max_hp;
        self.mp = self.max_mp;

        // One point in the class primary stat every level.
        match class.map(|c| (c.base_str, c.base_dex, c.base_int)) {
            Some((s, d, i)) if s >= d && s >= i => self.strength += 1,
            Some((_, d, i)) if d >= i => self.dexterity += 1,
            Some(_) => self.intelligence += 1,
            None => self.strength += 1,
        }
    }

    /// Summed effective bonus of equipped items in the given slots.
    fn equip_bonus(&self, slots: &[EquipSlot]) -> i32 {
        slots
            .iter()
            .filter_map(|slot| self.equipment.get(slot))
            .map(Item::effective_bonus)
            .sum()
    }

    /// Melee attack power: strength plus weapon bonus.
    pub fn melee_power(&self) -> i32 {
        self.strength + self.equip_bonus(&[EquipSlot::Weapon])
    }

    /// Incoming-damage mitigation: dexterity-derived dodge plus armor and
    /// ring defense.
    pub fn mitigation(&self) -> i32 {
        self.dexterity / 3 + self.equip_bonus(&[EquipSlot::Armor, EquipSlot::Ring])
    }

    /// Whether a spell is off cooldown.
    pub fn spell_ready(&self, spell_key: &str) -> bool {
        self.cooldowns.get(spell_key).copied().unwrap_or(0) == 0
    }

    /// Decrements every non-zero cooldown by one. Called once per scheduler
    /// tick.
    pub fn decay_cooldowns(&mut self) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }

    /// Applies damage, clamping at zero hp.
    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
    }

    /// Heals without exceeding the maximum pool.
    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }
}
