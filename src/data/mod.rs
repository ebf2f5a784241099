//! # Static Data Tables
//!
//! Immutable catalogs of races, classes, spells, monsters, items, traps, and
//! level themes. Pure data: constructed once at startup and passed by
//! reference into the generator, AI, and itemization components. Nothing in
//! this module mutates after construction.

use serde::{Deserialize, Serialize};

/// Special attack available to some monster templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Relocates the player to a random floor tile.
    Teleport,
    /// Spawns an eligible non-boss monster adjacent to the summoner.
    Summon,
    /// Melee heals the attacker for part of the damage dealt.
    Drain,
    /// Melee zeroes the player's energy, skipping their next ready turn.
    Paralyze,
}

/// Kinds of hidden hazards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrapKind {
    Spike,
    Poison,
    Fire,
    Teleport,
}

impl TrapKind {
    pub fn name(self) -> &'static str {
        match self {
            TrapKind::Spike => "spike trap",
            TrapKind::Poison => "poison dart trap",
            TrapKind::Fire => "fire rune",
            TrapKind::Teleport => "teleport rune",
        }
    }

    /// Inclusive damage range on trigger; teleport traps displace instead.
    pub fn damage_range(self) -> (i32, i32) {
        match self {
            TrapKind::Spike => (3, 8),
            TrapKind::Poison => (2, 6),
            TrapKind::Fire => (4, 10),
            TrapKind::Teleport => (0, 0),
        }
    }

    pub fn all() -> [TrapKind; 4] {
        [
            TrapKind::Spike,
            TrapKind::Poison,
            TrapKind::Fire,
            TrapKind::Teleport,
        ]
    }
}

/// Potion effect kinds. Display identity is obfuscated per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PotionKind {
    Healing,
    Mana,
    Strength,
    Poison,
    Regeneration,
}

impl PotionKind {
    pub fn true_name(self) -> &'static str {
        match self {
            PotionKind::Healing => "potion of healing",
            PotionKind::Mana => "potion of mana",
            PotionKind::Strength => "potion of strength",
            PotionKind::Poison => "potion of poison",
            PotionKind::Regeneration => "potion of regeneration",
        }
    }

    pub fn all() -> [PotionKind; 5] {
        [
            PotionKind::Healing,
            PotionKind::Mana,
            PotionKind::Strength,
            PotionKind::Poison,
            PotionKind::Regeneration,
        ]
    }
}

/// Scroll effect kinds. Scrolls are always identified by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollKind {
    Identify,
    MagicMapping,
    Teleportation,
}

impl ScrollKind {
    pub fn name(self) -> &'static str {
        match self {
            ScrollKind::Identify => "scroll of identify",
            ScrollKind::MagicMapping => "scroll of magic mapping",
            ScrollKind::Teleportation => "scroll of teleportation",
        }
    }

    pub fn all() -> [ScrollKind; 3] {
        [
            ScrollKind::Identify,
            ScrollKind::MagicMapping,
            ScrollKind::Teleportation,
        ]
    }
}

/// Equipment slots on the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Armor,
    Ring,
}

/// A playable race and its stat scaling.
#[derive(Debug, Clone, Serialize)]
pub struct RaceDef {
    pub key: &'static str,
    pub name: &'static str,
    pub hp_mult: f64,
    pub mp_mult: f64,
    pub str_bonus: i32,
    pub dex_bonus: i32,
    pub int_bonus: i32,
}

/// A playable class: base stats, per-level growth, and spell list.
#[derive(Debug, Clone, Serialize)]
pub struct ClassDef {
    pub key: &'static str,
    pub name: &'static str,
    pub base_str: i32,
    pub base_dex: i32,
    pub base_int: i32,
    pub hp_per_level: i32,
    pub mp_per_level: i32,
    pub spells: Vec<&'static str>,
}

/// A castable spell.
#[derive(Debug, Clone, Serialize)]
pub struct SpellDef {
    pub key: &'static str,
    pub name: &'static str,
    pub mana_cost: i32,
    /// Turns before the spell is ready again.
    pub cooldown: u32,
    /// Base damage before the caster's intelligence scaling.
    pub power: i32,
}

/// A monster template the encounter generator instantiates from.
#[derive(Debug, Clone, Serialize)]
pub struct MonsterDef {
    pub key: &'static str,
    pub name: &'static str,
    pub hp: i32,
    pub power: i32,
    pub defense: i32,
    pub speed: i32,
    pub xp: u32,
    /// Shallowest depth at which this template may spawn.
    pub min_depth: u32,
    pub boss: bool,
    pub ability: Option<Ability>,
}

/// An equipment template.
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentDef {
    pub key: &'static str,
    pub name: &'static str,
    pub slot: EquipSlot,
    pub base_bonus: i32,
    pub rarity_weight: u32,
    pub min_level: u32,
    pub legendary: bool,
}

/// A level flavor theme, gated by depth.
#[derive(Debug, Clone, Serialize)]
pub struct ThemeDef {
    pub key: &'static str,
    pub name: &'static str,
    pub min_depth: u32,
}

/// Cosmetic appearance strings potions are shuffled over per session.
pub const POTION_APPEARANCES: [&str; 5] =
    ["bubbling", "smoky", "oily", "fizzy", "glowing"];

/// Cosmetic colors potions are shuffled over per session.
pub const POTION_COLORS: [&str; 5] = ["crimson", "azure", "emerald", "violet", "amber"];

/// The complete immutable catalog set.
#[derive(Debug, Clone, Serialize)]
pub struct GameData {
    pub races: Vec<RaceDef>,
    pub classes: Vec<ClassDef>,
    pub spells: Vec<SpellDef>,
    pub monsters: Vec<MonsterDef>,
    pub equipment: Vec<EquipmentDef>,
    pub themes: Vec<ThemeDef>,
}

impl GameData {
    /// Builds the standard catalog set.
    pub fn standard() -> Self {
        Self {
            races: vec![
                RaceDef {
                    key: "human",
                    name: "Human",
                    hp_mult: 1.0,
                    mp_mult: 1.0,
                    str_bonus: 1,
                    dex_bonus: 1,
                    int_bonus: 1,
                },
                RaceDef {
                    key: "dwarf",
                    name: "Dwarf",
                    hp_mult: 1.3,
                    mp_mult: 0.7,
                    str_bonus: 2,
                    dex_bonus: 0,
                    int_bonus: 0,
                },
                RaceDef {
                    key: "elf",
                    name: "Elf",
                    hp_mult: 0.8,
                    mp_mult: 1.4,
                    str_bonus: 0,
                    dex_bonus: 1,
                    int_bonus: 2,
                },
                RaceDef {
                    key: "gnome",
                    name: "Gnome",
                    hp_mult: 0.9,
                    mp_mult: 1.2,
                    str_bonus: 0,
                    dex_bonus: 2,
                    int_bonus: 1,
                },
            ],
            classes: vec![
                ClassDef {
                    key: "warrior",
                    name: "Warrior",
                    base_str: 8,
                    base_dex: 5,
                    base_int: 2,
                    hp_per_level: 8,
                    mp_per_level: 1,
                    spells: vec!["war_cry"],
                },
                ClassDef {
                    key: "mage",
                    name: "Mage",
                    base_str: 3,
                    base_dex: 4,
                    base_int: 9,
                    hp_per_level: 4,
                    mp_per_level: 6,
                    spells: vec!["firebolt", "frost_nova"],
                },
                ClassDef {
                    key: "rogue",
                    name: "Rogue",
                    base_str: 5,
                    base_dex: 9,
                    base_int: 4,
                    hp_per_level: 6,
                    mp_per_level: 3,
                    spells: vec!["shadow_strike"],
                },
            ],
            spells: vec![
                SpellDef {
                    key: "firebolt",
                    name: "Firebolt",
                    mana_cost: 5,
                    cooldown: 2,
                    power: 6,
                },
                SpellDef {
                    key: "frost_nova",
                    name: "Frost Nova",
                    mana_cost: 9,
                    cooldown: 5,
                    power: 10,
                },
                SpellDef {
                    key: "war_cry",
                    name: "War Cry",
                    mana_cost: 4,
                    cooldown: 4,
                    power: 4,
                },
                SpellDef {
                    key: "shadow_strike",
                    name: "Shadow Strike",
                    mana_cost: 6,
                    cooldown: 3,
                    power: 7,
                },
            ],
            monsters: vec![
                MonsterDef {
                    key: "rat",
                    name: "Giant Rat",
                    hp: 6,
                    power: 2,
                    defense: 0,
                    speed: 110,
                    xp: 5,
                    min_depth: 1,
                    boss: false,
                    ability: None,
                },
                MonsterDef {
                    key: "goblin",
                    name: "Goblin",
                    hp: 10,
                    power: 3,
                    defense: 1,
                    speed: 100,
                    xp: 8,
                    min_depth: 1,
                    boss: false,
                    ability: None,
                },
                MonsterDef {
                    key: "skeleton",
                    name: "Skeleton",
                    hp: 14,
                    power: 4,
                    defense: 2,
                    speed: 90,
                    xp: 12,
                    min_depth: 2,
                    boss: false,
                    ability: None,
                },
                MonsterDef {
                    key: "wraith",
                    name: "Wraith",
                    hp: 18,
                    power: 5,
                    defense: 2,
                    speed: 120,
                    xp: 20,
                    min_depth: 4,
                    boss: false,
                    ability: Some(Ability::Drain),
                },
                MonsterDef {
                    key: "warlock",
                    name: "Warlock",
                    hp: 16,
                    power: 4,
                    defense: 1,
                    speed: 100,
                    xp: 22,
                    min_depth: 5,
                    boss: false,
                    ability: Some(Ability::Summon),
                },
                MonsterDef {
                    key: "blink_fiend",
                    name: "Blink Fiend",
                    hp: 20,
                    power: 6,
                    defense: 2,
                    speed: 130,
                    xp: 28,
                    min_depth: 6,
                    boss: false,
                    ability: Some(Ability::Teleport),
                },
                MonsterDef {
                    key: "cave_spider",
                    name: "Cave Spider",
                    hp: 22,
                    power: 7,
                    defense: 3,
                    speed: 110,
                    xp: 30,
                    min_depth: 7,
                    boss: false,
                    ability: Some(Ability::Paralyze),
                },
                MonsterDef {
                    key: "ogre",
                    name: "Ogre",
                    hp: 35,
                    power: 9,
                    defense: 4,
                    speed: 80,
                    xp: 40,
                    min_depth: 8,
                    boss: false,
                    ability: None,
                },
                MonsterDef {
                    key: "dungeon_lord",
                    name: "The Dungeon Lord",
                    hp: 120,
                    power: 14,
                    defense: 6,
                    speed: 110,
                    xp: 500,
                    min_depth: crate::config::MAX_DEPTH,
                    boss: true,
                    ability: Some(Ability::Summon),
                },
            ],
            equipment: vec![
                EquipmentDef {
                    key: "short_sword",
                    name: "short sword",
                    slot: EquipSlot::Weapon,
                    base_bonus: 2,
                    rarity_weight: 10,
                    min_level: 1,
                    legendary: false,
                },
                EquipmentDef {
                    key: "long_sword",
                    name: "long sword",
                    slot: EquipSlot::Weapon,
                    base_bonus: 4,
                    rarity_weight: 6,
                    min_level: 3,
                    legendary: false,
                },
                EquipmentDef {
                    key: "war_axe",
                    name: "war axe",
                    slot: EquipSlot::Weapon,
                    base_bonus: 6,
                    rarity_weight: 3,
                    min_level: 5,
                    legendary: false,
                },
                EquipmentDef {
                    key: "leather_armor",
                    name: "leather armor",
                    slot: EquipSlot::Armor,
                    base_bonus: 1,
                    rarity_weight: 10,
                    min_level: 1,
                    legendary: false,
                },
                EquipmentDef {
                    key: "chain_mail",
                    name: "chain mail",
                    slot: EquipSlot::Armor,
                    base_bonus: 3,
                    rarity_weight: 6,
                    min_level: 3,
                    legendary: false,
                },
                EquipmentDef {
                    key: "plate_armor",
                    name: "plate armor",
                    slot: EquipSlot::Armor,
                    base_bonus: 5,
                    rarity_weight: 3,
                    min_level: 6,
                    legendary: false,
                },
                EquipmentDef {
                    key: "iron_ring",
                    name: "iron ring",
                    slot: EquipSlot::Ring,
                    base_bonus: 1,
                    rarity_weight: 8,
                    min_level: 2,
                    legendary: false,
                },
                EquipmentDef {
                    key: "soulrender",
                    name: "Soulrender",
                    slot: EquipSlot::Weapon,
                    base_bonus: 9,
                    rarity_weight: 1,
                    min_level: 7,
                    legendary: true,
                },
                EquipmentDef {
                    key: "aegis_of_dawn",
                    name: "Aegis of Dawn",
                    slot: EquipSlot::Armor,
                    base_bonus: 8,
                    rarity_weight: 1,
                    min_level: 8,
                    legendary: true,
                },
            ],
            themes: vec![
                ThemeDef {
                    key: "catacombs",
                    name: "Mossy Catacombs",
                    min_depth: 1,
                },
                ThemeDef {
                    key: "mines",
                    name: "Collapsed Mines",
                    min_depth: 3,
                },
                ThemeDef {
                    key: "crypt",
                    name: "Sunken Crypt",
                    min_depth: 5,
                },
                ThemeDef {
                    key: "abyss",
                    name: "Screaming Abyss",
                    min_depth: 8,
                },
            ],
        }
    }

    /// Looks up a race by key.
    pub fn race(&self, key: &str) -> Option<&RaceDef> {
        self.races.iter().find(|r| r.key == key)
    }

    /// Looks up a class by key.
    pub fn class(&self, key: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.key == key)
    }

    /// Looks up a spell by key.
    pub fn spell(&self, key: &str) -> Option<&SpellDef> {
        self.spells.iter().find(|s| s.key == key)
    }

    /// Looks up a monster template by key.
    pub fn monster(&self, key: &str) -> Option<&MonsterDef> {
        self.monsters.iter().find(|m| m.key == key)
    }

    /// Looks up an equipment template by key.
    pub fn equipment_def(&self, key: &str) -> Option<&EquipmentDef> {
        self.equipment.iter().find(|e| e.key == key)
    }

    /// Non-boss monster templates eligible at a depth.
    pub fn monsters_for_depth(&self, depth: u32) -> Vec<&MonsterDef> {
        self.monsters
            .iter()
            .filter(|m| !m.boss && m.min_depth <= depth)
            .collect()
    }

    /// The deepest-eligible theme for a depth.
    pub fn theme_for_depth(&self, depth: u32) -> &ThemeDef {
        self.themes
            .iter()
            .filter(|t| t.min_depth <= depth)
            .last()
            .unwrap_or(&self.themes[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalogs_are_consistent() {
        let data = GameData::standard();
        assert!(!data.races.is_empty());
        assert!(!data.classes.is_empty());

        // Every class spell must exist in the spell catalog.
        for class in &data.classes {
            for key in &class.spells {
                assert!(data.spell(key).is_some(), "missing spell {key}");
            }
        }

        // Exactly one boss, gated to max depth.
        let bosses: Vec<_> = data.monsters.iter().filter(|m| m.boss).collect();
        assert_eq!(bosses.len(), 1);
        assert_eq!(bosses[0].min_depth, crate::config::MAX_DEPTH);
    }

    #[test]
    fn test_depth_gating() {
        let data = GameData::standard();
        let shallow = data.monsters_for_depth(1);
        assert!(shallow.iter().all(|m| m.min_depth <= 1 && !m.boss));
        let deep = data.monsters_for_depth(8);
        assert!(deep.len() > shallow.len());
    }

    #[test]
    fn test_theme_selection() {
        let data = GameData::standard();
        assert_eq!(data.theme_for_depth(1).key, "catacombs");
        assert_eq!(data.theme_for_depth(9).key, "abyss");
    }

    #[test]
    fn test_potion_cosmetics_cover_all_kinds() {
        assert_eq!(POTION_APPEARANCES.len(), PotionKind::all().len());
        assert_eq!(POTION_COLORS.len(), PotionKind::all().len());
    }

    #[test]
    fn test_catalogs_serialize() {
        let data = GameData::standard();
        let json = serde_json::to_string(&data).expect("catalogs should serialize");
        assert!(json.contains("\"human\""));
        assert!(json.contains("\"dungeon_lord\""));
    }
}
