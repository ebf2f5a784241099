//! # Items & Identification
//!
//! The item model, the per-session potion-identity obfuscation table, and
//! display-name rules. Inventory mutation itself lives on [`crate::Game`];
//! this module is the data layer under it.

use crate::data::{EquipSlot, PotionKind, ScrollKind, POTION_APPEARANCES, POTION_COLORS};
use crate::Position;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Enchantment tag on equipment, hidden until first equip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Enchant {
    Cursed,
    Normal,
    Enchanted,
}

/// Category of a pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Potion(PotionKind),
    Scroll(ScrollKind),
    Equipment { key: String, slot: EquipSlot },
    Legendary { key: String, slot: EquipSlot },
}

/// A pickup, owned by exactly one of: the ground list, the inventory, or an
/// equipment slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    /// Base display name from the template catalog.
    pub base_name: String,
    /// Whether the true identity/bonus is known to the player.
    pub identified: bool,
    /// Hidden numeric bonus on equipment; revealed at first equip.
    pub bonus: i32,
    pub enchant: Enchant,
}

impl Item {
    pub fn potion(kind: PotionKind) -> Self {
        Self {
            kind: ItemKind::Potion(kind),
            base_name: kind.true_name().to_string(),
            identified: false,
            bonus: 0,
            enchant: Enchant::Normal,
        }
    }

    pub fn scroll(kind: ScrollKind) -> Self {
        Self {
            kind: ItemKind::Scroll(kind),
            base_name: kind.name().to_string(),
            identified: true,
            bonus: 0,
            enchant: Enchant::Normal,
        }
    }

    pub fn potion_kind(&self) -> Option<PotionKind> {
        match self.kind {
            ItemKind::Potion(kind) => Some(kind),
            _ => None,
        }
    }

    /// Effective bonus once equipped. Curses invert the sign.
    pub fn effective_bonus(&self) -> i32 {
        match self.enchant {
            Enchant::Cursed => -self.bonus,
            Enchant::Normal => self.bonus,
            Enchant::Enchanted => self.bonus,
        }
    }
}

/// An item lying on the current level's floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundItem {
    pub pos: Position,
    pub item: Item,
}

/// Session-scoped potion obfuscation: each potion kind is bijected to a
/// cosmetic appearance and color via independent shuffles. Immutable after
/// construction; only the identified set grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotionIdentityMap {
    cosmetics: HashMap<PotionKind, (String, String)>,
    identified: HashSet<PotionKind>,
}

impl PotionIdentityMap {
    /// Shuffles appearances and colors independently over the potion kinds.
    pub fn generate(rng: &mut StdRng) -> Self {
        let kinds = PotionKind::all();
        let mut appearances: Vec<&str> = POTION_APPEARANCES.to_vec();
        let mut colors: Vec<&str> = POTION_COLORS.to_vec();
        appearances.shuffle(rng);
        colors.shuffle(rng);

        let cosmetics = kinds
            .iter()
            .enumerate()
            .map(|(i, &kind)| (kind, (appearances[i].to_string(), colors[i].to_string())))
            .collect();

        Self {
            cosmetics,
            identified: HashSet::new(),
        }
    }

    /// Cosmetic display for an unidentified potion kind.
    pub fn cosmetic(&self, kind: PotionKind) -> (&str, &str) {
        let (appearance, color) = &self.cosmetics[&kind];
        (appearance, color)
    }

    pub fn is_identified(&self, kind: PotionKind) -> bool {
        self.identified.contains(&kind)
    }

    /// Marks a potion kind identified. Returns false if it already was.
    pub fn identify(&mut self, kind: PotionKind) -> bool {
        self.identified.insert(kind)
    }

    /// Name shown to the player for an item, honoring obfuscation and
    /// revealed equipment bonuses.
    pub fn display_name(&self, item: &Item) -> String {
        match &item.kind {
            ItemKind::Potion(kind) => {
                if self.is_identified(*kind) {
                    kind.true_name().to_string()
                } else {
                    let (appearance, color) = self.cosmetic(*kind);
                    format!("{appearance} {color} potion")
                }
            }
            ItemKind::Scroll(kind) => kind.name().to_string(),
            ItemKind::Equipment { .. } | ItemKind::Legendary { .. } => {
                if item.identified {
                    format!("{} {:+}", item.base_name, item.effective_bonus())
                } else {
                    item.base_name.clone()
                }
            }
        }
    }
}

/// Rolls the hidden enchantment tag for a freshly generated piece of
/// equipment.
pub fn roll_enchant(rng: &mut StdRng) -> Enchant {
    let roll: f64 = rng.gen();
    if roll < 0.08 {
        Enchant::Cursed
    } else if roll < 0.30 {
        Enchant::Enchanted
    } else {
        Enchant::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_identity_map_is_a_bijection() {
        let mut rng = StdRng::seed_from_u64(7);
        let map = PotionIdentityMap::generate(&mut rng);

        let mut appearances = HashSet::new();
        let mut colors = HashSet::new();
        for kind in PotionKind::all() {
            let (a, c) = map.cosmetic(kind);
            appearances.insert(a.to_string());
            colors.insert(c.to_string());
        }
        assert_eq!(appearances.len(), PotionKind::all().len());
        assert_eq!(colors.len(), PotionKind::all().len());
    }

    #[test]
    fn test_display_name_flips_on_identify() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut map = PotionIdentityMap::generate(&mut rng);
        let item = Item::potion(PotionKind::Healing);

        let obfuscated = map.display_name(&item);
        assert!(obfuscated.ends_with("potion"));
        assert_ne!(obfuscated, "potion of healing");

        assert!(map.identify(PotionKind::Healing));
        assert_eq!(map.display_name(&item), "potion of healing");

        // Identification is monotonic and idempotent.
        assert!(!map.identify(PotionKind::Healing));
    }

    #[test]
    fn test_cursed_bonus_is_negative() {
        let mut item = Item {
            kind: ItemKind::Equipment {
                key: "short_sword".into(),
                slot: EquipSlot::Weapon,
            },
            base_name: "short sword".into(),
            identified: false,
            bonus: 3,
            enchant: Enchant::Cursed,
        };
        assert_eq!(item.effective_bonus(), -3);
        item.enchant = Enchant::Enchanted;
        assert_eq!(item.effective_bonus(), 3);
    }

    #[test]
    fn test_equipment_name_shows_signed_bonus_after_identify() {
        let mut rng = StdRng::seed_from_u64(7);
        let map = PotionIdentityMap::generate(&mut rng);
        let mut item = Item {
            kind: ItemKind::Equipment {
                key: "iron_ring".into(),
                slot: EquipSlot::Ring,
            },
            base_name: "iron ring".into(),
            identified: false,
            bonus: 2,
            enchant: Enchant::Cursed,
        };
        assert_eq!(map.display_name(&item), "iron ring");
        item.identified = true;
        assert_eq!(map.display_name(&item), "iron ring -2");
    }
}
