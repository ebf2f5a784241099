//! # Game State Module
//!
//! The aggregator that owns every subsystem and exposes the public action
//! and query surface. All state mutation happens synchronously inside action
//! handling or the scheduler's drain loop; there is no concurrent access.
//!
//! Scheduling is energy-based: the player's action fires only when their
//! energy has reached 100, costs exactly 100, and the drain loop then ticks
//! every actor forward until the player is ready again.

use crate::data::{EquipSlot, GameData, PotionKind, ScrollKind, TrapKind};
use crate::game::items::{GroundItem, Item, ItemKind, PotionIdentityMap};
use crate::game::pathing::{auto_explore_target, bfs_path, is_intersection, Travel};
use crate::game::visibility::compute_visibility;
use crate::game::{
    Actor, ActorArena, ActorId, Character, Direction, EventBus, GameEvent, Level, Listener,
    Position, Status, Tile,
};
use crate::generation::{DungeonGenerator, EncounterGenerator, GenerationConfig, Generator,
    LootGenerator};
use crate::{config, GloamError, GloamResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::VecDeque;

/// A logical player action submitted by the input layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Move(Direction),
    Wait,
    PickUp,
    /// Step down through the portal under the player.
    Descend,
    /// Probe adjacent tiles for secret doors and hidden traps.
    Search,
    Cast(String),
    UseItem(usize),
    DropItem(usize),
}

/// Read-only state snapshot for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub depth: u32,
    pub turn: u64,
    pub status: Status,
    pub level: Level,
    pub actors: Vec<Actor>,
    pub ground_items: Vec<GroundItem>,
    pub character: Character,
}

/// The simulation core: dungeon, actors, character, items, scheduler, and
/// event stream, owned together so they stay consistent turn over turn.
pub struct Game {
    pub data: GameData,
    config: GenerationConfig,
    pub(crate) level: Level,
    pub(crate) arena: ActorArena,
    pub(crate) player_id: ActorId,
    pub(crate) character: Character,
    pub(crate) ground_items: Vec<GroundItem>,
    pub(crate) potions: PotionIdentityMap,
    pub(crate) depth: u32,
    pub(crate) status: Status,
    turn: u64,
    pub(crate) travel: Option<Travel>,
    bus: EventBus,
    pub(crate) rng: StdRng,
}

impl Game {
    /// Creates a session with a deterministic random source and generates
    /// the first level.
    pub fn new(
        genconfig: GenerationConfig,
        race_key: &str,
        class_key: &str,
        seed: u64,
    ) -> GloamResult<Self> {
        let data = GameData::standard();
        let mut rng = StdRng::seed_from_u64(seed);
        let character = Character::new(&data, race_key, class_key)?;
        let potions = PotionIdentityMap::generate(&mut rng);

        let mut game = Self {
            data,
            config: genconfig,
            level: Level::new(1, 1, 0),
            arena: ActorArena::new(),
            player_id: ActorId {
                index: 0,
                generation: 0,
            },
            character,
            ground_items: Vec::new(),
            potions,
            depth: 0,
            status: Status::Playing,
            turn: 0,
            travel: None,
            bus: EventBus::new(),
            rng,
        };
        game.generate_level(1)?;
        info!("new session: {race_key} {class_key}, seed {seed}");
        Ok(game)
    }

    /// Creates a session from ambient entropy.
    pub fn from_entropy(
        genconfig: GenerationConfig,
        race_key: &str,
        class_key: &str,
    ) -> GloamResult<Self> {
        Self::new(genconfig, race_key, class_key, rand::random())
    }

    // ------------------------------------------------------------------
    // Read-only surface
    // ------------------------------------------------------------------

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn actors(&self) -> &ActorArena {
        &self.arena
    }

    pub fn player_id(&self) -> ActorId {
        self.player_id
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn ground_items(&self) -> &[GroundItem] {
        &self.ground_items
    }

    pub fn potions(&self) -> &PotionIdentityMap {
        &self.potions
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn travel_active(&self) -> bool {
        self.travel.is_some()
    }

    /// Current player position.
    pub fn player_pos(&self) -> Position {
        self.arena
            .get(self.player_id)
            .map(|a| a.pos)
            .unwrap_or(Position::new(0, 0))
    }

    /// Display name for an item under the session's identity rules.
    pub fn item_name(&self, item: &Item) -> String {
        self.potions.display_name(item)
    }

    /// Whether the player could step onto `(x, y)` right now.
    pub fn is_valid_move(&self, x: i32, y: i32) -> bool {
        let pos = Position::new(x, y);
        self.level.is_walkable(pos) && self.arena.actor_at(pos).is_none()
    }

    /// Clones the read-only snapshot consumed by presentation layers.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            depth: self.depth,
            turn: self.turn,
            status: self.status,
            level: self.level.clone(),
            actors: self.arena.iter().map(|(_, a)| a.clone()).collect(),
            ground_items: self.ground_items.clone(),
            character: self.character.clone(),
        }
    }

    /// Serializes the snapshot to JSON.
    pub fn snapshot_json(&self) -> GloamResult<String> {
        serde_json::to_string(&self.snapshot()).map_err(GloamError::from)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Registers a listener on the event stream.
    pub fn subscribe(&mut self, listener: Listener) {
        self.bus.subscribe(listener);
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.bus.broadcast(&event);
    }

    pub(crate) fn log(&mut self, text: impl Into<String>) {
        let text = text.into();
        debug!("{text}");
        self.emit(GameEvent::Log { text });
    }

    // ------------------------------------------------------------------
    // Level flow
    // ------------------------------------------------------------------

    /// Generates and enters the level at `depth`, replacing the current one
    /// wholesale. The player is relocated to the new spawn room.
    pub fn generate_level(&mut self, depth: u32) -> GloamResult<()> {
        let generator = DungeonGenerator::new();
        let level = generator.generate(&self.config, &self.data, depth, &mut self.rng)?;

        let spawn = level
            .rooms
            .first()
            .map(|r| r.center())
            .ok_or_else(|| GloamError::GenerationFailed("level has no rooms".to_string()))?;

        let monsters =
            EncounterGenerator::new().populate(&level, &self.config, &self.data, &mut self.rng)?;
        let loot =
            LootGenerator::new().populate(&level, &self.config, &self.data, &mut self.rng)?;

        self.level = level;
        self.ground_items = loot;
        self.depth = depth;
        self.travel = None;

        self.arena.clear();
        let mut player = Actor::player(spawn, self.character.hp, self.character.speed);
        player.energy = 100;
        self.player_id = self.arena.insert(player);
        for monster in monsters {
            self.arena.insert(monster);
        }
        // Actor::player seeds max_hp from current hp; true maximum lives on
        // the character sheet.
        self.sync_player_actor();

        self.refresh_visibility();
        info!("entered depth {depth}");
        self.emit(GameEvent::LevelChange { depth });
        Ok(())
    }

    /// Pauses the scheduler; submitted actions are dropped until resume.
    pub fn pause(&mut self) {
        if self.status == Status::Playing {
            self.status = Status::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.status == Status::Paused {
            self.status = Status::Playing;
        }
    }

    // ------------------------------------------------------------------
    // Actions & scheduling
    // ------------------------------------------------------------------

    /// Submits a player action. Applies only when the player's energy has
    /// reached 100 and the session is live; otherwise the action is dropped.
    /// A manual action always cancels travel in progress.
    pub fn submit_action(&mut self, action: Action) {
        self.travel = None;
        self.submit_internal(action);
    }

    /// Uses the inventory item at `index`: quaffs potions, reads scrolls,
    /// equips gear.
    pub fn use_inventory_item(&mut self, index: usize) {
        self.submit_action(Action::UseItem(index));
    }

    /// Drops the inventory item at `index` onto the player's tile.
    pub fn drop_item(&mut self, index: usize) {
        self.submit_action(Action::DropItem(index));
    }

    fn submit_internal(&mut self, action: Action) {
        if self.status != Status::Playing {
            return;
        }
        let energy = self
            .arena
            .get(self.player_id)
            .map(|a| a.energy)
            .unwrap_or(0);
        if energy < config::ACTION_COST {
            return;
        }

        let acted = self.resolve_action(action);
        if !acted {
            return;
        }

        if let Some(player) = self.arena.get_mut(self.player_id) {
            player.energy -= config::ACTION_COST;
        }
        self.drain_loop();
        self.settle_turn();
    }

    /// Resolves an action's effect. Returns false when the action was a
    /// no-op (blocked move, nothing to pick up) and must not cost energy.
    fn resolve_action(&mut self, action: Action) -> bool {
        match action {
            Action::Move(dir) => self.resolve_move(dir),
            Action::Wait => true,
            Action::PickUp => self.resolve_pickup(),
            Action::Descend => self.resolve_descend(),
            Action::Search => self.resolve_search(),
            Action::Cast(key) => self.resolve_cast(&key),
            Action::UseItem(index) => self.resolve_use_item(index),
            Action::DropItem(index) => self.resolve_drop_item(index),
        }
    }

    fn resolve_move(&mut self, dir: Direction) -> bool {
        let from = self.player_pos();
        let to = from.step(dir);

        if let Some(target) = self.arena.actor_at(to) {
            if target != self.player_id {
                self.player_attack(target);
                return true;
            }
        }

        match self.level.tile(to) {
            Some(Tile::DoorClosed) => {
                self.level.set_tile(to, Tile::DoorOpen);
                self.emit(GameEvent::DoorOpen { pos: to });
            }
            Some(tile) if tile.is_walkable() => {}
            _ => {
                self.log("The way is blocked.");
                return false;
            }
        }

        if let Some(player) = self.arena.get_mut(self.player_id) {
            player.pos = to;
        }
        self.after_player_entered(to);
        true
    }

    /// Tile-entry side effects: hidden traps fire here.
    fn after_player_entered(&mut self, pos: Position) {
        if self.level.tile(pos) != Some(Tile::TrapHidden) {
            return;
        }
        let Some(kind) = self.level.trap_at(pos).map(|t| t.kind) else {
            return;
        };
        self.level.reveal_trap(pos);
        self.emit(GameEvent::TrapTriggered { pos, kind });
        self.travel = None;

        match kind {
            TrapKind::Teleport => self.teleport_player("A rune flares underfoot!"),
            _ => {
                let (lo, hi) = kind.damage_range();
                let damage = self.rng.gen_range(lo..=hi).max(1);
                self.log(format!("A {} bites for {damage}!", kind.name()));
                self.damage_player(damage);
            }
        }
    }

    fn resolve_pickup(&mut self) -> bool {
        let pos = self.player_pos();
        let Some(index) = self.ground_items.iter().position(|g| g.pos == pos) else {
            self.log("There is nothing here to pick up.");
            return false;
        };
        let ground = self.ground_items.remove(index);
        let name = self.item_name(&ground.item);
        self.character.inventory.push(ground.item);
        self.emit(GameEvent::ItemPickup { name: name.clone() });
        self.emit(GameEvent::InventoryChange);
        self.log(format!("You pick up the {name}."));
        true
    }

    fn resolve_descend(&mut self) -> bool {
        let pos = self.player_pos();
        if self.level.tile(pos) != Some(Tile::Portal) {
            self.log("There are no stairs here.");
            return false;
        }
        if self.depth >= config::MAX_DEPTH {
            self.log("The portal is dark and leads nowhere deeper.");
            return false;
        }
        let next = self.depth + 1;
        // Carry current hp into the regenerated player actor.
        if self.generate_level(next).is_err() {
            self.log("The passage collapses behind you.");
        }
        true
    }

    fn resolve_search(&mut self) -> bool {
        let pos = self.player_pos();
        let mut found = false;
        for next in pos.neighbors8() {
            if self.level.discover_secret_door(next) {
                self.emit(GameEvent::SecretFound { pos: next });
                self.log("You discover a secret door!");
                found = true;
            }
            if self.level.tile(next) == Some(Tile::TrapHidden) {
                self.level.reveal_trap(next);
                self.log("You spot a trap before stepping on it.");
                found = true;
            }
        }
        if !found {
            self.log("You find nothing unusual.");
        }
        true
    }

    fn resolve_cast(&mut self, spell_key: &str) -> bool {
        let Some(class) = self.data.class(&self.character.class_key) else {
            return false;
        };
        if !class.spells.iter().any(|s| *s == spell_key) {
            self.log("You do not know that spell.");
            return false;
        }
        let Some(spell) = self.data.spell(spell_key).cloned() else {
            return false;
        };
        if !self.character.spell_ready(spell_key) {
            self.log(format!("{} is still recharging.", spell.name));
            return false;
        }
        if self.character.mp < spell.mana_cost {
            self.log("Not enough mana.");
            return false;
        }

        // Resolve the target before paying any cost, so a miss refunds
        // nothing because nothing was spent.
        let Some(target) = self.nearest_visible_monster() else {
            self.log("No target in sight.");
            return false;
        };

        self.character.mp -= spell.mana_cost;
        self.character
            .cooldowns
            .insert(spell.key.to_string(), spell.cooldown);

        let damage = (spell.power + self.character.intelligence / 2
            - self.arena.get(target).map(|a| a.defense).unwrap_or(0))
        .max(1);
        let target_name = self
            .arena
            .get(target)
            .map(|a| a.name.clone())
            .unwrap_or_default();

        self.emit(GameEvent::SpellCast {
            spell: spell.name.to_string(),
            target: Some(target_name.clone()),
            damage,
        });
        self.log(format!(
            "{} hits the {target_name} for {damage}!",
            spell.name
        ));
        self.damage_monster(target, damage);
        true
    }

    fn nearest_visible_monster(&self) -> Option<ActorId> {
        let origin = self.player_pos();
        self.arena
            .iter()
            .filter(|(id, actor)| *id != self.player_id && self.level.is_visible(actor.pos))
            .min_by_key(|(_, actor)| actor.pos.manhattan_distance(origin))
            .map(|(id, _)| id)
    }

    fn resolve_use_item(&mut self, index: usize) -> bool {
        if index >= self.character.inventory.len() {
            self.log("No such item.");
            return false;
        }
        let kind = self.character.inventory[index].kind.clone();
        match kind {
            ItemKind::Potion(potion) => {
                self.character.inventory.remove(index);
                self.quaff(potion);
                self.emit(GameEvent::InventoryChange);
                true
            }
            ItemKind::Scroll(scroll) => {
                self.character.inventory.remove(index);
                self.read_scroll(scroll);
                self.emit(GameEvent::InventoryChange);
                true
            }
            ItemKind::Equipment { slot, .. } | ItemKind::Legendary { slot, .. } => {
                self.equip(index, slot);
                true
            }
        }
    }

    /// Drinking identifies the potion type for the rest of the session.
    fn quaff(&mut self, kind: PotionKind) {
        let first_time = self.potions.identify(kind);
        self.mark_potions_identified(kind);
        if first_time {
            self.log(format!("It was a {}.", kind.true_name()));
        }

        match kind {
            PotionKind::Healing => {
                self.character.heal(20);
                self.log("You feel much better.");
            }
            PotionKind::Mana => {
                self.character.mp = (self.character.mp + 15).min(self.character.max_mp);
                self.log("Arcane energy floods back.");
            }
            PotionKind::Strength => {
                self.character.strength += 1;
                self.log("You feel stronger.");
            }
            PotionKind::Poison => {
                self.log("It burns going down!");
                self.damage_player(8);
            }
            PotionKind::Regeneration => {
                self.character.heal(12);
                self.log("Your wounds begin to close.");
            }
        }
        self.sync_player_actor();
    }

    fn read_scroll(&mut self, kind: ScrollKind) {
        match kind {
            ScrollKind::Identify => {
                let kinds: Vec<PotionKind> = self
                    .character
                    .inventory
                    .iter()
                    .filter_map(Item::potion_kind)
                    .chain(self.ground_items.iter().filter_map(|g| {
                        if self.level.is_visible(g.pos) {
                            g.item.potion_kind()
                        } else {
                            None
                        }
                    }))
                    .collect();

                let mut newly = 0;
                for kind in kinds {
                    if self.potions.identify(kind) {
                        newly += 1;
                    }
                    self.mark_potions_identified(kind);
                }
                if newly > 0 {
                    self.log(format!("Hidden natures reveal themselves ({newly} kinds)."));
                } else {
                    self.log("Nothing new is revealed.");
                }
            }
            ScrollKind::MagicMapping => {
                self.level.explore_all();
                self.emit(GameEvent::MagicMap);
                self.log("The layout of this level floods your mind.");
            }
            ScrollKind::Teleportation => {
                self.teleport_player("The world lurches sideways.");
            }
        }
    }

    /// Flips the identified flag on every held or visible ground potion of
    /// an identified kind.
    fn mark_potions_identified(&mut self, kind: PotionKind) {
        for item in &mut self.character.inventory {
            if item.potion_kind() == Some(kind) {
                item.identified = true;
            }
        }
        let level = &self.level;
        for ground in &mut self.ground_items {
            if ground.item.potion_kind() == Some(kind) && level.is_visible(ground.pos) {
                ground.item.identified = true;
            }
        }
    }

    /// Equips an inventory item, revealing its hidden bonus and enchantment.
    /// Any item already in the slot returns to the inventory.
    fn equip(&mut self, index: usize, slot: EquipSlot) {
        let mut item = self.character.inventory.remove(index);
        let first_reveal = !item.identified;
        item.identified = true;
        let name = self.item_name(&item);

        if first_reveal {
            let flavor = match item.enchant {
                crate::Enchant::Cursed => "It feels malevolent!",
                crate::Enchant::Enchanted => "It hums with power.",
                crate::Enchant::Normal => "It is unremarkable.",
            };
            self.log(format!("You equip the {name}. {flavor}"));
        } else {
            self.log(format!("You equip the {name}."));
        }

        if let Some(previous) = self.character.equipment.insert(slot, item) {
            self.character.inventory.push(previous);
        }
        self.emit(GameEvent::InventoryChange);
    }

    fn resolve_drop_item(&mut self, index: usize) -> bool {
        if index >= self.character.inventory.len() {
            self.log("No such item.");
            return false;
        }
        let item = self.character.inventory.remove(index);
        let name = self.item_name(&item);
        let pos = self.player_pos();
        self.ground_items.push(GroundItem { pos, item });
        self.emit(GameEvent::InventoryChange);
        self.log(format!("You drop the {name}."));
        true
    }

    /// Relocates the player to a random floor tile and cancels travel.
    pub(crate) fn teleport_player(&mut self, flavor: &str) {
        let floors = self.level.floor_positions();
        let occupied: Vec<Position> = self.arena.iter().map(|(_, a)| a.pos).collect();
        let candidates: Vec<Position> = floors
            .into_iter()
            .filter(|p| !occupied.contains(p))
            .collect();
        let Some(&to) = candidates.choose(&mut self.rng) else {
            return;
        };

        if let Some(player) = self.arena.get_mut(self.player_id) {
            player.pos = to;
        }
        self.travel = None;
        self.log(flavor.to_string());
        self.emit(GameEvent::Teleport { to });
        self.refresh_visibility();
    }

    // ------------------------------------------------------------------
    // Drain loop
    // ------------------------------------------------------------------

    /// Ticks the world until the player is ready again. Within one
    /// iteration the player accrues first, then each monster accrues and
    /// resolves in arena order, then cooldowns decay.
    fn drain_loop(&mut self) {
        let mut iterations = 0;
        loop {
            let ready = self
                .arena
                .get(self.player_id)
                .map(|p| p.energy >= config::ACTION_COST)
                .unwrap_or(true);
            if ready || self.status != Status::Playing {
                break;
            }
            iterations += 1;
            if iterations > config::DRAIN_LOOP_CAP {
                debug!("drain loop hit safety cap");
                break;
            }

            self.turn += 1;
            if let Some(player) = self.arena.get_mut(self.player_id) {
                player.energy += player.speed;
            }

            for id in self.arena.live_ids() {
                if id == self.player_id || self.status != Status::Playing {
                    continue;
                }
                if let Some(monster) = self.arena.get_mut(id) {
                    monster.energy += monster.speed;
                }
                while self.status == Status::Playing {
                    let Some(monster) = self.arena.get_mut(id) else {
                        break;
                    };
                    if monster.energy < config::ACTION_COST {
                        break;
                    }
                    monster.energy -= config::ACTION_COST;
                    self.ai_step(id);
                }
            }

            self.character.decay_cooldowns();
        }
    }

    /// Post-turn settlement: visibility, passive secret discovery, and the
    /// tick broadcast. Travel continuation is driven by [`Self::step_travel`]
    /// so a settled turn never re-enters the travel loop.
    fn settle_turn(&mut self) {
        self.refresh_visibility();
        self.passive_secret_reveal();
        self.emit(GameEvent::Tick { turn: self.turn });
    }

    pub(crate) fn refresh_visibility(&mut self) {
        let pos = self.player_pos();
        compute_visibility(&mut self.level, pos, config::SIGHT_RANGE);
    }

    /// Adjacent secret walls have a small chance of catching the eye.
    fn passive_secret_reveal(&mut self) {
        let pos = self.player_pos();
        for next in pos.neighbors8() {
            if self.level.tile(next) == Some(Tile::SecretWall) && self.rng.gen_bool(0.2) {
                self.level.discover_secret_door(next);
                self.emit(GameEvent::SecretFound { pos: next });
                self.log("You notice a crack in the wall - a secret door!");
            }
        }
    }

    // ------------------------------------------------------------------
    // Travel: auto-run, path-walk, auto-explore
    // ------------------------------------------------------------------

    /// Starts running in a direction until something notable interrupts.
    pub fn start_auto_run(&mut self, dx: i32, dy: i32) {
        let Some(dir) = Direction::from_delta(dx, dy) else {
            return;
        };
        self.travel = Some(Travel::AutoRun { dir });
        self.step_travel();
    }

    /// Computes a path to `(x, y)` and starts walking it, one waypoint per
    /// settled turn.
    pub fn start_path_to(&mut self, x: i32, y: i32) {
        let dst = Position::new(x, y);
        let Some(path) = bfs_path(&self.level, self.player_pos(), dst) else {
            self.log("You cannot find a way there.");
            return;
        };
        self.travel = Some(Travel::Path {
            waypoints: VecDeque::from(path),
        });
        self.step_travel();
    }

    /// Walks toward the nearest unexplored tile; reports when the dungeon
    /// is fully explored.
    pub fn auto_explore(&mut self) {
        let from = self.player_pos();
        let Some(target) = auto_explore_target(&self.level, from) else {
            self.log("The dungeon is fully explored.");
            return;
        };
        let Some(path) = bfs_path(&self.level, from, target) else {
            self.log("You cannot find a way to unexplored ground.");
            return;
        };
        self.travel = Some(Travel::Path {
            waypoints: VecDeque::from(path),
        });
        self.step_travel();
    }

    /// Consumes travel waypoints, one per settled turn, until finished or
    /// interrupted. Each step runs the full scheduler.
    fn step_travel(&mut self) {
        // The first step always runs; interrupts only stop travel once it
        // is underway, so a persistent condition (a portal already in
        // sight) cannot pin the player in place.
        let mut steps = 0u32;
        loop {
            if self.status != Status::Playing {
                self.travel = None;
                return;
            }
            let Some(travel) = &self.travel else {
                return;
            };
            if travel.finished() {
                self.travel = None;
                return;
            }

            let from = self.player_pos();
            let Some(to) = travel.next_step(from) else {
                self.travel = None;
                return;
            };

            if steps > 0 {
                if let Some(reason) = self.travel_interrupt(from, to) {
                    self.log(reason);
                    self.travel = None;
                    return;
                }
            }
            if !self.is_valid_move(to.x, to.y) && self.level.tile(to) != Some(Tile::DoorClosed) {
                self.travel = None;
                return;
            }

            let Some(dir) = Direction::from_delta(to.x - from.x, to.y - from.y) else {
                self.travel = None;
                return;
            };
            if let Some(travel) = &mut self.travel {
                travel.advance();
            }
            self.submit_internal(Action::Move(dir));
            steps += 1;

            // A trap or ability may have cancelled travel mid-step.
            if self.travel.is_none() {
                return;
            }
        }
    }

    /// The conditions that cancel auto-run and path-walk.
    fn travel_interrupt(&self, from: Position, to: Position) -> Option<&'static str> {
        let monster_visible = self
            .arena
            .iter()
            .any(|(id, actor)| id != self.player_id && self.level.is_visible(actor.pos));
        if monster_visible {
            return Some("You stop: something is nearby.");
        }
        if self
            .ground_items
            .iter()
            .any(|g| g.pos == from || g.pos == to)
        {
            return Some("You stop: something lies here.");
        }
        if matches!(
            self.level.tile(to),
            Some(Tile::DoorClosed) | Some(Tile::DoorOpen)
        ) {
            return Some("You stop at the door.");
        }
        if is_intersection(&self.level, from) {
            return Some("You stop at the crossing.");
        }
        let portal_visible = (0..self.level.height as i32).any(|y| {
            (0..self.level.width as i32).any(|x| {
                let pos = Position::new(x, y);
                self.level.tile(pos) == Some(Tile::Portal) && self.level.is_visible(pos)
            })
        });
        if portal_visible {
            return Some("You stop: stairs in sight.");
        }
        None
    }

    // ------------------------------------------------------------------
    // Damage plumbing shared with combat
    // ------------------------------------------------------------------

    /// Applies damage to the player, flipping to the terminal `Dead` state
    /// at zero hp.
    pub(crate) fn damage_player(&mut self, amount: i32) {
        self.character.take_damage(amount);
        self.sync_player_actor();
        if self.character.hp <= 0 && self.status == Status::Playing {
            self.status = Status::Dead;
            info!("player died at depth {}", self.depth);
            self.log("You die...");
            self.emit(GameEvent::GameOver {
                status: Status::Dead,
            });
        }
    }

    /// Mirrors character hp/speed onto the player's arena actor so the
    /// snapshot stays coherent.
    pub(crate) fn sync_player_actor(&mut self) {
        let (hp, max_hp, speed) = (
            self.character.hp,
            self.character.max_hp,
            self.character.speed,
        );
        if let Some(player) = self.arena.get_mut(self.player_id) {
            player.hp = hp;
            player.max_hp = max_hp;
            player.speed = speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PotionKind, ScrollKind};
    use crate::game::Item;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn quiet_game(seed: u64) -> Game {
        let mut config = GenerationConfig::for_testing();
        config.base_monster_count = 0;
        config.base_item_count = 0;
        Game::new(config, "human", "warrior", seed).expect("game should build")
    }

    fn captured_logs(game: &mut Game) -> Rc<RefCell<Vec<String>>> {
        let logs = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&logs);
        game.subscribe(Box::new(move |event| {
            if let GameEvent::Log { text } = event {
                sink.borrow_mut().push(text.clone());
            }
        }));
        logs
    }

    #[test]
    fn test_new_game_invariants() {
        let game = quiet_game(1);
        assert_eq!(game.status(), Status::Playing);
        assert_eq!(game.depth(), 1);
        assert_eq!(game.turn(), 0);
        let pos = game.player_pos();
        assert!(game.level().is_walkable(pos));
        assert!(game.level().is_visible(pos));
    }

    #[test]
    fn test_wait_advances_turn() {
        let mut game = quiet_game(2);
        for _ in 0..10 {
            game.submit_action(Action::Wait);
        }
        // Baseline speed regains a full action in exactly one tick.
        assert_eq!(game.turn(), 10);
    }

    #[test]
    fn test_blocked_move_costs_nothing() {
        let mut game = quiet_game(3);
        let pos = game.player_pos();
        // Wall the player in completely.
        for next in pos.neighbors8() {
            game.level.set_tile(next, Tile::Wall);
        }
        for dir in Direction::all() {
            game.submit_action(Action::Move(dir));
        }
        assert_eq!(game.turn(), 0);
    }

    #[test]
    fn test_pickup_and_drop() {
        let mut game = quiet_game(4);
        let pos = game.player_pos();
        game.ground_items.push(GroundItem {
            pos,
            item: Item::scroll(ScrollKind::MagicMapping),
        });

        game.submit_action(Action::PickUp);
        assert_eq!(game.character().inventory.len(), 1);
        assert!(game.ground_items().is_empty());

        game.submit_action(Action::DropItem(0));
        assert!(game.character().inventory.is_empty());
        assert_eq!(game.ground_items().len(), 1);
        assert_eq!(game.ground_items()[0].pos, game.player_pos());
    }

    #[test]
    fn test_pickup_on_empty_tile_is_free() {
        let mut game = quiet_game(5);
        game.submit_action(Action::PickUp);
        assert_eq!(game.turn(), 0);
    }

    #[test]
    fn test_quaff_identifies_kind() {
        let mut game = quiet_game(6);
        game.character.take_damage(10);
        game.character.inventory.push(Item::potion(PotionKind::Healing));
        let hp_before = game.character().hp;

        game.submit_action(Action::UseItem(0));

        assert!(game.potions().is_identified(PotionKind::Healing));
        assert!(game.character().hp > hp_before);
        assert!(game.character().inventory.is_empty());
    }

    #[test]
    fn test_identify_scroll_reveals_held_potions() {
        let mut game = quiet_game(7);
        for _ in 0..3 {
            game.character.inventory.push(Item::potion(PotionKind::Poison));
        }
        game.character
            .inventory
            .push(Item::scroll(ScrollKind::Identify));

        let obfuscated = game.item_name(&game.character().inventory[0]);
        assert!(!obfuscated.contains("poison"));

        game.submit_action(Action::UseItem(3));

        assert!(game.potions().is_identified(PotionKind::Poison));
        for item in &game.character().inventory {
            assert!(item.identified);
            assert_eq!(game.item_name(item), "potion of poison");
        }
    }

    #[test]
    fn test_second_identify_scroll_reveals_nothing_new() {
        let mut game = quiet_game(14);
        game.character.inventory.push(Item::potion(PotionKind::Mana));
        for _ in 0..2 {
            game.character
                .inventory
                .push(Item::scroll(ScrollKind::Identify));
        }

        game.use_inventory_item(1);
        assert!(game.potions().is_identified(PotionKind::Mana));

        let logs = captured_logs(&mut game);
        game.use_inventory_item(1);
        assert!(logs
            .borrow()
            .iter()
            .any(|l| l.contains("Nothing new is revealed")));

        // Only the consumed scroll and the turn counter differ.
        assert_eq!(game.character().inventory.len(), 1);
        assert!(game.potions().is_identified(PotionKind::Mana));
    }

    #[test]
    fn test_slow_player_waits_longer_between_actions() {
        let mut game = quiet_game(15);
        game.character.speed = 10;
        game.sync_player_actor();

        // Accruing 10 energy per tick means 10 ticks to bank one action.
        game.submit_action(Action::Wait);
        assert_eq!(game.turn(), 10);
        game.submit_action(Action::Wait);
        assert_eq!(game.turn(), 20);
    }

    #[test]
    fn test_equip_reveals_and_swaps() {
        let mut game = quiet_game(8);
        let sword = Item {
            kind: ItemKind::Equipment {
                key: "shortsword".to_string(),
                slot: EquipSlot::Weapon,
            },
            base_name: "Shortsword".to_string(),
            identified: false,
            bonus: 2,
            enchant: crate::Enchant::Normal,
        };
        let axe = Item {
            kind: ItemKind::Equipment {
                key: "battleaxe".to_string(),
                slot: EquipSlot::Weapon,
            },
            base_name: "Battleaxe".to_string(),
            identified: false,
            bonus: 4,
            enchant: crate::Enchant::Normal,
        };
        game.character.inventory.push(sword);
        game.character.inventory.push(axe);

        game.submit_action(Action::UseItem(0));
        assert!(game.character().equipment.contains_key(&EquipSlot::Weapon));
        assert_eq!(game.character().inventory.len(), 1);

        // Equipping the axe returns the sword to the inventory.
        game.submit_action(Action::UseItem(0));
        assert_eq!(game.character().inventory.len(), 1);
        let returned = &game.character().inventory[0];
        assert_eq!(returned.base_name, "Shortsword");
        assert!(returned.identified);
    }

    #[test]
    fn test_descend_through_portal() {
        let mut game = quiet_game(9);
        let pos = game.player_pos();
        game.level.set_tile(pos, Tile::Portal);

        game.submit_action(Action::Descend);
        assert_eq!(game.depth(), 2);
        // The new spawn position belongs to the new level.
        assert!(game.level().is_walkable(game.player_pos()));
    }

    #[test]
    fn test_wounded_descent_keeps_max_hp() {
        let mut game = quiet_game(16);
        game.character.take_damage(10);
        let pos = game.player_pos();
        game.level.set_tile(pos, Tile::Portal);

        game.submit_action(Action::Descend);
        assert_eq!(game.depth(), 2);

        let actor = game.arena.get(game.player_id()).expect("player exists");
        assert_eq!(actor.hp, game.character().hp);
        assert_eq!(actor.max_hp, game.character().max_hp);
        assert!(actor.hp < actor.max_hp);
    }

    #[test]
    fn test_descend_without_portal_is_free() {
        let mut game = quiet_game(10);
        let mut logs_seen = false;
        let pos = game.player_pos();
        if game.level.tile(pos) != Some(Tile::Portal) {
            let logs = captured_logs(&mut game);
            game.submit_action(Action::Descend);
            logs_seen = logs.borrow().iter().any(|l| l.contains("no stairs"));
            assert_eq!(game.depth(), 1);
            assert_eq!(game.turn(), 0);
        }
        assert!(logs_seen);
    }

    #[test]
    fn test_paused_game_drops_actions() {
        let mut game = quiet_game(11);
        game.pause();
        game.submit_action(Action::Wait);
        assert_eq!(game.turn(), 0);
        game.resume();
        game.submit_action(Action::Wait);
        assert_eq!(game.turn(), 1);
    }

    #[test]
    fn test_auto_explore_reports_completion() {
        let mut game = quiet_game(12);
        let logs = captured_logs(&mut game);

        // Bounded walk; a fully revealed test level takes far fewer calls.
        for _ in 0..3000 {
            game.auto_explore();
            if logs
                .borrow()
                .iter()
                .any(|l| l.contains("fully explored"))
            {
                break;
            }
        }
        assert!(logs.borrow().iter().any(|l| l.contains("fully explored")));
    }

    #[test]
    fn test_cast_without_target_is_free() {
        let mut config = GenerationConfig::for_testing();
        config.base_monster_count = 0;
        config.base_item_count = 0;
        let mut game = Game::new(config, "human", "mage", 13).expect("game should build");
        game.submit_action(Action::Cast("firebolt".to_string()));
        assert_eq!(game.turn(), 0);
        assert_eq!(game.character().mp, game.character().max_mp);
    }

    #[test]
    fn test_snapshot_serializes() {
        let game = quiet_game(14);
        let json = game.snapshot_json().expect("snapshot should serialize");
        assert!(json.contains("\"depth\":1"));
    }
}
