//! StatBlueprint - Base food stats, shared between identical stack entries

use crate::types::{ItemId, StatChannel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// The numeric stat block a stack of identical items points to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatBlueprint {
    /// Health restored on eating
    pub food: f64,
    /// Stamina restored on eating
    pub food_stamina: f64,
    /// Health regeneration per tick while digesting
    pub food_regen: f64,
    /// Secondary resource restored on eating, absent on most foods
    #[serde(default)]
    pub food_eitr: Option<f64>,
}

impl StatBlueprint {
    /// Create a blueprint without a secondary resource
    pub fn new(food: f64, food_stamina: f64, food_regen: f64) -> Self {
        StatBlueprint {
            food,
            food_stamina,
            food_regen,
            food_eitr: None,
        }
    }

    /// Add a secondary resource value
    pub fn with_eitr(mut self, eitr: f64) -> Self {
        self.food_eitr = Some(eitr);
        self
    }

    /// Whether this blueprint describes something edible that cooking improves
    pub fn is_food(&self) -> bool {
        self.food > 0.0 && self.food_stamina > 0.0
    }

    /// Value of a channel (0 for an absent secondary resource)
    pub fn get(&self, channel: StatChannel) -> f64 {
        match channel {
            StatChannel::Health => self.food,
            StatChannel::Stamina => self.food_stamina,
            StatChannel::Regen => self.food_regen,
            StatChannel::Eitr => self.food_eitr.unwrap_or(0.0),
        }
    }

    /// Mutable access to a channel, `None` when the channel is absent
    pub fn get_mut(&mut self, channel: StatChannel) -> Option<&mut f64> {
        match channel {
            StatChannel::Health => Some(&mut self.food),
            StatChannel::Stamina => Some(&mut self.food_stamina),
            StatChannel::Regen => Some(&mut self.food_regen),
            StatChannel::Eitr => self.food_eitr.as_mut(),
        }
    }

    /// Whether a channel is present with a positive base value
    pub fn has_channel(&self, channel: StatChannel) -> bool {
        self.get(channel) > 0.0
    }

    /// Multiply a channel in place if it is present and positive
    pub fn scale(&mut self, channel: StatChannel, factor: f64) -> bool {
        match self.get_mut(channel) {
            Some(value) if *value > 0.0 => {
                *value *= factor;
                true
            }
            _ => false,
        }
    }
}

/// Stable identity of a blueprint inside a [`BlueprintStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlueprintId(pub u64);

/// Who may mutate a stored blueprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Ownership {
    /// Referenced by any number of items, never mutated in place
    Shared,
    /// Private copy of exactly one item instance
    Owned { item: ItemId },
}

#[derive(Debug, Clone)]
struct BlueprintEntry {
    stats: StatBlueprint,
    ownership: Ownership,
}

/// Arena of blueprints addressed by [`BlueprintId`]
///
/// Shared entries are read-only. The only way to obtain mutable stats is
/// through an entry owned by a specific item, which [`make_exclusive`]
/// creates by cloning on first use.
///
/// [`make_exclusive`]: BlueprintStore::make_exclusive
#[derive(Debug, Clone, Default)]
pub struct BlueprintStore {
    entries: HashMap<BlueprintId, BlueprintEntry>,
    next_id: u64,
}

impl BlueprintStore {
    /// Create an empty store
    pub fn new() -> Self {
        BlueprintStore {
            entries: HashMap::new(),
            next_id: 0,
        }
    }

    fn insert(&mut self, stats: StatBlueprint, ownership: Ownership) -> BlueprintId {
        let id = BlueprintId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, BlueprintEntry { stats, ownership });
        id
    }

    /// Register a pristine blueprint that items may share
    pub fn insert_shared(&mut self, stats: StatBlueprint) -> BlueprintId {
        self.insert(stats, Ownership::Shared)
    }

    /// Read a blueprint
    pub fn get(&self, id: BlueprintId) -> Option<&StatBlueprint> {
        self.entries.get(&id).map(|entry| &entry.stats)
    }

    /// Ownership tag of a blueprint
    pub fn ownership(&self, id: BlueprintId) -> Option<Ownership> {
        self.entries.get(&id).map(|entry| entry.ownership)
    }

    /// Whether `id` is exclusively owned by `item`
    pub fn is_owned_by(&self, id: BlueprintId, item: ItemId) -> bool {
        self.ownership(id) == Some(Ownership::Owned { item })
    }

    /// Return a blueprint `item` exclusively owns with the same stats as `id`
    ///
    /// Returns `id` itself when it already belongs to `item`; otherwise the
    /// stats are cloned into a new owned entry. `None` if `id` is unknown.
    pub fn make_exclusive(&mut self, id: BlueprintId, item: ItemId) -> Option<BlueprintId> {
        let entry = self.entries.get(&id)?;
        if entry.ownership == (Ownership::Owned { item }) {
            return Some(id);
        }
        let stats = entry.stats.clone();
        let cloned = self.insert(stats, Ownership::Owned { item });
        debug!(from = id.0, to = cloned.0, %item, "cloned blueprint for exclusive use");
        Some(cloned)
    }

    /// Mutable stats of a blueprint owned by `item`
    pub fn get_owned_mut(&mut self, id: BlueprintId, item: ItemId) -> Option<&mut StatBlueprint> {
        match self.entries.get_mut(&id) {
            Some(entry) if entry.ownership == (Ownership::Owned { item }) => Some(&mut entry.stats),
            _ => None,
        }
    }

    /// Mutable stats of any owned blueprint, used by the rescale sweep
    pub(crate) fn get_any_owned_mut(&mut self, id: BlueprintId) -> Option<&mut StatBlueprint> {
        match self.entries.get_mut(&id) {
            Some(entry) if matches!(entry.ownership, Ownership::Owned { .. }) => {
                Some(&mut entry.stats)
            }
            _ => None,
        }
    }

    /// Drop a blueprint owned by `item`; shared blueprints are never removed
    pub fn release(&mut self, id: BlueprintId, item: ItemId) -> Option<StatBlueprint> {
        if !self.is_owned_by(id, item) {
            return None;
        }
        self.entries.remove(&id).map(|entry| entry.stats)
    }

    /// Number of stored blueprints
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no blueprints
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
