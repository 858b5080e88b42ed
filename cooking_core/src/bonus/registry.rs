//! ActiveBonusRegistry - Which blueprints currently carry which bonus level

use crate::item::{BlueprintId, BlueprintStore};
use crate::types::StatChannel;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Multiplier a bonus of `level` applies with channel factor `factor`
///
/// `1 + level * (factor - 1) / 100`: level 0 is neutral, level 100 applies
/// the full factor.
pub fn bonus_multiplier(level: u32, factor: f64) -> f64 {
    1.0 + level as f64 * (factor - 1.0) / 100.0
}

/// Ratio that moves a value bonused with `old` to the same level under `new`
pub fn rescale_ratio(level: u32, old: f64, new: f64) -> f64 {
    bonus_multiplier(level, new) / bonus_multiplier(level, old)
}

#[derive(Debug, Clone)]
struct SweepState {
    channel: StatChannel,
    /// Blueprints the sweep has not reached yet
    pending: BTreeSet<BlueprintId>,
}

/// Mapping from live blueprint to its applied bonus level
///
/// A blueprint is listed exactly while a component has a non-zero bonus
/// applied to it, so a factor change only has to visit live items.
#[derive(Debug, Clone, Default)]
pub struct ActiveBonusRegistry {
    active: BTreeMap<BlueprintId, u32>,
    sweep: Option<SweepState>,
}

impl ActiveBonusRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        ActiveBonusRegistry {
            active: BTreeMap::new(),
            sweep: None,
        }
    }

    /// Record that `id` carries a bonus of `level`
    pub fn register(&mut self, id: BlueprintId, level: u32) {
        self.active.insert(id, level);
    }

    /// Forget `id`, returning its level if it was registered
    pub fn deregister(&mut self, id: BlueprintId) -> Option<u32> {
        if let Some(sweep) = self.sweep.as_mut() {
            sweep.pending.remove(&id);
        }
        self.active.remove(&id)
    }

    /// Applied level of a blueprint
    pub fn level_of(&self, id: BlueprintId) -> Option<u32> {
        self.active.get(&id).copied()
    }

    pub fn contains(&self, id: BlueprintId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Iterate registered blueprints and levels in id order
    pub fn iter(&self) -> impl Iterator<Item = (BlueprintId, u32)> + '_ {
        self.active.iter().map(|(id, level)| (*id, *level))
    }

    /// Copy of the current entries, safe to hold while mutating the registry
    pub fn snapshot(&self) -> Vec<(BlueprintId, u32)> {
        self.iter().collect()
    }

    /// Channel of the sweep in progress, if any
    pub fn sweeping(&self) -> Option<StatChannel> {
        self.sweep.as_ref().map(|sweep| sweep.channel)
    }

    /// Whether `id` still carries the pre-edit factor for `channel`
    pub fn is_pending(&self, id: BlueprintId, channel: StatChannel) -> bool {
        self.sweep
            .as_ref()
            .is_some_and(|sweep| sweep.channel == channel && sweep.pending.contains(&id))
    }

    /// Start a sweep over `channel`, returning the key set to visit
    pub(crate) fn begin_sweep(&mut self, channel: StatChannel) -> Vec<BlueprintId> {
        let keys: Vec<BlueprintId> = self.active.keys().copied().collect();
        debug!(%channel, blueprints = keys.len(), "rescale sweep started");
        self.sweep = Some(SweepState {
            channel,
            pending: keys.iter().copied().collect(),
        });
        keys
    }

    /// Rescale one blueprint of the running sweep from `old` to `new`
    ///
    /// Returns false when the blueprint left the registry (or was already
    /// visited) since the sweep started.
    pub(crate) fn rescale_one(
        &mut self,
        store: &mut BlueprintStore,
        id: BlueprintId,
        old: f64,
        new: f64,
    ) -> bool {
        let Some(sweep) = self.sweep.as_mut() else {
            return false;
        };
        if !sweep.pending.remove(&id) {
            return false;
        }
        let channel = sweep.channel;
        let Some(level) = self.active.get(&id).copied() else {
            return false;
        };
        let Some(stats) = store.get_any_owned_mut(id) else {
            return false;
        };
        let ratio = rescale_ratio(level, old, new);
        stats.scale(channel, ratio);
        trace!(blueprint = id.0, level, %channel, ratio, "rescaled blueprint");
        true
    }

    /// Close the running sweep
    pub(crate) fn end_sweep(&mut self) {
        if let Some(sweep) = self.sweep.take() {
            debug!(channel = %sweep.channel, "rescale sweep finished");
        }
    }

    /// Rescale every registered blueprint's `channel` from `old` to `new`
    ///
    /// Returns the number of blueprints rescaled.
    pub fn rescale_all(
        &mut self,
        store: &mut BlueprintStore,
        channel: StatChannel,
        old: f64,
        new: f64,
    ) -> usize {
        let keys = self.begin_sweep(channel);
        let rescaled = keys
            .into_iter()
            .filter(|id| self.rescale_one(store, *id, old, new))
            .count();
        self.end_sweep();
        rescaled
    }
}
