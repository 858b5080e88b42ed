//! BonusEngine - The entry point the host calls into
//!
//! Owns the blueprint arena, the active bonus registry and the live config,
//! and wires the host's hooks to them:
//! - creation events attach and apply a bonus
//! - load events re-apply a deserialized bonus
//! - release/destroy events unload it
//! - factor edits rescale every live bonused blueprint in one sweep

use crate::bonus::{ActiveBonusRegistry, BonusComponent, BonusContext};
use crate::config::{ConfigChange, CookingSettings, ListenerId, LiveConfig, SettingKey};
use crate::happy::HappyBuff;
use crate::item::{BlueprintId, BlueprintStore, Extension, ItemInstance, StatBlueprint};
use crate::progression::{SkillProgression, SkillRaise};
use crate::types::StatChannel;
use rand::Rng;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Bonus lifecycle and live rescaling for a set of items
#[derive(Debug, Default)]
pub struct BonusEngine {
    config: LiveConfig,
    blueprints: BlueprintStore,
    registry: ActiveBonusRegistry,
    /// Factor edits requested while a sweep was running
    queued: VecDeque<(StatChannel, f64)>,
}

impl BonusEngine {
    /// Create an engine with the given settings
    pub fn new(settings: &CookingSettings) -> Self {
        BonusEngine {
            config: LiveConfig::from_settings(settings),
            blueprints: BlueprintStore::new(),
            registry: ActiveBonusRegistry::new(),
            queued: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    pub fn blueprints(&self) -> &BlueprintStore {
        &self.blueprints
    }

    pub fn registry(&self) -> &ActiveBonusRegistry {
        &self.registry
    }

    /// Register a pristine item blueprint that stack entries may share
    pub fn register_blueprint(&mut self, stats: StatBlueprint) -> BlueprintId {
        self.blueprints.insert_shared(stats)
    }

    /// Stats an item currently uses
    pub fn stats(&self, item: &ItemInstance) -> Option<&StatBlueprint> {
        self.blueprints.get(item.blueprint)
    }

    /// Subscribe to config changes (delivered after any rescale sweep)
    pub fn subscribe(&mut self, listener: impl FnMut(&ConfigChange) + 'static) -> ListenerId {
        self.config.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.config.unsubscribe(id)
    }

    /// Borrow the parts a component needs for apply/unload
    pub fn context(&mut self) -> BonusContext<'_> {
        BonusContext {
            store: &mut self.blueprints,
            registry: &mut self.registry,
            config: &self.config,
        }
    }

    /// Creation event: a cook finished `item`
    ///
    /// Only food (health and stamina above zero) gets a bonus. The bonus
    /// level comes from the cook's current skill, the component is attached
    /// and applied, and a skill raise is sent to the cook. Returns the
    /// attached component.
    pub fn on_item_created(
        &mut self,
        item: &mut ItemInstance,
        cook: &mut impl SkillProgression,
        rng: &mut impl Rng,
    ) -> Option<BonusComponent> {
        let is_food = self.stats(item).is_some_and(StatBlueprint::is_food);
        if !is_food || item.bonus().is_some() {
            return None;
        }

        let component = self.attach_bonus(item, cook.skill_factor(), rng);
        cook.raise_skill(SkillRaise {
            amount: f64::from(self.config.skill_raise_per_cook()),
            gain_factor: self.config.experience_gain_factor(),
        });
        info!(
            item = %item.id,
            name = %item.name,
            level = component.level(),
            perfect = component.is_perfect(),
            "cooked item"
        );
        Some(component)
    }

    /// Attach a bonus for `skill_factor` to `item` and apply it
    pub fn attach_bonus(
        &mut self,
        item: &mut ItemInstance,
        skill_factor: f64,
        rng: &mut impl Rng,
    ) -> BonusComponent {
        let component =
            BonusComponent::attach(skill_factor, self.config.happy_required_level(), rng);
        item.extended_mut().push(Extension::CookingBonus(component.clone()));
        self.apply_item(item);
        component
    }

    /// Apply the item's bonus component, if any
    ///
    /// Call once after creation and once after deserialization. Returns true
    /// if the blueprint changed.
    pub fn apply_item(&mut self, item: &mut ItemInstance) -> bool {
        let ItemInstance {
            id,
            blueprint,
            extended,
            ..
        } = item;
        let Some(component) = extended.as_mut().and_then(|data| data.bonus_mut()) else {
            return false;
        };
        component.apply(&mut self.context(), *id, blueprint)
    }

    /// Load event: the item was just deserialized with its extension state
    pub fn on_item_loaded(&mut self, item: &mut ItemInstance) -> bool {
        self.apply_item(item)
    }

    /// Remove the item's bonus from its blueprint and the registry
    pub fn unload_item(&mut self, item: &mut ItemInstance) -> bool {
        let ItemInstance {
            id,
            blueprint,
            extended,
            ..
        } = item;
        let Some(component) = extended.as_mut().and_then(|data| data.bonus_mut()) else {
            return false;
        };
        component.unload(&mut self.context(), *id, blueprint)
    }

    /// Destruction event: unload, then free the item's private blueprint
    pub fn destroy_item(&mut self, mut item: ItemInstance) {
        self.unload_item(&mut item);
        if self.blueprints.release(item.blueprint, item.id).is_some() {
            debug!(item = %item.id, blueprint = item.blueprint.0, "released blueprint");
        }
    }

    /// Buff granted for eating `item`, if it was cooked perfectly
    pub fn on_item_eaten(&self, item: &ItemInstance, eaten: bool) -> Option<HappyBuff> {
        HappyBuff::on_eat(item, eaten, &self.config)
    }

    /// Change a channel factor and rescale every live bonus to it
    pub fn set_factor(&mut self, channel: StatChannel, value: f64) -> Option<ConfigChange> {
        self.set_factor_with(channel, value, |_, _| {})
    }

    /// [`set_factor`](Self::set_factor), calling `on_rescaled` after each
    /// blueprint is rescaled
    ///
    /// The callback may apply or unload items, or request further factor
    /// edits. Edits requested during a sweep run after it, in order.
    /// Returns the change, or `None` if the value was unchanged after
    /// clamping or the edit was queued behind a running sweep.
    pub fn set_factor_with<F>(
        &mut self,
        channel: StatChannel,
        value: f64,
        mut on_rescaled: F,
    ) -> Option<ConfigChange>
    where
        F: FnMut(&mut BonusEngine, BlueprintId),
    {
        if self.registry.sweeping().is_some() {
            debug!(%channel, value, "factor edit queued behind running sweep");
            self.queued.push_back((channel, value));
            return None;
        }

        let change = self.sweep_factor(channel, value, &mut on_rescaled);
        while let Some((channel, value)) = self.queued.pop_front() {
            self.sweep_factor(channel, value, &mut on_rescaled);
        }
        change
    }

    fn sweep_factor<F>(
        &mut self,
        channel: StatChannel,
        value: f64,
        on_rescaled: &mut F,
    ) -> Option<ConfigChange>
    where
        F: FnMut(&mut BonusEngine, BlueprintId),
    {
        let (old, new) = self.config.begin_factor_change(channel, value)?;
        let keys = self.registry.begin_sweep(channel);
        let mut rescaled = 0;
        for id in keys {
            if self.registry.rescale_one(&mut self.blueprints, id, old, new) {
                rescaled += 1;
                on_rescaled(self, id);
            }
        }
        self.registry.end_sweep();
        info!(%channel, old, new, rescaled, "factor changed");
        self.config.finish_factor_change(channel)
    }

    /// Change any setting by key
    pub fn set(&mut self, key: SettingKey, value: f64) -> Option<ConfigChange> {
        match key {
            SettingKey::Factor(channel) => self.set_factor(channel, value),
            SettingKey::HappyRequiredLevel => {
                self.config.set_happy_required_level(setting_to_u32(value))
            }
            SettingKey::HappyBuffDuration => {
                self.config.set_buff_duration_minutes(setting_to_u32(value))
            }
            SettingKey::HappyBuffStrength => self.config.set_buff_strength(value),
            SettingKey::ExperienceGainFactor => self.config.set_experience_gain_factor(value),
            SettingKey::SkillRaisePerCook => {
                self.config.set_skill_raise_per_cook(setting_to_u32(value))
            }
        }
    }

    /// Bring live settings in line with a freshly loaded file
    ///
    /// Issues one change per differing value; factor changes rescale.
    pub fn reload(&mut self, settings: &CookingSettings) -> Vec<ConfigChange> {
        let settings = settings.clone().clamped();
        let mut changes = Vec::new();
        for channel in StatChannel::all() {
            changes.extend(self.set_factor(*channel, settings.factors.get(*channel)));
        }
        changes.extend(
            self.config
                .set_happy_required_level(settings.happy.required_level),
        );
        changes.extend(
            self.config
                .set_buff_duration_minutes(settings.happy.buff_duration_minutes),
        );
        changes.extend(self.config.set_buff_strength(settings.happy.buff_strength));
        changes.extend(
            self.config
                .set_experience_gain_factor(settings.progression.experience_gain_factor),
        );
        changes.extend(
            self.config
                .set_skill_raise_per_cook(settings.progression.skill_raise_per_cook),
        );
        changes
    }
}

fn setting_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        0
    } else {
        value.round() as u32
    }
}
