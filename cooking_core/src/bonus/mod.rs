//! Skill-derived bonuses on item blueprints

mod component;
mod registry;

pub use component::{quantize_level, BonusComponent, LEVEL_STEP, MAX_LEVEL};
pub use registry::{bonus_multiplier, rescale_ratio, ActiveBonusRegistry};

use crate::config::LiveConfig;
use crate::item::{BlueprintId, BlueprintStore};
use crate::types::StatChannel;

/// Everything a [`BonusComponent`] needs to apply or remove its bonus
pub struct BonusContext<'a> {
    pub store: &'a mut BlueprintStore,
    pub registry: &'a mut ActiveBonusRegistry,
    pub config: &'a LiveConfig,
}

impl BonusContext<'_> {
    /// Factor that is currently baked into `blueprint` for `channel`
    ///
    /// While a sweep over `channel` has not reached `blueprint` yet, that is
    /// still the previous factor.
    pub fn factor_for(&self, channel: StatChannel, blueprint: BlueprintId) -> f64 {
        if self.registry.is_pending(blueprint, channel) {
            if let Some(previous) = self.config.previous_factor(channel) {
                return previous;
            }
        }
        self.config.factor(channel)
    }
}
