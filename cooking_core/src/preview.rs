//! Crafting preview - what cooking at the current skill would add

use crate::bonus::quantize_level;
use crate::config::LiveConfig;
use crate::item::StatBlueprint;
use crate::types::StatChannel;
use std::collections::BTreeMap;

/// Bonus a cook would add to a base blueprint
#[derive(Debug, Clone, PartialEq)]
pub struct BonusPreview {
    pub level: u32,
    /// Rounded absolute gain per present channel
    pub gains: BTreeMap<StatChannel, f64>,
}

/// Preview the bonus of cooking `blueprint` at `skill_factor`
///
/// `None` for non-food and for skills that round to level 0.
pub fn bonus_preview(
    blueprint: &StatBlueprint,
    skill_factor: f64,
    config: &LiveConfig,
) -> Option<BonusPreview> {
    if !blueprint.is_food() {
        return None;
    }
    let level = quantize_level(skill_factor);
    if level == 0 {
        return None;
    }

    let skill = f64::from(level) / 100.0;
    let gains = StatChannel::all()
        .iter()
        .filter(|channel| blueprint.has_channel(**channel))
        .map(|channel| {
            let gain = skill * blueprint.get(*channel) * (config.factor(*channel) - 1.0);
            (*channel, gain.round())
        })
        .collect();

    Some(BonusPreview { level, gains })
}
