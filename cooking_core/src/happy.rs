//! Happy buff - movement speed bonus from eating a perfectly cooked meal

use crate::config::LiveConfig;
use crate::item::ItemInstance;

/// Name of the status effect granted by perfect food
pub const HAPPY_EFFECT_NAME: &str = "Happy";

/// A happy buff on an entity
#[derive(Debug, Clone, PartialEq)]
pub struct HappyBuff {
    /// Total duration in seconds
    pub duration: f64,
    /// Time remaining in seconds
    pub duration_remaining: f64,
    /// Movement speed multiplier while active
    pub speed_factor: f64,
}

impl HappyBuff {
    /// Create a fresh buff with the current live settings
    pub fn from_config(config: &LiveConfig) -> Self {
        let duration = f64::from(config.buff_duration_minutes()) * 60.0;
        HappyBuff {
            duration,
            duration_remaining: duration,
            speed_factor: config.buff_strength(),
        }
    }

    /// Buff granted for eating `item`, if it was cooked perfectly
    ///
    /// `eaten` is whether the host actually consumed the item.
    pub fn on_eat(item: &ItemInstance, eaten: bool, config: &LiveConfig) -> Option<Self> {
        (eaten && item.is_perfect()).then(|| HappyBuff::from_config(config))
    }

    /// Apply the buff to a movement speed
    pub fn modify_speed(&self, speed: f64) -> f64 {
        if self.is_active() {
            speed * self.speed_factor
        } else {
            speed
        }
    }

    /// Speed increase as a percentage, e.g. 10 for a 1.1 factor
    pub fn speed_bonus_percent(&self) -> f64 {
        (self.speed_factor - 1.0) * 100.0
    }

    /// Tick the buff duration
    /// Returns true if the buff is still active
    pub fn tick(&mut self, delta: f64) -> bool {
        self.duration_remaining -= delta;
        self.is_active()
    }

    pub fn is_active(&self) -> bool {
        self.duration_remaining > 0.0
    }

    /// Restart the duration, e.g. when another perfect meal is eaten
    pub fn refresh(&mut self, config: &LiveConfig) {
        *self = HappyBuff::from_config(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::BonusComponent;
    use crate::item::{BlueprintId, Extension};
    use crate::types::ItemId;

    fn stew(perfect: bool) -> ItemInstance {
        ItemInstance::new(ItemId(1), "stew", BlueprintId(0))
            .with_extension(Extension::CookingBonus(BonusComponent::new(80, perfect)))
    }

    #[test]
    fn test_only_perfect_eaten_food_grants_buff() {
        let config = LiveConfig::default();
        assert!(HappyBuff::on_eat(&stew(true), true, &config).is_some());
        assert!(HappyBuff::on_eat(&stew(true), false, &config).is_none());
        assert!(HappyBuff::on_eat(&stew(false), true, &config).is_none());
        let plain = ItemInstance::new(ItemId(2), "stew", BlueprintId(0));
        assert!(HappyBuff::on_eat(&plain, true, &config).is_none());
    }

    #[test]
    fn test_buff_values_follow_config() {
        let mut config = LiveConfig::default();
        let buff = HappyBuff::from_config(&config);
        assert!((buff.duration - 180.0).abs() < f64::EPSILON);
        assert!((buff.speed_bonus_percent() - 10.0).abs() < 1e-9);

        config.set_buff_duration_minutes(10);
        config.set_buff_strength(1.5);
        let buff = HappyBuff::from_config(&config);
        assert!((buff.duration - 600.0).abs() < f64::EPSILON);
        assert!((buff.modify_speed(4.0) - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_buff_tick_and_refresh() {
        let config = LiveConfig::default();
        let mut buff = HappyBuff::from_config(&config);
        assert!(buff.tick(100.0));
        assert!(!buff.tick(100.0));
        assert!((buff.modify_speed(5.0) - 5.0).abs() < f64::EPSILON);

        buff.refresh(&config);
        assert!(buff.is_active());
        assert!((buff.duration_remaining - 180.0).abs() < f64::EPSILON);
    }
}
