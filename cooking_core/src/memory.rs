//! FoodBonusMemory - Keeps the bonus of meals still being digested across save/load
//!
//! A player's active foods are saved as plain items, without their extension
//! state. The memory records each food's bonus level by name on save and
//! re-attaches it on load.

use crate::bonus::BonusComponent;
use crate::engine::BonusEngine;
use crate::item::{Extension, ItemInstance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Bonus levels of a player's active foods, keyed by food name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodBonusMemory {
    levels: BTreeMap<String, u32>,
}

impl FoodBonusMemory {
    /// Record the bonus level of every active food (0 for unbonused ones)
    ///
    /// Foods sharing a name keep the highest level among them, whatever
    /// order they come in.
    pub fn record<'a>(foods: impl IntoIterator<Item = &'a ItemInstance>) -> Self {
        let mut levels: BTreeMap<String, u32> = BTreeMap::new();
        for food in foods {
            let level = food.bonus().map(BonusComponent::level).unwrap_or(0);
            let remembered = levels.entry(food.name.clone()).or_insert(level);
            *remembered = (*remembered).max(level);
        }
        FoodBonusMemory { levels }
    }

    pub fn level_for(&self, name: &str) -> Option<u32> {
        self.levels.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Re-attach remembered bonuses to freshly loaded active foods
    ///
    /// Foods that already carry a bonus, or were remembered at level 0, are
    /// left alone. The perfect flag is not remembered. Returns how many
    /// foods got their bonus back.
    pub fn restore(&self, engine: &mut BonusEngine, foods: &mut [ItemInstance]) -> usize {
        let mut restored = 0;
        for food in foods.iter_mut() {
            let Some(level) = self.level_for(&food.name).filter(|level| *level > 0) else {
                continue;
            };
            if food.bonus().is_some() {
                continue;
            }
            food.extended_mut().push(Extension::CookingBonus(BonusComponent::new(level, false)));
            if engine.apply_item(food) {
                debug!(item = %food.id, name = %food.name, level, "restored food bonus");
                restored += 1;
            }
        }
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CookingSettings;
    use crate::item::{BlueprintId, StatBlueprint};
    use crate::types::ItemId;

    #[test]
    fn test_record_levels() {
        let foods = vec![
            ItemInstance::new(ItemId(1), "stew", BlueprintId(0))
                .with_extension(Extension::CookingBonus(BonusComponent::new(45, true))),
            ItemInstance::new(ItemId(2), "berries", BlueprintId(1)),
        ];

        let memory = FoodBonusMemory::record(&foods);
        assert_eq!(memory.level_for("stew"), Some(45));
        assert_eq!(memory.level_for("berries"), Some(0));
        assert_eq!(memory.level_for("bread"), None);

        let json = serde_json::to_string(&memory).unwrap();
        let back: FoodBonusMemory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, memory);
    }

    #[test]
    fn test_same_name_keeps_highest_level() {
        let stew = |id: u64, level: u32| {
            ItemInstance::new(ItemId(id), "stew", BlueprintId(0))
                .with_extension(Extension::CookingBonus(BonusComponent::new(level, false)))
        };
        let plain = ItemInstance::new(ItemId(3), "stew", BlueprintId(0));

        let low_first = FoodBonusMemory::record(&[stew(1, 30), stew(2, 70), plain.clone()]);
        let high_first = FoodBonusMemory::record(&[plain, stew(2, 70), stew(1, 30)]);
        assert_eq!(low_first.level_for("stew"), Some(70));
        assert_eq!(low_first, high_first);
    }

    #[test]
    fn test_restore_covers_every_food_with_the_name() {
        let mut engine = BonusEngine::new(&CookingSettings::default());
        let stew = engine.register_blueprint(StatBlueprint::new(40.0, 20.0, 2.0));
        let mut memory = FoodBonusMemory::default();
        memory.levels.insert("stew".into(), 100);

        let mut foods = vec![
            ItemInstance::new(ItemId(1), "stew", stew),
            ItemInstance::new(ItemId(2), "stew", stew),
        ];
        assert_eq!(memory.restore(&mut engine, &mut foods), 2);
        assert_ne!(foods[0].blueprint, foods[1].blueprint);
        for food in &foods {
            assert!((engine.stats(food).unwrap().food - 80.0).abs() < 1e-9);
        }
        assert_eq!(engine.registry().len(), 2);
    }

    #[test]
    fn test_restore_reapplies_on_private_copy() {
        let mut engine = BonusEngine::new(&CookingSettings::default());
        let stew = engine.register_blueprint(StatBlueprint::new(40.0, 20.0, 2.0));
        let berries = engine.register_blueprint(StatBlueprint::new(10.0, 20.0, 1.0));

        let mut memory = FoodBonusMemory::default();
        memory.levels.insert("stew".into(), 50);
        memory.levels.insert("berries".into(), 0);

        let mut foods = vec![
            ItemInstance::new(ItemId(1), "stew", stew),
            ItemInstance::new(ItemId(2), "berries", berries),
        ];
        assert_eq!(memory.restore(&mut engine, &mut foods), 1);

        assert_ne!(foods[0].blueprint, stew);
        assert!((engine.stats(&foods[0]).unwrap().food - 60.0).abs() < 1e-9);
        assert!(!foods[0].is_perfect());
        assert_eq!(foods[1].blueprint, berries);
        assert!(!foods[1].is_extended());
        assert!((engine.blueprints().get(stew).unwrap().food - 40.0).abs() < f64::EPSILON);

        // Restoring again leaves the bonused food alone
        assert_eq!(memory.restore(&mut engine, &mut foods), 0);
        assert!((engine.stats(&foods[0]).unwrap().food - 60.0).abs() < 1e-9);
    }
}
