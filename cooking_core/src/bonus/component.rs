//! BonusComponent - Per-item bonus level with an Apply/Unload lifecycle

use super::{bonus_multiplier, BonusContext};
use crate::item::BlueprintId;
use crate::types::{ItemId, StatChannel};
use rand::Rng;
use tracing::{debug, warn};

/// Highest bonus level
pub const MAX_LEVEL: u32 = 100;
/// Bonus levels are multiples of this step
pub const LEVEL_STEP: u32 = 5;

/// Turn a normalized skill factor in [0, 1] into a bonus level
///
/// The level is `skill * 100` rounded to the nearest multiple of 5, ties to
/// even. Out-of-range input is clamped first.
pub fn quantize_level(skill_factor: f64) -> u32 {
    let skill = if skill_factor.is_nan() {
        0.0
    } else {
        skill_factor.clamp(0.0, 1.0)
    };
    let steps = (skill * MAX_LEVEL as f64 / LEVEL_STEP as f64).round_ties_even() as u32;
    (steps * LEVEL_STEP).min(MAX_LEVEL)
}

/// Bonus state attached to one item instance
///
/// Equality compares the bonus itself (level and perfect flag), not whether
/// it is currently applied.
#[derive(Debug, Clone, Default)]
pub struct BonusComponent {
    level: u32,
    perfect: bool,
    applied: bool,
}

impl PartialEq for BonusComponent {
    fn eq(&self, other: &Self) -> bool {
        self.level == other.level && self.perfect == other.perfect
    }
}

impl Eq for BonusComponent {}

impl BonusComponent {
    /// Create a component with an explicit level (capped at [`MAX_LEVEL`])
    pub fn new(level: u32, perfect: bool) -> Self {
        BonusComponent {
            level: level.min(MAX_LEVEL),
            perfect,
            applied: false,
        }
    }

    /// Create the component for a freshly cooked item
    ///
    /// With `happy_required_level > 0`, a roll in [0, 100] at most
    /// `level - happy_required_level` makes the result perfect.
    pub fn attach(skill_factor: f64, happy_required_level: u32, rng: &mut impl Rng) -> Self {
        let level = quantize_level(skill_factor);
        let perfect = happy_required_level > 0 && {
            let roll: i64 = rng.gen_range(0..=100);
            roll <= i64::from(level) - i64::from(happy_required_level)
        };
        BonusComponent::new(level, perfect)
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_perfect(&self) -> bool {
        self.perfect
    }

    /// Whether the bonus is currently multiplied into a blueprint
    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Level 0 components never touch a blueprint
    pub fn has_bonus(&self) -> bool {
        self.level > 0
    }

    /// Multiply the bonus into the item's blueprint
    ///
    /// The first apply rebinds `blueprint` to a private clone owned by
    /// `owner`. Applying twice without an unload in between does nothing.
    /// Returns true if the blueprint was changed.
    pub fn apply(
        &mut self,
        ctx: &mut BonusContext<'_>,
        owner: ItemId,
        blueprint: &mut BlueprintId,
    ) -> bool {
        if !self.has_bonus() || self.applied {
            return false;
        }
        let Some(exclusive) = ctx.store.make_exclusive(*blueprint, owner) else {
            warn!(%owner, blueprint = blueprint.0, "apply on unknown blueprint ignored");
            return false;
        };
        *blueprint = exclusive;

        for channel in StatChannel::all() {
            let multiplier = bonus_multiplier(self.level, ctx.factor_for(*channel, exclusive));
            if let Some(stats) = ctx.store.get_owned_mut(exclusive, owner) {
                stats.scale(*channel, multiplier);
            }
        }
        ctx.registry.register(exclusive, self.level);
        self.applied = true;
        debug!(%owner, blueprint = exclusive.0, level = self.level, "bonus applied");
        true
    }

    /// Divide the bonus back out of the item's blueprint
    ///
    /// Uses the factors currently baked into the blueprint, so the result is
    /// the pre-apply value even after live factor edits. Unloading a
    /// component that is not applied does nothing.
    ///
    /// Only the live owner of the bonus can unload it: `blueprint` must be
    /// owned by `owner` and registered at this component's level. A copied
    /// component that fails either check is marked unapplied and leaves the
    /// blueprint and the registry untouched.
    pub fn unload(
        &mut self,
        ctx: &mut BonusContext<'_>,
        owner: ItemId,
        blueprint: &mut BlueprintId,
    ) -> bool {
        if !self.has_bonus() || !self.applied {
            return false;
        }
        self.applied = false;

        let applied_to = *blueprint;
        if !ctx.store.is_owned_by(applied_to, owner)
            || ctx.registry.level_of(applied_to) != Some(self.level)
        {
            warn!(%owner, blueprint = applied_to.0, "unload of a bonus not owned by item ignored");
            return false;
        }

        // Pending state is cleared by deregister, so read factors first
        let multipliers: Vec<(StatChannel, f64)> = StatChannel::all()
            .iter()
            .map(|channel| {
                let factor = ctx.factor_for(*channel, applied_to);
                (*channel, bonus_multiplier(self.level, factor))
            })
            .collect();
        ctx.registry.deregister(applied_to);

        if let Some(stats) = ctx.store.get_owned_mut(applied_to, owner) {
            for (channel, multiplier) in multipliers {
                stats.scale(channel, multiplier.recip());
            }
        }
        debug!(%owner, blueprint = applied_to.0, level = self.level, "bonus unloaded");
        true
    }

    /// Encode as perfect flag (`0`/`1`) followed by the decimal level
    pub fn serialize(&self) -> String {
        format!("{}{}", if self.perfect { '1' } else { '0' }, self.level)
    }

    /// Decode [`serialize`](Self::serialize) output
    ///
    /// Never fails: an empty string is no bonus, and a level that does not
    /// parse becomes 0.
    pub fn deserialize(data: &str) -> Self {
        let mut chars = data.chars();
        let Some(flag) = chars.next() else {
            return BonusComponent::default();
        };
        let level = chars.as_str().trim().parse::<u32>().unwrap_or(0);
        BonusComponent::new(level, flag == '1')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::ActiveBonusRegistry;
    use crate::config::LiveConfig;
    use crate::item::{BlueprintStore, StatBlueprint};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        store: BlueprintStore,
        registry: ActiveBonusRegistry,
        config: LiveConfig,
        shared: BlueprintId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut store = BlueprintStore::new();
            let shared = store.insert_shared(StatBlueprint::new(40.0, 20.0, 2.0));
            Fixture {
                store,
                registry: ActiveBonusRegistry::new(),
                config: LiveConfig::default(),
                shared,
            }
        }

        fn ctx(&mut self) -> BonusContext<'_> {
            BonusContext {
                store: &mut self.store,
                registry: &mut self.registry,
                config: &self.config,
            }
        }
    }

    #[test]
    fn test_quantize_level() {
        assert_eq!(quantize_level(0.73), 75);
        assert_eq!(quantize_level(0.0), 0);
        assert_eq!(quantize_level(1.0), 100);
        assert_eq!(quantize_level(0.02), 0);
        assert_eq!(quantize_level(0.03), 5);
        assert_eq!(quantize_level(1.7), 100);
        assert_eq!(quantize_level(-0.4), 0);
        assert_eq!(quantize_level(f64::NAN), 0);
    }

    #[test]
    fn test_attach_without_happy_roll() {
        let mut rng = StdRng::seed_from_u64(1);
        let component = BonusComponent::attach(0.73, 0, &mut rng);
        assert_eq!(component.level(), 75);
        assert!(!component.is_perfect());
        assert!(!component.is_applied());
    }

    #[test]
    fn test_attach_happy_needs_level_above_threshold() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            // level 50 is below threshold 60: no roll can succeed
            let at_threshold = BonusComponent::attach(0.5, 60, &mut rng);
            assert!(!at_threshold.is_perfect());
        }
        let perfect = (0..200)
            .filter(|_| BonusComponent::attach(1.0, 1, &mut rng).is_perfect())
            .count();
        // 100 of 101 rolls succeed at level 100, threshold 1
        assert!(perfect > 150);
    }

    #[test]
    fn test_zero_level_is_noop() {
        let mut fx = Fixture::new();
        let mut blueprint = fx.shared;
        let mut component = BonusComponent::new(0, true);

        assert!(!component.apply(&mut fx.ctx(), ItemId(1), &mut blueprint));
        assert_eq!(blueprint, fx.shared);
        assert!(fx.registry.is_empty());
        assert!(!component.unload(&mut fx.ctx(), ItemId(1), &mut blueprint));
        assert_eq!(fx.store.len(), 1);
    }

    #[test]
    fn test_apply_clones_and_registers() {
        let mut fx = Fixture::new();
        let mut blueprint = fx.shared;
        let mut component = BonusComponent::new(50, false);

        assert!(component.apply(&mut fx.ctx(), ItemId(1), &mut blueprint));
        assert_ne!(blueprint, fx.shared);
        assert!(fx.store.is_owned_by(blueprint, ItemId(1)));
        assert_eq!(fx.registry.level_of(blueprint), Some(50));

        let stats = fx.store.get(blueprint).unwrap();
        assert!((stats.food - 60.0).abs() < 1e-9);
        assert!((stats.food_stamina - 30.0).abs() < 1e-9);
        assert!((stats.food_regen - 3.0).abs() < 1e-9);
        assert_eq!(stats.food_eitr, None);

        let base = fx.store.get(fx.shared).unwrap();
        assert!((base.food - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let mut fx = Fixture::new();
        let mut blueprint = fx.shared;
        let mut component = BonusComponent::new(100, false);

        component.apply(&mut fx.ctx(), ItemId(1), &mut blueprint);
        let once = fx.store.get(blueprint).unwrap().clone();
        assert!(!component.apply(&mut fx.ctx(), ItemId(1), &mut blueprint));
        assert_eq!(fx.store.get(blueprint).unwrap(), &once);
        assert_eq!(fx.store.len(), 2);
    }

    #[test]
    fn test_unload_restores_and_deregisters() {
        let mut fx = Fixture::new();
        let mut blueprint = fx.shared;
        let mut component = BonusComponent::new(35, false);

        component.apply(&mut fx.ctx(), ItemId(4), &mut blueprint);
        let applied_to = blueprint;
        assert!(component.unload(&mut fx.ctx(), ItemId(4), &mut blueprint));
        assert_eq!(blueprint, applied_to);
        assert!(fx.registry.is_empty());

        let stats = fx.store.get(blueprint).unwrap();
        assert!((stats.food - 40.0).abs() < 1e-9);
        assert!((stats.food_stamina - 20.0).abs() < 1e-9);
        assert!((stats.food_regen - 2.0).abs() < 1e-9);

        // Second unload without apply is a no-op
        assert!(!component.unload(&mut fx.ctx(), ItemId(4), &mut blueprint));
        assert!((fx.store.get(blueprint).unwrap().food - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_unload_never_applied_is_noop() {
        let mut fx = Fixture::new();
        let mut blueprint = fx.shared;
        let mut component = BonusComponent::new(80, false);
        assert!(!component.unload(&mut fx.ctx(), ItemId(1), &mut blueprint));
        assert_eq!(blueprint, fx.shared);
    }

    #[test]
    fn test_unload_of_copy_under_other_owner_is_noop() {
        let mut fx = Fixture::new();
        let mut blueprint = fx.shared;
        let mut original = BonusComponent::new(100, false);
        original.apply(&mut fx.ctx(), ItemId(1), &mut blueprint);
        let applied_to = blueprint;

        // A split-off copy points at the original's private blueprint
        let mut copy = original.clone();
        let mut copy_blueprint = blueprint;
        assert!(!copy.unload(&mut fx.ctx(), ItemId(2), &mut copy_blueprint));
        assert!(!copy.is_applied());
        assert_eq!(fx.registry.level_of(applied_to), Some(100));
        assert!((fx.store.get(applied_to).unwrap().food - 80.0).abs() < 1e-9);

        assert!(original.unload(&mut fx.ctx(), ItemId(1), &mut blueprint));
        assert!((fx.store.get(applied_to).unwrap().food - 40.0).abs() < 1e-9);
        assert!(fx.registry.is_empty());
    }

    #[test]
    fn test_same_owner_copy_unloads_only_once() {
        let mut fx = Fixture::new();
        let mut blueprint = fx.shared;
        let mut original = BonusComponent::new(100, false);
        original.apply(&mut fx.ctx(), ItemId(1), &mut blueprint);

        let mut copy = original.clone();
        let mut copy_blueprint = blueprint;
        assert!(copy.unload(&mut fx.ctx(), ItemId(1), &mut copy_blueprint));
        assert!(!original.unload(&mut fx.ctx(), ItemId(1), &mut blueprint));
        assert!(!original.is_applied());

        let stats = fx.store.get(blueprint).unwrap();
        assert!((stats.food - 40.0).abs() < 1e-9);
        assert!((stats.food_stamina - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_unload_with_mismatched_level_is_noop() {
        let mut fx = Fixture::new();
        let mut blueprint = fx.shared;
        let mut component = BonusComponent::new(50, false);
        component.apply(&mut fx.ctx(), ItemId(1), &mut blueprint);
        fx.registry.register(blueprint, 80);

        assert!(!component.unload(&mut fx.ctx(), ItemId(1), &mut blueprint));
        assert_eq!(fx.registry.level_of(blueprint), Some(80));
        assert!((fx.store.get(blueprint).unwrap().food - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_serialize() {
        assert_eq!(BonusComponent::new(75, true).serialize(), "175");
        assert_eq!(BonusComponent::new(0, false).serialize(), "00");
        assert_eq!(BonusComponent::new(100, false).serialize(), "0100");
    }

    #[test]
    fn test_deserialize() {
        let empty = BonusComponent::deserialize("");
        assert_eq!(empty.level(), 0);
        assert!(!empty.is_perfect());

        let perfect = BonusComponent::deserialize("175");
        assert_eq!(perfect.level(), 75);
        assert!(perfect.is_perfect());

        let flag_only = BonusComponent::deserialize("1");
        assert_eq!(flag_only.level(), 0);
        assert!(flag_only.is_perfect());

        let garbage = BonusComponent::deserialize("045abc");
        assert_eq!(garbage.level(), 0);
        assert!(!garbage.is_perfect());

        assert_eq!(BonusComponent::deserialize("0900").level(), MAX_LEVEL);
        assert!(!BonusComponent::deserialize("x50").is_perfect());
    }

    #[test]
    fn test_equality_ignores_applied_state() {
        let mut fx = Fixture::new();
        let mut blueprint = fx.shared;
        let mut applied = BonusComponent::new(50, false);
        applied.apply(&mut fx.ctx(), ItemId(1), &mut blueprint);

        assert_eq!(applied, BonusComponent::new(50, false));
        assert_ne!(applied, BonusComponent::new(50, true));
        assert_ne!(applied, BonusComponent::new(55, false));
    }
}
