//! cooking_core - Skill-scaled food bonuses for game items
//!
//! This library provides:
//! - BonusComponent: Per-item bonus level with an Apply/Unload lifecycle
//! - ActiveBonusRegistry: Live bonused blueprints, rescaled when factors change
//! - LiveConfig: Clamped, change-notifying settings loaded from TOML
//! - Stack compatibility: Whether two items' extension state allows stacking
//! - BonusEngine: The hooks a host calls on create, load, release and config edits

pub mod bonus;
pub mod config;
pub mod engine;
pub mod happy;
pub mod item;
pub mod memory;
pub mod prelude;
pub mod preview;
pub mod progression;
pub mod types;

// Re-export core types for convenience
pub use bonus::{ActiveBonusRegistry, BonusComponent, BonusContext};
pub use config::{default_settings, ConfigChange, ConfigError, CookingSettings, LiveConfig};
pub use engine::BonusEngine;
pub use happy::HappyBuff;
pub use item::stacking::{find_stack, is_compatible};
pub use item::{
    BlueprintId, BlueprintStore, ExtendedData, Extension, ItemInstance, StatBlueprint,
};
pub use memory::FoodBonusMemory;
pub use preview::{bonus_preview, BonusPreview};
pub use progression::{FixedProgression, SkillProgression, SkillRaise};
pub use types::{ItemId, StatChannel};
