//! Prelude module for convenient imports
//!
//! ```rust
//! use cooking_core::prelude::*;
//! ```

// Core types
pub use crate::types::{ItemId, StatChannel};
pub use crate::item::{BlueprintId, ExtendedData, Extension, ItemInstance, StatBlueprint};

// Bonus lifecycle
pub use crate::bonus::BonusComponent;
pub use crate::engine::BonusEngine;

// Stacking
pub use crate::item::stacking::{find_stack, is_compatible};

// Config
pub use crate::config::{default_settings, ConfigChange, CookingSettings};

// Host seams
pub use crate::progression::{SkillProgression, SkillRaise};
pub use crate::happy::HappyBuff;
