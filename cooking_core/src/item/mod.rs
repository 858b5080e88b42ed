//! Item instances, their blueprints and extension state

mod blueprint;
mod extension;
pub mod stacking;

pub use blueprint::{BlueprintId, BlueprintStore, Ownership, StatBlueprint};
pub use extension::{
    CrafterSignature, ExtendedData, Extension, ExtensionError, ExtensionRecord, UniqueKind,
};

use crate::bonus::BonusComponent;
use crate::types::ItemId;

/// Default stack size for food items
pub const DEFAULT_MAX_STACK: u32 = 20;

/// One inventory entry: an item kind, its stats and per-instance state
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInstance {
    pub id: ItemId,
    /// Item kind, e.g. "cooked_meat"; only equal kinds stack
    pub name: String,
    /// Stats in use; shared until a bonus gives the item its own copy
    pub blueprint: BlueprintId,
    pub stack: u32,
    pub max_stack: u32,
    /// `None` until something attaches per-instance state
    pub extended: Option<ExtendedData>,
}

impl ItemInstance {
    /// Create a single item pointing at `blueprint`
    pub fn new(id: ItemId, name: impl Into<String>, blueprint: BlueprintId) -> Self {
        ItemInstance {
            id,
            name: name.into(),
            blueprint,
            stack: 1,
            max_stack: DEFAULT_MAX_STACK,
            extended: None,
        }
    }

    pub fn with_stack(mut self, stack: u32) -> Self {
        self.stack = stack;
        self
    }

    pub fn with_extension(mut self, component: Extension) -> Self {
        self.extended_mut().push(component);
        self
    }

    pub fn is_extended(&self) -> bool {
        self.extended.is_some()
    }

    /// Extension state, created empty on first access
    pub fn extended_mut(&mut self) -> &mut ExtendedData {
        self.extended.get_or_insert_with(ExtendedData::new)
    }

    pub fn bonus(&self) -> Option<&BonusComponent> {
        self.extended.as_ref().and_then(ExtendedData::bonus)
    }

    /// Whether the item was cooked perfectly
    pub fn is_perfect(&self) -> bool {
        self.bonus().is_some_and(BonusComponent::is_perfect)
    }

    /// Room left on this stack
    pub fn free_space(&self) -> u32 {
        self.max_stack.saturating_sub(self.stack)
    }
}
