//! Core types shared across cooking_core

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of an item instance, assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        ItemId(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// A numeric stat of a food blueprint that can receive a bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatChannel {
    /// Health restored on eating
    Health,
    /// Stamina restored on eating
    Stamina,
    /// Health regeneration while digesting
    Regen,
    /// Secondary resource restored on eating (optional on a blueprint)
    Eitr,
}

impl StatChannel {
    /// Get all stat channels
    pub fn all() -> &'static [StatChannel] {
        &[
            StatChannel::Health,
            StatChannel::Stamina,
            StatChannel::Regen,
            StatChannel::Eitr,
        ]
    }

    /// Name used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            StatChannel::Health => "health",
            StatChannel::Stamina => "stamina",
            StatChannel::Regen => "regen",
            StatChannel::Eitr => "eitr",
        }
    }

    /// Look up a channel by its configuration name
    pub fn from_name(name: &str) -> Option<StatChannel> {
        StatChannel::all()
            .iter()
            .copied()
            .find(|channel| channel.name() == name)
    }
}

impl fmt::Display for StatChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
