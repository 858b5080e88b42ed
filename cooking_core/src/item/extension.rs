//! Extension components attached to individual item instances

use crate::bonus::BonusComponent;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Extension kinds whose equality decides whether two items may stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueKind {
    CookingBonus,
    Crafter,
}

/// Name of whoever crafted an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrafterSignature {
    pub crafter_name: String,
}

impl CrafterSignature {
    pub fn new(crafter_name: impl Into<String>) -> Self {
        CrafterSignature {
            crafter_name: crafter_name.into(),
        }
    }
}

/// One piece of per-instance state
#[derive(Debug, Clone, PartialEq)]
pub enum Extension {
    /// Cooking skill bonus; unique, equal on level and perfect flag
    CookingBonus(BonusComponent),
    /// Crafter signature; unique, equal on crafter name
    Crafter(CrafterSignature),
    /// Free-form note; never blocks stacking
    Note(String),
}

/// Persisted form of an [`Extension`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRecord {
    pub kind: String,
    pub data: String,
}

/// Errors decoding persisted extension state
#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Unknown extension kind: {0}")]
    UnknownKind(String),
    #[error("Malformed data for extension {kind}: {data:?}")]
    MalformedData { kind: String, data: String },
    #[error("Failed to decode extension records: {0}")]
    Json(#[from] serde_json::Error),
}

impl Extension {
    /// Name stored in [`ExtensionRecord::kind`]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Extension::CookingBonus(_) => "cooking_bonus",
            Extension::Crafter(_) => "crafter",
            Extension::Note(_) => "note",
        }
    }

    /// The uniqueness contract this component opts into, if any
    pub fn unique_kind(&self) -> Option<UniqueKind> {
        match self {
            Extension::CookingBonus(_) => Some(UniqueKind::CookingBonus),
            Extension::Crafter(_) => Some(UniqueKind::Crafter),
            Extension::Note(_) => None,
        }
    }

    /// Kind-specific equality used when deciding stackability
    pub fn unique_eq(&self, other: &Extension) -> bool {
        match (self, other) {
            (Extension::CookingBonus(a), Extension::CookingBonus(b)) => {
                a.level() == b.level() && a.is_perfect() == b.is_perfect()
            }
            (Extension::Crafter(a), Extension::Crafter(b)) => a.crafter_name == b.crafter_name,
            _ => false,
        }
    }

    pub fn to_record(&self) -> ExtensionRecord {
        let data = match self {
            Extension::CookingBonus(bonus) => bonus.serialize(),
            Extension::Crafter(signature) => signature.crafter_name.clone(),
            Extension::Note(note) => note.clone(),
        };
        ExtensionRecord {
            kind: self.kind_name().to_string(),
            data,
        }
    }

    pub fn from_record(record: &ExtensionRecord) -> Result<Self, ExtensionError> {
        match record.kind.as_str() {
            "cooking_bonus" => Ok(Extension::CookingBonus(BonusComponent::deserialize(
                &record.data,
            ))),
            "crafter" if record.data.trim().is_empty() => Err(ExtensionError::MalformedData {
                kind: record.kind.clone(),
                data: record.data.clone(),
            }),
            "crafter" => Ok(Extension::Crafter(CrafterSignature::new(record.data.as_str()))),
            "note" => Ok(Extension::Note(record.data.clone())),
            other => Err(ExtensionError::UnknownKind(other.to_string())),
        }
    }
}

/// The extension state of one item instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendedData {
    components: Vec<Extension>,
}

impl ExtendedData {
    pub fn new() -> Self {
        ExtendedData {
            components: Vec::new(),
        }
    }

    /// Builder-style [`push`](Self::push)
    pub fn with(mut self, component: Extension) -> Self {
        self.components.push(component);
        self
    }

    pub fn push(&mut self, component: Extension) {
        self.components.push(component);
    }

    pub fn components(&self) -> &[Extension] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The cooking bonus, if one is attached
    pub fn bonus(&self) -> Option<&BonusComponent> {
        self.components.iter().find_map(|component| match component {
            Extension::CookingBonus(bonus) => Some(bonus),
            _ => None,
        })
    }

    pub fn bonus_mut(&mut self) -> Option<&mut BonusComponent> {
        self.components.iter_mut().find_map(|component| match component {
            Extension::CookingBonus(bonus) => Some(bonus),
            _ => None,
        })
    }

    /// Components that opt into equality-based stacking
    pub fn unique_components(&self) -> impl Iterator<Item = (UniqueKind, &Extension)> {
        self.components
            .iter()
            .filter_map(|component| component.unique_kind().map(|kind| (kind, component)))
    }

    pub fn has_unique(&self) -> bool {
        self.unique_components().next().is_some()
    }

    pub fn to_records(&self) -> Vec<ExtensionRecord> {
        self.components.iter().map(Extension::to_record).collect()
    }

    /// Rebuild from records, skipping any that do not decode
    pub fn from_records(records: &[ExtensionRecord]) -> Self {
        let components = records
            .iter()
            .filter_map(|record| match Extension::from_record(record) {
                Ok(component) => Some(component),
                Err(err) => {
                    warn!(kind = %record.kind, error = %err, "skipping extension record");
                    None
                }
            })
            .collect();
        ExtendedData { components }
    }

    pub fn to_json(&self) -> Result<String, ExtensionError> {
        Ok(serde_json::to_string(&self.to_records())?)
    }

    pub fn from_json(json: &str) -> Result<Self, ExtensionError> {
        let records: Vec<ExtensionRecord> = serde_json::from_str(json)?;
        Ok(ExtendedData::from_records(&records))
    }
}
