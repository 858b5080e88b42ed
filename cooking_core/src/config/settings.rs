//! Cooking settings as stored in TOML

use super::ConfigError;
use crate::types::StatChannel;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Allowed range for a per-channel increase factor
pub const FACTOR_RANGE: (f64, f64) = (1.0, 5.0);
/// Allowed range for the minimum level of the perfect roll (0 disables it)
pub const HAPPY_LEVEL_RANGE: (u32, u32) = (0, 100);
/// Allowed range for the happy buff duration in minutes
pub const BUFF_DURATION_RANGE: (u32, u32) = (1, 60);
/// Allowed range for the happy buff movement speed factor
pub const BUFF_STRENGTH_RANGE: (f64, f64) = (1.0, 3.0);
/// Allowed range for the experience gain factor
pub const EXPERIENCE_GAIN_RANGE: (f64, f64) = (0.01, 5.0);

/// Tunable cooking settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CookingSettings {
    #[serde(default)]
    pub factors: FactorSettings,
    #[serde(default)]
    pub happy: HappySettings,
    #[serde(default)]
    pub progression: ProgressionSettings,
}

/// Increase factor per stat channel at bonus level 100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSettings {
    #[serde(default = "default_factor")]
    pub health: f64,
    #[serde(default = "default_factor")]
    pub stamina: f64,
    #[serde(default = "default_factor")]
    pub regen: f64,
    /// Secondary resource, left unboosted unless configured
    #[serde(default = "default_eitr_factor")]
    pub eitr: f64,
}

impl Default for FactorSettings {
    fn default() -> Self {
        FactorSettings {
            health: default_factor(),
            stamina: default_factor(),
            regen: default_factor(),
            eitr: default_eitr_factor(),
        }
    }
}

impl FactorSettings {
    /// Factor for a channel
    pub fn get(&self, channel: StatChannel) -> f64 {
        match channel {
            StatChannel::Health => self.health,
            StatChannel::Stamina => self.stamina,
            StatChannel::Regen => self.regen,
            StatChannel::Eitr => self.eitr,
        }
    }

    fn get_mut(&mut self, channel: StatChannel) -> &mut f64 {
        match channel {
            StatChannel::Health => &mut self.health,
            StatChannel::Stamina => &mut self.stamina,
            StatChannel::Regen => &mut self.regen,
            StatChannel::Eitr => &mut self.eitr,
        }
    }
}

fn default_factor() -> f64 {
    2.0
}
fn default_eitr_factor() -> f64 {
    1.0
}

/// Perfect ("happy") outcome settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HappySettings {
    /// Minimum bonus level for a chance at a perfect result, 0 disables
    #[serde(default = "default_required_level")]
    pub required_level: u32,
    /// Duration of the happy buff in minutes
    #[serde(default = "default_buff_duration")]
    pub buff_duration_minutes: u32,
    /// Movement speed factor while the happy buff is active
    #[serde(default = "default_buff_strength")]
    pub buff_strength: f64,
}

impl Default for HappySettings {
    fn default() -> Self {
        HappySettings {
            required_level: default_required_level(),
            buff_duration_minutes: default_buff_duration(),
            buff_strength: default_buff_strength(),
        }
    }
}

fn default_required_level() -> u32 {
    50
}
fn default_buff_duration() -> u32 {
    3
}
fn default_buff_strength() -> f64 {
    1.1
}

/// Skill progression settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionSettings {
    /// Factor for experience gained by the cooking skill
    #[serde(default = "default_experience_gain")]
    pub experience_gain_factor: f64,
    /// Skill raise requested after each successful cook
    #[serde(default = "default_skill_raise")]
    pub skill_raise_per_cook: u32,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        ProgressionSettings {
            experience_gain_factor: default_experience_gain(),
            skill_raise_per_cook: default_skill_raise(),
        }
    }
}

fn default_experience_gain() -> f64 {
    1.0
}
fn default_skill_raise() -> u32 {
    5
}

/// Clamp a float setting into range, logging when it had to move
pub(crate) fn clamp_float(name: &str, value: f64, (min, max): (f64, f64)) -> f64 {
    let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
    if clamped != value {
        warn!(setting = name, value, clamped, "setting out of range, clamped");
    }
    clamped
}

/// Clamp an integer setting into range, logging when it had to move
pub(crate) fn clamp_int(name: &str, value: u32, (min, max): (u32, u32)) -> u32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(setting = name, value, clamped, "setting out of range, clamped");
    }
    clamped
}

impl CookingSettings {
    /// Load settings from a TOML file, clamped into their allowed ranges
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings: CookingSettings = super::load_toml(path)?;
        Ok(settings.clamped())
    }

    /// Parse settings from a TOML string, clamped into their allowed ranges
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let settings: CookingSettings = super::parse_toml(content)?;
        Ok(settings.clamped())
    }

    /// Return a copy with every value forced into its allowed range
    pub fn clamped(mut self) -> Self {
        for channel in StatChannel::all() {
            let factor = self.factors.get_mut(*channel);
            *factor = clamp_float(channel.name(), *factor, FACTOR_RANGE);
        }
        self.happy.required_level = clamp_int(
            "happy.required_level",
            self.happy.required_level,
            HAPPY_LEVEL_RANGE,
        );
        self.happy.buff_duration_minutes = clamp_int(
            "happy.buff_duration_minutes",
            self.happy.buff_duration_minutes,
            BUFF_DURATION_RANGE,
        );
        self.happy.buff_strength = clamp_float(
            "happy.buff_strength",
            self.happy.buff_strength,
            BUFF_STRENGTH_RANGE,
        );
        self.progression.experience_gain_factor = clamp_float(
            "progression.experience_gain_factor",
            self.progression.experience_gain_factor,
            EXPERIENCE_GAIN_RANGE,
        );
        self
    }
}

/// Get the default settings shipped with the crate
pub fn default_settings() -> CookingSettings {
    let toml = include_str!("../../config/cooking.toml");
    CookingSettings::parse(toml).unwrap_or_default()
}

/// A single adjustable setting, addressed by its dotted TOML path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Factor(StatChannel),
    HappyRequiredLevel,
    HappyBuffDuration,
    HappyBuffStrength,
    ExperienceGainFactor,
    SkillRaisePerCook,
}

impl FromStr for SettingKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim() {
            "happy.required_level" => SettingKey::HappyRequiredLevel,
            "happy.buff_duration_minutes" => SettingKey::HappyBuffDuration,
            "happy.buff_strength" => SettingKey::HappyBuffStrength,
            "progression.experience_gain_factor" => SettingKey::ExperienceGainFactor,
            "progression.skill_raise_per_cook" => SettingKey::SkillRaisePerCook,
            other => {
                let channel = other
                    .strip_prefix("factors.")
                    .and_then(StatChannel::from_name)
                    .ok_or_else(|| ConfigError::UnknownSetting(other.to_string()))?;
                SettingKey::Factor(channel)
            }
        };
        Ok(key)
    }
}

/// Parse a `key=value` assignment such as `factors.health=3.5`
pub fn parse_assignment(assignment: &str) -> Result<(SettingKey, f64), ConfigError> {
    let (name, value) = assignment
        .split_once('=')
        .ok_or_else(|| ConfigError::MalformedAssignment(assignment.to_string()))?;
    let key: SettingKey = name.parse()?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: name.trim().to_string(),
            value: value.trim().to_string(),
        })?;
    Ok((key, value))
}
