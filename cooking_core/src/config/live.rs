//! LiveConfig - Runtime settings that can change while bonuses are live

use super::settings::{
    clamp_float, clamp_int, CookingSettings, FactorSettings, HappySettings, ProgressionSettings,
    BUFF_DURATION_RANGE, BUFF_STRENGTH_RANGE, EXPERIENCE_GAIN_RANGE, FACTOR_RANGE,
    HAPPY_LEVEL_RANGE,
};
use crate::types::StatChannel;
use std::collections::BTreeMap;
use std::fmt;

/// A change to a live setting, delivered to subscribed listeners
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigChange {
    /// A channel factor moved from `old` to `new`; the rescale sweep has completed
    Factor {
        channel: StatChannel,
        old: f64,
        new: f64,
    },
    HappyRequiredLevel { old: u32, new: u32 },
    /// Either happy buff parameter changed; carries both current values
    HappyBuff { duration_minutes: u32, strength: f64 },
    ExperienceGainFactor { old: f64, new: f64 },
    SkillRaisePerCook { old: u32, new: u32 },
}

/// Handle returned by [`LiveConfig::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&ConfigChange)>;

#[derive(Debug, Clone, Copy)]
struct ChannelFactor {
    current: f64,
    /// Value before the last edit, kept until its rescale sweep completes
    previous: Option<f64>,
}

/// Live settings with change notification
///
/// Every setter clamps at this boundary, so downstream arithmetic never sees
/// an out-of-range factor.
pub struct LiveConfig {
    factors: BTreeMap<StatChannel, ChannelFactor>,
    happy_required_level: u32,
    buff_duration_minutes: u32,
    buff_strength: f64,
    experience_gain_factor: f64,
    skill_raise_per_cook: u32,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl LiveConfig {
    /// Build live settings from loaded settings (clamping them again)
    pub fn from_settings(settings: &CookingSettings) -> Self {
        let settings = settings.clone().clamped();
        let factors = StatChannel::all()
            .iter()
            .map(|channel| {
                (
                    *channel,
                    ChannelFactor {
                        current: settings.factors.get(*channel),
                        previous: None,
                    },
                )
            })
            .collect();

        LiveConfig {
            factors,
            happy_required_level: settings.happy.required_level,
            buff_duration_minutes: settings.happy.buff_duration_minutes,
            buff_strength: settings.happy.buff_strength,
            experience_gain_factor: settings.progression.experience_gain_factor,
            skill_raise_per_cook: settings.progression.skill_raise_per_cook,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Current factor for a channel
    pub fn factor(&self, channel: StatChannel) -> f64 {
        self.factors
            .get(&channel)
            .map(|f| f.current)
            .unwrap_or(FACTOR_RANGE.0)
    }

    /// Factor in effect before the edit currently being swept, if any
    pub fn previous_factor(&self, channel: StatChannel) -> Option<f64> {
        self.factors.get(&channel).and_then(|f| f.previous)
    }

    /// Minimum bonus level for a perfect roll, 0 when disabled
    pub fn happy_required_level(&self) -> u32 {
        self.happy_required_level
    }

    pub fn buff_duration_minutes(&self) -> u32 {
        self.buff_duration_minutes
    }

    pub fn buff_strength(&self) -> f64 {
        self.buff_strength
    }

    pub fn experience_gain_factor(&self) -> f64 {
        self.experience_gain_factor
    }

    pub fn skill_raise_per_cook(&self) -> u32 {
        self.skill_raise_per_cook
    }

    /// Snapshot the live values as settings, e.g. to write them back to disk
    pub fn to_settings(&self) -> CookingSettings {
        CookingSettings {
            factors: FactorSettings {
                health: self.factor(StatChannel::Health),
                stamina: self.factor(StatChannel::Stamina),
                regen: self.factor(StatChannel::Regen),
                eitr: self.factor(StatChannel::Eitr),
            },
            happy: HappySettings {
                required_level: self.happy_required_level,
                buff_duration_minutes: self.buff_duration_minutes,
                buff_strength: self.buff_strength,
            },
            progression: ProgressionSettings {
                experience_gain_factor: self.experience_gain_factor,
                skill_raise_per_cook: self.skill_raise_per_cook,
            },
        }
    }

    /// Subscribe to setting changes
    pub fn subscribe(&mut self, listener: impl FnMut(&ConfigChange) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener, returns false if it was not subscribed
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, change: &ConfigChange) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(change);
        }
    }

    /// Start a factor edit: store the clamped value and keep the old one
    ///
    /// Returns `(old, new)`, or `None` if the clamped value is unchanged.
    pub(crate) fn begin_factor_change(
        &mut self,
        channel: StatChannel,
        value: f64,
    ) -> Option<(f64, f64)> {
        let new = clamp_float(channel.name(), value, FACTOR_RANGE);
        let entry = self.factors.entry(channel).or_insert(ChannelFactor {
            current: FACTOR_RANGE.0,
            previous: None,
        });
        if entry.current == new {
            return None;
        }
        let old = entry.current;
        entry.previous = Some(old);
        entry.current = new;
        Some((old, new))
    }

    /// Finish a factor edit once its sweep is done and notify listeners
    pub(crate) fn finish_factor_change(&mut self, channel: StatChannel) -> Option<ConfigChange> {
        let entry = self.factors.get_mut(&channel)?;
        let old = entry.previous.take()?;
        let change = ConfigChange::Factor {
            channel,
            old,
            new: entry.current,
        };
        self.notify(&change);
        Some(change)
    }

    pub fn set_happy_required_level(&mut self, value: u32) -> Option<ConfigChange> {
        let new = clamp_int("happy.required_level", value, HAPPY_LEVEL_RANGE);
        let old = std::mem::replace(&mut self.happy_required_level, new);
        self.emit_if(old != new, ConfigChange::HappyRequiredLevel { old, new })
    }

    pub fn set_buff_duration_minutes(&mut self, value: u32) -> Option<ConfigChange> {
        let new = clamp_int("happy.buff_duration_minutes", value, BUFF_DURATION_RANGE);
        let old = std::mem::replace(&mut self.buff_duration_minutes, new);
        let change = self.happy_buff_change();
        self.emit_if(old != new, change)
    }

    pub fn set_buff_strength(&mut self, value: f64) -> Option<ConfigChange> {
        let new = clamp_float("happy.buff_strength", value, BUFF_STRENGTH_RANGE);
        let old = std::mem::replace(&mut self.buff_strength, new);
        let change = self.happy_buff_change();
        self.emit_if(old != new, change)
    }

    pub fn set_experience_gain_factor(&mut self, value: f64) -> Option<ConfigChange> {
        let new = clamp_float(
            "progression.experience_gain_factor",
            value,
            EXPERIENCE_GAIN_RANGE,
        );
        let old = std::mem::replace(&mut self.experience_gain_factor, new);
        self.emit_if(old != new, ConfigChange::ExperienceGainFactor { old, new })
    }

    pub fn set_skill_raise_per_cook(&mut self, value: u32) -> Option<ConfigChange> {
        let old = std::mem::replace(&mut self.skill_raise_per_cook, value);
        self.emit_if(old != value, ConfigChange::SkillRaisePerCook { old, new: value })
    }

    fn happy_buff_change(&self) -> ConfigChange {
        ConfigChange::HappyBuff {
            duration_minutes: self.buff_duration_minutes,
            strength: self.buff_strength,
        }
    }

    fn emit_if(&mut self, changed: bool, change: ConfigChange) -> Option<ConfigChange> {
        if !changed {
            return None;
        }
        self.notify(&change);
        Some(change)
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        LiveConfig::from_settings(&CookingSettings::default())
    }
}

impl fmt::Debug for LiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveConfig")
            .field("factors", &self.factors)
            .field("happy_required_level", &self.happy_required_level)
            .field("buff_duration_minutes", &self.buff_duration_minutes)
            .field("buff_strength", &self.buff_strength)
            .field("experience_gain_factor", &self.experience_gain_factor)
            .field("skill_raise_per_cook", &self.skill_raise_per_cook)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
