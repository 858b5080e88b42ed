//! Skill progression seam: the host's skill system behind a trait

/// Request to raise the cooking skill, sent after each successful cook
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillRaise {
    /// Raw amount requested per cook
    pub amount: f64,
    /// Configured experience gain factor
    pub gain_factor: f64,
}

impl SkillRaise {
    /// Experience after the gain factor
    pub fn experience(&self) -> f64 {
        self.amount * self.gain_factor
    }
}

/// The host's skill system as seen by the cooking engine
pub trait SkillProgression {
    /// Current cooking skill, normalized to [0, 1]
    fn skill_factor(&self) -> f64;

    /// Fire-and-forget request to raise the skill
    fn raise_skill(&mut self, raise: SkillRaise);
}

/// A skill that never changes; remembers the raises it was asked for
#[derive(Debug, Clone, Default)]
pub struct FixedProgression {
    pub skill_factor: f64,
    pub raises: Vec<SkillRaise>,
}

impl FixedProgression {
    pub fn new(skill_factor: f64) -> Self {
        FixedProgression {
            skill_factor,
            raises: Vec::new(),
        }
    }

    /// Total experience requested so far
    pub fn total_experience(&self) -> f64 {
        self.raises.iter().map(SkillRaise::experience).sum()
    }
}

impl SkillProgression for FixedProgression {
    fn skill_factor(&self) -> f64 {
        self.skill_factor
    }

    fn raise_skill(&mut self, raise: SkillRaise) {
        self.raises.push(raise);
    }
}
