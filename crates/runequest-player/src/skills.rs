//! Experience accounting per skill.
//!
//! Experience only ever grows. Every mutation consults the leveling model
//! before and after, so a level-up crossing is reported exactly once, on the
//! mutation that caused it.

use std::collections::BTreeMap;

use runequest_types::Skill;
use tracing::info;

use crate::error::PlayerError;
use crate::leveling;

/// The result of a single experience grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperienceGain {
    /// Skill that received the experience.
    pub skill: Skill,
    /// Experience granted.
    pub amount: u64,
    /// Total experience after the grant.
    pub total_xp: u64,
    /// Level before the grant.
    pub old_level: u32,
    /// Level after the grant.
    pub new_level: u32,
}

impl ExperienceGain {
    /// Whether the grant crossed at least one level boundary.
    pub const fn leveled_up(&self) -> bool {
        self.new_level > self.old_level
    }
}

/// Add `amount` experience to `skill`.
///
/// Missing skills start from zero.
///
/// # Errors
///
/// Returns [`PlayerError::ExperienceOverflow`] if the total would exceed
/// `u64::MAX`. The map is left untouched in that case.
pub fn add_experience(
    xp: &mut BTreeMap<Skill, u64>,
    skill: Skill,
    amount: u64,
) -> Result<ExperienceGain, PlayerError> {
    let current = xp.get(&skill).copied().unwrap_or(0);
    let total_xp = current
        .checked_add(amount)
        .ok_or(PlayerError::ExperienceOverflow(skill))?;

    let old_level = leveling::level_for(current);
    let new_level = leveling::level_for(total_xp);
    xp.insert(skill, total_xp);

    if new_level > old_level {
        info!(skill = %skill, old_level, new_level, total_xp, "level up");
    }

    Ok(ExperienceGain {
        skill,
        amount,
        total_xp,
        old_level,
        new_level,
    })
}

/// Current level of `skill`.
pub fn level_of(xp: &BTreeMap<Skill, u64>, skill: Skill) -> u32 {
    leveling::level_for(xp.get(&skill).copied().unwrap_or(0))
}

/// Fill in any skill missing from `xp` with zero experience.
pub fn ensure_all_skills(xp: &mut BTreeMap<Skill, u64>) {
    for skill in Skill::ALL {
        xp.entry(skill).or_insert(0);
    }
}
