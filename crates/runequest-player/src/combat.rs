//! Combat tick resolution between the player and a single enemy.
//!
//! One call to [`resolve_tick`] is one combat tick:
//!
//! 1. The player swings. Accuracy is `min(0.95, 0.60 + attack * 0.005)`; a
//!    landed hit deals `1..=max_hit` and grants attack experience. If the
//!    enemy drops to zero hp or below it is defeated: bonus experience, loot
//!    and gold are awarded and the enemy does not swing back.
//! 2. A surviving enemy swings. Accuracy is `max(0.10, 0.40 - defence *
//!    0.005)`; a landed hit deals `1..=enemy_max_hit`, floors player hp at
//!    zero and grants defence experience. At zero hp the player is defeated
//!    and restored to full health.
//!
//! Scheduling the ticks and ending the session belong to the engine; this
//! module only mutates the player and the session record.

use rand::Rng;
use runequest_types::{CombatSession, ItemId, Skill};
use runequest_world::ItemCatalog;
use tracing::debug;

use crate::config::CombatConfig;
use crate::error::PlayerError;
use crate::skills::ExperienceGain;
use crate::state::PlayerState;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Player hit chance at attack level 0.
pub const PLAYER_BASE_ACCURACY: f64 = 0.60;

/// Player hit chance gained per attack level.
pub const PLAYER_ACCURACY_PER_LEVEL: f64 = 0.005;

/// Upper bound on player hit chance.
pub const PLAYER_MAX_ACCURACY: f64 = 0.95;

/// Enemy hit chance against defence level 0.
pub const ENEMY_BASE_ACCURACY: f64 = 0.40;

/// Enemy hit chance lost per player defence level.
pub const ENEMY_ACCURACY_PER_LEVEL: f64 = 0.005;

/// Lower bound on enemy hit chance.
pub const ENEMY_MIN_ACCURACY: f64 = 0.10;

/// Strength levels per extra point of max hit.
const STRENGTH_PER_MAX_HIT: u32 = 8;

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// Player hit chance for the given attack level.
pub fn player_accuracy(attack_level: u32) -> f64 {
    f64::from(attack_level)
        .mul_add(PLAYER_ACCURACY_PER_LEVEL, PLAYER_BASE_ACCURACY)
        .min(PLAYER_MAX_ACCURACY)
}

/// Enemy hit chance against the given defence level.
pub fn enemy_accuracy(defence_level: u32) -> f64 {
    f64::from(defence_level)
        .mul_add(-ENEMY_ACCURACY_PER_LEVEL, ENEMY_BASE_ACCURACY)
        .max(ENEMY_MIN_ACCURACY)
}

/// Player max hit: `1 + floor(strength / 8) + bonus`.
pub const fn max_hit(strength_level: u32, bonus: u32) -> u32 {
    1_u32
        .saturating_add(strength_level / STRENGTH_PER_MAX_HIT)
        .saturating_add(bonus)
}

/// Start a session against a fresh enemy.
pub fn new_session(enemy: &str, hp: i32) -> CombatSession {
    CombatSession {
        enemy: enemy.to_owned(),
        hp,
        max_hp: hp,
    }
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// One attack roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swing {
    /// The attack landed for this much damage.
    Hit(u32),
    /// The attack missed.
    Miss,
}

/// How a tick left the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Both sides are still standing.
    Continue,
    /// The enemy dropped to zero hp.
    EnemyDefeated {
        /// Gold awarded.
        gold: u64,
        /// Loot item and quantity, if the item is in the catalog.
        loot: Option<(ItemId, u32)>,
    },
    /// The player dropped to zero hp and was restored to full health.
    PlayerDefeated,
}

impl TickOutcome {
    /// Whether the session is over.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Everything that happened during one tick, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// The player's swing.
    pub player_swing: Swing,
    /// The enemy's swing, absent when the enemy was defeated first.
    pub enemy_swing: Option<Swing>,
    /// Experience grants in the order they were applied.
    pub experience: Vec<ExperienceGain>,
    /// Resulting state of the session.
    pub outcome: TickOutcome,
}

/// Roll a swing: hit if a uniform draw falls below `accuracy`.
fn swing<R: Rng + ?Sized>(rng: &mut R, accuracy: f64, max_damage: u32) -> Swing {
    if rng.random::<f64>() < accuracy {
        Swing::Hit(rng.random_range(1..=max_damage.max(1)))
    } else {
        Swing::Miss
    }
}

/// Resolve one combat tick.
///
/// # Errors
///
/// Returns an error only on arithmetic overflow of experience or gold.
pub fn resolve_tick<R: Rng + ?Sized>(
    player: &mut PlayerState,
    session: &mut CombatSession,
    config: &CombatConfig,
    catalog: &ItemCatalog,
    rng: &mut R,
) -> Result<TickReport, PlayerError> {
    let mut experience = Vec::new();

    // Player attack.
    let accuracy = player_accuracy(player.level(Skill::Attack));
    let ceiling = max_hit(player.level(Skill::Strength), player.max_hit_bonus());
    let player_swing = swing(rng, accuracy, ceiling);

    if let Swing::Hit(damage) = player_swing {
        session.hp = session
            .hp
            .saturating_sub(i32::try_from(damage).unwrap_or(i32::MAX));
        experience.push(player.apply_experience(Skill::Attack, config.attack_xp_per_hit)?);
        debug!(enemy = %session.enemy, damage, enemy_hp = session.hp, "player hit");
    }

    // A downed enemy never swings back.
    if session.hp <= 0 {
        experience.push(player.apply_experience(Skill::Attack, config.defeat_bonus_xp)?);
        let loot = player
            .inventory
            .add_item(catalog, &config.loot_item, i64::from(config.loot_quantity))
            .map(|_| (config.loot_item.clone(), config.loot_quantity));
        let low = config.gold_min.min(config.gold_max);
        let high = config.gold_min.max(config.gold_max);
        let gold = rng.random_range(low..=high);
        player.add_gold(gold)?;
        return Ok(TickReport {
            player_swing,
            enemy_swing: None,
            experience,
            outcome: TickOutcome::EnemyDefeated { gold, loot },
        });
    }

    // Enemy attack.
    let accuracy = enemy_accuracy(player.level(Skill::Defence));
    let enemy_swing = swing(rng, accuracy, config.enemy_max_hit);
    let mut outcome = TickOutcome::Continue;

    if let Swing::Hit(damage) = enemy_swing {
        let remaining = player.take_damage(damage);
        experience.push(player.apply_experience(Skill::Defence, config.defence_xp_per_hit)?);
        debug!(enemy = %session.enemy, damage, player_hp = remaining, "enemy hit");

        if remaining == 0 {
            player.restore_hp();
            outcome = TickOutcome::PlayerDefeated;
        }
    }

    Ok(TickReport {
        player_swing,
        enemy_swing: Some(enemy_swing),
        experience,
        outcome,
    })
}
