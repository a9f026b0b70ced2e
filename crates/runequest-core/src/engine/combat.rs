//! Combat session lifecycle.
//!
//! Idle -> InCombat -> Idle. A session is created by
//! [`GameEngine::start_combat`] together with a repeating tick timer. The
//! tick handler resolves one exchange of blows through
//! [`runequest_player::resolve_tick`], turns the report into events and log
//! lines, and tears the session down (timer included) when either side
//! drops.

use rand::Rng;
use runequest_player::combat::new_session;
use runequest_player::{Swing, TickOutcome, resolve_tick};
use runequest_types::Combatant;
use tracing::{debug, error, info};

use super::{GameEngine, TimerKind};
use crate::events::EngineEvent;

impl<R: Rng> GameEngine<R> {
    /// Start fighting `enemy` with `enemy_hp` hitpoints.
    ///
    /// Returns `false` and changes nothing while an action or combat
    /// session exists, or when the enemy has no hitpoints.
    pub fn start_combat(&mut self, enemy: &str, enemy_hp: i32) -> bool {
        if self.shut_down || self.is_busy() {
            debug!(enemy, "combat rejected: player is busy");
            return false;
        }
        if enemy_hp <= 0 {
            debug!(enemy, enemy_hp, "combat rejected: enemy already down");
            return false;
        }
        let Some(timer) = self.schedule(self.config.timing.combat_tick_ms, true, TimerKind::CombatTick) else {
            return false;
        };
        self.combat = Some(new_session(enemy, enemy_hp));
        self.combat_timer = Some(timer);
        self.events.push(EngineEvent::CombatStarted {
            enemy: enemy.to_owned(),
        });
        self.log.push(format!("You started combat with {enemy}."));
        info!(enemy, enemy_hp, "combat started");
        true
    }

    /// Leave combat without resolving it.
    pub fn flee(&mut self) -> bool {
        let Some(session) = self.end_combat() else {
            return false;
        };
        self.log.push(format!("You ran away from the {}.", session.enemy));
        true
    }

    /// Handle one combat tick timer.
    pub(super) fn on_combat_tick(&mut self) {
        let Some(mut session) = self.combat.take() else {
            self.end_combat();
            return;
        };

        let report = match resolve_tick(
            &mut self.player,
            &mut session,
            &self.config.combat,
            self.world.items(),
            &mut self.rng,
        ) {
            Ok(report) => report,
            Err(err) => {
                error!(error = %err, enemy = %session.enemy, "combat tick failed, ending session");
                self.end_combat();
                return;
            }
        };

        let enemy = session.enemy.clone();
        match report.player_swing {
            Swing::Hit(damage) => {
                self.events.push(EngineEvent::Hitsplat {
                    target: Combatant::Enemy,
                    damage,
                });
                self.log.push(format!("You hit the {enemy} for {damage} damage."));
            }
            Swing::Miss => self.log.push(format!("You missed the {enemy}.")),
        }
        match report.enemy_swing {
            Some(Swing::Hit(damage)) => {
                self.events.push(EngineEvent::Hitsplat {
                    target: Combatant::Player,
                    damage,
                });
                self.log.push(format!("The {enemy} hits you for {damage} damage."));
            }
            Some(Swing::Miss) => self.log.push(format!("The {enemy} missed you.")),
            None => {}
        }
        for gain in &report.experience {
            self.record_experience(gain);
        }

        match report.outcome {
            TickOutcome::Continue => self.combat = Some(session),
            TickOutcome::EnemyDefeated { gold, loot } => {
                self.end_combat();
                self.log.push(format!("You defeated the {enemy}!"));
                if let Some((item, quantity)) = &loot {
                    let name = self.world.items().get(item).map_or(item.as_str(), |t| t.name.as_str());
                    self.log.push(format!("You loot {quantity} {name}."));
                }
                self.log.push(format!("You found {gold} GP."));
                info!(enemy = %enemy, gold, loot = ?loot, "enemy defeated");
                self.events.push(EngineEvent::EnemyDefeated {
                    enemy: enemy.clone(),
                    gold,
                    loot,
                });
            }
            TickOutcome::PlayerDefeated => {
                self.end_combat();
                self.log.push("You have died! You wake up with full health.");
                self.events.push(EngineEvent::PlayerDefeated { enemy: enemy.clone() });
                info!(enemy = %enemy, "player defeated");
            }
        }
    }

    /// Clear the session and cancel its tick timer.
    fn end_combat(&mut self) -> Option<runequest_types::CombatSession> {
        if let Some(timer) = self.combat_timer.take() {
            self.scheduler.cancel(timer);
        }
        self.combat.take()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use runequest_types::{ActionKind, ItemId, LocationId, Position, Skill};
    use runequest_world::{items, locations};

    use super::super::ActionEffect;
    use super::super::test_support::fresh;
    use super::*;

    #[test]
    fn combat_and_actions_exclude_each_other() {
        let mut engine = fresh(0);
        assert!(engine.start_combat("Man", 15));
        assert!(!engine.start_combat("Man", 15));
        let destination = LocationId::new(locations::FOREST);
        assert!(!engine.start_action(ActionKind::Traveling, 2_000, ActionEffect::Travel { destination }));
        assert!(!engine.move_by(1, 0));

        let mut engine = fresh(0);
        assert!(engine.travel(&LocationId::new(locations::FOREST)));
        assert!(!engine.start_combat("Man", 15));
    }

    #[test]
    fn first_tick_after_combat_period() {
        let mut engine = fresh(u64::MAX);
        engine.start_combat("Man", 15);
        engine.advance(2_399);
        assert_eq!(engine.log().latest(), Some("You started combat with Man."));
        engine.advance(1);
        assert_eq!(engine.log().latest(), Some("The Man missed you."));
    }

    #[test]
    fn one_hp_enemy_dies_on_first_hit() {
        let mut engine = fresh(0);
        engine.start_combat("Man", 1);
        engine.advance(2_400);

        assert!(engine.combat().is_none());
        assert_eq!(engine.pending_timers(), 2);
        assert_eq!(engine.player().stats.xp_for(Skill::Attack), 14);
        assert_eq!(engine.player().stats.gold, 5);
        assert_eq!(engine.player().inventory.quantity(&ItemId::new(items::SHRIMP)), 1);
        assert_eq!(engine.player().stats.hp, 10);

        let lines: Vec<&str> = engine.log().iter().take(4).collect();
        assert_eq!(
            lines,
            vec![
                "You found 5 GP.",
                "You loot 1 Raw Shrimp.",
                "You defeated the Man!",
                "You hit the Man for 1 damage."
            ]
        );
        let events = engine.drain_events();
        assert!(events.contains(&EngineEvent::Hitsplat {
            target: Combatant::Enemy,
            damage: 1
        }));
        assert!(events.contains(&EngineEvent::EnemyDefeated {
            enemy: "Man".to_owned(),
            gold: 5,
            loot: Some((ItemId::new(items::SHRIMP), 1)),
        }));
    }

    #[test]
    fn downed_enemy_is_rejected() {
        let mut engine = fresh(u64::MAX);
        assert!(!engine.start_combat("Ghost", 0));
        assert!(!engine.start_combat("Ghost", -3));
        assert!(engine.combat().is_none());
        assert_eq!(engine.pending_timers(), 2);

        engine.advance(7_200);
        assert!(engine.log().iter().all(|l| !l.contains("Ghost")));
        assert_eq!(engine.player().stats.hp, 10);
    }

    #[test]
    fn player_dies_after_ten_hits() {
        let mut engine = fresh(0);
        engine.start_combat("Man", 15);
        engine.advance(2_400 * 9);
        assert_eq!(engine.player().stats.hp, 1);
        assert!(engine.combat().is_some());

        engine.advance(2_400);
        assert!(engine.combat().is_none());
        assert_eq!(engine.player().stats.hp, 10);
        assert!(engine.drain_events().contains(&EngineEvent::PlayerDefeated {
            enemy: "Man".to_owned()
        }));

        // No further ticks.
        engine.advance(24_000);
        assert!(engine.drain_events().iter().all(|e| !matches!(e, EngineEvent::Hitsplat { .. })));
    }

    #[test]
    fn npc_interaction_uses_configured_hp() {
        let mut engine = fresh(0);
        engine.player.stats.position = Position::new(10, 9);
        assert!(engine.interact(&runequest_types::EntityId::new("man_1")));
        assert_eq!(engine.combat().map(|c| c.max_hp), Some(15));
    }

    #[test]
    fn flee_stops_ticks() {
        let mut engine = fresh(0);
        engine.start_combat("Man", 15);
        assert!(engine.flee());
        engine.advance(10_000);
        assert_eq!(engine.player().stats.hp, 10);
        assert!(!engine.flee());
    }
}
