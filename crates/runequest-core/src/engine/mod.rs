//! The game engine: single owner of all mutable simulation state.
//!
//! [`GameEngine`] holds the player record, the world entity registry, the
//! running action, the combat session, and the virtual-time [`Scheduler`]
//! that drives them. Nothing inside it spawns tasks or reads the wall
//! clock; time only moves when the caller invokes [`GameEngine::advance`].
//!
//! # Timer lines
//!
//! | Timer | Kind | Period |
//! |-------|------|--------|
//! | action progress | repeating, while an action runs | `timing.action_step_ms` |
//! | combat tick | repeating, while in combat | `timing.combat_tick_ms` |
//! | respawn | one-shot per harvested entity | `timing.respawn_delay_ms` |
//! | autosave | repeating, whole session | `timing.autosave_interval_ms` |
//! | chat poll | repeating, whole session | `timing.chat_poll_interval_ms` |
//!
//! # Exclusivity
//!
//! At most one of {running action, combat session} exists. Movement,
//! action starts, and combat starts are rejected (`false`) while either is
//! present.
//!
//! # Submodules
//!
//! - `actions` -- skilling actions and their completion effects.
//! - `combat` -- combat session lifecycle and tick handling.
//! - `world` -- harvest/respawn, item use, equipment, and the shop.

mod actions;
mod combat;
mod world;

use std::collections::BTreeMap;

use chrono::Utc;
use rand::Rng;
use runequest_types::{
    ActiveAction, ChatMessage, CombatSession, DEFAULT_SPAWN, EntityId, ItemId, LoadedPlayer,
    PlayerSnapshot, Skill,
};
use runequest_player::{ExperienceGain, LevelInfo, PlayerState, leveling};
use runequest_world::{WorldEntityManager, WorldTemplate};
use tracing::{debug, error, info, warn};

pub use actions::ActionEffect;

use crate::action::ActionScheduler;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::events::{ActivityLog, EngineEvent};
use crate::scheduler::{Fired, Scheduler, TimerId};

/// Payload of every timer registered by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    /// Advance the running action by one step.
    ActionStep,
    /// Resolve one combat tick.
    CombatTick,
    /// Reveal a harvested entity.
    Respawn(EntityId),
    /// Hand a snapshot to the persistence collaborator.
    AutoSave,
    /// Ask the chat collaborator for new messages.
    ChatPoll,
}

/// The simulation engine for one player session.
#[derive(Debug)]
pub struct GameEngine<R> {
    /// Tunables.
    config: GameConfig,
    /// Immutable world bootstrap data (map, items, locations).
    world: WorldTemplate,
    /// Mutable entity registry.
    entities: WorldEntityManager,
    /// The player record.
    player: PlayerState,
    /// The running action, if any.
    actions: ActionScheduler<ActionEffect>,
    /// Progress timer of the running action.
    action_timer: Option<TimerId>,
    /// The active combat session, if any.
    combat: Option<CombatSession>,
    /// Tick timer of the active combat session.
    combat_timer: Option<TimerId>,
    /// Pending respawn timers by entity.
    respawns: BTreeMap<EntityId, TimerId>,
    /// Virtual-time timer queue.
    scheduler: Scheduler<TimerKind>,
    /// Injected randomness source.
    rng: R,
    /// Player-facing messages.
    log: ActivityLog,
    /// Undrained notifications.
    events: Vec<EngineEvent>,
    /// Most recently fetched chat messages, newest first.
    chat: Vec<ChatMessage>,
    /// Set by [`GameEngine::shutdown`].
    shut_down: bool,
}

impl<R: Rng> GameEngine<R> {
    /// Build an engine for a loaded player.
    ///
    /// A saved position that is off the map or on water is reset to the
    /// default spawn. The autosave and chat poll timers start immediately.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Config`] for an invalid configuration,
    /// [`GameError::World`] for duplicate entity ids, or
    /// [`GameError::Scheduler`] if a periodic timer cannot be registered.
    pub fn new(world: WorldTemplate, loaded: LoadedPlayer, config: GameConfig, rng: R) -> Result<Self, GameError> {
        config.validate()?;
        let entities = WorldEntityManager::new(world.entities().iter().cloned())?;
        let mut player = PlayerState::from_loaded(world.items(), loaded);
        if !world.map().is_walkable(player.stats.position) {
            warn!(position = %player.stats.position, "saved position is not walkable, resetting to spawn");
            player.stats.position = DEFAULT_SPAWN;
        }

        let mut scheduler = Scheduler::new();
        scheduler.schedule_repeating(config.timing.autosave_interval_ms, TimerKind::AutoSave)?;
        scheduler.schedule_repeating(config.timing.chat_poll_interval_ms, TimerKind::ChatPoll)?;

        info!(
            username = %config.session.username,
            world = %config.world.name,
            entities = entities.len(),
            "engine started"
        );

        Ok(Self {
            actions: ActionScheduler::new(config.timing.action_step_ms),
            config,
            world,
            entities,
            player,
            action_timer: None,
            combat: None,
            combat_timer: None,
            respawns: BTreeMap::new(),
            scheduler,
            rng,
            log: ActivityLog::new(),
            events: Vec::new(),
            chat: Vec::new(),
            shut_down: false,
        })
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// Current virtual time in milliseconds.
    pub const fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// The configuration the engine was built with.
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Player name.
    pub fn username(&self) -> &str {
        &self.config.session.username
    }

    /// The player record.
    pub const fn player(&self) -> &PlayerState {
        &self.player
    }

    /// The world entity registry.
    pub const fn entities(&self) -> &WorldEntityManager {
        &self.entities
    }

    /// The world bootstrap data.
    pub const fn world(&self) -> &WorldTemplate {
        &self.world
    }

    /// The running action.
    pub fn active_action(&self) -> Option<ActiveAction> {
        self.actions.current()
    }

    /// The active combat session.
    pub const fn combat(&self) -> Option<&CombatSession> {
        self.combat.as_ref()
    }

    /// Whether an action or a combat session is in progress.
    pub const fn is_busy(&self) -> bool {
        self.actions.is_running() || self.combat.is_some()
    }

    /// Whether [`GameEngine::shutdown`] has been called.
    pub const fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Level and progress of `skill`.
    pub fn level_info(&self, skill: Skill) -> LevelInfo {
        leveling::level_info(self.player.stats.xp_for(skill))
    }

    /// Activity log lines, newest first.
    pub const fn log(&self) -> &ActivityLog {
        &self.log
    }

    /// Most recently fetched chat messages, newest first.
    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    /// Number of live timers.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    /// Take every notification emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Snapshot the player for persistence.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.player.snapshot(self.username(), self.now_ms(), Utc::now())
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Step the player by `(dx, dy)`.
    ///
    /// Rejected while busy, off the map, or onto water.
    pub fn move_by(&mut self, dx: i32, dy: i32) -> bool {
        if self.shut_down || self.is_busy() {
            debug!(dx, dy, "move rejected: player is busy");
            return false;
        }
        match self.player.move_by(self.world.map(), dx, dy) {
            Ok(position) => {
                self.events.push(EngineEvent::PlayerMoved { position });
                true
            }
            Err(err) => {
                debug!(dx, dy, error = %err, "move rejected");
                false
            }
        }
    }

    /// Grant experience and emit a level-up when a boundary is crossed.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Player`] if the experience counter would overflow.
    pub fn apply_experience(&mut self, skill: Skill, amount: u64) -> Result<ExperienceGain, GameError> {
        let gain = self.player.apply_experience(skill, amount)?;
        self.record_experience(&gain);
        Ok(gain)
    }

    /// Adjust an inventory stack. Unknown ids are ignored and return `None`.
    pub fn add_item(&mut self, id: &ItemId, delta: i64) -> Option<u32> {
        self.player.inventory.add_item(self.world.items(), id, delta)
    }

    /// Replace the cached chat messages.
    pub fn set_chat(&mut self, messages: Vec<ChatMessage>) {
        self.chat = messages;
    }

    /// Append a player-facing line to the activity log.
    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line);
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Move virtual time forward by `delta_ms`, firing every timer that
    /// comes due in `(due time, registration order)`.
    pub fn advance(&mut self, delta_ms: u64) {
        if self.shut_down {
            return;
        }
        let deadline = self.scheduler.now_ms().saturating_add(delta_ms);
        while let Some(fired) = self.scheduler.pop_due(deadline) {
            self.dispatch(fired);
        }
        self.scheduler.settle(deadline);
    }

    /// Route a fired timer to its handler.
    fn dispatch(&mut self, fired: Fired<TimerKind>) {
        match fired.kind {
            TimerKind::ActionStep => self.on_action_step(),
            TimerKind::CombatTick => self.on_combat_tick(),
            TimerKind::Respawn(id) => self.on_respawn(&id),
            TimerKind::AutoSave => {
                debug!(at_ms = fired.at_ms, "autosave due");
                let snapshot = self.snapshot();
                self.events.push(EngineEvent::SaveDue(Box::new(snapshot)));
            }
            TimerKind::ChatPoll => self.events.push(EngineEvent::ChatPollDue),
        }
    }

    /// Cancel every timer and clear the running action and combat session
    /// without applying their effects. Later calls to
    /// [`GameEngine::advance`] do nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.scheduler.cancel_all();
        self.action_timer = None;
        self.combat_timer = None;
        self.respawns.clear();
        self.actions.cancel();
        self.combat = None;
        self.shut_down = true;
        info!(at_ms = self.now_ms(), "engine shut down");
    }

    // -----------------------------------------------------------------------
    // Shared helpers
    // -----------------------------------------------------------------------

    /// Emit the level-up event and log line for a grant.
    fn record_experience(&mut self, gain: &ExperienceGain) {
        if gain.leveled_up() {
            self.events.push(EngineEvent::LevelUp {
                skill: gain.skill,
                level: gain.new_level,
            });
            self.log.push(format!(
                "Congratulations! You just advanced your {} level to {}.",
                gain.skill, gain.new_level
            ));
        }
    }

    /// Grant experience from inside a timer handler, logging overflow.
    fn grant(&mut self, skill: Skill, amount: u64) {
        if let Err(err) = self.apply_experience(skill, amount) {
            error!(skill = %skill, amount, error = %err, "experience grant failed");
        }
    }

    /// Register a timer, logging failure instead of propagating it.
    fn schedule(&mut self, delay_ms: u64, repeating: bool, kind: TimerKind) -> Option<TimerId> {
        let result = if repeating {
            self.scheduler.schedule_repeating(delay_ms, kind)
        } else {
            self.scheduler.schedule_once(delay_ms, kind)
        };
        result
            .inspect_err(|err| error!(error = %err, "failed to register timer"))
            .ok()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Deterministic engine fixtures shared by the submodule tests.

    use rand::RngCore;
    use runequest_world::create_starting_world;

    use super::*;

    /// Returns the same word forever. Zero makes every combat swing land for
    /// the minimum; all ones makes every swing miss.
    #[derive(Debug)]
    pub struct FixedRng(pub u64);

    impl RngCore for FixedRng {
        #[allow(clippy::cast_possible_truncation)]
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            let bytes = self.0.to_le_bytes();
            for (i, byte) in dst.iter_mut().enumerate() {
                *byte = bytes.get(i % 8).copied().unwrap_or(0);
            }
        }
    }

    /// A fresh engine on the default world with the given fixed RNG word.
    #[allow(clippy::unwrap_used)]
    pub fn fresh(word: u64) -> GameEngine<FixedRng> {
        GameEngine::new(
            create_starting_world(),
            LoadedPlayer::default(),
            GameConfig::default(),
            FixedRng(word),
        )
        .unwrap()
    }
}
