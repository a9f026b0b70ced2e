//! Real-time session loop.
//!
//! [`run_session`] is the top-level async function that drives a
//! [`GameEngine`] against the wall clock:
//!
//! - **Frames**: every `timing.frame_interval_ms` the engine is advanced to
//!   the elapsed real time, and the drained events are handed to a
//!   [`FrameObserver`].
//! - **Commands**: [`SessionCommand`]s arrive over an mpsc channel and are
//!   applied to the engine between frames.
//! - **Autosave / chat**: `SaveDue` and `ChatPollDue` events spawn tasks on a
//!   [`JoinSet`]; their failures are logged and never stop the loop.
//! - **Bounded run**: the loop ends on [`SessionCommand::Shutdown`], when
//!   every command sender is dropped, or after `session.max_real_time_seconds`.
//! - **Clean shutdown**: outstanding tasks are awaited, the engine is shut
//!   down, and a final snapshot is saved.

use std::sync::Arc;

use rand::Rng;
use runequest_types::{
    ActiveAction, ChatMessage, CombatSession, EntityId, ItemId, LocationId, PlayerSnapshot, Position,
    Skill,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::chat::{ChatError, ChatService};
use crate::engine::GameEngine;
use crate::events::EngineEvent;
use crate::persistence::{PersistenceError, PlayerRepository};

/// Log lines included in a [`SessionStatus`].
const STATUS_LOG_LINES: usize = 5;

/// Errors that end a session abnormally.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The final save after shutdown failed.
    #[error("final save failed: {source}")]
    FinalSave {
        /// The underlying repository error.
        #[from]
        source: PersistenceError,
    },
}

/// A player request delivered to the running session.
#[derive(Debug)]
pub enum SessionCommand {
    /// Step by `(dx, dy)`.
    Move {
        /// Horizontal step.
        dx: i32,
        /// Vertical step.
        dy: i32,
    },
    /// Interact with a world entity.
    Interact(EntityId),
    /// Leave the current fight.
    Flee,
    /// Abandon the running action.
    Cancel,
    /// Smelt a bronze bar at a nearby forge.
    Smelt,
    /// Travel to a named location.
    Travel(LocationId),
    /// Consume a healing item.
    UseItem(ItemId),
    /// Equip or unequip an item.
    Equip(ItemId),
    /// Buy an item at a nearby bank.
    Buy(ItemId),
    /// Post a chat message.
    Chat(String),
    /// Reply with the current [`SessionStatus`].
    Status(oneshot::Sender<SessionStatus>),
    /// End the session.
    Shutdown,
}

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndReason {
    /// A [`SessionCommand::Shutdown`] was received.
    Shutdown,
    /// Every command sender was dropped.
    ChannelClosed,
    /// `session.max_real_time_seconds` elapsed.
    TimeLimit,
}

/// Result of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Why the session ended.
    pub end_reason: SessionEndReason,
    /// Engine virtual time at shutdown.
    pub virtual_ms: u64,
    /// Frames processed.
    pub frames: u64,
    /// Commands received.
    pub commands: u64,
    /// Periodic saves that succeeded.
    pub saves: u64,
    /// Periodic saves that failed.
    pub failed_saves: u64,
}

/// Read-only view of the player for status requests.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    /// Player name.
    pub username: String,
    /// Grid position.
    pub position: Position,
    /// Location tag.
    pub location: LocationId,
    /// Current hitpoints.
    pub hp: u32,
    /// Maximum hitpoints.
    pub max_hp: u32,
    /// Coins carried.
    pub gold: u64,
    /// Level and total experience per skill.
    pub skills: Vec<(Skill, u32, u64)>,
    /// Held items with a non-zero quantity, by display name.
    pub inventory: Vec<(String, u32)>,
    /// Equipped item.
    pub equipped: Option<ItemId>,
    /// The running action.
    pub action: Option<ActiveAction>,
    /// The current fight.
    pub combat: Option<CombatSession>,
    /// Most recent activity log lines, newest first.
    pub recent_log: Vec<String>,
    /// Cached chat messages, newest first.
    pub chat: Vec<ChatMessage>,
    /// Engine virtual time.
    pub virtual_ms: u64,
}

impl SessionStatus {
    /// Capture the status of `engine`.
    pub fn capture<R: Rng>(engine: &GameEngine<R>) -> Self {
        let player = engine.player();
        Self {
            username: engine.username().to_owned(),
            position: player.stats.position,
            location: player.location.clone(),
            hp: player.stats.hp,
            max_hp: player.stats.max_hp,
            gold: player.stats.gold,
            skills: Skill::ALL
                .iter()
                .map(|&skill| (skill, player.level(skill), player.stats.xp_for(skill)))
                .collect(),
            inventory: player
                .inventory
                .visible()
                .map(|stack| (stack.template.name.clone(), stack.quantity))
                .collect(),
            equipped: player.equipped.clone(),
            action: engine.active_action(),
            combat: engine.combat().cloned(),
            recent_log: engine
                .log()
                .iter()
                .take(STATUS_LOG_LINES)
                .map(str::to_owned)
                .collect(),
            chat: engine.chat().to_vec(),
            virtual_ms: engine.now_ms(),
        }
    }
}

/// Called after every frame.
///
/// Implementations render or forward what happened. `new_lines` are the
/// activity log lines added since the previous frame, oldest first.
pub trait FrameObserver: Send {
    /// Called once per frame, after the engine has been advanced.
    fn on_frame(&mut self, events: &[EngineEvent], new_lines: &[&str]);
}

/// A frame observer that ignores everything.
pub struct NoOpObserver;

impl FrameObserver for NoOpObserver {
    fn on_frame(&mut self, _events: &[EngineEvent], _new_lines: &[&str]) {}
}

/// Outcome of a background task.
#[derive(Debug)]
enum TaskOutcome {
    Saved { taken_at_ms: u64 },
    SaveFailed(PersistenceError),
    ChatFetched(Vec<ChatMessage>),
    ChatPosted(ChatMessage),
    ChatFailed(ChatError),
}

/// Collaborators the session loop talks to.
#[derive(Clone)]
pub struct SessionServices {
    /// Player storage.
    pub repository: Arc<dyn PlayerRepository>,
    /// Global chat.
    pub chat: Arc<dyn ChatService>,
}

/// Mutable counters threaded through the loop.
#[derive(Debug, Default)]
struct Counters {
    frames: u64,
    commands: u64,
    saves: u64,
    failed_saves: u64,
    seen_lines: u64,
}

/// Run a session until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError::FinalSave`] if the snapshot taken after shutdown
/// cannot be stored. Periodic save failures are only logged.
pub async fn run_session<R: Rng>(
    engine: &mut GameEngine<R>,
    services: &SessionServices,
    mut commands: mpsc::Receiver<SessionCommand>,
    observer: &mut dyn FrameObserver,
) -> Result<SessionSummary, RunnerError> {
    let timing = engine.config().timing.clone();
    let session = engine.config().session.clone();
    let limit = (session.max_real_time_seconds > 0)
        .then_some(Duration::from_secs(session.max_real_time_seconds));

    let started = Instant::now();
    let mut frame = tokio::time::interval(Duration::from_millis(timing.frame_interval_ms));
    frame.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();
    let mut counters = Counters {
        seen_lines: engine.log().total_pushed(),
        ..Counters::default()
    };

    info!(
        username = %session.username,
        frame_interval_ms = timing.frame_interval_ms,
        max_real_time_seconds = session.max_real_time_seconds,
        "session starting"
    );

    // Show the chat straight away instead of after the first poll period.
    spawn_chat_fetch(&mut tasks, services, session.chat_fetch_limit);

    let end_reason = loop {
        tokio::select! {
            _ = frame.tick() => {
                let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                engine.advance(elapsed_ms.saturating_sub(engine.now_ms()));
                counters.frames = counters.frames.saturating_add(1);

                let events = engine.drain_events();
                // Several autosaves in one frame collapse into the newest snapshot.
                let mut latest_save = None;
                for event in &events {
                    match event {
                        EngineEvent::SaveDue(snapshot) => latest_save = Some(snapshot.as_ref()),
                        EngineEvent::ChatPollDue => {
                            spawn_chat_fetch(&mut tasks, services, session.chat_fetch_limit);
                        }
                        _ => {}
                    }
                }
                if let Some(snapshot) = latest_save {
                    spawn_save(&mut tasks, services, snapshot.clone());
                }
                let new_lines = engine.log().since(counters.seen_lines);
                observer.on_frame(&events, &new_lines);
                counters.seen_lines = engine.log().total_pushed();

                if limit.is_some_and(|limit| started.elapsed() >= limit) {
                    info!(elapsed_ms, "real-time limit reached");
                    break SessionEndReason::TimeLimit;
                }
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    info!("command channel closed");
                    break SessionEndReason::ChannelClosed;
                };
                counters.commands = counters.commands.saturating_add(1);
                if matches!(command, SessionCommand::Shutdown) {
                    info!("shutdown requested");
                    break SessionEndReason::Shutdown;
                }
                apply_command(engine, services, &mut tasks, command);
            }
            Some(joined) = tasks.join_next() => {
                match joined {
                    Ok(outcome) => handle_outcome(engine, &mut counters, outcome, session.chat_fetch_limit),
                    Err(err) => warn!(error = %err, "background task failed to complete"),
                }
            }
        }
    };

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => handle_outcome(engine, &mut counters, outcome, session.chat_fetch_limit),
            Err(err) => warn!(error = %err, "background task failed to complete"),
        }
    }

    engine.shutdown();
    let snapshot = engine.snapshot();
    services.repository.save(&snapshot).await?;
    info!(username = %snapshot.username, "final save complete");

    Ok(SessionSummary {
        end_reason,
        virtual_ms: engine.now_ms(),
        frames: counters.frames,
        commands: counters.commands,
        saves: counters.saves,
        failed_saves: counters.failed_saves,
    })
}

/// Apply one non-shutdown command to the engine.
fn apply_command<R: Rng>(
    engine: &mut GameEngine<R>,
    services: &SessionServices,
    tasks: &mut JoinSet<TaskOutcome>,
    command: SessionCommand,
) {
    let accepted = match command {
        SessionCommand::Move { dx, dy } => engine.move_by(dx, dy),
        SessionCommand::Interact(id) => engine.interact(&id),
        SessionCommand::Flee => engine.flee(),
        SessionCommand::Cancel => engine.cancel_action(),
        SessionCommand::Smelt => engine.smelt(),
        SessionCommand::Travel(destination) => engine.travel(&destination),
        SessionCommand::UseItem(id) => engine.use_item(&id),
        SessionCommand::Equip(id) => engine.toggle_equip(&id),
        SessionCommand::Buy(id) => engine.buy(&id),
        SessionCommand::Chat(message) => {
            let chat = Arc::clone(&services.chat);
            let username = engine.username().to_owned();
            tasks.spawn(async move {
                match chat.post(&username, &message).await {
                    Ok(posted) => TaskOutcome::ChatPosted(posted),
                    Err(err) => TaskOutcome::ChatFailed(err),
                }
            });
            true
        }
        SessionCommand::Status(reply) => {
            if reply.send(SessionStatus::capture(engine)).is_err() {
                debug!("status requester went away");
            }
            true
        }
        SessionCommand::Shutdown => false,
    };
    if !accepted {
        debug!("command rejected");
    }
}

/// Fold a finished background task back into the engine.
fn handle_outcome<R: Rng>(
    engine: &mut GameEngine<R>,
    counters: &mut Counters,
    outcome: TaskOutcome,
    chat_limit: usize,
) {
    match outcome {
        TaskOutcome::Saved { taken_at_ms } => {
            counters.saves = counters.saves.saturating_add(1);
            debug!(taken_at_ms, "autosave stored");
        }
        TaskOutcome::SaveFailed(err) => {
            counters.failed_saves = counters.failed_saves.saturating_add(1);
            warn!(error = %err, "autosave failed, will retry next period");
        }
        TaskOutcome::ChatFetched(messages) => engine.set_chat(messages),
        TaskOutcome::ChatPosted(posted) => {
            let mut messages = Vec::with_capacity(chat_limit);
            messages.push(posted);
            messages.extend(engine.chat().iter().take(chat_limit.saturating_sub(1)).cloned());
            engine.set_chat(messages);
        }
        TaskOutcome::ChatFailed(err) => {
            warn!(error = %err, "chat request failed");
            engine.push_log(format!("Chat error: {err}."));
        }
    }
}

fn spawn_save(tasks: &mut JoinSet<TaskOutcome>, services: &SessionServices, snapshot: PlayerSnapshot) {
    let repository = Arc::clone(&services.repository);
    tasks.spawn(async move {
        match repository.save(&snapshot).await {
            Ok(()) => TaskOutcome::Saved {
                taken_at_ms: snapshot.taken_at_ms,
            },
            Err(err) => TaskOutcome::SaveFailed(err),
        }
    });
}

fn spawn_chat_fetch(tasks: &mut JoinSet<TaskOutcome>, services: &SessionServices, limit: usize) {
    let chat = Arc::clone(&services.chat);
    tasks.spawn(async move {
        match chat.recent(limit).await {
            Ok(messages) => TaskOutcome::ChatFetched(messages),
            Err(err) => TaskOutcome::ChatFailed(err),
        }
    });
}

/// Log the end of a session.
pub fn log_session_end(summary: &SessionSummary) {
    info!(
        reason = ?summary.end_reason,
        virtual_ms = summary.virtual_ms,
        frames = summary.frames,
        commands = summary.commands,
        saves = summary.saves,
        failed_saves = summary.failed_saves,
        "session ended"
    );
    if summary.failed_saves > 0 {
        warn!(failed_saves = summary.failed_saves, "some autosaves failed during the session");
    }
}
