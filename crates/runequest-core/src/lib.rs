//! Virtual-time engine, timers, persistence, and session loop for the
//! RuneQuest simulation.
//!
//! The [`GameEngine`] owns every piece of mutable state for one player
//! session and advances it only when told to. Everything asynchronous
//! (wall-clock frames, saving, chat) lives outside it in [`runner`].
//!
//! # Modules
//!
//! - [`action`] -- The single-slot timed action state machine.
//! - [`chat`] -- [`ChatService`] trait and [`MemoryChat`].
//! - [`config`] -- Configuration loading from `runequest-config.yaml` into
//!   strongly-typed structs.
//! - [`engine`] -- [`GameEngine`]: commands, timer dispatch, combat, and
//!   world interaction.
//! - [`error`] -- [`GameError`].
//! - [`events`] -- [`EngineEvent`] notifications and the [`ActivityLog`].
//! - [`persistence`] -- [`PlayerRepository`] trait with in-memory and JSON
//!   file implementations.
//! - [`runner`] -- [`run_session`], the real-time session loop.
//! - [`scheduler`] -- Deterministic virtual-time [`Scheduler`].

pub mod action;
pub mod chat;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod persistence;
pub mod runner;
pub mod scheduler;

pub use action::{ActionScheduler, ActionStep};
pub use chat::{ChatError, ChatService, MemoryChat};
pub use config::{ConfigError, GameConfig};
pub use engine::{ActionEffect, GameEngine, TimerKind};
pub use error::GameError;
pub use events::{ActivityLog, EngineEvent};
pub use persistence::{JsonFileRepository, MemoryRepository, PersistenceError, PlayerRepository};
pub use runner::{
    FrameObserver, NoOpObserver, RunnerError, SessionCommand, SessionEndReason, SessionServices,
    SessionStatus, SessionSummary, run_session,
};
pub use scheduler::{Scheduler, SchedulerError, TimerId};
