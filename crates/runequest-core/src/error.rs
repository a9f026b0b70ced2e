//! Error types for engine construction and timer registration.
//!
//! Player commands that are merely rejected (busy, out of range, not enough
//! gold) are not errors; they return `false` and log. [`GameError`] covers
//! the failures that leave the engine unusable.

use runequest_player::PlayerError;
use runequest_world::WorldError;

use crate::config::ConfigError;
use crate::scheduler::SchedulerError;

/// Errors raised by [`GameEngine`](crate::GameEngine).
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The configuration was rejected.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The world template could not be loaded.
    #[error("world error: {0}")]
    World(#[from] WorldError),

    /// A player mutation failed.
    #[error("player error: {0}")]
    Player(#[from] PlayerError),

    /// A timer could not be registered.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// The engine has been shut down.
    #[error("engine has been shut down")]
    ShutDown,
}
