//! Error types for the RuneQuest engine binary.
//!
//! [`EngineError`] wraps every failure that can abort startup or the
//! session, so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: runequest_core::ConfigError,
    },

    /// The engine could not be constructed.
    #[error("engine error: {source}")]
    Game {
        /// The underlying engine error.
        #[from]
        source: runequest_core::GameError,
    },

    /// Loading the player record failed.
    #[error("persistence error: {source}")]
    Persistence {
        /// The underlying repository error.
        #[from]
        source: runequest_core::PersistenceError,
    },

    /// The session loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: runequest_core::RunnerError,
    },

    /// The logging subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
