//! Player repositories.
//!
//! The engine only ever produces [`PlayerSnapshot`]s and consumes a
//! [`LoadedPlayer`]; a [`PlayerRepository`] is what the session runner hands
//! them to. Two implementations are provided:
//!
//! - [`MemoryRepository`] -- a map behind a lock, for tests and throwaway
//!   sessions.
//! - [`JsonFileRepository`] -- one pretty-printed JSON file per player in a
//!   data directory. Writes go to a temporary file first and are renamed
//!   into place so a crash mid-save never leaves a truncated record.
//!
//! Loading a player that does not exist creates and stores the default
//! record, so the first session of a new name starts at the spawn point.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use runequest_types::{LoadedPlayer, PlayerSnapshot};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Longest accepted player name.
pub const MAX_USERNAME_LEN: usize = 32;

/// Errors raised by a [`PlayerRepository`].
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// A filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A stored record could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The player name cannot be used as a storage key.
    #[error("invalid username {0:?}")]
    InvalidUsername(String),
}

/// Check that `username` is non-empty, at most [`MAX_USERNAME_LEN`] bytes,
/// and made only of ASCII letters, digits, `_` and `-`.
pub fn validate_username(username: &str) -> Result<(), PersistenceError> {
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidUsername(username.to_owned()))
    }
}

/// Storage for player records.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Load a player by name, creating the default record if absent.
    async fn load(&self, username: &str) -> Result<LoadedPlayer, PersistenceError>;

    /// Upsert the stats row and replace the inventory wholesale.
    async fn save(&self, snapshot: &PlayerSnapshot) -> Result<(), PersistenceError>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// A repository that keeps records in process memory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    players: RwLock<BTreeMap<String, LoadedPlayer>>,
}

impl MemoryRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored players.
    pub async fn len(&self) -> usize {
        self.players.read().await.len()
    }

    /// Whether no player is stored.
    pub async fn is_empty(&self) -> bool {
        self.players.read().await.is_empty()
    }
}

#[async_trait]
impl PlayerRepository for MemoryRepository {
    async fn load(&self, username: &str) -> Result<LoadedPlayer, PersistenceError> {
        validate_username(username)?;
        let mut players = self.players.write().await;
        let loaded = players.entry(username.to_owned()).or_default().clone();
        Ok(loaded)
    }

    async fn save(&self, snapshot: &PlayerSnapshot) -> Result<(), PersistenceError> {
        validate_username(&snapshot.username)?;
        self.players
            .write()
            .await
            .insert(snapshot.username.clone(), snapshot.clone().into_loaded());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON files
// ---------------------------------------------------------------------------

/// A repository storing `<data_dir>/<username>.json`.
///
/// Each write goes to its own staging file and is renamed into place.
/// Writes through one repository (and its clones) are serialized.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileRepository {
    /// A repository rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `username`.
    pub fn path_for(&self, username: &str) -> Result<PathBuf, PersistenceError> {
        validate_username(username)?;
        Ok(self.dir.join(format!("{username}.json")))
    }

    async fn write(&self, path: &Path, record: &LoadedPlayer) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| PersistenceError::Io {
                path: self.dir.clone(),
                source,
            })?;
        let body = serde_json::to_vec_pretty(record)?;
        let staging = path.with_extension(format!("json.{}.tmp", Uuid::now_v7().simple()));

        let _guard = self.write_lock.lock().await;
        if let Err(source) = tokio::fs::write(&staging, body).await {
            return Err(PersistenceError::Io { path: staging, source });
        }
        if let Err(source) = tokio::fs::rename(&staging, path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PlayerRepository for JsonFileRepository {
    async fn load(&self, username: &str) -> Result<LoadedPlayer, PersistenceError> {
        let path = self.path_for(username)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let loaded: LoadedPlayer = serde_json::from_slice(&bytes)?;
                debug!(username, path = %path.display(), "player loaded");
                Ok(loaded)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let loaded = LoadedPlayer::default();
                self.write(&path, &loaded).await?;
                info!(username, path = %path.display(), "created new player record");
                Ok(loaded)
            }
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }

    async fn save(&self, snapshot: &PlayerSnapshot) -> Result<(), PersistenceError> {
        let path = self.path_for(&snapshot.username)?;
        self.write(&path, &snapshot.clone().into_loaded()).await?;
        debug!(
            username = %snapshot.username,
            taken_at_ms = snapshot.taken_at_ms,
            items = snapshot.inventory.len(),
            "player saved"
        );
        Ok(())
    }
}
