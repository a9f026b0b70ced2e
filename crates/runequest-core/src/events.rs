//! Engine notifications and the in-game activity log.
//!
//! The engine never calls out to presentation or persistence. Everything
//! observable is pushed as an [`EngineEvent`] into a buffer the caller
//! drains after each command or [`advance`](crate::GameEngine::advance),
//! and every player-facing transition also writes a line to the
//! [`ActivityLog`].

use std::collections::VecDeque;

use runequest_types::{ActionKind, Combatant, EntityId, ItemId, PlayerSnapshot, Position, Skill};

/// First line of every activity log.
pub const WELCOME_MESSAGE: &str = "Welcome to RuneQuest!";

/// Maximum number of retained log lines.
pub const ACTIVITY_LOG_CAPACITY: usize = 50;

/// Something observable that happened inside the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A timed action began.
    ActionStarted {
        /// Kind of action.
        kind: ActionKind,
    },
    /// The running action advanced.
    ActionProgress {
        /// Kind of action.
        kind: ActionKind,
        /// Progress, `0..=100`.
        progress: u32,
    },
    /// The running action finished and its effect was applied.
    ActionCompleted {
        /// Kind of action.
        kind: ActionKind,
    },
    /// The running action was cleared without its effect.
    ActionCancelled {
        /// Kind of action.
        kind: ActionKind,
    },
    /// The player moved one step.
    PlayerMoved {
        /// New position.
        position: Position,
    },
    /// A skill crossed a level boundary.
    LevelUp {
        /// The skill.
        skill: Skill,
        /// The new level.
        level: u32,
    },
    /// A combat session began.
    CombatStarted {
        /// Enemy name.
        enemy: String,
    },
    /// A hit landed.
    Hitsplat {
        /// Who took the damage.
        target: Combatant,
        /// Damage dealt.
        damage: u32,
    },
    /// The enemy was defeated.
    EnemyDefeated {
        /// Enemy name.
        enemy: String,
        /// Gold awarded.
        gold: u64,
        /// Loot item and quantity added to the inventory.
        loot: Option<(ItemId, u32)>,
    },
    /// The player was defeated and restored to full health.
    PlayerDefeated {
        /// Enemy name.
        enemy: String,
    },
    /// A harvested entity was hidden.
    EntityHidden {
        /// The entity.
        id: EntityId,
    },
    /// A hidden entity reappeared.
    EntityRespawned {
        /// The entity.
        id: EntityId,
        /// Where it reappeared.
        position: Position,
    },
    /// The autosave period elapsed; the snapshot should be persisted.
    SaveDue(Box<PlayerSnapshot>),
    /// The chat poll period elapsed.
    ChatPollDue,
}

/// Newest-first list of player-facing messages, capped in length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLog {
    lines: VecDeque<String>,
    /// Lines ever pushed, welcome line included.
    total: u64,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    /// A log holding only the welcome line.
    pub fn new() -> Self {
        let mut lines = VecDeque::with_capacity(ACTIVITY_LOG_CAPACITY);
        lines.push_front(WELCOME_MESSAGE.to_owned());
        Self { lines, total: 1 }
    }

    /// Prepend a line, dropping the oldest past capacity.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_front(line.into());
        self.lines.truncate(ACTIVITY_LOG_CAPACITY);
        self.total = self.total.saturating_add(1);
    }

    /// Number of lines ever pushed, including those since dropped.
    pub const fn total_pushed(&self) -> u64 {
        self.total
    }

    /// Retained lines pushed after the first `seen` lines, oldest first.
    ///
    /// Observers remember [`ActivityLog::total_pushed`] and pass it back on
    /// the next call to receive only what is new.
    pub fn since(&self, seen: u64) -> Vec<&str> {
        let fresh = usize::try_from(self.total.saturating_sub(seen)).unwrap_or(usize::MAX);
        let mut lines: Vec<&str> = self.iter().take(fresh).collect();
        lines.reverse();
        lines
    }

    /// Lines, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// The most recent line.
    pub fn latest(&self) -> Option<&str> {
        self.lines.front().map(String::as_str)
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_welcome() {
        let log = ActivityLog::new();
        assert_eq!(log.latest(), Some(WELCOME_MESSAGE));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn newest_first_and_capped() {
        let mut log = ActivityLog::new();
        for i in 0..60 {
            log.push(format!("line {i}"));
        }
        assert_eq!(log.len(), ACTIVITY_LOG_CAPACITY);
        assert_eq!(log.latest(), Some("line 59"));
        assert_eq!(log.iter().last(), Some("line 10"));
    }

    #[test]
    fn since_returns_unseen_lines_oldest_first() {
        let mut log = ActivityLog::new();
        let seen = log.total_pushed();
        log.push("a");
        log.push("b");
        assert_eq!(log.since(seen), vec!["a", "b"]);
        assert!(log.since(log.total_pushed()).is_empty());
        assert_eq!(log.since(0), vec![WELCOME_MESSAGE, "a", "b"]);
    }
}
