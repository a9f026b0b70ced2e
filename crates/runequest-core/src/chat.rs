//! Global chat.
//!
//! The engine only caches the latest fetch; posting and fetching go through
//! a [`ChatService`] owned by the session runner.

use async_trait::async_trait;
use chrono::Utc;
use runequest_types::{ChatMessage, MessageId};
use tokio::sync::RwLock;

/// Longest accepted message body, in characters.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// Messages retained by [`MemoryChat`].
pub const MEMORY_CHAT_RETENTION: usize = 500;

/// Errors raised by a [`ChatService`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChatError {
    /// The message was empty after trimming.
    #[error("chat message is empty")]
    EmptyMessage,

    /// The message is longer than [`MAX_MESSAGE_CHARS`].
    #[error("chat message has {chars} characters, limit is {MAX_MESSAGE_CHARS}")]
    TooLong {
        /// Length of the rejected message.
        chars: usize,
    },
}

/// Post and fetch chat messages.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Publish `message` as `username`. Surrounding whitespace is trimmed.
    async fn post(&self, username: &str, message: &str) -> Result<ChatMessage, ChatError>;

    /// The most recent `limit` messages, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>, ChatError>;
}

/// Trim and bound a message body.
pub fn normalize_message(message: &str) -> Result<&str, ChatError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    let chars = trimmed.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        return Err(ChatError::TooLong { chars });
    }
    Ok(trimmed)
}

/// A chat channel held in process memory, oldest message first.
#[derive(Debug, Default)]
pub struct MemoryChat {
    messages: RwLock<Vec<ChatMessage>>,
}

impl MemoryChat {
    /// An empty channel.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatService for MemoryChat {
    async fn post(&self, username: &str, message: &str) -> Result<ChatMessage, ChatError> {
        let body = normalize_message(message)?;
        let posted = ChatMessage {
            id: MessageId::new(),
            username: username.to_owned(),
            message: body.to_owned(),
            timestamp: Utc::now(),
        };
        let mut messages = self.messages.write().await;
        messages.push(posted.clone());
        let excess = messages.len().saturating_sub(MEMORY_CHAT_RETENTION);
        if excess > 0 {
            messages.drain(..excess);
        }
        Ok(posted)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>, ChatError> {
        let messages = self.messages.read().await;
        Ok(messages.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let chat = MemoryChat::new();
        for i in 0..5 {
            chat.post("bob", &format!("msg {i}")).await.unwrap();
        }
        let recent = chat.recent(3).await.unwrap();
        let bodies: Vec<&str> = recent.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(bodies, vec!["msg 4", "msg 3", "msg 2"]);
    }

    #[tokio::test]
    async fn blank_messages_are_rejected() {
        let chat = MemoryChat::new();
        assert_eq!(chat.post("bob", "   ").await, Err(ChatError::EmptyMessage));
        assert!(chat.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn body_is_trimmed() {
        let chat = MemoryChat::new();
        let posted = chat.post("bob", "  hi all \n").await.unwrap();
        assert_eq!(posted.message, "hi all");
        assert_eq!(posted.username, "bob");
    }

    #[test]
    fn overlong_messages_are_rejected() {
        let long = "a".repeat(MAX_MESSAGE_CHARS + 1);
        assert_eq!(
            normalize_message(&long),
            Err(ChatError::TooLong {
                chars: MAX_MESSAGE_CHARS + 1
            })
        );
    }

    #[tokio::test]
    async fn retention_drops_oldest() {
        let chat = MemoryChat::new();
        for i in 0..=MEMORY_CHAT_RETENTION {
            chat.post("bob", &format!("{i}")).await.unwrap();
        }
        let all = chat.recent(usize::MAX).await.unwrap();
        assert_eq!(all.len(), MEMORY_CHAT_RETENTION);
        assert_eq!(all.last().unwrap().message, "1");
    }
}
