//! Type-safe identifier wrappers.
//!
//! World entities, items, and locations are keyed by short human-readable
//! slugs (`"oak_1"`, `"bronze_bar"`, `"lumbridge_forest"`) that come from the
//! static world templates and the persisted inventory rows. Each slug kind
//! gets its own newtype so the compiler rejects mixing them up.
//!
//! Chat messages are the only records minted at runtime; they use UUID v7
//! (time-ordered) like any other appended log row.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around a [`String`] slug with standard derives.
macro_rules! define_slug_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like slug.
            pub fn new(slug: impl Into<String>) -> Self {
                Self(slug.into())
            }

            /// Borrow the slug.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(slug: &str) -> Self {
                Self(slug.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(slug: String) -> Self {
                Self(slug)
            }
        }
    };
}

define_slug_id! {
    /// Identifier of a world entity (tree, rock, NPC, forge, bank).
    EntityId
}

define_slug_id! {
    /// Identifier of an item template and of the inventory stack holding it.
    ItemId
}

define_slug_id! {
    /// Identifier of a named location (the player's location tag).
    LocationId
}

/// Unique identifier for a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for MessageId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_ids_display_their_slug() {
        let id = EntityId::new("oak_1");
        assert_eq!(id.to_string(), "oak_1");
        assert_eq!(id.as_str(), "oak_1");
    }

    #[test]
    fn slug_ids_serialize_transparently() {
        let id = ItemId::from("bronze_bar");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"bronze_bar\"");
    }

    #[test]
    fn message_ids_are_unique() {
        let a = MessageId::new();
        let b = MessageId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }
}
