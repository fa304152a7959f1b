//! Reaction aggregates carried on cached messages

use crate::value_objects::Snowflake;

/// Key under which a message's reactions are aggregated
///
/// Custom emoji are keyed by id, unicode emoji by their literal text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReactionKey {
    Custom(Snowflake),
    Unicode(String),
}

impl std::fmt::Display for ReactionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Custom(id) => write!(f, "{id}"),
            Self::Unicode(name) => f.write_str(name),
        }
    }
}

/// Emoji reference as it appears on reaction payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEmoji {
    pub id: Option<Snowflake>,
    pub name: Option<String>,
    pub animated: bool,
}

impl ReactionEmoji {
    #[must_use]
    pub fn unicode(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            animated: false,
        }
    }

    #[must_use]
    pub fn custom(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
            animated: false,
        }
    }

    /// Aggregation key: emoji id when present, else the literal name
    #[must_use]
    pub fn key(&self) -> ReactionKey {
        match self.id {
            Some(id) => ReactionKey::Custom(id),
            None => ReactionKey::Unicode(self.name.clone().unwrap_or_default()),
        }
    }
}

/// Per-emoji reaction tally on a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionAggregate {
    pub emoji: ReactionEmoji,
    pub count: u32,
    /// Whether the session's own user is among the reactors
    pub me: bool,
}

impl ReactionAggregate {
    #[must_use]
    pub fn new(emoji: ReactionEmoji) -> Self {
        Self {
            emoji,
            count: 0,
            me: false,
        }
    }
}
