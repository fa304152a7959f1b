//! Message entity - a cached message and its reaction tallies

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::reaction::{ReactionAggregate, ReactionEmoji, ReactionKey};
use crate::value_objects::Snowflake;

/// File attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: Snowflake,
    pub filename: String,
    pub size: u64,
    pub url: String,
    pub content_type: Option<String>,
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    /// Denormalized owning guild for guild channels
    pub guild_id: Option<Snowflake>,
    pub author_id: Snowflake,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub edited_timestamp: Option<DateTime<Utc>>,
    pub tts: bool,
    pub mention_everyone: bool,
    pub mentions: Vec<Snowflake>,
    pub mention_roles: Vec<Snowflake>,
    pub attachments: Vec<Attachment>,
    pub pinned: bool,
    /// Message type discriminant (0 for a regular message)
    pub kind: u8,
    /// Message this one replies to
    pub reference_id: Option<Snowflake>,
    pub webhook_id: Option<Snowflake>,
    pub reactions: BTreeMap<ReactionKey, ReactionAggregate>,
}

impl Message {
    /// Create a new Message
    #[must_use]
    pub fn new(
        id: Snowflake,
        channel_id: Snowflake,
        author_id: Snowflake,
        content: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            channel_id,
            guild_id: None,
            author_id,
            content,
            timestamp,
            edited_timestamp: None,
            tts: false,
            mention_everyone: false,
            mentions: Vec::new(),
            mention_roles: Vec::new(),
            attachments: Vec::new(),
            pinned: false,
            kind: 0,
            reference_id: None,
            webhook_id: None,
            reactions: BTreeMap::new(),
        }
    }

    /// Check if message has been edited
    #[inline]
    #[must_use]
    pub fn is_edited(&self) -> bool {
        self.edited_timestamp.is_some()
    }

    /// Check if message is a reply
    #[inline]
    #[must_use]
    pub fn is_reply(&self) -> bool {
        self.reference_id.is_some()
    }

    #[must_use]
    pub fn reaction(&self, key: &ReactionKey) -> Option<&ReactionAggregate> {
        self.reactions.get(key)
    }

    /// Count one reaction; `by_me` marks the session's own user as a reactor
    ///
    /// Returns the aggregate after the change.
    pub fn add_reaction(&mut self, emoji: ReactionEmoji, by_me: bool) -> ReactionAggregate {
        let aggregate = self
            .reactions
            .entry(emoji.key())
            .or_insert_with(|| ReactionAggregate::new(emoji));
        aggregate.count = aggregate.count.saturating_add(1);
        if by_me {
            aggregate.me = true;
        }
        aggregate.clone()
    }

    /// Uncount one reaction; the entry disappears once its count reaches zero
    ///
    /// Returns the aggregate after the change, with `count == 0` when it was
    /// dropped, or `None` when no reaction with that key was recorded.
    pub fn remove_reaction(&mut self, key: &ReactionKey, by_me: bool) -> Option<ReactionAggregate> {
        let aggregate = self.reactions.get_mut(key)?;
        aggregate.count = aggregate.count.saturating_sub(1);
        if by_me {
            aggregate.me = false;
        }
        let snapshot = aggregate.clone();
        if snapshot.count == 0 {
            self.reactions.remove(key);
        }
        Some(snapshot)
    }

    /// Drop every reaction, returning what was there
    pub fn clear_reactions(&mut self) -> BTreeMap<ReactionKey, ReactionAggregate> {
        std::mem::take(&mut self.reactions)
    }
}
