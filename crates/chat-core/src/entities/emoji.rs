//! Emoji entity - custom emoji owned by a guild

use crate::value_objects::Snowflake;

/// Custom guild emoji
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emoji {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub role_ids: Vec<Snowflake>,
    /// User that uploaded the emoji, when the payload discloses it
    pub creator_id: Option<Snowflake>,
    pub require_colons: bool,
    pub managed: bool,
    pub animated: bool,
    pub available: bool,
}

impl Emoji {
    #[must_use]
    pub fn new(id: Snowflake, guild_id: Snowflake, name: String) -> Self {
        Self {
            id,
            guild_id,
            name,
            role_ids: Vec::new(),
            creator_id: None,
            require_colons: true,
            managed: false,
            animated: false,
            available: true,
        }
    }

    /// Message markup that renders this emoji
    #[must_use]
    pub fn mention(&self) -> String {
        let prefix = if self.animated { "a" } else { "" };
        format!("<{prefix}:{}:{}>", self.name, self.id)
    }
}
