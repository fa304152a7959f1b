//! Role entity - guild-scoped permission and appearance record

use crate::value_objects::{Permissions, Snowflake};

/// Role entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub color: u32,
    pub hoist: bool,
    pub position: i32,
    pub permissions: Permissions,
    pub managed: bool,
    pub mentionable: bool,
}

impl Role {
    /// Create a new Role
    #[must_use]
    pub fn new(id: Snowflake, guild_id: Snowflake, name: String, permissions: Permissions) -> Self {
        Self {
            id,
            guild_id,
            name,
            color: 0,
            hoist: false,
            position: 0,
            permissions,
            managed: false,
            mentionable: false,
        }
    }

    /// The @everyone role shares its id with the guild
    #[inline]
    pub fn is_everyone(&self) -> bool {
        self.id == self.guild_id
    }

    /// Check if this role grants a specific permission
    #[inline]
    pub fn has_permission(&self, permission: Permissions) -> bool {
        self.permissions.has(permission)
    }

    /// Compare role positions for hierarchy (higher position = more authority)
    ///
    /// Ties are broken by id, the older role ranking higher.
    pub fn is_higher_than(&self, other: &Role) -> bool {
        match self.position.cmp(&other.position) {
            std::cmp::Ordering::Equal => self.id < other.id,
            ordering => ordering == std::cmp::Ordering::Greater,
        }
    }
}
