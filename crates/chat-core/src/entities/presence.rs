//! Presence entity - last known status of a guild member

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Online status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// User is online and active
    Online,
    /// User is idle (away from keyboard)
    Idle,
    /// Do not disturb
    Dnd,
    /// Online but shown as offline to others; only ever sent, never received
    Invisible,
    /// User is offline
    #[default]
    Offline,
}

impl Status {
    /// Check if this status should be visible to others
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Offline | Self::Invisible)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Idle => write!(f, "idle"),
            Self::Dnd => write!(f, "dnd"),
            Self::Invisible => write!(f, "invisible"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "idle" => Ok(Self::Idle),
            "dnd" => Ok(Self::Dnd),
            "invisible" => Ok(Self::Invisible),
            "offline" => Ok(Self::Offline),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}

/// Activity shown alongside a presence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    /// Activity kind (0 playing, 1 streaming, 2 listening, 3 watching, 4 custom, 5 competing)
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Activity {
    #[must_use]
    pub fn playing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: 0,
            url: None,
            state: None,
            details: None,
        }
    }
}

/// Guild-scoped presence, keyed by user id inside its guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub user_id: Snowflake,
    pub guild_id: Snowflake,
    pub status: Status,
    pub activities: Vec<Activity>,
}

impl Presence {
    #[must_use]
    pub fn new(user_id: Snowflake, guild_id: Snowflake, status: Status) -> Self {
        Self {
            user_id,
            guild_id,
            status,
            activities: Vec::new(),
        }
    }
}
