//! Value objects - immutable types that represent domain concepts

mod permissions;
mod snowflake;

pub use permissions::Permissions;
pub use snowflake::{Snowflake, SnowflakeParseError};
