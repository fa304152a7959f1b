//! Shared user records and the session's own user

use chat_core::{Snowflake, User};

use super::Cache;

impl Cache {
    #[must_use]
    pub fn user(&self, id: Snowflake) -> Option<User> {
        self.users.get(&id).map(|user| user.clone())
    }

    /// Last write wins, whichever event carried the user
    pub fn upsert_user(&self, user: User) -> Option<User> {
        self.users.insert(user.id, user)
    }

    pub fn remove_user(&self, id: Snowflake) -> Option<User> {
        self.users.remove(&id).map(|(_, user)| user)
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.current_user.read().clone()
    }

    #[must_use]
    pub fn current_user_id(&self) -> Option<Snowflake> {
        self.current_user.read().as_ref().map(|user| user.id)
    }

    /// Record the session's own user, also refreshing the shared record
    pub fn set_current_user(&self, user: User) -> Option<User> {
        self.upsert_user(user.clone());
        self.current_user.write().replace(user)
    }
}
