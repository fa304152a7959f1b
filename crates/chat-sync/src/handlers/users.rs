//! The current user

use chat_gateway::events::UserPayload;

use super::Apply;
use crate::error::SyncResult;
use crate::notification::CacheEvent;

impl Apply<'_> {
    pub(super) fn user_update(&mut self, payload: &UserPayload) -> SyncResult<()> {
        let new = payload.to_user();
        let old = self.cache.set_current_user(new.clone());
        if old.is_none() {
            self.desync("User", new.id);
        }
        self.emit(CacheEvent::UserUpdate { old, new });
        Ok(())
    }
}
