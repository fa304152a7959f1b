//! Guild roles

use chat_gateway::events::{GuildRoleDeletePayload, GuildRolePayload};

use super::Apply;
use crate::error::SyncResult;
use crate::notification::CacheEvent;

impl Apply<'_> {
    pub(super) fn role_create(&mut self, payload: &GuildRolePayload) -> SyncResult<()> {
        let role = payload.role.to_role(payload.guild_id);
        match self.cache.update_guild(payload.guild_id, |g| g.insert_role(role.clone())) {
            Some(result) => {
                result?;
            }
            None => self.desync("Guild", payload.guild_id),
        }
        self.emit(CacheEvent::RoleCreate(role));
        Ok(())
    }

    pub(super) fn role_update(&mut self, payload: &GuildRolePayload) -> SyncResult<()> {
        let new = payload.role.to_role(payload.guild_id);
        let old = self
            .cache
            .update_guild(payload.guild_id, |g| g.insert_role(new.clone()))
            .transpose()?
            .flatten();
        if old.is_none() {
            self.desync("Role", new.id);
        }
        self.emit(CacheEvent::RoleUpdate { old, new });
        Ok(())
    }

    /// Remove the role and strip it from every member holding it
    pub(super) fn role_delete(&mut self, payload: &GuildRoleDeletePayload) -> SyncResult<()> {
        let role = self
            .cache
            .update_guild(payload.guild_id, |g| g.remove_role(payload.role_id))
            .flatten();
        if role.is_none() {
            self.desync("Role", payload.role_id);
        }
        self.emit(CacheEvent::RoleDelete {
            guild_id: payload.guild_id,
            role_id: payload.role_id,
            role,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chat_cache::Cache;
    use chat_core::{Permissions, Snowflake};
    use serde_json::json;

    use super::super::fixtures::*;
    use crate::notification::CacheEvent;

    fn with_guild() -> Cache {
        let cache = Cache::default();
        apply(&cache, "GUILD_CREATE", guild(10));
        cache
    }

    #[test]
    fn test_create_and_update() {
        let cache = with_guild();
        let events = apply(&cache, "GUILD_ROLE_CREATE", json!({ "guild_id": "10", "role": role(6, "helper") }));
        assert!(matches!(&events[..], [CacheEvent::RoleCreate(r)] if r.name == "helper"));

        let events = apply(
            &cache,
            "GUILD_ROLE_UPDATE",
            json!({ "guild_id": "10", "role": { "id": "6", "name": "helper", "permissions": "8" } }),
        );
        let [CacheEvent::RoleUpdate { old: Some(old), new }] = &events[..] else {
            panic!("expected a role update, got {events:?}");
        };
        assert_ne!(old.permissions, new.permissions);
        assert!(cache
            .role(Snowflake::new(10), Snowflake::new(6))
            .unwrap()
            .permissions
            .contains(Permissions::ADMINISTRATOR));
    }

    #[test]
    fn test_delete_strips_role_from_members() {
        let cache = with_guild();
        assert!(cache.member(Snowflake::new(10), Snowflake::new(101)).unwrap().has_role(Snowflake::new(5)));

        let events = apply(&cache, "GUILD_ROLE_DELETE", json!({ "guild_id": "10", "role_id": "5" }));
        assert!(matches!(&events[..], [CacheEvent::RoleDelete { role: Some(_), .. }]));
        assert!(cache.role(Snowflake::new(10), Snowflake::new(5)).is_none());
        assert!(!cache.member(Snowflake::new(10), Snowflake::new(101)).unwrap().has_role(Snowflake::new(5)));
    }

    #[test]
    fn test_delete_of_unknown_role_emits_stub() {
        let cache = with_guild();
        let events = apply(&cache, "GUILD_ROLE_DELETE", json!({ "guild_id": "10", "role_id": "99" }));
        assert!(matches!(
            &events[..],
            [CacheEvent::RoleDelete { role: None, role_id, .. }] if *role_id == Snowflake::new(99)
        ));
    }
}
