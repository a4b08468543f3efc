use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use crewledger_db::models::{Role, RoleProfile};
use dashmap::DashMap;

use crate::dao::base::DaoResult;
use crate::store::ProfileStore;

#[derive(Default)]
pub struct MemoryProfiles {
    profiles: DashMap<ObjectId, RoleProfile>,
}

#[async_trait]
impl ProfileStore for MemoryProfiles {
    async fn find(&self, account_id: ObjectId) -> DaoResult<Option<RoleProfile>> {
        Ok(self.profiles.get(&account_id).map(|p| p.value().clone()))
    }

    async fn upsert(&self, account_id: ObjectId, role: Role) -> DaoResult<RoleProfile> {
        let mut entry = self
            .profiles
            .entry(account_id)
            .or_insert_with(|| RoleProfile::new(account_id, role));
        entry.role = role;
        entry.updated_at = DateTime::now();
        Ok(entry.value().clone())
    }
}
