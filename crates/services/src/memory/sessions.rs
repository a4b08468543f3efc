use async_trait::async_trait;
use bson::DateTime;
use crewledger_db::models::RevokedSession;
use dashmap::DashMap;

use crate::dao::base::DaoResult;
use crate::store::SessionStore;

#[derive(Default)]
pub struct MemorySessions {
    revoked: DashMap<String, RevokedSession>,
}

#[async_trait]
impl SessionStore for MemorySessions {
    async fn revoke(&self, entry: &RevokedSession) -> DaoResult<()> {
        let now = DateTime::now();
        self.revoked.retain(|_, revoked| revoked.is_live(now));
        self.revoked
            .entry(entry.session_id.clone())
            .and_modify(|revoked| revoked.forget_after = entry.forget_after)
            .or_insert_with(|| entry.clone());
        Ok(())
    }

    async fn is_revoked(&self, session_id: &str) -> DaoResult<bool> {
        let now = DateTime::now();
        Ok(self
            .revoked
            .get(session_id)
            .is_some_and(|revoked| revoked.is_live(now)))
    }
}
