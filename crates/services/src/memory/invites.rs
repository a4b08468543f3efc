use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use crewledger_db::models::{InviteCode, InviteRedemption, Role};
use dashmap::{DashMap, mapref::entry::Entry};
use parking_lot::Mutex;

use crate::dao::base::{DaoError, DaoResult};
use crate::store::InviteStore;

#[derive(Default)]
pub struct MemoryInvites {
    codes: DashMap<String, InviteCode>,
    log: Mutex<Vec<InviteRedemption>>,
}

#[async_trait]
impl InviteStore for MemoryInvites {
    async fn redeem(&self, code: &str, role: Role) -> DaoResult<bool> {
        // `get_mut` holds the shard's write lock for the whole check-and-decrement.
        Ok(self
            .codes
            .get_mut(code)
            .map(|mut invite| invite.consume(role))
            .unwrap_or(false))
    }

    async fn append_log(&self, entry: &InviteRedemption) -> DaoResult<()> {
        let mut stored = entry.clone();
        stored.id = Some(ObjectId::new());
        self.log.lock().push(stored);
        Ok(())
    }

    async fn insert(&self, invite: &InviteCode) -> DaoResult<InviteCode> {
        match self.codes.entry(invite.code.clone()) {
            Entry::Occupied(_) => Err(DaoError::DuplicateKey(format!("code {}", invite.code))),
            Entry::Vacant(slot) => {
                let mut stored = invite.clone();
                stored.id = Some(ObjectId::new());
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> DaoResult<Option<InviteCode>> {
        Ok(self.codes.get(code).map(|c| c.value().clone()))
    }

    async fn list(&self) -> DaoResult<Vec<InviteCode>> {
        let mut codes: Vec<InviteCode> = self.codes.iter().map(|c| c.value().clone()).collect();
        codes.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(codes)
    }

    async fn deactivate(&self, code: &str) -> DaoResult<bool> {
        Ok(match self.codes.get_mut(code) {
            Some(mut invite) => {
                invite.active = false;
                invite.updated_at = DateTime::now();
                true
            }
            None => false,
        })
    }

    async fn list_log(&self, code: Option<&str>) -> DaoResult<Vec<InviteRedemption>> {
        Ok(self
            .log
            .lock()
            .iter()
            .filter(|entry| code.is_none_or(|c| entry.code == c))
            .cloned()
            .collect())
    }
}
