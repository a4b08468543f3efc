use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use crewledger_db::models::User;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::dao::base::{DaoError, DaoResult};
use crate::store::AccountStore;

#[derive(Default)]
pub struct MemoryAccounts {
    by_email: DashMap<String, User>,
    emails: DashMap<ObjectId, String>,
}

#[async_trait]
impl AccountStore for MemoryAccounts {
    async fn insert(&self, user: &User) -> DaoResult<User> {
        let key = user.email.to_lowercase();
        match self.by_email.entry(key.clone()) {
            Entry::Occupied(_) => Err(DaoError::DuplicateKey(format!("email {key}"))),
            Entry::Vacant(slot) => {
                let id = ObjectId::new();
                let mut stored = user.clone();
                stored.id = Some(id);
                slot.insert(stored.clone());
                self.emails.insert(id, key);
                Ok(stored)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> DaoResult<Option<User>> {
        Ok(self
            .by_email
            .get(&email.to_lowercase())
            .map(|u| u.value().clone()))
    }

    async fn find_by_id(&self, id: ObjectId) -> DaoResult<Option<User>> {
        let Some(email) = self.emails.get(&id).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        Ok(self.by_email.get(&email).map(|u| u.value().clone()))
    }

    async fn touch_sign_in(&self, id: ObjectId) -> DaoResult<()> {
        let Some(email) = self.emails.get(&id).map(|e| e.value().clone()) else {
            return Err(DaoError::NotFound);
        };
        if let Some(mut user) = self.by_email.get_mut(&email) {
            let now = DateTime::now();
            user.last_sign_in_at = Some(now);
            user.updated_at = now;
        }
        Ok(())
    }
}
