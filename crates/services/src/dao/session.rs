use async_trait::async_trait;
use bson::{doc, DateTime};
use crewledger_db::models::RevokedSession;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};
use crate::store::SessionStore;

pub struct SessionDao {
    pub base: BaseDao<RevokedSession>,
}

impl SessionDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, RevokedSession::COLLECTION),
        }
    }
}

#[async_trait]
impl SessionStore for SessionDao {
    async fn revoke(&self, entry: &RevokedSession) -> DaoResult<()> {
        self.base
            .upsert_one(
                doc! { "_id": &entry.session_id },
                doc! {
                    "$set": {
                        "account_id": entry.account_id,
                        "forget_after": entry.forget_after,
                    },
                    "$setOnInsert": { "created_at": entry.created_at },
                },
            )
            .await
    }

    async fn is_revoked(&self, session_id: &str) -> DaoResult<bool> {
        // The TTL monitor only sweeps about once a minute.
        let found = self
            .base
            .count(doc! {
                "_id": session_id,
                "forget_after": { "$gt": DateTime::now() },
            })
            .await?;
        Ok(found > 0)
    }
}
