use async_trait::async_trait;
use bson::{doc, Document};
use crewledger_db::models::{InviteCode, InviteRedemption, Role};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};
use crate::store::InviteStore;

pub struct InviteDao {
    pub codes: BaseDao<InviteCode>,
    pub log: BaseDao<InviteRedemption>,
}

impl InviteDao {
    pub fn new(db: &Database) -> Self {
        Self {
            codes: BaseDao::new(db, InviteCode::COLLECTION),
            log: BaseDao::new(db, InviteRedemption::COLLECTION),
        }
    }
}

#[async_trait]
impl InviteStore for InviteDao {
    async fn redeem(&self, code: &str, role: Role) -> DaoResult<bool> {
        // Matching and decrementing happen in one findAndModify on the server.
        // The pipeline stage sees pre-update values, so `active` flips off
        // exactly when the last use is taken.
        let filter = doc! {
            "code": code,
            "active": true,
            "target_role": role.as_str(),
            "remaining_uses": { "$gt": 0 },
        };
        let update = vec![doc! {
            "$set": {
                "remaining_uses": { "$subtract": ["$remaining_uses", 1] },
                "active": { "$gt": ["$remaining_uses", 1] },
                "updated_at": "$$NOW",
            }
        }];

        let updated = self
            .codes
            .collection()
            .find_one_and_update(filter, update)
            .await?;
        Ok(updated.is_some())
    }

    async fn append_log(&self, entry: &InviteRedemption) -> DaoResult<()> {
        self.log.insert_one(entry).await?;
        Ok(())
    }

    async fn insert(&self, invite: &InviteCode) -> DaoResult<InviteCode> {
        let id = self.codes.insert_one(invite).await?;
        self.codes.find_by_id(id).await
    }

    async fn find_by_code(&self, code: &str) -> DaoResult<Option<InviteCode>> {
        self.codes.find_one(doc! { "code": code }).await
    }

    async fn list(&self) -> DaoResult<Vec<InviteCode>> {
        self.codes
            .find_many(Document::new(), Some(doc! { "created_at": -1 }))
            .await
    }

    async fn deactivate(&self, code: &str) -> DaoResult<bool> {
        self.codes
            .update_one(doc! { "code": code }, doc! { "$set": { "active": false } })
            .await
    }

    async fn list_log(&self, code: Option<&str>) -> DaoResult<Vec<InviteRedemption>> {
        let filter = match code {
            Some(code) => doc! { "code": code },
            None => Document::new(),
        };
        self.log
            .find_many(filter, Some(doc! { "created_at": 1 }))
            .await
    }
}
