use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use crewledger_db::models::{Role, RoleProfile};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};
use crate::store::ProfileStore;

pub struct ProfileDao {
    pub base: BaseDao<RoleProfile>,
}

impl ProfileDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, RoleProfile::COLLECTION),
        }
    }
}

#[async_trait]
impl ProfileStore for ProfileDao {
    async fn find(&self, account_id: ObjectId) -> DaoResult<Option<RoleProfile>> {
        self.base.find_one(doc! { "_id": account_id }).await
    }

    async fn upsert(&self, account_id: ObjectId, role: Role) -> DaoResult<RoleProfile> {
        self.base
            .upsert_one(
                doc! { "_id": account_id },
                doc! {
                    "$set": { "role": role.as_str() },
                    "$setOnInsert": { "created_at": DateTime::now() },
                },
            )
            .await?;
        self.base.find_by_id(account_id).await
    }
}
