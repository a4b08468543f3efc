use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use crewledger_db::models::User;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};
use crate::store::AccountStore;

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }
}

#[async_trait]
impl AccountStore for UserDao {
    async fn insert(&self, user: &User) -> DaoResult<User> {
        let id = self.base.insert_one(user).await?;
        self.base.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> DaoResult<Option<User>> {
        self.base.find_one(doc! { "email": email }).await
    }

    async fn find_by_id(&self, id: ObjectId) -> DaoResult<Option<User>> {
        self.base.find_one(doc! { "_id": id }).await
    }

    async fn touch_sign_in(&self, id: ObjectId) -> DaoResult<()> {
        self.base
            .update_by_id(id, doc! { "$set": { "last_sign_in_at": DateTime::now() } })
            .await?;
        Ok(())
    }
}
