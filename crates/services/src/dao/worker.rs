use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use crewledger_db::models::Worker;
use mongodb::{
    Database,
    options::{Collation, CollationStrength},
};

use super::base::{BaseDao, DaoResult};
use crate::store::WorkerStore;

pub struct WorkerDao {
    pub base: BaseDao<Worker>,
}

impl WorkerDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Worker::COLLECTION),
        }
    }

    async fn find_one_ignoring_case(&self, filter: Document) -> DaoResult<Option<Worker>> {
        let collation = Collation::builder()
            .locale("en")
            .strength(CollationStrength::Secondary)
            .build();
        Ok(self
            .base
            .collection()
            .find_one(filter)
            .collation(collation)
            .await?)
    }
}

#[async_trait]
impl WorkerStore for WorkerDao {
    async fn find(&self, id: ObjectId) -> DaoResult<Option<Worker>> {
        self.base.find_one(doc! { "_id": id }).await
    }

    async fn find_by_account(&self, account_id: ObjectId) -> DaoResult<Option<Worker>> {
        self.base.find_one(doc! { "account_id": account_id }).await
    }

    async fn find_by_email(&self, email: &str) -> DaoResult<Option<Worker>> {
        self.find_one_ignoring_case(doc! { "email": email }).await
    }

    async fn find_unbound_by_name(&self, name: &str) -> DaoResult<Option<Worker>> {
        self.find_one_ignoring_case(doc! { "name": name, "account_id": null })
            .await
    }

    async fn list(&self) -> DaoResult<Vec<Worker>> {
        self.base
            .find_many(Document::new(), Some(doc! { "created_at": -1 }))
            .await
    }

    async fn insert(&self, worker: &Worker) -> DaoResult<Worker> {
        let id = self.base.insert_one(worker).await?;
        self.base.find_by_id(id).await
    }

    async fn replace(&self, worker: &Worker) -> DaoResult<bool> {
        match worker.id {
            Some(id) => self.base.replace_by_id(id, worker).await,
            None => Ok(false),
        }
    }

    async fn set_active(&self, id: ObjectId, active: bool) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "active": active } })
            .await
    }

    async fn bind_account(&self, id: ObjectId, account_id: ObjectId) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "account_id": account_id } })
            .await
    }

    async fn delete(&self, id: ObjectId) -> DaoResult<bool> {
        self.base.delete_by_id(id).await
    }
}
