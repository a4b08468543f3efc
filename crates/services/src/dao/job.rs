use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use crewledger_db::models::{Job, JobPatch};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};
use crate::store::JobStore;

pub struct JobDao {
    pub base: BaseDao<Job>,
}

impl JobDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Job::COLLECTION),
        }
    }
}

#[async_trait]
impl JobStore for JobDao {
    async fn find(&self, id: ObjectId) -> DaoResult<Option<Job>> {
        self.base.find_one(doc! { "_id": id }).await
    }

    async fn list(&self) -> DaoResult<Vec<Job>> {
        self.base
            .find_many(Document::new(), Some(doc! { "created_at": -1 }))
            .await
    }

    async fn insert(&self, job: &Job) -> DaoResult<Job> {
        let id = self.base.insert_one(job).await?;
        self.base.find_by_id(id).await
    }

    async fn update(&self, id: ObjectId, patch: &JobPatch) -> DaoResult<bool> {
        let set = patch.to_set_document()?;
        self.base.update_by_id(id, doc! { "$set": set }).await
    }

    async fn delete(&self, id: ObjectId) -> DaoResult<bool> {
        self.base.delete_by_id(id).await
    }
}
