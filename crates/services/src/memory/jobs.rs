use async_trait::async_trait;
use bson::oid::ObjectId;
use crewledger_db::models::{Job, JobPatch};
use dashmap::DashMap;

use crate::dao::base::DaoResult;
use crate::store::JobStore;

#[derive(Default)]
pub struct MemoryJobs {
    jobs: DashMap<ObjectId, Job>,
}

#[async_trait]
impl JobStore for MemoryJobs {
    async fn find(&self, id: ObjectId) -> DaoResult<Option<Job>> {
        Ok(self.jobs.get(&id).map(|j| j.value().clone()))
    }

    async fn list(&self) -> DaoResult<Vec<Job>> {
        let mut jobs: Vec<Job> = self.jobs.iter().map(|j| j.value().clone()).collect();
        jobs.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(jobs)
    }

    async fn insert(&self, job: &Job) -> DaoResult<Job> {
        let id = ObjectId::new();
        let mut stored = job.clone();
        stored.id = Some(id);
        self.jobs.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: ObjectId, patch: &JobPatch) -> DaoResult<bool> {
        Ok(match self.jobs.get_mut(&id) {
            Some(mut job) => {
                patch.apply_to(job.value_mut());
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: ObjectId) -> DaoResult<bool> {
        Ok(self.jobs.remove(&id).is_some())
    }
}
