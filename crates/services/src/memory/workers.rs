use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use crewledger_db::models::Worker;
use dashmap::DashMap;

use crate::dao::base::DaoResult;
use crate::store::WorkerStore;

#[derive(Default)]
pub struct MemoryWorkers {
    workers: DashMap<ObjectId, Worker>,
}

impl MemoryWorkers {
    fn find_first(&self, matches: impl Fn(&Worker) -> bool) -> Option<Worker> {
        let mut found: Vec<Worker> = self
            .workers
            .iter()
            .filter(|w| matches(w.value()))
            .map(|w| w.value().clone())
            .collect();
        // Oldest match wins, mirroring the natural order of the collection.
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found.into_iter().next()
    }

    fn update(&self, id: ObjectId, apply: impl FnOnce(&mut Worker)) -> bool {
        match self.workers.get_mut(&id) {
            Some(mut worker) => {
                apply(worker.value_mut());
                worker.updated_at = DateTime::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl WorkerStore for MemoryWorkers {
    async fn find(&self, id: ObjectId) -> DaoResult<Option<Worker>> {
        Ok(self.workers.get(&id).map(|w| w.value().clone()))
    }

    async fn find_by_account(&self, account_id: ObjectId) -> DaoResult<Option<Worker>> {
        Ok(self.find_first(|w| w.account_id == Some(account_id)))
    }

    async fn find_by_email(&self, email: &str) -> DaoResult<Option<Worker>> {
        Ok(self.find_first(|w| {
            w.email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        }))
    }

    async fn find_unbound_by_name(&self, name: &str) -> DaoResult<Option<Worker>> {
        Ok(self.find_first(|w| w.account_id.is_none() && w.name.eq_ignore_ascii_case(name)))
    }

    async fn list(&self) -> DaoResult<Vec<Worker>> {
        let mut workers: Vec<Worker> = self.workers.iter().map(|w| w.value().clone()).collect();
        workers.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(workers)
    }

    async fn insert(&self, worker: &Worker) -> DaoResult<Worker> {
        let id = ObjectId::new();
        let mut stored = worker.clone();
        stored.id = Some(id);
        self.workers.insert(id, stored.clone());
        Ok(stored)
    }

    async fn replace(&self, worker: &Worker) -> DaoResult<bool> {
        let Some(id) = worker.id else {
            return Ok(false);
        };
        Ok(self.update(id, |existing| *existing = worker.clone()))
    }

    async fn set_active(&self, id: ObjectId, active: bool) -> DaoResult<bool> {
        Ok(self.update(id, |w| w.active = active))
    }

    async fn bind_account(&self, id: ObjectId, account_id: ObjectId) -> DaoResult<bool> {
        Ok(self.update(id, |w| w.account_id = Some(account_id)))
    }

    async fn delete(&self, id: ObjectId) -> DaoResult<bool> {
        Ok(self.workers.remove(&id).is_some())
    }
}
