use std::collections::HashMap;
use std::sync::Arc;

use bson::oid::ObjectId;
use crewledger_db::models::{Account, Job, JobStatus, PaymentStatus, Role, Worker};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::cache::ListCache;
use super::lifecycle::{self, JobEdit, NewJob, Transition};
use super::summary::{self, DateRange, JobSummary};
use crate::authorizer::{Caller, DenyReason, Operation};
use crate::dao::base::DaoError;
use crate::store::{JobStore, WorkerStore};

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Denied(#[from] DenyReason),
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(#[from] DaoError),
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub payment_status: Option<PaymentStatus>,
    pub status: Option<JobStatus>,
    pub worker_id: Option<ObjectId>,
    /// Case-insensitive match on worker name or location.
    pub search: Option<String>,
    pub range: DateRange,
}

#[derive(Debug, Clone)]
pub struct JobListing {
    pub job: Job,
    pub worker_name: Option<String>,
}

/// Create or update a worker. `id: None` creates.
#[derive(Debug, Clone, Default)]
pub struct WorkerInput {
    pub id: Option<ObjectId>,
    pub name: String,
    pub contact_info: Option<String>,
    pub email: Option<String>,
    pub specialty: String,
    pub active: Option<bool>,
}

pub struct JobService {
    jobs: Arc<dyn JobStore>,
    workers: Arc<dyn WorkerStore>,
    job_cache: ListCache<Job>,
    worker_cache: ListCache<Worker>,
}

impl JobService {
    pub fn new(jobs: Arc<dyn JobStore>, workers: Arc<dyn WorkerStore>) -> Self {
        Self {
            jobs,
            workers,
            job_cache: ListCache::default(),
            worker_cache: ListCache::default(),
        }
    }

    async fn all_jobs(&self) -> Result<Arc<Vec<Job>>, JobError> {
        Ok(self.job_cache.get_or_load(|| self.jobs.list()).await?)
    }

    async fn all_workers(&self) -> Result<Arc<Vec<Worker>>, JobError> {
        Ok(self.worker_cache.get_or_load(|| self.workers.list()).await?)
    }

    /// Staff see every job. Workers see the jobs filed under their own worker.
    pub async fn list_jobs(
        &self,
        caller: &Caller,
        filter: &JobFilter,
    ) -> Result<Vec<JobListing>, JobError> {
        let role = caller.require_role()?;
        let scope = match caller.authorize(Operation::ViewAll) {
            Ok(()) => None,
            Err(_) if role == Role::Worker => {
                match self.workers.find_by_account(caller.account.id).await? {
                    Some(Worker { id: Some(id), .. }) => Some(id),
                    _ => return Ok(Vec::new()),
                }
            }
            Err(reason) => return Err(reason.into()),
        };

        let jobs = self.all_jobs().await?;
        let workers = self.all_workers().await?;
        let names: HashMap<ObjectId, &str> = workers
            .iter()
            .filter_map(|w| w.id.map(|id| (id, w.name.as_str())))
            .collect();
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        Ok(jobs
            .iter()
            .filter(|job| scope.is_none_or(|own| job.worker_id == own))
            .filter(|job| filter.worker_id.is_none_or(|id| job.worker_id == id))
            .filter(|job| filter.payment_status.is_none_or(|s| job.payment_status == s))
            .filter(|job| filter.status.is_none_or(|s| job.status == s))
            .filter(|job| filter.range.contains(job.start_date))
            .filter(|job| {
                needle.as_deref().is_none_or(|needle| {
                    job.location.to_lowercase().contains(needle)
                        || names
                            .get(&job.worker_id)
                            .is_some_and(|name| name.to_lowercase().contains(needle))
                })
            })
            .map(|job| JobListing {
                job: job.clone(),
                worker_name: names.get(&job.worker_id).map(|n| n.to_string()),
            })
            .collect())
    }

    pub async fn get_job(&self, caller: &Caller, id: ObjectId) -> Result<Job, JobError> {
        let role = caller.require_role()?;
        let job = self.find_job(id).await?;
        if caller.authorize(Operation::ViewAll).is_ok() {
            return Ok(job);
        }
        let own = match role {
            Role::Worker => self.workers.find_by_account(caller.account.id).await?,
            _ => None,
        };
        if own.and_then(|w| w.id) == Some(job.worker_id) {
            Ok(job)
        } else {
            // Don't reveal jobs filed under someone else.
            Err(JobError::NotFound("job"))
        }
    }

    pub async fn submit_job(&self, caller: &Caller, input: NewJob) -> Result<Job, JobError> {
        let role = caller.require_role()?;
        let requested = input.worker_id;
        let valid = input.validate().map_err(JobError::Validation)?;

        let (worker_id, own_worker_id) = if role == Role::Worker {
            // Settle a foreign claim on reads alone so a denial binds or creates nothing.
            let matched = self
                .identity_worker(&caller.account)
                .await?
                .and_then(|w| w.id);
            if let Some(claimed) = requested.filter(|id| Some(*id) != matched) {
                let reason = caller
                    .authorize(Operation::SubmitJob {
                        worker_id: claimed,
                        own_worker_id: matched,
                    })
                    .err()
                    .unwrap_or(DenyReason::NotOwnIdentity);
                warn!(account_id = %caller.account.id, worker_id = %claimed, %reason, "Job submission denied");
                return Err(reason.into());
            }

            let own = self
                .ensure_worker_for_identity(&caller.account, valid.service_type().as_str())
                .await?;
            let own_id = own.id.ok_or(JobError::NotFound("worker"))?;
            (own_id, Some(own_id))
        } else {
            let worker_id = requested
                .ok_or_else(|| JobError::Validation("worker is required".to_string()))?;
            (worker_id, None)
        };

        if let Err(reason) = caller.authorize(Operation::SubmitJob {
            worker_id,
            own_worker_id,
        }) {
            warn!(account_id = %caller.account.id, %worker_id, %reason, "Job submission denied");
            return Err(reason.into());
        }

        let worker = self
            .workers
            .find(worker_id)
            .await?
            .ok_or_else(|| JobError::Validation("unknown worker".to_string()))?;
        if !worker.active {
            return Err(JobError::Validation(format!(
                "worker {} is inactive",
                worker.name
            )));
        }

        let job = self
            .jobs
            .insert(&valid.into_job(worker_id, caller.account.id))
            .await?;
        self.job_cache.invalidate();

        info!(
            job_id = ?job.id,
            %worker_id,
            submitted_by = %caller.account.id,
            amount = job.amount,
            "Job submitted"
        );
        Ok(job)
    }

    /// Finds the worker bound to `account`, binding or creating one on first
    /// use. Matches by account, then email, then an unbound worker's name.
    /// The worker `account` owns or would be bound to, without writing:
    /// its bound worker, else an unbound one with the same email, else an
    /// unbound one with the same name.
    async fn identity_worker(&self, account: &Account) -> Result<Option<Worker>, JobError> {
        if let Some(worker) = self.workers.find_by_account(account.id).await? {
            return Ok(Some(worker));
        }
        let by_email = self
            .workers
            .find_by_email(&account.email)
            .await?
            .filter(|w| w.account_id.is_none());
        match by_email {
            Some(worker) => Ok(Some(worker)),
            None => Ok(self.workers.find_unbound_by_name(&account.display_name).await?),
        }
    }

    pub async fn ensure_worker_for_identity(
        &self,
        account: &Account,
        specialty: &str,
    ) -> Result<Worker, JobError> {
        let candidate = match self.identity_worker(account).await? {
            Some(worker) if worker.account_id.is_some() => return Ok(worker),
            other => other,
        };

        if let Some(mut worker) = candidate {
            let id = worker.id.ok_or(JobError::NotFound("worker"))?;
            self.workers.bind_account(id, account.id).await?;
            self.worker_cache.invalidate();
            worker.account_id = Some(account.id);
            info!(worker_id = %id, account_id = %account.id, "Bound existing worker to account");
            return Ok(worker);
        }

        let mut worker = Worker::new(account.display_name.clone(), specialty.to_string());
        worker.email = Some(account.email.clone());
        worker.account_id = Some(account.id);
        let worker = self.workers.insert(&worker).await?;
        self.worker_cache.invalidate();
        info!(worker_id = ?worker.id, account_id = %account.id, "Created worker for account");
        Ok(worker)
    }

    pub async fn mark_paid(&self, caller: &Caller, id: ObjectId) -> Result<Job, JobError> {
        caller.authorize(Operation::MarkPaid)?;
        let job = self.find_job(id).await?;
        self.transition(job, lifecycle::mark_paid, "Job marked paid")
            .await
    }

    pub async fn mark_completed(&self, caller: &Caller, id: ObjectId) -> Result<Job, JobError> {
        caller.authorize(Operation::MarkCompleted)?;
        let job = self.find_job(id).await?;
        self.transition(job, lifecycle::mark_completed, "Job marked completed")
            .await
    }

    async fn transition(
        &self,
        job: Job,
        next: fn(&Job) -> Transition,
        message: &'static str,
    ) -> Result<Job, JobError> {
        let id = job.id.ok_or(JobError::NotFound("job"))?;
        match next(&job) {
            Transition::Unchanged => {
                debug!(job_id = %id, "Job already in target state");
                Ok(job)
            }
            Transition::Apply(patch) => {
                if !self.jobs.update(id, &patch).await? {
                    return Err(JobError::NotFound("job"));
                }
                self.job_cache.invalidate();
                info!(job_id = %id, "{message}");
                self.find_job(id).await
            }
        }
    }

    pub async fn edit_job(
        &self,
        caller: &Caller,
        id: ObjectId,
        edit: JobEdit,
    ) -> Result<Job, JobError> {
        caller.authorize(Operation::EditJob)?;
        let job = self.find_job(id).await?;
        let patch = lifecycle::edit_patch(&job, edit).map_err(JobError::Validation)?;
        if patch.is_empty() {
            return Ok(job);
        }

        if !self.jobs.update(id, &patch).await? {
            return Err(JobError::NotFound("job"));
        }
        self.job_cache.invalidate();
        info!(job_id = %id, edited_by = %caller.account.id, "Job edited");
        self.find_job(id).await
    }

    pub async fn delete_job(&self, caller: &Caller, id: ObjectId) -> Result<(), JobError> {
        caller.authorize(Operation::DeleteJob)?;
        if !self.jobs.delete(id).await? {
            return Err(JobError::NotFound("job"));
        }
        self.job_cache.invalidate();
        info!(job_id = %id, deleted_by = %caller.account.id, "Job deleted");
        Ok(())
    }

    pub async fn summary(&self, caller: &Caller, range: DateRange) -> Result<JobSummary, JobError> {
        caller.authorize(Operation::ViewAll)?;
        let jobs = self.all_jobs().await?;
        let workers = self.all_workers().await?;
        Ok(summary::summarize(&jobs, &workers, &range))
    }

    pub async fn list_workers(&self, caller: &Caller) -> Result<Vec<Worker>, JobError> {
        caller.authorize(Operation::ManageWorkers)?;
        Ok(self.all_workers().await?.as_ref().clone())
    }

    pub async fn upsert_worker(
        &self,
        caller: &Caller,
        input: WorkerInput,
    ) -> Result<Worker, JobError> {
        caller.authorize(Operation::ManageWorkers)?;
        let name = input.name.trim().to_string();
        let specialty = input.specialty.trim().to_string();
        if name.is_empty() || specialty.is_empty() {
            return Err(JobError::Validation(
                "worker name and specialty are required".to_string(),
            ));
        }
        let contact_info = input
            .contact_info
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let email = input
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());

        let worker = match input.id {
            Some(id) => {
                let mut worker = self
                    .workers
                    .find(id)
                    .await?
                    .ok_or(JobError::NotFound("worker"))?;
                worker.name = name;
                worker.specialty = specialty;
                worker.contact_info = contact_info;
                worker.email = email;
                if let Some(active) = input.active {
                    worker.active = active;
                }
                worker.updated_at = bson::DateTime::now();
                if !self.workers.replace(&worker).await? {
                    return Err(JobError::NotFound("worker"));
                }
                info!(worker_id = %id, "Worker updated");
                worker
            }
            None => {
                let mut worker = Worker::new(name, specialty);
                worker.contact_info = contact_info;
                worker.email = email;
                worker.active = input.active.unwrap_or(true);
                let worker = self.workers.insert(&worker).await?;
                info!(worker_id = ?worker.id, "Worker created");
                worker
            }
        };
        self.worker_cache.invalidate();
        Ok(worker)
    }

    pub async fn set_worker_active(
        &self,
        caller: &Caller,
        id: ObjectId,
        active: bool,
    ) -> Result<Worker, JobError> {
        caller.authorize(Operation::ManageWorkers)?;
        if !self.workers.set_active(id, active).await? {
            return Err(JobError::NotFound("worker"));
        }
        self.worker_cache.invalidate();
        info!(worker_id = %id, active, "Worker activation changed");
        self.workers
            .find(id)
            .await?
            .ok_or(JobError::NotFound("worker"))
    }

    /// Jobs filed under the worker are kept.
    pub async fn delete_worker(&self, caller: &Caller, id: ObjectId) -> Result<(), JobError> {
        caller.authorize(Operation::ManageWorkers)?;
        if !self.workers.delete(id).await? {
            return Err(JobError::NotFound("worker"));
        }
        self.worker_cache.invalidate();
        info!(worker_id = %id, deleted_by = %caller.account.id, "Worker deleted");
        Ok(())
    }

    async fn find_job(&self, id: ObjectId) -> Result<Job, JobError> {
        self.jobs.find(id).await?.ok_or(JobError::NotFound("job"))
    }
}
