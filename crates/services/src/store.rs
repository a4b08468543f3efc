use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use crewledger_db::models::{
    InviteCode, InviteRedemption, Job, JobPatch, RevokedSession, Role, RoleProfile, User,
    Worker,
};
use mongodb::Database;

use crate::dao::{
    base::DaoResult, invite::InviteDao, job::JobDao, profile::ProfileDao, session::SessionDao,
    user::UserDao, worker::WorkerDao,
};
use crate::memory::{
    MemoryAccounts, MemoryInvites, MemoryJobs, MemoryProfiles, MemorySessions, MemoryWorkers,
};

/// Account records backing the built-in credential provider.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `DaoError::DuplicateKey` when the email is taken.
    async fn insert(&self, user: &User) -> DaoResult<User>;
    async fn find_by_email(&self, email: &str) -> DaoResult<Option<User>>;
    async fn find_by_id(&self, id: ObjectId) -> DaoResult<Option<User>>;
    async fn touch_sign_in(&self, id: ObjectId) -> DaoResult<()>;
}

/// Signed-out session ids, shared by every process using the same backend.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Idempotent; revoking twice keeps the later `forget_after`.
    async fn revoke(&self, entry: &RevokedSession) -> DaoResult<()>;
    /// True while a revocation for `session_id` has not passed `forget_after`.
    async fn is_revoked(&self, session_id: &str) -> DaoResult<bool>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find(&self, account_id: ObjectId) -> DaoResult<Option<RoleProfile>>;
    /// Creates or overwrites the profile for `account_id`.
    async fn upsert(&self, account_id: ObjectId, role: Role) -> DaoResult<RoleProfile>;
}

#[async_trait]
pub trait InviteStore: Send + Sync {
    /// Check-and-decrement as one atomic step. Returns false without touching
    /// the record when it is missing, inactive, exhausted or for another role.
    async fn redeem(&self, code: &str, role: Role) -> DaoResult<bool>;
    async fn append_log(&self, entry: &InviteRedemption) -> DaoResult<()>;
    async fn insert(&self, invite: &InviteCode) -> DaoResult<InviteCode>;
    async fn find_by_code(&self, code: &str) -> DaoResult<Option<InviteCode>>;
    async fn list(&self) -> DaoResult<Vec<InviteCode>>;
    async fn deactivate(&self, code: &str) -> DaoResult<bool>;
    async fn list_log(&self, code: Option<&str>) -> DaoResult<Vec<InviteRedemption>>;
}

#[async_trait]
pub trait WorkerStore: Send + Sync {
    async fn find(&self, id: ObjectId) -> DaoResult<Option<Worker>>;
    async fn find_by_account(&self, account_id: ObjectId) -> DaoResult<Option<Worker>>;
    /// Case-insensitive.
    async fn find_by_email(&self, email: &str) -> DaoResult<Option<Worker>>;
    /// Case-insensitive, only workers not yet bound to an account.
    async fn find_unbound_by_name(&self, name: &str) -> DaoResult<Option<Worker>>;
    async fn list(&self) -> DaoResult<Vec<Worker>>;
    async fn insert(&self, worker: &Worker) -> DaoResult<Worker>;
    async fn replace(&self, worker: &Worker) -> DaoResult<bool>;
    async fn set_active(&self, id: ObjectId, active: bool) -> DaoResult<bool>;
    async fn bind_account(&self, id: ObjectId, account_id: ObjectId) -> DaoResult<bool>;
    async fn delete(&self, id: ObjectId) -> DaoResult<bool>;
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn find(&self, id: ObjectId) -> DaoResult<Option<Job>>;
    /// Newest first.
    async fn list(&self) -> DaoResult<Vec<Job>>;
    async fn insert(&self, job: &Job) -> DaoResult<Job>;
    async fn update(&self, id: ObjectId, patch: &JobPatch) -> DaoResult<bool>;
    async fn delete(&self, id: ObjectId) -> DaoResult<bool>;
}

/// Every store the services need, behind trait objects.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub invites: Arc<dyn InviteStore>,
    pub workers: Arc<dyn WorkerStore>,
    pub jobs: Arc<dyn JobStore>,
}

impl Stores {
    pub fn mongo(db: &Database) -> Self {
        Self {
            accounts: Arc::new(UserDao::new(db)),
            sessions: Arc::new(SessionDao::new(db)),
            profiles: Arc::new(ProfileDao::new(db)),
            invites: Arc::new(InviteDao::new(db)),
            workers: Arc::new(WorkerDao::new(db)),
            jobs: Arc::new(JobDao::new(db)),
        }
    }

    pub fn memory() -> Self {
        Self {
            accounts: Arc::new(MemoryAccounts::default()),
            sessions: Arc::new(MemorySessions::default()),
            profiles: Arc::new(MemoryProfiles::default()),
            invites: Arc::new(MemoryInvites::default()),
            workers: Arc::new(MemoryWorkers::default()),
            jobs: Arc::new(MemoryJobs::default()),
        }
    }
}
