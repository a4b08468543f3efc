//! Role-based policy for job and worker operations.
//!
//! `authorize` is a pure function of the caller's role state and the requested
//! operation. Anything other than a resolved role is denied.

use bson::oid::ObjectId;
use crewledger_db::models::{Account, Role};
use thiserror::Error;

use crate::resolver::RoleState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `worker_id` is the worker the job is being filed under; `own_worker_id`
    /// is the worker entity bound to the caller's identity, if any.
    SubmitJob {
        worker_id: ObjectId,
        own_worker_id: Option<ObjectId>,
    },
    ViewAll,
    MarkPaid,
    MarkCompleted,
    EditJob,
    DeleteJob,
    ManageWorkers,
    ManageInvites,
    ManageRoles,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SubmitJob { .. } => "submit jobs",
            Operation::ViewAll => "view all jobs",
            Operation::MarkPaid => "mark jobs paid",
            Operation::MarkCompleted => "mark jobs completed",
            Operation::EditJob => "edit jobs",
            Operation::DeleteJob => "delete jobs",
            Operation::ManageWorkers => "manage workers",
            Operation::ManageInvites => "manage invite codes",
            Operation::ManageRoles => "manage roles",
        }
    }

    fn allowed_roles(&self) -> &'static [Role] {
        const EVERYONE: &[Role] = &[Role::Worker, Role::Manager, Role::Admin];
        const STAFF: &[Role] = &[Role::Manager, Role::Admin];
        const ADMIN: &[Role] = &[Role::Admin];

        match self {
            Operation::SubmitJob { .. } => EVERYONE,
            Operation::ViewAll
            | Operation::MarkPaid
            | Operation::MarkCompleted
            | Operation::EditJob
            | Operation::DeleteJob
            | Operation::ManageWorkers => STAFF,
            Operation::ManageInvites | Operation::ManageRoles => ADMIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("not signed in")]
    SignedOut,
    #[error("role is still loading")]
    RoleLoading,
    #[error("no role has been assigned to this account; contact an administrator")]
    ProfileMissing,
    #[error("role `{role}` may not {operation}")]
    InsufficientRole { role: Role, operation: &'static str },
    #[error("workers may only submit jobs under their own identity")]
    NotOwnIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// The resolved role, or the reason there is none yet.
pub fn require_role(role: &RoleState) -> Result<Role, DenyReason> {
    match role {
        RoleState::Resolved(role) => Ok(*role),
        RoleState::Loading => Err(DenyReason::RoleLoading),
        RoleState::Unresolved => Err(DenyReason::ProfileMissing),
        RoleState::SignedOut => Err(DenyReason::SignedOut),
    }
}

pub fn authorize(role: &RoleState, operation: Operation) -> Decision {
    let role = match require_role(role) {
        Ok(role) => role,
        Err(reason) => return Decision::Deny(reason),
    };

    if !operation.allowed_roles().contains(&role) {
        return Decision::Deny(DenyReason::InsufficientRole {
            role,
            operation: operation.name(),
        });
    }

    if let Operation::SubmitJob {
        worker_id,
        own_worker_id,
    } = operation
    {
        if role == Role::Worker && own_worker_id != Some(worker_id) {
            return Decision::Deny(DenyReason::NotOwnIdentity);
        }
    }

    Decision::Allow
}

/// The identity and role state an operation is performed under.
#[derive(Debug, Clone)]
pub struct Caller {
    pub account: Account,
    pub role: RoleState,
}

impl Caller {
    pub fn new(account: Account, role: RoleState) -> Self {
        Self { account, role }
    }

    pub fn authorize(&self, operation: Operation) -> Result<(), DenyReason> {
        authorize(&self.role, operation).into_result()
    }

    pub fn require_role(&self) -> Result<Role, DenyReason> {
        require_role(&self.role)
    }
}
