pub mod auth;
pub mod authorizer;
pub mod dao;
pub mod invite;
pub mod jobs;
pub mod memory;
pub mod provisioning;
pub mod resolver;
pub mod store;

pub use auth::{AuthService, CredentialProvider, LocalCredentialProvider};
pub use authorizer::{Caller, Decision, DenyReason, Operation, authorize};
pub use invite::{InviteError, InviteLedger};
pub use jobs::{JobError, JobService};
pub use provisioning::{RoleIssuanceService, SignUpOutcome, SignUpRequest, SignupError};
pub use resolver::{RoleResolver, RoleState};
pub use store::Stores;
