pub mod invite_code;
pub mod invite_redemption;
pub mod job;
pub mod profile;
pub mod session;
pub mod user;
pub mod worker;

pub use invite_code::InviteCode;
pub use invite_redemption::InviteRedemption;
pub use job::{Job, JobPatch, JobStatus, PaymentStatus, ServiceType};
pub use profile::{Role, RoleProfile};
pub use session::RevokedSession;
pub use user::{Account, AccountMetadata, User};
pub use worker::Worker;
