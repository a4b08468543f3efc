pub mod base;
pub mod invite;
pub mod job;
pub mod profile;
pub mod session;
pub mod user;
pub mod worker;

pub use base::BaseDao;
