pub mod auth;
pub mod invite;
pub mod job;
pub mod profile;
pub mod worker;
