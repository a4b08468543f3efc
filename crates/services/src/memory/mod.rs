//! In-process stores with the same contracts as the MongoDB DAOs.
//!
//! Used by the test suites and by `database.backend = "memory"`.

mod accounts;
mod invites;
mod jobs;
mod profiles;
mod sessions;
mod workers;

pub use accounts::MemoryAccounts;
pub use invites::MemoryInvites;
pub use jobs::MemoryJobs;
pub use profiles::MemoryProfiles;
pub use sessions::MemorySessions;
pub use workers::MemoryWorkers;
