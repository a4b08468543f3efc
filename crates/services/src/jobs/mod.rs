mod cache;
pub mod lifecycle;
mod service;
pub mod summary;

pub use cache::ListCache;
pub use lifecycle::{JobEdit, NewJob, Transition};
pub use service::{JobError, JobFilter, JobListing, JobService, WorkerInput};
pub use summary::{DateRange, JobSummary, WorkerRevenue};
