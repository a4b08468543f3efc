
#[cfg(test)]
mod invite_tests;
#[cfg(test)]
mod job_tests;
#[cfg(test)]
mod worker_tests;
