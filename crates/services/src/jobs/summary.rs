use std::collections::HashMap;

use bson::oid::ObjectId;
use chrono::NaiveDate;
use crewledger_db::models::{Job, JobStatus, PaymentStatus, Worker};
use serde::Serialize;

/// Inclusive bounds on a job's start date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkerRevenue {
    pub worker_id: String,
    pub worker_name: String,
    pub jobs: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct JobSummary {
    pub total_jobs: usize,
    pub completed_jobs: usize,
    pub in_progress_jobs: usize,
    pub total_value: f64,
    pub paid_amount: f64,
    pub pending_amount: f64,
    /// Highest revenue first.
    pub by_worker: Vec<WorkerRevenue>,
}

pub fn summarize(jobs: &[Job], workers: &[Worker], range: &DateRange) -> JobSummary {
    let names: HashMap<ObjectId, &str> = workers
        .iter()
        .filter_map(|w| w.id.map(|id| (id, w.name.as_str())))
        .collect();

    let mut summary = JobSummary::default();
    let mut per_worker: HashMap<ObjectId, (usize, f64)> = HashMap::new();

    for job in jobs.iter().filter(|j| range.contains(j.start_date)) {
        summary.total_jobs += 1;
        summary.total_value += job.amount;
        match job.payment_status {
            PaymentStatus::Paid => summary.paid_amount += job.amount,
            PaymentStatus::Pending => summary.pending_amount += job.amount,
        }
        match job.status {
            JobStatus::Completed => summary.completed_jobs += 1,
            JobStatus::InProgress => summary.in_progress_jobs += 1,
        }

        let entry = per_worker.entry(job.worker_id).or_default();
        entry.0 += 1;
        entry.1 += job.amount;
    }

    summary.by_worker = per_worker
        .into_iter()
        .map(|(worker_id, (jobs, revenue))| WorkerRevenue {
            worker_id: worker_id.to_hex(),
            worker_name: names
                .get(&worker_id)
                .map(|n| n.to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            jobs,
            revenue,
        })
        .collect();
    summary.by_worker.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.worker_name.cmp(&b.worker_name))
    });

    summary
}
