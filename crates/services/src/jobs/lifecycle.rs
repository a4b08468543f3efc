//! Field validation and state transitions for job records.

use bson::{oid::ObjectId, DateTime};
use chrono::NaiveDate;
use crewledger_db::models::{Job, JobPatch, JobStatus, PaymentStatus, ServiceType};

pub const PAYMENT_METHODS: [&str; 4] = ["cash", "bank_transfer", "check", "credit_card"];
const OTHER_PAYMENT_METHOD: &str = "other";

/// A job as submitted, before validation.
#[derive(Debug, Clone, Default)]
pub struct NewJob {
    pub worker_id: Option<ObjectId>,
    pub service_type: String,
    pub location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: String,
    pub amount: f64,
    pub payment_method: String,
    /// Free text used when `payment_method` is `other`.
    pub payment_method_other: Option<String>,
    pub status: Option<JobStatus>,
    pub images: Vec<String>,
}

/// Requested changes to an existing job, before validation.
#[derive(Debug, Clone, Default)]
pub struct JobEdit {
    pub service_type: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_method_other: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Apply(JobPatch),
    /// Already in the target state.
    Unchanged,
}

pub fn parse_service_type(raw: &str) -> Result<ServiceType, String> {
    if raw.trim().is_empty() {
        return Err("service type is required".to_string());
    }
    raw.parse()
}

/// Resolves the stored payment method text. `other` is replaced by its
/// specification.
pub fn payment_method(method: &str, other: Option<&str>) -> Result<String, String> {
    let method = method.trim().to_ascii_lowercase();
    if method == OTHER_PAYMENT_METHOD {
        return match other.map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err("please specify the payment method".to_string()),
        };
    }
    if PAYMENT_METHODS.contains(&method.as_str()) {
        Ok(method)
    } else {
        Err(format!("unknown payment method `{method}`"))
    }
}

fn check_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() || amount < 0.0 {
        return Err("amount must be a non-negative number".to_string());
    }
    Ok(())
}

fn check_dates(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), String> {
    match end {
        Some(end) if end < start => Err(format!(
            "end date {end} is before start date {start}"
        )),
        _ => Ok(()),
    }
}

/// A submission that passed validation, not yet bound to a worker.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidJob {
    service_type: ServiceType,
    location: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    description: String,
    amount: f64,
    payment_method: String,
    status: JobStatus,
    images: Vec<String>,
}

impl NewJob {
    pub fn validate(self) -> Result<ValidJob, String> {
        let service_type = parse_service_type(&self.service_type)?;
        let location = self.location.trim().to_string();
        if location.is_empty() {
            return Err("location is required".to_string());
        }
        let start_date = self
            .start_date
            .ok_or_else(|| "start date is required".to_string())?;
        check_dates(start_date, self.end_date)?;
        check_amount(self.amount)?;
        let payment_method =
            payment_method(&self.payment_method, self.payment_method_other.as_deref())?;

        Ok(ValidJob {
            service_type,
            location,
            start_date,
            end_date: self.end_date,
            description: self.description.trim().to_string(),
            amount: self.amount,
            payment_method,
            status: self.status.unwrap_or_default(),
            images: self.images,
        })
    }
}

impl ValidJob {
    pub fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// New jobs always start unpaid.
    pub fn into_job(self, worker_id: ObjectId, submitted_by: ObjectId) -> Job {
        let now = DateTime::now();
        Job {
            id: None,
            worker_id,
            service_type: self.service_type,
            location: self.location,
            start_date: self.start_date,
            end_date: self.end_date,
            description: self.description,
            amount: self.amount,
            payment_method: self.payment_method,
            payment_status: PaymentStatus::Pending,
            status: self.status,
            images: self.images,
            submitted_by,
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn mark_paid(job: &Job) -> Transition {
    if job.payment_status == PaymentStatus::Paid {
        return Transition::Unchanged;
    }
    Transition::Apply(JobPatch {
        payment_status: Some(PaymentStatus::Paid),
        ..Default::default()
    })
}

pub fn mark_completed(job: &Job) -> Transition {
    if job.status == JobStatus::Completed {
        return Transition::Unchanged;
    }
    Transition::Apply(JobPatch {
        status: Some(JobStatus::Completed),
        ..Default::default()
    })
}

/// Validates `edit` against the current record and returns the patch to
/// apply. Nothing is written when this fails.
pub fn edit_patch(job: &Job, edit: JobEdit) -> Result<JobPatch, String> {
    let service_type = edit
        .service_type
        .as_deref()
        .map(parse_service_type)
        .transpose()?;

    let location = match edit.location {
        Some(location) if location.trim().is_empty() => {
            return Err("location is required".to_string());
        }
        other => other.map(|l| l.trim().to_string()),
    };

    check_dates(
        edit.start_date.unwrap_or(job.start_date),
        edit.end_date.or(job.end_date),
    )?;

    if let Some(amount) = edit.amount {
        check_amount(amount)?;
    }

    let payment_method = edit
        .payment_method
        .as_deref()
        .map(|m| payment_method(m, edit.payment_method_other.as_deref()))
        .transpose()?;

    if job.payment_status == PaymentStatus::Paid
        && edit.payment_status == Some(PaymentStatus::Pending)
    {
        return Err("a paid job cannot return to pending".to_string());
    }
    if job.status == JobStatus::Completed && edit.status == Some(JobStatus::InProgress) {
        return Err("a completed job cannot return to in progress".to_string());
    }

    Ok(JobPatch {
        service_type,
        location,
        start_date: edit.start_date,
        end_date: edit.end_date,
        description: edit.description.map(|d| d.trim().to_string()),
        amount: edit.amount,
        payment_method,
        payment_status: edit.payment_status,
        status: edit.status,
    })
}
