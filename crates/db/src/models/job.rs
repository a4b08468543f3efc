use std::{fmt, str::FromStr};

use bson::{oid::ObjectId, DateTime, Document};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub worker_id: ObjectId,
    pub service_type: ServiceType,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    pub payment_method: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub images: Vec<String>,
    pub submitted_by: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Painting,
    Plumbing,
    Electrical,
    Carpentry,
    Roofing,
    Flooring,
    Hvac,
    GeneralContractor,
}

impl ServiceType {
    pub const ALL: [ServiceType; 8] = [
        ServiceType::Painting,
        ServiceType::Plumbing,
        ServiceType::Electrical,
        ServiceType::Carpentry,
        ServiceType::Roofing,
        ServiceType::Flooring,
        ServiceType::Hvac,
        ServiceType::GeneralContractor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Painting => "painting",
            ServiceType::Plumbing => "plumbing",
            ServiceType::Electrical => "electrical",
            ServiceType::Carpentry => "carpentry",
            ServiceType::Roofing => "roofing",
            ServiceType::Flooring => "flooring",
            ServiceType::Hvac => "hvac",
            ServiceType::GeneralContractor => "general_contractor",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut key = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        // camelCase keys from older clients
        if key == "generalcontractor" {
            key = "general_contractor".to_string();
        }
        ServiceType::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| format!("unknown service type `{}`", s.trim()))
    }
}

/// Partial update of a job. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub service_type: Option<ServiceType>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub status: Option<JobStatus>,
}

impl JobPatch {
    pub fn is_empty(&self) -> bool {
        *self == JobPatch::default()
    }

    pub fn apply_to(&self, job: &mut Job) {
        if let Some(service_type) = self.service_type {
            job.service_type = service_type;
        }
        if let Some(location) = &self.location {
            job.location = location.clone();
        }
        if let Some(start) = self.start_date {
            job.start_date = start;
        }
        if let Some(end) = self.end_date {
            job.end_date = Some(end);
        }
        if let Some(description) = &self.description {
            job.description = description.clone();
        }
        if let Some(amount) = self.amount {
            job.amount = amount;
        }
        if let Some(method) = &self.payment_method {
            job.payment_method = method.clone();
        }
        if let Some(payment_status) = self.payment_status {
            job.payment_status = payment_status;
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        job.updated_at = DateTime::now();
    }

    /// Body of a `$set` update for the fields present in the patch.
    pub fn to_set_document(&self) -> Result<Document, bson::ser::Error> {
        let mut set = Document::new();
        if let Some(service_type) = self.service_type {
            set.insert("service_type", bson::to_bson(&service_type)?);
        }
        if let Some(location) = &self.location {
            set.insert("location", location.as_str());
        }
        if let Some(start) = self.start_date {
            set.insert("start_date", bson::to_bson(&start)?);
        }
        if let Some(end) = self.end_date {
            set.insert("end_date", bson::to_bson(&end)?);
        }
        if let Some(description) = &self.description {
            set.insert("description", description.as_str());
        }
        if let Some(amount) = self.amount {
            set.insert("amount", amount);
        }
        if let Some(method) = &self.payment_method {
            set.insert("payment_method", method.as_str());
        }
        if let Some(payment_status) = self.payment_status {
            set.insert("payment_status", bson::to_bson(&payment_status)?);
        }
        if let Some(status) = self.status {
            set.insert("status", bson::to_bson(&status)?);
        }
        Ok(set)
    }
}

impl Job {
    pub const COLLECTION: &'static str = "jobs";
}
