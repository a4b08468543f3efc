use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use chrono::NaiveDate;
use crewledger_db::models::{Job, JobStatus, PaymentStatus};
use crewledger_services::jobs::{
    DateRange, JobEdit, JobFilter, JobListing, JobSummary, NewJob,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitJobRequest {
    /// Optional for workers, who always file under their own worker.
    pub worker_id: Option<String>,
    pub service_type: String,
    #[validate(length(max = 500))]
    pub location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    pub amount: f64,
    pub payment_method: String,
    pub payment_method_other: Option<String>,
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditJobRequest {
    pub service_type: Option<String>,
    #[validate(length(max = 500))]
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_method_other: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    pub payment_status: Option<PaymentStatus>,
    pub status: Option<JobStatus>,
    pub worker_id: Option<String>,
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: String,
    pub worker_id: String,
    pub worker_name: Option<String>,
    pub service_type: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: String,
    pub amount: f64,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub status: JobStatus,
    pub images: Vec<String>,
    pub submitted_by: String,
    pub created_at: String,
    pub updated_at: String,
}

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {what}")))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<Vec<JobResponse>>, ApiError> {
    let filter = JobFilter {
        payment_status: query.payment_status,
        status: query.status,
        worker_id: query
            .worker_id
            .as_deref()
            .map(|id| parse_id(id, "worker_id"))
            .transpose()?,
        search: query.search,
        range: DateRange {
            from: query.from,
            to: query.to,
        },
    };

    let jobs = state.jobs.list_jobs(&auth.caller(), &filter).await?;
    Ok(Json(jobs.into_iter().map(listing_response).collect()))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let id = parse_id(&job_id, "job_id")?;
    let job = state.jobs.get_job(&auth.caller(), id).await?;
    Ok(Json(to_response(job, None)))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SubmitJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), ApiError> {
    body.validate()?;
    let worker_id = body
        .worker_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(|id| parse_id(id, "worker_id"))
        .transpose()?;

    let job = state
        .jobs
        .submit_job(
            &auth.caller(),
            NewJob {
                worker_id,
                service_type: body.service_type,
                location: body.location,
                start_date: body.start_date,
                end_date: body.end_date,
                description: body.description,
                amount: body.amount,
                payment_method: body.payment_method,
                payment_method_other: body.payment_method_other,
                status: body.status,
                images: body.images,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(job, None))))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<String>,
    Json(body): Json<EditJobRequest>,
) -> Result<Json<JobResponse>, ApiError> {
    body.validate()?;
    let id = parse_id(&job_id, "job_id")?;

    let job = state
        .jobs
        .edit_job(
            &auth.caller(),
            id,
            JobEdit {
                service_type: body.service_type,
                location: body.location,
                start_date: body.start_date,
                end_date: body.end_date,
                description: body.description,
                amount: body.amount,
                payment_method: body.payment_method,
                payment_method_other: body.payment_method_other,
                payment_status: body.payment_status,
                status: body.status,
            },
        )
        .await?;

    Ok(Json(to_response(job, None)))
}

pub async fn mark_paid(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let id = parse_id(&job_id, "job_id")?;
    let job = state.jobs.mark_paid(&auth.caller(), id).await?;
    Ok(Json(to_response(job, None)))
}

pub async fn mark_completed(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let id = parse_id(&job_id, "job_id")?;
    let job = state.jobs.mark_completed(&auth.caller(), id).await?;
    Ok(Json(to_response(job, None)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&job_id, "job_id")?;
    state.jobs.delete_job(&auth.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<JobSummary>, ApiError> {
    let range = DateRange {
        from: query.from,
        to: query.to,
    };
    Ok(Json(state.jobs.summary(&auth.caller(), range).await?))
}

fn listing_response(listing: JobListing) -> JobResponse {
    to_response(listing.job, listing.worker_name)
}

fn to_response(job: Job, worker_name: Option<String>) -> JobResponse {
    JobResponse {
        id: job.id.map(|id| id.to_hex()).unwrap_or_default(),
        worker_id: job.worker_id.to_hex(),
        worker_name,
        service_type: job.service_type.to_string(),
        location: job.location,
        start_date: job.start_date,
        end_date: job.end_date,
        description: job.description,
        amount: job.amount,
        payment_method: job.payment_method,
        payment_status: job.payment_status,
        status: job.status,
        images: job.images,
        submitted_by: job.submitted_by.to_hex(),
        created_at: job.created_at.try_to_rfc3339_string().unwrap_or_default(),
        updated_at: job.updated_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
