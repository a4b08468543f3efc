use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use crewledger_db::models::Worker;
use crewledger_services::jobs::WorkerInput;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::job::parse_id;
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct WorkerRequest {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    pub contact_info: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "specialty is required"))]
    pub specialty: String,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct WorkerResponse {
    pub id: String,
    pub name: String,
    pub contact_info: Option<String>,
    pub email: Option<String>,
    pub specialty: String,
    pub active: bool,
    pub account_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkerListResponse {
    pub workers: Vec<WorkerResponse>,
    pub active: usize,
    pub inactive: usize,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<WorkerListResponse>, ApiError> {
    let workers = state.jobs.list_workers(&auth.caller()).await?;
    let active = workers.iter().filter(|w| w.active).count();
    let inactive = workers.len() - active;

    Ok(Json(WorkerListResponse {
        workers: workers.into_iter().map(to_response).collect(),
        active,
        inactive,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<WorkerRequest>,
) -> Result<(StatusCode, Json<WorkerResponse>), ApiError> {
    body.validate()?;
    let worker = state
        .jobs
        .upsert_worker(&auth.caller(), input(None, body))
        .await?;
    Ok((StatusCode::CREATED, Json(to_response(worker))))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(worker_id): Path<String>,
    Json(body): Json<WorkerRequest>,
) -> Result<Json<WorkerResponse>, ApiError> {
    body.validate()?;
    let id = parse_id(&worker_id, "worker_id")?;
    let worker = state
        .jobs
        .upsert_worker(&auth.caller(), input(Some(id), body))
        .await?;
    Ok(Json(to_response(worker)))
}

pub async fn set_active(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(worker_id): Path<String>,
    Json(body): Json<SetActiveRequest>,
) -> Result<Json<WorkerResponse>, ApiError> {
    let id = parse_id(&worker_id, "worker_id")?;
    let worker = state
        .jobs
        .set_worker_active(&auth.caller(), id, body.active)
        .await?;
    Ok(Json(to_response(worker)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(worker_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&worker_id, "worker_id")?;
    state.jobs.delete_worker(&auth.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn input(id: Option<bson::oid::ObjectId>, body: WorkerRequest) -> WorkerInput {
    WorkerInput {
        id,
        name: body.name,
        contact_info: body.contact_info,
        email: body.email,
        specialty: body.specialty,
        active: body.active,
    }
}

fn to_response(worker: Worker) -> WorkerResponse {
    WorkerResponse {
        id: worker.id.map(|id| id.to_hex()).unwrap_or_default(),
        name: worker.name,
        contact_info: worker.contact_info,
        email: worker.email,
        specialty: worker.specialty,
        active: worker.active,
        account_id: worker.account_id.map(|id| id.to_hex()),
    }
}
