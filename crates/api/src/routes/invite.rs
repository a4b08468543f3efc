use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use crewledger_db::models::{InviteCode, InviteRedemption, Role};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct IssueInviteRequest {
    /// Generated when omitted.
    #[validate(length(min = 1, max = 64))]
    pub code: Option<String>,
    pub role: Role,
    #[serde(default = "default_uses")]
    #[validate(range(min = 1, max = 1000))]
    pub uses: u32,
}

fn default_uses() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub code: String,
    pub role: Role,
    pub remaining_uses: u32,
    pub active: bool,
    pub created_by: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct RedemptionResponse {
    pub code: String,
    pub account_id: Option<String>,
    pub email: String,
    pub role: Role,
    pub success: bool,
    pub created_at: String,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<InviteResponse>>, ApiError> {
    let codes = state.invites.list(&auth.caller()).await?;
    Ok(Json(codes.into_iter().map(to_response).collect()))
}

pub async fn issue(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<IssueInviteRequest>,
) -> Result<(StatusCode, Json<InviteResponse>), ApiError> {
    body.validate()?;
    let invite = state
        .invites
        .issue(&auth.caller(), body.code.as_deref(), body.role, body.uses)
        .await?;
    Ok((StatusCode::CREATED, Json(to_response(invite))))
}

pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<Vec<RedemptionResponse>>, ApiError> {
    let entries = state.invites.history(&auth.caller(), Some(&code)).await?;
    Ok(Json(entries.into_iter().map(redemption_response).collect()))
}

pub async fn deactivate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.invites.deactivate(&auth.caller(), &code).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn to_response(invite: InviteCode) -> InviteResponse {
    InviteResponse {
        code: invite.code,
        role: invite.target_role,
        remaining_uses: invite.remaining_uses,
        active: invite.active,
        created_by: invite.created_by.map(|id| id.to_hex()),
        created_at: invite.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

fn redemption_response(entry: InviteRedemption) -> RedemptionResponse {
    RedemptionResponse {
        code: entry.code,
        account_id: entry.account_id.map(|id| id.to_hex()),
        email: entry.email,
        role: entry.role,
        success: entry.success,
        created_at: entry.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
