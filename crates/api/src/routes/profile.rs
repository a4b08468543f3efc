use axum::{
    Json,
    extract::{Path, State},
};
use crewledger_db::models::{Role, RoleProfile};
use crewledger_services::{Operation, store::AccountStore};
use serde::{Deserialize, Serialize};

use super::job::parse_id;
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub account_id: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

/// Re-issues the role profile of an account, e.g. after a failed signup write.
pub async fn assign(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<String>,
    Json(body): Json<AssignRoleRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let account_id = parse_id(&account_id, "account_id")?;
    // Deny before revealing whether the account exists.
    let caller = auth.caller();
    caller.authorize(Operation::ManageRoles)?;
    if state.stores.accounts.find_by_id(account_id).await?.is_none() {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    let profile = state
        .provisioning
        .assign_role(&caller, account_id, body.role)
        .await?;
    Ok(Json(to_response(profile)))
}

fn to_response(profile: RoleProfile) -> ProfileResponse {
    ProfileResponse {
        account_id: profile.account_id.to_hex(),
        role: profile.role,
        created_at: profile.created_at.try_to_rfc3339_string().unwrap_or_default(),
        updated_at: profile.updated_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
