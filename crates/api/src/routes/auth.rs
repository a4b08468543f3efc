use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use crewledger_db::models::{Account, Role};
use crewledger_services::{RoleResolver, RoleState, SignUpRequest, auth::SignedIn};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "display name is required"))]
    pub display_name: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default = "default_role")]
    pub role: Role,
    pub invite_code: Option<String>,
}

fn default_role() -> Role {
    Role::Worker
}

/// Surrounding whitespace is dropped before the email check runs.
fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: AccountResponse,
    pub role: RoleState,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    #[serde(flatten)]
    pub auth: AuthResponse,
    /// False when the account exists but its role could not be recorded.
    pub profile_written: bool,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AccountResponse,
    pub role: RoleState,
}

pub fn account_response(account: &Account) -> AccountResponse {
    AccountResponse {
        id: account.id.to_hex(),
        email: account.email.clone(),
        display_name: account.display_name.clone(),
    }
}

fn session_cookie(token: &str, max_age: u64) -> Result<HeaderMap, ApiError> {
    let cookie = format!("access_token={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}");
    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::Internal(format!("Invalid cookie header: {e}")))?;
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

async fn auth_response(
    state: &AppState,
    signed_in: SignedIn,
) -> Result<(HeaderMap, AuthResponse), ApiError> {
    let headers = session_cookie(&signed_in.tokens.access_token, signed_in.tokens.expires_in)?;
    let account = signed_in.session.account;
    let role = RoleResolver::lookup(state.stores.profiles.as_ref(), account.id).await;

    Ok((
        headers,
        AuthResponse {
            access_token: signed_in.tokens.access_token,
            refresh_token: signed_in.tokens.refresh_token,
            expires_in: signed_in.tokens.expires_in,
            user: account_response(&account),
            role,
        },
    ))
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<RegisterResponse>), ApiError> {
    body.validate()?;
    let password = body.password.clone();

    let outcome = state
        .provisioning
        .sign_up(SignUpRequest {
            email: body.email,
            password: body.password,
            confirm_password: body.confirm_password,
            display_name: body.display_name,
            role: body.role,
            invite_code: body.invite_code,
        })
        .await?;

    let signed_in = state
        .provisioning
        .sign_in(&outcome.account.email, &password)
        .await?;
    let (headers, auth) = auth_response(&state, signed_in).await?;

    Ok((
        StatusCode::CREATED,
        headers,
        Json(RegisterResponse {
            auth,
            profile_written: outcome.profile.is_some(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    body.validate()?;
    let signed_in = state.provisioning.sign_in(&body.email, &body.password).await?;
    let (headers, response) = auth_response(&state, signed_in).await?;
    Ok((headers, Json(response)))
}

pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> Result<HeaderMap, ApiError> {
    state.provisioning.sign_out(&auth.access_token).await?;
    session_cookie("", 0)
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let signed_in = state.provisioning.refresh(&body.refresh_token).await?;
    let (headers, response) = auth_response(&state, signed_in).await?;
    Ok((headers, Json(response)))
}

pub async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: account_response(&auth.account),
        role: auth.role,
    })
}

pub async fn role(auth: AuthUser) -> Json<RoleState> {
    Json(auth.role)
}
