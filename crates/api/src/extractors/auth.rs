use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use crewledger_db::models::Account;
use crewledger_services::{Caller, CredentialProvider, RoleResolver, RoleState};

use crate::{error::ApiError, state::AppState};

/// The signed-in account (from a bearer token or the `access_token` cookie)
/// and its role as stored right now.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account: Account,
    pub session_id: String,
    pub access_token: String,
    pub role: RoleState,
}

impl AuthUser {
    pub fn caller(&self) -> Caller {
        Caller::new(self.account.clone(), self.role)
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let session = app_state
            .credentials
            .current_session(&token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Session expired or signed out".to_string()))?;

        // Resolved per request so a role change or sign-out is never served stale.
        let role = RoleResolver::lookup(app_state.stores.profiles.as_ref(), session.account.id).await;

        Ok(AuthUser {
            account: session.account,
            session_id: session.id,
            access_token: token,
            role,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                cookie
                    .trim()
                    .strip_prefix("access_token=")
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
            })
        })
}

/// Helper trait for extracting AppState from composite state types
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AppState> for AppState {
    fn from_ref(input: &AppState) -> Self {
        input.clone()
    }
}
