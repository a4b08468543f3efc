use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crewledger_services::{
    auth::AuthError, dao::base::DaoError, DenyReason, InviteError, JobError, SignupError,
};
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    Internal(String),
    Validation(String),
    InviteRequired(String),
    InvalidInvite(String),
    /// Signed in, but no role has been provisioned.
    ProfileMissing(String),
    Unavailable(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => {
                error!(%msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg),
            ApiError::InviteRequired(msg) => (StatusCode::BAD_REQUEST, "invite_required", msg),
            ApiError::InvalidInvite(msg) => (StatusCode::BAD_REQUEST, "invalid_invite", msg),
            ApiError::ProfileMissing(msg) => (StatusCode::FORBIDDEN, "profile_missing", msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DaoError> for ApiError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            DaoError::DuplicateKey(msg) => ApiError::Conflict(msg),
            DaoError::Unavailable(msg) => ApiError::Unavailable(msg),
            DaoError::Mongo(e) => ApiError::Internal(e.to_string()),
            DaoError::BsonSer(e) => ApiError::Internal(e.to_string()),
            DaoError::BsonDe(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::EmailTaken => ApiError::Conflict("Email already registered".to_string()),
            AuthError::TokenExpired => ApiError::Unauthorized("Token expired".to_string()),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
            AuthError::SessionRevoked => {
                ApiError::Unauthorized("Session has been signed out".to_string())
            }
            AuthError::HashError(msg) => ApiError::Internal(msg),
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<DenyReason> for ApiError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::SignedOut => ApiError::Unauthorized(reason.to_string()),
            DenyReason::ProfileMissing => ApiError::ProfileMissing(reason.to_string()),
            DenyReason::RoleLoading
            | DenyReason::InsufficientRole { .. }
            | DenyReason::NotOwnIdentity => ApiError::Forbidden(reason.to_string()),
        }
    }
}

impl From<SignupError> for ApiError {
    fn from(err: SignupError) -> Self {
        match err {
            SignupError::Validation(msg) => ApiError::Validation(msg),
            SignupError::InviteRequired(_) => ApiError::InviteRequired(err.to_string()),
            SignupError::InvalidInvite => ApiError::InvalidInvite(err.to_string()),
            SignupError::CredentialProvider(e) => e.into(),
            SignupError::ProfileWrite(e) | SignupError::Store(e) => e.into(),
            SignupError::Denied(reason) => reason.into(),
        }
    }
}

impl From<InviteError> for ApiError {
    fn from(err: InviteError) -> Self {
        match err {
            InviteError::EmptyCode => ApiError::Validation(err.to_string()),
            InviteError::Validation(msg) => ApiError::Validation(msg),
            InviteError::NotFound => ApiError::NotFound(err.to_string()),
            InviteError::Denied(reason) => reason.into(),
            InviteError::Store(e) => e.into(),
        }
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::Denied(reason) => reason.into(),
            JobError::Validation(msg) => ApiError::Validation(msg),
            JobError::NotFound(_) => ApiError::NotFound(err.to_string()),
            JobError::Store(e) => e.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}
