//! Account signup with role assignment.
//!
//! A signup moves through `Start -> Validated -> RoleAuthorized ->
//! AccountCreated -> ProfileWritten -> Done`. Elevated roles consume an invite
//! code before the account exists, so a bad code never leaves an orphaned
//! account behind. The reverse is accepted: if account creation fails after a
//! successful redemption, the use stays consumed.

use std::sync::Arc;

use bson::oid::ObjectId;
use crewledger_config::SignupSettings;
use crewledger_db::models::{Account, AccountMetadata, Role, RoleProfile};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::{AuthError, CredentialProvider, SignedIn};
use crate::authorizer::{Caller, DenyReason, Operation};
use crate::dao::base::DaoError;
use crate::invite::{InviteError, InviteLedger};
use crate::store::ProfileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupStage {
    Start,
    Validated,
    RoleAuthorized,
    AccountCreated,
    ProfileWritten,
    Done,
}

#[derive(Debug, Error)]
pub enum SignupError {
    #[error("{0}")]
    Validation(String),
    #[error("an invite code is required for the {0} role")]
    InviteRequired(Role),
    #[error("invalid or expired invite code")]
    InvalidInvite,
    #[error(transparent)]
    CredentialProvider(#[from] AuthError),
    #[error("failed to write role profile: {0}")]
    ProfileWrite(DaoError),
    #[error(transparent)]
    Denied(#[from] DenyReason),
    #[error(transparent)]
    Store(DaoError),
}

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: String,
    pub role: Role,
    pub invite_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub account: Account,
    pub role: Role,
    /// `None` when the account was created but its profile could not be
    /// written. The account resolves as unresolved until an administrator
    /// re-issues the role.
    pub profile: Option<RoleProfile>,
}

pub struct RoleIssuanceService {
    credentials: Arc<dyn CredentialProvider>,
    ledger: Arc<InviteLedger>,
    profiles: Arc<dyn ProfileStore>,
    settings: SignupSettings,
}

impl RoleIssuanceService {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        ledger: Arc<InviteLedger>,
        profiles: Arc<dyn ProfileStore>,
        settings: SignupSettings,
    ) -> Self {
        Self {
            credentials,
            ledger,
            profiles,
            settings,
        }
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialProvider> {
        &self.credentials
    }

    pub async fn sign_up(&self, req: SignUpRequest) -> Result<SignUpOutcome, SignupError> {
        let email = req.email.trim().to_lowercase();
        let display_name = req.display_name.trim().to_string();
        stage(SignupStage::Start, &email);

        self.validate(&email, &display_name, &req)?;
        stage(SignupStage::Validated, &email);

        let code = if req.role.is_elevated() {
            Some(self.authorize_role(&email, req.role, req.invite_code.as_deref()).await?)
        } else {
            // Open role; any supplied code is ignored and never touched.
            None
        };
        stage(SignupStage::RoleAuthorized, &email);

        let metadata = AccountMetadata {
            display_name,
            requested_role: Some(req.role),
        };
        let account = match self
            .credentials
            .create_account(&email, &req.password, metadata)
            .await
        {
            Ok(account) => account,
            Err(e) => {
                if let Some(code) = &code {
                    warn!(code = %code, %email, error = %e, "Account creation failed after invite redemption");
                }
                return Err(SignupError::CredentialProvider(e));
            }
        };
        stage(SignupStage::AccountCreated, &email);

        if let Some(code) = &code {
            self.audit(code, Some(account.id), &email, req.role, true).await;
        }

        let profile = match self.profiles.upsert(account.id, req.role).await {
            Ok(profile) => {
                stage(SignupStage::ProfileWritten, &email);
                Some(profile)
            }
            Err(e) => {
                warn!(account_id = %account.id, role = %req.role, error = %e, "Role profile write failed; account left without a role");
                None
            }
        };

        stage(SignupStage::Done, &email);
        info!(account_id = %account.id, role = %req.role, "Account provisioned");
        Ok(SignUpOutcome {
            account,
            role: req.role,
            profile,
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        self.credentials.sign_in(email, password).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<SignedIn, AuthError> {
        self.credentials.refresh(refresh_token).await
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.credentials.sign_out(access_token).await
    }

    /// Creates or overwrites the role profile of an existing account.
    pub async fn assign_role(
        &self,
        caller: &Caller,
        account_id: ObjectId,
        role: Role,
    ) -> Result<RoleProfile, SignupError> {
        caller.authorize(Operation::ManageRoles)?;
        let profile = self
            .profiles
            .upsert(account_id, role)
            .await
            .map_err(SignupError::ProfileWrite)?;
        info!(%account_id, %role, assigned_by = %caller.account.id, "Role assigned");
        Ok(profile)
    }

    fn validate(
        &self,
        email: &str,
        display_name: &str,
        req: &SignUpRequest,
    ) -> Result<(), SignupError> {
        if display_name.is_empty() {
            return Err(SignupError::Validation("display name is required".to_string()));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(SignupError::Validation("a valid email is required".to_string()));
        }
        if req.password != req.confirm_password {
            return Err(SignupError::Validation("passwords do not match".to_string()));
        }
        if req.password.chars().count() < self.settings.min_password_length {
            return Err(SignupError::Validation(format!(
                "password must be at least {} characters",
                self.settings.min_password_length
            )));
        }
        Ok(())
    }

    /// Redeems the invite for an elevated role and returns the code used.
    async fn authorize_role(
        &self,
        email: &str,
        role: Role,
        invite_code: Option<&str>,
    ) -> Result<String, SignupError> {
        let code = invite_code.map(str::trim).unwrap_or_default();
        if code.is_empty() {
            return Err(SignupError::InviteRequired(role));
        }

        let redeemed = match self.ledger.redeem(code, role).await {
            Ok(redeemed) => redeemed,
            Err(InviteError::Store(e)) => return Err(SignupError::Store(e)),
            Err(e) => {
                warn!(code, error = %e, "Invite redemption failed");
                false
            }
        };
        if !redeemed {
            self.audit(code, None, email, role, false).await;
            return Err(SignupError::InvalidInvite);
        }
        Ok(code.to_string())
    }

    async fn audit(
        &self,
        code: &str,
        account_id: Option<ObjectId>,
        email: &str,
        role: Role,
        success: bool,
    ) {
        if let Err(e) = self.ledger.log(code, account_id, email, role, success).await {
            warn!(code, %email, success, error = %e, "Failed to record invite redemption");
        }
    }
}

fn stage(stage: SignupStage, email: &str) {
    debug!(?stage, email, "Signup stage");
}
