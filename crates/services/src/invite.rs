use std::sync::Arc;

use bson::oid::ObjectId;
use crewledger_db::models::{InviteCode, InviteRedemption, Role};
use thiserror::Error;
use tracing::{info, warn};

use crate::authorizer::{Caller, DenyReason, Operation};
use crate::dao::base::DaoError;
use crate::store::InviteStore;

/// Unambiguous uppercase alphabet for generated codes.
const CODE_ALPHABET: [char; 32] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K',
    'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];
const CODE_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub enum InviteError {
    #[error("invite code is empty")]
    EmptyCode,
    #[error(transparent)]
    Denied(#[from] DenyReason),
    #[error("{0}")]
    Validation(String),
    #[error("invite code not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] DaoError),
}

/// Role-granting invite codes and their redemption audit trail.
pub struct InviteLedger {
    store: Arc<dyn InviteStore>,
    prefix: String,
}

impl InviteLedger {
    pub fn new(store: Arc<dyn InviteStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Consumes one use of `code` for `role`. `Ok(false)` means the code is
    /// unknown, inactive, exhausted or issued for another role.
    pub async fn redeem(&self, code: &str, role: Role) -> Result<bool, InviteError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(InviteError::EmptyCode);
        }

        let redeemed = self.store.redeem(code, role).await?;
        if redeemed {
            info!(code, %role, "Invite code redeemed");
        } else {
            warn!(code, %role, "Invite code rejected");
        }
        Ok(redeemed)
    }

    /// Appends one audit entry. Callers are expected to ignore the error.
    pub async fn log(
        &self,
        code: &str,
        account_id: Option<ObjectId>,
        email: &str,
        role: Role,
        success: bool,
    ) -> Result<(), InviteError> {
        let entry = InviteRedemption::new(code.trim(), account_id, email, role, success);
        self.store.append_log(&entry).await?;
        Ok(())
    }

    pub async fn issue(
        &self,
        caller: &Caller,
        code: Option<&str>,
        role: Role,
        uses: u32,
    ) -> Result<InviteCode, InviteError> {
        caller.authorize(Operation::ManageInvites)?;
        if !role.is_elevated() {
            return Err(InviteError::Validation(
                "worker signups do not need an invite code".to_string(),
            ));
        }
        if uses == 0 {
            return Err(InviteError::Validation(
                "an invite code needs at least one use".to_string(),
            ));
        }

        let code = match code.map(str::trim) {
            Some("") => return Err(InviteError::EmptyCode),
            Some(code) => code.to_string(),
            None => self.generate_code(),
        };

        let invite = InviteCode::new(code, role, uses, Some(caller.account.id));
        let stored = self.store.insert(&invite).await.map_err(|e| match e {
            DaoError::DuplicateKey(_) => {
                InviteError::Validation(format!("invite code `{}` already exists", invite.code))
            }
            other => InviteError::Store(other),
        })?;

        info!(code = %stored.code, %role, uses, issued_by = %caller.account.id, "Invite code issued");
        Ok(stored)
    }

    pub async fn list(&self, caller: &Caller) -> Result<Vec<InviteCode>, InviteError> {
        caller.authorize(Operation::ManageInvites)?;
        Ok(self.store.list().await?)
    }

    pub async fn history(
        &self,
        caller: &Caller,
        code: Option<&str>,
    ) -> Result<Vec<InviteRedemption>, InviteError> {
        caller.authorize(Operation::ManageInvites)?;
        Ok(self.store.list_log(code).await?)
    }

    pub async fn deactivate(&self, caller: &Caller, code: &str) -> Result<(), InviteError> {
        caller.authorize(Operation::ManageInvites)?;
        if !self.store.deactivate(code.trim()).await? {
            return Err(InviteError::NotFound);
        }
        info!(code, deactivated_by = %caller.account.id, "Invite code deactivated");
        Ok(())
    }

    /// Seeds a single-use admin code so the first administrator can sign up.
    /// Leaves an existing code untouched, even if already spent.
    pub async fn ensure_bootstrap(&self, code: &str) -> Result<(), InviteError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(InviteError::EmptyCode);
        }
        if self.store.find_by_code(code).await?.is_some() {
            return Ok(());
        }

        match self
            .store
            .insert(&InviteCode::new(code.to_string(), Role::Admin, 1, None))
            .await
        {
            Ok(_) => {
                info!(code, "Bootstrap admin invite created");
                Ok(())
            }
            // Another instance seeded it first.
            Err(DaoError::DuplicateKey(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn generate_code(&self) -> String {
        format!(
            "{}-{}",
            self.prefix,
            nanoid::nanoid!(CODE_LENGTH, &CODE_ALPHABET)
        )
    }
}
