use std::sync::Arc;

use async_trait::async_trait;
use bson::DateTime;
use crewledger_config::JwtSettings;
use crewledger_db::models::{Account, AccountMetadata, RevokedSession, User};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{AuthError, AuthService, CredentialProvider, Session, SessionEvent, SignedIn};
use crate::dao::base::DaoError;
use crate::store::{AccountStore, SessionStore};

const EVENT_CAPACITY: usize = 64;

/// Email/password accounts with argon2 hashes and JWT sessions.
pub struct LocalCredentialProvider {
    accounts: Arc<dyn AccountStore>,
    auth: AuthService,
    revoked: Arc<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
    refresh_ttl_secs: u64,
}

impl LocalCredentialProvider {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        revoked: Arc<dyn SessionStore>,
        jwt_settings: JwtSettings,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let refresh_ttl_secs = jwt_settings.refresh_token_ttl_secs;
        Self {
            accounts,
            auth: AuthService::new(jwt_settings),
            revoked,
            events,
            refresh_ttl_secs,
        }
    }

    fn open_session(&self, account: Account, session_id: String) -> Result<SignedIn, AuthError> {
        let tokens = self.auth.generate_tokens(&account, &session_id)?;
        Ok(SignedIn {
            session: Session {
                id: session_id,
                account,
            },
            tokens,
        })
    }

    async fn is_revoked(&self, session_id: &str) -> Result<bool, AuthError> {
        Ok(self.revoked.is_revoked(session_id).await?)
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl CredentialProvider for LocalCredentialProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        metadata: AccountMetadata,
    ) -> Result<Account, AuthError> {
        let password_hash = self.auth.hash_password(password)?;
        let now = DateTime::now();
        let user = User {
            id: None,
            email: normalize_email(email),
            display_name: metadata.display_name.clone(),
            password_hash: Some(password_hash),
            metadata,
            last_sign_in_at: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self.accounts.insert(&user).await.map_err(|e| match e {
            DaoError::DuplicateKey(_) => AuthError::EmailTaken,
            other => AuthError::Store(other),
        })?;

        let account = stored
            .account()
            .ok_or_else(|| AuthError::Store(DaoError::NotFound))?;
        info!(account_id = %account.id, "Account created");
        Ok(account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let user = self
            .accounts
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.auth.verify_password(password, hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let account = user.account().ok_or(AuthError::InvalidCredentials)?;
        if let Err(e) = self.accounts.touch_sign_in(account.id).await {
            warn!(account_id = %account.id, error = %e, "Failed to record sign-in time");
        }

        let signed_in = self.open_session(account, uuid::Uuid::new_v4().to_string())?;
        debug!(account_id = %signed_in.session.account.id, sid = %signed_in.session.id, "Signed in");
        self.publish(SessionEvent::SignedIn(signed_in.session.clone()));
        Ok(signed_in)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SignedIn, AuthError> {
        let claims = self.auth.verify_refresh_token(refresh_token)?;
        if self.is_revoked(&claims.sid).await? {
            return Err(AuthError::SessionRevoked);
        }

        let claimed = claims.account()?;
        let user = self
            .accounts
            .find_by_id(claimed.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let account = user.account().ok_or(AuthError::InvalidCredentials)?;

        self.open_session(account, claims.sid)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let claims = self.auth.verify_access_token(access_token)?;
        let session = Session {
            id: claims.sid.clone(),
            account: claims.account()?,
        };

        // Refresh tokens share the sid and outlive the access token.
        let forget_after = DateTime::from_millis(
            DateTime::now().timestamp_millis() + (self.refresh_ttl_secs as i64) * 1000,
        );
        self.revoked
            .revoke(&RevokedSession::new(
                claims.sid,
                session.account.id,
                forget_after,
            ))
            .await?;

        info!(account_id = %session.account.id, sid = %session.id, "Signed out");
        self.publish(SessionEvent::SignedOut(session));
        Ok(())
    }

    async fn current_session(&self, access_token: &str) -> Result<Option<Session>, AuthError> {
        let claims = match self.auth.verify_access_token(access_token) {
            Ok(claims) => claims,
            Err(AuthError::TokenExpired) | Err(AuthError::InvalidToken(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        if self.is_revoked(&claims.sid).await? {
            return Ok(None);
        }
        Ok(Some(Session {
            account: claims.account()?,
            id: claims.sid,
        }))
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
