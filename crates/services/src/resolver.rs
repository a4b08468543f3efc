use std::sync::Arc;

use bson::oid::ObjectId;
use crewledger_db::models::Role;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::auth::{Session, SessionEvent};
use crate::store::ProfileStore;

/// Role as observed for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "role", rename_all = "snake_case")]
pub enum RoleState {
    SignedOut,
    Loading,
    Resolved(Role),
    /// Signed in, but no profile row exists or it could not be fetched.
    Unresolved,
}

impl RoleState {
    pub fn role(&self) -> Option<Role> {
        match self {
            RoleState::Resolved(role) => Some(*role),
            _ => None,
        }
    }
}

struct Current {
    session_id: Option<String>,
    account_id: Option<ObjectId>,
    state: RoleState,
    /// Bumped on every session change so a slow fetch for an older session
    /// cannot overwrite the state of a newer one.
    epoch: u64,
}

/// Tracks the role of the account signed in on one session. Events for
/// other sessions on the shared channel are ignored.
pub struct RoleResolver {
    profiles: Arc<dyn ProfileStore>,
    current: Mutex<Current>,
}

impl RoleResolver {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            profiles,
            current: Mutex::new(Current {
                session_id: None,
                account_id: None,
                state: RoleState::SignedOut,
                epoch: 0,
            }),
        }
    }

    /// One-shot lookup without any session bookkeeping.
    pub async fn lookup(profiles: &dyn ProfileStore, account_id: ObjectId) -> RoleState {
        match profiles.find(account_id).await {
            Ok(Some(profile)) => RoleState::Resolved(profile.role),
            Ok(None) => {
                warn!(%account_id, "No role profile for account");
                RoleState::Unresolved
            }
            Err(e) => {
                warn!(%account_id, error = %e, "Failed to fetch role profile");
                RoleState::Unresolved
            }
        }
    }

    pub fn state(&self) -> RoleState {
        self.current.lock().state
    }

    pub fn session_id(&self) -> Option<String> {
        self.current.lock().session_id.clone()
    }

    pub fn account_id(&self) -> Option<ObjectId> {
        self.current.lock().account_id
    }

    pub fn role(&self) -> Option<Role> {
        self.state().role()
    }

    /// Binds the resolver to `session` and resolves its role. The state reads
    /// `Loading` until the profile fetch completes.
    pub async fn track(&self, session: &Session) -> RoleState {
        let epoch = {
            let mut current = self.current.lock();
            current.epoch += 1;
            current.session_id = Some(session.id.clone());
            current.account_id = Some(session.account.id);
            current.state = RoleState::Loading;
            current.epoch
        };
        self.fetch(epoch, session.account.id).await
    }

    /// Re-fetches the role of the tracked session.
    pub async fn refresh(&self) -> RoleState {
        let (epoch, account_id) = {
            let mut current = self.current.lock();
            let Some(account_id) = current.account_id else {
                return current.state;
            };
            current.epoch += 1;
            current.state = RoleState::Loading;
            (current.epoch, account_id)
        };
        self.fetch(epoch, account_id).await
    }

    async fn fetch(&self, epoch: u64, account_id: ObjectId) -> RoleState {
        let resolved = Self::lookup(self.profiles.as_ref(), account_id).await;

        let mut current = self.current.lock();
        if current.epoch == epoch {
            current.state = resolved;
            debug!(%account_id, state = ?resolved, "Role resolved");
        } else {
            debug!(%account_id, "Discarding role fetched for a superseded session");
        }
        current.state
    }

    /// Drops the cached role and the session binding immediately.
    pub fn clear(&self) {
        let mut current = self.current.lock();
        current.epoch += 1;
        current.session_id = None;
        current.account_id = None;
        current.state = RoleState::SignedOut;
    }

    fn is_tracking(&self, session: &Session) -> bool {
        self.current.lock().session_id.as_deref() == Some(session.id.as_str())
    }

    pub async fn on_session_change(&self, event: &SessionEvent) -> RoleState {
        match event {
            SessionEvent::SignedIn(session) if self.is_tracking(session) => self.refresh().await,
            SessionEvent::SignedOut(session) if self.is_tracking(session) => {
                self.clear();
                RoleState::SignedOut
            }
            SessionEvent::SignedIn(session) | SessionEvent::SignedOut(session) => {
                debug!(sid = %session.id, "Ignoring event for another session");
                self.state()
            }
        }
    }

    /// Applies session events until the provider's channel closes.
    pub async fn follow(&self, mut events: broadcast::Receiver<SessionEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.on_session_change(&event).await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Missed events may include a sign-out; start from scratch.
                    warn!(skipped, "Session events lagged, clearing cached role");
                    self.clear();
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
