use std::sync::Arc;

use crewledger_config::{Settings, StorageBackend};
use crewledger_db::{connect, indexes::ensure_indexes};
use crewledger_services::{
    CredentialProvider, InviteLedger, JobService, LocalCredentialProvider, RoleIssuanceService,
    Stores,
};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub stores: Stores,
    pub credentials: Arc<dyn CredentialProvider>,
    pub invites: Arc<InviteLedger>,
    pub provisioning: Arc<RoleIssuanceService>,
    pub jobs: Arc<JobService>,
}

impl AppState {
    pub fn new(stores: Stores, settings: Settings) -> Self {
        let credentials: Arc<dyn CredentialProvider> = Arc::new(LocalCredentialProvider::new(
            stores.accounts.clone(),
            stores.sessions.clone(),
            settings.jwt.clone(),
        ));
        let invites = Arc::new(InviteLedger::new(
            stores.invites.clone(),
            settings.signup.invite_code_prefix.clone(),
        ));
        let provisioning = Arc::new(RoleIssuanceService::new(
            credentials.clone(),
            invites.clone(),
            stores.profiles.clone(),
            settings.signup.clone(),
        ));
        let jobs = Arc::new(JobService::new(stores.jobs.clone(), stores.workers.clone()));

        Self {
            settings,
            stores,
            credentials,
            invites,
            provisioning,
            jobs,
        }
    }

    /// Opens the configured storage backend and seeds the bootstrap admin code.
    pub async fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let stores = match settings.database.backend {
            StorageBackend::Mongo => {
                let db = connect(&settings).await?;
                ensure_indexes(&db).await?;
                Stores::mongo(&db)
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage; data is lost on shutdown");
                Stores::memory()
            }
        };

        let state = Self::new(stores, settings);
        if let Some(code) = &state.settings.signup.bootstrap_admin_code {
            state.invites.ensure_bootstrap(code).await?;
        }
        Ok(state)
    }
}
