use crewledger_api::{build_router, state::AppState};
use crewledger_config::{Settings, StorageBackend};
use mongodb::Database;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Single-use admin code seeded into every test instance.
pub const BOOTSTRAP_ADMIN_CODE: &str = "BOOT-ADMIN";

/// Connection string for the MongoDB-backed suite. Unset skips those tests.
pub const MONGO_URL_VAR: &str = "CREWLEDGER__DATABASE__URL";

/// A running test application. Backed by the in-memory stores unless
/// spawned with [`TestApp::spawn_mongo`], which owns a throwaway database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
    pub db: Option<Database>,
}

impl TestApp {
    /// Spawn a new test server. Each instance owns its own stores, so tests
    /// are isolated without an external database.
    pub async fn spawn() -> Self {
        Self::spawn_with_settings(|_| {}).await
    }

    /// Spawn a test server with customized settings.
    ///
    /// The `mutator` closure receives a `&mut Settings` after defaults are applied.
    pub async fn spawn_with_settings(mutator: impl FnOnce(&mut Settings)) -> Self {
        let mut settings = test_settings();
        mutator(&mut settings);
        Self::serve(settings, None).await
    }

    /// Spawn a test server over a real MongoDB, one database per test.
    ///
    /// Returns `None` when `CREWLEDGER__DATABASE__URL` is not set, e.g.
    /// `mongodb://localhost:27017`. The database is dropped with the app.
    pub async fn spawn_mongo() -> Option<Self> {
        let Ok(url) = std::env::var(MONGO_URL_VAR) else {
            eprintln!("{MONGO_URL_VAR} not set, skipping MongoDB-backed test");
            return None;
        };

        let mut settings = test_settings();
        settings.database.backend = StorageBackend::Mongo;
        settings.database.url = url;
        settings.database.name = format!("crewledger_test_{}", uuid::Uuid::new_v4().simple());
        settings.database.max_pool_size = Some(5);

        let db = crewledger_db::open(&settings.database)
            .await
            .expect("Failed to reach test MongoDB");
        Some(Self::serve(settings, Some(db)).await)
    }

    async fn serve(settings: Settings, db: Option<Database>) -> Self {
        let state = AppState::from_settings(settings)
            .await
            .expect("Failed to create AppState");
        let app = build_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{}", addr);
        // Tokens are sent explicitly; a shared cookie jar would leak sessions between users.
        let client = reqwest::Client::new();

        Self {
            addr,
            base_url,
            state,
            client,
            db,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let Some(db) = self.db.take() else {
            return;
        };
        // Best effort: the runtime may already be winding down.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = db.drop().await;
            });
        }
    }
}

fn test_settings() -> Settings {
    let mut settings = Settings::in_memory();
    settings.signup.bootstrap_admin_code = Some(BOOTSTRAP_ADMIN_CODE.to_string());
    settings
}
