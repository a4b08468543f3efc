use crewledger_config::{DatabaseSettings, Settings};
use mongodb::{Client, Database, options::ClientOptions};
use tracing::{debug, info};

/// Name reported to the server in the connection handshake.
const APP_NAME: &str = "crewledger";

/// Opens the ledger database and fails fast when the server does not answer.
pub async fn connect(settings: &Settings) -> Result<Database, mongodb::error::Error> {
    open(&settings.database).await
}

pub async fn open(database: &DatabaseSettings) -> Result<Database, mongodb::error::Error> {
    let client = Client::with_options(client_options(database).await?)?;
    let db = client.database(&database.name);

    // Round trip before handing the database out.
    db.run_command(bson::doc! { "ping": 1 }).await?;
    info!(
        db = %database.name,
        max_pool = ?database.max_pool_size,
        "Ledger database reachable"
    );
    Ok(db)
}

async fn client_options(database: &DatabaseSettings) -> Result<ClientOptions, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&database.url).await?;
    options.app_name = Some(APP_NAME.to_string());
    // Unset sizes fall back to the URL, then to the driver.
    options.max_pool_size = database.max_pool_size.or(options.max_pool_size);
    options.min_pool_size = database.min_pool_size.or(options.min_pool_size);
    debug!(hosts = ?options.hosts, "Parsed ledger database options");
    Ok(options)
}
