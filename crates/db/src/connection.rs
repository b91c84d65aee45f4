use foodwise_config::settings::DatabaseSettings;
use mongodb::{Client, Database, options::ClientOptions};
use tracing::info;

/// Opens a pooled client against the configured deployment and verifies it
/// with a ping before handing out the named database.
pub async fn connect(database: &DatabaseSettings) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&database.url).await?;
    options.app_name = Some("foodwise".to_string());
    options.max_pool_size = database.max_pool_size.or(options.max_pool_size);
    options.min_pool_size = database.min_pool_size.or(options.min_pool_size);

    let client = Client::with_options(options)?;
    client
        .database(&database.name)
        .run_command(bson::doc! { "ping": 1 })
        .await?;

    info!(db = %database.name, "Connected to MongoDB");
    Ok(client.database(&database.name))
}
