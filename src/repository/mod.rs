pub mod repository_error;
pub mod user_repo;
pub mod bonafide_repo;

use crate::config::mongo_conf::MongoConfig;
use mongodb::options::{ClientOptions, Credential, ResolverConfig};
use mongodb::{Client, Database};
use tracing::info;

/// Build the single process-wide MongoDB client and return the configured
/// database handle. Repositories receive this handle at construction instead
/// of opening their own connections.
pub async fn connect(config: &MongoConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options =
        ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare())
            .await?;
    client_options.app_name = Some("BonafideBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(
        config.connection_timeout_secs,
    ));

    if let (Some(ref username), Some(ref password)) = (&config.username, &config.password) {
        client_options.credential = Some(
            Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build(),
        );
    }

    let client = Client::with_options(client_options)?;
    info!("Connected to MongoDB database: {}", config.database);
    Ok(client.database(&config.database))
}
