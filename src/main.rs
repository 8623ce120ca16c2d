use bonafide_backend::app::app::App;
use bonafide_backend::util::logger::Logger;
use dotenv::dotenv;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file before logging config is read
    let env_loaded = dotenv();

    let _logger = Logger::new().expect("Failed to initialize logging");

    info!("🚀 Starting Bonafide Backend Application");

    match env_loaded {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let app = App::new().await;
    app.start().await;
}
