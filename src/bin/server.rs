use sticker_studio::config::AppConfig;
use sticker_studio::core::logging;
use sticker_studio::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load();
    let _log_guard = logging::init(&config.log_dir());
    log::info!("Sticker Studio proxy v{} starting", sticker_studio::VERSION);

    server::serve(&config).await
}
