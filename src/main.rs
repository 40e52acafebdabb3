use std::sync::Arc;

use tracing::{error, info, warn};

use newspulse::news::SchedulerSettings;
use newspulse::{
    Config, Database, IngestScheduler, IngestionWorker, NewsApiClient, WebPushTransport, WebServer,
};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = newspulse::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        newspulse::logging::init_console_only(&config.logging.level);
    }

    info!("NewsPulse starting");

    if let Err(e) = run(config).await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> newspulse::Result<()> {
    config.validate()?;

    let db = Arc::new(Database::open(&config.database.path).await?);

    let mut scheduler = if !config.news.enabled {
        info!("Headline ingestion disabled");
        None
    } else if config.news.api_key.is_empty() {
        warn!("News API key not set (NEWS_API_KEY); headline ingestion will not run");
        None
    } else {
        let source = Arc::new(NewsApiClient::from_config(&config.news)?);
        let worker = IngestionWorker::new(db.clone(), source);
        let mut scheduler =
            IngestScheduler::new(worker, SchedulerSettings::from_config(&config.news));
        scheduler.start();
        Some(scheduler)
    };

    if !config.push.has_vapid_keys() {
        warn!("VAPID keys not set; push requests will be sent unsigned");
    }
    let transport = Arc::new(WebPushTransport::from_config(&config.push)?);

    let server = WebServer::new(&config.web, db, transport)?;
    let result = server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await;

    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.stop();
    }

    result?;
    info!("NewsPulse stopped");
    Ok(())
}
