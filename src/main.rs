//! tablevote — collaborative restaurant-matching backend.
//!
//! One participant creates a session with location/filter criteria,
//! others join by id, everyone swipes yes/no on the candidate deck
//! until some restaurant collects enough yes votes. State lives in
//! Redis with a bounded-latency in-process fallback; live deltas go
//! out over WebSockets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::{router, AppState};
use api::state::SearchDefaults;
use places::{HttpPlacesClient, PlacesConfig};
use session_store::{MemoryStore, OfflineBackend, RedisBackend, SessionBackend, SessionStore, StoreConfig};
use telemetry::{health, init_tracing_from_env};
use worker::{Scheduler, WorkerConfig};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    redis: StoreConfig,

    #[serde(default)]
    places: PlacesConfig,

    /// Fallback-map sweep interval in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    sweep_interval_secs: u64,

    /// Durable-backend probe interval in seconds.
    #[serde(default = "default_probe_interval_secs")]
    probe_interval_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_probe_interval_secs() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            redis: StoreConfig::default(),
            places: PlacesConfig::default(),
            sweep_interval_secs: default_sweep_interval_secs(),
            probe_interval_secs: default_probe_interval_secs(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting tablevote v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;
    info!(
        redis_url = %config.redis.url,
        fallback_enabled = config.redis.fallback_enabled,
        ttl_days = config.redis.ttl_days,
        "Loaded store config"
    );

    // Connect to Redis. With fallback enabled the service still comes
    // up when Redis is unreachable and serves from the in-process map
    // until the probe/resync path or a restart restores durability.
    let backend: Arc<dyn SessionBackend> = match RedisBackend::connect(&config.redis.url).await {
        Ok(backend) => {
            health().redis.set_healthy();
            Arc::new(backend)
        }
        Err(e) if config.redis.fallback_enabled => {
            error!(error = %e, "Redis unreachable at startup, running on fallback map only");
            health().redis.set_unhealthy(e.to_string());
            health().set_fallback_active(true);
            Arc::new(OfflineBackend)
        }
        Err(e) => {
            return Err(anyhow::anyhow!(e).context("Failed to connect to Redis"));
        }
    };

    // Process-wide fallback map: created here, swept by the scheduler,
    // dropped at shutdown.
    let fallback = Arc::new(MemoryStore::new());
    let store = Arc::new(SessionStore::new(backend, fallback, config.redis.clone()));

    // Restaurant source client
    let places_client = HttpPlacesClient::new(config.places.clone())
        .context("Failed to create restaurant source client")?;
    if config.places.base_url.is_empty() || config.places.base_url == "mock" {
        warn!("No restaurant source configured, serving mock decks");
    }

    // Start background workers
    let scheduler = Arc::new(Scheduler::new(
        WorkerConfig {
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
            probe_interval: Duration::from_secs(config.probe_interval_secs),
            ..WorkerConfig::default()
        },
        store.clone(),
    ));
    let _worker_handles = scheduler.start();

    // Create application state
    let search_defaults = SearchDefaults {
        radius_km: config.places.default_radius_km,
        center: config.places.default_center,
    };
    let state = AppState::new(store, Arc::new(places_client), search_defaults);

    // Create router
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("TABLEVOTE")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested config from environment
    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(url) = std::env::var("TABLEVOTE_REDIS_URL") {
        config.redis.url = url;
    }
    if let Ok(enabled) = std::env::var("TABLEVOTE_REDIS_FALLBACK_ENABLED") {
        config.redis.fallback_enabled = enabled == "1" || enabled.to_lowercase() == "true";
    }
    if let Ok(days) = std::env::var("TABLEVOTE_REDIS_TTL_DAYS") {
        if let Ok(days) = days.parse() {
            config.redis.ttl_days = days;
        }
    }
    if let Ok(base_url) = std::env::var("TABLEVOTE_PLACES_BASE_URL") {
        config.places.base_url = base_url;
    }
    if let Ok(api_key) = std::env::var("TABLEVOTE_PLACES_API_KEY") {
        config.places.api_key = Some(api_key);
    }
    if let Ok(radius) = std::env::var("TABLEVOTE_PLACES_DEFAULT_RADIUS_KM") {
        if let Ok(radius) = radius.parse() {
            config.places.default_radius_km = radius;
        }
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
