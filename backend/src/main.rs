//! Kariyad school weather station - server binary

use std::net::SocketAddr;

use anyhow::Context;
use kariyad_weather_backend::{create_app, services::auth::hash_password, AppState, Config, WeatherRecordStore};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `kws-server hash-password <password>` prints a value for auth.admin_password_hash
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [command, password] = args.as_slice() {
        if command == "hash-password" {
            println!("{}", hash_password(password)?);
            return Ok(());
        }
    }

    // Load .env before reading RUST_LOG and LOG_FORMAT
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::load().context("Failed to load configuration")?;

    tracing::info!("Starting Kariyad weather station server");
    tracing::info!("Environment: {}", config.environment);
    if config.auth.admin_password_hash.is_none() {
        tracing::warn!("No admin password hash configured; write endpoints are unreachable");
    }

    let store = WeatherRecordStore::open(config.store_config())
        .await
        .context("Failed to open weather record store")?;

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.bind_address()))?;

    // Build application
    let app = create_app(AppState::new(store, config));

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "kws_server=debug,kariyad_weather_backend=debug,tower_http=debug".into()
    });
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
