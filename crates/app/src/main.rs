use anyhow::Context;
use app::config::{AppConfig, ConfigError, prepare_sqlite_file, print_usage};
use app::{AppState, router};
use services::{AppServices, Clock, ServicesConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "app=info,services=info,tower_http=info";

async fn run() -> anyhow::Result<()> {
    let config = match AppConfig::parse(std::env::args().skip(1), |key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(ConfigError::HelpRequested) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return Err(e.into());
        }
    };

    // Open + migrate SQLite at startup; handlers only see the services.
    prepare_sqlite_file(&config.db_url).map_err(|e| anyhow::anyhow!(e))?;
    let clock = Clock::system();
    let services = AppServices::new_sqlite(
        &config.db_url,
        clock,
        ServicesConfig::from_env(config.leaderboard_limit),
    )
    .await
    .with_context(|| format!("opening {}", config.db_url))?;

    if !services.reading().enabled() {
        info!("GEMINI_API_KEY not set; reading assessment returns setup feedback");
    }

    let app = router(AppState::new(services, clock));
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!(address = %config.bind, db = %config.db_url, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
