use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather::{OpenWeatherClient, WeatherSource};

mod config;
mod health;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // The guard must be kept alive for the duration of the program to ensure logs are flushed
    let _guard = init_tracing();

    tracing::info!("🚀 Starting weather bot");

    // Missing TELEGRAM_TOKEN or API_KEY ends the process here
    let config = config::UnifiedConfig::from_env()?;
    tracing::info!(
        "✓ Configuration loaded (city: {}, mode: {})",
        config.core.default_city,
        if config.webhook.is_some() { "webhook" } else { "polling" }
    );

    // A health port that cannot be bound ends the process before the bot starts
    let health_addr = config.health_addr();
    let health_listener = health::bind(health_addr)
        .await
        .with_context(|| format!("Failed to bind health server on {health_addr}"))?;

    let health_shutdown = CancellationToken::new();
    let bot_shutdown = CancellationToken::new();

    let health_handle = spawn_health(health_listener, health_shutdown.clone());
    let bot_handle = spawn_bot(&config, bot_shutdown.clone());

    tracing::info!("✓ All services started");

    tokio::select! {
        () = wait_for_shutdown() => tracing::info!("📡 Shutdown signal received"),
        () = bot_shutdown.cancelled() => tracing::warn!("Bot service stopped on its own"),
    }

    // Drain the bot first, then close the health listener
    bot_shutdown.cancel();
    let bot_result = bot_handle.await?;

    health_shutdown.cancel();
    let _ = health_handle.await;

    tracing::info!("✓ All services stopped gracefully");
    bot_result
}

fn spawn_health(
    listener: tokio::net::TcpListener,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = health::run_health(listener, shutdown).await {
            tracing::error!("Health server exited: {}", e);
        }
    })
}

fn spawn_bot(
    config: &config::UnifiedConfig,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<Result<()>> {
    let source: Arc<dyn WeatherSource> = Arc::new(OpenWeatherClient::from_config(&config.core));
    let bot_token = config.core.telegram_token.clone();
    let zone = config.core.display_zone;
    let transport = config.to_transport();

    tokio::spawn(async move {
        let result = bot::run_bot(bot_token, source, zone, transport, shutdown.clone()).await;
        if let Err(e) = &result {
            tracing::error!("Bot service exited: {:#}", e);
        }
        // Wakes main when the bot stops without a signal
        shutdown.cancel();
        result
    })
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,bot=debug,weather=debug,weatherbot=debug".into());

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(true);

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    let enable_file_logging = std::env::var("ENABLE_FILE_LOGGING")
        .map(|v| v.to_lowercase() != "false" && v != "0")
        .unwrap_or(true);

    if enable_file_logging {
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
        let file_appender = tracing_appender::rolling::daily(log_dir, "weatherbot.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking)
            .json();

        registry.with(file_layer).init();

        Some(guard)
    } else {
        registry.init();
        None
    }
}
