//! Update delivery: long polling or webhook
//!
//! Both transports feed the same dispatcher. Shutdown goes through the
//! dispatcher's shutdown token so in-flight handlers finish first.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use teloxide::dispatching::{DefaultKey, ShutdownToken};
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::update_listeners::{UpdateListener, webhooks};
use tokio_util::sync::CancellationToken;
use url::Url;

/// How updates reach the bot
#[derive(Debug, Clone)]
pub enum Transport {
    Polling,
    Webhook(WebhookSettings),
}

/// Webhook listener settings
#[derive(Debug, Clone)]
pub struct WebhookSettings {
    /// Local address the webhook listener binds to
    pub address: SocketAddr,
    /// Externally reachable base URL, e.g. `https://bot.example.com`
    pub public_url: Url,
    /// Secret Telegram must echo in `X-Telegram-Bot-Api-Secret-Token`
    pub secret: Option<String>,
}

/// Local route for webhook updates, derived from the bot token
///
/// The token itself never appears in a URL.
pub fn webhook_path(token: &str) -> String {
    let digest = hex::encode(Sha256::digest(token.as_bytes()));
    format!("/webhook/{}", &digest[..32])
}

/// Full URL registered with Telegram
pub fn webhook_url(public_url: &Url, token: &str) -> Result<Url> {
    let base = public_url.as_str().trim_end_matches('/');
    let url = format!("{base}{}", webhook_path(token));
    Url::parse(&url).with_context(|| format!("Invalid webhook URL: {url}"))
}

/// Run the dispatcher until `shutdown` is cancelled or the listener stops
pub async fn run(
    bot: Bot,
    mut dispatcher: Dispatcher<Bot, RequestError, DefaultKey>,
    transport: Transport,
    shutdown: CancellationToken,
) -> Result<()> {
    let drain = tokio::spawn(drain_on_cancel(dispatcher.shutdown_token(), shutdown));

    let result = match transport {
        Transport::Polling => {
            tracing::info!("Starting long polling");
            dispatcher.dispatch().await;
            Ok(())
        }
        Transport::Webhook(settings) => run_webhook(&bot, &mut dispatcher, settings).await,
    };

    drain.abort();
    result
}

async fn run_webhook(
    bot: &Bot,
    dispatcher: &mut Dispatcher<Bot, RequestError, DefaultKey>,
    settings: WebhookSettings,
) -> Result<()> {
    let url = webhook_url(&settings.public_url, bot.token())?;

    let tcp_listener = tokio::net::TcpListener::bind(settings.address)
        .await
        .with_context(|| format!("Failed to bind webhook listener on {}", settings.address))?;

    let mut options = webhooks::Options::new(settings.address, url);
    if let Some(secret) = settings.secret {
        options = options.secret_token(secret);
    }

    let (mut listener, stop_flag, router) = webhooks::axum_to_router(bot.clone(), options)
        .await
        .context("Failed to register webhook")?;
    let stop_token = listener.stop_token();

    tracing::info!("Webhook listener on {}", settings.address);

    let server = tokio::spawn(async move {
        axum::serve(tcp_listener, router)
            .with_graceful_shutdown(stop_flag)
            .await
            .inspect_err(|e| {
                tracing::error!("Webhook server error: {}", e);
                stop_token.stop();
            })
    });

    dispatcher
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the webhook listener"),
        )
        .await;

    let served = server.await.context("Webhook server task panicked")?;

    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!("Failed to delete webhook: {}", e);
    } else {
        tracing::info!("Webhook deleted");
    }

    served.context("Webhook server failed")
}

async fn drain_on_cancel(token: ShutdownToken, shutdown: CancellationToken) {
    shutdown.cancelled().await;
    tracing::info!("Waiting for in-flight updates to finish");

    loop {
        match token.shutdown() {
            Ok(done) => {
                done.await;
                tracing::info!("Dispatcher stopped");
                return;
            }
            // Dispatcher has not started yet
            Err(_) => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
}
