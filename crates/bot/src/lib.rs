//! Weatherbot Bot - Telegram front end
//!
//! This crate turns Telegram commands into weather replies. The same handler
//! tree serves both long polling and webhook delivery.

pub mod commands;
pub mod handlers;
pub mod reply;
pub mod transport;

use std::sync::Arc;

use anyhow::Result;
use commands::{Command, parse_command};
use handlers::{CommandContext, WeatherService};
use reply::Replier;
use teloxide::dispatching::{DefaultKey, UpdateHandler};
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::utils::command::BotCommands;
use tokio_util::sync::CancellationToken;
use weather::WeatherSource;
use weatherbot_core::DisplayZone;

pub use transport::{Transport, WebhookSettings};

/// Build the update handler shared by every transport
///
/// Messages whose first word is a known command are routed to
/// [`handle_command`]; everything else is ignored.
pub fn build_handler_tree() -> UpdateHandler<RequestError> {
    Update::filter_message()
        .filter_map(|msg: Message, me: Me| {
            msg.text()
                .and_then(|text| parse_command(text, me.username()))
        })
        .endpoint(handle_command)
}

/// Build a dispatcher with the weather service injected
pub fn build_dispatcher(
    bot: Bot,
    service: WeatherService,
) -> Dispatcher<Bot, RequestError, DefaultKey> {
    Dispatcher::builder(bot, build_handler_tree())
        .dependencies(dptree::deps![service])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .build()
}

/// Run the Telegram bot service
///
/// Runs until `shutdown` is cancelled (in-flight handlers are drained first)
/// or the update listener stops on its own.
///
/// # Arguments
/// * `bot_token` - Telegram bot token for authentication
/// * `source` - Weather provider used by the handlers
/// * `zone` - Zone used to display times
/// * `transport` - Long polling or webhook delivery
/// * `shutdown` - Cancelled by the caller on process shutdown
pub async fn run_bot(
    bot_token: String,
    source: Arc<dyn WeatherSource>,
    zone: DisplayZone,
    transport: Transport,
    shutdown: CancellationToken,
) -> Result<()> {
    let bot = Bot::new(bot_token);
    tracing::info!("Bot initialized, starting dispatcher");

    register_commands(&bot).await;

    let dispatcher = build_dispatcher(bot.clone(), WeatherService::new(source, zone));
    transport::run(bot, dispatcher, transport, shutdown).await
}

/// Publish the command menu shown by Telegram clients
async fn register_commands(bot: &Bot) {
    match bot.set_my_commands(Command::bot_commands()).await {
        Ok(_) => tracing::debug!("Command menu registered"),
        Err(e) => tracing::warn!("Failed to register command menu: {}", e),
    }
}

/// Dispatcher endpoint for parsed commands
async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    service: WeatherService,
) -> ResponseResult<()> {
    dispatch_command(&bot, &msg, cmd, &service).await
}

/// Run one command for an inbound message
///
/// Handler failures are logged with the triggering message and otherwise
/// swallowed: the user gets no reply in that case.
pub async fn dispatch_command<R: Replier + ?Sized>(
    replier: &R,
    msg: &Message,
    cmd: Command,
    service: &WeatherService,
) -> ResponseResult<()> {
    let ctx = CommandContext::from_message(msg);
    tracing::info!("Handling command: {:?}", cmd);

    if let Err(e) = handlers::route_command(replier, service, &ctx, cmd).await {
        tracing::error!(
            command = ?cmd,
            chat_id = %ctx.chat_id,
            message_id = msg.id.0,
            user_id = ?msg.from.as_ref().map(|user| user.id),
            "Error handling command: {:#}",
            e
        );
    }

    Ok(())
}
