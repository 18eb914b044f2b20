//! Command handlers
//!
//! Implementation of all bot command handlers

use std::sync::Arc;

use anyhow::Result;
use teloxide::types::{ChatId, Message};
use weather::WeatherSource;
use weatherbot_core::formatter::escape_html;
use weatherbot_core::{DisplayZone, format_weather};

use crate::commands::Command;
use crate::reply::Replier;

/// Name used in the greeting when the sender is unknown
pub const FALLBACK_NAME: &str = "друг";

/// Static /help text
pub const HELP_TEXT: &str = "📖 <b>Справка по командам:</b>\n\n\
     /start - Показать погоду в городе по умолчанию\n\
     /help - Показать эту справку\n\
     /weather - Показать текущую погоду\n\n\
     ℹ️ Бот автоматически показывает актуальную погоду \
     для заранее заданного города.";

/// Weather lookup shared by every handler
#[derive(Clone)]
pub struct WeatherService {
    source: Arc<dyn WeatherSource>,
    zone: DisplayZone,
}

impl WeatherService {
    pub fn new(source: Arc<dyn WeatherSource>, zone: DisplayZone) -> Self {
        Self { source, zone }
    }

    /// Fetch the default city and render it; failures become the error text
    pub async fn current_weather_text(&self) -> String {
        let report = self.source.fetch(None).await.ok();
        format_weather(report.as_ref(), &self.zone)
    }
}

/// What a handler needs to know about the triggering message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub chat_id: ChatId,
    pub display_name: String,
}

impl CommandContext {
    pub fn new(chat_id: ChatId, display_name: impl Into<String>) -> Self {
        Self {
            chat_id,
            display_name: display_name.into(),
        }
    }

    pub fn from_message(msg: &Message) -> Self {
        let display_name = msg
            .from
            .as_ref()
            .map(|user| user.first_name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_NAME);

        Self::new(msg.chat.id, display_name)
    }
}

/// Greeting that precedes the weather block in /start
pub fn greeting(display_name: &str) -> String {
    format!(
        "Привет, {}! 👋\nЯ бот, который показывает актуальную погоду.\n\n",
        escape_html(display_name)
    )
}

/// Route a parsed command to its handler
pub async fn route_command<R>(
    replier: &R,
    service: &WeatherService,
    ctx: &CommandContext,
    cmd: Command,
) -> Result<()>
where
    R: Replier + ?Sized,
{
    match cmd {
        Command::Start => handle_start(replier, service, ctx).await,
        Command::Help => handle_help(replier, ctx).await,
        Command::Weather => handle_weather(replier, service, ctx).await,
    }
}

/// Handle the /start command
pub async fn handle_start<R>(replier: &R, service: &WeatherService, ctx: &CommandContext) -> Result<()>
where
    R: Replier + ?Sized,
{
    let weather_text = service.current_weather_text().await;
    let text = greeting(&ctx.display_name) + &weather_text;

    replier.reply(ctx.chat_id, text).await?;

    tracing::info!("User {} started the bot in chat {}", ctx.display_name, ctx.chat_id);

    Ok(())
}

/// Handle the /help command
pub async fn handle_help<R>(replier: &R, ctx: &CommandContext) -> Result<()>
where
    R: Replier + ?Sized,
{
    replier.reply(ctx.chat_id, HELP_TEXT.to_string()).await
}

/// Handle the /weather command
pub async fn handle_weather<R>(replier: &R, service: &WeatherService, ctx: &CommandContext) -> Result<()>
where
    R: Replier + ?Sized,
{
    let text = service.current_weather_text().await;
    replier.reply(ctx.chat_id, text).await
}
