//! Bot command definitions
//!
//! Defines all Telegram bot commands and their parsing logic

use teloxide::utils::command::BotCommands;

/// All bot commands
#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Команды бота погоды:")]
pub enum Command {
    #[command(description = "Приветствие и погода в городе по умолчанию")]
    Start,

    #[command(description = "Показать эту справку")]
    Help,

    #[command(description = "Показать текущую погоду")]
    Weather,
}

/// Parse a message text into a command
///
/// Only the first word is considered, so `/weather please` is `/weather`.
/// `/weather@bot_name` is accepted when `bot_name` matches.
pub fn parse_command(text: &str, bot_name: &str) -> Option<Command> {
    let head = text.split_whitespace().next()?;
    Command::parse(head, bot_name).ok()
}
