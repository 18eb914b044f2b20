//! Outbound side of the bot
//!
//! Handlers only ever need to send text back to a chat, so that is the whole
//! surface they see.

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

/// Sends a reply to a chat
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, chat_id: ChatId, text: String) -> Result<()>;
}

#[async_trait]
impl Replier for Bot {
    async fn reply(&self, chat_id: ChatId, text: String) -> Result<()> {
        self.send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}
