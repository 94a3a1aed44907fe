use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use tracing::warn;

use crate::utils::telegram::split_message;

/// Outbound side of a chat: everything the handlers say goes through here.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<()>;
    async fn send_markdown(&self, text: &str) -> Result<()>;
    async fn send_photo(&self, image: Vec<u8>, file_name: &str, caption: &str) -> Result<()>;
}

/// Replies into the chat an update came from.
pub struct TelegramReplier {
    bot: Bot,
    chat_id: ChatId,
    max_length: usize,
}

impl TelegramReplier {
    pub fn new(bot: Bot, chat_id: ChatId, max_length: usize) -> Self {
        TelegramReplier {
            bot,
            chat_id,
            max_length,
        }
    }
}

#[async_trait]
impl Replier for TelegramReplier {
    async fn send_text(&self, text: &str) -> Result<()> {
        for part in split_message(text, self.max_length) {
            self.bot.send_message(self.chat_id, part).await?;
        }
        Ok(())
    }

    #[allow(deprecated)]
    async fn send_markdown(&self, text: &str) -> Result<()> {
        let result = self
            .bot
            .send_message(self.chat_id, text.to_string())
            .parse_mode(ParseMode::Markdown)
            .await;
        if let Err(err) = result {
            warn!("Failed to send formatted message, retrying as plain text: {err}");
            self.bot.send_message(self.chat_id, text.to_string()).await?;
        }
        Ok(())
    }

    async fn send_photo(&self, image: Vec<u8>, file_name: &str, caption: &str) -> Result<()> {
        let input = InputFile::memory(image).file_name(file_name.to_string());
        self.bot
            .send_photo(self.chat_id, input)
            .caption(caption.to_string())
            .await?;
        Ok(())
    }
}
