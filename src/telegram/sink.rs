//! [`ChatSink`] over the Telegram Bot API

use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};

use crate::core::error::AppResult;
use crate::download::job::{ChatSink, DeliveryKind};

/// Sends job status and results through a [`Bot`].
#[derive(Clone)]
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatSink for TelegramSink {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> AppResult<MessageId> {
        let msg = self.bot.send_message(chat_id, text).await?;
        Ok(msg.id)
    }

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> AppResult<()> {
        self.bot.edit_message_text(chat_id, message_id, text).await?;
        Ok(())
    }

    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> AppResult<()> {
        self.bot.delete_message(chat_id, message_id).await?;
        Ok(())
    }

    async fn send_file(&self, chat_id: ChatId, kind: DeliveryKind, path: &Path) -> AppResult<()> {
        let file = InputFile::file(path.to_path_buf());
        log::info!("Uploading {} to chat {} as {:?}", path.display(), chat_id.0, kind);
        match kind {
            DeliveryKind::Audio => {
                self.bot.send_audio(chat_id, file).await?;
            }
            DeliveryKind::Video => {
                self.bot.send_video(chat_id, file).supports_streaming(true).await?;
            }
            DeliveryKind::Document => {
                self.bot.send_document(chat_id, file).await?;
            }
        }
        Ok(())
    }
}
