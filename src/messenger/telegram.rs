use std::path::Path;

use async_trait::async_trait;
use teloxide::{
    adaptors::Throttle,
    payloads::{AnswerCallbackQuerySetters, SendAudioSetters, SendDocumentSetters, SendMessageSetters, SendVideoSetters},
    prelude::Requester,
    types::{CallbackQueryId, ChatId, InputFile},
    Bot,
};

use crate::{handler::get_format_keyboard, platform::MediaKind};

use super::{ChatPlatform, ChatTarget, KeyboardOption, MessengerError};

#[derive(Clone)]
pub struct TelegramPlatform {
    bot: Throttle<Bot>,
}

impl TelegramPlatform {
    pub fn new(bot: Throttle<Bot>) -> Self {
        Self { bot }
    }

    fn chat_id(target: &ChatTarget) -> ChatId {
        match target {
            ChatTarget::Chat(id) | ChatTarget::User(id) => ChatId(*id),
        }
    }

    async fn send_document(&self, chat_id: ChatId, path: &Path, caption: &str) -> Result<(), MessengerError> {
        self.bot
            .send_document(chat_id, InputFile::file(path.to_path_buf()))
            .caption(caption)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_text(&self, target: &ChatTarget, text: &str) -> Result<(), MessengerError> {
        self.bot.send_message(Self::chat_id(target), text).await?;
        Ok(())
    }

    async fn send_keyboard(
        &self,
        target: &ChatTarget,
        text: &str,
        options: &[KeyboardOption],
    ) -> Result<(), MessengerError> {
        self.bot
            .send_message(Self::chat_id(target), text)
            .reply_markup(get_format_keyboard(options))
            .await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, notification: Option<&str>) -> Result<(), MessengerError> {
        let request = self.bot.answer_callback_query(CallbackQueryId(callback_id.to_string()));
        match notification {
            Some(text) => request.text(text).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn send_file(
        &self,
        target: &ChatTarget,
        path: &Path,
        kind: MediaKind,
        caption: &str,
    ) -> Result<(), MessengerError> {
        let chat_id = Self::chat_id(target);
        let file = InputFile::file(path.to_path_buf());

        // native media first, the document upload accepts anything
        let native = match kind {
            MediaKind::Video => self.bot.send_video(chat_id, file).caption(caption).await,
            MediaKind::Audio => self.bot.send_audio(chat_id, file).caption(caption).await,
            MediaKind::Document => return self.send_document(chat_id, path, caption).await,
        };

        if let Err(e) = native {
            warn!("Failed to send {} as {:?}, retrying as document: {}", path.display(), kind, e);
            return self.send_document(chat_id, path, caption).await;
        }

        Ok(())
    }
}
