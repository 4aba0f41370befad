use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::adaptors::Throttle;
use teloxide::prelude::*;
use teloxide::Bot;

use crate::config::AppConfig;
use crate::error::{BotResult, HandlerResult};
use crate::handler::get_handler;
use crate::messenger::{ChatPlatform, TelegramPlatform};
use crate::runtime::DeliveryOrchestrator;
use crate::utils::http;

pub struct BotService {
    pub bot: Throttle<Bot>,
}

impl BotService {
    pub fn new(config: &AppConfig) -> BotResult<Self> {
        let client = http::create_telegram_client().map_err(anyhow::Error::from)?;
        let bot = Bot::with_client(config.bot.token.clone(), client).throttle(Limits::default());

        Ok(Self { bot })
    }

    pub fn platform(&self) -> Arc<dyn ChatPlatform> {
        Arc::new(TelegramPlatform::new(self.bot.clone()))
    }

    pub async fn start(&self, orchestrator: Arc<DeliveryOrchestrator>) -> HandlerResult<()> {
        info!("Testing connection to Telegram API...");
        match self.bot.get_me().await {
            Ok(me) => info!("Connected to Telegram API as @{}", me.username()),
            Err(e) => {
                error!("Failed to connect to Telegram API: {:?}", e);
                return Err(anyhow::anyhow!("Failed to connect to Telegram API: {}", e).into());
            }
        }

        let bot = self.bot.clone();

        crate::command::setup_user_commands(&bot).await?;

        Dispatcher::builder(bot, get_handler())
            .dependencies(dptree::deps![orchestrator])
            // every update gets its own task; one user's download never queues behind another's
            .distribution_function(|_| None::<std::convert::Infallible>)
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
