use std::sync::Arc;

use bot::BotService;
use config::{AppConfig, BackendKind};
use error::BotResult;
use messenger::max::{run_polling, MaxClient, MaxPlatform};
use state::AppState;

extern crate pretty_env_logger;
#[macro_use]
extern crate log;
#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

mod bot;
mod command;
mod config;
mod error;
mod handler;
mod messenger;
mod platform;
mod runtime;
mod service;
mod state;
mod storage;
mod utils;


#[tokio::main]
async fn main() -> BotResult<()> {
    let _ = dotenvy::dotenv();

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    let _ = pretty_env_logger::try_init_timed();

    info!("Starting bot...");

    let config = AppConfig::from_env()?;
    rust_i18n::set_locale(&config.bot.locale);

    info!("Initializing AppState...");
    let state = AppState::new(config).await?;
    state.runtime.start().await?;
    info!("AppState initialized");

    match state.config.bot.backend {
        BackendKind::Telegram => {
            let service = BotService::new(&state.config)?;
            let orchestrator = state.orchestrator(service.platform());

            service.start(orchestrator).await.map_err(|e| anyhow::anyhow!(e))?;
        }
        BackendKind::Max => {
            let client = MaxClient::new(&state.config.max, &state.config.bot.token).map_err(anyhow::Error::from)?;
            let orchestrator = state.orchestrator(Arc::new(MaxPlatform::new(client.clone())));

            run_polling(client, orchestrator).await;
        }
    }

    state.runtime.stop().await?;
    info!("Bot stopped");

    Ok(())
}
