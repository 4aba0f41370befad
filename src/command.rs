use teloxide::{adaptors::Throttle, macros::BotCommands, prelude::Requester, types::BotCommand, Bot};

use crate::error::HandlerResult;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    Start,
    Help,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
        }
    }

    pub fn user_commands() -> Vec<BotCommand> {
        vec![
            BotCommand::new("start", t!("commands.description.start")),
            BotCommand::new("help", t!("commands.description.help")),
        ]
    }
}

pub async fn setup_user_commands(bot: &Throttle<Bot>) -> HandlerResult<()> {
    bot.delete_my_commands().await?;
    bot.set_my_commands(Command::user_commands()).await?;
    Ok(())
}
