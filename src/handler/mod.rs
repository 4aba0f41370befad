mod callback;
mod command;
mod keyboard;
mod message;

pub use keyboard::*;

use callback::get_callback_handler;
use command::get_command_handler;
use message::get_message_handler;
use teloxide::{
    dispatching::UpdateHandler,
    dptree,
    types::{ChatId, UserId},
};

use crate::messenger::{ChatTarget, UserKey};

pub fn get_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(get_command_handler())
        .branch(get_message_handler())
        .branch(get_callback_handler())
}

fn user_key(id: UserId) -> UserKey {
    UserKey(id.0 as i64)
}

fn chat_target(chat_id: ChatId) -> ChatTarget {
    ChatTarget::Chat(chat_id.0)
}
