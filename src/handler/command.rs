use std::sync::Arc;

use teloxide::{
    dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler},
    types::{Message, Update},
};

use crate::{
    command::Command,
    error::HandlerResult,
    messenger::InboundEvent,
    runtime::DeliveryOrchestrator,
};

use super::{chat_target, user_key};

async fn handle_command(orchestrator: Arc<DeliveryOrchestrator>, msg: Message, cmd: Command) -> HandlerResult<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    orchestrator
        .handle_event(InboundEvent::Command {
            user: user_key(user.id),
            target: chat_target(msg.chat.id),
            command: cmd.name().to_string(),
            first_name: Some(user.first_name.clone()),
        })
        .await;

    Ok(())
}

pub fn get_command_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command)
}
