use std::sync::Arc;

use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    types::{Message, Update},
};

use crate::{error::HandlerResult, messenger::InboundEvent, runtime::DeliveryOrchestrator};

use super::{chat_target, user_key};

async fn handle_message(orchestrator: Arc<DeliveryOrchestrator>, msg: Message) -> HandlerResult<()> {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };

    orchestrator
        .handle_event(InboundEvent::Text {
            user: user_key(user.id),
            target: chat_target(msg.chat.id),
            text: text.to_string(),
        })
        .await;

    Ok(())
}

pub fn get_message_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_message().endpoint(handle_message)
}
