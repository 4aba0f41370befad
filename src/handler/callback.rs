use std::sync::Arc;

use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    types::{CallbackQuery, Update},
};

use crate::{
    error::HandlerResult,
    messenger::{ChatTarget, InboundEvent},
    runtime::DeliveryOrchestrator,
};

use super::{chat_target, user_key};

async fn handle_callback(orchestrator: Arc<DeliveryOrchestrator>, q: CallbackQuery) -> HandlerResult<()> {
    let user = user_key(q.from.id);

    // inaccessible or missing messages still let us reply in the private chat
    let target = q
        .message
        .as_ref()
        .map(|message| chat_target(message.chat().id))
        .unwrap_or(ChatTarget::User(user.0));

    orchestrator
        .handle_event(InboundEvent::Callback {
            user,
            target,
            callback_id: q.id.0.clone(),
            payload: q.data.clone().unwrap_or_default(),
        })
        .await;

    Ok(())
}

pub fn get_callback_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_callback_query().endpoint(handle_callback)
}
