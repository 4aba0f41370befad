use serde::{Deserialize, Serialize};

use crate::messenger::{parse_command, ChatTarget, InboundEvent, UserKey};

/// Response of `POST /uploads`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadEndpoint {
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Response of the upload URL itself; video uploads may not include a token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub text: String,
    pub notify: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentRequest>,
}

impl NewMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            notify: true,
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: AttachmentRequest) -> Self {
        self.attachments.push(attachment);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum AttachmentRequest {
    Video(UploadedPayload),
    Audio(UploadedPayload),
    File(UploadedPayload),
    InlineKeyboard(KeyboardPayload),
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedPayload {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardPayload {
    pub buttons: Vec<Vec<CallbackButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallbackButton {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
    pub payload: String,
}

impl CallbackButton {
    pub fn new(text: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            kind: "callback",
            text: text.into(),
            payload: payload.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CallbackAnswer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateList {
    #[serde(default)]
    pub updates: Vec<Update>,
    #[serde(default)]
    pub marker: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "update_type", rename_all = "snake_case")]
pub enum Update {
    MessageCreated {
        message: Message,
    },
    MessageCallback {
        callback: Callback,
        #[serde(default)]
        message: Option<Message>,
    },
    BotStarted {
        #[serde(default)]
        chat_id: Option<i64>,
        user: User,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub sender: Option<User>,
    #[serde(default)]
    pub recipient: Recipient,
    #[serde(default)]
    pub body: MessageBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub user_id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Recipient {
    #[serde(default)]
    pub chat_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Callback {
    pub callback_id: String,
    #[serde(default)]
    pub payload: Option<String>,
    pub user: User,
}

fn target_for(chat_id: Option<i64>, user: UserKey) -> ChatTarget {
    chat_id.map(ChatTarget::Chat).unwrap_or(ChatTarget::User(user.0))
}

impl Update {
    pub fn into_event(self) -> Option<InboundEvent> {
        match self {
            Update::MessageCreated { message } => {
                let sender = message.sender?;
                let user = UserKey(sender.user_id);
                let target = target_for(message.recipient.chat_id, user);
                let text = message.body.text.unwrap_or_default();

                match parse_command(&text) {
                    Some(command) => Some(InboundEvent::Command {
                        user,
                        target,
                        command,
                        first_name: sender.name,
                    }),
                    None => Some(InboundEvent::Text { user, target, text }),
                }
            }
            Update::MessageCallback { callback, message } => {
                let user = UserKey(callback.user.user_id);
                let chat_id = message.and_then(|m| m.recipient.chat_id);
                Some(InboundEvent::Callback {
                    user,
                    target: target_for(chat_id, user),
                    callback_id: callback.callback_id,
                    payload: callback.payload.unwrap_or_default(),
                })
            }
            Update::BotStarted { chat_id, user } => {
                let key = UserKey(user.user_id);
                Some(InboundEvent::Started {
                    user: key,
                    target: target_for(chat_id, key),
                    first_name: user.name,
                })
            }
            Update::Unsupported => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_attachment_wire_format() {
        let message = NewMessage::plain("Done")
            .with_attachment(AttachmentRequest::Video(UploadedPayload { token: "tok".into() }));
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "text": "Done",
                "notify": true,
                "attachments": [{"type": "video", "payload": {"token": "tok"}}]
            })
        );

        let keyboard = AttachmentRequest::InlineKeyboard(KeyboardPayload {
            buttons: vec![vec![CallbackButton::new("mp4 360p (1.0MB)", "yt|abcd1234|18")]],
        });
        assert_eq!(
            serde_json::to_value(&keyboard).unwrap(),
            json!({
                "type": "inline_keyboard",
                "payload": {"buttons": [[{"type": "callback", "text": "mp4 360p (1.0MB)", "payload": "yt|abcd1234|18"}]]}
            })
        );

        assert_eq!(serde_json::to_value(NewMessage::plain("hi")).unwrap(), json!({"text": "hi", "notify": true}));
    }

    #[test]
    fn test_updates_to_events() {
        let list: UpdateList = serde_json::from_value(json!({
            "marker": 42,
            "updates": [
                {
                    "update_type": "message_created",
                    "timestamp": 1,
                    "message": {
                        "sender": {"user_id": 7, "name": "Ann"},
                        "recipient": {"chat_id": 100, "chat_type": "dialog"},
                        "body": {"mid": "m1", "text": "https://youtu.be/abc"}
                    }
                },
                {
                    "update_type": "message_callback",
                    "timestamp": 2,
                    "callback": {"callback_id": "cb1", "payload": "yt|abcd1234|18", "user": {"user_id": 7}},
                    "message": {"recipient": {"chat_id": 100}, "body": {}}
                },
                {"update_type": "bot_started", "chat_id": 100, "user": {"user_id": 7, "name": "Ann"}},
                {"update_type": "message_created", "message": {"sender": {"user_id": 7}, "recipient": {}, "body": {"text": "/start"}}},
                {"update_type": "user_added", "chat_id": 5}
            ]
        }))
        .unwrap();

        assert_eq!(list.marker, Some(42));

        let events = list
            .updates
            .into_iter()
            .filter_map(Update::into_event)
            .collect::<Vec<_>>();

        assert_eq!(
            events,
            vec![
                InboundEvent::Text {
                    user: UserKey(7),
                    target: ChatTarget::Chat(100),
                    text: "https://youtu.be/abc".into(),
                },
                InboundEvent::Callback {
                    user: UserKey(7),
                    target: ChatTarget::Chat(100),
                    callback_id: "cb1".into(),
                    payload: "yt|abcd1234|18".into(),
                },
                InboundEvent::Started {
                    user: UserKey(7),
                    target: ChatTarget::Chat(100),
                    first_name: Some("Ann".into()),
                },
                InboundEvent::Command {
                    user: UserKey(7),
                    target: ChatTarget::User(7),
                    command: "start".into(),
                    first_name: None,
                },
            ]
        );
    }
}
