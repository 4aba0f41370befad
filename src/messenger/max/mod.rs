mod client;
pub mod model;
mod poller;

use std::path::Path;

use async_trait::async_trait;

pub use client::MaxClient;
pub use poller::run_polling;

use crate::platform::MediaKind;

use super::{ChatPlatform, ChatTarget, KeyboardOption, MessengerError};
use client::ensure_success;
use model::{AttachmentRequest, CallbackButton, KeyboardPayload, NewMessage, UploadedPayload};

#[derive(Clone)]
pub struct MaxPlatform {
    client: MaxClient,
}

impl MaxPlatform {
    pub fn new(client: MaxClient) -> Self {
        Self { client }
    }
}

fn upload_type(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "video",
        MediaKind::Audio => "audio",
        MediaKind::Document => "file",
    }
}

#[async_trait]
impl ChatPlatform for MaxPlatform {
    fn name(&self) -> &str {
        "max"
    }

    async fn send_text(&self, target: &ChatTarget, text: &str) -> Result<(), MessengerError> {
        let response = self.client.send_message(target, &NewMessage::plain(text)).await?;
        ensure_success(&response)
    }

    async fn send_keyboard(
        &self,
        target: &ChatTarget,
        text: &str,
        options: &[KeyboardOption],
    ) -> Result<(), MessengerError> {
        let buttons = options
            .iter()
            .map(|option| vec![CallbackButton::new(option.text.clone(), option.payload.clone())])
            .collect();

        let message =
            NewMessage::plain(text).with_attachment(AttachmentRequest::InlineKeyboard(KeyboardPayload { buttons }));

        let response = self.client.send_message(target, &message).await?;
        ensure_success(&response)
    }

    async fn answer_callback(&self, callback_id: &str, notification: Option<&str>) -> Result<(), MessengerError> {
        self.client.answer_callback(callback_id, notification).await
    }

    async fn send_file(
        &self,
        target: &ChatTarget,
        path: &Path,
        kind: MediaKind,
        caption: &str,
    ) -> Result<(), MessengerError> {
        let token = self.client.upload(path, upload_type(kind)).await?;

        // freshly uploaded media is rarely attachable right away
        tokio::time::sleep(self.client.settle_delay()).await;

        let payload = UploadedPayload { token };
        let attachment = match kind {
            MediaKind::Video => AttachmentRequest::Video(payload),
            MediaKind::Audio => AttachmentRequest::Audio(payload),
            MediaKind::Document => AttachmentRequest::File(payload),
        };

        let message = NewMessage::plain(caption).with_attachment(attachment);
        let response = self.client.send_message_with_retry(target, &message).await?;

        if !response.status.is_success() {
            error!("Failed to deliver {}: {} {}", path.display(), response.status, response.body);
        }
        ensure_success(&response)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use url::Url;
    use wiremock::{
        matchers::{body_partial_json, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::config::MaxConfig;

    const TOKEN: &str = "secret";

    fn platform(server: &MockServer, send_retries: u32) -> MaxPlatform {
        let config = MaxConfig {
            api_url: Url::parse(&server.uri()).unwrap(),
            send_retries,
            send_retry_delay_secs: 0,
            upload_settle_secs: 0,
        };
        MaxPlatform::new(MaxClient::with_client(reqwest::Client::new(), &config, TOKEN))
    }

    fn scratch_file() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("My clip.mp4");
        std::fs::write(&file, b"not really a video").unwrap();
        (dir, file)
    }

    async fn mount_upload(server: &MockServer, kind: &str) {
        Mock::given(method("POST"))
            .and(path("/uploads"))
            .and(query_param("type", kind))
            .and(query_param("access_token", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "url": format!("{}/upload-target", server.uri()),
            })))
            .expect(1)
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/upload-target"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "file-tok"})))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_send_file_retries_until_attachment_is_ready() {
        let server = MockServer::start().await;
        let (_dir, file) = scratch_file();
        mount_upload(&server, "video").await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "attachment.not.ready",
                "message": "Key: errors.process.attachment.file.not.processed",
            })))
            .up_to_n_times(1)
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(query_param("chat_id", "100"))
            .and(body_partial_json(json!({
                "text": "Done ✅\nMy clip.mp4",
                "attachments": [{"type": "video", "payload": {"token": "file-tok"}}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": {}})))
            .expect(1)
            .mount(&server)
            .await;

        platform(&server, 3)
            .send_file(&ChatTarget::Chat(100), &file, MediaKind::Video, "Done ✅\nMy clip.mp4")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_file_gives_up_after_retries() {
        let server = MockServer::start().await;
        let (_dir, file) = scratch_file();
        mount_upload(&server, "file").await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_string("errors.process.attachment.file.not.processed"))
            .expect(3)
            .mount(&server)
            .await;

        let err = platform(&server, 3)
            .send_file(&ChatTarget::User(7), &file, MediaKind::Document, "caption")
            .await
            .unwrap_err();

        assert!(matches!(err, MessengerError::Api { status: 400, ref body } if body.contains("not.processed")));
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let server = MockServer::start().await;
        let (_dir, file) = scratch_file();
        mount_upload(&server, "audio").await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"code": "proto.payload"})))
            .expect(1)
            .mount(&server)
            .await;

        let err = platform(&server, 5)
            .send_file(&ChatTarget::Chat(100), &file, MediaKind::Audio, "caption")
            .await
            .unwrap_err();

        assert!(matches!(err, MessengerError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_upload_token_falls_back_to_endpoint_token() {
        let server = MockServer::start().await;
        let (_dir, file) = scratch_file();

        Mock::given(method("POST"))
            .and(path("/uploads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "url": format!("{}/upload-target", server.uri()),
                "token": "early-tok",
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/upload-target"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<retval>1</retval>"))
            .mount(&server)
            .await;

        let client = platform(&server, 1).client;
        assert_eq!(client.upload(&file, "video").await.unwrap(), "early-tok");
    }

    #[tokio::test]
    async fn test_keyboard_and_callback_answer() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(query_param("user_id", "7"))
            .and(body_partial_json(json!({
                "text": "Choose a format:\nClip",
                "attachments": [{
                    "type": "inline_keyboard",
                    "payload": {"buttons": [[{"type": "callback", "text": "mp4 360p (1.0MB)", "payload": "yt|abcd1234|18"}]]},
                }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": {}})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/answers"))
            .and(query_param("callback_id", "cb1"))
            .and(body_partial_json(json!({"notification": "Download started..."})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let max = platform(&server, 3);
        max.send_keyboard(
            &ChatTarget::User(7),
            "Choose a format:\nClip",
            &[KeyboardOption {
                text: "mp4 360p (1.0MB)".into(),
                payload: "yt|abcd1234|18".into(),
            }],
        )
        .await
        .unwrap();

        max.answer_callback("cb1", Some("Download started...")).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_text_reports_api_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = platform(&server, 3)
            .send_text(&ChatTarget::Chat(1), "hello")
            .await
            .unwrap_err();

        assert!(matches!(err, MessengerError::Api { status: 401, .. }));
    }
}
