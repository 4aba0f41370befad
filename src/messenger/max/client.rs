use std::{path::Path, time::Duration};

use reqwest::{
    multipart::{Form, Part},
    Body, Client, RequestBuilder, StatusCode,
};
use url::Url;

use crate::{
    config::MaxConfig,
    messenger::{ChatTarget, MessengerError},
    utils::http::create_max_client,
};

use super::model::{CallbackAnswer, NewMessage, UpdateList, UploadEndpoint, UploadReceipt};

pub const POLL_TIMEOUT_SECS: u64 = 30;
const POLL_TYPES: &str = "message_created,message_callback,bot_started";

// error codes the API returns while an uploaded attachment is still being processed
const NOT_READY_MARKERS: [&str; 2] = ["attachment.not.ready", "not.processed"];

/// Status and body of an API call, kept so callers can report the last failure.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Thin HTTP client for the MAX bot API.
#[derive(Clone)]
pub struct MaxClient {
    http: Client,
    base: Url,
    token: String,
    send_retries: u32,
    retry_delay: Duration,
    settle_delay: Duration,
}

impl MaxClient {
    pub fn new(config: &MaxConfig, token: &str) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(create_max_client()?, config, token))
    }

    pub fn with_client(http: Client, config: &MaxConfig, token: &str) -> Self {
        Self {
            http,
            base: config.api_url.clone(),
            token: token.to_string(),
            send_retries: config.send_retries.max(1),
            retry_delay: Duration::from_secs(config.send_retry_delay_secs),
            settle_delay: Duration::from_secs(config.upload_settle_secs),
        }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base.join(path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.query(&[("access_token", self.token.as_str())])
    }

    async fn read(request: RequestBuilder) -> Result<ApiResponse, reqwest::Error> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }

    pub async fn send_message(&self, target: &ChatTarget, message: &NewMessage) -> Result<ApiResponse, MessengerError> {
        let (key, id) = match target {
            ChatTarget::Chat(id) => ("chat_id", id),
            ChatTarget::User(id) => ("user_id", id),
        };

        let request = self
            .authorized(self.http.post(self.endpoint("messages")?))
            .query(&[(key, id.to_string())])
            .json(message);

        Ok(Self::read(request).await?)
    }

    /// Sends a message whose attachment may still be processing server-side.
    ///
    /// A 400 naming an unready attachment is retried after a fixed delay, up to the
    /// configured number of attempts; any other response ends the loop. The last
    /// response is returned either way.
    pub async fn send_message_with_retry(
        &self,
        target: &ChatTarget,
        message: &NewMessage,
    ) -> Result<ApiResponse, MessengerError> {
        let mut attempt = 1;
        loop {
            let response = self.send_message(target, message).await?;

            if response.status != StatusCode::BAD_REQUEST
                || !is_attachment_not_ready(&response.body)
                || attempt >= self.send_retries
            {
                return Ok(response);
            }

            warn!(
                "Attachment not ready (attempt {}/{}), retrying in {:?}",
                attempt, self.send_retries, self.retry_delay
            );
            tokio::time::sleep(self.retry_delay).await;
            attempt += 1;
        }
    }

    /// Uploads a file and returns the attachment token.
    pub async fn upload(&self, path: &Path, kind: &str) -> Result<String, MessengerError> {
        let request = self
            .authorized(self.http.post(self.endpoint("uploads")?))
            .query(&[("type", kind)]);
        let response = Self::read(request).await?;
        ensure_success(&response)?;

        let endpoint: UploadEndpoint = serde_json::from_str(&response.body)?;

        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let part = Part::stream_with_length(Body::from(file), length).file_name(file_name);
        let form = Form::new().part("data", part);

        debug!("Uploading {} ({} bytes) as {}", path.display(), length, kind);
        let response = Self::read(self.http.post(&endpoint.url).multipart(form)).await?;
        ensure_success(&response)?;

        // some media types answer with a non-JSON receipt and keep the token from the first call
        let receipt = serde_json::from_str::<UploadReceipt>(&response.body).unwrap_or_default();

        receipt
            .token
            .or(endpoint.token)
            .ok_or(MessengerError::MissingUploadToken(response.body))
    }

    pub async fn answer_callback(&self, callback_id: &str, notification: Option<&str>) -> Result<(), MessengerError> {
        let answer = CallbackAnswer {
            notification: notification.map(str::to_string),
        };

        let request = self
            .authorized(self.http.post(self.endpoint("answers")?))
            .query(&[("callback_id", callback_id)])
            .json(&answer);

        ensure_success(&Self::read(request).await?)
    }

    pub async fn get_updates(&self, marker: Option<i64>) -> Result<UpdateList, MessengerError> {
        let mut request = self
            .authorized(self.http.get(self.endpoint("updates")?))
            .query(&[("timeout", POLL_TIMEOUT_SECS.to_string()), ("types", POLL_TYPES.to_string())])
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 15));

        if let Some(marker) = marker {
            request = request.query(&[("marker", marker)]);
        }

        let response = Self::read(request).await?;
        ensure_success(&response)?;

        Ok(serde_json::from_str(&response.body)?)
    }
}

pub fn is_attachment_not_ready(body: &str) -> bool {
    NOT_READY_MARKERS.iter().any(|marker| body.contains(marker))
}

pub fn ensure_success(response: &ApiResponse) -> Result<(), MessengerError> {
    if response.status.is_success() {
        Ok(())
    } else {
        Err(MessengerError::Api {
            status: response.status.as_u16(),
            body: response.body.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_detection() {
        assert!(is_attachment_not_ready(
            r#"{"code":"attachment.not.ready","message":"Key: errors.process.attachment.file.not.processed"}"#
        ));
        assert!(is_attachment_not_ready("errors.process.attachment.file.not.processed"));
        assert!(!is_attachment_not_ready(r#"{"code":"proto.payload","message":"text too long"}"#));
    }
}
