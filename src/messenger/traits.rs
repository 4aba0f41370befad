use std::path::Path;

use async_trait::async_trait;

use crate::platform::MediaKind;

use super::{ChatTarget, KeyboardOption, MessengerError};

/// Outbound operations a messaging backend must offer to the delivery flow.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    fn name(&self) -> &str;

    async fn send_text(&self, target: &ChatTarget, text: &str) -> Result<(), MessengerError>;

    /// Sends `text` with one button per row.
    async fn send_keyboard(
        &self,
        target: &ChatTarget,
        text: &str,
        options: &[KeyboardOption],
    ) -> Result<(), MessengerError>;

    async fn answer_callback(&self, callback_id: &str, notification: Option<&str>) -> Result<(), MessengerError>;

    async fn send_file(
        &self,
        target: &ChatTarget,
        path: &Path,
        kind: MediaKind,
        caption: &str,
    ) -> Result<(), MessengerError>;
}
