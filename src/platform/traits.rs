use std::path::Path;

use async_trait::async_trait;

use super::{DownloadedFile, PlatformError, VideoInfo};

/// The video-extraction capability: list the renditions of a link and fetch one of them.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, PlatformError>;

    /// Downloads `format_id` of `url` into `target_dir`, which already exists.
    async fn download(&self, url: &str, format_id: &str, target_dir: &Path) -> Result<DownloadedFile, PlatformError>;
}
