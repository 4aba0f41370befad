mod error;
mod model;

use std::sync::Arc;

pub use error::*;
pub use model::*;

use crate::platform::{MediaExtractor, RawFormat};

/// Upper bound on the number of buttons in a format menu.
pub const MAX_MENU_FORMATS: usize = 15;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const UNTITLED: &str = "No title";

#[derive(Clone)]
pub struct CatalogService {
    extractor: Arc<dyn MediaExtractor>,
}

impl CatalogService {
    pub fn new(extractor: Arc<dyn MediaExtractor>) -> Self {
        Self { extractor }
    }

    pub async fn fetch(&self, url: &str) -> Result<VideoCatalog, CatalogError> {
        info!("Fetching formats for {} via {}", url, self.extractor.name());

        let info = self.extractor.fetch_info(url).await?;

        if info.title.is_none() && info.formats.is_empty() {
            return Err(CatalogError::EmptyMetadata);
        }

        let formats = select_formats(&info.formats);
        debug!("{} of {} formats usable for {}", formats.len(), info.formats.len(), url);

        Ok(VideoCatalog {
            title: info.title.filter(|t| !t.is_empty()).unwrap_or_else(|| UNTITLED.to_string()),
            thumbnail: info.thumbnail.filter(|t| !t.is_empty()),
            formats,
        })
    }
}

/// Keeps renditions that carry an audio track and a known size, ordered by
/// `(height, size)` ascending. Stable, so ties keep the extractor's order.
pub fn filter_formats(formats: &[RawFormat]) -> Vec<RawFormat> {
    let mut kept = formats
        .iter()
        .filter(|f| !f.format_id.is_empty() && f.has_audio() && f.size_bytes().is_some())
        .cloned()
        .collect::<Vec<_>>();

    kept.sort_by_key(|f| (f.height.unwrap_or(0), f.size_bytes().unwrap_or(0)));
    kept
}

pub fn select_formats(formats: &[RawFormat]) -> Vec<FormatDescriptor> {
    filter_formats(formats)
        .iter()
        .take(MAX_MENU_FORMATS)
        .map(describe)
        .collect()
}

fn describe(format: &RawFormat) -> FormatDescriptor {
    let size_bytes = format.size_bytes().unwrap_or(0);

    FormatDescriptor {
        format_id: format.format_id.clone(),
        ext: format.ext.clone().filter(|e| !e.is_empty()).unwrap_or_else(|| "?".into()),
        quality: quality_label(format),
        size_bytes,
        size_label: human_bytes(size_bytes),
        audio_only: !format.has_video(),
    }
}

fn quality_label(format: &RawFormat) -> String {
    if let Some(resolution) = format
        .resolution
        .as_deref()
        .filter(|r| !r.is_empty() && *r != "audio only")
    {
        return resolution.to_string();
    }

    if let Some(height) = format.height.filter(|h| *h > 0) {
        return format!("{}p", height);
    }

    match format.abr.filter(|abr| *abr > 0.0) {
        Some(abr) => format!("{:.0}k audio", abr),
        None => "unknown".to_string(),
    }
}

/// Renders a byte count with one decimal and a binary unit, e.g. `1.5KB`.
pub fn human_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in SIZE_UNITS {
        if value < 1024.0 {
            return format!("{:.1}{}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1}PB", value)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;

    use super::*;
    use crate::platform::{DownloadedFile, PlatformError, VideoInfo};

    fn raw(id: &str, vcodec: &str, acodec: &str, height: Option<u32>, size: Option<f64>) -> RawFormat {
        RawFormat {
            format_id: id.to_string(),
            ext: Some("mp4".to_string()),
            vcodec: Some(vcodec.to_string()),
            acodec: Some(acodec.to_string()),
            height,
            filesize: size,
            ..Default::default()
        }
    }

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(0), "0.0B");
        assert_eq!(human_bytes(1023), "1023.0B");
        assert_eq!(human_bytes(1536), "1.5KB");
        assert_eq!(human_bytes(5 * 1024 * 1024), "5.0MB");
        assert_eq!(human_bytes(1_073_741_824), "1.0GB");
        assert_eq!(human_bytes(1024u64.pow(5) * 3), "3.0PB");
    }

    #[test]
    fn test_filter_drops_silent_and_unsized() {
        let formats = vec![
            raw("video-only", "avc1", "none", Some(1080), Some(9000.0)),
            raw("muxed", "avc1", "mp4a", Some(360), Some(5000.0)),
            raw("no-size", "avc1", "mp4a", Some(720), None),
            raw("zero-size", "avc1", "mp4a", Some(720), Some(0.0)),
            raw("audio", "none", "opus", None, Some(1000.0)),
            RawFormat {
                format_id: "unknown-codecs".into(),
                filesize_approx: Some(3000.0),
                ..Default::default()
            },
        ];

        let ids = filter_formats(&formats)
            .into_iter()
            .map(|f| f.format_id)
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["audio", "unknown-codecs", "muxed"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let formats = vec![
            raw("b", "avc1", "mp4a", Some(360), Some(100.0)),
            raw("a", "avc1", "mp4a", Some(360), Some(100.0)),
            raw("c", "avc1", "mp4a", Some(240), Some(900.0)),
        ];

        let ids = filter_formats(&formats)
            .into_iter()
            .map(|f| f.format_id)
            .collect::<Vec<_>>();

        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let formats = vec![
            raw("1", "avc1", "mp4a", Some(720), Some(7000.0)),
            raw("2", "none", "opus", None, Some(300.0)),
            raw("3", "vp9", "none", Some(1080), Some(9000.0)),
            raw("4", "avc1", "mp4a", Some(360), None),
        ];

        let once = filter_formats(&formats);
        assert_eq!(filter_formats(&once), once);
    }

    #[test]
    fn test_menu_is_capped() {
        let formats = (0..40)
            .map(|i| raw(&i.to_string(), "avc1", "mp4a", Some(100 + i), Some(1000.0)))
            .collect::<Vec<_>>();

        let selected = select_formats(&formats);
        assert_eq!(selected.len(), MAX_MENU_FORMATS);
        assert_eq!(selected[0].format_id, "0");
        assert_eq!(selected[14].format_id, "14");
    }

    #[test]
    fn test_labels() {
        let mut with_resolution = raw("22", "avc1", "mp4a", Some(720), Some(12_897_485.0));
        with_resolution.resolution = Some("1280x720".into());
        assert_eq!(describe(&with_resolution).label(), "mp4 1280x720 (12.3MB)");

        let by_height = raw("18", "avc1", "mp4a", Some(360), Some(1536.0));
        assert_eq!(describe(&by_height).label(), "mp4 360p (1.5KB)");

        let audio = RawFormat {
            format_id: "140".into(),
            ext: Some("m4a".into()),
            vcodec: Some("none".into()),
            acodec: Some("mp4a".into()),
            resolution: Some("audio only".into()),
            abr: Some(129.47),
            filesize: Some(2048.0),
            ..Default::default()
        };
        let descriptor = describe(&audio);
        assert!(descriptor.audio_only);
        assert_eq!(descriptor.label(), "m4a 129k audio (2.0KB)");

        let bare = RawFormat {
            format_id: "x".into(),
            filesize: Some(10.0),
            ..Default::default()
        };
        assert_eq!(describe(&bare).label(), "? unknown (10.0B)");
    }

    struct StaticExtractor(VideoInfo);

    #[async_trait]
    impl MediaExtractor for StaticExtractor {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch_info(&self, _url: &str) -> Result<VideoInfo, PlatformError> {
            Ok(self.0.clone())
        }

        async fn download(&self, _url: &str, _format_id: &str, _dir: &Path) -> Result<DownloadedFile, PlatformError> {
            Err(PlatformError::UnexpectedOutput("not used".into()))
        }
    }

    #[tokio::test]
    async fn test_fetch() {
        let service = CatalogService::new(Arc::new(StaticExtractor(VideoInfo {
            title: Some("Clip".into()),
            thumbnail: Some(String::new()),
            formats: vec![
                raw("18", "avc1", "mp4a", Some(360), Some(1000.0)),
                raw("137", "avc1", "none", Some(1080), Some(9000.0)),
            ],
        })));

        let catalog = service.fetch("https://youtu.be/abc").await.unwrap();
        assert_eq!(catalog.title, "Clip");
        assert_eq!(catalog.thumbnail, None);
        assert_eq!(catalog.formats.len(), 1);
        assert_eq!(catalog.formats[0].format_id, "18");

        let untitled = CatalogService::new(Arc::new(StaticExtractor(VideoInfo {
            title: None,
            thumbnail: None,
            formats: vec![raw("18", "avc1", "mp4a", Some(360), Some(1000.0))],
        })));
        assert_eq!(untitled.fetch("https://youtu.be/abc").await.unwrap().title, "No title");

        let empty = CatalogService::new(Arc::new(StaticExtractor(VideoInfo::default())));
        assert!(matches!(
            empty.fetch("https://youtu.be/abc").await,
            Err(CatalogError::EmptyMetadata)
        ));
    }
}
