use std::path::PathBuf;

use serde::Deserialize;

/// Metadata returned by the extractor for a single video.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

/// One rendition as reported by the extractor, before filtering.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawFormat {
    #[serde(default)]
    pub format_id: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub abr: Option<f64>,
    #[serde(default)]
    pub filesize: Option<f64>,
    #[serde(default)]
    pub filesize_approx: Option<f64>,
}

impl RawFormat {
    /// Only the literal `"none"` marks a missing track; an absent codec is unknown, not missing.
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some("none")
    }

    /// Exact size when known, otherwise the estimate. Zero counts as unknown.
    pub fn size_bytes(&self) -> Option<u64> {
        self.filesize
            .filter(|size| *size > 0.0)
            .or(self.filesize_approx.filter(|size| *size > 0.0))
            .map(|size| size.round() as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Document,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl DownloadedFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
