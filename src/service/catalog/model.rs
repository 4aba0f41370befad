/// A downloadable rendition as offered to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatDescriptor {
    pub format_id: String,
    pub ext: String,
    pub quality: String,
    pub size_bytes: u64,
    pub size_label: String,
    pub audio_only: bool,
}

impl FormatDescriptor {
    /// Button text, e.g. `mp4 720p (12.3MB)`.
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.ext, self.quality, self.size_label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoCatalog {
    pub title: String,
    pub thumbnail: Option<String>,
    pub formats: Vec<FormatDescriptor>,
}
