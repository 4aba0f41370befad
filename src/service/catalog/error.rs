use crate::platform::PlatformError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("extraction failed: {0}")]
    Extraction(#[from] PlatformError),
    #[error("extractor returned no usable metadata")]
    EmptyMetadata,
}
