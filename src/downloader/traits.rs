// Collaborator trait definitions

use async_trait::async_trait;

use super::errors::DownloadError;
use super::models::{DownloadProgress, MediaInfo};
use super::options::DownloadConfig;

/// The extraction/transcoding collaborator
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Fetch descriptive metadata without downloading anything
    async fn extract_info(&self, url: &str, config: &DownloadConfig)
        -> Result<MediaInfo, DownloadError>;

    /// Fetch and convert, writing files under the configured template
    async fn download(
        &self,
        url: &str,
        config: &DownloadConfig,
        progress: &mut (dyn ProgressSink + Send),
    ) -> Result<(), DownloadError>;
}

/// Receives progress updates while a download runs
pub trait ProgressSink {
    fn emit(&mut self, progress: DownloadProgress);
}
