// Downloader module - yt-dlp collaborator and the orchestration around it

pub mod backends;
pub mod diagnostics;
pub mod errors;
pub mod models;
pub mod options;
pub mod orchestrator;
pub mod tools;
pub mod traits;
pub mod utils;

pub use errors::DownloadError;
pub use models::{DownloadMode, DownloadProgress, DownloadRequest, MediaInfo, Outcome};
pub use options::DownloadConfig;
pub use orchestrator::Orchestrator;
pub use tools::{preflight, Capabilities, Launcher};
pub use traits::{MediaBackend, ProgressSink};
