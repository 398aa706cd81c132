// Error types for the yt-dlp collaborator

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    /// yt-dlp, python or ffmpeg not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// URL rejected by the extractor
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network timeout while talking to the site
    #[error("Network timeout: {0}")]
    NetworkTimeout(String),

    /// Site refused the request (429, bot detection, 403)
    #[error("Request blocked: {0}")]
    Blocked(String),

    /// Video removed, private or otherwise not available
    #[error("Video unavailable: {0}")]
    Unavailable(String),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    Parse(String),

    /// Command execution failed
    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Cannot create {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Unknown(String),
}

impl DownloadError {
    /// Classify the stderr of a failed yt-dlp run.
    pub fn from_stderr(stderr: &str) -> Self {
        let message = last_error_line(stderr);
        let lower = message.to_lowercase();

        if lower.contains("timed out") || lower.contains("timeout") {
            return Self::NetworkTimeout(message);
        }

        if lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("sign in to confirm you")
            || lower.contains("403")
        {
            return Self::Blocked(message);
        }

        if lower.contains("unsupported url") || lower.contains("is not a valid url") {
            return Self::InvalidUrl(message);
        }

        if lower.contains("video unavailable")
            || lower.contains("private video")
            || lower.contains("has been removed")
            || lower.contains("does not exist")
        {
            return Self::Unavailable(message);
        }

        if lower.contains("json") {
            return Self::Parse(message);
        }

        if message.is_empty() {
            return Self::Unknown("yt-dlp exited without an error message".to_string());
        }

        Self::Unknown(message)
    }
}

/// yt-dlp prints its fatal error as the last `ERROR:` line; fall back to the
/// last non-empty line.
fn last_error_line(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.trim_start_matches("ERROR:").trim().to_string())
        .unwrap_or_default()
}
