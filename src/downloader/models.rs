// Common data models for the downloader

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use super::errors::DownloadError;

/// Destination used when the user leaves the folder prompt blank
pub const DEFAULT_DESTINATION: &str = "./descargas";

/// Whether a URL is fetched as one video or as a whole playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    Single,
    Playlist,
}

impl fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Playlist => write!(f, "playlist"),
        }
    }
}

/// One unit of work collected from the menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub destination: PathBuf,
    pub mode: DownloadMode,
}

impl DownloadRequest {
    /// Build a request from raw prompt answers. A blank folder falls back to
    /// [`DEFAULT_DESTINATION`]; anything else is taken literally.
    pub fn from_input(url: &str, folder: &str, mode: DownloadMode) -> Self {
        Self {
            url: url.trim().to_string(),
            destination: resolve_destination(folder),
            mode,
        }
    }
}

pub fn resolve_destination(folder: &str) -> PathBuf {
    let folder = folder.trim();
    if folder.is_empty() {
        PathBuf::from(DEFAULT_DESTINATION)
    } else {
        PathBuf::from(folder)
    }
}

/// Metadata returned by the metadata-only query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub duration_seconds: Option<u64>,
    /// Average audio bitrate in kbps
    pub abr: Option<f64>,
    /// Number of entries (playlists only)
    pub entry_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    title: Option<String>,
    duration: Option<f64>,
    abr: Option<f64>,
    entries: Option<Vec<serde_json::Value>>,
}

impl MediaInfo {
    /// Parse `--dump-single-json` output
    pub fn from_json(stdout: &[u8]) -> Result<Self, DownloadError> {
        let raw: RawInfo = serde_json::from_slice(stdout)
            .map_err(|e| DownloadError::Parse(format!("Invalid JSON: {}", e)))?;

        Ok(Self {
            title: raw.title.filter(|t| !t.trim().is_empty()),
            duration_seconds: raw.duration.filter(|d| *d >= 0.0).map(|d| d as u64),
            abr: raw.abr,
            entry_count: raw.entries.map(|e| e.len()),
        })
    }

    pub fn title_or(&self, placeholder: &str) -> String {
        self.title.clone().unwrap_or_else(|| placeholder.to_string())
    }

    /// `m:ss`, with a missing duration shown as `0:00`
    pub fn duration_label(&self) -> String {
        let total = self.duration_seconds.unwrap_or(0);
        format!("{}:{:02}", total / 60, total % 60)
    }

    pub fn bitrate_label(&self) -> String {
        match self.abr {
            Some(abr) if abr.fract() == 0.0 => format!("{} kbps", abr as u64),
            Some(abr) => format!("{:.1} kbps", abr),
            None => "N/A kbps".to_string(),
        }
    }

    pub fn entries(&self) -> usize {
        self.entry_count.unwrap_or(0)
    }
}

/// Download progress parsed from yt-dlp output
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    /// Set for `[download] NN%` lines, `None` for stage changes
    pub percent: Option<f32>,
    pub status: String,
}

/// Result of a single download operation
#[derive(Debug)]
pub enum Outcome {
    Completed,
    /// User declined the confirmation prompt
    Cancelled,
    Failed(DownloadError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_folder_uses_default() {
        let req = DownloadRequest::from_input(" https://x ", "   ", DownloadMode::Single);
        assert_eq!(req.url, "https://x");
        assert_eq!(req.destination, PathBuf::from("./descargas"));
    }

    #[test]
    fn test_explicit_folder_is_literal() {
        let req = DownloadRequest::from_input("u", "music/rock", DownloadMode::Playlist);
        assert_eq!(req.destination, PathBuf::from("music/rock"));
        assert_eq!(req.mode, DownloadMode::Playlist);
    }

    #[test]
    fn test_parse_single_video() {
        let json = br#"{"title": "Song", "duration": 185.0, "abr": 129.5, "formats": []}"#;
        let info = MediaInfo::from_json(json).unwrap();
        assert_eq!(info.title_or("Sin título"), "Song");
        assert_eq!(info.duration_label(), "3:05");
        assert_eq!(info.bitrate_label(), "129.5 kbps");
        assert_eq!(info.entry_count, None);
    }

    #[test]
    fn test_parse_playlist() {
        let json = br#"{"title": "Mix", "entries": [{"id": "a"}, {"id": "b"}, {"id": "c"}]}"#;
        let info = MediaInfo::from_json(json).unwrap();
        assert_eq!(info.entries(), 3);
    }

    #[test]
    fn test_missing_fields_render_placeholders() {
        let info = MediaInfo::from_json(br#"{"title": null}"#).unwrap();
        assert_eq!(info.title_or("Sin título"), "Sin título");
        assert_eq!(info.duration_label(), "0:00");
        assert_eq!(info.bitrate_label(), "N/A kbps");
        assert_eq!(info.entries(), 0);
    }

    #[test]
    fn test_invalid_json() {
        let err = MediaInfo::from_json(b"not json").unwrap_err();
        assert!(matches!(err, DownloadError::Parse(_)));
    }

    #[test]
    fn test_outcome_success_flag() {
        assert!(Outcome::Completed.is_success());
        assert!(!Outcome::Cancelled.is_success());
        assert!(!Outcome::Failed(DownloadError::Unknown("x".into())).is_success());
    }
}
