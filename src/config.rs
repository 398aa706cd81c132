//! Runtime settings read from the environment once at start-up.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

const DEFAULT_INFO_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `YMP3_YTDLP`: explicit yt-dlp executable
    pub ytdlp_program: Option<PathBuf>,
    /// `YTDLP_PYTHON`: interpreter used for `python -m yt_dlp`
    pub python: String,
    /// `YMP3_FFMPEG`: explicit ffmpeg executable
    pub ffmpeg_program: Option<PathBuf>,
    /// `YMP3_INFO_TIMEOUT`: bound on the metadata-only query
    pub info_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ytdlp_program: None,
            python: "python3".to_string(),
            ffmpeg_program: None,
            info_timeout: Duration::from_secs(DEFAULT_INFO_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();

        let info_timeout = match get("YMP3_INFO_TIMEOUT") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(value = %raw, "Ignoring invalid YMP3_INFO_TIMEOUT");
                    defaults.info_timeout
                }
            },
            None => defaults.info_timeout,
        };

        Self {
            ytdlp_program: get("YMP3_YTDLP").map(PathBuf::from),
            python: get("YTDLP_PYTHON").unwrap_or(defaults.python),
            ffmpeg_program: get("YMP3_FFMPEG").map(PathBuf::from),
            info_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Settings {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(settings_from(&[]), Settings::default());
    }

    #[test]
    fn test_overrides() {
        let settings = settings_from(&[
            ("YMP3_YTDLP", "/opt/yt-dlp"),
            ("YTDLP_PYTHON", "/venv/bin/python"),
            ("YMP3_FFMPEG", "/opt/ffmpeg"),
            ("YMP3_INFO_TIMEOUT", "30"),
        ]);
        assert_eq!(settings.ytdlp_program, Some(PathBuf::from("/opt/yt-dlp")));
        assert_eq!(settings.python, "/venv/bin/python");
        assert_eq!(settings.ffmpeg_program, Some(PathBuf::from("/opt/ffmpeg")));
        assert_eq!(settings.info_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        let settings = settings_from(&[("YMP3_INFO_TIMEOUT", "soon"), ("YTDLP_PYTHON", "  ")]);
        assert_eq!(settings.info_timeout, Duration::from_secs(120));
        assert_eq!(settings.python, "python3");
    }
}
