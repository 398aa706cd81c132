// DownloadConfig - the fixed MP3 policy handed to yt-dlp
//
// One config is built per request and rendered to yt-dlp arguments:
// - `format`             -> -f
// - `outtmpl`            -> -o
// - ExtractAudio step    -> -x --audio-format --audio-quality
// - postprocessor args   -> --postprocessor-args "ExtractAudio:..."
// - prefer_ffmpeg        -> --ffmpeg-location (when ffmpeg was found)
// - keepvideo            -> -k

use std::path::{Path, PathBuf};

use super::models::DownloadMode;
use super::tools::Capabilities;

pub const AUDIO_FORMAT: &str = "bestaudio/best";
pub const AUDIO_CODEC: &str = "mp3";
pub const AUDIO_QUALITY_KBPS: u32 = 192;
pub const SAMPLE_RATE_HZ: u32 = 44100;

const SINGLE_TEMPLATE: &str = "%(title)s.%(ext)s";
const PLAYLIST_TEMPLATE: &str = "%(playlist_index)s - %(title)s.%(ext)s";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostprocessorKind {
    ExtractAudio,
}

impl PostprocessorKind {
    /// Name yt-dlp uses in `--postprocessor-args NAME:ARGS`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractAudio => "ExtractAudio",
        }
    }
}

/// A transcoding step attached to a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Postprocessor {
    pub kind: PostprocessorKind,
    pub codec: String,
    /// Target bitrate in kbps
    pub quality: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    pub mode: DownloadMode,
    pub format: String,
    pub outtmpl: String,
    pub postprocessors: Vec<Postprocessor>,
    pub postprocessor_args: Vec<String>,
    pub prefer_ffmpeg: bool,
    pub ffmpeg_location: Option<PathBuf>,
    pub keepvideo: bool,
}

impl DownloadConfig {
    /// Best audio, MP3 at 192 kbps, resampled to 44.1 kHz, named by title.
    pub fn single(destination: &Path, caps: &Capabilities) -> Self {
        let mut config = Self::base(DownloadMode::Single, destination, SINGLE_TEMPLATE, caps);
        if caps.can_transcode() {
            config.postprocessor_args = vec!["-ar".to_string(), SAMPLE_RATE_HZ.to_string()];
        }
        config
    }

    /// Same policy without resampling; files are prefixed by their 1-based
    /// playlist position.
    pub fn playlist(destination: &Path, caps: &Capabilities) -> Self {
        Self::base(DownloadMode::Playlist, destination, PLAYLIST_TEMPLATE, caps)
    }

    fn base(mode: DownloadMode, destination: &Path, template: &str, caps: &Capabilities) -> Self {
        // Without ffmpeg the best audio stream is kept in its native container.
        let postprocessors = if caps.can_transcode() {
            vec![Postprocessor {
                kind: PostprocessorKind::ExtractAudio,
                codec: AUDIO_CODEC.to_string(),
                quality: AUDIO_QUALITY_KBPS,
            }]
        } else {
            Vec::new()
        };

        Self {
            mode,
            format: AUDIO_FORMAT.to_string(),
            outtmpl: destination.join(template).to_string_lossy().to_string(),
            postprocessors,
            postprocessor_args: Vec::new(),
            prefer_ffmpeg: true,
            ffmpeg_location: caps.ffmpeg.clone(),
            keepvideo: false,
        }
    }

    fn playlist_flag(&self) -> &'static str {
        match self.mode {
            DownloadMode::Single => "--no-playlist",
            DownloadMode::Playlist => "--yes-playlist",
        }
    }

    /// Arguments for the metadata-only query
    pub fn info_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--no-warnings".to_string(),
            self.playlist_flag().to_string(),
        ];
        if self.mode == DownloadMode::Playlist {
            args.push("--flat-playlist".to_string());
        }
        args.push(url.to_string());
        args
    }

    /// Arguments for the fetch-and-convert run
    pub fn download_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.format.clone(),
            "-o".to_string(),
            self.outtmpl.clone(),
            self.playlist_flag().to_string(),
            "--newline".to_string(),
            "--no-warnings".to_string(),
        ];

        for pp in &self.postprocessors {
            match pp.kind {
                PostprocessorKind::ExtractAudio => {
                    args.push("-x".to_string());
                    args.push("--audio-format".to_string());
                    args.push(pp.codec.clone());
                    args.push("--audio-quality".to_string());
                    args.push(format!("{}K", pp.quality));
                }
            }
        }

        if !self.postprocessor_args.is_empty() {
            if let Some(pp) = self.postprocessors.first() {
                args.push("--postprocessor-args".to_string());
                args.push(format!(
                    "{}:{}",
                    pp.kind.as_str(),
                    self.postprocessor_args.join(" ")
                ));
            }
        }

        if self.prefer_ffmpeg {
            if let Some(path) = &self.ffmpeg_location {
                args.push("--ffmpeg-location".to_string());
                args.push(path.to_string_lossy().to_string());
            }
        }

        if self.keepvideo {
            args.push("-k".to_string());
        }

        args.push(url.to_string());
        args
    }
}
