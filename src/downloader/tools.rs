use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use super::errors::DownloadError;
use crate::config::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }

    fn version_arg(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "--version",
            ToolType::Ffmpeg => "-version", // ffmpeg uses a single dash
        }
    }
}

/// How yt-dlp gets started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    /// Native `yt-dlp` executable
    Binary(PathBuf),
    /// `<python> -m yt_dlp`
    PythonModule(String),
}

impl Launcher {
    pub fn program(&self) -> String {
        match self {
            Launcher::Binary(path) => path.to_string_lossy().to_string(),
            Launcher::PythonModule(python) => python.clone(),
        }
    }

    /// Arguments that go before any yt-dlp option
    pub fn prefix_args(&self) -> Vec<String> {
        match self {
            Launcher::Binary(_) => Vec::new(),
            Launcher::PythonModule(_) => vec!["-m".to_string(), "yt_dlp".to_string()],
        }
    }

    pub fn command_line(&self, args: &[String]) -> (String, Vec<String>) {
        let mut full = self.prefix_args();
        full.extend(args.iter().cloned());
        (self.program(), full)
    }
}

/// Outcome of the start-up check, handed to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub ytdlp: Launcher,
    /// `None` when ffmpeg is missing: downloads skip MP3 conversion
    pub ffmpeg: Option<PathBuf>,
}

impl Capabilities {
    pub fn can_transcode(&self) -> bool {
        self.ffmpeg.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

pub struct ToolManager<'a> {
    settings: &'a Settings,
}

impl<'a> ToolManager<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Explicit override first, then the Python module, then the binary.
    pub fn locate_ytdlp(&self) -> Option<Launcher> {
        if let Some(explicit) = &self.settings.ytdlp_program {
            if get_version(explicit, ToolType::YtDlp).is_some() {
                return Some(Launcher::Binary(explicit.clone()));
            }
            warn!(path = %explicit.display(), "Configured yt-dlp does not run, searching elsewhere");
        }

        if python_has_module(&self.settings.python, "yt_dlp") {
            debug!(python = %self.settings.python, "Using yt_dlp Python module");
            return Some(Launcher::PythonModule(self.settings.python.clone()));
        }

        let info = self.get_tool_info(ToolType::YtDlp);
        info.path.filter(|_| info.version.is_some()).map(Launcher::Binary)
    }

    /// Probe ffmpeg by running it with `-version`.
    pub fn locate_ffmpeg(&self) -> Option<PathBuf> {
        if let Some(explicit) = &self.settings.ffmpeg_program {
            if get_version(explicit, ToolType::Ffmpeg).is_some() {
                return Some(explicit.clone());
            }
            warn!(path = %explicit.display(), "Configured ffmpeg does not run, searching elsewhere");
        }

        let info = self.get_tool_info(ToolType::Ffmpeg);
        info.path.filter(|_| info.version.is_some())
    }

    pub fn get_tool_info(&self, tool_type: ToolType) -> ToolInfo {
        let path = detect_binary(tool_type.as_str());
        let version = path.as_deref().and_then(|p| get_version(p, tool_type));

        ToolInfo { version, path }
    }
}

/// Run the start-up capability check once.
///
/// A missing yt-dlp is fatal; a missing ffmpeg only disables conversion.
pub fn preflight(settings: &Settings) -> Result<Capabilities, DownloadError> {
    let manager = ToolManager::new(settings);

    let ytdlp = manager.locate_ytdlp().ok_or_else(|| {
        DownloadError::ToolNotFound("neither the yt_dlp module nor the yt-dlp binary".to_string())
    })?;
    info!(launcher = ?ytdlp, "yt-dlp located");

    let ffmpeg = manager.locate_ffmpeg();
    match &ffmpeg {
        Some(path) => info!(path = %path.display(), "ffmpeg located"),
        None => warn!("ffmpeg not found, MP3 conversion disabled"),
    }

    Ok(Capabilities { ytdlp, ffmpeg })
}

fn detect_binary(binary_name: &str) -> Option<PathBuf> {
    // 1. Try common paths first
    let common_paths = [
        format!("/opt/homebrew/bin/{}", binary_name),
        format!("/usr/local/bin/{}", binary_name),
        format!("/usr/bin/{}", binary_name),
    ];

    for path in common_paths {
        if Path::new(&path).exists() {
            return Some(PathBuf::from(path));
        }
    }

    // 2. Try PATH
    if let Ok(output) = Command::new("which").arg(binary_name).output() {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
    }

    None
}

fn get_version(path: &Path, tool_type: ToolType) -> Option<String> {
    match Command::new(path)
        .arg(tool_type.version_arg())
        .stderr(Stdio::null())
        .output()
    {
        Ok(output) if output.status.success() => {
            let out = String::from_utf8_lossy(&output.stdout);
            // ffmpeg prints a whole banner; the first line carries the version
            let version = out.lines().next().unwrap_or("").trim().to_string();
            debug!(tool = tool_type.as_str(), %version, "Version probe succeeded");
            Some(version)
        }
        Ok(output) => {
            debug!(tool = tool_type.as_str(), status = %output.status, "Version probe failed");
            None
        }
        Err(e) => {
            debug!(tool = tool_type.as_str(), error = %e, "Version probe could not start");
            None
        }
    }
}

fn python_has_module(python: &str, module: &str) -> bool {
    let code = format!("import {}", module);
    match Command::new(python)
        .args(["-c", &code])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) => status.success(),
        Err(_) => false,
    }
}
