use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info, warn};

use crate::downloader::errors::DownloadError;
use crate::downloader::models::MediaInfo;
use crate::downloader::options::DownloadConfig;
use crate::downloader::tools::Launcher;
use crate::downloader::traits::{MediaBackend, ProgressSink};
use crate::downloader::utils::{parse_progress, run_output_with_timeout, spawn_error};

/// yt-dlp driven as a subprocess, either the binary or the Python module
pub struct YtDlpBackend {
    launcher: Launcher,
    info_timeout: Duration,
}

impl YtDlpBackend {
    pub fn new(launcher: Launcher, info_timeout: Duration) -> Self {
        Self {
            launcher,
            info_timeout,
        }
    }
}

#[async_trait]
impl MediaBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        match self.launcher {
            Launcher::Binary(_) => "yt-dlp",
            Launcher::PythonModule(_) => "yt-dlp-python",
        }
    }

    async fn extract_info(
        &self,
        url: &str,
        config: &DownloadConfig,
    ) -> Result<MediaInfo, DownloadError> {
        let (program, args) = self.launcher.command_line(&config.info_args(url));
        debug!(backend = self.name(), "Running: {} {}", program, args.join(" "));

        let output = run_output_with_timeout(&program, &args, self.info_timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "Metadata query failed");
            return Err(DownloadError::from_stderr(&stderr));
        }

        MediaInfo::from_json(&output.stdout)
    }

    async fn download(
        &self,
        url: &str,
        config: &DownloadConfig,
        progress: &mut (dyn ProgressSink + Send),
    ) -> Result<(), DownloadError> {
        let (program, args) = self.launcher.command_line(&config.download_args(url));
        info!(backend = self.name(), mode = %config.mode, "Starting download");
        debug!("Running: {} {}", program, args.join(" "));

        let mut child = TokioCommand::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(&program, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::Execution("Failed to capture stdout".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::Execution("Failed to capture stderr".to_string()))?;

        // Drain stdout to EOF; closing the pipe early would kill yt-dlp.
        let read_stdout = async move {
            let mut reader = BufReader::new(stdout);
            let mut raw = Vec::new();
            loop {
                raw.clear();
                match reader.read_until(b'\n', &mut raw).await {
                    Ok(0) => break,
                    Ok(_) => {
                        // Titles may arrive in the console code page, not UTF-8
                        let line = String::from_utf8_lossy(&raw);
                        let line = line.trim_end_matches(['\r', '\n']);
                        if let Some(update) = parse_progress(line) {
                            progress.emit(update);
                        }
                        debug!(target: "ymp3::yt_dlp", "{}", line);
                    }
                    Err(e) => {
                        warn!(error = %e, "Reading yt-dlp output failed");
                        break;
                    }
                }
            }
        };
        let read_stderr = async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        };
        let ((), stderr_output) = tokio::join!(read_stdout, read_stderr);

        let status = child
            .wait()
            .await
            .map_err(|e| DownloadError::Execution(format!("Process error: {}", e)))?;

        if status.success() {
            info!(backend = self.name(), "Download finished");
            Ok(())
        } else {
            let stderr_text = String::from_utf8_lossy(&stderr_output);
            warn!(%status, "yt-dlp download failed");
            Err(DownloadError::from_stderr(&stderr_text))
        }
    }
}
