// Helper functions for the yt-dlp backend

use std::process::Stdio;
use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use super::errors::DownloadError;
use super::models::DownloadProgress;

lazy_static! {
    // [download]  12.5% of ~ 3.04MiB at  374.36KiB/s ETA 00:07
    static ref PROGRESS_RE: Regex = Regex::new(
        r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)(?:\s+at\s+(\S+))?(?:\s+ETA\s+(\S+))?"
    ).unwrap();
    static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
    static ref EXTRACT_RE: Regex = Regex::new(r"\[ExtractAudio\]\s+Destination:\s+(.+)").unwrap();
    static ref ITEM_RE: Regex = Regex::new(r"\[download\]\s+Downloading item (\d+) of (\d+)").unwrap();
    static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").unwrap();
}

/// Run a command to completion, killing it after `limit`.
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    limit: Duration,
) -> Result<std::process::Output, DownloadError> {
    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(program, e))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::Execution(format!("Failed to capture stdout from {}", program)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::Execution(format!("Failed to capture stderr from {}", program)))?;

    let run = async {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        // Both pipes are drained together so a chatty stderr cannot block stdout.
        let (out_res, err_res) = tokio::join!(
            stdout_pipe.read_to_end(&mut stdout),
            stderr_pipe.read_to_end(&mut stderr)
        );
        out_res.map_err(|e| DownloadError::Execution(format!("Failed to read stdout: {}", e)))?;
        err_res.map_err(|e| DownloadError::Execution(format!("Failed to read stderr: {}", e)))?;
        let status = child
            .wait()
            .await
            .map_err(|e| DownloadError::Execution(format!("Failed to wait for {}: {}", program, e)))?;
        Ok::<_, DownloadError>(std::process::Output { status, stdout, stderr })
    };

    match timeout(limit, run).await {
        Ok(result) => result,
        Err(_) => Err(DownloadError::NetworkTimeout(format!(
            "Timed out after {}s",
            limit.as_secs()
        ))),
    }
}

pub fn spawn_error(program: &str, e: std::io::Error) -> DownloadError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DownloadError::ToolNotFound(program.to_string())
    } else {
        DownloadError::Execution(format!("Failed to start {}: {}", program, e))
    }
}

/// Parse one `--newline` output line of yt-dlp.
pub fn parse_progress(line: &str) -> Option<DownloadProgress> {
    if let Some(caps) = PROGRESS_RE.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        let size = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
        let status = match (caps.get(3), caps.get(4)) {
            (Some(speed), Some(eta)) => format!(
                "{:.1}% de {} a {} ETA {}",
                percent,
                size,
                speed.as_str(),
                eta.as_str()
            ),
            (Some(speed), None) => format!("{:.1}% de {} a {}", percent, size, speed.as_str()),
            _ => format!("{:.1}% de {}", percent, size),
        };
        return Some(DownloadProgress {
            percent: Some(percent),
            status,
        });
    }

    if let Some(caps) = DEST_RE.captures(line) {
        return Some(DownloadProgress {
            percent: None,
            status: format!("Descargando: {}", short_name(caps.get(1)?.as_str())),
        });
    }

    if let Some(caps) = EXTRACT_RE.captures(line) {
        return Some(DownloadProgress {
            percent: None,
            status: format!("Convirtiendo: {}", short_name(caps.get(1)?.as_str())),
        });
    }

    if let Some(caps) = ITEM_RE.captures(line) {
        return Some(DownloadProgress {
            percent: None,
            status: format!("Elemento {} de {}", caps.get(1)?.as_str(), caps.get(2)?.as_str()),
        });
    }

    if ALREADY_RE.is_match(line) {
        return Some(DownloadProgress {
            percent: None,
            status: "Archivo ya descargado".to_string(),
        });
    }

    None
}

fn short_name(path: &str) -> String {
    let name = path.trim().rsplit(['/', '\\']).next().unwrap_or(path);
    name.chars().take(60).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_line() {
        let p = parse_progress("[download]  42.0% of    3.20MiB at    1.00MiB/s ETA 00:02").unwrap();
        assert_eq!(p.percent, Some(42.0));
        assert_eq!(p.status, "42.0% de 3.20MiB a 1.00MiB/s ETA 00:02");
    }

    #[test]
    fn test_finished_line() {
        let p = parse_progress("[download] 100% of    3.20MiB in 00:00:03 at 1.00MiB/s").unwrap();
        assert_eq!(p.percent, Some(100.0));
    }

    #[test]
    fn test_destination_line() {
        let p = parse_progress("[download] Destination: ./descargas/Song.webm").unwrap();
        assert_eq!(p.status, "Descargando: Song.webm");
    }

    #[test]
    fn test_extract_audio_line() {
        let p = parse_progress("[ExtractAudio] Destination: ./descargas/Song.mp3").unwrap();
        assert_eq!(p.status, "Convirtiendo: Song.mp3");
    }

    #[test]
    fn test_playlist_item_line() {
        let p = parse_progress("[download] Downloading item 2 of 7").unwrap();
        assert_eq!(p.status, "Elemento 2 de 7");
    }

    #[test]
    fn test_unrelated_line() {
        assert!(parse_progress("[youtube] abc: Downloading webpage").is_none());
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = run_output_with_timeout("/nonexistent/yt-dlp", &[], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::ToolNotFound(_)));
    }
}
