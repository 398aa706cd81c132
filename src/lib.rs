pub mod config;
pub mod console;
pub mod downloader;
pub mod menu;

use std::process::ExitCode;

use config::Settings;
use console::{Console, StdConsole};
use downloader::backends::YtDlpBackend;
use downloader::{preflight, Capabilities, DownloadError, Orchestrator};
use menu::Menu;

/// Print the start-up check the way the user sees it. `false` means the
/// process must stop.
pub fn report_preflight(
    result: &Result<Capabilities, DownloadError>,
    console: &mut dyn Console,
) -> bool {
    match result {
        Ok(caps) => {
            console.say("✅ yt-dlp encontrado");
            if caps.can_transcode() {
                console.say("✅ FFmpeg encontrado");
            } else {
                console.say("⚠️  Advertencia: FFmpeg no encontrado");
                console.say("   Instálalo desde: https://ffmpeg.org/download.html");
                console.say("   El programa funcionará pero sin conversión a MP3");
            }
            true
        }
        Err(_) => {
            console.say("❌ Error: yt-dlp no está instalado");
            console.say("Instálalo con: pip install yt-dlp");
            false
        }
    }
}

/// With a URL argument, download it into the default folder and exit;
/// otherwise run the interactive menu.
pub async fn run(quick_url: Option<String>) -> ExitCode {
    let settings = Settings::from_env();
    let mut console = StdConsole::new();

    let checked = preflight(&settings);
    let proceed = report_preflight(&checked, &mut console);
    let caps = match checked {
        Ok(caps) if proceed => caps,
        _ => return ExitCode::FAILURE,
    };

    let backend = YtDlpBackend::new(caps.ytdlp.clone(), settings.info_timeout);
    let orchestrator = Orchestrator::new(Box::new(backend), caps);

    if let Some(url) = quick_url {
        let outcome = orchestrator.quick_download(&url, &mut console).await;
        return if outcome.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    Menu::banner(&mut console);
    Menu::new(&orchestrator).run(&mut console).await;

    ExitCode::SUCCESS
}
