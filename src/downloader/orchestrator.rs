// Orchestrator - metadata query, confirmation, then fetch-and-convert

use std::path::Path;

use tracing::{debug, info, warn};

use super::diagnostics::diagnose_error;
use super::errors::DownloadError;
use super::models::{
    DownloadMode, DownloadProgress, DownloadRequest, MediaInfo, Outcome, DEFAULT_DESTINATION,
};
use super::options::DownloadConfig;
use super::tools::Capabilities;
use super::traits::{MediaBackend, ProgressSink};
use crate::console::Console;

const AFFIRMATIVE: [&str; 5] = ["s", "si", "sí", "y", "yes"];

/// Only the affirmative set proceeds; blank and closed input cancel.
pub fn is_affirmative(answer: Option<&str>) -> bool {
    answer
        .map(|a| a.trim().to_lowercase())
        .map_or(false, |a| AFFIRMATIVE.contains(&a.as_str()))
}

pub struct Orchestrator {
    backend: Box<dyn MediaBackend>,
    capabilities: Capabilities,
}

impl Orchestrator {
    pub fn new(backend: Box<dyn MediaBackend>, capabilities: Capabilities) -> Self {
        Self {
            backend,
            capabilities,
        }
    }

    pub async fn execute(&self, request: &DownloadRequest, console: &mut dyn Console) -> Outcome {
        match request.mode {
            DownloadMode::Single => {
                self.download_single(&request.url, &request.destination, console)
                    .await
            }
            DownloadMode::Playlist => {
                self.download_playlist(&request.url, &request.destination, console)
                    .await
            }
        }
    }

    /// Download one video as MP3 into `destination`.
    pub async fn download_single(
        &self,
        url: &str,
        destination: &Path,
        console: &mut dyn Console,
    ) -> Outcome {
        let config = DownloadConfig::single(destination, &self.capabilities);
        self.run(url, destination, &config, console).await
    }

    /// Download every entry of a playlist, confirmed once as a whole.
    pub async fn download_playlist(
        &self,
        url: &str,
        destination: &Path,
        console: &mut dyn Console,
    ) -> Outcome {
        let config = DownloadConfig::playlist(destination, &self.capabilities);
        self.run(url, destination, &config, console).await
    }

    /// Single download into the default folder.
    pub async fn quick_download(&self, url: &str, console: &mut dyn Console) -> Outcome {
        self.download_single(url, Path::new(DEFAULT_DESTINATION), console)
            .await
    }

    async fn run(
        &self,
        url: &str,
        destination: &Path,
        config: &DownloadConfig,
        console: &mut dyn Console,
    ) -> Outcome {
        let text = Phrases::for_mode(config.mode);

        if let Err(source) = std::fs::create_dir_all(destination) {
            return fail(
                console,
                DownloadError::Io {
                    path: destination.to_path_buf(),
                    source,
                },
            );
        }

        console.say(text.fetching);
        let info = match self.backend.extract_info(url, config).await {
            Ok(info) => info,
            Err(e) => return fail(console, e),
        };
        debug!(?info, "Metadata received");

        let title = info.title_or(text.untitled);
        show_info(console, config.mode, &title, &info);

        let answer = console.ask(text.confirm);
        if !is_affirmative(answer.as_deref()) {
            console.say("Descarga cancelada.");
            info!(%url, "Download cancelled by user");
            return Outcome::Cancelled;
        }

        console.say("");
        console.say(text.starting);
        let mut progress = ConsoleProgress::new(console);
        if let Err(e) = self.backend.download(url, config, &mut progress).await {
            return fail(console, e);
        }

        console.say(&format!("✅ {}: {}", text.done, title));
        info!(%url, mode = %config.mode, "Download completed");
        Outcome::Completed
    }
}

fn show_info(console: &mut dyn Console, mode: DownloadMode, title: &str, info: &MediaInfo) {
    match mode {
        DownloadMode::Single => {
            console.say(&format!("Título: {}", title));
            console.say(&format!("Duración: {}", info.duration_label()));
            console.say(&format!("Calidad de audio: {}", info.bitrate_label()));
        }
        DownloadMode::Playlist => {
            console.say(&format!("Playlist: {}", title));
            console.say(&format!("Número de videos: {}", info.entries()));
        }
    }
}

fn fail(console: &mut dyn Console, error: DownloadError) -> Outcome {
    warn!(error = %error, "Download failed");
    console.say(&format!("❌ Error durante la descarga: {}", error));

    if let Some(reason) = diagnose_error(&error.to_string()) {
        debug!(?reason, permanent = reason.is_permanent(), "Diagnosed failure");
        console.say(&format!("💡 {}", reason.hint()));
    }

    Outcome::Failed(error)
}

struct Phrases {
    fetching: &'static str,
    untitled: &'static str,
    confirm: &'static str,
    starting: &'static str,
    done: &'static str,
}

impl Phrases {
    fn for_mode(mode: DownloadMode) -> Self {
        match mode {
            DownloadMode::Single => Self {
                fetching: "Obteniendo información del video...",
                untitled: "Sin título",
                confirm: "\n¿Desea continuar con la descarga? (s/n): ",
                starting: "Iniciando descarga y conversión...",
                done: "Descarga completada",
            },
            DownloadMode::Playlist => Self {
                fetching: "Obteniendo información de la playlist...",
                untitled: "Playlist sin nombre",
                confirm: "\n¿Desea descargar toda la playlist? (s/n): ",
                starting: "Descargando playlist...",
                done: "Playlist completada",
            },
        }
    }
}

/// Echoes stage changes and every 25% of the running file
struct ConsoleProgress<'a> {
    console: &'a mut dyn Console,
    next_step: f32,
}

impl<'a> ConsoleProgress<'a> {
    const STEP: f32 = 25.0;

    fn new(console: &'a mut dyn Console) -> Self {
        Self {
            console,
            next_step: Self::STEP,
        }
    }
}

impl ProgressSink for ConsoleProgress<'_> {
    fn emit(&mut self, progress: DownloadProgress) {
        match progress.percent {
            Some(percent) if percent >= self.next_step => {
                self.console.say(&format!("   {}", progress.status));
                self.next_step = ((percent / Self::STEP).floor() + 1.0) * Self::STEP;
            }
            Some(_) => {}
            None => {
                self.console.say(&format!("   {}", progress.status));
                self.next_step = Self::STEP;
            }
        }
    }
}
