//! Interactive menu loop.
//!
//! `MainMenu -> CollectSingle | CollectPlaylist -> MainMenu`, until `Exit`.
//! Each call to [`Menu::step`] handles one state and returns the next.

use tracing::debug;

use crate::console::Console;
use crate::downloader::models::{DownloadMode, DownloadRequest, DEFAULT_DESTINATION};
use crate::downloader::Orchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    MainMenu,
    CollectSingle,
    CollectPlaylist,
    Exit,
}

pub struct Menu<'a> {
    orchestrator: &'a Orchestrator,
}

impl<'a> Menu<'a> {
    pub fn new(orchestrator: &'a Orchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn banner(console: &mut dyn Console) {
        console.say("🎵 Descargador de YouTube a MP3");
        console.say(&"=".repeat(40));
    }

    /// Drive the loop until the user exits or input is closed.
    pub async fn run(&self, console: &mut dyn Console) {
        let mut state = MenuState::MainMenu;
        while state != MenuState::Exit {
            state = self.step(state, console).await;
        }
        console.say("¡Hasta luego! 👋");
    }

    pub async fn step(&self, state: MenuState, console: &mut dyn Console) -> MenuState {
        debug!(?state, "Menu step");
        match state {
            MenuState::MainMenu => main_menu(console),
            MenuState::CollectSingle => self.collect(DownloadMode::Single, console).await,
            MenuState::CollectPlaylist => self.collect(DownloadMode::Playlist, console).await,
            MenuState::Exit => MenuState::Exit,
        }
    }

    async fn collect(&self, mode: DownloadMode, console: &mut dyn Console) -> MenuState {
        let url_prompt = match mode {
            DownloadMode::Single => "\nIngrese la URL del video de YouTube: ",
            DownloadMode::Playlist => "\nIngrese la URL de la playlist de YouTube: ",
        };

        let url = match console.ask(url_prompt) {
            Some(url) => url.trim().to_string(),
            None => return MenuState::Exit,
        };
        // A blank URL goes back to the main menu rather than asking again.
        if url.is_empty() {
            console.say("URL no válida.");
            return MenuState::MainMenu;
        }

        let folder_prompt = format!("Carpeta de destino (Enter para '{}'): ", DEFAULT_DESTINATION);
        let folder = match console.ask(&folder_prompt) {
            Some(folder) => folder,
            None => return MenuState::Exit,
        };

        let request = DownloadRequest::from_input(&url, &folder, mode);
        let outcome = self.orchestrator.execute(&request, console).await;
        debug!(success = outcome.is_success(), "Request finished");

        MenuState::MainMenu
    }
}

fn main_menu(console: &mut dyn Console) -> MenuState {
    console.say("\nOpciones:");
    console.say("1. Descargar un video");
    console.say("2. Descargar una playlist");
    console.say("3. Salir");

    let Some(choice) = console.ask("\nSeleccione una opción (1-3): ") else {
        return MenuState::Exit;
    };

    match choice.trim() {
        "1" => MenuState::CollectSingle,
        "2" => MenuState::CollectPlaylist,
        "3" => MenuState::Exit,
        _ => {
            console.say("Opción no válida. Seleccione 1, 2 o 3.");
            MenuState::MainMenu
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use crate::downloader::orchestrator::tests::{caps, FakeBackend, ScratchCwd};
    use std::path::PathBuf;

    const SONG: &str = r#"{"title": "Song", "duration": 60}"#;

    fn orchestrator(backend: FakeBackend) -> Orchestrator {
        Orchestrator::new(Box::new(backend), caps())
    }

    #[tokio::test]
    async fn test_invalid_option_redisplays_menu() {
        let backend = FakeBackend::new(SONG);
        let calls = backend.calls.clone();
        let orch = orchestrator(backend);
        let mut console = ScriptedConsole::new(["4", "3"]);

        Menu::new(&orch).run(&mut console).await;

        assert!(console.contains("Opción no válida. Seleccione 1, 2 o 3."));
        assert_eq!(console.count("3. Salir"), 2);
        assert!(console.contains("¡Hasta luego! 👋"));
        assert!(calls.lock().unwrap().info.is_empty());
    }

    #[tokio::test]
    async fn test_step_transitions() {
        let orch = orchestrator(FakeBackend::new(SONG));
        let menu = Menu::new(&orch);

        for (input, expected) in [
            ("1", MenuState::CollectSingle),
            (" 2 ", MenuState::CollectPlaylist),
            ("3", MenuState::Exit),
            ("", MenuState::MainMenu),
            ("x", MenuState::MainMenu),
        ] {
            let mut console = ScriptedConsole::new([input]);
            assert_eq!(menu.step(MenuState::MainMenu, &mut console).await, expected, "{input:?}");
        }
    }

    #[tokio::test]
    async fn test_blank_url_returns_to_main_menu() {
        let backend = FakeBackend::new(SONG);
        let calls = backend.calls.clone();
        let orch = orchestrator(backend);
        let menu = Menu::new(&orch);
        let mut console = ScriptedConsole::new(["   ", "unused"]);

        let next = menu.step(MenuState::CollectSingle, &mut console).await;

        assert_eq!(next, MenuState::MainMenu);
        assert!(console.contains("URL no válida."));
        assert_eq!(console.remaining(), 1);
        assert!(calls.lock().unwrap().info.is_empty());
    }

    #[tokio::test]
    async fn test_single_flow_with_explicit_folder() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("music").join("rock");
        let backend = FakeBackend::new(SONG);
        let calls = backend.calls.clone();
        let orch = orchestrator(backend);
        let mut console = ScriptedConsole::new([
            "1",
            "https://example.com/watch?v=abc",
            dest.to_str().unwrap(),
            "s",
            "3",
        ]);

        Menu::new(&orch).run(&mut console).await;

        assert!(dest.is_dir());
        let calls = calls.lock().unwrap();
        assert_eq!(calls.downloads.len(), 1);
        assert_eq!(
            PathBuf::from(&calls.downloads[0].1.outtmpl),
            dest.join("%(title)s.%(ext)s")
        );
        assert!(console.contains("✅ Descarga completada: Song"));
    }

    #[tokio::test]
    async fn test_blank_folder_downloads_into_default() {
        let scratch = ScratchCwd::enter();
        let backend = FakeBackend::new(SONG);
        let calls = backend.calls.clone();
        let orch = orchestrator(backend);
        let mut console = ScriptedConsole::new([
            "1",
            "https://example.com/watch?v=abc",
            "",
            "s",
            "3",
        ]);

        Menu::new(&orch).run(&mut console).await;

        assert!(scratch.path().join("descargas").is_dir());
        let calls = calls.lock().unwrap();
        assert_eq!(calls.downloads.len(), 1);
        assert!(calls.downloads[0].1.outtmpl.starts_with("./descargas/"));
        assert!(console.contains("✅ Descarga completada: Song"));
    }

    #[tokio::test]
    async fn test_playlist_flow_declined() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FakeBackend::new(r#"{"title": "Mix", "entries": []}"#);
        let calls = backend.calls.clone();
        let orch = orchestrator(backend);
        let mut console = ScriptedConsole::new([
            "2",
            "https://example.com/playlist?list=xyz",
            dir.path().to_str().unwrap(),
            "no",
            "3",
        ]);

        Menu::new(&orch).run(&mut console).await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.info.len(), 1);
        assert_eq!(calls.info[0].1.mode, DownloadMode::Playlist);
        assert!(calls.downloads.is_empty());
        assert!(console.contains("Descarga cancelada."));
        assert!(console.contains("¡Hasta luego! 👋"));
    }

    #[tokio::test]
    async fn test_metadata_failure_keeps_loop_running() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(FakeBackend::failing_info("ERROR: Unsupported URL: nope"));
        let mut console = ScriptedConsole::new(["1", "nope", dir.path().to_str().unwrap(), "3"]);

        Menu::new(&orch).run(&mut console).await;

        assert!(console.contains("❌ Error durante la descarga: Invalid URL: Unsupported URL: nope"));
        assert_eq!(console.count("3. Salir"), 2);
        assert!(console.contains("¡Hasta luego! 👋"));
    }

    #[tokio::test]
    async fn test_closed_input_exits() {
        let orch = orchestrator(FakeBackend::new(SONG));
        let mut console = ScriptedConsole::new(["1"]);

        Menu::new(&orch).run(&mut console).await;

        assert!(console.contains("¡Hasta luego! 👋"));
    }

    #[test]
    fn test_banner() {
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        Menu::banner(&mut console);
        assert_eq!(console.transcript()[1], "=".repeat(40));
    }
}
