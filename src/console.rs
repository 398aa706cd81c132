//! Line-oriented user interaction.

use std::io::{self, BufRead, Write};

use tracing::warn;

/// Where the menu reads answers from and writes messages to
pub trait Console: Send {
    /// Print one line
    fn say(&mut self, line: &str);

    /// Show `prompt` and read one answer. `None` means input is closed.
    fn ask(&mut self, prompt: &str) -> Option<String>;
}

/// stdin/stdout console
pub struct StdConsole {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn say(&mut self, line: &str) {
        let mut out = self.stdout.lock();
        let _ = writeln!(out, "{}", line);
    }

    fn ask(&mut self, prompt: &str) -> Option<String> {
        {
            let mut out = self.stdout.lock();
            let _ = write!(out, "{}", prompt);
            let _ = out.flush();
        }

        read_answer(&mut self.stdin.lock())
    }
}

/// Read one line, replacing bytes that are not UTF-8. `None` at EOF.
fn read_answer<R: BufRead>(input: &mut R) -> Option<String> {
    let mut raw = Vec::new();
    match input.read_until(b'\n', &mut raw) {
        Ok(0) => None,
        Ok(_) => {
            let line = String::from_utf8_lossy(&raw);
            Some(line.trim_end_matches(['\r', '\n']).to_string())
        }
        Err(e) => {
            warn!(error = %e, "Reading input failed");
            None
        }
    }
}

#[cfg(test)]
pub(crate) use scripted::ScriptedConsole;
