//! User-facing build log for the pipenv-install buildpack
//!
//! Buildpack output is read by people scrolling through a platform build
//! log, so every message is placed at a fixed indentation depth:
//!
//! ```text
//! Paketo Buildpack for Pipenv Install 0.4.2
//!   Executing build process
//!     Running 'pipenv install --skip-lock'
//!       Completed in 1.234s
//! ```
//!
//! The emitter is handed its sink at construction so build code never writes
//! to a global stream.

use colored::Colorize;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Verbosity of the build log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Info,
    Debug,
}

impl Level {
    /// Interpret the `BP_LOG_LEVEL` convention used by Paketo buildpacks.
    /// Anything other than `DEBUG` (case-insensitive) keeps the default.
    pub fn from_bp_log_level(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("debug") => Level::Debug,
            _ => Level::Info,
        }
    }
}

/// Writes indented, leveled build output to a sink
pub struct Emitter {
    sink: Mutex<Box<dyn Write + Send>>,
    level: Level,
}

impl Emitter {
    pub fn new<W: Write + Send + 'static>(sink: W) -> Self {
        Emitter {
            sink: Mutex::new(Box::new(sink)),
            level: Level::Info,
        }
    }

    /// Emitter that writes to the process stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Top-level heading, typically `<buildpack name> <version>`
    pub fn title(&self, message: &str) {
        self.write_line(&message.bold().to_string());
    }

    pub fn process(&self, message: &str) {
        self.write_indented(1, message);
    }

    pub fn subprocess(&self, message: &str) {
        self.write_indented(2, message);
    }

    pub fn action(&self, message: &str) {
        self.write_indented(3, message);
    }

    /// Only emitted at [`Level::Debug`]
    pub fn debug(&self, message: &str) {
        if self.level == Level::Debug {
            self.write_indented(2, message);
        }
    }

    /// Log captured subprocess output at debug level
    pub fn capture_output(&self, command: &str, stdout: &str, stderr: &str) {
        if self.level != Level::Debug {
            return;
        }
        self.write_indented(2, &format!("Output of '{}':", command));
        if !stdout.trim().is_empty() {
            self.write_indented(3, stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            self.write_indented(3, stderr.trim_end());
        }
    }

    pub fn break_line(&self) {
        self.write_line("");
    }

    fn write_indented(&self, depth: usize, message: &str) {
        self.write_line(&indent(depth, message));
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = writeln!(sink, "{}", line);
        }
    }
}

fn indent(depth: usize, message: &str) -> String {
    let prefix = "  ".repeat(depth);
    message
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// In-memory sink whose contents can be read back, shared between the
/// emitter and whoever inspects the log
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.inner
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.inner.lock() {
            Ok(mut inner) => {
                inner.extend_from_slice(buf);
                Ok(buf.len())
            }
            Err(_) => Err(io::Error::other("log buffer poisoned")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
