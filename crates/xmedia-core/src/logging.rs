//! Logging init: file under the XDG state dir when writable, stderr otherwise.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Per-event writer: the log file when the handle clones cleanly, stderr
/// otherwise.
enum LogTarget {
    File(File),
    Stderr,
}

impl io::Write for LogTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogTarget::File(f) => f.write(buf),
            LogTarget::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogTarget::File(f) => f.flush(),
            LogTarget::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct LogFileWriter(File);

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogTarget;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogTarget::File)
            .unwrap_or(LogTarget::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,xmedia=debug"))
}

/// Initialize structured logging to `xmedia.log` under the XDG state dir.
/// Returns Err when the state dir is unusable so the caller can fall back.
pub fn init_logging() -> Result<()> {
    let dirs = xdg::BaseDirectories::with_prefix("xmedia")?;
    let path = dirs
        .place_state_file("xmedia.log")
        .context("state dir unavailable")?;

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(LogFileWriter(file))
        .with_ansi(false)
        .init();

    tracing::info!("xmedia logging initialized at {}", path.display());
    Ok(())
}

/// Stderr-only logging, for when `init_logging` fails or in throwaway runs.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
