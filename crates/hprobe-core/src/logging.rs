//! Tracing setup. Probe results own stdout, so logs go to a file under the
//! XDG state dir, or to stderr when that dir can't be used.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,hprobe_core=debug,hprobe=debug";

/// Where log records ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// Per-record handle on the shared log file; a failed clone degrades to stderr.
enum LogWriter {
    File(fs::File),
    Stderr,
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogWriter::File(f) => f.write(buf),
            LogWriter::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogWriter::File(f) => f.flush(),
            LogWriter::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct SharedFile(fs::File);

impl<'a> MakeWriter<'a> for SharedFile {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogWriter::File)
            .unwrap_or(LogWriter::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `~/.local/state/hprobe/hprobe.log`
pub fn default_log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("hprobe")?;
    Ok(xdg_dirs.get_state_home().join("hprobe.log"))
}

fn open_append(path: &Path) -> Result<fs::File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create log dir: {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file: {}", path.display()))
}

/// Installs the global subscriber: the XDG log file when it can be opened,
/// stderr otherwise. Only fails if a subscriber is already installed.
pub fn init_logging() -> Result<LogTarget> {
    let file = default_log_path().and_then(|p| open_append(&p).map(|f| (p, f)));
    let (writer, target) = match file {
        Ok((path, f)) => (BoxMakeWriter::new(SharedFile(f)), LogTarget::File(path)),
        Err(e) => {
            eprintln!("hprobe: logging to stderr ({:#})", e);
            (BoxMakeWriter::new(io::stderr), LogTarget::Stderr)
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install tracing subscriber: {}", e))?;

    if let LogTarget::File(path) = &target {
        tracing::info!("hprobe logging initialized at {}", path.display());
    }
    Ok(target)
}
