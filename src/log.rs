//! Logging setup.
//!
//! A `tracing-subscriber` `fmt` layer writes `[HH:MM:SS] message` lines to
//! the configured log file, truncated at startup and re-truncated whenever
//! it grows past `cap_bytes`. Until the dispatcher's main loop starts we
//! also echo to stderr, since that's the only point at which a human is
//! likely watching the terminal.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing_subscriber::fmt::time::FormatTime;

const DEFAULT_CAP_BYTES: u64 = 2 * 1024 * 1024;

struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let h = (secs / 3600) % 24;
        let m = (secs / 60) % 60;
        let s = secs % 60;
        write!(w, "{h:02}:{m:02}:{s:02}")
    }
}

/// Handle retained by the dispatcher so it can check the log file's size
/// once per 1000 drained X events (§4.11) and truncate it in place.
pub struct LogGuard {
    path: PathBuf,
    cap_bytes: u64,
    file: Mutex<File>,
}

impl LogGuard {
    /// Truncate if the file has grown past the cap. Cheap `stat` + maybe a
    /// reopen-with-truncate; never panics on I/O failure, just logs and
    /// carries on (losing the log is not a reason to crash the manager).
    pub fn maybe_truncate(&self) {
        let meta = match std::fs::metadata(&self.path) {
            Ok(m) => m,
            Err(_) => return,
        };
        if meta.len() <= self.cap_bytes {
            return;
        }
        if let Ok(mut guard) = self.file.lock() {
            if let Ok(f) = OpenOptions::new().write(true).truncate(true).open(&self.path) {
                *guard = f;
            }
        }
    }
}

/// Installs the global tracing subscriber. Must be called exactly once,
/// before anything else logs.
pub fn init(log_path: &Path, cap_bytes: Option<u64>) -> io::Result<LogGuard> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let writer = file.try_clone()?;
    let subscriber = tracing_subscriber::fmt()
        .with_timer(ClockTime)
        .with_target(false)
        .with_writer(move || writer.try_clone().expect("clone log file handle"))
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("tracing subscriber already installed");

    Ok(LogGuard {
        path: log_path.to_path_buf(),
        cap_bytes: cap_bytes.unwrap_or(DEFAULT_CAP_BYTES),
        file: Mutex::new(file),
    })
}
