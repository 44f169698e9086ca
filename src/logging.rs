use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Line-mode commands log to stderr
    Stderr,
    /// The TUI owns the terminal, so logs are appended to a file
    File,
}

/// Install the global tracing subscriber.
///
/// The level defaults to WARN and can be raised with `RUST_LOG`.
pub fn init(target: LogTarget, log_file: &Path) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact();

    // try_init: a second call keeps the first subscriber.
    let _ = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File => match open_log_file(log_file) {
            Some(file) => builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init(),
            // Never fall back to stderr underneath the alternate screen.
            None => builder.with_writer(std::io::sink).try_init(),
        },
    };
}

fn open_log_file(path: &Path) -> Option<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}
