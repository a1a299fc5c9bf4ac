//! Logging setup.
//!
//! Two entry points share one file layer (JSON, daily rolling, under the
//! configured log directory):
//! - [`init`] for the proxy server, which also prints pretty logs to stdout.
//! - [`init_tui`] for the terminal app, which must never write to stdout while
//!   ratatui owns the screen.
//!
//! Rotated files from previous days are gzipped on a background thread.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// File name prefix used by the rolling appender.
pub const LOG_FILE_NAME: &str = "sticker-studio.log";

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn file_writer(log_dir: &Path) -> (NonBlocking, WorkerGuard) {
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    tracing_appender::non_blocking(file_appender)
}

/// Initialize logging for the proxy server.
///
/// Sets up a JSON file layer plus a pretty stdout layer and bridges `log`
/// macros into `tracing`. The returned guard must be held until shutdown so
/// buffered lines are flushed.
pub fn init(log_dir: &Path) -> WorkerGuard {
    let (non_blocking, guard) = file_writer(log_dir);
    let env_filter = default_filter();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter.clone());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .pretty()
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    spawn_compression(log_dir);

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_NAME)
    );

    guard
}

/// Initialize logging for the terminal app: file layer only.
pub fn init_tui(log_dir: &Path) -> WorkerGuard {
    let (non_blocking, guard) = file_writer(log_dir);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(default_filter());

    // No stdout layer, the TUI owns the terminal
    tracing_subscriber::registry().with(file_layer).init();

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    spawn_compression(log_dir);

    guard
}

fn spawn_compression(log_dir: &Path) {
    let log_dir = log_dir.to_path_buf();
    std::thread::spawn(move || {
        compress_old_logs(log_dir);
    });
}

/// Whether a file in the log directory is a finished rotation that should be
/// gzipped. `today` is the `YYYY-MM-DD` suffix of the active file.
fn should_compress(name: &str, today: &str) -> bool {
    match name.strip_prefix(LOG_FILE_NAME) {
        Some(rest) => rest.starts_with('.') && !rest.ends_with(today) && !rest.ends_with(".gz"),
        None => false,
    }
}

fn compress_old_logs(log_dir: PathBuf) {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    let Ok(entries) = fs::read_dir(&log_dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if should_compress(name, &today) {
            match compress_file(&path) {
                Ok(()) => log::info!("Compressed old log: {:?}", path),
                Err(e) => log::warn!("Failed to compress old log {:?}: {}", path, e),
            }
        }
    }
}

fn compress_file(path: &Path) -> io::Result<()> {
    let file = fs::File::open(path)?;
    let mut reader = io::BufReader::new(file);

    let mut gz_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No filename"))?
        .to_os_string();
    gz_name.push(".gz");
    let gz_path = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No parent directory"))?
        .join(gz_name);

    if gz_path.exists() {
        return Ok(());
    }

    let output = fs::File::create(&gz_path)?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;
    Ok(())
}
