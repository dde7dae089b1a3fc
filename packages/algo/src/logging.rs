//! Subscriber setup for hosts embedding the engine.
//!
//! The engine itself only emits `tracing` events. Hosts that have no
//! subscriber of their own call [`init_tracing`] once at startup; the default
//! filter only lets this crate's events through, `RUST_LOG` overrides it.

use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Daily files are named `vocab-trainer.log.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "vocab-trainer.log";

const CRATE_TARGET: &str = "vocab_trainer_algo";

/// Keeps the non-blocking file writer alive; dropping it flushes pending lines.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    /// Directory for rolling log files; `None` logs to stdout only
    pub file_dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_dir: None,
        }
    }
}

impl LogSettings {
    /// `LOG_LEVEL`, `ENABLE_FILE_LOGS` (`true`/`1`) and `LOG_DIR` (default `./logs`).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let file_logs = lookup("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        Self {
            level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            file_dir: file_logs
                .then(|| PathBuf::from(lookup("LOG_DIR").unwrap_or_else(|| "./logs".to_string()))),
        }
    }
}

/// Filter admitting this crate's events at `level` (info when unparsable).
pub fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("{CRATE_TARGET}={level}"))
        .unwrap_or_else(|_| EnvFilter::new(format!("{CRATE_TARGET}=info")))
}

/// Non-blocking daily rolling writer under `dir`, creating it if needed.
pub fn file_writer(dir: &Path) -> io::Result<(NonBlocking, FileLogGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((writer, FileLogGuard { _guard: guard }))
}

/// [`init_tracing_with`] using [`LogSettings::from_env`] at the given level.
pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    init_tracing_with(&LogSettings {
        level: log_level.to_string(),
        ..LogSettings::from_env()
    })
}

/// Install the global subscriber. Returns the file guard when a file layer
/// was installed; `None` when file logging is off, the directory cannot be
/// used, or the host already installed a subscriber.
pub fn init_tracing_with(settings: &LogSettings) -> Option<FileLogGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| crate_filter(&settings.level));
    let stdout_layer = fmt::layer().with_target(true);

    let file = settings.file_dir.as_deref().and_then(|dir| match file_writer(dir) {
        Ok(pair) => Some(pair),
        Err(err) => {
            eprintln!("file logging disabled, cannot use {}: {err}", dir.display());
            None
        }
    });

    match file {
        Some((writer, guard)) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            let installed = tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .with(file_layer)
                .try_init()
                .is_ok();
            installed.then_some(guard)
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .try_init();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tracing_subscriber::Layer;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_settings_default_to_stdout_only() {
        let settings = LogSettings::from_lookup(lookup(&[("LOG_DIR", "/tmp/ignored")]));
        assert_eq!(settings, LogSettings::default());
    }

    #[test]
    fn test_settings_enable_file_logs() {
        let settings = LogSettings::from_lookup(lookup(&[
            ("ENABLE_FILE_LOGS", "1"),
            ("LOG_DIR", "/var/log/vocab"),
            ("LOG_LEVEL", "debug"),
        ]));
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.file_dir, Some(PathBuf::from("/var/log/vocab")));

        let settings = LogSettings::from_lookup(lookup(&[("ENABLE_FILE_LOGS", "true")]));
        assert_eq!(settings.file_dir, Some(PathBuf::from("./logs")));
    }

    #[test]
    fn test_crate_filter_is_scoped() {
        let filter = crate_filter("debug").to_string().to_lowercase();
        assert!(filter.contains("vocab_trainer_algo=debug"), "{filter}");
    }

    #[test]
    fn test_file_writer_flushes_on_guard_drop() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");
        let (writer, guard) = file_writer(&log_dir).unwrap();

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(crate_filter("info")),
        );
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "vocab_trainer_algo::session", ability = 1250.0, "Session started");
            tracing::info!(target: "some_other_crate", "Not ours");
        });
        drop(guard);

        let files: Vec<_> = std::fs::read_dir(&log_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(LOG_FILE_PREFIX), "{name}");

        let contents = std::fs::read_to_string(&files[0]).unwrap();
        assert!(contents.contains("Session started"));
        assert!(contents.contains("ability=1250"));
        assert!(!contents.contains("Not ours"));
    }

    #[test]
    fn test_file_writer_fails_under_a_regular_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(file_writer(&file.path().join("logs")).is_err());
    }

    #[test]
    fn test_init_without_usable_dir_returns_no_guard() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let settings = LogSettings {
            level: "warn".to_string(),
            file_dir: Some(file.path().join("logs")),
        };
        assert!(init_tracing_with(&settings).is_none());
    }
}
