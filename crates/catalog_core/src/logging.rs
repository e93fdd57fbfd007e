//! Logging bootstrap for the catalog core.
//!
//! # Responsibility
//! - Start the rotating file logger exactly once per process.
//! - Capture panics as sanitized log events.
//!
//! # Invariants
//! - Initialization is idempotent for an identical level and directory.
//! - Reconfiguration with a different level or directory is rejected.
//! - Initialization never panics.
//! - Events carry identifiers and counts only, never message bodies.

use crate::config::CoreConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "catalog";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

/// Logging bootstrap failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(String),
    AlreadyInitialized { active: String, requested: String },
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(reason) => write!(f, "invalid log directory: {reason}"),
            Self::AlreadyInitialized { active, requested } => write!(
                f,
                "logging already initialized with `{active}`; refusing to switch to `{requested}`"
            ),
            Self::Backend(reason) => write!(f, "failed to start logger: {reason}"),
        }
    }
}

impl Error for LoggingError {}

/// Starts file logging at `level` under the absolute directory `log_dir`.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;
    let log_dir = normalize_log_dir(log_dir)?;

    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(level, &log_dir))?;
    ensure_same_settings(active, level, &log_dir)
}

/// Starts file logging using the level carried by `config`.
pub fn init_logging_from_config(config: &CoreConfig, log_dir: &str) -> Result<(), LoggingError> {
    init_logging(&config.log_level, log_dir)
}

/// Returns `(level, log_dir)` of the active logger, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_LOGGER
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: &'static str, log_dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(log_dir).map_err(|err| {
        LoggingError::InvalidDirectory(format!("cannot create `{}`: {err}", log_dir.display()))
    })?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();

    info!(
        "event=core_init module=logging status=ok version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );

    Ok(ActiveLogger {
        level,
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    })
}

fn ensure_same_settings(
    active: &ActiveLogger,
    level: &'static str,
    log_dir: &Path,
) -> Result<(), LoggingError> {
    if active.log_dir != log_dir {
        return Err(LoggingError::AlreadyInitialized {
            active: active.log_dir.display().to_string(),
            requested: log_dir.display().to_string(),
        });
    }
    if active.level != level {
        return Err(LoggingError::AlreadyInitialized {
            active: active.level.to_string(),
            requested: level.to_string(),
        });
    }
    Ok(())
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err(LoggingError::InvalidDirectory("path is empty".to_string()));
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(LoggingError::InvalidDirectory(format!(
            "`{trimmed}` is not absolute"
        )));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous_hook(panic_info);
    }));
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    let mut truncated: String = flattened.chars().take(max_chars).collect();
    if flattened.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, logging_status, normalize_level, normalize_log_dir, sanitize_message,
        LoggingError,
    };

    #[test]
    fn levels_normalize_case_insensitively() {
        assert_eq!(normalize_level("INFO"), Ok("info"));
        assert_eq!(normalize_level(" warning "), Ok("warn"));
        assert_eq!(
            normalize_level("verbose"),
            Err(LoggingError::UnsupportedLevel("verbose".to_string()))
        );
    }

    #[test]
    fn relative_directories_are_rejected() {
        assert!(matches!(
            normalize_log_dir("logs/dev"),
            Err(LoggingError::InvalidDirectory(_))
        ));
        assert!(matches!(
            normalize_log_dir("   "),
            Err(LoggingError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn sanitize_flattens_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert_eq!(sanitized, "line1 li...");
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let first_dir = first.path().to_str().unwrap().to_string();
        let second_dir = second.path().to_str().unwrap().to_string();

        init_logging("info", &first_dir).unwrap();
        init_logging("INFO", &first_dir).unwrap();

        assert!(matches!(
            init_logging("debug", &first_dir),
            Err(LoggingError::AlreadyInitialized { .. })
        ));
        assert!(matches!(
            init_logging("info", &second_dir),
            Err(LoggingError::AlreadyInitialized { .. })
        ));

        let (level, dir) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(dir, first.path());
    }
}
