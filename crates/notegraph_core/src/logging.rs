//! Core logging bootstrap and safety policy.
//!
//! # Responsibility
//! - Initialize the rolling file sink exactly once per process.
//! - Keep graph diagnostics metadata-only (`event=... module=... status=...`).
//!
//! # Invariants
//! - Core emits ids and counts only; note titles and content never reach logs.
//! - Logging init is idempotent for the same settings.
//! - Re-initialization with a different level or directory is rejected.
//! - Logging initialization must not panic.

use crate::config::{LogSettings, ENV_LOG_DIR, ENV_LOG_LEVEL};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "notegraph";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Initializes the file log sink described by `settings`.
///
/// Returns `Ok(false)` without touching the logger when `settings.dir` is
/// `None`, and `Ok(true)` once the file sink is active.
///
/// # Errors
/// - Unsupported level, relative or unwritable directory.
/// - A previous initialization used a different level or directory.
/// - Logger backend setup failure.
pub fn init_logging(settings: &LogSettings) -> Result<bool, String> {
    let Some(dir) = settings.dir.as_deref() else {
        return Ok(false);
    };
    let level = normalize_level(&settings.level)?;
    let log_dir = normalize_log_dir(dir)?;

    let state = LOGGING_STATE.get_or_try_init(|| start_file_logger(level, &log_dir))?;
    ensure_same_config(state, level, &log_dir)?;
    Ok(true)
}

/// Returns `(level, log_dir)` of the active file sink, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

/// Returns the default log level for current build mode.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_file_logger(level: &'static str, log_dir: &Path) -> Result<LoggingState, String> {
    std::fs::create_dir_all(log_dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            log_dir.display()
        )
    })?;

    let logger = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
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
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook_once();

    info!(
        "event=logging_init module=core status=ok level={} log_dir={} version={}",
        level,
        log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(LoggingState {
        level,
        log_dir: log_dir.to_path_buf(),
        _logger: logger,
    })
}

fn ensure_same_config(state: &LoggingState, level: &str, log_dir: &Path) -> Result<(), String> {
    if state.log_dir != log_dir || state.level != level {
        return Err(format!(
            "notegraph log sink is already {}@{}; cannot reopen as {}@{}",
            state.level,
            state.log_dir.display(),
            level,
            log_dir.display()
        ));
    }
    Ok(())
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    let wanted = level.trim().to_ascii_lowercase();
    LEVELS
        .into_iter()
        .find(|known| *known == wanted)
        .ok_or_else(|| {
            format!(
                "{ENV_LOG_LEVEL} `{wanted}` is not one of {}",
                LEVELS.join("|")
            )
        })
}

fn normalize_log_dir(log_dir: &Path) -> Result<PathBuf, String> {
    if !log_dir.is_absolute() {
        return Err(format!(
            "{ENV_LOG_DIR} must be absolute, got `{}`",
            log_dir.display()
        ));
    }
    Ok(log_dir.to_path_buf())
}

fn install_panic_hook_once() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            // Payloads may echo note text; only a flattened prefix is logged.
            let location = panic_info.location().map_or_else(
                || "unknown".to_string(),
                |loc| format!("{}:{}", loc.file(), loc.line()),
            );
            error!(
                "event=panic_captured module=core status=error location={} payload={}",
                location,
                panic_payload_prefix(panic_info)
            );
            previous_hook(panic_info);
        }));
    });
}

fn panic_payload_prefix(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let text = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    single_line_prefix(text, MAX_PANIC_PAYLOAD_CHARS)
}

fn single_line_prefix(value: &str, max_chars: usize) -> String {
    let mut out: String = value
        .chars()
        .take(max_chars)
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect();
    if value.chars().nth(max_chars).is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, logging_status, normalize_level, normalize_log_dir, single_line_prefix,
    };
    use crate::config::LogSettings;
    use std::path::{Path, PathBuf};

    fn settings(level: &str, dir: Option<PathBuf>) -> LogSettings {
        LogSettings {
            level: level.to_string(),
            dir,
        }
    }

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" Warn ").unwrap(), "warn");
        assert!(normalize_level("warning").is_err());
        assert!(normalize_level("verbose").is_err());
    }

    #[test]
    fn normalize_log_dir_rejects_relative_path() {
        let error = normalize_log_dir(Path::new("logs/dev")).unwrap_err();
        assert!(error.contains("NOTEGRAPH_LOG_DIR must be absolute"));
    }

    #[test]
    fn panic_payload_is_flattened_and_truncated() {
        assert_eq!(single_line_prefix("line1\nline2\rline3", 8), "line1 li...");
        assert_eq!(single_line_prefix("short", 8), "short");
    }

    #[test]
    fn missing_directory_leaves_file_sink_disabled() {
        assert_eq!(init_logging(&settings("info", None)), Ok(false));
    }

    #[test]
    fn init_logging_is_idempotent_for_same_config_and_rejects_conflicts() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let log_dir = first.path().join("logs");

        assert_eq!(
            init_logging(&settings("info", Some(log_dir.clone()))),
            Ok(true)
        );
        assert_eq!(
            init_logging(&settings("INFO", Some(log_dir.clone()))),
            Ok(true)
        );

        let level_error = init_logging(&settings("debug", Some(log_dir.clone()))).unwrap_err();
        assert!(level_error.contains("cannot reopen"));

        let dir_error =
            init_logging(&settings("info", Some(second.path().to_path_buf()))).unwrap_err();
        assert!(dir_error.contains("cannot reopen"));

        let (active_level, active_dir) = logging_status().unwrap();
        assert_eq!(active_level, "info");
        assert_eq!(active_dir, log_dir);
    }
}
