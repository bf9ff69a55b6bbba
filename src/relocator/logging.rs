use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing::dispatcher::DefaultGuard;
use tracing_subscriber::EnvFilter;

use crate::relocator::error::{Result, ToolError};

/// The diagnostic trail of one run.
///
/// Opening truncates the log file and installs a plain-text `tracing`
/// subscriber writing into it as the default for the current thread.
/// Dropping the value uninstalls the subscriber and closes the file.
pub struct DiagnosticLog {
    _guard: Option<DefaultGuard>,
}

impl DiagnosticLog {
    /// Opens the trail, falling back to console-only reporting when the file
    /// cannot be created.
    pub fn open(path: &Path) -> Self {
        match Self::try_open(path) {
            Ok(log) => log,
            Err(err) => {
                eprintln!("warning: {err}; continuing with console output only");
                Self::console_only()
            }
        }
    }

    pub fn try_open(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .map_err(|err| ToolError::LogWrite(format!("{}: {err}", path.display())))?;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);

        Ok(Self {
            _guard: Some(guard),
        })
    }

    /// A trail that records nothing.
    pub fn console_only() -> Self {
        Self { _guard: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn events_land_in_the_log_file() {
        let temp_dir = tempdir().expect("temporary directory");
        let path = temp_dir.path().join("move_file.log");
        std::fs::write(&path, "stale content\n").expect("stale log");

        {
            let _log = DiagnosticLog::try_open(&path).expect("log opened");
            tracing::info!(folder = "UA01-Zhang", "moved folder");
        }

        let written = std::fs::read_to_string(&path).expect("log read");
        assert!(written.contains("moved folder"));
        assert!(written.contains("UA01-Zhang"));
        assert!(!written.contains("stale content"));
    }

    #[test]
    fn unwritable_path_degrades_to_console_only() {
        let temp_dir = tempdir().expect("temporary directory");
        let missing = temp_dir.path().join("missing");
        let _log = DiagnosticLog::open(&missing.join("move_file.log"));
        tracing::info!("recorded nowhere");
        assert!(!missing.exists());
    }
}
