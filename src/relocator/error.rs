use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the failures that can occur while extracting
/// candidates, scanning the source directory, or relocating entries.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Raised when a task refers to a dataset, sheet, header or column that
    /// cannot be resolved, or when the task descriptor itself is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Raised when the source directory of a task does not exist.
    #[error("source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Raised when the parent of a relocation target cannot be created.
    #[error("cannot create destination directory {}: {source}", path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Raised when the move of a directory fails part way.
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    MoveFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Raised when the diagnostic log cannot be opened or installed.
    #[error("diagnostic log unavailable: {0}")]
    LogWrite(String),

    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the task configuration file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the outcome workbook writer.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),
}

/// How far a failure is allowed to propagate before processing resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// The current directory entry is skipped, the task continues.
    Entry,
    /// The current task is aborted, the run continues with the next task.
    Task,
    /// Handled once for the whole run: startup, the diagnostic log and the
    /// outcome workbook.
    Run,
}

impl ToolError {
    /// Returns the narrowest scope at which this error is caught.
    pub fn scope(&self) -> ErrorScope {
        match self {
            ToolError::Destination { .. } | ToolError::MoveFailure { .. } => ErrorScope::Entry,
            ToolError::Configuration(_)
            | ToolError::SourceNotFound(_)
            | ToolError::Io(_) => ErrorScope::Task,
            ToolError::LogWrite(_) | ToolError::Json(_) | ToolError::ExcelWrite(_) => {
                ErrorScope::Run
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_level_failures_do_not_escalate() {
        let error = ToolError::MoveFailure {
            from: PathBuf::from("a"),
            to: PathBuf::from("b"),
            source: std::io::Error::other("busy"),
        };
        assert_eq!(error.scope(), ErrorScope::Entry);
        assert_eq!(
            ToolError::SourceNotFound(PathBuf::from("missing")).scope(),
            ErrorScope::Task
        );
    }
}
