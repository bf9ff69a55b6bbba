use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::relocator::scan::FormatIssue;

/// Per-task tallies. A fresh set is created for every task.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskCounters {
    pub moved: usize,
    /// Malformed names, occupied targets, and failed moves.
    pub skipped: usize,
    pub unmatched: usize,
}

impl TaskCounters {
    pub fn record(&mut self, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::Moved { .. } => self.moved += 1,
            EntryOutcome::Unmatched => self.unmatched += 1,
            EntryOutcome::MalformedName(_)
            | EntryOutcome::DestinationExists { .. }
            | EntryOutcome::DestinationFailed { .. }
            | EntryOutcome::MoveFailed { .. } => self.skipped += 1,
        }
    }
}

/// What happened to one top-level source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Moved { target: PathBuf, matched: String },
    DestinationExists { target: PathBuf, matched: String },
    DestinationFailed { matched: String, detail: String },
    MoveFailed { matched: String, detail: String },
    Unmatched,
    MalformedName(FormatIssue),
}

impl EntryOutcome {
    /// Short label used in the outcome workbook.
    pub fn label(&self) -> &'static str {
        match self {
            EntryOutcome::Moved { .. } => "moved",
            EntryOutcome::DestinationExists { .. } => "skipped: destination exists",
            EntryOutcome::DestinationFailed { .. } => "skipped: destination error",
            EntryOutcome::MoveFailed { .. } => "skipped: move failed",
            EntryOutcome::Unmatched => "unmatched",
            EntryOutcome::MalformedName(_) => "skipped: name format",
        }
    }

    /// Spreadsheet value that selected the directory, if any.
    pub fn matched(&self) -> Option<&str> {
        match self {
            EntryOutcome::Moved { matched, .. }
            | EntryOutcome::DestinationExists { matched, .. }
            | EntryOutcome::DestinationFailed { matched, .. }
            | EntryOutcome::MoveFailed { matched, .. } => Some(matched.as_str()),
            EntryOutcome::Unmatched | EntryOutcome::MalformedName(_) => None,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            EntryOutcome::Moved { target, .. } | EntryOutcome::DestinationExists { target, .. } => {
                target.display().to_string()
            }
            EntryOutcome::DestinationFailed { detail, .. }
            | EntryOutcome::MoveFailed { detail, .. } => detail.clone(),
            EntryOutcome::Unmatched => String::new(),
            EntryOutcome::MalformedName(issue) => issue.to_string(),
        }
    }
}

/// One classified directory of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub name: String,
    pub outcome: EntryOutcome,
}

/// Lifecycle stages of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStage {
    Configured,
    Extracting,
    Normalizing,
    Scanning,
    Relocating,
    Summarized,
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStage::Configured => "configuration",
            TaskStage::Extracting => "extraction",
            TaskStage::Normalizing => "normalization",
            TaskStage::Scanning => "scan",
            TaskStage::Relocating => "relocation",
            TaskStage::Summarized => "summary",
        };
        f.write_str(name)
    }
}

/// Terminal state of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Summarized,
    Aborted { stage: TaskStage, reason: String },
}

/// Everything recorded about a single task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    /// One-based position in the configuration.
    pub number: usize,
    pub excel_path: PathBuf,
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    pub status: TaskStatus,
    pub counters: TaskCounters,
    pub entries: Vec<EntryRecord>,
}

impl TaskReport {
    pub fn is_aborted(&self) -> bool {
        matches!(self.status, TaskStatus::Aborted { .. })
    }
}

/// Reports of all tasks, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tasks: Vec<TaskReport>,
}

/// Console side of reporting. Only successful moves and task/run summaries
/// are printed here; everything else goes to the diagnostic log.
pub struct Reporter<W: Write = io::Stdout> {
    console: W,
}

impl Reporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(console: W) -> Self {
        Self { console }
    }

    pub fn moved(&mut self, name: &str, target: &Path, matched: &str) {
        self.line(format_args!(
            "Moved '{name}' to '{}' (matched value: '{matched}')",
            target.display()
        ));
    }

    pub fn task_finished(&mut self, report: &TaskReport) {
        match &report.status {
            TaskStatus::Summarized => {
                let counters = report.counters;
                self.line(format_args!(
                    "Task {} complete: moved {}, skipped {}, unmatched {}",
                    report.number, counters.moved, counters.skipped, counters.unmatched
                ));
            }
            TaskStatus::Aborted { stage, reason } => {
                self.line(format_args!(
                    "Task {} aborted during {stage}: {reason}",
                    report.number
                ));
            }
        }
    }

    pub fn run_finished(&mut self, summary: &RunSummary) {
        let aborted = summary.tasks.iter().filter(|task| task.is_aborted()).count();
        self.line(format_args!(
            "All tasks processed ({} run, {aborted} aborted).",
            summary.tasks.len()
        ));
    }

    pub fn into_inner(self) -> W {
        self.console
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(err) = writeln!(self.console, "{args}") {
            warn!(error = %err, "console write failed");
        }
    }
}
