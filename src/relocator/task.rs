use std::io::Write;

use tracing::{debug, error, info, instrument, warn};

use crate::relocator::config::{RunConfig, TaskConfig, TaskDescriptor};
use crate::relocator::error::{ErrorScope, Result, ToolError};
use crate::relocator::io::excel_read;
use crate::relocator::matcher::find_match;
use crate::relocator::normalize::{CandidateKey, normalize_keys};
use crate::relocator::relocate::{Relocation, relocate};
use crate::relocator::report::{
    EntryOutcome, EntryRecord, Reporter, RunSummary, TaskCounters, TaskReport, TaskStage,
    TaskStatus,
};
use crate::relocator::scan::{DirectoryEntry, ScannedEntry, scan_source};

/// Validates every task, then runs them one after another. A task that fails
/// validation, extraction or scanning is recorded as aborted and the run
/// moves on.
pub fn run_tasks<W: Write>(config: &RunConfig, reporter: &mut Reporter<W>) -> RunSummary {
    let validated = config.validated_tasks();
    let mut summary = RunSummary::default();

    for (index, (descriptor, task)) in config.tasks.iter().zip(validated).enumerate() {
        let number = index + 1;
        let report = match task {
            Ok(task) => run_task(number, &task, reporter),
            Err(err) => {
                error!(task = number, error = %err, "task configuration is invalid, skipping task");
                aborted_report(number, descriptor, TaskStage::Configured, &err)
            }
        };
        reporter.task_finished(&report);
        summary.tasks.push(report);
    }

    info!(task_count = summary.tasks.len(), "all tasks processed");
    reporter.run_finished(&summary);
    summary
}

/// Runs a single validated task to its terminal state.
#[instrument(
    level = "info",
    skip_all,
    fields(
        task = number,
        dataset = %task.excel_path.display(),
        source = %task.source_dir.display(),
        destination = %task.destination_dir.display()
    )
)]
pub fn run_task<W: Write>(
    number: usize,
    task: &TaskConfig,
    reporter: &mut Reporter<W>,
) -> TaskReport {
    info!(sheet = %task.sheet, header = task.header, column = %task.match_column, "starting task");
    match &task.filter {
        Some(filter) => info!(
            "filter condition: {} has value '{}'",
            filter.column,
            filter.value.coerce()
        ),
        None => info!("no filter condition, every row of the match column is a candidate"),
    }

    let mut report = TaskReport {
        number,
        excel_path: task.excel_path.clone(),
        source_dir: task.source_dir.clone(),
        destination_dir: task.destination_dir.clone(),
        status: TaskStatus::Summarized,
        counters: TaskCounters::default(),
        entries: Vec::new(),
    };

    let mut stage = TaskStage::Configured;
    if let Err(err) = execute(task, reporter, &mut report, &mut stage) {
        error!(%stage, scope = ?err.scope(), error = %err, "task aborted");
        report.status = TaskStatus::Aborted {
            stage,
            reason: err.to_string(),
        };
        return report;
    }

    let counters = report.counters;
    info!(
        moved = counters.moved,
        skipped = counters.skipped,
        unmatched = counters.unmatched,
        "task processing complete"
    );
    report
}

fn execute<W: Write>(
    task: &TaskConfig,
    reporter: &mut Reporter<W>,
    report: &mut TaskReport,
    stage: &mut TaskStage,
) -> Result<()> {
    advance(stage, TaskStage::Extracting);
    let raw_keys = excel_read::extract_candidates(task)?;

    advance(stage, TaskStage::Normalizing);
    let keys = normalize_keys(raw_keys);

    advance(stage, TaskStage::Scanning);
    let scanned = scan_source(&task.source_dir)?;
    info!(entry_count = scanned.len(), "searching for matching folders");

    advance(stage, TaskStage::Relocating);
    for scanned_entry in scanned {
        let name = scanned_entry.name().to_string();
        let outcome = match scanned_entry {
            ScannedEntry::Malformed { issue, .. } => {
                info!(folder = %name, "folder name format incorrect ({issue}), skipping");
                EntryOutcome::MalformedName(issue)
            }
            ScannedEntry::Valid(entry) => process_entry(&entry, &keys, task, reporter)?,
        };
        report.counters.record(&outcome);
        report.entries.push(EntryRecord { name, outcome });
    }

    advance(stage, TaskStage::Summarized);
    Ok(())
}

fn process_entry<W: Write>(
    entry: &DirectoryEntry,
    keys: &[CandidateKey],
    task: &TaskConfig,
    reporter: &mut Reporter<W>,
) -> Result<EntryOutcome> {
    let Some(key) = find_match(entry, keys) else {
        info!(
            folder = %entry.name,
            id = %entry.id,
            label = %entry.label,
            "folder not found in the spreadsheet list, skipping"
        );
        return Ok(EntryOutcome::Unmatched);
    };
    let matched = key.original.clone();

    let outcome = match relocate(entry, &task.destination_dir) {
        Ok(Relocation::Moved(target)) => {
            info!(folder = %entry.name, target = %target.display(), matched = %matched, "moved folder");
            reporter.moved(&entry.name, &target, &matched);
            EntryOutcome::Moved { target, matched }
        }
        Ok(Relocation::DestinationExists(target)) => {
            warn!(
                folder = %entry.name,
                target = %target.display(),
                "destination already exists, skipping"
            );
            EntryOutcome::DestinationExists { target, matched }
        }
        Err(err) if err.scope() == ErrorScope::Entry => {
            error!(folder = %entry.name, error = %err, "relocation failed, skipping");
            let detail = err.to_string();
            match err {
                ToolError::Destination { .. } => EntryOutcome::DestinationFailed { matched, detail },
                _ => EntryOutcome::MoveFailed { matched, detail },
            }
        }
        Err(err) => return Err(err),
    };
    Ok(outcome)
}

fn advance(stage: &mut TaskStage, next: TaskStage) {
    debug!(from = %stage, to = %next, "task stage");
    *stage = next;
}

fn aborted_report(
    number: usize,
    descriptor: &TaskDescriptor,
    stage: TaskStage,
    err: &ToolError,
) -> TaskReport {
    TaskReport {
        number,
        excel_path: descriptor.excel_path.clone(),
        source_dir: descriptor.source_dir.clone(),
        destination_dir: descriptor.destination_dir.clone(),
        status: TaskStatus::Aborted {
            stage,
            reason: err.to_string(),
        },
        counters: TaskCounters::default(),
        entries: Vec::new(),
    }
}
