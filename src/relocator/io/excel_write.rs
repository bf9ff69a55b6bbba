use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::relocator::error::Result;
use crate::relocator::report::{RunSummary, TaskStatus};

/// Sheet listing one row per task.
pub const SUMMARY_SHEET: &str = "Summary";
/// Sheet listing one row per classified directory.
pub const ENTRIES_SHEET: &str = "Entries";

const SUMMARY_COLUMNS: [&str; 8] = [
    "Task",
    "Spreadsheet",
    "Source",
    "Destination",
    "Status",
    "Moved",
    "Skipped",
    "Unmatched",
];
const ENTRY_COLUMNS: [&str; 5] = ["Task", "Directory", "Outcome", "Matched value", "Detail"];

/// Writes the outcome of a run to an Excel workbook.
pub fn write_outcome_workbook(path: &Path, summary: &RunSummary) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SUMMARY_SHEET)?;
        write_header(worksheet, &SUMMARY_COLUMNS, &header_format)?;

        for (row_idx, task) in summary.tasks.iter().enumerate() {
            let row = (row_idx + 1) as u32;
            let status = match &task.status {
                TaskStatus::Summarized => "completed".to_string(),
                TaskStatus::Aborted { stage, reason } => format!("aborted during {stage}: {reason}"),
            };
            worksheet.write_number(row, 0, task.number as f64)?;
            worksheet.write_string(row, 1, &task.excel_path.display().to_string())?;
            worksheet.write_string(row, 2, &task.source_dir.display().to_string())?;
            worksheet.write_string(row, 3, &task.destination_dir.display().to_string())?;
            worksheet.write_string(row, 4, &status)?;
            worksheet.write_number(row, 5, task.counters.moved as f64)?;
            worksheet.write_number(row, 6, task.counters.skipped as f64)?;
            worksheet.write_number(row, 7, task.counters.unmatched as f64)?;
        }
    }

    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(ENTRIES_SHEET)?;
        write_header(worksheet, &ENTRY_COLUMNS, &header_format)?;

        let mut row = 1u32;
        for task in &summary.tasks {
            for entry in &task.entries {
                worksheet.write_number(row, 0, task.number as f64)?;
                worksheet.write_string(row, 1, &entry.name)?;
                worksheet.write_string(row, 2, entry.outcome.label())?;
                worksheet.write_string(row, 3, entry.outcome.matched().unwrap_or_default())?;
                worksheet.write_string(row, 4, &entry.outcome.detail())?;
                row += 1;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_header(worksheet: &mut Worksheet, columns: &[&str], format: &Format) -> Result<()> {
    for (col_idx, header) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, *header, format)?;
    }
    Ok(())
}
