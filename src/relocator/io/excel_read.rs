use std::io::{Read, Seek};
use std::ops::RangeInclusive;
use std::path::Path;

use calamine::{DataType, Range, Reader, Sheets, open_workbook_auto};
use tracing::{debug, info, instrument};

use crate::relocator::config::{ColumnRef, SheetRef, TaskConfig};
use crate::relocator::error::{Result, ToolError};

/// Reads the match column (and filter column, when configured) of the task's
/// worksheet and returns the values of the selected rows in sheet order.
/// Empty cells are dropped.
#[instrument(
    level = "info",
    skip_all,
    fields(dataset = %task.excel_path.display(), sheet = %task.sheet)
)]
pub fn extract_candidates(task: &TaskConfig) -> Result<Vec<String>> {
    let range = read_sheet(&task.excel_path, &task.sheet)?;
    let table = HeaderedRange::new(&range, task.header)?;

    let match_col = table.resolve(&task.match_column)?;
    let filter = match &task.filter {
        Some(filter) => {
            let column = table.resolve(&filter.column)?;
            if column == match_col {
                return Err(ToolError::Configuration(format!(
                    "filtering needs two distinct columns but {} and {} select the same one",
                    task.match_column, filter.column
                )));
            }
            Some((column, filter.value.coerce()))
        }
        None => None,
    };

    let mut columns = vec![table.header_text(match_col)];
    if let Some((column, wanted)) = &filter {
        columns.push(table.header_text(*column));
        debug!(target_value = %wanted, "filtering rows on column '{}'", table.header_text(*column));
    }

    let mut keys = Vec::new();
    let mut rows_scanned = 0;
    for row in table.data_rows() {
        rows_scanned += 1;
        if let Some((column, wanted)) = &filter {
            let actual = cell_to_string(range.get_value((row, *column)));
            if actual.trim() != wanted.as_str() {
                continue;
            }
        }
        match range.get_value((row, match_col)) {
            None | Some(DataType::Empty) => continue,
            Some(cell) => keys.push(cell_to_string(Some(cell))),
        }
    }

    info!(
        candidate_count = keys.len(),
        rows_scanned,
        ?columns,
        "extracted candidate keys from worksheet"
    );
    Ok(keys)
}

fn read_sheet(path: &Path, sheet: &SheetRef) -> Result<Range<DataType>> {
    if !path.is_file() {
        return Err(ToolError::Configuration(format!(
            "spreadsheet not found: {}",
            path.display()
        )));
    }
    let mut workbook = open_workbook_auto(path).map_err(|err| {
        ToolError::Configuration(format!("cannot open {}: {err}", path.display()))
    })?;
    read_required_sheet(&mut workbook, sheet)
}

fn read_required_sheet<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    sheet: &SheetRef,
) -> Result<Range<DataType>> {
    let range_result = match sheet {
        SheetRef::ByName(name) => workbook.worksheet_range(name),
        SheetRef::ByIndex(index) => workbook.worksheet_range_at(*index),
    }
    .ok_or_else(|| ToolError::Configuration(format!("missing {sheet}")))?;
    range_result.map_err(|err| ToolError::Configuration(format!("cannot read {sheet}: {err}")))
}

/// A worksheet range with a header row at an absolute, zero-based row index.
/// Column positions are absolute as well, so index 0 is always column A.
struct HeaderedRange<'a> {
    range: &'a Range<DataType>,
    header: u32,
    first_col: u32,
    last_row: u32,
    last_col: u32,
}

impl<'a> HeaderedRange<'a> {
    fn new(range: &'a Range<DataType>, header: usize) -> Result<Self> {
        let (Some((_, first_col)), Some((last_row, last_col))) = (range.start(), range.end())
        else {
            return Err(ToolError::Configuration("worksheet is empty".into()));
        };
        let header = u32::try_from(header)
            .ok()
            .filter(|header| *header <= last_row)
            .ok_or_else(|| {
                ToolError::Configuration(format!(
                    "header row {header} is beyond the last row ({last_row}) of the worksheet"
                ))
            })?;

        Ok(Self {
            range,
            header,
            first_col,
            last_row,
            last_col,
        })
    }

    fn resolve(&self, column: &ColumnRef) -> Result<u32> {
        match column {
            ColumnRef::ByIndex(index) => u32::try_from(*index)
                .ok()
                .filter(|index| *index <= self.last_col)
                .ok_or_else(|| {
                    ToolError::Configuration(format!(
                        "{column} is out of range, the worksheet has {} columns",
                        self.last_col + 1
                    ))
                }),
            ColumnRef::ByName(name) => (self.first_col..=self.last_col)
                .find(|col| self.header_text(*col).trim() == name.trim())
                .ok_or_else(|| {
                    ToolError::Configuration(format!("{column} not found in header row {}", self.header))
                }),
        }
    }

    fn header_text(&self, column: u32) -> String {
        cell_to_string(self.range.get_value((self.header, column)))
    }

    fn data_rows(&self) -> RangeInclusive<u32> {
        (self.header + 1)..=self.last_row
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
