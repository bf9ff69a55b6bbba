use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::relocator::error::{Result, ToolError};

/// Log file used when neither the configuration nor the command line names one.
pub const DEFAULT_LOG_FILE: &str = "move_file.log";

/// Top-level layout of a task configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Diagnostic trail destination. Overwritten on every run.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Optional outcome workbook written after all tasks finish.
    #[serde(default)]
    pub report_file: Option<PathBuf>,
    /// Tasks executed in order.
    pub tasks: Vec<TaskDescriptor>,
}

impl RunConfig {
    /// Reads and parses a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    /// Parses a configuration from its JSON text.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Validates every task up front. Invalid tasks keep their error so the
    /// run can report them without halting the remaining ones.
    pub fn validated_tasks(&self) -> Vec<Result<TaskConfig>> {
        self.tasks.iter().map(TaskDescriptor::validate).collect()
    }
}

/// Addresses a spreadsheet column either by header text or by zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    ByIndex(usize),
    ByName(String),
}

impl ColumnRef {
    /// Returns the positional form if this selector is, or cleanly converts to, an index.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            ColumnRef::ByIndex(index) => Some(*index),
            ColumnRef::ByName(name) => name.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::ByIndex(index) => write!(f, "column #{index}"),
            ColumnRef::ByName(name) => write!(f, "column '{name}'"),
        }
    }
}

/// Addresses a worksheet either by name or by zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SheetRef {
    ByIndex(usize),
    ByName(String),
}

impl Default for SheetRef {
    fn default() -> Self {
        SheetRef::ByIndex(0)
    }
}

impl fmt::Display for SheetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetRef::ByIndex(index) => write!(f, "sheet #{index}"),
            SheetRef::ByName(name) => write!(f, "sheet '{name}'"),
        }
    }
}

/// Scalar given as a filter value in the configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// String form compared against the trimmed text of filter cells.
    pub fn coerce(&self) -> String {
        match self {
            CellValue::Bool(value) => value.to_string(),
            CellValue::Integer(value) => value.to_string(),
            CellValue::Float(value) => value.to_string(),
            CellValue::Text(value) => value.trim().to_string(),
        }
    }
}

/// A task as written in the configuration file. Legacy key names are
/// accepted as aliases.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDescriptor {
    pub excel_path: PathBuf,
    #[serde(default, alias = "sheet_name")]
    pub sheet: SheetRef,
    #[serde(default)]
    pub header: usize,
    #[serde(alias = "name_col")]
    pub match_column: ColumnRef,
    #[serde(alias = "source_path")]
    pub source_dir: PathBuf,
    #[serde(alias = "destination_path")]
    pub destination_dir: PathBuf,
    #[serde(default, alias = "filter_col")]
    pub filter_column: Option<ColumnRef>,
    #[serde(default)]
    pub filter_value: Option<CellValue>,
}

/// Restricts candidate rows to those whose filter column equals `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFilter {
    pub column: ColumnRef,
    pub value: CellValue,
}

/// A validated, immutable task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    pub excel_path: PathBuf,
    pub sheet: SheetRef,
    pub header: usize,
    pub match_column: ColumnRef,
    pub filter: Option<RowFilter>,
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
}

impl TaskDescriptor {
    /// Checks required fields and harmonizes the column addressing style.
    pub fn validate(&self) -> Result<TaskConfig> {
        require_path("excel_path", &self.excel_path)?;
        require_path("source_dir", &self.source_dir)?;
        require_path("destination_dir", &self.destination_dir)?;

        let (match_column, filter) = match (&self.filter_column, &self.filter_value) {
            (None, None) => (self.match_column.clone(), None),
            (Some(column), Some(value)) => {
                let (match_column, column) = harmonize(&self.match_column, column)?;
                let filter = RowFilter {
                    column,
                    value: value.clone(),
                };
                (match_column, Some(filter))
            }
            (Some(_), None) => {
                return Err(ToolError::Configuration(
                    "filter_column is set but filter_value is missing".into(),
                ));
            }
            (None, Some(_)) => {
                return Err(ToolError::Configuration(
                    "filter_value is set but filter_column is missing".into(),
                ));
            }
        };

        Ok(TaskConfig {
            excel_path: self.excel_path.clone(),
            sheet: self.sheet.clone(),
            header: self.header,
            match_column,
            filter,
            source_dir: self.source_dir.clone(),
            destination_dir: self.destination_dir.clone(),
        })
    }
}

/// Brings the match and filter selectors to the same addressing style.
/// Positional wins when both convert to integers.
pub fn harmonize(
    match_column: &ColumnRef,
    filter_column: &ColumnRef,
) -> Result<(ColumnRef, ColumnRef)> {
    if let (Some(lhs), Some(rhs)) = (match_column.as_index(), filter_column.as_index()) {
        return Ok((ColumnRef::ByIndex(lhs), ColumnRef::ByIndex(rhs)));
    }

    match (match_column, filter_column) {
        (ColumnRef::ByName(lhs), ColumnRef::ByName(rhs)) => Ok((
            ColumnRef::ByName(lhs.clone()),
            ColumnRef::ByName(rhs.clone()),
        )),
        _ => Err(ToolError::Configuration(format!(
            "match {match_column} and filter {filter_column} mix name and index addressing"
        ))),
    }
}

fn require_path(field: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(ToolError::Configuration(format!("{field} must not be empty")));
    }
    Ok(())
}
