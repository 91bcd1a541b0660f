//! Workbook reading: spreadsheet bytes → ordered [`SheetTable`]s.
//!
//! ## Why a temp file?
//!
//! The PDF path opens the workbook through calamine's path-based
//! `open_workbook_auto`, which picks the reader from the file extension.
//! [`TempWorkbook`] writes the bytes to a `NamedTempFile` with the right
//! suffix and removes it on every exit path: explicitly via
//! [`TempWorkbook::release`], or on drop if the caller unwinds first.
//!
//! The Markdown path reads the same bytes straight from memory.

use crate::error::AdapterError;
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::NaiveDateTime;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Extensions the spreadsheet reader understands.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xla", "xlam", "xls", "ods"];

/// Text shown for an empty data cell.
pub const MISSING_CELL: &str = "NaN";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// One sheet, with its first row promoted to column names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Build a table from a calamine range. The first row is the header.
    pub fn from_range(name: impl Into<String>, range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let columns = match rows.next() {
            Some(header) => header
                .iter()
                .enumerate()
                .map(|(i, cell)| header_text(i, cell))
                .collect(),
            None => Vec::new(),
        };
        let rows = rows
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        Self {
            name: name.into(),
            columns,
            rows,
        }
    }
}

/// Lower-cased extension of `filename`, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether `bytes` start like an OOXML/ODS (zip) or legacy XLS (CFB) container.
pub fn looks_like_spreadsheet(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(CFB_MAGIC)
}

/// Pick the scratch-file extension: the filename's own when calamine knows
/// it, `xls` for CFB content, `xlsx` otherwise.
pub fn spreadsheet_extension(filename: &str, bytes: &[u8]) -> String {
    match extension_of(filename) {
        Some(ext) if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) => ext,
        _ if bytes.starts_with(CFB_MAGIC) => "xls".to_string(),
        _ => "xlsx".to_string(),
    }
}

/// Read every sheet, in workbook order, from an in-memory buffer.
pub fn read_sheets_from_bytes(bytes: &[u8]) -> Result<Vec<SheetTable>, AdapterError> {
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    read_sheets(workbook)
}

/// Read every sheet, in workbook order, from a file on disk.
pub fn read_sheets_from_path(path: &Path) -> Result<Vec<SheetTable>, AdapterError> {
    let workbook = open_workbook_auto(path)?;
    read_sheets(workbook)
}

fn read_sheets<RS: Read + Seek>(
    mut workbook: calamine::Sheets<RS>,
) -> Result<Vec<SheetTable>, AdapterError> {
    let names = workbook.sheet_names();
    debug!("Workbook has {} sheets: {:?}", names.len(), names);

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        let table = SheetTable::from_range(name, &range);
        debug!(
            "Sheet {:?}: {} columns, {} rows",
            table.name,
            table.columns.len(),
            table.rows.len()
        );
        tables.push(table);
    }
    Ok(tables)
}

fn header_text(index: usize, cell: &Data) -> String {
    match cell {
        Data::Empty => format!("Unnamed: {index}"),
        other => cell_text(other),
    }
}

/// Render a cell the way a dataframe printout shows it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => MISSING_CELL.to_string(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => timestamp_text(naive),
            None => cell.to_string(),
        },
        Data::Error(e) => e.to_string(),
    }
}

fn timestamp_text(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A workbook copied to a scratch file for path-based readers.
#[derive(Debug)]
pub struct TempWorkbook {
    file: NamedTempFile,
}

impl TempWorkbook {
    /// Write `bytes` to a new temp file ending in `.{extension}`.
    ///
    /// The file lands in `dir` when given, else in the system temp directory.
    pub fn create(bytes: &[u8], extension: &str, dir: Option<&Path>) -> Result<Self, AdapterError> {
        let suffix = format!(".{extension}");
        let mut builder = tempfile::Builder::new();
        builder.prefix("sheet2doc-").suffix(&suffix);
        let created = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        let mut file = created.map_err(|source| AdapterError::TempFile {
            path: dir.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir),
            source,
        })?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|source| AdapterError::TempFile {
                path: file.path().to_path_buf(),
                source,
            })?;

        debug!("Wrote {} bytes to {}", bytes.len(), file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file. Failures are logged and otherwise ignored.
    pub fn release(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            warn!("Failed to remove temporary workbook {}: {}", path.display(), e);
        }
    }
}
