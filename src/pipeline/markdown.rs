//! Markdown extraction adapter.
//!
//! A generic "document → Markdown" converter: the filename extension picks a
//! [`DocumentKind`], with content sniffing as the fallback for extension-less
//! names such as the default `"document"`. Every failure is caught here and
//! returned as a failed [`MarkdownResult`] so the PDF output is never blocked
//! by a Markdown problem.

use crate::error::AdapterError;
use crate::output::MarkdownResult;
use crate::pipeline::postprocess;
use crate::pipeline::workbook::{self, SheetTable};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

/// The converter family chosen for an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Spreadsheet,
    Csv,
    Html,
    PlainText,
}

impl DocumentKind {
    /// Choose a converter from the filename, falling back to the content.
    pub fn detect(filename: &str, bytes: &[u8]) -> Option<Self> {
        match workbook::extension_of(filename).as_deref() {
            Some(ext) if workbook::SPREADSHEET_EXTENSIONS.contains(&ext) => {
                return Some(DocumentKind::Spreadsheet)
            }
            Some("csv") => return Some(DocumentKind::Csv),
            Some("html" | "htm") => return Some(DocumentKind::Html),
            Some("txt" | "md" | "markdown" | "json" | "xml") => {
                return Some(DocumentKind::PlainText)
            }
            _ => {}
        }

        if workbook::looks_like_spreadsheet(bytes) {
            Some(DocumentKind::Spreadsheet)
        } else if std::str::from_utf8(bytes).is_ok() {
            Some(DocumentKind::PlainText)
        } else {
            None
        }
    }
}

/// Convert `bytes` to Markdown, never failing outward.
pub fn convert_to_markdown(bytes: &[u8], filename: &str) -> MarkdownResult {
    match extract(bytes, filename) {
        Ok((title, content)) => {
            info!("Markdown extracted from {:?}: {} chars", filename, content.len());
            MarkdownResult::converted(title, postprocess::clean_markdown(&content))
        }
        Err(e) => {
            warn!("Markdown extraction failed for {:?}: {}", filename, e);
            MarkdownResult::failed(e)
        }
    }
}

fn extract(bytes: &[u8], filename: &str) -> Result<(Option<String>, String), AdapterError> {
    let kind = DocumentKind::detect(filename, bytes).ok_or_else(|| {
        AdapterError::MarkdownConversion(format!("unsupported document format for '{filename}'"))
    })?;
    debug!("Converting {:?} as {:?}", filename, kind);

    match kind {
        DocumentKind::Spreadsheet => {
            let sheets = workbook::read_sheets_from_bytes(bytes)?;
            Ok((None, sheets_to_markdown(&sheets)))
        }
        DocumentKind::Csv => Ok((None, csv_to_markdown(bytes)?)),
        DocumentKind::Html => {
            let html = utf8(bytes)?;
            Ok((html_title(html), html2md::parse_html(html)))
        }
        DocumentKind::PlainText => Ok((None, utf8(bytes)?.to_string())),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, AdapterError> {
    std::str::from_utf8(bytes)
        .map_err(|e| AdapterError::MarkdownConversion(format!("document is not valid UTF-8: {e}")))
}

/// Every sheet as `## <name>` followed by a GFM table.
pub fn sheets_to_markdown(sheets: &[SheetTable]) -> String {
    let mut out = String::new();
    for sheet in sheets {
        out.push_str("## ");
        out.push_str(&sheet.name);
        out.push('\n');
        out.push_str(&markdown_table(&sheet.columns, &sheet.rows));
        out.push('\n');
    }
    out
}

fn csv_to_markdown(bytes: &[u8]) -> Result<String, AdapterError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records();
    let columns: Vec<String> = match records.next() {
        Some(header) => header
            .map_err(|e| AdapterError::MarkdownConversion(format!("invalid CSV: {e}")))?
            .iter()
            .map(str::to_string)
            .collect(),
        None => return Ok(String::new()),
    };

    let mut rows = Vec::new();
    for record in records {
        let record =
            record.map_err(|e| AdapterError::MarkdownConversion(format!("invalid CSV: {e}")))?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    Ok(markdown_table(&columns, &rows))
}

/// Render a GFM table. Rows are padded or cut to the header width.
pub fn markdown_table(columns: &[String], rows: &[Vec<String>]) -> String {
    if columns.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    push_row(&mut out, columns.iter().map(String::as_str));
    push_row(&mut out, columns.iter().map(|_| "---"));
    for row in rows {
        push_row(
            &mut out,
            (0..columns.len()).map(|i| row.get(i).map(String::as_str).unwrap_or("")),
        );
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(&escape_cell(cell));
        out.push_str(" |");
    }
    out.push('\n');
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}

static RE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

fn html_title(html: &str) -> Option<String> {
    RE_TITLE
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
        .filter(|t| !t.is_empty())
}
