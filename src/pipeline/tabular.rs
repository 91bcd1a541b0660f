//! Tabular-to-PDF adapter: spreadsheet bytes → styled report → PDF.
//!
//! The scratch copy of the workbook is released on every exit path; release
//! problems are logged by [`TempWorkbook::release`] and never reach the
//! caller. Reader and renderer failures become a failed [`PdfResult`].

use crate::config::RenderConfig;
use crate::error::AdapterError;
use crate::output::PdfResult;
use crate::pipeline::html::HtmlReport;
use crate::pipeline::pdf;
use crate::pipeline::workbook::{self, TempWorkbook};
use tracing::{info, warn};

/// Render every sheet of the workbook to a PDF, never failing outward.
pub fn convert_to_pdf(bytes: &[u8], filename: &str, config: &RenderConfig) -> PdfResult {
    match build_report(bytes, filename, config).and_then(|report| pdf::render_pdf(&report, config))
    {
        Ok(pdf_bytes) => {
            info!("PDF rendered for {:?}: {} bytes", filename, pdf_bytes.len());
            PdfResult::rendered(pdf_bytes)
        }
        Err(e) => {
            warn!("PDF rendering failed for {:?}: {}", filename, e);
            PdfResult::failed(e)
        }
    }
}

/// Read the workbook through a scratch file and build the HTML report.
pub fn build_report(
    bytes: &[u8],
    filename: &str,
    config: &RenderConfig,
) -> Result<HtmlReport, AdapterError> {
    let extension = workbook::spreadsheet_extension(filename, bytes);
    let temp = TempWorkbook::create(bytes, &extension, config.temp_dir.as_deref())?;
    let sheets = workbook::read_sheets_from_path(temp.path());
    temp.release();

    Ok(HtmlReport::new(filename, sheets?))
}

/// The report as an HTML string, before PDF rendering.
pub fn render_html(bytes: &[u8], filename: &str, config: &RenderConfig) -> Result<String, AdapterError> {
    build_report(bytes, filename, config).map(|report| report.to_html())
}
