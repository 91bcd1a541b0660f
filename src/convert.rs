//! Request orchestration: run the requested adapters and assemble the result.
//!
//! Both adapters are blocking (spreadsheet parsing, PDF layout), so each runs
//! on tokio's blocking pool. They run one after the other; neither sees the
//! other's outcome. A panicking adapter is an internal fault, not a
//! conversion failure, and surfaces as [`ConvertError::Internal`].

use crate::config::RenderConfig;
use crate::error::ConvertError;
use crate::output::{ConversionResponse, MarkdownResult, PdfResult};
use crate::pipeline::input::{self, ConversionRequest};
use crate::pipeline::{markdown, tabular};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a decoded request into a response body.
///
/// # Errors
/// Returns `Err(ConvertError::Internal)` only when an adapter task panics or
/// cannot be scheduled. Adapter failures are reported inside the response.
pub async fn convert(
    request: ConversionRequest,
    config: &RenderConfig,
) -> Result<ConversionResponse, ConvertError> {
    let start = Instant::now();
    info!(
        "Starting conversion: {:?} ({} bytes, format={})",
        request.filename,
        request.file.len(),
        request.format
    );

    let ConversionRequest {
        file,
        filename,
        format,
    } = request;
    let file: Arc<[u8]> = file.into();

    let markdown = if format.includes_markdown() {
        let (file, filename) = (Arc::clone(&file), filename.clone());
        let result = tokio::task::spawn_blocking(move || {
            markdown::convert_to_markdown(&file, &filename)
        })
        .await
        .map_err(|e| ConvertError::Internal(format!("Markdown task panicked: {e}")))?;
        Some(result)
    } else {
        None
    };

    let pdf = if format.includes_pdf() {
        let (file, filename, config) = (Arc::clone(&file), filename.clone(), config.clone());
        let result = tokio::task::spawn_blocking(move || {
            tabular::convert_to_pdf(&file, &filename, &config)
        })
        .await
        .map_err(|e| ConvertError::Internal(format!("PDF task panicked: {e}")))?;
        Some(result)
    } else {
        None
    };

    log_outcome(&markdown, &pdf);
    let response = ConversionResponse::assemble(filename, markdown, pdf);
    info!("Conversion complete in {}ms", start.elapsed().as_millis());
    Ok(response)
}

/// Parse a raw JSON body and convert it.
pub async fn convert_body(
    body: &[u8],
    config: &RenderConfig,
) -> Result<ConversionResponse, ConvertError> {
    let request = input::parse_request(body)?;
    convert(request, config).await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    request: ConversionRequest,
    config: &RenderConfig,
) -> Result<ConversionResponse, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert(request, config))
}

fn log_outcome(markdown: &Option<MarkdownResult>, pdf: &Option<PdfResult>) {
    if let Some(md) = markdown {
        debug!("markdown_success={}", md.success);
    }
    if let Some(pdf) = pdf {
        debug!("pdf_success={}", pdf.success);
    }
}
