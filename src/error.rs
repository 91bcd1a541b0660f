//! Error types for the sheet2doc library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — **Fatal**: the request cannot be served at all
//!   (malformed JSON, missing `file`, bad base64, an internal fault).
//!   Returned as `Err(ConvertError)` and mapped to a non-200 HTTP status.
//!
//! * [`AdapterError`] — **Non-fatal**: one requested output (Markdown or PDF)
//!   failed, but the other may still be fine. It is downgraded to data inside
//!   [`crate::output::MarkdownResult`] / [`crate::output::PdfResult`] so the
//!   response can report partial success with HTTP 200.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that end a request before a 200 response can be built.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    Validation(String),

    /// The `file` field is not valid base64.
    #[error("Failed to decode base64 file content: {0}")]
    Decode(String),

    /// Unexpected internal fault (panicked task, serialisation failure).
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Whether the fault lies with the caller (4xx) rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ConvertError::Validation(_) | ConvertError::Decode(_))
    }
}

/// A non-fatal failure of a single output adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The document could not be converted to Markdown.
    #[error("Markdown conversion error: {0}")]
    MarkdownConversion(String),

    /// The spreadsheet could not be rendered to PDF.
    #[error("PDF conversion error: {0}")]
    PdfConversion(String),

    /// The spreadsheet reader rejected the workbook or one of its sheets.
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// The scratch file needed by the spreadsheet reader could not be written.
    #[error("Failed to write temporary file '{path}': {source}")]
    TempFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AdapterError {
    /// Re-tag any error as a Markdown-output failure.
    pub fn into_markdown_failure(self) -> AdapterError {
        match self {
            AdapterError::MarkdownConversion(_) => self,
            other => AdapterError::MarkdownConversion(other.to_string()),
        }
    }

    /// Re-tag any error as a PDF-output failure.
    pub fn into_pdf_failure(self) -> AdapterError {
        match self {
            AdapterError::PdfConversion(_) => self,
            other => AdapterError::PdfConversion(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retagging_keeps_inner_message_once() {
        let e = AdapterError::PdfConversion("boom".into()).into_pdf_failure();
        assert_eq!(e.to_string(), "PDF conversion error: boom");

        let e = AdapterError::PdfConversion("boom".into()).into_markdown_failure();
        assert_eq!(
            e.to_string(),
            "Markdown conversion error: PDF conversion error: boom"
        );
    }

    #[test]
    fn validation_message_is_verbatim() {
        let e = ConvertError::Validation("missing file".into());
        assert_eq!(e.to_string(), "missing file");
        assert!(e.is_client_error());
    }

    #[test]
    fn decode_error_is_client_error() {
        let e = ConvertError::Decode("Invalid padding".into());
        assert!(e.to_string().contains("base64"));
        assert!(e.is_client_error());
    }

    #[test]
    fn internal_is_server_error() {
        let e = ConvertError::Internal("task panicked".into());
        assert!(!e.is_client_error());
        assert!(e.to_string().contains("task panicked"));
    }

    #[test]
    fn adapter_messages_carry_output_prefix() {
        let md = AdapterError::MarkdownConversion("unsupported".into());
        let pdf = AdapterError::PdfConversion("no sheets".into());
        assert!(md.to_string().starts_with("Markdown conversion error: "));
        assert!(pdf.to_string().starts_with("PDF conversion error: "));
    }

    #[test]
    fn temp_file_error_names_path() {
        let e = AdapterError::TempFile {
            path: PathBuf::from("/tmp/sheet.xlsx"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/tmp/sheet.xlsx"));
    }
}
