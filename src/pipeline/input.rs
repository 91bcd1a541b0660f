//! Request decoding: JSON body → validated [`ConversionRequest`].
//!
//! Validation order matters to callers: the body shape and `format` are
//! checked before the (potentially large) base64 payload is decoded, so a
//! bad `format` is always reported as such, never as a decode error.

use crate::error::ConvertError;
use crate::pipeline::encode;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Filename used when the request does not name one.
pub const DEFAULT_FILENAME: &str = "document";

/// Which outputs the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Markdown,
    Pdf,
    /// Both Markdown and PDF (default).
    #[default]
    Both,
}

impl OutputFormat {
    pub fn includes_markdown(self) -> bool {
        matches!(self, OutputFormat::Markdown | OutputFormat::Both)
    }

    pub fn includes_pdf(self) -> bool {
        matches!(self, OutputFormat::Pdf | OutputFormat::Both)
    }
}

impl FromStr for OutputFormat {
    type Err = ConvertError;

    /// Case-insensitive: `"PDF"` and `"pdf"` are the same format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" => Ok(OutputFormat::Markdown),
            "pdf" => Ok(OutputFormat::Pdf),
            "both" => Ok(OutputFormat::Both),
            _ => Err(invalid_format()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Both => "both",
        })
    }
}

/// A decoded, validated conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Raw workbook bytes.
    pub file: Vec<u8>,
    /// Original filename, echoed back and used as a format hint.
    pub filename: String,
    pub format: OutputFormat,
}

fn invalid_format() -> ConvertError {
    ConvertError::Validation(
        "The format parameter must be 'markdown', 'pdf', or 'both'".to_string(),
    )
}

fn missing_file() -> ConvertError {
    ConvertError::Validation(
        "Include the base64-encoded file in the request body as 'file'".to_string(),
    )
}

/// Parse and validate a raw request body.
pub fn parse_request(body: &[u8]) -> Result<ConversionRequest, ConvertError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ConvertError::Validation(format!("Request body must be valid JSON: {e}")))?;

    match value {
        Value::Object(fields) => decode_fields(&fields),
        _ => Err(missing_file()),
    }
}

/// Validate the fields of a JSON object body and decode `file`.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<ConversionRequest, ConvertError> {
    let file = fields.get("file").ok_or_else(missing_file)?;

    let filename = match fields.get("filename") {
        None | Some(Value::Null) => DEFAULT_FILENAME.to_string(),
        Some(Value::String(s)) => s.clone(),
        // Echoed back as its JSON text, e.g. `42` or `true`.
        Some(other) => other.to_string(),
    };

    let format = match fields.get("format") {
        None | Some(Value::Null) => OutputFormat::default(),
        Some(Value::String(s)) => s.parse()?,
        Some(_) => return Err(invalid_format()),
    };

    let encoded = file
        .as_str()
        .ok_or_else(|| ConvertError::Decode("'file' must be a base64 string".to_string()))?;
    let file = encode::decode_base64(encoded).map_err(|e| ConvertError::Decode(e.to_string()))?;

    debug!(
        "Decoded request: filename={:?} format={} bytes={}",
        filename,
        format,
        file.len()
    );

    Ok(ConversionRequest {
        file,
        filename,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> Result<ConversionRequest, ConvertError> {
        parse_request(v.to_string().as_bytes())
    }

    #[test]
    fn defaults_applied() {
        let req = parse(json!({ "file": "aGk=" })).unwrap();
        assert_eq!(req.file, b"hi");
        assert_eq!(req.filename, "document");
        assert_eq!(req.format, OutputFormat::Both);
    }

    #[test]
    fn format_is_case_insensitive() {
        let req = parse(json!({ "file": "aGk=", "format": "PDF" })).unwrap();
        assert_eq!(req.format, OutputFormat::Pdf);
    }

    #[test]
    fn missing_file_is_validation_error() {
        let err = parse(json!({ "filename": "a.xlsx" })).unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)));
    }

    #[test]
    fn empty_object_is_validation_error() {
        assert!(matches!(parse(json!({})), Err(ConvertError::Validation(_))));
    }

    #[test]
    fn non_object_body_is_validation_error() {
        assert!(matches!(parse(json!([1, 2])), Err(ConvertError::Validation(_))));
        assert!(matches!(
            parse_request(b"not json"),
            Err(ConvertError::Validation(_))
        ));
    }

    #[test]
    fn invalid_format_checked_before_decoding() {
        let err = parse(json!({ "file": "%%%", "format": "invalid" })).unwrap_err();
        assert!(matches!(err, ConvertError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn bad_base64_is_decode_error() {
        for format in ["markdown", "pdf", "both"] {
            let err = parse(json!({ "file": "%%%", "format": format })).unwrap_err();
            assert!(matches!(err, ConvertError::Decode(_)));
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn non_string_file_is_decode_error() {
        let err = parse(json!({ "file": 42 })).unwrap_err();
        assert!(matches!(err, ConvertError::Decode(_)));
    }

    #[test]
    fn null_filename_falls_back_to_default() {
        let req = parse(json!({ "file": "", "filename": null })).unwrap();
        assert_eq!(req.filename, DEFAULT_FILENAME);
        assert!(req.file.is_empty());
    }

    #[test]
    fn non_string_filename_is_echoed_as_json_text() {
        let req = parse(json!({ "file": "", "filename": 42 })).unwrap();
        assert_eq!(req.filename, "42");
        let req = parse(json!({ "file": "", "filename": true })).unwrap();
        assert_eq!(req.filename, "true");
    }

    #[test]
    fn format_flags() {
        assert!(OutputFormat::Both.includes_markdown() && OutputFormat::Both.includes_pdf());
        assert!(!OutputFormat::Markdown.includes_pdf());
        assert!(!OutputFormat::Pdf.includes_markdown());
    }
}
