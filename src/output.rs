//! Result and response types.
//!
//! Each adapter returns a tagged result ([`MarkdownResult`], [`PdfResult`])
//! instead of an error so that one output's failure never hides the other's
//! success. [`ConversionResponse::assemble`] merges whichever results were
//! requested into the flat JSON body returned by `POST /convert`.

use crate::error::AdapterError;
use crate::pipeline::encode;
use serde::{Deserialize, Deserializer, Serialize};

/// Outcome of the Markdown extraction adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownResult {
    pub success: bool,
    pub title: Option<String>,
    pub content: Option<String>,
    pub error: Option<String>,
}

impl MarkdownResult {
    pub fn converted(title: Option<String>, content: String) -> Self {
        Self {
            success: true,
            title,
            content: Some(content),
            error: None,
        }
    }

    pub fn failed(error: AdapterError) -> Self {
        Self {
            success: false,
            title: None,
            content: None,
            error: Some(error.into_markdown_failure().to_string()),
        }
    }
}

/// Outcome of the tabular-to-PDF renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfResult {
    pub success: bool,
    /// Raw PDF bytes; base64-encoded only when the response is assembled.
    pub content: Option<Vec<u8>>,
    pub error: Option<String>,
}

impl PdfResult {
    pub fn rendered(bytes: Vec<u8>) -> Self {
        Self {
            success: true,
            content: Some(bytes),
            error: None,
        }
    }

    pub fn failed(error: AdapterError) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(error.into_pdf_failure().to_string()),
        }
    }
}

/// JSON body of a 200 response.
///
/// Only the fields of requested outputs are present. `markdown_title` is
/// emitted as `null` when the converter found no title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub original_filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_success: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_nullable"
    )]
    pub markdown_title: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_success: Option<bool>,
    /// Base64 (standard alphabet) PDF bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_error: Option<String>,
}

/// A key that is present maps to `Some`, even when its value is `null`.
fn present_nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl ConversionResponse {
    /// Merge the requested adapters' results under `original_filename`.
    pub fn assemble(
        original_filename: impl Into<String>,
        markdown: Option<MarkdownResult>,
        pdf: Option<PdfResult>,
    ) -> Self {
        let mut response = ConversionResponse {
            original_filename: original_filename.into(),
            ..Default::default()
        };

        if let Some(md) = markdown {
            response.markdown_success = Some(md.success);
            if md.success {
                response.markdown_title = Some(md.title);
                response.markdown_content = md.content;
            } else {
                response.markdown_error = md.error;
            }
        }

        if let Some(pdf) = pdf {
            response.pdf_success = Some(pdf.success);
            if pdf.success {
                response.pdf_content = pdf.content.as_deref().map(encode::encode_base64);
            } else {
                response.pdf_error = pdf.error;
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn only_filename_when_nothing_requested() {
        let r = ConversionResponse::assemble("book.xlsx", None, None);
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({ "original_filename": "book.xlsx" })
        );
    }

    #[test]
    fn markdown_success_emits_null_title() {
        let md = MarkdownResult::converted(None, "## Sheet1\n".into());
        let v = serde_json::to_value(ConversionResponse::assemble("d", Some(md), None)).unwrap();
        assert_eq!(v["markdown_success"], json!(true));
        assert_eq!(v["markdown_title"], Value::Null);
        assert!(v.as_object().unwrap().contains_key("markdown_title"));
        assert_eq!(v["markdown_content"], json!("## Sheet1\n"));
        assert!(v.get("markdown_error").is_none());
        assert!(v.get("pdf_success").is_none());
    }

    #[test]
    fn pdf_failure_keeps_markdown_success() {
        let md = MarkdownResult::converted(Some("Report".into()), "text\n".into());
        let pdf = PdfResult::failed(AdapterError::PdfConversion("no sheets".into()));
        let v = serde_json::to_value(ConversionResponse::assemble("d", Some(md), Some(pdf)))
            .unwrap();
        assert_eq!(v["markdown_success"], json!(true));
        assert_eq!(v["markdown_title"], json!("Report"));
        assert_eq!(v["pdf_success"], json!(false));
        assert_eq!(v["pdf_error"], json!("PDF conversion error: no sheets"));
        assert!(v.get("pdf_content").is_none());
    }

    #[test]
    fn pdf_bytes_are_base64_encoded() {
        let pdf = PdfResult::rendered(b"%PDF-1.3".to_vec());
        let r = ConversionResponse::assemble("d", None, Some(pdf));
        assert_eq!(r.pdf_content.as_deref(), Some("JVBERi0xLjM="));
    }

    #[test]
    fn markdown_failure_has_only_error() {
        let md = MarkdownResult::failed(AdapterError::MarkdownConversion("bad".into()));
        let v = serde_json::to_value(ConversionResponse::assemble("d", Some(md), None)).unwrap();
        assert_eq!(v["markdown_success"], json!(false));
        assert!(v.get("markdown_title").is_none());
        assert!(v.get("markdown_content").is_none());
        assert_eq!(v["markdown_error"], json!("Markdown conversion error: bad"));
    }

    #[test]
    fn null_title_survives_round_trip() {
        let md = MarkdownResult::converted(None, "x\n".into());
        let r = ConversionResponse::assemble("d", Some(md), None);
        let back: ConversionResponse =
            serde_json::from_str(&serde_json::to_string(&r).unwrap()).unwrap();
        assert_eq!(back.markdown_title, Some(None));
    }
}
