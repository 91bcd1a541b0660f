//! # sheet2doc
//!
//! Convert base64-encoded spreadsheets to Markdown and PDF behind a single
//! JSON endpoint.
//!
//! ## Pipeline Overview
//!
//! ```text
//! POST /convert {"file": "<base64>", "filename": "...", "format": "both"}
//!  │
//!  ├─ 1. Input     validate JSON, decode base64
//!  ├─ 2. Markdown  sheets → "## name" + GFM tables (also CSV / HTML / text)
//!  ├─ 3. PDF       temp file → calamine → styled HTML report → printpdf
//!  └─ 4. Assemble  flat JSON with per-output *_success flags
//! ```
//!
//! A failed output never fails the request: the response is still HTTP 200
//! and carries `markdown_success: false` or `pdf_success: false` with an
//! error message. Only malformed requests (400) and internal faults (500)
//! change the status code.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sheet2doc::{convert, parse_request, RenderConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let body = br#"{"file": "YSxiCjEsMgo=", "filename": "data.csv", "format": "markdown"}"#;
//!     let request = parse_request(body)?;
//!     let response = convert(request, &RenderConfig::default()).await?;
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `sheet2doc-server` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PageSize, RenderConfig, RenderConfigBuilder, ServiceConfig, ServiceConfigBuilder};
pub use convert::{convert, convert_body, convert_sync};
pub use error::{AdapterError, ConvertError};
pub use output::{ConversionResponse, MarkdownResult, PdfResult};
pub use pipeline::input::{parse_request, ConversionRequest, OutputFormat};
pub use server::{router, AppState};
