//! Pipeline stages for spreadsheet conversion.
//!
//! Each submodule implements one transformation step so each can be tested
//! on its own and the two output adapters stay independent of each other.
//!
//! ## Data Flow
//!
//! ```text
//!                 ┌──▶ markdown ──▶ postprocess ──────────────┐
//! input ──▶ bytes ┤                                           ├──▶ response
//! (JSON)  (base64)└──▶ tabular ──▶ workbook ──▶ html ──▶ pdf ──┘
//!                      (temp file)  (calamine)        (printpdf)
//! ```
//!
//! 1. [`input`]       — validate the JSON body and decode the base64 payload
//! 2. [`markdown`]    — document → Markdown (spreadsheets, CSV, HTML, text)
//! 3. [`postprocess`] — deterministic text cleanup of the Markdown
//! 4. [`workbook`]    — read sheets via calamine, from memory or a temp file
//! 5. [`tabular`]     — the PDF adapter: temp file → report → PDF
//! 6. [`html`]        — the styled multi-sheet report and its HTML form
//! 7. [`pdf`]         — paginated PDF layout of the report
//! 8. [`encode`]      — base64 transport encoding

pub mod encode;
pub mod html;
pub mod input;
pub mod markdown;
pub mod pdf;
pub mod postprocess;
pub mod tabular;
pub mod workbook;
