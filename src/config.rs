//! Configuration types for the conversion service.
//!
//! Rendering knobs live in [`RenderConfig`]; the HTTP surface adds its own
//! settings in [`ServiceConfig`]. Both are built through builders so callers
//! set only what they care about and rely on documented defaults for the rest.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration for the Markdown and PDF adapters.
///
/// # Example
/// ```rust
/// use sheet2doc::{PageSize, RenderConfig};
///
/// let config = RenderConfig::builder()
///     .page_size(PageSize::A4Landscape)
///     .margin_mm(12.0)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Paper format of the generated PDF. Default: A4 portrait.
    pub page_size: PageSize,

    /// Page margin on every side, in millimetres. Range: 5–50. Default: 15.
    pub margin_mm: f32,

    /// Font size of table cells, in points. Range: 5–24. Default: 9.
    ///
    /// The `<h1>`/`<h2>` headings scale from this value.
    pub body_font_size: f32,

    /// Directory for the scratch copy of the workbook. Default: system temp dir.
    pub temp_dir: Option<PathBuf>,

    /// TrueType font embedded for PDF text.
    ///
    /// Default: the first known Unicode font installed on the host (CJK faces
    /// are tried first), else the PDF base font Helvetica, which only covers
    /// Latin-1.
    pub font_path: Option<PathBuf>,

    /// TrueType font for headings and header rows. Default: `font_path`.
    pub bold_font_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margin_mm: 15.0,
            body_font_size: 9.0,
            temp_dir: None,
            font_path: None,
            bold_font_path: None,
        }
    }
}

impl RenderConfig {
    /// Create a new builder for `RenderConfig`.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RenderConfig`].
#[derive(Debug)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn margin_mm(mut self, mm: f32) -> Self {
        self.config.margin_mm = mm;
        self
    }

    pub fn body_font_size(mut self, pt: f32) -> Self {
        self.config.body_font_size = pt;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = Some(path.into());
        self
    }

    pub fn bold_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.bold_font_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenderConfig, ConvertError> {
        let c = &self.config;
        if c.bold_font_path.is_some() && c.font_path.is_none() {
            return Err(ConvertError::Validation(
                "A bold font requires a regular font".into(),
            ));
        }
        for path in [&c.font_path, &c.bold_font_path].into_iter().flatten() {
            if !path.is_file() {
                return Err(ConvertError::Validation(format!(
                    "Font file not found: {}",
                    path.display()
                )));
            }
        }
        if !(5.0..=50.0).contains(&c.margin_mm) {
            return Err(ConvertError::Validation(format!(
                "Page margin must be 5–50 mm, got {}",
                c.margin_mm
            )));
        }
        if !(5.0..=24.0).contains(&c.body_font_size) {
            return Err(ConvertError::Validation(format!(
                "Body font size must be 5–24 pt, got {}",
                c.body_font_size
            )));
        }
        Ok(self.config)
    }
}

/// Configuration of the HTTP server binary.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Socket address to listen on. Default: `0.0.0.0:8080`.
    pub bind_addr: SocketAddr,

    /// Largest accepted request body, in bytes. Default: 64 MiB.
    ///
    /// Base64 inflates payloads by a third, so this admits workbooks of
    /// roughly 48 MiB.
    pub max_body_bytes: usize,

    /// Adapter configuration shared by every request.
    pub render: RenderConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_body_bytes: 64 * 1024 * 1024,
            render: RenderConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    pub fn max_body_bytes(mut self, n: usize) -> Self {
        self.config.max_body_bytes = n;
        self
    }

    pub fn render(mut self, render: RenderConfig) -> Self {
        self.config.render = render;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, ConvertError> {
        if self.config.max_body_bytes == 0 {
            return Err(ConvertError::Validation(
                "Maximum body size must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Paper format of the rendered PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// 210 × 297 mm (default).
    #[default]
    A4Portrait,
    /// 297 × 210 mm, for wide sheets.
    A4Landscape,
    /// 8.5 × 11 in.
    LetterPortrait,
    /// 11 × 8.5 in.
    LetterLandscape,
}

impl PageSize {
    /// Page `(width, height)` in millimetres.
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::A4Portrait => (210.0, 297.0),
            PageSize::A4Landscape => (297.0, 210.0),
            PageSize::LetterPortrait => (215.9, 279.4),
            PageSize::LetterLandscape => (279.4, 215.9),
        }
    }
}

impl std::str::FromStr for PageSize {
    type Err = ConvertError;

    /// Parse `a4`, `a4-landscape`, `letter`, or `letter-landscape`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" | "a4-portrait" => Ok(PageSize::A4Portrait),
            "a4-landscape" => Ok(PageSize::A4Landscape),
            "letter" | "letter-portrait" => Ok(PageSize::LetterPortrait),
            "letter-landscape" => Ok(PageSize::LetterLandscape),
            other => Err(ConvertError::Validation(format!(
                "Unknown page size '{other}'; expected a4, a4-landscape, letter or letter-landscape"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let c = RenderConfig::builder().build().unwrap();
        assert_eq!(c.page_size, PageSize::A4Portrait);
        assert!(c.temp_dir.is_none());
        assert!(c.font_path.is_none());
    }

    #[test]
    fn margin_out_of_range_rejected() {
        let err = RenderConfig::builder().margin_mm(1.0).build().unwrap_err();
        assert!(err.to_string().contains("margin"));
    }

    #[test]
    fn font_size_out_of_range_rejected() {
        assert!(RenderConfig::builder().body_font_size(40.0).build().is_err());
    }

    #[test]
    fn missing_font_file_rejected() {
        let err = RenderConfig::builder()
            .font_path("/nonexistent/sheet2doc/font.ttf")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Font file not found"));
    }

    #[test]
    fn bold_font_alone_rejected() {
        let font = tempfile::NamedTempFile::new().unwrap();
        assert!(RenderConfig::builder()
            .bold_font_path(font.path())
            .build()
            .is_err());
    }

    #[test]
    fn zero_body_limit_rejected() {
        assert!(ServiceConfig::builder().max_body_bytes(0).build().is_err());
    }

    #[test]
    fn page_size_parsing() {
        assert_eq!("A4".parse::<PageSize>().unwrap(), PageSize::A4Portrait);
        assert_eq!(
            "letter-landscape".parse::<PageSize>().unwrap(),
            PageSize::LetterLandscape
        );
        assert!("tabloid".parse::<PageSize>().is_err());
    }

    #[test]
    fn landscape_swaps_dimensions() {
        let (w, h) = PageSize::A4Portrait.dimensions_mm();
        assert_eq!(PageSize::A4Landscape.dimensions_mm(), (h, w));
    }
}
