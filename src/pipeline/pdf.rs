//! PDF rendering: lay out an [`HtmlReport`] on paginated pages via printpdf.
//!
//! The renderer paints the same blocks the HTML carries, with the same
//! styling: a blue `<h1>`, bold sheet headings, tables with `#ddd` cell
//! borders and a `#f2f2f2` header row. Table rows never split across pages;
//! a row that does not fit starts a new page and the header row is repeated
//! there, as browsers do for `<thead>`.
//!
//! Every sheet heading also becomes an entry in the PDF outline.
//!
//! ## Fonts
//!
//! Text is set in an embedded TrueType font so sheet names and cells in any
//! script survive: [`RenderConfig::font_path`] when configured, otherwise the
//! first entry of [`SYSTEM_FONTS`] present on the host. Without either the
//! renderer falls back to the Helvetica base font, which printpdf encodes as
//! WinAnsi (Latin-1 only).
//!
//! ## Text measurement
//!
//! printpdf exposes no glyph metrics, so wrapping counts width units: a
//! narrow glyph is one unit of [`CHAR_WIDTH_EM`] of the font size and an
//! East Asian wide glyph is two.

use crate::config::RenderConfig;
use crate::error::AdapterError;
use crate::pipeline::html::HtmlReport;
use crate::pipeline::workbook::SheetTable;
use once_cell::sync::Lazy;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, PdfPageIndex, Rect, Rgb,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PT_TO_MM: f32 = 0.352_778;
/// Advance of one width unit (a narrow glyph) as a fraction of the font size.
const CHAR_WIDTH_EM: f32 = 0.55;
const LINE_SPACING: f32 = 1.25;
/// Distance from the top of a line box to the text baseline, in ems.
const ASCENT_EM: f32 = 0.8;
const MAX_HEADER_LINES: usize = 4;

const H1_SCALE: f32 = 2.0;
const H2_SCALE: f32 = 1.55;
const SHEET_GAP_BEFORE_MM: f32 = 8.0;
const SHEET_GAP_AFTER_MM: f32 = 2.6;
const TABLE_GAP_AFTER_MM: f32 = 5.3;
const BORDER_PT: f32 = 0.75;

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn heading_blue() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.4, 0.8, None))
}

fn header_shading() -> Color {
    Color::Rgb(Rgb::new(0.949, 0.949, 0.949, None))
}

fn border_grey() -> Color {
    Color::Rgb(Rgb::new(0.867, 0.867, 0.867, None))
}

// ── Fonts ────────────────────────────────────────────────────────────────

/// Unicode TrueType fonts probed when none is configured, as
/// `(regular, bold)`. Japanese and CJK fallback faces come first.
pub const SYSTEM_FONTS: &[(&str, Option<&str>)] = &[
    ("/usr/share/fonts/opentype/ipaexfont-gothic/ipaexg.ttf", None),
    ("/usr/share/fonts/truetype/fonts-japanese-gothic.ttf", None),
    ("/usr/share/fonts/truetype/takao-gothic/TakaoPGothic.ttf", None),
    ("/usr/share/fonts/truetype/vlgothic/VL-PGothic-Regular.ttf", None),
    ("/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf", None),
    ("/Library/Fonts/Arial Unicode.ttf", None),
    ("/System/Library/Fonts/Supplemental/Arial Unicode.ttf", None),
    (r"C:\Windows\Fonts\arialuni.ttf", None),
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        Some("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        Some("/usr/share/fonts/TTF/DejaVuSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        Some("/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf"),
    ),
];

static SYSTEM_FONT: Lazy<Option<FontFiles>> = Lazy::new(|| {
    let found = SYSTEM_FONTS
        .iter()
        .find(|(regular, _)| Path::new(regular).is_file())
        .map(|(regular, bold)| FontFiles {
            regular: PathBuf::from(regular),
            bold: bold.map(PathBuf::from).filter(|p| p.is_file()),
        });
    match &found {
        Some(files) => debug!("Using system font {}", files.regular.display()),
        None => warn!("No Unicode TrueType font found; PDF text is limited to Latin-1"),
    }
    found
});

/// Font files to embed into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FontFiles {
    regular: PathBuf,
    bold: Option<PathBuf>,
}

impl FontFiles {
    fn resolve(config: &RenderConfig) -> Option<FontFiles> {
        match &config.font_path {
            Some(regular) => Some(FontFiles {
                regular: regular.clone(),
                bold: config.bold_font_path.clone(),
            }),
            None => SYSTEM_FONT.clone(),
        }
    }
}

/// Add the `(regular, bold)` fonts to `doc`.
fn load_fonts(
    doc: &PdfDocumentReference,
    config: &RenderConfig,
) -> Result<(IndirectFontRef, IndirectFontRef), AdapterError> {
    let Some(files) = FontFiles::resolve(config) else {
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AdapterError::PdfConversion(format!("font setup failed: {e:?}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AdapterError::PdfConversion(format!("font setup failed: {e:?}")))?;
        return Ok((regular, bold));
    };

    let regular = embed_font(doc, &files.regular)?;
    let bold = match &files.bold {
        Some(path) => embed_font(doc, path)?,
        None => regular.clone(),
    };
    Ok((regular, bold))
}

fn embed_font(doc: &PdfDocumentReference, path: &Path) -> Result<IndirectFontRef, AdapterError> {
    let file = File::open(path).map_err(|e| {
        AdapterError::PdfConversion(format!("cannot open font {}: {e}", path.display()))
    })?;
    doc.add_external_font(BufReader::new(file)).map_err(|e| {
        AdapterError::PdfConversion(format!("cannot embed font {}: {e:?}", path.display()))
    })
}

/// Render the report to PDF bytes.
pub fn render_pdf(report: &HtmlReport, config: &RenderConfig) -> Result<Vec<u8>, AdapterError> {
    let mut layout = PageLayout::new(&report.title, config)?;

    layout.heading(&report.title, H1_SCALE, heading_blue(), 0.0);
    for sheet in &report.sheets {
        layout.sheet(sheet);
    }

    let pages = layout.page_count;
    let bytes = layout.finish()?;
    debug!(
        "Rendered {} sheets on {} pages → {} PDF bytes",
        report.sheets.len(),
        pages,
        bytes.len()
    );
    Ok(bytes)
}

/// Cursor-based writer over a growing printpdf document.
struct PageLayout {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    page: PdfPageIndex,
    /// printpdf keeps one outline entry per page.
    page_bookmarked: bool,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    page_w: f32,
    page_h: f32,
    margin: f32,
    body_pt: f32,
    /// Current vertical position, in mm from the page bottom.
    y: f32,
    page_count: usize,
}

impl PageLayout {
    fn new(title: &str, config: &RenderConfig) -> Result<Self, AdapterError> {
        let (page_w, page_h) = config.page_size.dimensions_mm();
        let (doc, page, layer) = PdfDocument::new(title, Mm(page_w), Mm(page_h), "Page 1");
        let (regular, bold) = load_fonts(&doc, config)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            page,
            page_bookmarked: false,
            regular,
            bold,
            page_w,
            page_h,
            margin: config.margin_mm,
            body_pt: config.body_font_size,
            y: page_h - config.margin_mm,
            page_count: 1,
        })
    }

    fn content_width(&self) -> f32 {
        self.page_w - 2.0 * self.margin
    }

    fn content_height(&self) -> f32 {
        self.page_h - 2.0 * self.margin
    }

    fn at_page_top(&self) -> bool {
        self.y >= self.page_h - self.margin
    }

    fn new_page(&mut self) {
        self.page_count += 1;
        let (page, layer) = self.doc.add_page(
            Mm(self.page_w),
            Mm(self.page_h),
            format!("Page {}", self.page_count),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page = page;
        self.page_bookmarked = false;
        self.y = self.page_h - self.margin;
    }

    /// Add an outline entry for the current page unless it already has one.
    fn bookmark(&mut self, title: &str) {
        if !self.page_bookmarked {
            self.doc.add_bookmark(title, self.page);
            self.page_bookmarked = true;
        }
    }

    /// Start a new page unless `height` mm still fit above the bottom margin.
    fn ensure_space(&mut self, height: f32) -> bool {
        if self.y - height < self.margin && !self.at_page_top() {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn heading(&mut self, text: &str, scale: f32, color: Color, gap_before: f32) {
        let size_pt = self.body_pt * scale;
        let size_mm = size_pt * PT_TO_MM;
        let line_h = size_mm * LINE_SPACING;
        let lines = wrap(text, units_per_line(self.content_width(), size_mm));

        if !self.at_page_top() {
            self.y -= gap_before;
        }
        self.ensure_space(line_h * lines.len() as f32);

        self.layer.set_fill_color(color);
        for line in &lines {
            let baseline = self.y - size_mm * ASCENT_EM;
            self.layer
                .use_text(line.as_str(), size_pt, Mm(self.margin), Mm(baseline), &self.bold);
            self.y -= line_h;
        }
        self.layer.set_fill_color(black());
    }

    fn sheet(&mut self, sheet: &SheetTable) {
        let font_mm = self.body_pt * PT_TO_MM;
        let min_row = font_mm * LINE_SPACING + 2.0 * cell_padding(font_mm);
        let heading_h = self.body_pt * H2_SCALE * PT_TO_MM * LINE_SPACING;

        // Keep the heading on the same page as the header row and one data row.
        if !self.at_page_top() {
            self.ensure_space(SHEET_GAP_BEFORE_MM + heading_h + 2.0 * min_row);
        }
        let heading = HtmlReport::sheet_heading(sheet);
        self.heading(&heading, H2_SCALE, black(), SHEET_GAP_BEFORE_MM);
        self.bookmark(&heading);
        self.y -= SHEET_GAP_AFTER_MM;
        self.table(sheet);
        self.y -= TABLE_GAP_AFTER_MM;
    }

    fn table(&mut self, sheet: &SheetTable) {
        let columns = sheet.columns.len();
        if columns == 0 {
            return;
        }

        let font_mm = self.body_pt * PT_TO_MM;
        let pad = cell_padding(font_mm);
        let line_h = font_mm * LINE_SPACING;
        let col_w = self.content_width() / columns as f32;
        let max_units = units_per_line(col_w - 2.0 * pad, font_mm);

        let header = wrap_row(
            sheet.columns.iter().map(String::as_str),
            max_units,
            MAX_HEADER_LINES,
        );
        let header_h = row_height(&header, line_h, pad);

        // A single row may use whatever a fresh page leaves under the header.
        let max_body_lines =
            (((self.content_height() - header_h - 2.0 * pad) / line_h).floor() as usize).max(1);

        self.ensure_space(header_h + line_h + 2.0 * pad);
        self.draw_row(&header, col_w, header_h, true);

        for row in &sheet.rows {
            let cells = (0..columns).map(|i| row.get(i).map(String::as_str).unwrap_or(""));
            let lines = wrap_row(cells, max_units, max_body_lines);
            let h = row_height(&lines, line_h, pad);
            if self.ensure_space(h) {
                self.draw_row(&header, col_w, header_h, true);
            }
            self.draw_row(&lines, col_w, h, false);
        }
    }

    fn draw_row(&mut self, cells: &[Vec<String>], col_w: f32, height: f32, is_header: bool) {
        let font_mm = self.body_pt * PT_TO_MM;
        let pad = cell_padding(font_mm);
        let line_h = font_mm * LINE_SPACING;
        let top = self.y;
        let bottom = top - height;
        let left = self.margin;
        let right = left + col_w * cells.len() as f32;

        if is_header {
            self.layer.set_fill_color(header_shading());
            self.layer.add_rect(
                Rect::new(Mm(left), Mm(bottom), Mm(right), Mm(top)).with_mode(PaintMode::Fill),
            );
        }

        self.layer.set_outline_color(border_grey());
        self.layer.set_outline_thickness(BORDER_PT);
        for i in 0..cells.len() {
            let x = left + col_w * i as f32;
            self.layer.add_rect(
                Rect::new(Mm(x), Mm(bottom), Mm(x + col_w), Mm(top)).with_mode(PaintMode::Stroke),
            );
        }

        self.layer.set_fill_color(black());
        let font = if is_header { &self.bold } else { &self.regular };
        for (i, lines) in cells.iter().enumerate() {
            let x = left + col_w * i as f32 + pad;
            for (j, line) in lines.iter().enumerate() {
                let baseline = top - pad - font_mm * ASCENT_EM - line_h * j as f32;
                self.layer
                    .use_text(line.as_str(), self.body_pt, Mm(x), Mm(baseline), font);
            }
        }

        self.y = bottom;
    }

    fn finish(self) -> Result<Vec<u8>, AdapterError> {
        let PageLayout { doc, layer, .. } = self;
        drop(layer);
        doc.save_to_bytes()
            .map_err(|e| AdapterError::PdfConversion(format!("failed to serialise PDF: {e:?}")))
    }
}

/// 8px of CSS padding at 12pt scales to two-thirds of the font size.
fn cell_padding(font_mm: f32) -> f32 {
    font_mm * 0.67
}

fn units_per_line(width_mm: f32, font_mm: f32) -> usize {
    ((width_mm / (font_mm * CHAR_WIDTH_EM)).floor() as usize).max(1)
}

fn row_height(cells: &[Vec<String>], line_h: f32, pad: f32) -> f32 {
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
    lines as f32 * line_h + 2.0 * pad
}

fn wrap_row<'a>(
    cells: impl Iterator<Item = &'a str>,
    max_units: usize,
    max_lines: usize,
) -> Vec<Vec<String>> {
    cells
        .map(|cell| {
            let mut lines = wrap(cell, max_units);
            if lines.len() > max_lines {
                lines.truncate(max_lines);
                if let Some(last) = lines.last_mut() {
                    mark_truncated(last, max_units);
                }
            }
            lines
        })
        .collect()
}

fn mark_truncated(line: &mut String, max_units: usize) {
    let kept = split_at_units(line, max_units.saturating_sub(3)).0.to_string();
    *line = format!("{kept}...");
}

/// Greedy word wrap to `max_units` width units per line; over-long words
/// (and unspaced CJK runs) are split.
pub(crate) fn wrap(text: &str, max_units: usize) -> Vec<String> {
    let max_units = max_units.max(1);
    let mut lines = Vec::new();

    for paragraph in normalise_whitespace(text).split('\n') {
        let mut current = String::new();
        let mut current_units = 0;
        for word in paragraph.split_whitespace() {
            let mut rest = word;
            while text_units(rest) > max_units {
                if current_units > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_units = 0;
                }
                let (head, tail) = split_at_units(rest, max_units);
                lines.push(head.to_string());
                rest = tail;
            }
            if rest.is_empty() {
                continue;
            }
            let width = text_units(rest);
            let needed = if current_units == 0 { width } else { current_units + 1 + width };
            if needed > max_units {
                lines.push(std::mem::take(&mut current));
                current_units = 0;
            }
            if current_units > 0 {
                current.push(' ');
                current_units += 1;
            }
            current.push_str(rest);
            current_units += width;
        }
        if current_units > 0 || lines.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Longest prefix of `word` within `max_units`, always at least one char.
fn split_at_units(word: &str, max_units: usize) -> (&str, &str) {
    let mut used = 0;
    for (i, c) in word.char_indices() {
        let w = char_units(c);
        if i > 0 && used + w > max_units {
            return word.split_at(i);
        }
        used += w;
    }
    (word, "")
}

fn text_units(text: &str) -> usize {
    text.chars().map(char_units).sum()
}

fn char_units(c: char) -> usize {
    if is_wide(c) {
        2
    } else {
        1
    }
}

/// East Asian wide and fullwidth ranges.
fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x3FFFD
    )
}

/// Tabs, carriage returns and other control characters become spaces.
fn normalise_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| if c != '\n' && c.is_control() { ' ' } else { c })
        .collect()
}
