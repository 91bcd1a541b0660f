//! Styled multi-sheet HTML report.
//!
//! [`HtmlReport`] is the document the PDF renderer lays out: one `<h1>` with
//! the original filename, then per sheet an `<h2>Sheet: <name></h2>` and a
//! table whose header row holds the column names (no index column). The same
//! structure is painted by [`crate::pipeline::pdf`], so the HTML string and
//! the PDF always agree on headings, sheet order and cell text.
//!
//! The PDF path never parses the HTML string: printpdf draws from the
//! [`HtmlReport`] model itself, as no HTML layout engine is in the stack.
//! [`HtmlReport::to_html`] is the inspectable form of the same document,
//! exposed through [`crate::pipeline::tabular::render_html`].

use crate::pipeline::workbook::SheetTable;

/// Embedded stylesheet.
pub const STYLESHEET: &str = "
body { font-family: Arial, sans-serif; }
h1 { color: #0066cc; }
table { border-collapse: collapse; width: 100%; margin-bottom: 20px; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f2f2f2; }
.sheet-title { margin-top: 30px; margin-bottom: 10px; }
";

/// A report of every sheet in a workbook, in workbook order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlReport {
    pub title: String,
    pub sheets: Vec<SheetTable>,
}

impl HtmlReport {
    pub fn new(title: impl Into<String>, sheets: Vec<SheetTable>) -> Self {
        Self {
            title: title.into(),
            sheets,
        }
    }

    /// Heading shown above a sheet's table.
    pub fn sheet_heading(sheet: &SheetTable) -> String {
        format!("Sheet: {}", sheet.name)
    }

    /// Serialise the report as a standalone HTML document.
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(1024);
        html.push_str("<html><head><meta charset=\"utf-8\"><style>");
        html.push_str(STYLESHEET);
        html.push_str("</style></head><body>");
        html.push_str(&format!("<h1>{}</h1>", escape(&self.title)));

        for sheet in &self.sheets {
            html.push_str(&format!(
                "<h2 class='sheet-title'>{}</h2>",
                escape(&Self::sheet_heading(sheet))
            ));
            push_table(&mut html, sheet);
        }

        html.push_str("</body></html>");
        html
    }
}

fn push_table(html: &mut String, sheet: &SheetTable) {
    html.push_str("<table border=\"1\" class=\"dataframe\">\n  <thead>\n");
    if !sheet.columns.is_empty() {
        html.push_str("    <tr style=\"text-align: right;\">\n");
        for column in &sheet.columns {
            html.push_str(&format!("      <th>{}</th>\n", escape(column)));
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </thead>\n  <tbody>\n");
    for row in &sheet.rows {
        html.push_str("    <tr>\n");
        for cell in row {
            html.push_str(&format!("      <td>{}</td>\n", escape(cell)));
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>");
}

/// Escape text for element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
