//! HTTP server binary for sheet2doc.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ServiceConfig` and serves the router until Ctrl-C.

use anyhow::{Context, Result};
use clap::Parser;
use sheet2doc::{router, PageSize, RenderConfig, ServiceConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default address (0.0.0.0:8080)
  sheet2doc-server

  # Landscape pages, scratch files on a RAM disk
  sheet2doc-server --page a4-landscape --temp-dir /dev/shm

  # Japanese sheet names and cells
  sheet2doc-server --font /usr/share/fonts/opentype/ipaexfont-gothic/ipaexg.ttf

  # Convert a workbook
  curl -s localhost:8080/convert \
    -H 'content-type: application/json' \
    -d "{\"file\": \"$(base64 -w0 book.xlsx)\", \"filename\": \"book.xlsx\"}"

ENVIRONMENT VARIABLES:
  RUST_LOG                  Log filter (overrides --verbose / --quiet)
  SHEET2DOC_BIND            Listen address
  SHEET2DOC_MAX_BODY_BYTES  Request body limit
  SHEET2DOC_PAGE            PDF page size
  SHEET2DOC_TEMP_DIR        Directory for scratch workbook copies
  SHEET2DOC_FONT            TrueType font embedded in PDFs
"#;

/// Serve spreadsheet → Markdown / PDF conversion over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "sheet2doc-server",
    version,
    about = "Serve spreadsheet to Markdown / PDF conversion over HTTP",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "SHEET2DOC_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Largest accepted request body in bytes.
    #[arg(long, env = "SHEET2DOC_MAX_BODY_BYTES", default_value_t = 64 * 1024 * 1024)]
    max_body_bytes: usize,

    /// PDF page size: a4, a4-landscape, letter, letter-landscape.
    #[arg(long, env = "SHEET2DOC_PAGE", default_value = "a4")]
    page: PageSize,

    /// Page margin in millimetres (5–50).
    #[arg(long, env = "SHEET2DOC_MARGIN_MM", default_value_t = 15.0)]
    margin_mm: f32,

    /// Table font size in points (5–24).
    #[arg(long, env = "SHEET2DOC_FONT_SIZE", default_value_t = 9.0)]
    font_size: f32,

    /// Directory for scratch workbook copies (default: system temp dir).
    #[arg(long, env = "SHEET2DOC_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// TrueType font for PDF text (default: first Unicode font found on the host).
    #[arg(long, env = "SHEET2DOC_FONT")]
    font: Option<PathBuf>,

    /// TrueType font for PDF headings (default: --font).
    #[arg(long, env = "SHEET2DOC_BOLD_FONT", requires = "font")]
    bold_font: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SHEET2DOC_VERBOSE")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, env = "SHEET2DOC_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut render = RenderConfig::builder()
        .page_size(cli.page)
        .margin_mm(cli.margin_mm)
        .body_font_size(cli.font_size);
    if let Some(dir) = cli.temp_dir {
        render = render.temp_dir(dir);
    }
    if let Some(font) = cli.font {
        render = render.font_path(font);
    }
    if let Some(font) = cli.bold_font {
        render = render.bold_font_path(font);
    }
    let config = ServiceConfig::builder()
        .bind_addr(cli.bind)
        .max_body_bytes(cli.max_body_bytes)
        .render(render.build().context("Invalid render configuration")?)
        .build()
        .context("Invalid service configuration")?;

    // ── Serve ────────────────────────────────────────────────────────────
    let app = router(&config);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
