//! # pdf-outline
//!
//! Heuristic outline extraction for PDF documents.
//!
//! Reads the text of a PDF with its font metadata, decides which text is the
//! document title and which lines are H1/H2/H3 headings, and emits the result
//! as JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_outline::{extract_outline_file, render};
//!
//! fn main() -> pdf_outline::Result<()> {
//!     let outline = extract_outline_file("document.pdf")?;
//!
//!     let json = render::to_json(&outline, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Span collection** ([`parser`]): content streams to positioned, styled text runs
//! - **Analysis** ([`analysis`]): body size, page furniture, scoring, style clustering, title
//! - **Rendering** ([`render`]): the `{"title", "outline"}` JSON contract
//! - **Batch** ([`batch`]): one JSON file per PDF in a directory, in parallel with Rayon

pub mod analysis;
pub mod batch;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use analysis::{HeuristicConfig, OutlineAnalysis, OutlineAnalyzer, OverflowPolicy};
pub use batch::{run_batch, BatchOptions, BatchReport};
pub use detect::{has_pdf_extension, parse_header, read_header, PdfHeader};
pub use error::{Error, Result};
pub use model::{BBox, DocumentOutline, HeadingLevel, OutlineEntry, Span};
pub use parser::{ErrorMode, PageSelection, ParseOptions, PdfSpanCollector, SpanSource};
pub use render::JsonFormat;

use std::path::Path;

/// Extract the outline of a PDF file with default settings.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::extract_outline_file;
///
/// let outline = extract_outline_file("report.pdf").unwrap();
/// println!("{}: {} headings", outline.title, outline.outline.len());
/// ```
pub fn extract_outline_file<P: AsRef<Path>>(path: P) -> Result<DocumentOutline> {
    extract_outline_file_with(path, &ParseOptions::default(), &OutlineAnalyzer::new())
}

/// Extract the outline of a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{extract_outline_file_with, HeuristicConfig, OutlineAnalyzer, ParseOptions};
///
/// let analyzer = OutlineAnalyzer::with_config(HeuristicConfig::new().with_title_fallback(5));
/// let outline = extract_outline_file_with("report.pdf", &ParseOptions::new().lenient(), &analyzer)?;
/// # Ok::<(), pdf_outline::Error>(())
/// ```
pub fn extract_outline_file_with<P: AsRef<Path>>(
    path: P,
    options: &ParseOptions,
    analyzer: &OutlineAnalyzer,
) -> Result<DocumentOutline> {
    let spans = collect_spans(path, options)?;
    Ok(analyzer.analyze(&spans))
}

/// Extract the outline of a PDF held in memory.
pub fn extract_outline_bytes(data: &[u8]) -> Result<DocumentOutline> {
    extract_outline_bytes_with(data, &ParseOptions::default(), &OutlineAnalyzer::new())
}

/// Extract the outline of a PDF held in memory with custom options.
pub fn extract_outline_bytes_with(
    data: &[u8],
    options: &ParseOptions,
    analyzer: &OutlineAnalyzer,
) -> Result<DocumentOutline> {
    let collector = PdfSpanCollector::from_bytes_with_options(data, options.clone())?;
    Ok(analyzer.analyze(&collector.collect_spans()?))
}

/// Collect the text spans of a PDF file, in reading order.
pub fn collect_spans<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Vec<Span>> {
    let collector = PdfSpanCollector::open_with_options(path, options.clone())?;
    collector.collect_spans()
}

/// Run the outline heuristics over spans from any source.
///
/// Never fails: a document without usable text yields an empty outline.
pub fn analyze_spans(spans: &[Span]) -> DocumentOutline {
    OutlineAnalyzer::new().analyze(spans)
}

/// Extract the outline of a PDF file without blocking the async runtime.
///
/// The file is read with `tokio::fs`; parsing and analysis run on the
/// blocking thread pool.
#[cfg(feature = "async")]
pub async fn extract_outline_file_async<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
    analyzer: OutlineAnalyzer,
) -> Result<DocumentOutline> {
    let data = tokio::fs::read(path.as_ref()).await?;
    tokio::task::spawn_blocking(move || extract_outline_bytes_with(&data, &options, &analyzer))
        .await
        .map_err(|e| Error::PdfParse(format!("extraction task failed: {}", e)))?
}
