//! PDF reading: turns page content streams into positioned text spans.

pub mod backend;
mod collector;
mod options;

pub use backend::{LopdfBackend, PdfBackend};
pub use collector::{PdfSpanCollector, SpanSource};
pub use options::{ErrorMode, PageSelection, ParseOptions};
