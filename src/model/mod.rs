//! Document model types.
//!
//! Spans are the input to outline analysis; [`DocumentOutline`] is its output.

mod outline;
mod span;

pub use outline::{DocumentOutline, HeadingLevel, OutlineEntry};
pub use span::{normalize_text, style_from_font_name, BBox, SizeBucket, Span, StyleSignature};
