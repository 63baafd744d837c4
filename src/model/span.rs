//! Text spans and style keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Axis-aligned bounding box in top-down page coordinates.
///
/// `y0` is the top edge and grows toward the bottom of the page, so sorting
/// by `y0` ascending gives top-to-bottom reading order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }
}

/// A contiguous run of text sharing one font and style on a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Whether the font appears to be italic
    pub is_italic: bool,
    /// Position on the page
    pub bbox: BBox,
    /// Page number (1-indexed)
    pub page: u32,
}

impl Span {
    /// Create a span, inferring weight and slant from the font name.
    pub fn new(
        text: impl Into<String>,
        font_size: f32,
        font_name: impl Into<String>,
        bbox: BBox,
        page: u32,
    ) -> Self {
        let font_name = font_name.into();
        let (is_bold, is_italic) = style_from_font_name(&font_name);
        Self {
            text: text.into(),
            font_size,
            font_name,
            is_bold,
            is_italic,
            bbox,
            page,
        }
    }

    /// Override the inferred bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.is_bold = bold;
        self
    }

    /// Override the inferred italic flag.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.is_italic = italic;
        self
    }

    /// Number of non-whitespace characters, used to weight font statistics.
    pub fn char_count(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }

    /// Whether the span carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Style key used for clustering.
    pub fn signature(&self) -> StyleSignature {
        StyleSignature::new(SizeBucket::from_points(self.font_size), self.is_bold)
    }
}

/// Infer (bold, italic) from a PostScript font name such as
/// `ABCDEF+Times-BoldItalic`.
pub fn style_from_font_name(font_name: &str) -> (bool, bool) {
    let lower = font_name.to_lowercase();
    let is_bold = lower.contains("bold")
        || lower.contains("black")
        || lower.contains("heavy")
        || lower.contains("semibold")
        || lower.ends_with(",b");
    let is_italic = lower.contains("italic") || lower.contains("oblique");
    (is_bold, is_italic)
}

/// NFKC-normalize text and collapse runs of whitespace to single spaces.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text.nfkc().collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Font size rounded to the nearest half point, stored as half points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SizeBucket(i32);

impl SizeBucket {
    pub fn from_points(size: f32) -> Self {
        Self((size * 2.0).round() as i32)
    }

    pub fn points(self) -> f32 {
        self.0 as f32 / 2.0
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}pt", self.points())
    }
}

/// Clustering key: (font size bucket, boldness).
///
/// Ordered by size first so maps keyed by signature iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleSignature {
    pub size: SizeBucket,
    pub bold: bool,
}

impl StyleSignature {
    pub fn new(size: SizeBucket, bold: bool) -> Self {
        Self { size, bold }
    }
}

impl fmt::Display for StyleSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bold {
            write!(f, "{} bold", self.size)
        } else {
            write!(f, "{}", self.size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_style_detection() {
        let span = Span::new("Test", 12.0, "Helvetica-Bold", BBox::default(), 1);
        assert!(span.is_bold);
        assert!(!span.is_italic);

        let span = Span::new("Test", 12.0, "ABCDEF+Times-Oblique", BBox::default(), 1);
        assert!(!span.is_bold);
        assert!(span.is_italic);

        let span = Span::new("Test", 12.0, "Arial,Bold", BBox::default(), 1);
        assert!(span.is_bold);
    }

    #[test]
    fn test_size_bucket_rounding() {
        assert_eq!(SizeBucket::from_points(11.8).points(), 12.0);
        assert_eq!(SizeBucket::from_points(12.2).points(), 12.0);
        assert_eq!(SizeBucket::from_points(12.3).points(), 12.5);
        assert!(SizeBucket::from_points(14.0) > SizeBucket::from_points(12.0));
    }

    #[test]
    fn test_signature_equality_ignores_instance() {
        let a = Span::new("One", 16.1, "Arial-Bold", BBox::default(), 1);
        let b = Span::new("Two", 15.9, "Helvetica-Bold", BBox::default(), 3);
        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.signature().to_string(), "16.0pt bold");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hello \n\t World  "), "Hello World");
        // Ligature fi folds to two letters
        assert_eq!(normalize_text("\u{FB01}nal"), "final");
    }

    #[test]
    fn test_char_count_skips_whitespace() {
        let span = Span::new("a b  c", 10.0, "Arial", BBox::default(), 1);
        assert_eq!(span.char_count(), 3);
        assert!(Span::new("  ", 10.0, "Arial", BBox::default(), 1).is_blank());
    }
}
