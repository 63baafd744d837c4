//! JSON rendering for outlines.

use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{DocumentOutline, Span};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with two-space indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert an outline to JSON.
pub fn to_json(outline: &DocumentOutline, format: JsonFormat) -> Result<String> {
    serialize(outline, format)
}

/// Convert collected spans to JSON, for inspecting what the collector saw.
pub fn spans_to_json(spans: &[Span], format: JsonFormat) -> Result<String> {
    serialize(spans, format)
}

/// Write an outline to `path` as UTF-8 JSON with a trailing newline.
pub fn write_json<P: AsRef<Path>>(
    outline: &DocumentOutline,
    path: P,
    format: JsonFormat,
) -> Result<()> {
    let mut json = to_json(outline, format)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, HeadingLevel, OutlineEntry};

    fn sample() -> DocumentOutline {
        DocumentOutline {
            title: "Überblick".to_string(),
            outline: vec![OutlineEntry::new(HeadingLevel::H1, "Einleitung", 1)],
        }
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        let expected = r#"{
  "title": "Überblick",
  "outline": [
    {
      "level": "H1",
      "text": "Einleitung",
      "page": 1
    }
  ]
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&DocumentOutline::empty(), JsonFormat::Compact).unwrap();
        assert_eq!(json, r#"{"title":"","outline":[]}"#);
    }

    #[test]
    fn test_spans_to_json() {
        let spans = vec![Span::new("Hi", 12.0, "Arial", BBox::default(), 1)];
        let json = spans_to_json(&spans, JsonFormat::Compact).unwrap();
        assert!(json.starts_with(r#"[{"text":"Hi","font_size":12.0"#));
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        write_json(&sample(), &path, JsonFormat::Compact).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("]}\n"));
        let parsed: DocumentOutline = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, sample());
    }
}
