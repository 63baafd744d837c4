//! Page furniture detection: page numbers, running headers and footers.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;

use crate::model::{normalize_text, Span};

use super::config::HeuristicConfig;

/// Flags spans that belong to the page frame rather than the content.
pub struct FurnitureFilter {
    page_number_regex: Regex,
    page_label_regex: Regex,
    page_of_regex: Regex,
    roman_regex: Regex,
    position_tolerance: f32,
    min_repeat_pages: usize,
}

impl FurnitureFilter {
    pub fn new(config: &HeuristicConfig) -> Self {
        Self {
            // "12", "- 12 -", "— 3 —"
            page_number_regex: Regex::new(r"^[-–—]?\s*\d+\s*[-–—]?$").unwrap(),
            page_label_regex: Regex::new(r"(?i)^page\s+\d+(\s*(of|/)\s*\d+)?$").unwrap(),
            page_of_regex: Regex::new(r"(?i)^\d+\s*(of|/)\s*\d+$").unwrap(),
            roman_regex: Regex::new(
                r"^[-–—]?\s*m{0,3}(cm|cd|d?c{0,3})(xc|xl|l?x{0,3})(ix|iv|v?i{0,3})\s*[-–—]?$",
            )
            .unwrap(),
            position_tolerance: config.header_position_tolerance.max(0.5),
            min_repeat_pages: config.min_repeat_pages.max(1),
        }
    }

    /// Whether the text is a bare page number or page label.
    pub fn is_page_number(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.page_number_regex.is_match(text)
            || self.page_label_regex.is_match(text)
            || self.page_of_regex.is_match(text)
            // The roman pattern also matches the empty string and lone dashes.
            || (text.chars().any(|c| c.is_ascii_lowercase()) && self.roman_regex.is_match(text))
    }

    /// Mark each span: `true` for furniture, `false` for content.
    pub fn classify(&self, spans: &[Span]) -> Vec<bool> {
        let repeated = self.repeated_positions(spans);

        let mut flagged = 0usize;
        let marks: Vec<bool> = spans
            .iter()
            .zip(repeated)
            .map(|(span, repeated)| {
                let is_furniture = repeated || span.is_blank() || self.is_page_number(&span.text);
                if is_furniture {
                    flagged += 1;
                }
                is_furniture
            })
            .collect();

        log::debug!("Page furniture: {} of {} spans", flagged, spans.len());
        marks
    }

    /// Spans whose text recurs at about the same height on enough pages.
    ///
    /// Occurrences of one text are clustered by `y0`: a sorted run stays in
    /// one cluster while consecutive positions are within the tolerance.
    fn repeated_positions(&self, spans: &[Span]) -> Vec<bool> {
        let mut by_text: BTreeMap<String, Vec<(f32, u32, usize)>> = BTreeMap::new();
        for (index, span) in spans.iter().enumerate().filter(|(_, s)| !s.is_blank()) {
            by_text
                .entry(normalize_text(&span.text).to_lowercase())
                .or_default()
                .push((span.bbox.y0, span.page, index));
        }

        let mut repeated = vec![false; spans.len()];
        for occurrences in by_text.values_mut() {
            occurrences.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.2.cmp(&b.2)));

            let mut start = 0;
            for end in 1..=occurrences.len() {
                let split = end == occurrences.len()
                    || occurrences[end].0 - occurrences[end - 1].0 > self.position_tolerance;
                if !split {
                    continue;
                }
                let cluster = &occurrences[start..end];
                let pages: BTreeSet<u32> = cluster.iter().map(|&(_, page, _)| page).collect();
                if pages.len() >= self.min_repeat_pages {
                    for &(_, _, index) in cluster {
                        repeated[index] = true;
                    }
                }
                start = end;
            }
        }
        repeated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    fn filter() -> FurnitureFilter {
        FurnitureFilter::new(&HeuristicConfig::default())
    }

    fn span_at(text: &str, y: f32, page: u32) -> Span {
        Span::new(text, 10.0, "Helvetica", BBox::new(72.0, y, 200.0, y + 10.0), page)
    }

    #[test]
    fn test_page_numbers() {
        let f = filter();
        for text in ["12", "- 12 -", "— 4 —", "Page 3", "page 3 of 10", "3 of 10", "3/10", "iv", "xii"] {
            assert!(f.is_page_number(text), "{text}");
        }
        for text in ["Chapter 1", "1. Introduction", "civil", "Overview", "", "-"] {
            assert!(!f.is_page_number(text), "{text}");
        }
    }

    #[test]
    fn test_running_header_needs_three_pages() {
        let spans = vec![
            span_at("Company Confidential", 30.0, 1),
            span_at("Intro", 100.0, 1),
            span_at("Company Confidential", 31.0, 2),
            span_at("Company Confidential", 30.0, 3),
            span_at("Draft", 30.0, 1),
            span_at("Draft", 30.0, 2),
        ];
        let marks = filter().classify(&spans);
        assert_eq!(marks, vec![true, false, true, true, false, false]);
    }

    #[test]
    fn test_running_header_tolerates_jitter() {
        // 29.9 and 30.1 straddle a 4pt grid line at 30.0
        let spans = vec![
            span_at("Company Confidential", 29.9, 1),
            span_at("Body of page one", 100.0, 1),
            span_at("Company Confidential", 30.1, 2),
            span_at("Body of page two", 100.0, 2),
            span_at("Company Confidential", 30.0, 3),
            span_at("Body of page three", 100.0, 3),
        ];
        let marks = filter().classify(&spans);
        assert_eq!(marks, vec![true, false, true, false, true, false]);
    }

    #[test]
    fn test_same_text_different_position_not_header() {
        let spans = vec![
            span_at("Summary", 30.0, 1),
            span_at("Summary", 300.0, 2),
            span_at("Summary", 600.0, 3),
        ];
        assert!(filter().classify(&spans).iter().all(|m| !m));
    }

    #[test]
    fn test_header_match_ignores_case_and_spacing() {
        let spans = vec![
            span_at("ACME  Corp", 760.0, 1),
            span_at("acme corp", 760.0, 2),
            span_at("Acme Corp", 760.0, 4),
        ];
        assert!(filter().classify(&spans).iter().all(|m| *m));
    }

    #[test]
    fn test_blank_spans_are_furniture() {
        let spans = vec![span_at("   ", 100.0, 1), span_at("Text", 120.0, 1)];
        assert_eq!(filter().classify(&spans), vec![true, false]);
    }
}
