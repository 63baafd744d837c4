//! Heading likelihood scoring for individual spans.

use regex::Regex;

use crate::model::{SizeBucket, Span};

use super::config::HeuristicConfig;
use super::font_stats::FontProfile;

/// Layout facts about a span's neighbourhood on its page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpanContext {
    /// The span sits on the first line of its page.
    pub first_on_page: bool,
    /// Whitespace between the previous line and this span.
    pub gap_above: Option<f32>,
    /// Whitespace between this span and the next line.
    pub gap_below: Option<f32>,
}

impl SpanContext {
    /// Contexts for spans already in reading order (page, then top to bottom).
    ///
    /// Spans on the same line are not each other's neighbours.
    pub fn for_spans(spans: &[Span]) -> Vec<SpanContext> {
        spans
            .iter()
            .enumerate()
            .map(|(i, span)| {
                let same_line = |other: &&Span| {
                    (other.bbox.y0 - span.bbox.y0).abs() < span.bbox.height().max(1.0) * 0.5
                };

                let mut before = spans[..i]
                    .iter()
                    .rev()
                    .take_while(|other| other.page == span.page);
                let above = before.find(|other| !same_line(other));
                let below = spans[i + 1..]
                    .iter()
                    .take_while(|other| other.page == span.page)
                    .find(|other| !same_line(other));

                SpanContext {
                    first_on_page: above.is_none(),
                    gap_above: above.map(|a| (span.bbox.y0 - a.bbox.y1).max(0.0)),
                    gap_below: below.map(|b| (b.bbox.y0 - span.bbox.y1).max(0.0)),
                }
            })
            .collect()
    }

    /// Whether whitespace above or below exceeds `ratio` line heights.
    pub fn is_isolated(&self, line_height: f32, ratio: f32) -> bool {
        let threshold = line_height * ratio;
        self.gap_above.map(|g| g > threshold).unwrap_or(false)
            || self.gap_below.map(|g| g > threshold).unwrap_or(false)
    }
}

/// Result of scoring one span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingScore {
    /// Composite score in `[0, 1]`
    pub score: f32,
    /// Whether the span passes the candidate gate
    pub is_candidate: bool,
}

/// Text shapes of structural headings: outline numbering and chapter-style
/// keywords.
pub(crate) struct HeadingPatterns {
    numbering: Regex,
    keyword: Regex,
}

impl HeadingPatterns {
    pub(crate) fn new() -> Self {
        Self {
            // "1.", "1.1", "2.3.4", "IV.", "iv)", "A."
            numbering: Regex::new(r"^(\d+(\.\d+)*\.?|[IVXLCDM]+[.)]|[ivxlcdm]+[.)]|[A-Z][.)])(\s|$)")
                .unwrap(),
            keyword: Regex::new(r"(?i)^(chapter|section|part|appendix)\b").unwrap(),
        }
    }

    /// "1.2 Scope", "IV. Results", "Chapter 3", "Appendix" and the like.
    pub(crate) fn is_structural(&self, text: &str) -> bool {
        self.numbering.is_match(text) || self.keyword.is_match(text)
    }
}

/// Scores spans against a document's font profile.
///
/// Holds the compiled text patterns; scoring itself has no state.
pub struct HeadingScorer<'a> {
    config: &'a HeuristicConfig,
    patterns: HeadingPatterns,
}

impl<'a> HeadingScorer<'a> {
    pub fn new(config: &'a HeuristicConfig) -> Self {
        Self {
            config,
            patterns: HeadingPatterns::new(),
        }
    }

    /// Score a span given its context.
    pub fn score(&self, span: &Span, profile: &FontProfile, context: &SpanContext) -> HeadingScore {
        let config = self.config;
        let text = span.text.trim();
        let length = text.chars().count();

        let saturation = config.size_saturation.max(f32::EPSILON);
        let size_term = (profile.relative_size(span.font_size) / saturation).min(1.0);
        let bold_term = if span.is_bold { 1.0 } else { 0.0 };
        let brevity_term = brevity(length, config.max_heading_chars);
        let pattern_term = self.pattern_term(text);
        let position_term = if context.first_on_page
            || context.is_isolated(span.bbox.height(), config.isolation_gap_ratio)
        {
            1.0
        } else {
            0.0
        };

        let mut score = config.size_weight * size_term
            + config.bold_weight * bold_term
            + config.brevity_weight * brevity_term
            + config.pattern_weight * pattern_term
            + config.position_weight * position_term;
        if length > config.max_heading_chars {
            score = score.min(config.long_span_score_cap);
        }
        let score = score.clamp(0.0, 1.0);

        let body = profile.body_size();
        let is_candidate = span.font_size > body
            && SizeBucket::from_points(span.font_size).points() > body
            && score >= config.acceptance_threshold
            && length >= config.min_heading_chars;

        HeadingScore {
            score,
            is_candidate,
        }
    }

    fn pattern_term(&self, text: &str) -> f32 {
        if self.patterns.is_structural(text) || is_short_all_caps(text)
        {
            1.0
        } else if !ends_with_terminal_punctuation(text) {
            0.5
        } else {
            0.0
        }
    }
}

/// Score a single span. Convenience wrapper that compiles the patterns on
/// every call; use [`HeadingScorer`] for whole documents.
pub fn score_span(
    span: &Span,
    profile: &FontProfile,
    context: &SpanContext,
    config: &HeuristicConfig,
) -> HeadingScore {
    HeadingScorer::new(config).score(span, profile, context)
}

/// `1 - len / max`, clamped to `[0, 1]`.
pub(crate) fn brevity(length: usize, max_chars: usize) -> f32 {
    if max_chars == 0 {
        return 0.0;
    }
    (1.0 - length as f32 / max_chars as f32).clamp(0.0, 1.0)
}

fn is_short_all_caps(text: &str) -> bool {
    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    letters >= 2
        && text.split_whitespace().count() <= 8
        && text
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(|c| c.is_uppercase())
}

fn ends_with_terminal_punctuation(text: &str) -> bool {
    matches!(
        text.chars().last(),
        Some('.' | ',' | ';' | '!' | '?' | '。' | '！' | '？')
    )
}
