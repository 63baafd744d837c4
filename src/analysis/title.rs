//! Document title detection.

use crate::model::{normalize_text, SizeBucket, Span};

use super::config::HeuristicConfig;
use super::font_stats::FontProfile;
use super::scorer::HeadingPatterns;

/// The chosen title and the spans it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleSelection {
    pub text: String,
    /// Indices into the analysed span list, in document order
    pub spans: Vec<usize>,
}

impl TitleSelection {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Page the title was taken from.
    pub fn page(&self, spans: &[Span]) -> Option<u32> {
        self.spans.first().map(|&i| spans[i].page)
    }
}

/// Lines of one title further apart than this many font sizes are separate
/// blocks.
const TITLE_LINE_GAP_RATIO: f32 = 1.5;

/// Pick the title from the largest text on page 1.
///
/// `spans` must already exclude page furniture and be in reading order.
pub fn extract_title(spans: &[Span], profile: &FontProfile, config: &HeuristicConfig) -> TitleSelection {
    let patterns = HeadingPatterns::new();
    let page_one: Vec<usize> = spans
        .iter()
        .enumerate()
        .filter(|(_, s)| s.page == 1)
        .map(|(i, _)| i)
        .collect();

    let mut selection = select_largest(spans, &page_one, profile, config, &patterns);

    if selection.is_empty() && config.title_fallback_spans > 0 {
        let page_two: Vec<usize> = spans
            .iter()
            .enumerate()
            .filter(|(_, s)| s.page == 2)
            .map(|(i, _)| i)
            .take(config.title_fallback_spans)
            .collect();
        selection = select_largest(spans, &page_two, profile, config, &patterns);
        if !selection.is_empty() {
            log::debug!("Title taken from page 2");
        }
    }

    if selection.is_empty() {
        log::debug!("No title candidate found");
    } else {
        log::debug!("Title: {:?} ({} spans)", selection.text, selection.spans.len());
    }
    selection
}

/// The first span of the largest eligible size, plus the lines directly
/// below it that share its style.
fn select_largest(
    spans: &[Span],
    pool: &[usize],
    profile: &FontProfile,
    config: &HeuristicConfig,
    patterns: &HeadingPatterns,
) -> TitleSelection {
    let eligible: Vec<bool> = pool
        .iter()
        .map(|&i| is_title_eligible(&spans[i], profile, config, patterns))
        .collect();

    let largest = match pool
        .iter()
        .zip(&eligible)
        .filter(|(_, ok)| **ok)
        .map(|(&i, _)| SizeBucket::from_points(spans[i].font_size))
        .max()
    {
        Some(bucket) => bucket,
        None => return TitleSelection::default(),
    };

    let anchor = match (0..pool.len()).find(|&p| {
        eligible[p] && SizeBucket::from_points(spans[pool[p]].font_size) == largest
    }) {
        Some(p) => p,
        None => return TitleSelection::default(),
    };
    let signature = spans[pool[anchor]].signature();

    let mut members = vec![pool[anchor]];
    for p in anchor + 1..pool.len() {
        let prev = &spans[pool[p - 1]];
        let next = &spans[pool[p]];
        let gap = next.bbox.y0 - prev.bbox.y1;
        if !eligible[p]
            || next.signature() != signature
            || next.page != prev.page
            || gap > prev.font_size * TITLE_LINE_GAP_RATIO
        {
            break;
        }
        members.push(pool[p]);
    }

    let joined = members
        .iter()
        .map(|&i| spans[i].text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    TitleSelection {
        text: normalize_text(&joined),
        spans: members,
    }
}

fn is_title_eligible(
    span: &Span,
    profile: &FontProfile,
    config: &HeuristicConfig,
    patterns: &HeadingPatterns,
) -> bool {
    let text = span.text.trim();
    if text.is_empty() || text.chars().count() > config.max_title_chars {
        return false;
    }

    let body = profile.body_size();
    if span.font_size <= body || SizeBucket::from_points(span.font_size).points() <= body {
        return false;
    }

    // Numbered and chapter-style lines are headings, not titles.
    !patterns.is_structural(text)
}
