//! Final outline assembly.

use std::collections::HashSet;

use crate::model::{normalize_text, DocumentOutline, OutlineEntry, Span};

use super::config::HeuristicConfig;
use super::grouper::{HeadingCandidate, LevelAssignment};
use super::title::TitleSelection;

/// Combine the title and the leveled candidates into a [`DocumentOutline`].
///
/// Entries come out in `(page, y0)` order; candidates with equal positions
/// keep their input order.
pub fn assemble(
    spans: &[Span],
    title: &TitleSelection,
    candidates: &[HeadingCandidate],
    assignment: &LevelAssignment,
    config: &HeuristicConfig,
) -> DocumentOutline {
    let title_spans: HashSet<usize> = title.spans.iter().copied().collect();
    let title_page = title.page(spans);

    let mut placed: Vec<(u32, f32, OutlineEntry)> = candidates
        .iter()
        .filter(|c| !title_spans.contains(&c.index))
        .filter_map(|c| {
            let level = assignment.level_of(c.signature)?;
            let span = &spans[c.index];
            let text = normalize_text(&span.text);
            if text.is_empty() {
                return None;
            }
            if !title.is_empty() && Some(span.page) == title_page && text == title.text {
                return None;
            }
            Some((span.page, span.bbox.y0, OutlineEntry::new(level, text, span.page)))
        })
        .collect();

    // sort_by is stable
    placed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));

    let mut seen = HashSet::new();
    let outline = placed
        .into_iter()
        .map(|(_, _, entry)| entry)
        .filter(|entry| !config.dedupe_headings || seen.insert(entry.text.to_lowercase()))
        .collect();

    DocumentOutline {
        title: title.text.clone(),
        outline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, HeadingLevel};
    use std::collections::BTreeMap;

    fn span(text: &str, size: f32, page: u32, y: f32) -> Span {
        Span::new(text, size, "Helvetica-Bold", BBox::new(72.0, y, 300.0, y + size), page)
    }

    fn candidate(spans: &[Span], index: usize) -> HeadingCandidate {
        HeadingCandidate {
            index,
            score: 0.9,
            signature: spans[index].signature(),
        }
    }

    fn assignment(pairs: &[(&Span, HeadingLevel)]) -> LevelAssignment {
        let levels: BTreeMap<_, _> = pairs.iter().map(|(s, l)| (s.signature(), *l)).collect();
        LevelAssignment {
            clusters: Vec::new(),
            levels,
        }
    }

    #[test]
    fn test_entries_sorted_by_page_then_position() {
        let spans = vec![
            span("Later", 16.0, 2, 100.0),
            span("Second", 14.0, 1, 300.0),
            span("First", 16.0, 1, 100.0),
        ];
        let cands: Vec<_> = (0..3).map(|i| candidate(&spans, i)).collect();
        let levels = assignment(&[(&spans[0], HeadingLevel::H1), (&spans[1], HeadingLevel::H2)]);

        let outline = assemble(
            &spans,
            &TitleSelection::default(),
            &cands,
            &levels,
            &HeuristicConfig::default(),
        );
        let texts: Vec<_> = outline.outline.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["First", "Second", "Later"]);
        assert_eq!(outline.outline[1].level, HeadingLevel::H2);
        assert_eq!(outline.outline[2].page, 2);
    }

    #[test]
    fn test_title_spans_and_text_excluded() {
        let spans = vec![
            span("Big Title", 24.0, 1, 40.0),
            span("Big Title", 18.0, 1, 400.0),
            span("Big Title", 18.0, 3, 40.0),
            span("Overview", 18.0, 1, 200.0),
        ];
        let title = TitleSelection {
            text: "Big Title".to_string(),
            spans: vec![0],
        };
        let cands: Vec<_> = (0..4).map(|i| candidate(&spans, i)).collect();
        let levels = assignment(&[(&spans[0], HeadingLevel::H1), (&spans[1], HeadingLevel::H2)]);
        let config = HeuristicConfig::default().with_dedupe(false);

        let outline = assemble(&spans, &title, &cands, &levels, &config);
        assert_eq!(outline.title, "Big Title");
        assert_eq!(
            outline.outline,
            vec![
                OutlineEntry::new(HeadingLevel::H2, "Overview", 1),
                OutlineEntry::new(HeadingLevel::H2, "Big Title", 3),
            ]
        );
    }

    #[test]
    fn test_dedupe_is_case_insensitive() {
        let spans = vec![
            span("Summary", 16.0, 1, 100.0),
            span("SUMMARY", 16.0, 4, 100.0),
        ];
        let cands: Vec<_> = (0..2).map(|i| candidate(&spans, i)).collect();
        let levels = assignment(&[(&spans[0], HeadingLevel::H1)]);

        let deduped = assemble(
            &spans,
            &TitleSelection::default(),
            &cands,
            &levels,
            &HeuristicConfig::default(),
        );
        assert_eq!(deduped.outline.len(), 1);

        let kept = assemble(
            &spans,
            &TitleSelection::default(),
            &cands,
            &levels,
            &HeuristicConfig::default().with_dedupe(false),
        );
        assert_eq!(kept.outline.len(), 2);
    }

    #[test]
    fn test_unleveled_candidates_dropped() {
        let spans = vec![span("Orphan style", 13.0, 1, 100.0)];
        let cands = vec![candidate(&spans, 0)];
        let outline = assemble(
            &spans,
            &TitleSelection::default(),
            &cands,
            &LevelAssignment::default(),
            &HeuristicConfig::default(),
        );
        assert!(outline.is_empty());
    }
}
