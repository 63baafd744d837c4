//! Outline analysis: turns collected spans into a title and leveled headings.
//!
//! The stages run in a fixed order, each a plain function of its inputs:
//!
//! 1. [`FurnitureFilter`] drops page numbers and running headers
//! 2. [`FontProfile`] finds the body text size
//! 3. [`extract_title`] picks the title from page 1
//! 4. [`HeadingScorer`] gates the remaining spans into candidates
//! 5. [`group_and_assign`] clusters candidates by style and maps them to H1..H3
//! 6. [`assemble`] orders and deduplicates the final entries

mod assembler;
mod config;
mod font_stats;
mod furniture;
mod grouper;
mod scorer;
mod title;

pub use assembler::assemble;
pub use config::{HeuristicConfig, OverflowPolicy};
pub use font_stats::FontProfile;
pub use furniture::FurnitureFilter;
pub use grouper::{group_and_assign, HeadingCandidate, LevelAssignment, StyleCluster};
pub use scorer::{score_span, HeadingScore, HeadingScorer, SpanContext};
pub use title::{extract_title, TitleSelection};

use std::collections::HashSet;

use crate::model::{DocumentOutline, Span};

/// Everything the pipeline decided about one document.
#[derive(Debug, Clone)]
pub struct OutlineAnalysis {
    pub outline: DocumentOutline,
    /// Spans left after removing page furniture, in reading order
    pub content: Vec<Span>,
    /// Score of each `content` span
    pub scores: Vec<HeadingScore>,
    pub profile: FontProfile,
    pub title: TitleSelection,
    pub assignment: LevelAssignment,
    /// Number of spans dropped as page furniture
    pub furniture_count: usize,
}

/// Runs the heuristic pipeline with one configuration.
#[derive(Debug, Clone, Default)]
pub struct OutlineAnalyzer {
    config: HeuristicConfig,
}

impl OutlineAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HeuristicConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    /// Extract the outline of one document's spans.
    pub fn analyze(&self, spans: &[Span]) -> DocumentOutline {
        self.analyze_detailed(spans).outline
    }

    /// Like [`analyze`](Self::analyze), keeping the intermediate results.
    pub fn analyze_detailed(&self, spans: &[Span]) -> OutlineAnalysis {
        let config = &self.config;

        let mut ordered = spans.to_vec();
        ordered.sort_by(|a, b| a.page.cmp(&b.page).then_with(|| a.bbox.y0.total_cmp(&b.bbox.y0)));

        let furniture = FurnitureFilter::new(config).classify(&ordered);
        let furniture_count = furniture.iter().filter(|f| **f).count();
        let content: Vec<Span> = ordered
            .into_iter()
            .zip(furniture)
            .filter(|(_, is_furniture)| !is_furniture)
            .map(|(span, _)| span)
            .collect();

        let profile = FontProfile::from_spans(&content, config);
        let title = extract_title(&content, &profile, config);
        let title_spans: HashSet<usize> = title.spans.iter().copied().collect();

        let scorer = HeadingScorer::new(config);
        let contexts = SpanContext::for_spans(&content);
        let scores: Vec<HeadingScore> = content
            .iter()
            .zip(&contexts)
            .map(|(span, context)| scorer.score(span, &profile, context))
            .collect();

        let candidates: Vec<HeadingCandidate> = scores
            .iter()
            .enumerate()
            .filter(|(i, s)| s.is_candidate && !title_spans.contains(i))
            .map(|(index, s)| HeadingCandidate {
                index,
                score: s.score,
                signature: content[index].signature(),
            })
            .collect();

        let assignment = group_and_assign(&candidates, &content, &profile, config);
        let outline = assemble(&content, &title, &candidates, &assignment, config);

        log::debug!(
            "Analyzed {} spans: {} furniture, {} candidates, {} styles, {} entries",
            spans.len(),
            furniture_count,
            candidates.len(),
            assignment.clusters.len(),
            outline.outline.len()
        );

        OutlineAnalysis {
            outline,
            content,
            scores,
            profile,
            title,
            assignment,
            furniture_count,
        }
    }
}
