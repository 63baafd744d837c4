//! Document-wide font statistics.

use std::collections::BTreeMap;

use crate::model::{Span, StyleSignature};

use super::config::HeuristicConfig;

/// Character-weighted histogram of style signatures and the body text size
/// derived from it.
///
/// Computed once per document and passed by reference to every later stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontProfile {
    counts: BTreeMap<StyleSignature, usize>,
    body_size: f32,
}

impl FontProfile {
    /// Build the profile for one document.
    pub fn from_spans(spans: &[Span], config: &HeuristicConfig) -> Self {
        let mut counts = BTreeMap::new();
        let mut observed = 0usize;
        for span in spans.iter().filter(|s| !s.is_blank()) {
            *counts.entry(span.signature()).or_insert(0) += span.char_count();
            observed += 1;
        }

        let body_size = if counts.is_empty() {
            0.0
        } else if observed < config.min_spans_for_statistics || distinct_sizes(&counts) == 1 {
            smallest_size(&counts)
        } else {
            most_common_size(&counts)
        };

        log::debug!(
            "Font profile: {} spans, {} styles, body size {:.1}pt",
            observed,
            counts.len(),
            body_size
        );

        Self { counts, body_size }
    }

    /// Size of ordinary paragraph text, in points (0 for an empty document).
    pub fn body_size(&self) -> f32 {
        self.body_size
    }

    /// `(size - body) / body`, clamped at zero.
    pub fn relative_size(&self, font_size: f32) -> f32 {
        if self.body_size <= 0.0 {
            return 0.0;
        }
        ((font_size - self.body_size) / self.body_size).max(0.0)
    }

    /// Weighted character count for a signature.
    pub fn weight(&self, signature: StyleSignature) -> usize {
        self.counts.get(&signature).copied().unwrap_or(0)
    }

    /// Total weighted character count.
    pub fn total_weight(&self) -> usize {
        self.counts.values().sum()
    }

    /// Observed signatures, smallest first.
    pub fn signatures(&self) -> impl Iterator<Item = &StyleSignature> {
        self.counts.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

fn distinct_sizes(counts: &BTreeMap<StyleSignature, usize>) -> usize {
    let mut sizes: Vec<_> = counts.keys().map(|s| s.size).collect();
    sizes.dedup();
    sizes.len()
}

fn smallest_size(counts: &BTreeMap<StyleSignature, usize>) -> f32 {
    counts
        .keys()
        .next()
        .map(|s| s.size.points())
        .unwrap_or(0.0)
}

fn most_common_size(counts: &BTreeMap<StyleSignature, usize>) -> f32 {
    // Map order is (size asc, regular before bold); strict `>` keeps the first
    // of equal counts, so ties go to the smaller, non-bold style.
    let mut best: Option<(&StyleSignature, usize)> = None;
    for (signature, &count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((signature, count)),
        }
    }
    best.map(|(s, _)| s.size.points()).unwrap_or(0.0)
}
