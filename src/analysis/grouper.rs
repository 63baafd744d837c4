//! Clustering of heading candidates by style and mapping clusters to levels.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::model::{HeadingLevel, Span, StyleSignature};

use super::config::{HeuristicConfig, OverflowPolicy};
use super::font_stats::FontProfile;
use super::scorer::brevity;

/// A span that passed the candidate gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingCandidate {
    /// Index of the span in the analysed span list
    pub index: usize,
    pub score: f32,
    pub signature: StyleSignature,
}

/// Candidates sharing one style signature.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleCluster {
    pub signature: StyleSignature,
    /// Span indices, in document order
    pub members: Vec<usize>,
    pub prominence: f32,
    /// `(page, y0)` of the earliest member
    pub first_occurrence: (u32, f32),
}

/// Ranked clusters and the level each signature maps to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelAssignment {
    /// Clusters, most prominent first
    pub clusters: Vec<StyleCluster>,
    pub levels: BTreeMap<StyleSignature, HeadingLevel>,
}

impl LevelAssignment {
    /// Level for a style, if the style made it into the outline.
    pub fn level_of(&self, signature: StyleSignature) -> Option<HeadingLevel> {
        self.levels.get(&signature).copied()
    }
}

/// Group candidates by style, rank the groups, and assign H1..H3.
pub fn group_and_assign(
    candidates: &[HeadingCandidate],
    spans: &[Span],
    profile: &FontProfile,
    config: &HeuristicConfig,
) -> LevelAssignment {
    if candidates.is_empty() {
        return LevelAssignment::default();
    }

    let mut groups: BTreeMap<StyleSignature, Vec<usize>> = BTreeMap::new();
    for candidate in candidates {
        groups
            .entry(candidate.signature)
            .or_default()
            .push(candidate.index);
    }

    let total = candidates.len() as f32;
    let mut clusters: Vec<StyleCluster> = groups
        .into_iter()
        .map(|(signature, mut members)| {
            members.sort_unstable();
            let prominence = prominence(signature, &members, spans, total, profile, config);
            let first_occurrence = members
                .iter()
                .map(|&i| (spans[i].page, spans[i].bbox.y0))
                .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)))
                .unwrap_or((0, 0.0));
            StyleCluster {
                signature,
                members,
                prominence,
                first_occurrence,
            }
        })
        .collect();

    clusters.sort_by(compare_clusters);

    let mut levels = BTreeMap::new();
    for (rank, cluster) in clusters.iter().enumerate() {
        let level = match HeadingLevel::from_rank(rank) {
            Some(level) => Some(level),
            None if config.overflow_policy == OverflowPolicy::MergeIntoH3 => Some(HeadingLevel::H3),
            None => None,
        };
        match level {
            Some(level) => {
                log::debug!(
                    "Style {} -> {} (prominence {:.4}, {} spans)",
                    cluster.signature,
                    level,
                    cluster.prominence,
                    cluster.members.len()
                );
                levels.insert(cluster.signature, level);
            }
            None => log::debug!(
                "Style {} dropped (rank {}, {} spans)",
                cluster.signature,
                rank + 1,
                cluster.members.len()
            ),
        }
    }

    LevelAssignment { clusters, levels }
}

/// Larger, bolder, rarer and shorter styles rank higher.
fn prominence(
    signature: StyleSignature,
    members: &[usize],
    spans: &[Span],
    total: f32,
    profile: &FontProfile,
    config: &HeuristicConfig,
) -> f32 {
    let size_term = profile.relative_size(signature.size.points()).min(1.0);
    let bold_term = if signature.bold { 1.0 } else { 0.0 };
    let rarity = 1.0 - members.len() as f32 / total;
    let avg_len = members
        .iter()
        .map(|&i| spans[i].text.trim().chars().count())
        .sum::<usize>()
        / members.len().max(1);
    let brevity_term = brevity(avg_len, config.max_heading_chars);

    let raw = 0.55 * size_term + 0.20 * bold_term + 0.15 * rarity + 0.10 * brevity_term;
    quantize(raw)
}

fn quantize(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

fn compare_clusters(a: &StyleCluster, b: &StyleCluster) -> Ordering {
    b.prominence
        .total_cmp(&a.prominence)
        .then_with(|| b.signature.size.cmp(&a.signature.size))
        .then_with(|| a.first_occurrence.0.cmp(&b.first_occurrence.0))
        .then_with(|| a.first_occurrence.1.total_cmp(&b.first_occurrence.1))
        // Identical size and position leaves only boldness to tell them apart.
        .then_with(|| b.signature.bold.cmp(&a.signature.bold))
}
