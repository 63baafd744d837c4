//! Heuristic tuning parameters.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What to do with heading styles ranked below the third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Leave them out of the outline
    #[default]
    Drop,
    /// Emit them as H3
    MergeIntoH3,
}

/// Weights and thresholds for heading and title detection.
///
/// Every field has a default, so a JSON config file only needs to list the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Below this many spans the body size falls back to the smallest size
    pub min_spans_for_statistics: usize,

    /// Weight of the relative size term
    pub size_weight: f32,
    /// Weight of the bold term
    pub bold_weight: f32,
    /// Weight of the brevity term
    pub brevity_weight: f32,
    /// Weight of the numbering / keyword pattern term
    pub pattern_weight: f32,
    /// Weight of the position term
    pub position_weight: f32,

    /// Relative size (`(size - body) / body`) at which the size term reaches 1.0
    pub size_saturation: f32,
    /// Spans longer than this are treated as paragraph text
    pub max_heading_chars: usize,
    /// Score ceiling for spans longer than `max_heading_chars`
    pub long_span_score_cap: f32,
    /// Shorter headings are ignored
    pub min_heading_chars: usize,
    /// Minimum composite score for a heading candidate
    pub acceptance_threshold: f32,
    /// Gap above or below a span, in line heights, that counts as isolation
    pub isolation_gap_ratio: f32,

    /// Vertical bucket size (points) when matching running headers
    pub header_position_tolerance: f32,
    /// Pages a string must repeat on to count as a running header
    pub min_repeat_pages: usize,

    /// Handling of styles ranked past H3
    pub overflow_policy: OverflowPolicy,

    /// Longer page-1 spans are not considered for the title
    pub max_title_chars: usize,
    /// Spans of page 2 to consider when page 1 has no title (0 disables)
    pub title_fallback_spans: usize,
    /// Drop headings whose text repeats an earlier heading
    pub dedupe_headings: bool,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            min_spans_for_statistics: 3,
            size_weight: 0.40,
            bold_weight: 0.20,
            brevity_weight: 0.15,
            pattern_weight: 0.15,
            position_weight: 0.10,
            size_saturation: 0.5,
            max_heading_chars: 150,
            long_span_score_cap: 0.05,
            min_heading_chars: 3,
            acceptance_threshold: 0.35,
            isolation_gap_ratio: 0.5,
            header_position_tolerance: 4.0,
            min_repeat_pages: 3,
            overflow_policy: OverflowPolicy::Drop,
            max_title_chars: 200,
            title_fallback_spans: 0,
            dedupe_headings: true,
        }
    }
}

impl HeuristicConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |message: String| Error::Config {
            path: path.to_path_buf(),
            message,
        };

        let data = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config: Self = serde_json::from_str(&data).map_err(|e| config_error(e.to_string()))?;
        if config.acceptance_threshold.is_nan() || config.size_saturation <= 0.0 {
            return Err(config_error(
                "acceptance_threshold must be a number and size_saturation positive".to_string(),
            ));
        }
        Ok(config)
    }

    /// Set the candidate acceptance threshold.
    pub fn with_acceptance_threshold(mut self, threshold: f32) -> Self {
        self.acceptance_threshold = threshold;
        self
    }

    /// Set the overflow policy for styles past H3.
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Consider the first `spans` spans of page 2 when page 1 has no title.
    pub fn with_title_fallback(mut self, spans: usize) -> Self {
        self.title_fallback_spans = spans;
        self
    }

    /// Enable or disable dropping of repeated headings.
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe_headings = dedupe;
        self
    }

    /// Set the running-header repeat threshold.
    pub fn with_min_repeat_pages(mut self, pages: usize) -> Self {
        self.min_repeat_pages = pages.max(1);
        self
    }

    /// Set the maximum heading length.
    pub fn with_max_heading_chars(mut self, chars: usize) -> Self {
        self.max_heading_chars = chars.max(1);
        self
    }
}
