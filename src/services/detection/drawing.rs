// Drawing Description Analyzer
// Scores patent figure sentences ("Figure 2 shows ...") for the reference-numeral
// and connector patterns that human drafters produce and generators tend to miss.

use crate::services::patterns::connector_regexes;
use crate::services::text_processor::split_at_boundaries;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use super::analyzers::NO_TEXT;

/// Score used when figure sentences carry no reference numerals at all.
const NO_REFERENCE_SCORE: f64 = 0.9;
/// Reference density at which the density sub-score reaches 0.
const REF_DENSITY_SATURATION: f64 = 2.0;

const SINGLETON_WEIGHT: f64 = 0.45;
const REF_DENSITY_WEIGHT: f64 = 0.35;
const CONNECTOR_WEIGHT: f64 = 0.20;

fn figure_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(fig(?:\.|ure)?\s*\d+)\b").expect("figure regex"))
}

/// Reference numerals such as `12`, `12a`, `140B`. The figure index itself
/// ("1" in "Figure 1") also matches and is counted as a reference.
fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\d{1,4}[a-z]?)\b").expect("reference regex"))
}

/// Raw counts gathered from the figure sentences of one text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingStats {
    pub figure_sentences: usize,
    pub total_refs: usize,
    pub unique_refs: usize,
    pub singleton_refs: usize,
    pub connector_sentences: usize,
}

impl DrawingStats {
    pub fn singleton_rate(&self) -> f64 {
        if self.unique_refs == 0 {
            1.0
        } else {
            self.singleton_refs as f64 / self.unique_refs as f64
        }
    }

    pub fn refs_per_sentence(&self) -> f64 {
        if self.figure_sentences == 0 {
            0.0
        } else {
            self.total_refs as f64 / self.figure_sentences as f64
        }
    }

    pub fn connectors_per_sentence(&self) -> f64 {
        if self.figure_sentences == 0 {
            0.0
        } else {
            self.connector_sentences as f64 / self.figure_sentences as f64
        }
    }

    /// Weighted blend of the singleton, density and connector sub-scores.
    pub fn combined_score(&self) -> f64 {
        let score_singleton = self.singleton_rate().clamp(0.0, 1.0);
        let score_ref_density = ((REF_DENSITY_SATURATION - self.refs_per_sentence())
            / REF_DENSITY_SATURATION)
            .clamp(0.0, 1.0);
        let score_connectors = (1.0 - self.connectors_per_sentence().min(1.0)).clamp(0.0, 1.0);

        (SINGLETON_WEIGHT * score_singleton
            + REF_DENSITY_WEIGHT * score_ref_density
            + CONNECTOR_WEIGHT * score_connectors)
            .clamp(0.0, 1.0)
    }
}

/// Collect figure-sentence statistics. Returns `None` when no sentence references a figure.
/// Sentences are cut at every boundary with no abbreviation handling, so the period
/// of "FIG. 1" ends a sentence and leaves "FIG." without its number.
pub fn collect_drawing_stats(text: &str) -> Option<DrawingStats> {
    let sentences: Vec<String> = split_at_boundaries(text.trim())
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .collect();

    let figure_sentences: Vec<&String> = sentences
        .iter()
        .filter(|s| figure_re().is_match(s))
        .collect();
    if figure_sentences.is_empty() {
        return None;
    }

    let connectors = connector_regexes();
    let mut ref_counts: HashMap<String, usize> = HashMap::new();
    let mut total_refs = 0;
    let mut connector_sentences = 0;

    for sentence in &figure_sentences {
        for m in reference_re().find_iter(sentence) {
            *ref_counts.entry(m.as_str().to_lowercase()).or_insert(0) += 1;
            total_refs += 1;
        }
        if connectors.iter().any(|re| re.is_match(sentence)) {
            connector_sentences += 1;
        }
    }

    Some(DrawingStats {
        figure_sentences: figure_sentences.len(),
        total_refs,
        unique_refs: ref_counts.len(),
        singleton_refs: ref_counts.values().filter(|&&c| c == 1).count(),
        connector_sentences,
    })
}

pub fn analyze_drawing_descriptions(text: &str) -> (f64, String) {
    if text.trim().is_empty() {
        return (0.0, NO_TEXT.to_string());
    }

    let Some(stats) = collect_drawing_stats(text) else {
        return (0.0, "No figure description sentences detected.".to_string());
    };

    if stats.total_refs == 0 {
        return (
            NO_REFERENCE_SCORE,
            format!(
                "No numeric references found in {} figure sentence(s); this is atypical for patent drawings.",
                stats.figure_sentences
            ),
        );
    }

    let details = format!(
        "Figure sentences: {}, total refs: {}, unique refs: {}; singleton refs: {} ({:.2}); \
         refs/fig-sent: {:.2}; connector density: {:.2}/sentence.",
        stats.figure_sentences,
        stats.total_refs,
        stats.unique_refs,
        stats.singleton_refs,
        stats.singleton_rate(),
        stats.refs_per_sentence(),
        stats.connectors_per_sentence(),
    );
    (stats.combined_score(), details)
}
