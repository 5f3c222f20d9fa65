// Feature Analyzers
// Independent text heuristics. Each returns (score, explanation) where score is
// in [0, 1] and higher means more AI-like for that feature.

use crate::models::Feature;
use crate::services::patterns::{hedging_set, phrase_regexes, transition_set, AI_STARTERS};
use crate::services::text_processor::{
    coefficient_of_variation, density_per_1000_words, extract_words_only, moving_average_ttr,
    split_into_sentences, split_paragraphs, word_count,
};
use std::collections::{HashMap, HashSet};

use super::drawing::analyze_drawing_descriptions;

pub const NO_TEXT: &str = "No text provided.";

/// Transition markers per 1000 words that saturate the score.
const TRANSITION_SATURATION: f64 = 20.0;
/// Hedging words per 1000 words that saturate the score.
const HEDGING_SATURATION: f64 = 15.0;
const SENTENCE_CV_CEILING: f64 = 0.35;
const PARAGRAPH_CV_CEILING: f64 = 0.3;
const TTR_WINDOW: usize = 100;

pub type AnalyzerFn = fn(&str) -> (f64, String);

pub fn analyzer_for(feature: Feature) -> AnalyzerFn {
    match feature {
        Feature::AiPatterns => analyze_ai_patterns,
        Feature::Transitions => analyze_transitions,
        Feature::Hedging => analyze_hedging,
        Feature::Repetition => analyze_repetition,
        Feature::VocabDiversity => analyze_vocabulary_diversity,
        Feature::SentenceStructure => analyze_sentence_structure,
        Feature::Uniformity => analyze_uniformity,
        Feature::Burstiness => analyze_burstiness,
        Feature::DrawingDescriptions => analyze_drawing_descriptions,
    }
}

#[inline]
fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Tokens in first-seen order with their counts, most frequent first.
/// Ties keep first-occurrence order.
fn ranked_counts(tokens: &[String]) -> Vec<(&str, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for t in tokens {
        match index.get(t.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(t.as_str(), counts.len());
                counts.push((t.as_str(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Fraction of the phrase and filler patterns found anywhere in the text.
pub fn analyze_ai_patterns(text: &str) -> (f64, String) {
    if is_blank(text) {
        return (0.0, NO_TEXT.to_string());
    }
    let patterns = phrase_regexes();
    let total = patterns.len();
    let matches = patterns.iter().filter(|re| re.is_match(text)).count();
    let score = (matches as f64 / total.max(1) as f64).min(1.0);
    (score, format!("Matched {}/{} AI-typical phrases.", matches, total))
}

fn lexicon_density(text: &str, lexicon: &HashSet<&'static str>) -> (usize, f64) {
    let tokens = extract_words_only(text);
    let count = tokens.iter().filter(|t| lexicon.contains(t.as_str())).count();
    (count, density_per_1000_words(count, tokens.len()))
}

pub fn analyze_transitions(text: &str) -> (f64, String) {
    if is_blank(text) {
        return (0.0, NO_TEXT.to_string());
    }
    let (count, density) = lexicon_density(text, transition_set());
    let score = (density / TRANSITION_SATURATION).clamp(0.0, 1.0);
    (
        score,
        format!("Transition density {:.1}/1000 words (count={}).", density, count),
    )
}

pub fn analyze_hedging(text: &str) -> (f64, String) {
    if is_blank(text) {
        return (0.0, NO_TEXT.to_string());
    }
    let (count, density) = lexicon_density(text, hedging_set());
    let score = (density / HEDGING_SATURATION).clamp(0.0, 1.0);
    (
        score,
        format!("Hedging density {:.1}/1000 words (count={}).", density, count),
    )
}

/// Share of tokens taken by the five most frequent words, doubled.
pub fn analyze_repetition(text: &str) -> (f64, String) {
    if is_blank(text) {
        return (0.0, NO_TEXT.to_string());
    }
    let tokens = extract_words_only(text);
    if tokens.is_empty() {
        return (0.0, "No tokens.".to_string());
    }

    let ranked = ranked_counts(&tokens);
    let top: Vec<(&str, usize)> = ranked.into_iter().take(5).collect();
    let top_total: usize = top.iter().map(|(_, c)| c).sum();
    let score = (2.0 * top_total as f64 / tokens.len() as f64).clamp(0.0, 1.0);

    let details = top
        .iter()
        .map(|(w, c)| format!("{}:{}", w, c))
        .collect::<Vec<_>>()
        .join(", ");
    (
        score,
        format!(
            "Top-5 words cover {}/{} tokens. [{}]",
            top_total,
            tokens.len(),
            details
        ),
    )
}

/// Low vocabulary diversity reads as AI-like, so the moving TTR is inverted.
pub fn analyze_vocabulary_diversity(text: &str) -> (f64, String) {
    if is_blank(text) {
        return (0.0, NO_TEXT.to_string());
    }
    let tokens = extract_words_only(text);
    if tokens.is_empty() {
        return (0.0, "No tokens.".to_string());
    }
    let ttr = moving_average_ttr(&tokens, TTR_WINDOW);
    let score = (1.0 - ttr).clamp(0.0, 1.0);
    (score, format!("Moving average TTR ~ {:.2}.", ttr))
}

pub fn analyze_sentence_structure(text: &str) -> (f64, String) {
    if is_blank(text) {
        return (0.0, NO_TEXT.to_string());
    }
    let sentences = split_into_sentences(text);
    let lengths: Vec<f64> = sentences.iter().map(|s| word_count(s) as f64).collect();
    let cv = coefficient_of_variation(&lengths);
    let score = if cv <= 0.0 {
        0.0
    } else {
        ((SENTENCE_CV_CEILING - cv.min(SENTENCE_CV_CEILING)) / SENTENCE_CV_CEILING).clamp(0.0, 1.0)
    };
    (
        score,
        format!("Sentence length CV={:.2} over {} sentences.", cv, sentences.len()),
    )
}

/// Dominance of the most common sentence-opening word.
pub fn analyze_uniformity(text: &str) -> (f64, String) {
    if is_blank(text) {
        return (0.0, NO_TEXT.to_string());
    }
    let starters: Vec<String> = split_into_sentences(text)
        .iter()
        .filter_map(|s| extract_words_only(s).into_iter().next())
        .collect();
    if starters.is_empty() {
        return (0.0, "No sentences.".to_string());
    }

    let ranked = ranked_counts(&starters);
    let (top_word, top) = ranked[0];
    let score = (top as f64 / starters.len() as f64).min(1.0);

    let mut explanation = format!(
        "Most frequent sentence starter occurs {}/{} sentences.",
        top,
        starters.len()
    );
    if top > 1 && AI_STARTERS.iter().any(|s| *s == top_word) {
        explanation.push_str(&format!(" Dominant opener '{}' is a common generated-text starter.", top_word));
    }
    (score, explanation)
}

/// Paragraph length variability. Flat paragraph lengths read as AI-like.
pub fn analyze_burstiness(text: &str) -> (f64, String) {
    if is_blank(text) {
        return (0.0, NO_TEXT.to_string());
    }
    let lengths: Vec<f64> = split_paragraphs(text)
        .into_iter()
        .map(|p| word_count(p) as f64)
        .collect();
    let cv = coefficient_of_variation(&lengths);
    let score = if lengths.is_empty() {
        0.0
    } else {
        ((PARAGRAPH_CV_CEILING - cv.min(PARAGRAPH_CV_CEILING)) / PARAGRAPH_CV_CEILING).clamp(0.0, 1.0)
    };
    (
        score,
        format!("Paragraph length CV={:.2} over {} paragraphs.", cv, lengths.len()),
    )
}
