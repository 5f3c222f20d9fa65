// Text Processing Service
// Tokenization, sentence/paragraph segmentation and the statistics the analyzers share

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Placeholder for the period inside protected abbreviations.
const MASKED_DOT: char = '\u{0}';

fn non_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\-']+").expect("non-word regex"))
}

fn abbreviation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(e\.g|i\.e|etc)\.").expect("abbreviation regex"))
}

fn sentence_boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.?!;]\s+").expect("sentence boundary regex"))
}

fn paragraph_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n+").expect("paragraph regex"))
}

/// Lowercase word tokens with punctuation removed.
/// Dashes and apostrophes survive only inside a token.
pub fn extract_words_only(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }

    let normalized = text.replace(['\u{2013}', '\u{2014}'], "-");
    let normalized = non_word_re().replace_all(&normalized, " ");

    normalized
        .split_whitespace()
        .map(|t| t.trim_matches(|c| c == '-' || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Split on `.?!;` runs followed by whitespace at the punctuation.
/// The terminator stays with its sentence; whitespace is dropped.
pub fn split_at_boundaries(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut cursor = 0;
    for m in sentence_boundary_re().find_iter(text) {
        // Terminators are single-byte ASCII, so start + 1 is a char boundary.
        parts.push(text[cursor..m.start() + 1].to_string());
        cursor = m.end();
    }
    parts.push(text[cursor..].to_string());
    parts
}

/// Lightweight sentence splitter. `e.g.`, `i.e.` and `etc.` do not end a sentence.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }

    let protected = abbreviation_re().replace_all(text, |caps: &regex::Captures| {
        caps[0].replace('.', &MASKED_DOT.to_string())
    });

    split_at_boundaries(&protected)
        .into_iter()
        .map(|p| p.replace(MASKED_DOT, ".").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Paragraphs separated by one or more blank lines, trimmed, empties dropped.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    paragraph_break_re()
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

pub fn word_count(text: &str) -> usize {
    extract_words_only(text).len()
}

pub fn density_per_1000_words(count: usize, total_words: usize) -> f64 {
    if total_words == 0 {
        return 0.0;
    }
    count as f64 / total_words as f64 * 1000.0
}

/// Sample standard deviation over mean. Saturates to 0.0 for fewer than two
/// values or a zero mean.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt() / mean
}

fn type_token_ratio<S: AsRef<str>>(tokens: &[S]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = tokens.iter().map(|t| t.as_ref()).collect();
    unique.len() as f64 / tokens.len() as f64
}

/// Type/token ratio averaged over windows of `window` tokens with a half-window step.
/// Sequences no longer than the window use the plain ratio. A zero window becomes 50.
pub fn moving_average_ttr<S: AsRef<str>>(tokens: &[S], window: usize) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let window = if window == 0 { 50 } else { window };
    if tokens.len() <= window {
        return type_token_ratio(tokens);
    }

    let step = (window / 2).max(1);
    let ratios: Vec<f64> = (0..=tokens.len() - window)
        .step_by(step)
        .map(|i| type_token_ratio(&tokens[i..i + window]))
        .collect();

    if ratios.is_empty() {
        0.0
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    }
}

/// Contiguous n-grams. Empty for `n <= 1` or empty input.
pub fn create_ngrams<S: AsRef<str>>(tokens: &[S], n: usize) -> Vec<Vec<String>> {
    if n <= 1 || tokens.len() < n {
        return vec![];
    }
    tokens
        .windows(n)
        .map(|w| w.iter().map(|t| t.as_ref().to_string()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_words_only() {
        let words = extract_words_only("The self-locking hinge's pin -- (12a) rotates!");
        assert_eq!(words, vec!["the", "self-locking", "hinge's", "pin", "12a", "rotates"]);
        assert!(extract_words_only("").is_empty());
        assert!(extract_words_only("  ... !!").is_empty());
    }

    #[test]
    fn test_extract_words_strips_edge_apostrophes_and_dashes() {
        let words = extract_words_only("'quoted' word\u{2014}break -lead trail-");
        assert_eq!(words, vec!["quoted", "word-break", "lead", "trail"]);
    }

    #[test]
    fn test_split_into_sentences() {
        let text = "First sentence. Second one? Third! Fourth; fifth.";
        let sentences = split_into_sentences(text);
        assert_eq!(sentences, vec!["First sentence.", "Second one?", "Third!", "Fourth;", "fifth."]);
    }

    #[test]
    fn test_split_protects_abbreviations() {
        let text = "Fasteners, e.g. screws, may be used. Other parts, i.e. pins, etc. are omitted.";
        let sentences = split_into_sentences(text);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "Fasteners, e.g. screws, may be used.");
        assert_eq!(sentences[1], "Other parts, i.e. pins, etc. are omitted.");
    }

    #[test]
    fn test_split_requires_whitespace_after_terminator() {
        let sentences = split_into_sentences("Version 1.5 is here.Next");
        assert_eq!(sentences, vec!["Version 1.5 is here.Next"]);
        assert!(split_into_sentences("").is_empty());
        assert!(split_into_sentences("   ").is_empty());
    }

    #[test]
    fn test_split_paragraphs() {
        let paragraphs = split_paragraphs("One para.\n\n  \n\nTwo para.\nStill two.\n\n");
        assert_eq!(paragraphs, vec!["One para.", "Two para.\nStill two."]);
    }

    #[test]
    fn test_density_per_1000_words() {
        assert_eq!(density_per_1000_words(5, 0), 0.0);
        assert_eq!(density_per_1000_words(2, 100), 20.0);
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert_eq!(coefficient_of_variation(&[]), 0.0);
        assert_eq!(coefficient_of_variation(&[4.0]), 0.0);
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), 0.0);
        assert_eq!(coefficient_of_variation(&[3.0, 3.0, 3.0]), 0.0);
        // mean 2, sample std 1
        let cv = coefficient_of_variation(&[1.0, 2.0, 3.0]);
        assert!((cv - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_ttr_short_sequences() {
        let distinct = ["a", "b", "c", "d"];
        assert_eq!(moving_average_ttr(&distinct, 100), 1.0);
        let repeated = ["x"; 8];
        assert_eq!(moving_average_ttr(&repeated, 100), 1.0 / 8.0);
        let empty: [&str; 0] = [];
        assert_eq!(moving_average_ttr(&empty, 100), 0.0);
    }

    #[test]
    fn test_moving_average_ttr_windows() {
        // Windows of 4 with step 2 over [a b c d a a a a]:
        // [a b c d] = 1.0, [c d a a] = 0.75, [a a a a] = 0.25
        let tokens = ["a", "b", "c", "d", "a", "a", "a", "a"];
        let ttr = moving_average_ttr(&tokens, 4);
        assert!((ttr - (1.0 + 0.75 + 0.25) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_ttr_zero_window_defaults() {
        let tokens: Vec<String> = (0..60).map(|i| format!("w{}", i)).collect();
        assert_eq!(moving_average_ttr(&tokens, 0), 1.0);
    }

    #[test]
    fn test_create_ngrams() {
        let tokens = ["a", "b", "c"];
        assert_eq!(
            create_ngrams(&tokens, 2),
            vec![vec!["a".to_string(), "b".to_string()], vec!["b".to_string(), "c".to_string()]]
        );
        assert!(create_ngrams(&tokens, 1).is_empty());
        assert!(create_ngrams(&tokens, 4).is_empty());
    }
}
