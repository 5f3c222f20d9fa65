// Lexicon Tables
// Phrase patterns and word lists associated with machine-written patent prose

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Boilerplate phrases that language models lean on in patent drafting.
pub const AI_PHRASE_PATTERNS: &[&str] = &[
    r"\bin accordance with\b",
    r"\bin one embodiment\b",
    r"\bit should be noted that\b",
    r"\bit is worth noting\b",
    r"\bfurthermore\b",
    r"\bmoreover\b",
    r"\badditionally\b",
    r"\bin some implementations\b",
    r"\bas described herein\b",
    r"\bin various embodiments\b",
    r"\bthe present disclosure\b",
    r"\bby way of example\b",
    r"\bwithout limitation\b",
    r"\bone skilled in the art\b",
    r"\bit will be appreciated\b",
    r"\bit is contemplated\b",
    r"\bin certain aspects\b",
    r"\bas will be understood\b",
];

pub const FILLER_PATTERNS: &[&str] = &[
    r"\bin this regard\b",
    r"\bin this manner\b",
    r"\bin this context\b",
    r"\bto this end\b",
    r"\bwith respect to\b",
    r"\bwith regard to\b",
    r"\bin terms of\b",
    r"\bby virtue of\b",
];

pub const TRANSITION_MARKERS: &[&str] = &[
    "however",
    "therefore",
    "consequently",
    "furthermore",
    "moreover",
    "additionally",
    "specifically",
    "particularly",
    "notably",
    "importantly",
    "significantly",
    "essentially",
    "fundamentally",
    "accordingly",
    "thus",
    "hence",
];

pub const HEDGING_WORDS: &[&str] = &[
    "may",
    "might",
    "could",
    "can",
    "possibly",
    "potentially",
    "generally",
    "typically",
    "usually",
    "often",
    "sometimes",
    "substantially",
    "approximately",
    "relatively",
    "somewhat",
];

/// Openers that dominate generated sentences. Not scored; the uniformity
/// analyzer names them in its explanation.
pub const AI_STARTERS: &[&str] = &["the", "in", "a", "this", "these", "an", "according"];

/// Spatial and relational phrases expected in genuine drawing descriptions.
pub const DRAWING_CONNECTORS: &[&str] = &[
    "connected to",
    "connected with",
    "coupled to",
    "coupled with",
    "adjacent to",
    "via",
    "through",
    "hinge",
    "slot",
    "aperture",
    "channel",
    "passage",
    "mounted to",
    "secured to",
    "mated with",
    "attached to",
    "in communication with",
    "in fluid communication",
    "interface",
    "joined to",
    "pivotally",
    "slidably",
    "rotatably",
];

/// Phrase + filler patterns compiled case-insensitively, phrase list first.
pub fn phrase_regexes() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        AI_PHRASE_PATTERNS
            .iter()
            .chain(FILLER_PATTERNS.iter())
            .map(|p| Regex::new(&format!("(?i){}", p)).expect("phrase pattern"))
            .collect()
    })
}

pub fn connector_regexes() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        DRAWING_CONNECTORS
            .iter()
            .map(|c| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(c))).expect("connector pattern"))
            .collect()
    })
}

pub fn transition_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| TRANSITION_MARKERS.iter().copied().collect())
}

pub fn hedging_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| HEDGING_WORDS.iter().copied().collect())
}
