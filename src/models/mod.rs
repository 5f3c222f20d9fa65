// PatentAI Data Models
// Result records, feature names and weight maps shared by every service

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// ============ Detection Result ============

/// Outcome of one analysis. Built fresh per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub is_likely_ai_generated: bool,
    pub confidence_score: f64,
    pub risk_level: String,
    #[serde(default)]
    pub feature_scores: HashMap<String, f64>,
    #[serde(default)]
    pub detailed_analysis: HashMap<String, String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

// ============ Features ============

/// The nine heuristic analyzers, in the order the aggregator runs them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Feature {
    AiPatterns,
    Transitions,
    Hedging,
    Repetition,
    VocabDiversity,
    SentenceStructure,
    Uniformity,
    Burstiness,
    DrawingDescriptions,
}

impl Feature {
    pub const ALL: [Feature; 9] = [
        Feature::AiPatterns,
        Feature::Transitions,
        Feature::Hedging,
        Feature::Repetition,
        Feature::VocabDiversity,
        Feature::SentenceStructure,
        Feature::Uniformity,
        Feature::Burstiness,
        Feature::DrawingDescriptions,
    ];

    /// Canonical key used in `feature_scores` and weight maps.
    pub fn name(self) -> &'static str {
        match self {
            Feature::AiPatterns => "ai_patterns",
            Feature::Transitions => "transitions",
            Feature::Hedging => "hedging",
            Feature::Repetition => "repetition",
            Feature::VocabDiversity => "vocab_diversity",
            Feature::SentenceStructure => "sentence_structure",
            Feature::Uniformity => "uniformity",
            Feature::Burstiness => "burstiness",
            Feature::DrawingDescriptions => "drawing_descriptions",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Feature::ALL.into_iter().find(|f| f.name() == name.trim())
    }
}

// ============ Feature Weights ============

#[derive(Error, Debug, PartialEq)]
pub enum WeightsError {
    #[error("unknown feature name: {0}")]
    UnknownFeature(String),
    #[error("weight for {feature} must be a finite non-negative number, got {value}")]
    InvalidWeight { feature: String, value: f64 },
    #[error("malformed weight entry (expected name=value): {0}")]
    Malformed(String),
}

/// Per-feature weights. Fields missing from a serialized map read as 0.0 and
/// unknown field names are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureWeights {
    #[serde(default)]
    pub ai_patterns: f64,
    #[serde(default)]
    pub transitions: f64,
    #[serde(default)]
    pub hedging: f64,
    #[serde(default)]
    pub repetition: f64,
    #[serde(default)]
    pub vocab_diversity: f64,
    #[serde(default)]
    pub sentence_structure: f64,
    #[serde(default)]
    pub uniformity: f64,
    #[serde(default)]
    pub burstiness: f64,
    #[serde(default)]
    pub drawing_descriptions: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self::preset(WeightPreset::Balanced)
    }
}

impl FeatureWeights {
    pub fn zero() -> Self {
        Self {
            ai_patterns: 0.0,
            transitions: 0.0,
            hedging: 0.0,
            repetition: 0.0,
            vocab_diversity: 0.0,
            sentence_structure: 0.0,
            uniformity: 0.0,
            burstiness: 0.0,
            drawing_descriptions: 0.0,
        }
    }

    pub fn preset(preset: WeightPreset) -> Self {
        match preset {
            WeightPreset::Balanced => Self {
                ai_patterns: 0.25,
                transitions: 0.12,
                hedging: 0.12,
                repetition: 0.11,
                vocab_diversity: 0.11,
                sentence_structure: 0.09,
                uniformity: 0.05,
                burstiness: 0.05,
                drawing_descriptions: 0.10,
            },
            WeightPreset::Conservative => Self {
                ai_patterns: 0.22,
                transitions: 0.10,
                hedging: 0.10,
                repetition: 0.12,
                vocab_diversity: 0.13,
                sentence_structure: 0.13,
                uniformity: 0.07,
                burstiness: 0.08,
                drawing_descriptions: 0.05,
            },
            WeightPreset::Aggressive => Self {
                ai_patterns: 0.30,
                transitions: 0.16,
                hedging: 0.16,
                repetition: 0.10,
                vocab_diversity: 0.09,
                sentence_structure: 0.07,
                uniformity: 0.05,
                burstiness: 0.04,
                drawing_descriptions: 0.03,
            },
        }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::AiPatterns => self.ai_patterns,
            Feature::Transitions => self.transitions,
            Feature::Hedging => self.hedging,
            Feature::Repetition => self.repetition,
            Feature::VocabDiversity => self.vocab_diversity,
            Feature::SentenceStructure => self.sentence_structure,
            Feature::Uniformity => self.uniformity,
            Feature::Burstiness => self.burstiness,
            Feature::DrawingDescriptions => self.drawing_descriptions,
        }
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        let slot = match feature {
            Feature::AiPatterns => &mut self.ai_patterns,
            Feature::Transitions => &mut self.transitions,
            Feature::Hedging => &mut self.hedging,
            Feature::Repetition => &mut self.repetition,
            Feature::VocabDiversity => &mut self.vocab_diversity,
            Feature::SentenceStructure => &mut self.sentence_structure,
            Feature::Uniformity => &mut self.uniformity,
            Feature::Burstiness => &mut self.burstiness,
            Feature::DrawingDescriptions => &mut self.drawing_descriptions,
        };
        *slot = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    pub fn total(&self) -> f64 {
        self.iter().map(|(_, w)| w).sum()
    }

    /// Scale so the weights sum to 1.0. A zero-sum map is returned unchanged.
    pub fn normalized(&self) -> Self {
        let sum = self.total();
        if sum <= 0.0 {
            return *self;
        }
        let mut out = *self;
        for feature in Feature::ALL {
            out.set(feature, self.get(feature) / sum);
        }
        out
    }

    /// Build from a loose name -> weight map. Absent features get 0.0.
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Self, WeightsError> {
        let mut weights = Self::zero();
        for (name, &value) in map {
            let feature =
                Feature::from_name(name).ok_or_else(|| WeightsError::UnknownFeature(name.clone()))?;
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::InvalidWeight {
                    feature: name.clone(),
                    value,
                });
            }
            weights.set(feature, value);
        }
        Ok(weights)
    }

    /// Parse `name=value,name=value` as accepted on the command line.
    pub fn parse_pairs(pairs: &str) -> Result<Self, WeightsError> {
        let mut map = HashMap::new();
        for pair in pairs.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| WeightsError::Malformed(pair.to_string()))?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| WeightsError::Malformed(pair.to_string()))?;
            map.insert(name.trim().to_string(), value);
        }
        Self::from_map(&map)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightPreset {
    #[default]
    Balanced,
    Conservative,
    Aggressive,
}

impl WeightPreset {
    pub fn from_str(val: &str) -> Option<Self> {
        match val.trim().to_lowercase().as_str() {
            "balanced" | "default" => Some(Self::Balanced),
            "conservative" => Some(Self::Conservative),
            "aggressive" => Some(Self::Aggressive),
            _ => None,
        }
    }
}

// ============ Hybrid ============

/// Blend weights for the heuristic and LLM confidences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridWeights {
    #[serde(default = "default_traditional_weight")]
    pub traditional: f64,
    #[serde(default = "default_ai_weight")]
    pub ai: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            traditional: default_traditional_weight(),
            ai: default_ai_weight(),
        }
    }
}

impl HybridWeights {
    /// Both weights must be finite and non-negative.
    pub fn validate(&self) -> Result<(), WeightsError> {
        for (name, value) in [("traditional", self.traditional), ("ai", self.ai)] {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::InvalidWeight {
                    feature: name.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

// ============ Detection Request ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    Heuristic,
    Hybrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    pub text: String,
    #[serde(default)]
    pub decision_threshold: Option<f64>,
    #[serde(default)]
    pub preset: Option<WeightPreset>,
    /// Explicit weights win over `preset` and are used exactly as given.
    #[serde(default)]
    pub feature_weights: Option<FeatureWeights>,
    #[serde(default)]
    pub mode: AnalysisMode,
    #[serde(default)]
    pub model: Option<String>,
}

impl DetectRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            decision_threshold: None,
            preset: None,
            feature_weights: None,
            mode: AnalysisMode::Heuristic,
            model: None,
        }
    }
}

// ============ Default Value Functions ============

fn default_traditional_weight() -> f64 { 0.4 }
fn default_ai_weight() -> f64 { 0.6 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let total = FeatureWeights::default().total();
        assert!((total - 1.0).abs() < 1e-9);
        for preset in [WeightPreset::Conservative, WeightPreset::Aggressive] {
            assert!((FeatureWeights::preset(preset).total() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_weight_fields_read_as_zero() {
        let weights: FeatureWeights = serde_json::from_str(r#"{"hedging": 0.5}"#).unwrap();
        assert_eq!(weights.hedging, 0.5);
        assert_eq!(weights.ai_patterns, 0.0);
        assert_eq!(weights.drawing_descriptions, 0.0);
    }

    #[test]
    fn test_unknown_weight_field_rejected() {
        let parsed = serde_json::from_str::<FeatureWeights>(r#"{"hedgeing": 0.5}"#);
        assert!(parsed.is_err());

        let mut map = HashMap::new();
        map.insert("transition".to_string(), 0.3);
        assert_eq!(
            FeatureWeights::from_map(&map),
            Err(WeightsError::UnknownFeature("transition".to_string()))
        );
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = FeatureWeights::parse_pairs("hedging=-0.1").unwrap_err();
        assert!(matches!(err, WeightsError::InvalidWeight { .. }));
    }

    #[test]
    fn test_parse_pairs_and_normalize() {
        let weights = FeatureWeights::parse_pairs("ai_patterns=2, hedging=1,transitions=1").unwrap();
        assert_eq!(weights.repetition, 0.0);
        let norm = weights.normalized();
        assert!((norm.ai_patterns - 0.5).abs() < 1e-12);
        assert!((norm.hedging - 0.25).abs() < 1e-12);
        assert!((norm.total() - 1.0).abs() < 1e-12);

        assert!(matches!(
            FeatureWeights::parse_pairs("hedging"),
            Err(WeightsError::Malformed(_))
        ));
    }

    #[test]
    fn test_normalize_zero_sum_is_identity() {
        assert_eq!(FeatureWeights::zero().normalized(), FeatureWeights::zero());
    }

    #[test]
    fn test_feature_names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(Feature::from_name(feature.name()), Some(feature));
        }
        assert_eq!(Feature::from_name("llm_ai_assessment"), None);
    }

    #[test]
    fn test_hybrid_weights_validation() {
        assert!(HybridWeights::default().validate().is_ok());
        assert!(HybridWeights { traditional: 1.0, ai: 0.0 }.validate().is_ok());
        assert_eq!(
            HybridWeights { traditional: -0.4, ai: 0.6 }.validate(),
            Err(WeightsError::InvalidWeight { feature: "traditional".to_string(), value: -0.4 })
        );
        assert!(matches!(
            HybridWeights { traditional: 0.4, ai: f64::NAN }.validate(),
            Err(WeightsError::InvalidWeight { ref feature, .. }) if feature == "ai"
        ));
        assert!(HybridWeights { traditional: f64::INFINITY, ai: 0.6 }.validate().is_err());
    }

    #[test]
    fn test_detect_request_defaults() {
        let req: DetectRequest = serde_json::from_str(r#"{"text": "abc"}"#).unwrap();
        assert_eq!(req.mode, AnalysisMode::Heuristic);
        assert!(req.feature_weights.is_none());
        assert!(req.decision_threshold.is_none());
    }
}
