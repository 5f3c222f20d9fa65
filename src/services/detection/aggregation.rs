// Aggregation Logic
// Runs every feature analyzer and folds the scores into one weighted confidence

use crate::models::{DetectionResult, Feature, FeatureWeights, WeightPreset};
use crate::services::extraction::{extract_pdf_file, ExtractError};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::analyzers::analyzer_for;
use super::risk::{heuristic_recommendations, heuristic_risk_level};

pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.6;

/// Both signals must exceed this for the compounding bonus.
const COMPOUND_SIGNAL_MIN: f64 = 0.9;
const COMPOUND_BONUS: f64 = 0.10;

/// Heuristic detector: nine analyzers, a weight map and a decision threshold.
#[derive(Debug, Clone)]
pub struct PatentAiDetector {
    decision_threshold: f64,
    feature_weights: FeatureWeights,
}

impl Default for PatentAiDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DECISION_THRESHOLD, None)
    }
}

impl PatentAiDetector {
    /// `None` weights select the balanced preset. Supplied weights are used as given.
    pub fn new(decision_threshold: f64, feature_weights: Option<FeatureWeights>) -> Self {
        Self {
            decision_threshold,
            feature_weights: feature_weights.unwrap_or_default(),
        }
    }

    pub fn with_preset(decision_threshold: f64, preset: WeightPreset) -> Self {
        Self::new(decision_threshold, Some(FeatureWeights::preset(preset)))
    }

    pub fn decision_threshold(&self) -> f64 {
        self.decision_threshold
    }

    pub fn feature_weights(&self) -> &FeatureWeights {
        &self.feature_weights
    }

    pub fn analyze_text(&self, text: &str) -> DetectionResult {
        let mut feature_scores: HashMap<String, f64> = HashMap::new();
        let mut detailed_analysis: HashMap<String, String> = HashMap::new();

        for feature in Feature::ALL {
            let (score, explanation) = analyzer_for(feature)(text);
            let score = score.clamp(0.0, 1.0);
            debug!(feature = feature.name(), score, "feature.scored");
            feature_scores.insert(feature.name().to_string(), score);
            detailed_analysis.insert(feature.name().to_string(), explanation);
        }

        let confidence = combine_scores(&feature_scores, &self.feature_weights);
        let risk_level = heuristic_risk_level(confidence);

        info!(
            confidence,
            risk = risk_level,
            threshold = self.decision_threshold,
            chars = text.chars().count(),
            "heuristic.analysis"
        );

        DetectionResult {
            is_likely_ai_generated: confidence >= self.decision_threshold,
            confidence_score: confidence,
            risk_level: risk_level.to_string(),
            feature_scores,
            detailed_analysis,
            recommendations: heuristic_recommendations(confidence),
        }
    }

    /// Extract the PDF's text and analyze it.
    pub fn analyze_pdf(&self, pdf_path: &Path) -> Result<DetectionResult, ExtractError> {
        let text = extract_pdf_file(pdf_path)?;
        Ok(self.analyze_text(&text))
    }
}

/// Weighted sum over the weight map, plus the compounding bonus when transitions
/// and hedging are both near saturation, clamped to [0, 1].
/// Features absent from `scores` contribute nothing.
pub fn combine_scores(scores: &HashMap<String, f64>, weights: &FeatureWeights) -> f64 {
    let score_of = |feature: Feature| scores.get(feature.name()).copied().unwrap_or(0.0);

    let mut confidence: f64 = weights
        .iter()
        .map(|(feature, weight)| score_of(feature) * weight)
        .sum();

    if score_of(Feature::Transitions) > COMPOUND_SIGNAL_MIN && score_of(Feature::Hedging) > COMPOUND_SIGNAL_MIN {
        confidence += COMPOUND_BONUS;
    }

    confidence.clamp(0.0, 1.0)
}
