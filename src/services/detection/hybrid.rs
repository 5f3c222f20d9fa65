// Hybrid Combiner
// Blends the heuristic result with an LLM-derived result, degrading to the
// heuristic result alone when the LLM side reports an error

use crate::models::{DetectionResult, HybridWeights};
use std::collections::HashSet;
use tracing::{info, warn};

use super::aggregation::PatentAiDetector;
use super::llm_analyzer::{round2, LlmAssessor};
use super::risk::{hybrid_verdict, HYBRID_REVIEW_MIN, HYBRID_REVIEW_RECOMMENDATION, RISK_ERROR};

pub struct HybridAnalyzer<A> {
    traditional: PatentAiDetector,
    assessor: A,
    weights: HybridWeights,
}

impl<A: LlmAssessor> HybridAnalyzer<A> {
    pub fn new(traditional: PatentAiDetector, assessor: A, weights: HybridWeights) -> Self {
        Self {
            traditional,
            assessor,
            weights,
        }
    }

    pub async fn analyze(&self, text: &str) -> DetectionResult {
        let trad = self.traditional.analyze_text(text);
        let llm = self.assessor.assess(text).await;
        combine(trad, llm, &self.weights)
    }
}

/// Merge a heuristic result with an LLM result. An `ERROR` LLM result yields
/// the heuristic result untouched.
pub fn combine(trad: DetectionResult, llm: DetectionResult, weights: &HybridWeights) -> DetectionResult {
    if llm.risk_level == RISK_ERROR {
        warn!(
            cause = llm.detailed_analysis.get("error").map(String::as_str).unwrap_or(""),
            "[HYBRID] LLM assessment failed, returning traditional result only"
        );
        return trad;
    }

    let combined = (trad.confidence_score * weights.traditional + llm.confidence_score * weights.ai)
        .clamp(0.0, 1.0);
    let (risk, verdict) = hybrid_verdict(combined);

    info!(
        "[HYBRID] traditional={:.2} llm={:.2} combined={:.2} risk={}",
        trad.confidence_score, llm.confidence_score, combined, risk
    );

    let mut feature_scores = trad.feature_scores;
    feature_scores.extend(llm.feature_scores);

    let mut detailed_analysis = trad.detailed_analysis;
    detailed_analysis.extend(llm.detailed_analysis);

    let mut recommendations = trad.recommendations;
    recommendations.extend(llm.recommendations);
    if combined >= HYBRID_REVIEW_MIN {
        recommendations.push(HYBRID_REVIEW_RECOMMENDATION.to_string());
    }

    DetectionResult {
        is_likely_ai_generated: verdict,
        confidence_score: round2(combined),
        risk_level: risk.to_string(),
        feature_scores,
        detailed_analysis,
        recommendations: dedup_preserving_order(recommendations),
    }
}

pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
