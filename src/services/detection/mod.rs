// Detection Module
// AI text detection core logic organized into specialized submodules:
// - analyzers: the nine independent feature heuristics
// - drawing: patent figure-description analyzer
// - aggregation: weighted combination into one confidence value
// - risk: risk tiers, verdict ladders and recommendation texts
// - llm_analyzer: LLM-derived assessment with permissive JSON decoding
// - hybrid: blends heuristic and LLM results

pub mod analyzers;
pub mod drawing;
pub mod aggregation;
pub mod risk;
pub mod llm_analyzer;
pub mod hybrid;

pub use analyzers::{analyzer_for, AnalyzerFn, NO_TEXT};
pub use drawing::{analyze_drawing_descriptions, collect_drawing_stats, DrawingStats};
pub use aggregation::{combine_scores, PatentAiDetector, DEFAULT_DECISION_THRESHOLD};
pub use risk::{heuristic_risk_level, hybrid_verdict, RiskBand, RISK_ERROR};
pub use llm_analyzer::{
    decode_json_permissive,
    JsonExtraction,
    LlmAnalyzer,
    LlmAssessment,
    LlmAssessor,
    LLM_FEATURE_KEY,
};
pub use hybrid::{combine, HybridAnalyzer};
