// Report Rendering
// Plain-text report, one-line summary and JSON projection of a DetectionResult

use crate::models::DetectionResult;
use std::collections::BTreeMap;

const REPORT_TITLE: &str = "AI Document Detection Report";
const RULE_WIDTH: usize = 32;

pub fn generate_report(result: &DetectionResult) -> String {
    let mut lines: Vec<String> = vec![
        REPORT_TITLE.to_string(),
        "-".repeat(RULE_WIDTH),
        format!("Likely AI-generated: {}", result.is_likely_ai_generated),
        format!("Confidence score: {:.2}", result.confidence_score),
        format!("Risk level: {}", result.risk_level),
        String::new(),
        "Feature Scores:".to_string(),
    ];

    let scores: BTreeMap<&String, &f64> = result.feature_scores.iter().collect();
    for (name, score) in scores {
        lines.push(format!("  - {}: {:.2}", name, score));
    }

    lines.push(String::new());
    lines.push("Details:".to_string());
    let details: BTreeMap<&String, &String> = result.detailed_analysis.iter().collect();
    for (name, detail) in details {
        lines.push(format!("  - {}: {}", name, detail));
    }

    lines.push(String::new());
    lines.push("Recommendations:".to_string());
    for rec in &result.recommendations {
        lines.push(format!("  - {}", rec));
    }

    lines.join("\n")
}

pub fn generate_summary(result: &DetectionResult) -> String {
    format!(
        "AI-likely={}, conf={:.2}, risk={}",
        result.is_likely_ai_generated, result.confidence_score, result.risk_level
    )
}

/// Pretty JSON with the six result keys.
pub fn as_json(result: &DetectionResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

pub fn from_json(json: &str) -> Result<DetectionResult, serde_json::Error> {
    serde_json::from_str(json)
}
