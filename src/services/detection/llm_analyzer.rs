// LLM Analyzer
// Asks a text generator for a structured AI-likelihood judgment and turns
// the (possibly messy) reply into a DetectionResult

use crate::models::DetectionResult;
use crate::services::config_store::LlmConfig;
use crate::services::providers::TextGenerator;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::OnceLock;
use tracing::{info, warn};

use super::risk::{llm_recommendations, RiskBand, RISK_ERROR};

pub const LLM_FEATURE_KEY: &str = "llm_ai_assessment";
pub const LLM_FAILURE_RECOMMENDATION: &str = "LLM analysis failed - fallback recommended";

const LLM_VERDICT_MIN: f64 = 0.6;

const SYSTEM_PROMPT: &str = r#"You are an expert forensic linguist and patent examiner.
Your task is to assess whether a document is likely AI-generated.

You must:
- Focus on writing style, not technical merit
- Look for AI artifacts: uniform tone, hedging, generic phrasing
- Pay special attention to patent drawing descriptions
- Be conservative: false positives are worse than false negatives

Respond ONLY in valid JSON."#;

const USER_PROMPT_TEMPLATE: &str = r#"Analyze the following patent-related text.

Return a JSON object with:
- ai_likelihood: float between 0.0 and 1.0
- rationale: short explanation
- red_flags: list of specific stylistic indicators
- confidence_notes: limitations or uncertainty

TEXT:
----------------
{text}
----------------"#;

/// Source of an LLM-derived DetectionResult. Failures are reported in-band as
/// an `ERROR` result.
pub trait LlmAssessor {
    fn assess(&self, text: &str) -> impl Future<Output = DetectionResult> + Send;
}

// ============ Permissive JSON decoding ============

/// How a reply was decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonExtraction {
    /// The whole reply parsed as JSON.
    Strict(Value),
    /// A brace-delimited chunk inside the reply parsed as JSON.
    Salvaged(Value),
    Unparseable,
}

impl JsonExtraction {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Strict(v) | Self::Salvaged(v) => Some(v),
            Self::Unparseable => None,
        }
    }
}

fn brace_chunk_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("brace chunk regex"))
}

/// Strict parse, then brace-delimited chunks tried last first, then each
/// opening brace (rightmost first) up to the final closing brace.
pub fn decode_json_permissive(raw: &str) -> JsonExtraction {
    let trimmed = raw.trim();
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        return JsonExtraction::Strict(v);
    }

    let chunks: Vec<&str> = brace_chunk_re().find_iter(trimmed).map(|m| m.as_str()).collect();
    for chunk in chunks.iter().rev() {
        if let Ok(v) = serde_json::from_str::<Value>(chunk) {
            return JsonExtraction::Salvaged(v);
        }
    }

    if let Some(end) = trimmed.rfind('}') {
        let starts: Vec<usize> = trimmed[..end].match_indices('{').map(|(i, _)| i).collect();
        for &start in starts.iter().rev() {
            if let Ok(v) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                return JsonExtraction::Salvaged(v);
            }
        }
    }

    JsonExtraction::Unparseable
}

// ============ Assessment fields ============

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmAssessment {
    pub ai_likelihood: f64,
    pub rationale: String,
    pub red_flags: String,
    pub confidence_notes: String,
}

impl LlmAssessment {
    /// Read the four fields from a decoded reply. Non-object values and missing
    /// fields give defaults.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(obj) = value.and_then(Value::as_object) else {
            return Self::default();
        };
        Self {
            ai_likelihood: likelihood_field(obj).clamp(0.0, 1.0),
            rationale: text_field(obj.get("rationale")),
            red_flags: red_flags_field(obj.get("red_flags")),
            confidence_notes: text_field(obj.get("confidence_notes")),
        }
    }
}

fn likelihood_field(obj: &Map<String, Value>) -> f64 {
    let parsed = match obj.get("ai_likelihood") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn red_flags_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| text_field(Some(v)))
            .collect::<Vec<_>>()
            .join(", "),
        other => text_field(other),
    }
}

// ============ Analyzer ============

pub struct LlmAnalyzer<G> {
    generator: G,
    max_input_chars: usize,
    max_tokens: u32,
    temperature: f64,
}

impl<G: TextGenerator + Sync> LlmAnalyzer<G> {
    pub fn new(generator: G, config: &LlmConfig) -> Self {
        Self {
            generator,
            max_input_chars: config.max_input_chars,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub async fn analyze(&self, text: &str) -> DetectionResult {
        let truncated = truncate_chars(text, self.max_input_chars);
        let prompt = build_prompt(truncated);

        match self
            .generator
            .generate(&prompt, self.max_tokens, self.temperature)
            .await
        {
            Ok(raw) => {
                let extraction = decode_json_permissive(&raw);
                if extraction == JsonExtraction::Unparseable {
                    warn!("[LLM_ANALYZER] reply was not JSON, using empty assessment");
                }
                let assessment = LlmAssessment::from_value(extraction.into_value().as_ref());
                info!(
                    "[LLM_ANALYZER] ai_likelihood={:.2} input_chars={}",
                    assessment.ai_likelihood,
                    truncated.chars().count()
                );
                assessment_result(&assessment)
            }
            Err(e) => {
                warn!("[LLM_ANALYZER] generation failed: {}", e);
                error_result(&e.to_string())
            }
        }
    }
}

impl<G: TextGenerator + Sync> LlmAssessor for LlmAnalyzer<G> {
    fn assess(&self, text: &str) -> impl Future<Output = DetectionResult> + Send {
        self.analyze(text)
    }
}

pub fn build_prompt(text: &str) -> String {
    format!("{}\n{}", SYSTEM_PROMPT, USER_PROMPT_TEMPLATE.replace("{text}", text))
}

/// First `max_chars` characters (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn assessment_result(assessment: &LlmAssessment) -> DetectionResult {
    let score = assessment.ai_likelihood;

    let mut feature_scores = HashMap::new();
    feature_scores.insert(LLM_FEATURE_KEY.to_string(), score);

    let mut detailed_analysis = HashMap::new();
    detailed_analysis.insert("llm_rationale".to_string(), assessment.rationale.clone());
    detailed_analysis.insert("llm_red_flags".to_string(), assessment.red_flags.clone());
    detailed_analysis.insert(
        "llm_confidence_notes".to_string(),
        assessment.confidence_notes.clone(),
    );

    DetectionResult {
        is_likely_ai_generated: score >= LLM_VERDICT_MIN,
        confidence_score: round2(score),
        risk_level: RiskBand::from_score(score).as_upper().to_string(),
        feature_scores,
        detailed_analysis,
        recommendations: llm_recommendations(score),
    }
}

pub fn error_result(cause: &str) -> DetectionResult {
    let mut detailed_analysis = HashMap::new();
    detailed_analysis.insert("error".to_string(), cause.to_string());

    DetectionResult {
        is_likely_ai_generated: false,
        confidence_score: 0.0,
        risk_level: RISK_ERROR.to_string(),
        feature_scores: HashMap::new(),
        detailed_analysis,
        recommendations: vec![LLM_FAILURE_RECOMMENDATION.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::ProviderError;
    use std::sync::Mutex;

    struct FakeGenerator {
        reply: Result<String, String>,
        seen_prompt: Mutex<Option<String>>,
    }

    impl FakeGenerator {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen_prompt: Mutex::new(None),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                seen_prompt: Mutex::new(None),
            }
        }
    }

    impl TextGenerator for FakeGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _max_tokens: u32,
            _temperature: f64,
        ) -> Result<String, ProviderError> {
            *self.seen_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(ProviderError::RetriesExhausted {
                    attempts: 3,
                    last: Box::new(ProviderError::JsonError(message.clone())),
                }),
            }
        }
    }

    fn analyzer(generator: FakeGenerator) -> LlmAnalyzer<FakeGenerator> {
        LlmAnalyzer::new(generator, &LlmConfig::default())
    }

    #[test]
    fn test_decode_strict() {
        let got = decode_json_permissive(r#" {"ai_likelihood": 0.8} "#);
        assert!(matches!(got, JsonExtraction::Strict(_)));
    }

    #[test]
    fn test_decode_salvages_wrapped_object() {
        let raw = "Sure! Here is my answer:\n```json\n{\"ai_likelihood\": 0.7, \"rationale\": \"flat tone\"}\n```";
        let JsonExtraction::Salvaged(v) = decode_json_permissive(raw) else {
            panic!("expected salvage");
        };
        assert_eq!(v["rationale"], "flat tone");
    }

    #[test]
    fn test_decode_prefers_last_object() {
        let raw = r#"draft {"ai_likelihood": 0.1} final {"ai_likelihood": 0.9}"#;
        let v = decode_json_permissive(raw).into_value().unwrap();
        assert_eq!(v["ai_likelihood"], 0.9);
    }

    #[test]
    fn test_decode_unparseable() {
        assert_eq!(decode_json_permissive("no json here"), JsonExtraction::Unparseable);
        assert_eq!(decode_json_permissive("{ broken"), JsonExtraction::Unparseable);
    }

    #[test]
    fn test_assessment_fields() {
        let v = serde_json::json!({
            "ai_likelihood": "0.72",
            "rationale": "uniform tone",
            "red_flags": ["hedging", "generic phrasing"],
            "confidence_notes": null
        });
        let a = LlmAssessment::from_value(Some(&v));
        assert_eq!(a.ai_likelihood, 0.72);
        assert_eq!(a.rationale, "uniform tone");
        assert_eq!(a.red_flags, "hedging, generic phrasing");
        assert_eq!(a.confidence_notes, "");

        let v = serde_json::json!({"ai_likelihood": 7, "red_flags": "one flag"});
        let a = LlmAssessment::from_value(Some(&v));
        assert_eq!(a.ai_likelihood, 1.0);
        assert_eq!(a.red_flags, "one flag");

        assert_eq!(LlmAssessment::from_value(Some(&serde_json::json!([1, 2]))), LlmAssessment::default());
        assert_eq!(LlmAssessment::from_value(None), LlmAssessment::default());
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_prompt_embeds_text() {
        let prompt = build_prompt("THE HINGE");
        assert!(prompt.starts_with("You are an expert forensic linguist"));
        assert!(prompt.contains("----------------\nTHE HINGE\n----------------"));
    }

    #[tokio::test]
    async fn test_analyze_high_likelihood() {
        let llm = analyzer(FakeGenerator::replying(
            r#"{"ai_likelihood": 0.876, "rationale": "r", "red_flags": ["a"], "confidence_notes": "n"}"#,
        ));
        let result = llm.assess("some text").await;
        assert!(result.is_likely_ai_generated);
        assert_eq!(result.confidence_score, 0.88);
        assert_eq!(result.risk_level, "HIGH");
        assert_eq!(result.feature_scores[LLM_FEATURE_KEY], 0.876);
        assert_eq!(result.detailed_analysis["llm_red_flags"], "a");
        assert_eq!(result.recommendations.len(), 2);
    }

    #[tokio::test]
    async fn test_analyze_garbage_reply_defaults_to_zero() {
        let llm = analyzer(FakeGenerator::replying("I cannot help with that."));
        let result = llm.assess("some text").await;
        assert!(!result.is_likely_ai_generated);
        assert_eq!(result.confidence_score, 0.0);
        assert_eq!(result.risk_level, "MINIMAL");
        assert_eq!(result.recommendations, vec!["No strong AI signal from LLM".to_string()]);
        assert_eq!(result.detailed_analysis["llm_rationale"], "");
    }

    #[tokio::test]
    async fn test_analyze_failure_gives_error_result() {
        let llm = analyzer(FakeGenerator::failing("connection refused"));
        let result = llm.assess("some text").await;
        assert_eq!(result.risk_level, RISK_ERROR);
        assert_eq!(result.confidence_score, 0.0);
        assert!(result.feature_scores.is_empty());
        assert!(result.detailed_analysis["error"].contains("connection refused"));
        assert_eq!(result.recommendations, vec![LLM_FAILURE_RECOMMENDATION.to_string()]);
    }

    #[tokio::test]
    async fn test_input_truncated_before_prompting() {
        let config = LlmConfig {
            max_input_chars: 5,
            ..LlmConfig::default()
        };
        let llm = LlmAnalyzer::new(FakeGenerator::replying("{}"), &config);
        llm.assess("abcdefghij").await;
        let prompt = llm.generator.seen_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("\nabcde\n"));
        assert!(!prompt.contains("abcdef"));
    }
}
