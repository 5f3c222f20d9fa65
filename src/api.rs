// Command Layer
// Entry points shared by the CLI and any embedding front end. Errors are
// returned as display strings.

use crate::models::{AnalysisMode, DetectRequest, DetectionResult, FeatureWeights};
use crate::services::config_store::{AppConfig, DetectionConfig};
use crate::services::detection::{HybridAnalyzer, LlmAnalyzer, PatentAiDetector};
use crate::services::extraction::extract_text;
use crate::services::providers::OllamaClient;
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

fn validate_threshold(threshold: f64) -> Result<f64, String> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("decision threshold must be within [0, 1], got {}", threshold))
    }
}

/// Request values win; anything absent falls back to `defaults`.
fn build_detector(request: &DetectRequest, defaults: &DetectionConfig) -> Result<PatentAiDetector, String> {
    let threshold = validate_threshold(request.decision_threshold.unwrap_or(defaults.decision_threshold))?;
    let weights: FeatureWeights = match (request.feature_weights, request.preset) {
        (Some(weights), _) => weights,
        (None, Some(preset)) => FeatureWeights::preset(preset),
        (None, None) => defaults.effective_weights(),
    };
    if let Some((feature, w)) = weights.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
        return Err(format!("weight for {} must be a finite non-negative number, got {}", feature.name(), w));
    }
    Ok(PatentAiDetector::new(threshold, Some(weights)))
}

/// Heuristic-only analysis.
pub async fn detect_text(request: DetectRequest) -> Result<DetectionResult, String> {
    let request_id = Uuid::new_v4();
    let span = info_span!("detect_text", %request_id);

    async move {
        let start = Instant::now();
        let detector = build_detector(&request, &DetectionConfig::default())?;
        let result = detector.analyze_text(&request.text);
        info!(
            latency_ms = start.elapsed().as_millis() as u64,
            confidence = result.confidence_score,
            risk = %result.risk_level,
            "detect_text.done"
        );
        Ok::<_, String>(result)
    }
    .instrument(span)
    .await
}

/// Heuristic analysis blended with the local LLM. An unreachable LLM degrades
/// to the heuristic result.
pub async fn detect_hybrid(request: DetectRequest, config: &AppConfig) -> Result<DetectionResult, String> {
    let request_id = Uuid::new_v4();
    let span = info_span!("detect_hybrid", %request_id);

    async move {
        let start = Instant::now();
        let detector = build_detector(&request, &config.detection)?;
        config
            .hybrid
            .validate()
            .map_err(|e| format!("invalid hybrid weights: {}", e))?;
        let client = OllamaClient::new(&config.llm, request.model.as_deref());
        info!("[HYBRID] endpoint={} model={}", client.endpoint(), client.model());

        let hybrid = HybridAnalyzer::new(detector, LlmAnalyzer::new(client, &config.llm), config.hybrid);
        let result = hybrid.analyze(&request.text).await;
        info!(
            latency_ms = start.elapsed().as_millis() as u64,
            confidence = result.confidence_score,
            risk = %result.risk_level,
            "detect_hybrid.done"
        );
        Ok::<_, String>(result)
    }
    .instrument(span)
    .await
}

/// Dispatch on `request.mode`, using `config` for anything the request omits.
pub async fn detect(request: DetectRequest, config: &AppConfig) -> Result<DetectionResult, String> {
    match request.mode {
        AnalysisMode::Heuristic => {
            let detector = build_detector(&request, &config.detection)?;
            Ok(detector.analyze_text(&request.text))
        }
        AnalysisMode::Hybrid => detect_hybrid(request, config).await,
    }
}

/// Extract text from an uploaded TXT, PDF or DOCX file.
pub async fn preprocess_file(file_name: String, bytes: Vec<u8>) -> Result<String, String> {
    let start = Instant::now();
    let size = bytes.len();
    let name = file_name.clone();

    let text = tokio::task::spawn_blocking(move || extract_text(&name, &bytes))
        .await
        .map_err(|e| format!("extraction task failed: {}", e))?
        .map_err(|e| e.to_string())?;

    info!(
        "[PREPROCESS] file={} bytes={} chars={} latency_ms={}",
        file_name,
        size,
        text.chars().count(),
        start.elapsed().as_millis()
    );
    Ok(text)
}
