// Risk Tiers
// Fixed confidence bands shared by the heuristic and hybrid paths.
// Both paths use the same cut points but report them in different casings.

pub const RISK_ERROR: &str = "ERROR";

pub const HIGH_MIN: f64 = 0.75;
pub const MEDIUM_MIN: f64 = 0.6;
pub const LOW_MIN: f64 = 0.4;

/// Hybrid results at or above this confidence get an extra review recommendation.
pub const HYBRID_REVIEW_MIN: f64 = 0.6;
pub const HYBRID_REVIEW_RECOMMENDATION: &str = "Hybrid system flags this document for review";

#[derive(Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord)]
pub enum RiskBand {
    Minimal,
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_MIN {
            Self::High
        } else if score >= MEDIUM_MIN {
            Self::Medium
        } else if score >= LOW_MIN {
            Self::Low
        } else {
            Self::Minimal
        }
    }

    /// Heuristic-only casing.
    pub fn as_lower(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Minimal => "minimal",
        }
    }

    /// Hybrid and LLM casing.
    pub fn as_upper(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Minimal => "MINIMAL",
        }
    }

    /// Accepts either casing; `ERROR` and unknown labels give `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }
}

pub fn heuristic_risk_level(confidence: f64) -> &'static str {
    RiskBand::from_score(confidence).as_lower()
}

/// Hybrid ladder: label plus verdict. The verdict follows the band, not a
/// caller threshold.
pub fn hybrid_verdict(score: f64) -> (&'static str, bool) {
    let band = RiskBand::from_score(score);
    (band.as_upper(), band >= RiskBand::Medium)
}

pub fn heuristic_recommendations(confidence: f64) -> Vec<String> {
    let recs: &[&str] = match RiskBand::from_score(confidence) {
        RiskBand::High => &[
            "Perform manual review and cross-check with known prior art phrasing.",
            "Request author revision to reduce formulaic language and hedging.",
        ],
        RiskBand::Medium => &[
            "Spot-check sections with repetitive starters and transitions.",
            "Encourage domain-specific terminology and concrete examples.",
        ],
        RiskBand::Low => &["Consider minor edits to improve sentence variety and reduce filler."],
        RiskBand::Minimal => &["No immediate action needed; monitor writing style across documents."],
    };
    recs.iter().map(|s| s.to_string()).collect()
}

pub fn llm_recommendations(score: f64) -> Vec<String> {
    if score >= MEDIUM_MIN {
        vec![
            "LLM indicates likely AI-generated text".to_string(),
            "Recommend manual review, especially drawings section".to_string(),
        ]
    } else {
        vec!["No strong AI signal from LLM".to_string()]
    }
}
