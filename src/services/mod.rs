// PatentAI Core Services

pub mod text_processor;
pub mod patterns;
pub mod config_store;
pub mod providers;
pub mod extraction;
pub mod report;
pub mod detection;

pub use text_processor::*;
pub use config_store::*;
pub use providers::*;
pub use extraction::{extract_text, ExtractError};
pub use report::{as_json, from_json, generate_report, generate_summary};

pub use detection::{
    combine,
    HybridAnalyzer,
    LlmAnalyzer,
    LlmAssessor,
    PatentAiDetector,
};
