use anyhow::{anyhow, bail, Context};
use patent_ai_detector_lib::api::{detect, preprocess_file};
use patent_ai_detector_lib::init_logging;
use patent_ai_detector_lib::models::{AnalysisMode, DetectRequest, FeatureWeights, WeightPreset};
use patent_ai_detector_lib::services::config_store::{AppConfig, ConfigStore};
use patent_ai_detector_lib::services::report::{as_json, generate_report, generate_summary};
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use tracing::warn;

const EXIT_ANALYSIS_ERROR: u8 = 2;
const EXIT_JSON_WRITE_ERROR: u8 = 3;

const USAGE: &str = "Usage:\n  patent-ai-detector (--text <text|-> | --file <path>) [--threshold <0..1>] \
[--preset balanced|conservative|aggressive] [--weights name=value,...] [--hybrid] [--model <name>] \
[--json-out <path>] [--summary]\n\nNotes:\n  - `--text -` reads the text from stdin.\n  \
- `--file` accepts .txt, .pdf and .docx (`--pdf` is an alias).\n  \
- `--weights` are normalized to sum to 1.0 and override `--preset`.\n  \
- `--hybrid` blends in a local Ollama model; if it is unreachable the heuristic result is reported.";

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

/// Value of `key`, or an error when the flag is present without one.
fn flag_value(args: &[String], key: &str) -> anyhow::Result<Option<String>> {
    match parse_arg_value(args, key) {
        Some(v) if !v.starts_with("--") => Ok(Some(v)),
        _ if has_flag(args, key) => bail!("{} requires a value", key),
        _ => Ok(None),
    }
}

enum InputSource {
    Text(String),
    File(String),
}

struct CliOptions {
    input: InputSource,
    request: DetectRequest,
    json_out: Option<String>,
    summary: bool,
}

fn parse_options(args: &[String]) -> anyhow::Result<CliOptions> {
    let text = flag_value(args, "--text")?;
    let file = match flag_value(args, "--file")? {
        Some(f) => Some(f),
        None => flag_value(args, "--pdf")?,
    };

    let input = match (text, file) {
        (Some(_), Some(_)) => bail!("--text and --file are mutually exclusive"),
        (None, None) => bail!("one of --text or --file is required"),
        (Some(t), None) => InputSource::Text(t),
        (None, Some(f)) => InputSource::File(f),
    };

    let mut request = DetectRequest::new(String::new());

    if let Some(raw) = flag_value(args, "--threshold")? {
        let threshold: f64 = raw
            .parse()
            .map_err(|_| anyhow!("invalid --threshold value: {}", raw))?;
        request.decision_threshold = Some(threshold);
    }

    if let Some(raw) = flag_value(args, "--preset")? {
        let preset = WeightPreset::from_str(&raw).ok_or_else(|| anyhow!("unknown preset: {}", raw))?;
        request.preset = Some(preset);
    }

    if let Some(raw) = flag_value(args, "--weights")? {
        let weights = FeatureWeights::parse_pairs(&raw).context("invalid --weights")?;
        request.feature_weights = Some(weights.normalized());
    }

    if has_flag(args, "--hybrid") {
        request.mode = AnalysisMode::Hybrid;
    }
    request.model = flag_value(args, "--model")?;

    Ok(CliOptions {
        input,
        request,
        json_out: flag_value(args, "--json-out")?,
        summary: has_flag(args, "--summary"),
    })
}

async fn read_input(input: &InputSource) -> anyhow::Result<String> {
    match input {
        InputSource::Text(t) if t == "-" => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read text from stdin")?;
            Ok(buf)
        }
        InputSource::Text(t) => Ok(t.clone()),
        InputSource::File(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path))?;
            let file_name = Path::new(path)
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| path.clone());
            preprocess_file(file_name, bytes).await.map_err(|e| anyhow!(e))
        }
    }
}

fn load_config() -> AppConfig {
    match ConfigStore::open_default().load_effective() {
        Ok(config) => config,
        Err(e) => {
            warn!("[CONFIG] {}; using defaults", e);
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || has_flag(&args, "--help") || has_flag(&args, "-h") {
        eprintln!("{}", USAGE);
        return if args.len() < 2 {
            ExitCode::from(EXIT_ANALYSIS_ERROR)
        } else {
            ExitCode::SUCCESS
        };
    }

    init_logging();

    let mut options = match parse_options(&args) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {:#}\n\n{}", e, USAGE);
            return ExitCode::from(EXIT_ANALYSIS_ERROR);
        }
    };

    options.request.text = match read_input(&options.input).await {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(EXIT_ANALYSIS_ERROR);
        }
    };

    let config = load_config();
    let result = match detect(options.request, &config).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ANALYSIS_ERROR);
        }
    };

    if options.summary {
        println!("{}", generate_summary(&result));
    } else {
        println!("{}", generate_report(&result));
    }

    if let Some(out_path) = options.json_out {
        let written = as_json(&result)
            .context("failed to serialize result")
            .and_then(|json| {
                std::fs::write(&out_path, json).with_context(|| format!("failed to write {}", out_path))
            });
        match written {
            Ok(()) => println!("\nWrote JSON to: {}", out_path),
            Err(e) => {
                eprintln!("Failed to write JSON: {:#}", e);
                return ExitCode::from(EXIT_JSON_WRITE_ERROR);
            }
        }
    }

    ExitCode::SUCCESS
}
