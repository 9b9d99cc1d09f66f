use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use tracing::error;

use ocr_fixer::{correction_stats, Config, CorrectionError, OcrCorrector};

const USAGE: &str = "\
ocr-fixer - correct OCR transcription errors

Usage: ocr-fixer [OPTIONS] [FILE]

Reads raw OCR text from FILE (or stdin) and prints the corrected text with
its correction trail as JSON.

Options:
  --config <PATH>   Load settings from a TOML config file
  --stats           Also print a per-method summary of the corrections
  --capabilities    Print the available correction methods and exit
  -h, --help        Show this help
";

struct CliArgs {
    config_path: Option<PathBuf>,
    input_path: Option<PathBuf>,
    show_stats: bool,
    show_capabilities: bool,
}

fn parse_args() -> Result<Option<CliArgs>, anyhow::Error> {
    let mut parsed = CliArgs {
        config_path: None,
        input_path: None,
        show_stats: false,
        show_capabilities: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                parsed.config_path = Some(PathBuf::from(
                    args.next().context("--config requires a path")?,
                ));
            }
            "--stats" => parsed.show_stats = true,
            "--capabilities" => parsed.show_capabilities = true,
            "-h" | "--help" => {
                print!("{}", USAGE);
                return Ok(None);
            }
            other if !other.starts_with('-') => parsed.input_path = Some(PathBuf::from(other)),
            other => anyhow::bail!("unknown option: {} (try --help)", other),
        }
    }

    Ok(Some(parsed))
}

fn read_input(path: Option<&PathBuf>) -> Result<String, anyhow::Error> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn main() -> ExitCode {
    // Keep stdout clean for the JSON contract; logs go to stderr.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, anyhow::Error> {
    let Some(args) = parse_args()? else {
        return Ok(ExitCode::SUCCESS);
    };

    let config = match &args.config_path {
        Some(path) => Config::load(path),
        None => Config::default(),
    };

    let corrector = OcrCorrector::from_config(&config);

    if args.show_capabilities {
        let report = serde_json::json!({
            "available_methods": corrector.capabilities().available_methods(),
            "capabilities": corrector.capabilities(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    let text = read_input(args.input_path.as_ref())?;

    match corrector.correct(&text) {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if args.show_stats {
                let stats = correction_stats(&outcome.corrections);
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ CorrectionError::EmptyInput) => {
            let failure = serde_json::json!({
                "success": false,
                "error": e.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&failure)?);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
