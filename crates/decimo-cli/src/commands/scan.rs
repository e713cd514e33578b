//! Scan command - detect the ticket number in a single input.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{debug, info};

use decimo_core::models::config::DecimoConfig;
use decimo_core::scan::{NumberScanner, ScanReport, WordToken};
use decimo_core::{create_engine_from_dir, OcrResult, PureOcrEngine};

use super::{extension, is_image, Context};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Ticket image, raw OCR text (.txt) or OCR dump (.json)
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: ScanFormat,

    /// Show every candidate with its score breakdown
    #[arg(long)]
    explain: bool,

    /// Add the detected number to the book under this name
    #[arg(long, value_name = "NAME")]
    add: Option<String>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ScanFormat {
    /// JSON output
    Json,
    /// Plain text
    Text,
}

/// OCR dump as produced by other front-ends: raw text plus word tokens.
#[derive(Deserialize)]
struct TokenDump {
    #[serde(default)]
    text: String,
    #[serde(default)]
    tokens: Vec<WordToken>,
}

/// Turns input files into OCR text and tokens, loading the OCR engine on first use.
pub struct InputReader<'a> {
    config: &'a DecimoConfig,
    model_dir: PathBuf,
    engine: Option<PureOcrEngine>,
    show_progress: bool,
}

impl<'a> InputReader<'a> {
    pub fn new(config: &'a DecimoConfig, model_dir: Option<PathBuf>) -> Self {
        Self {
            config,
            model_dir: model_dir.unwrap_or_else(|| config.models.model_dir.clone()),
            engine: None,
            show_progress: false,
        }
    }

    /// Show a spinner while OCR runs.
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    pub fn read(&mut self, path: &Path) -> anyhow::Result<(String, Vec<WordToken>)> {
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }

        match extension(path).as_str() {
            "txt" => Ok((fs::read_to_string(path)?, Vec::new())),
            "json" => read_dump(&fs::read_to_string(path)?),
            _ if is_image(path) => {
                let result = self.recognize(path)?;
                let tokens = result.tokens();
                Ok((result.text, tokens))
            }
            ext => anyhow::bail!("Unsupported file format: {}", ext),
        }
    }

    fn recognize(&mut self, path: &Path) -> anyhow::Result<OcrResult> {
        let image = image::open(path)?;

        let pb = if self.show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };

        if self.engine.is_none() {
            pb.set_message("Loading OCR models...");
            debug!("Loading models from {}", self.model_dir.display());
            let engine =
                create_engine_from_dir(&self.model_dir, &self.config.models, self.config.ocr.clone())
                    .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;
            self.engine = Some(engine);
        }
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("OCR engine unavailable"))?;

        pb.set_message("Running OCR...");
        let result = engine
            .process(&image)
            .map_err(|e| anyhow::anyhow!("OCR failed: {}", e))?;
        pb.finish_and_clear();

        debug!(
            "OCR detected {} text boxes in {}ms",
            result.boxes.len(),
            result.processing_time_ms
        );
        Ok(result)
    }
}

/// Parse a JSON OCR dump: either `{ text, tokens }` or a full `OcrResult`.
fn read_dump(content: &str) -> anyhow::Result<(String, Vec<WordToken>)> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    if value.get("boxes").is_some() {
        let result: OcrResult = serde_json::from_value(value)?;
        let tokens = result.tokens();
        return Ok((result.text, tokens));
    }

    let dump: TokenDump = serde_json::from_value(value)?;
    let text = if dump.text.trim().is_empty() {
        dump.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        dump.text
    };
    Ok((text, dump.tokens))
}

pub async fn run(args: ScanArgs, ctx: &Context) -> anyhow::Result<()> {
    info!("Scanning {}", args.input.display());

    let mut reader = InputReader::new(&ctx.config, args.model_dir.clone()).with_progress();
    let (text, tokens) = reader.read(&args.input)?;

    let scanner = NumberScanner::from_config(&ctx.config.scan);
    let report = scanner.scan(&text, &tokens);

    let output = format_report(&report, args.format, args.explain)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    match (&report.number, args.add) {
        (Some(number), Some(name)) => {
            let mut book = ctx.load_book()?;
            let ticket = book.add(number, &name)?.clone();
            ctx.save_book(&book)?;
            eprintln!(
                "{} Added {} for {} (id {})",
                style("✓").green(),
                ticket.number,
                ticket.name,
                ticket.id
            );
        }
        (None, add) => {
            eprintln!(
                "{} No ticket number detected. Enter it manually with 'decimo add <NUMBER> --name <NAME>'.",
                style("ℹ").blue()
            );
            if add.is_some() {
                anyhow::bail!("Nothing to add: no ticket number detected");
            }
        }
        (Some(_), None) => {}
    }

    Ok(())
}

pub fn format_report(report: &ScanReport, format: ScanFormat, explain: bool) -> anyhow::Result<String> {
    match (format, explain) {
        (ScanFormat::Json, false) => Ok(serde_json::to_string(&report.result())?),
        (ScanFormat::Json, true) => Ok(serde_json::to_string_pretty(report)?),
        (ScanFormat::Text, false) => Ok(report
            .number
            .clone()
            .unwrap_or_else(|| "No number found".to_string())),
        (ScanFormat::Text, true) => Ok(format_explain(report)),
    }
}

fn format_explain(report: &ScanReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Selected: {}\n",
        report.number.as_deref().unwrap_or("none")
    ));
    output.push_str(&format!("Candidates: {}\n", report.candidates.len()));

    for c in &report.candidates {
        let selected = report.selected.as_ref().map(|s| &s.candidate);
        let marker = if selected == Some(&c.candidate) {
            "*"
        } else {
            " "
        };
        let origin = if c.candidate.is_word() {
            "word".to_string()
        } else {
            format!("seq {}/{}", c.candidate.position, c.candidate.windows)
        };
        output.push_str(&format!(
            "\n{} {}  {:>4}  {}\n",
            marker,
            c.digits(),
            c.score,
            origin
        ));
        for (rule, points) in &c.rules {
            output.push_str(&format!("      {:+4}  {}\n", points, rule));
        }
    }

    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_token_dump() {
        let (text, tokens) = read_dump(
            r#"{"text":"SORTEO 74873","tokens":[{"text":"74873","confidence":91.0}]}"#,
        )
        .unwrap();
        assert_eq!(text, "SORTEO 74873");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].confidence, Some(91.0));
    }

    #[test]
    fn test_read_dump_without_text_joins_tokens() {
        let (text, _) = read_dump(r#"{"tokens":[{"text":"LOTERIA"},{"text":"74873"}]}"#).unwrap();
        assert_eq!(text, "LOTERIA\n74873");
    }

    #[test]
    fn test_read_ocr_result_dump() {
        let json = r#"{
            "boxes": [{"bbox": [0,0,50,0,50,20,0,20], "text": "74873", "confidence": 0.9}],
            "text": "74873"
        }"#;
        let (text, tokens) = read_dump(json).unwrap();
        assert_eq!(text, "74873");
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_format_report_json() {
        let report = NumberScanner::new().scan("74873", &[]);
        let output = format_report(&report, ScanFormat::Json, false).unwrap();
        assert_eq!(output, r#"{"number":"74873"}"#);

        let empty = NumberScanner::new().scan("", &[]);
        let output = format_report(&empty, ScanFormat::Text, false).unwrap();
        assert_eq!(output, "No number found");
    }

    #[test]
    fn test_format_explain_marks_selection() {
        let report = NumberScanner::new().scan("51025040905074873555", &[]);
        let output = format_report(&report, ScanFormat::Text, true).unwrap();
        assert!(output.starts_with("Selected: 74873"));
        assert!(output.contains("* 74873"));
        assert!(output.contains("known_decoy"));
    }

    #[test]
    fn test_format_explain_marks_only_selected_candidate() {
        // The same digits appear as a word and inside a digit run.
        let report = NumberScanner::new().scan("12345 0012345999", &[]);
        assert_eq!(report.number.as_deref(), Some("12345"));

        let output = format_report(&report, ScanFormat::Text, true).unwrap();
        let marked: Vec<&str> = output.lines().filter(|l| l.starts_with("* ")).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].ends_with("word"));
    }
}
