//! Configuration structures for decimo.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DecimoError, Result};

/// Main configuration for decimo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimoConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Model configuration.
    pub models: ModelConfig,

    /// Number scanner configuration.
    pub scan: ScanConfig,

    /// Prize list configuration.
    pub results: ResultsConfig,

    /// Ticket book configuration.
    pub book: BookConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Keep `[UNK]` placeholders in recognized text.
    pub keep_unknown: bool,

    /// Drop text boxes below this recognition confidence (0.0 - 1.0).
    pub min_box_confidence: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            keep_unknown: false,
            min_box_confidence: 0.0,
        }
    }
}

/// Model file paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

/// Number scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Score a barcode-derived candidate must exceed to be accepted.
    pub min_sequence_score: i32,

    /// Relative difference under which two geometric measurements tie.
    pub tie_tolerance: f32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_sequence_score: 20,
            tie_tolerance: 0.15,
        }
    }
}

/// Prize list configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Prizes at or below this amount are ignored.
    pub min_prize: Decimal,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            min_prize: Decimal::ZERO,
        }
    }
}

/// Ticket book configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Ticket book file. The CLI falls back to the user data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl DecimoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            DecimoError::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }
}
