//! OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

use super::{OcrResult, TextBox};

/// Placeholder the recognizer emits for characters outside its dictionary.
const UNKNOWN_GLYPH: &str = "[UNK]";

/// Recognizes text in ticket photos.
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from model files in a directory.
    pub fn from_dir(model_dir: &Path, models: &ModelConfig, config: OcrConfig) -> Result<Self, OcrError> {
        let det_path = model_dir.join(&models.detection_model);
        let rec_path = model_dir.join(&models.recognition_model);
        let dict_path = model_dir.join(&models.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!("missing {}", path.display())));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { engine, config })
    }

    /// Process an image and extract text with bounding boxes.
    pub fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        info!("Processing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let boxes: Vec<TextBox> = results
            .iter()
            .filter(|r| r.confidence >= self.config.min_box_confidence)
            .map(|r| {
                let text = if self.config.keep_unknown {
                    r.text.clone()
                } else {
                    r.text.replace(UNKNOWN_GLYPH, " ")
                };
                TextBox {
                    bbox: polygon_to_bbox(&r.bounding_box),
                    text,
                    confidence: r.confidence,
                }
            })
            .collect();

        let mut result = OcrResult {
            boxes,
            text: String::new(),
            processing_time_ms: 0,
            image_size: (width, height),
        };
        result.sort_by_reading_order();
        result.processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "OCR complete: {} text boxes in {}ms",
            result.boxes.len(),
            result.processing_time_ms
        );

        Ok(result)
    }
}

/// Convenience function to create an OCR engine with models from a directory.
pub fn create_engine_from_dir(
    model_dir: &Path,
    models: &ModelConfig,
    config: OcrConfig,
) -> Result<PureOcrEngine, OcrError> {
    PureOcrEngine::from_dir(model_dir, models, config)
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
