//! OCR collaborator: recognized text boxes and their conversion to word tokens.

#[cfg(feature = "native")]
mod engine;

#[cfg(feature = "native")]
pub use engine::{create_engine_from_dir, PureOcrEngine};

use serde::{Deserialize, Serialize};

use crate::scan::{BoundingBox, WordToken};

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the center point of the bounding box.
    pub fn center(&self) -> (f32, f32) {
        let x = (self.bbox[0] + self.bbox[2] + self.bbox[4] + self.bbox[6]) / 4.0;
        let y = (self.bbox[1] + self.bbox[3] + self.bbox[5] + self.bbox[7]) / 4.0;
        (x, y)
    }

    /// Get the height of the bounding box.
    pub fn height(&self) -> f32 {
        let dx1 = self.bbox[6] - self.bbox[0];
        let dy1 = self.bbox[7] - self.bbox[1];
        (dx1 * dx1 + dy1 * dy1).sqrt()
    }

    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }

    /// Convert to a scanner token with a 0-100 confidence.
    pub fn to_token(&self) -> WordToken {
        let (x0, y0, x1, y1) = self.rect();
        WordToken::new(self.text.clone())
            .with_bbox(BoundingBox::new(x0, y0, x1, y1))
            .with_confidence(self.confidence * 100.0)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Detected and recognized text boxes.
    pub boxes: Vec<TextBox>,

    /// Full text (boxes joined with newlines).
    pub text: String,

    /// Processing time in milliseconds.
    #[serde(default)]
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    #[serde(default)]
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Create an empty result.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            boxes: Vec::new(),
            text: String::new(),
            processing_time_ms: 0,
            image_size: (width, height),
        }
    }

    /// Wrap plain recognized text without geometry.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::empty(0, 0)
        }
    }

    /// Word tokens for the number scanner.
    pub fn tokens(&self) -> Vec<WordToken> {
        self.boxes.iter().map(TextBox::to_token).collect()
    }

    /// Sort boxes by reading order (top-to-bottom, left-to-right).
    pub fn sort_by_reading_order(&mut self) {
        self.boxes.sort_by(|a, b| {
            let (_, ay, _, _) = a.rect();
            let (_, by, _, _) = b.rect();

            // Group by approximate vertical position (within 20 pixels)
            let row_a = (ay / 20.0) as i32;
            let row_b = (by / 20.0) as i32;

            if row_a != row_b {
                row_a.cmp(&row_b)
            } else {
                let (ax, _, _, _) = a.rect();
                let (bx, _, _, _) = b.rect();
                ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
            }
        });

        self.text = self
            .boxes
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
    }
}
