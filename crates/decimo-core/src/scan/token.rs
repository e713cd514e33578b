//! Recognized word tokens handed over by the OCR engine.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub x1: f32,
    pub y0: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, x1, y0, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Vertical centre of the box.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(self.x1).min(other.x0.min(other.x1)),
            x1: self.x0.max(self.x1).max(other.x0.max(other.x1)),
            y0: self.y0.min(self.y1).min(other.y0.min(other.y1)),
            y1: self.y0.max(self.y1).max(other.y0.max(other.y1)),
        }
    }
}

/// A recognized text fragment, optionally with geometry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WordToken {
    /// Recognized text.
    pub text: String,

    /// Recognition confidence (0 - 100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    /// Bounding box of the fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl WordToken {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            bbox: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// Union of every token box, used as the reference frame for centering.
pub fn token_frame(tokens: &[WordToken]) -> Option<BoundingBox> {
    tokens
        .iter()
        .filter_map(|t| t.bbox)
        .reduce(|acc, b| acc.union(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_dimensions() {
        let b = BoundingBox::new(10.0, 20.0, 110.0, 60.0);
        assert_eq!(b.width(), 100.0);
        assert_eq!(b.height(), 40.0);
        assert_eq!(b.area(), 4000.0);
        assert_eq!(b.center_y(), 40.0);
    }

    #[test]
    fn test_token_frame() {
        let tokens = vec![
            WordToken::new("a").with_bbox(BoundingBox::new(0.0, 10.0, 50.0, 20.0)),
            WordToken::new("b"),
            WordToken::new("c").with_bbox(BoundingBox::new(40.0, 100.0, 90.0, 140.0)),
        ];
        let frame = token_frame(&tokens).unwrap();
        assert_eq!(frame, BoundingBox::new(0.0, 10.0, 90.0, 140.0));
        assert!(token_frame(&[WordToken::new("x")]).is_none());
    }

    #[test]
    fn test_token_json_shape() {
        let json = r#"{"text":"74873","confidence":91.5,"bbox":{"x0":1,"x1":2,"y0":3,"y1":4}}"#;
        let token: WordToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.text, "74873");
        assert_eq!(token.confidence, Some(91.5));
        assert_eq!(token.bbox, Some(BoundingBox::new(1.0, 3.0, 2.0, 4.0)));

        let bare: WordToken = serde_json::from_str(r#"{"text":"x"}"#).unwrap();
        assert!(bare.confidence.is_none() && bare.bbox.is_none());
    }
}
