//! WASM bindings for lottery ticket number detection.
//!
//! The browser runs OCR itself and hands the recognized text, plus word
//! tokens when it has them, to these bindings.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use decimo_core::ocr::{OcrResult, TextBox};
use decimo_core::results::{format_prize_amount, parse_prize_list_above};
use decimo_core::scan::{NumberScanner as CoreScanner, WordToken};
use decimo_core::{NumberExtractor, ScanReport};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Plain objects and `null` rather than `Map` and `undefined`.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_tokens(tokens: JsValue) -> Result<Vec<WordToken>, JsValue> {
    let tokens: Option<Vec<WordToken>> = serde_wasm_bindgen::from_value(tokens)
        .map_err(|e| JsValue::from_str(&format!("invalid tokens: {}", e)))?;
    Ok(tokens.unwrap_or_default())
}

/// Detect the ticket number in OCR text.
///
/// `tokens` may be `undefined`, `null`, or an array of
/// `{ text, confidence?, bbox?: { x0, y0, x1, y1 } }`.
/// Returns `{ number }`, where `number` is a 5-digit string or `null`.
#[wasm_bindgen]
pub fn extract_number(text: &str, tokens: JsValue) -> Result<JsValue, JsValue> {
    let tokens = parse_tokens(tokens)?;
    to_js(&CoreScanner::new().scan(text, &tokens).result())
}

/// Like `extract_number`, but returns every candidate with its score breakdown.
#[wasm_bindgen]
pub fn explain_number(text: &str, tokens: JsValue) -> Result<JsValue, JsValue> {
    let tokens = parse_tokens(tokens)?;
    to_js(&CoreScanner::new().scan(text, &tokens))
}

/// Whether a manually typed ticket number is valid.
#[wasm_bindgen]
pub fn validate_ticket_number(number: &str) -> bool {
    decimo_core::validate_ticket_number(number.trim())
}

/// Parse a prize list into `{ "74873": "400000.00", ... }`.
#[wasm_bindgen]
pub fn parse_prize_list(text: &str) -> Result<JsValue, JsValue> {
    to_js(&decimo_core::parse_prize_list(text))
}

/// Format a prize amount in Spanish style, or `undefined` for a non-number.
#[wasm_bindgen]
pub fn format_prize(amount: &str) -> Option<String> {
    amount.trim().parse().ok().map(format_prize_amount)
}

/// Number scanner with adjustable thresholds.
#[wasm_bindgen]
pub struct NumberScanner {
    inner: CoreScanner,
    min_prize: f64,
}

#[wasm_bindgen]
impl NumberScanner {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: CoreScanner::new(),
            min_prize: 0.0,
        }
    }

    /// Score a barcode-derived candidate must exceed.
    #[wasm_bindgen]
    pub fn set_min_sequence_score(&mut self, score: i32) {
        self.inner = self.inner.clone().with_min_sequence_score(score);
    }

    /// Relative tolerance for geometric tie-breaks.
    #[wasm_bindgen]
    pub fn set_tie_tolerance(&mut self, tolerance: f32) {
        self.inner = self.inner.clone().with_tie_tolerance(tolerance);
    }

    /// Prizes at or below this amount are ignored by `parse_prize_list`.
    #[wasm_bindgen]
    pub fn set_min_prize(&mut self, amount: f64) {
        self.min_prize = amount;
    }

    #[wasm_bindgen]
    pub fn extract(&self, text: &str, tokens: JsValue) -> Result<JsValue, JsValue> {
        let tokens = parse_tokens(tokens)?;
        to_js(&self.inner.scan(text, &tokens).result())
    }

    #[wasm_bindgen]
    pub fn explain(&self, text: &str, tokens: JsValue) -> Result<JsValue, JsValue> {
        let tokens = parse_tokens(tokens)?;
        to_js(&self.inner.scan(text, &tokens))
    }

    #[wasm_bindgen]
    pub fn parse_prize_list(&self, text: &str) -> Result<JsValue, JsValue> {
        let min_prize = rust_decimal::Decimal::try_from(self.min_prize)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&parse_prize_list_above(text, min_prize))
    }
}

impl Default for NumberScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// OCR result from browser-side processing.
#[wasm_bindgen]
pub struct OcrResultJs {
    inner: OcrResult,
}

#[wasm_bindgen]
impl OcrResultJs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: OcrResult::empty(0, 0),
        }
    }

    /// Add a recognized text box, corners clockwise from top-left.
    ///
    /// `confidence` is in 0.0 - 1.0.
    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen]
    pub fn add_box(
        &mut self,
        text: &str,
        x1: f32, y1: f32,
        x2: f32, y2: f32,
        x3: f32, y3: f32,
        x4: f32, y4: f32,
        confidence: f32,
    ) {
        self.inner.boxes.push(TextBox {
            bbox: [x1, y1, x2, y2, x3, y3, x4, y4],
            text: text.to_string(),
            confidence,
        });
    }

    /// Set the full text.
    #[wasm_bindgen]
    pub fn set_text(&mut self, text: &str) {
        self.inner.text = text.to_string();
    }

    /// Get the full text, falling back to the boxes in reading order.
    #[wasm_bindgen]
    pub fn get_text(&self) -> String {
        self.resolved().text
    }

    /// Detect the ticket number in this OCR result.
    #[wasm_bindgen]
    pub fn extract_number(&self) -> Result<JsValue, JsValue> {
        to_js(&self.report().result())
    }

    /// Every candidate with its score breakdown.
    #[wasm_bindgen]
    pub fn explain_number(&self) -> Result<JsValue, JsValue> {
        to_js(&self.report())
    }
}

impl OcrResultJs {
    fn resolved(&self) -> OcrResult {
        let mut result = self.inner.clone();
        if result.text.trim().is_empty() {
            result.sort_by_reading_order();
        }
        result
    }

    fn report(&self) -> ScanReport {
        CoreScanner::new().extract(&self.resolved())
    }
}

impl Default for OcrResultJs {
    fn default() -> Self {
        Self::new()
    }
}
