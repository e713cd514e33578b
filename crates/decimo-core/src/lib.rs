//! Core library for lottery ticket tracking.
//!
//! This crate provides:
//! - Ticket number detection from OCR output (candidate extraction, scoring, selection)
//! - OCR engine wrapper producing word tokens with geometry
//! - Results document (PDF) text extraction and prize list parsing
//! - A ticket book persisted as JSON

pub mod error;
pub mod models;
pub mod pdf;
pub mod ocr;
pub mod results;
pub mod scan;

pub use error::{DecimoError, Result};
pub use models::config::DecimoConfig;
pub use models::ticket::{validate_ticket_number, Ticket, TicketBook};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use ocr::{OcrResult, TextBox};
#[cfg(feature = "native")]
pub use ocr::{create_engine_from_dir, PureOcrEngine};
pub use results::{parse_prize_list, PrizeTable};
pub use scan::{extract_number, NumberExtractor, NumberScanner, ScanReport, ScanResult, WordToken};
