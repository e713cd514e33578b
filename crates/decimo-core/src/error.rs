//! Error types for the decimo-core library.

use thiserror::Error;

/// Main error type for the decimo library.
///
/// Not finding a ticket number is not an error: the scanner reports it as an
/// empty result.
#[derive(Error, Debug)]
pub enum DecimoError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Ticket book error.
    #[error("ticket error: {0}")]
    Ticket(#[from] TicketError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text detection or recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors raised when editing the ticket book.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// The number was empty after trimming.
    #[error("ticket number is empty")]
    EmptyNumber,

    /// The holder name was empty after trimming.
    #[error("ticket name is empty")]
    EmptyName,

    /// The number is not exactly five digits.
    #[error("ticket number must have exactly 5 digits: {0:?}")]
    InvalidNumber(String),

    /// The number is already in the book.
    #[error("ticket number already added: {0}")]
    Duplicate(String),

    /// No ticket with the given id.
    #[error("no ticket with id {0}")]
    NotFound(String),
}

/// Result type for the decimo library.
pub type Result<T> = std::result::Result<T, DecimoError>;
