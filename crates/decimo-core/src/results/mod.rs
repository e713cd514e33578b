//! Published results: which numbers won and how much.

mod prizes;

pub use prizes::{format_prize_amount, parse_prize_amount, parse_prize_list, parse_prize_list_above, PRIZE_ENTRY};

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pdf::PdfExtractor;

/// Winning numbers and their prizes, ordered by number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrizeTable {
    prizes: BTreeMap<String, Decimal>,
}

impl PrizeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a results text.
    pub fn from_text(text: &str) -> Self {
        parse_prize_list(text)
    }

    /// Parse a results PDF.
    pub fn from_pdf(data: &[u8]) -> Result<Self> {
        let text = PdfExtractor::text_from_bytes(data)?;
        Ok(parse_prize_list(&text))
    }

    pub fn insert(&mut self, number: impl Into<String>, prize: Decimal) {
        self.prizes.insert(number.into(), prize);
    }

    pub fn get(&self, number: &str) -> Option<Decimal> {
        self.prizes.get(number).copied()
    }

    pub fn contains(&self, number: &str) -> bool {
        self.prizes.contains_key(number)
    }

    pub fn len(&self) -> usize {
        self.prizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prizes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.prizes.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
