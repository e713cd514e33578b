//! Prize list parsing for published results documents.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::PrizeTable;

lazy_static! {
    // A standalone 5-digit number, any non-digit filler, then an amount in
    // Spanish format: 20.000,00 | 20.000 | 400,50 | 125. Plain amounts of
    // five or more digits (125000 €) need a currency after them so the next
    // ticket number is never read as one.
    pub static ref PRIZE_ENTRY: Regex = Regex::new(
        r"\b(\d{5})\b[^\d]*?(?:(\d{1,3}(?:[.,]\d{3})+(?:[.,]\d{2})?|\d{1,4}(?:[.,]\d{2})?)\b\s*€?|(\d{5,9}(?:[.,]\d{2})?)\s*(?:€|(?i:eur(?:os?)?)\b))"
    ).unwrap();
}

/// Parse a Spanish-formatted amount (e.g. "20.000,00", "1.000", "400,50").
///
/// The last separator is decimal when one or two digits follow it; every
/// other separator groups thousands.
pub fn parse_prize_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match cleaned.rfind(['.', ',']) {
        Some(pos) if (1..=2).contains(&(cleaned.len() - pos - 1)) => {
            let integer: String = cleaned[..pos].chars().filter(|c| c.is_ascii_digit()).collect();
            format!("{}.{}", integer, &cleaned[pos + 1..])
        }
        _ => cleaned.chars().filter(|c| c.is_ascii_digit()).collect(),
    };

    Decimal::from_str(&normalized).ok()
}

/// Format an amount in Spanish style (400.000,00).
pub fn format_prize_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some(parts) => parts,
        None => return s,
    };

    let (sign, digits) = match integer_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer_part),
    };

    let chars: Vec<char> = digits.chars().collect();
    let mut formatted = String::from(sign);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{},{}", formatted, decimal_part)
}

/// Parse every `number ... amount` entry in a results text.
///
/// Only prizes above zero are kept. A number listed twice keeps the last
/// amount seen.
pub fn parse_prize_list(text: &str) -> PrizeTable {
    parse_prize_list_above(text, Decimal::ZERO)
}

/// Like [`parse_prize_list`], keeping only prizes above `min_prize`.
pub fn parse_prize_list_above(text: &str, min_prize: Decimal) -> PrizeTable {
    let mut table = PrizeTable::new();

    for caps in PRIZE_ENTRY.captures_iter(text) {
        let number = &caps[1];
        let amount = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        match parse_prize_amount(amount) {
            Some(prize) if prize > min_prize => {
                trace!("Prize entry {} -> {}", number, prize);
                table.insert(number, prize);
            }
            _ => trace!("Skipping entry {:?}", &caps[0]),
        }
    }

    debug!("Parsed {} prize entries", table.len());
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_prize_amount() {
        assert_eq!(parse_prize_amount("20.000,00"), Some(dec("20000.00")));
        assert_eq!(parse_prize_amount("20.000"), Some(dec("20000")));
        assert_eq!(parse_prize_amount("1.000"), Some(dec("1000")));
        assert_eq!(parse_prize_amount("400,50"), Some(dec("400.50")));
        assert_eq!(parse_prize_amount("400.5"), Some(dec("400.5")));
        assert_eq!(parse_prize_amount("1.250.000,00 €"), Some(dec("1250000.00")));
        assert_eq!(parse_prize_amount("125"), Some(dec("125")));
        assert_eq!(parse_prize_amount("€"), None);
        assert_eq!(parse_prize_amount(""), None);
    }

    #[test]
    fn test_format_prize_amount() {
        assert_eq!(format_prize_amount(dec("400000")), "400.000,00");
        assert_eq!(format_prize_amount(dec("20")), "20,00");
        assert_eq!(format_prize_amount(dec("1234.5")), "1.234,50");
        assert_eq!(format_prize_amount(dec("-1000")), "-1.000,00");
    }

    #[test]
    fn test_parse_prize_list() {
        let text = "PREMIOS\n74873 ........ 400.000,00 €\n06345 ..... 125.000 €\n12345 1.000 €";
        let table = parse_prize_list(text);

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("74873"), Some(dec("400000.00")));
        assert_eq!(table.get("06345"), Some(dec("125000")));
        assert_eq!(table.get("12345"), Some(dec("1000")));
    }

    #[test]
    fn test_adjacent_numbers_not_read_as_amounts() {
        let table = parse_prize_list("12345 67890 100,00 €");
        assert_eq!(table.get("12345"), None);
        assert_eq!(table.get("67890"), Some(dec("100.00")));
    }

    #[test]
    fn test_long_plain_amount_with_currency() {
        let text = "74873 ..... 125000 €\n06345 2500000 euros\n11111 40000,50 EUR\n22222 30000";
        let table = parse_prize_list(text);

        assert_eq!(table.get("74873"), Some(dec("125000")));
        assert_eq!(table.get("06345"), Some(dec("2500000")));
        assert_eq!(table.get("11111"), Some(dec("40000.50")));
        assert_eq!(table.get("22222"), None);
    }

    #[test]
    fn test_zero_prizes_dropped() {
        let table = parse_prize_list("74873 0,00 €\n11111 20 €");
        assert_eq!(table.get("74873"), None);
        assert_eq!(table.get("11111"), Some(dec("20")));
    }

    #[test]
    fn test_last_entry_wins() {
        let table = parse_prize_list("74873 20 €\n74873 1.000 €");
        assert_eq!(table.get("74873"), Some(dec("1000")));
    }

    #[test]
    fn test_min_prize() {
        let table = parse_prize_list_above("74873 20 €\n11111 1.000 €", dec("20"));
        assert_eq!(table.len(), 1);
        assert!(table.contains("11111"));
    }

    #[test]
    fn test_no_entries() {
        assert!(parse_prize_list("Sorteo de Navidad 2025").is_empty());
    }
}
