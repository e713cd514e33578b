//! Ticket book: the numbers a user holds, who holds them, and what they won.

use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TicketError};
use crate::results::PrizeTable;
use crate::scan::is_number;

/// A lottery ticket in the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier.
    pub id: String,

    /// Five-digit ticket number.
    pub number: String,

    /// Holder name.
    pub name: String,

    /// When the ticket was added.
    pub added_at: DateTime<Utc>,

    /// Last modification.
    pub updated_at: DateTime<Utc>,

    /// Prize won, once results were checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prize: Option<Decimal>,
}

impl Ticket {
    pub fn is_winner(&self) -> bool {
        self.prize.is_some_and(|p| p > Decimal::ZERO)
    }
}

/// Whether `number` is a valid ticket number (exactly five ASCII digits).
pub fn validate_ticket_number(number: &str) -> bool {
    is_number(number)
}

/// All tickets, newest first, plus the last applied results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketBook {
    tickets: Vec<Ticket>,

    /// Results applied by the last check; new tickets look their prize up here.
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<PrizeTable>,
}

impl TicketBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a book from a JSON file. A missing file is an empty book.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No ticket book at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let book: TicketBook = serde_json::from_str(&content)?;
        debug!("Loaded {} tickets from {}", book.tickets.len(), path.display());
        Ok(book)
    }

    /// Save the book as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Add a ticket for `number` held by `name`.
    pub fn add(&mut self, number: &str, name: &str) -> std::result::Result<&Ticket, TicketError> {
        self.add_at(number, name, Utc::now())
    }

    /// Add a ticket with an explicit timestamp.
    pub fn add_at(
        &mut self,
        number: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<&Ticket, TicketError> {
        let number = number.trim();
        let name = name.trim();

        if number.is_empty() {
            return Err(TicketError::EmptyNumber);
        }
        if name.is_empty() {
            return Err(TicketError::EmptyName);
        }
        if !validate_ticket_number(number) {
            return Err(TicketError::InvalidNumber(number.to_string()));
        }
        if self.find_by_number(number).is_some() {
            return Err(TicketError::Duplicate(number.to_string()));
        }

        let ticket = Ticket {
            id: self.next_id(now),
            number: number.to_string(),
            name: name.to_string(),
            added_at: now,
            updated_at: now,
            prize: self.results.as_ref().and_then(|r| r.get(number)),
        };

        info!("Added ticket {} for {}", ticket.number, ticket.name);
        self.tickets.insert(0, ticket);
        Ok(&self.tickets[0])
    }

    /// Millisecond timestamp, bumped past any id already taken.
    fn next_id(&self, now: DateTime<Utc>) -> String {
        let mut id = now.timestamp_millis();
        while self.get(&id.to_string()).is_some() {
            id += 1;
        }
        id.to_string()
    }

    /// Remove a ticket by id.
    pub fn remove(&mut self, id: &str) -> std::result::Result<Ticket, TicketError> {
        let index = self
            .tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TicketError::NotFound(id.to_string()))?;
        let ticket = self.tickets.remove(index);
        info!("Removed ticket {}", ticket.number);
        Ok(ticket)
    }

    /// Change the holder name of a ticket.
    pub fn rename(&mut self, id: &str, name: &str) -> std::result::Result<&Ticket, TicketError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TicketError::EmptyName);
        }
        let ticket = self
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TicketError::NotFound(id.to_string()))?;
        ticket.name = name.to_string();
        ticket.updated_at = Utc::now();
        Ok(ticket)
    }

    pub fn get(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn find_by_number(&self, number: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.number == number)
    }

    /// Apply a prize table to every ticket and remember it.
    ///
    /// Returns the number of winning tickets.
    pub fn apply_prizes(&mut self, results: PrizeTable) -> usize {
        let now = Utc::now();
        let mut updated = 0;

        for ticket in &mut self.tickets {
            let prize = results.get(&ticket.number);
            if prize != ticket.prize {
                ticket.prize = prize;
                ticket.updated_at = now;
                updated += 1;
            }
        }

        self.results = Some(results);
        let winners = self.winners().count();
        debug!("Applied prizes: {} tickets changed, {} winners", updated, winners);
        winners
    }

    pub fn results(&self) -> Option<&PrizeTable> {
        self.results.as_ref()
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn winners(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter().filter(|t| t.is_winner())
    }

    /// Sum of all prizes won.
    pub fn total_prize(&self) -> Decimal {
        self.winners().filter_map(|t| t.prize).sum()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}
