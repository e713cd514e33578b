//! Data models and configuration.

pub mod config;
pub mod ticket;

pub use config::DecimoConfig;
pub use ticket::{validate_ticket_number, Ticket, TicketBook};
