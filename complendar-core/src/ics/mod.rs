//! ICS document generation and parsing.
//!
//! This module handles writing and reading .ics files according to RFC 5545.

mod generate;
mod parse;

pub use generate::{CalendarDocument, encode};
pub use parse::{ParsedEvent, parse_calendar};
