//! Core of complendar: turn a shared spreadsheet of names and birthdays into
//! an iCalendar file with one yearly all-day event per person.
//!
//! - `table` loads CSV text into rows
//! - `header` guesses which columns hold the name and the birthday
//! - `date` parses the many ways people write a birthday
//! - `record` / `event` build the per-person events
//! - `ics` writes (and reads back) the calendar document
//! - `convert` ties it all together into a `ConversionReport`

pub mod config;
pub mod convert;
pub mod date;
pub mod error;
pub mod event;
pub mod header;
pub mod ics;
pub mod logging;
pub mod record;
pub mod recurrence;
pub mod source;
pub mod table;

pub use config::{CalendarConfig, ComplendarConfig, ResolverConfig};
pub use convert::{ConversionReport, GuessedHeaders, convert, convert_csv};
pub use date::{BirthDate, DateParseError};
pub use error::{ComplendarError, ComplendarResult};
pub use event::BirthdayEvent;
pub use header::{ResolutionFailure, ResolvedSchema, Role, resolve};
pub use record::{PersonRecord, SkipReason, SkippedRow};
pub use table::Table;
