//! End-to-end conversion: table in, calendar document plus report out.

use serde::Serialize;

use crate::config::ComplendarConfig;
use crate::error::ComplendarError;
use crate::event::BirthdayEvent;
use crate::header::{ResolvedSchema, resolve};
use crate::ics;
use crate::record::{Extraction, SkippedRow, extract_records};
use crate::table::Table;

/// Header text of the columns that were picked, for showing to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessedHeaders {
    pub name: String,
    pub birthday: String,
}

impl From<&ResolvedSchema> for GuessedHeaders {
    fn from(schema: &ResolvedSchema) -> Self {
        GuessedHeaders {
            name: schema.name.header.clone(),
            birthday: schema.date.header.clone(),
        }
    }
}

/// Outcome of one conversion. Either `document` or `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guessed_headers: Option<GuessedHeaders>,
    pub event_count: usize,
    pub skipped_count: usize,
    pub skipped: Vec<SkippedRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionReport {
    fn failed(error: ComplendarError, guessed_headers: Option<GuessedHeaders>, skipped: Vec<SkippedRow>) -> Self {
        tracing::warn!(%error, "conversion failed");
        ConversionReport {
            success: false,
            guessed_headers,
            event_count: 0,
            skipped_count: skipped.len(),
            skipped,
            document: None,
            error: Some(error.to_string()),
        }
    }
}

/// Convert a table into a birthday calendar.
///
/// Never fails outright: problems are reported in the returned `ConversionReport`.
pub fn convert(table: &Table, config: &ComplendarConfig) -> ConversionReport {
    let schema = match resolve(table, &config.resolver) {
        Ok(schema) => schema,
        Err(failure) => return ConversionReport::failed(failure.into(), None, Vec::new()),
    };
    let guessed = GuessedHeaders::from(&schema);

    let Extraction { records, skipped } = extract_records(table, &schema);
    if records.is_empty() {
        let error = ComplendarError::NoValidRecords {
            skipped: skipped.len(),
        };
        return ConversionReport::failed(error, Some(guessed), skipped);
    }

    let events: Vec<BirthdayEvent> = records
        .iter()
        .map(|record| BirthdayEvent::from_record(record, &config.calendar.uid_domain))
        .collect();

    match ics::encode(&events, &config.calendar) {
        Ok(document) => {
            tracing::info!(
                events = document.event_count(),
                skipped = skipped.len(),
                "converted birthdays"
            );
            ConversionReport {
                success: true,
                guessed_headers: Some(guessed),
                event_count: document.event_count(),
                skipped_count: skipped.len(),
                skipped,
                document: Some(document.into_string()),
                error: None,
            }
        }
        Err(error) => ConversionReport::failed(error, Some(guessed), skipped),
    }
}

/// Parse CSV text and convert it.
pub fn convert_csv(csv: &str, config: &ComplendarConfig) -> ConversionReport {
    match Table::from_csv(csv) {
        Ok(table) => convert(&table, config),
        Err(error) => ConversionReport::failed(error, None, Vec::new()),
    }
}
