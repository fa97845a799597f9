//! Row-by-row extraction of (name, birthday) records.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::date::{BirthDate, DateParseError};
use crate::header::ResolvedSchema;
use crate::table::Table;

/// One person whose row survived extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    /// Trimmed, never empty
    pub name: String,
    pub birth_date: BirthDate,
    /// Row number in the source sheet
    pub row: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    EmptyName,
    InvalidDate(DateParseError),
    /// Same name and birthday as an earlier row (a form submitted twice)
    Duplicate { first_row: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyName => write!(f, "name is empty"),
            SkipReason::InvalidDate(err) => write!(f, "{err}"),
            SkipReason::Duplicate { first_row } => write!(f, "same name and birthday as row {first_row}"),
        }
    }
}

/// A row left out of the calendar, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    #[serde(serialize_with = "serialize_display")]
    pub reason: SkipReason,
}

fn serialize_display<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Records in source-row order plus the rows that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub records: Vec<PersonRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Pull a record out of every data row, collecting the rows that don't make it.
///
/// Repeats of a (name, birthday) pair are skipped: they would share one event UID.
pub fn extract_records(table: &Table, schema: &ResolvedSchema) -> Extraction {
    let mut extraction = Extraction::default();
    let mut seen: HashMap<(String, String), usize> = HashMap::new();

    for row in table.rows() {
        let name = row.cell(schema.name.index).trim();
        let parsed = if name.is_empty() {
            Err(SkipReason::EmptyName)
        } else {
            row.cell(schema.date.index)
                .parse::<BirthDate>()
                .map_err(SkipReason::InvalidDate)
                .and_then(|birth_date| match seen.entry((name.to_string(), birth_date.key())) {
                    Entry::Occupied(first) => Err(SkipReason::Duplicate {
                        first_row: *first.get(),
                    }),
                    Entry::Vacant(slot) => {
                        slot.insert(row.line);
                        Ok(birth_date)
                    }
                })
        };

        match parsed {
            Ok(birth_date) => extraction.records.push(PersonRecord {
                name: name.to_string(),
                birth_date,
                row: row.line,
            }),
            Err(reason) => {
                tracing::debug!(row = row.line, %reason, "skipping row");
                extraction.skipped.push(SkippedRow {
                    row: row.line,
                    reason,
                });
            }
        }
    }

    extraction
}
