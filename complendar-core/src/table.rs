//! Tabular input: a header row followed by data rows.

use crate::error::{ComplendarError, ComplendarResult};

/// One data row, padded or truncated to the header width.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 1-based row number in the source sheet (the header is row 1)
    pub line: usize,
    pub cells: Vec<String>,
}

impl Row {
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// A spreadsheet as plain strings. The first row is always the header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table from already-split rows. The first row becomes the header.
    ///
    /// Rows where every cell is blank are dropped. Short rows get empty
    /// trailing cells, long rows are cut to the header width.
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect::<Vec<String>>());

        let mut header = rows.next().unwrap_or_default();
        if let Some(first) = header.first_mut() {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.to_string();
            }
        }

        let width = header.len();
        let rows = rows
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|(i, mut cells)| {
                cells.resize(width, String::new());
                Row { line: i + 2, cells }
            })
            .collect();

        Table { header, rows }
    }

    /// Parse comma-separated text (as exported by spreadsheet apps).
    pub fn from_csv(text: &str) -> ComplendarResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ComplendarError::Csv(e.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        Ok(Self::from_rows(rows))
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }
}
