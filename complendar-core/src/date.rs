//! Birthday parsing.
//!
//! People write birthdays in many ways (`03/15/1990`, `March 15`, `1990-03-15`,
//! `15th of March`...). `BirthDate::parse` accepts a fixed set of shapes, tried
//! from least to most ambiguous, and keeps the year optional.

use std::fmt;
use std::str::FromStr;

use chrono::{Month, NaiveDate, Weekday};
use serde::Serialize;
use thiserror::Error;

/// Leap year used to validate a month/day pair when the birth year is unknown.
const LEAP_REFERENCE_YEAR: i32 = 2000;

const ORDINAL_SUFFIXES: &[&str] = &["st", "nd", "rd", "th"];
const FILLER_WORDS: &[&str] = &["of", "the"];

/// Why a cell could not be read as a birthday.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("birthday is empty")]
    Empty,

    #[error("unrecognized date format '{0}'")]
    Unrecognized(String),

    #[error("month {0} is out of range")]
    MonthOutOfRange(u32),

    #[error("day {day} does not exist in month {month}{}", in_year(.year))]
    InvalidDay {
        month: u32,
        day: u32,
        year: Option<i32>,
    },
}

fn in_year(year: &Option<i32>) -> String {
    year.map(|y| format!(" of {y}")).unwrap_or_default()
}

/// A calendar day of birth whose year may be unknown.
///
/// Always a real day: `Feb 29` is only accepted without a year or in a leap year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BirthDate {
    month: u32,
    day: u32,
    year: Option<i32>,
}

impl BirthDate {
    pub fn new(month: u32, day: u32, year: Option<i32>) -> Result<Self, DateParseError> {
        if !(1..=12).contains(&month) {
            return Err(DateParseError::MonthOutOfRange(month));
        }

        NaiveDate::from_ymd_opt(year.unwrap_or(LEAP_REFERENCE_YEAR), month, day)
            .ok_or(DateParseError::InvalidDay { month, day, year })?;

        Ok(BirthDate { month, day, year })
    }

    /// Parse a free-form birthday cell.
    pub fn parse(raw: &str) -> Result<Self, DateParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DateParseError::Empty);
        }

        let unrecognized = || DateParseError::Unrecognized(trimmed.to_string());
        let parts = tokenize(trimmed)
            .ok_or_else(unrecognized)?
            .into_iter()
            .filter_map(Part::from_token)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(unrecognized)?;

        use Part::{MonthName, Number};
        let (month, day, year) = match parts.as_slice() {
            // 2004-03-01: year first is never read day-first
            [Number(y, 4), Number(m, 1..=2), Number(d, 1..=2)] => (*m, *d, Some(*y)),
            // 03/15/1990 (US order)
            [Number(m, 1..=2), Number(d, 1..=2), Number(y, 4)] => (*m, *d, Some(*y)),
            // March 15, 1990
            [MonthName(m), Number(d, 1..=2), Number(y, 4)] => (*m, *d, Some(*y)),
            // 15 March 1990
            [Number(d, 1..=2), MonthName(m), Number(y, 4)] => (*m, *d, Some(*y)),
            // 3/15
            [Number(m, 1..=2), Number(d, 1..=2)] => (*m, *d, None),
            // March 15
            [MonthName(m), Number(d, 1..=2)] => (*m, *d, None),
            // 15 March
            [Number(d, 1..=2), MonthName(m)] => (*m, *d, None),
            _ => return Err(unrecognized()),
        };

        Self::new(month, day, year.map(|y| y as i32))
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn has_known_year(&self) -> bool {
        self.year.is_some()
    }

    pub fn is_leap_day(&self) -> bool {
        self.month == 2 && self.day == 29
    }

    /// This birthday placed in `year`, if that day exists in that year.
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }

    /// Normalized text form: `YYYY-MM-DD`, or `--MM-DD` (ISO 8601) without a year.
    pub fn key(&self) -> String {
        match self.year {
            Some(year) => format!("{:04}-{:02}-{:02}", year, self.month, self.day),
            None => format!("--{:02}-{:02}", self.month, self.day),
        }
    }
}

impl FromStr for BirthDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Digits(&'a str),
    /// A word, and whether it directly follows digits (`15th`)
    Word(&'a str, bool),
}

#[derive(Debug, PartialEq)]
enum Part {
    /// Value and number of digits written
    Number(u32, usize),
    MonthName(u32),
}

impl Part {
    /// `None` drops the token, `Some(None)` rejects the whole input.
    fn from_token(token: Token<'_>) -> Option<Option<Part>> {
        match token {
            Token::Digits(s) if s.len() <= 4 => Some(s.parse().ok().map(|n| Part::Number(n, s.len()))),
            Token::Digits(_) => Some(None),
            Token::Word(w, after_digits) => {
                let lower = w.to_lowercase();
                if after_digits && ORDINAL_SUFFIXES.contains(&lower.as_str()) {
                    return None;
                }
                if FILLER_WORDS.contains(&lower.as_str()) || lower.parse::<Weekday>().is_ok() {
                    return None;
                }
                let name = if lower == "sept" { "sep" } else { lower.as_str() };
                Some(
                    name.parse::<Month>()
                        .ok()
                        .map(|m| Part::MonthName(m.number_from_month())),
                )
            }
        }
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '/' | '-' | '.' | ',')
}

/// Split into digit runs and letter runs. Returns `None` on any other character.
fn tokenize(s: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut chars = s.char_indices().peekable();
    let mut prev_was_digits = false;

    while let Some((start, c)) = chars.next() {
        if is_separator(c) {
            prev_was_digits = false;
            continue;
        }

        let digits = c.is_ascii_digit();
        if !digits && !c.is_alphabetic() {
            return None;
        }

        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            let same_kind = if digits {
                next.is_ascii_digit()
            } else {
                next.is_alphabetic()
            };
            if !same_kind {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }

        let text = &s[start..end];
        if digits {
            tokens.push(Token::Digits(text));
        } else {
            tokens.push(Token::Word(text, prev_was_digits));
        }
        prev_was_digits = digits;
    }

    Some(tokens)
}
