//! RRULE expansion for all-day recurring events.
//!
//! Used to list upcoming birthdays from a calendar file and to check that the
//! rules we write produce one occurrence every year.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rrule::RRuleSet;

use crate::error::{ComplendarError, ComplendarResult};

/// Upper bound on occurrences returned from a single expansion.
const MAX_OCCURRENCES: u16 = 1000;

/// Look this far ahead for the next occurrence (covers leap-year-only rules).
const NEXT_OCCURRENCE_WINDOW_DAYS: i64 = 366 * 8;

/// Build an iCalendar-format RRULE string for the rrule crate parser.
/// The rrule crate needs a datetime, so all-day dates become midnight UTC.
fn build_rrule_string(start: NaiveDate, rrule: &str) -> String {
    format!("DTSTART:{}T000000Z\nRRULE:{}", start.format("%Y%m%d"), rrule)
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Expand an all-day event starting on `start` into its occurrences within
/// `[from, to]` (both inclusive).
pub fn occurrences(start: NaiveDate, rrule: &str, from: NaiveDate, to: NaiveDate) -> ComplendarResult<Vec<NaiveDate>> {
    let rrule_set: RRuleSet = build_rrule_string(start, rrule)
        .parse()
        .map_err(|e| ComplendarError::Recurrence(format!("Failed to parse RRULE '{}': {}", rrule, e)))?;

    // after/before are exclusive, so widen by a second on each side
    let tz: rrule::Tz = Utc.into();
    let after = (midnight_utc(from) - Duration::seconds(1)).with_timezone(&tz);
    let before = (midnight_utc(to) + Duration::seconds(1)).with_timezone(&tz);

    let result = rrule_set.after(after).before(before).all(MAX_OCCURRENCES);

    Ok(result.dates.iter().map(|dt| dt.date_naive()).collect())
}

/// First occurrence on or after `on_or_after`, if any within the next few years.
pub fn next_occurrence(start: NaiveDate, rrule: &str, on_or_after: NaiveDate) -> ComplendarResult<Option<NaiveDate>> {
    let until = on_or_after + Duration::days(NEXT_OCCURRENCE_WINDOW_DAYS);
    Ok(occurrences(start, rrule, on_or_after, until)?.into_iter().next())
}
