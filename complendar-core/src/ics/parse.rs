//! ICS file parsing using the icalendar crate's parser.

use chrono::NaiveDate;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};

use crate::error::{ComplendarError, ComplendarResult};

/// The parts of a VEVENT needed to list and expand birthdays.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    pub uid: String,
    pub summary: String,
    /// Day of DTSTART (the date part, for timed events)
    pub start: NaiveDate,
    pub rrule: Option<String>,
    pub alarms: usize,
}

/// Parse every VEVENT in an ICS document, in document order.
pub fn parse_calendar(content: &str) -> ComplendarResult<Vec<ParsedEvent>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| ComplendarError::IcsParse(e.to_string()))?;

    let mut events = Vec::new();
    collect_events(&calendar.components, &mut events)?;
    Ok(events)
}

/// VEVENTs may sit at the top level or inside a VCALENDAR component.
fn collect_events(components: &[Component<'_>], events: &mut Vec<ParsedEvent>) -> ComplendarResult<()> {
    for component in components {
        if component.name == "VEVENT" {
            events.push(parse_event(component)?);
        } else {
            collect_events(&component.components, events)?;
        }
    }
    Ok(())
}

fn parse_event(vevent: &Component<'_>) -> ComplendarResult<ParsedEvent> {
    let uid = vevent
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .ok_or_else(|| ComplendarError::IcsParse("VEVENT without UID".into()))?;

    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_else(|| "(No title)".to_string());

    let start = vevent
        .find_prop("DTSTART")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_date)
        .ok_or_else(|| ComplendarError::IcsParse(format!("Event '{}' has no readable DTSTART", uid)))?;

    let rrule = vevent.find_prop("RRULE").map(|p| p.val.to_string());

    let alarms = vevent
        .components
        .iter()
        .filter(|c| c.name == "VALARM")
        .count();

    Ok(ParsedEvent {
        uid,
        summary,
        start,
        rrule,
        alarms,
    })
}

fn to_date(dpt: DatePerhapsTime) -> NaiveDate {
    match dpt {
        DatePerhapsTime::Date(d) => d,
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => dt.date_naive(),
            CalendarDateTime::Floating(naive) => naive.date(),
            CalendarDateTime::WithTimezone { date_time, .. } => date_time.date(),
        },
    }
}
