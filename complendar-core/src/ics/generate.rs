//! ICS file generation.

use chrono::{Duration, NaiveDate};
use icalendar::{Alarm, Calendar, Component, EventLike, Property, Trigger, ValueType};

use crate::config::{CalendarConfig, ReminderConfig};
use crate::error::{ComplendarError, ComplendarResult};
use crate::event::BirthdayEvent;

/// A finished calendar: `\r\n` line endings, folded lines, one VEVENT per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDocument {
    text: String,
    event_count: usize,
}

impl CalendarDocument {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn event_count(&self) -> usize {
        self.event_count
    }
}

/// Encode `events` (in order) into a calendar document.
pub fn encode(events: &[BirthdayEvent], config: &CalendarConfig) -> ComplendarResult<CalendarDocument> {
    // DTSTAMP is required by RFC 5545; a fixed value keeps output byte-identical between runs
    let dtstamp = format!("{:04}0101T000000Z", config.anchor_year);

    let reminders = config
        .reminders
        .iter()
        .map(|reminder| -> ComplendarResult<(&ReminderConfig, Duration)> {
            let offset = Duration::from_std(reminder.offset()?)
                .map_err(|e| ComplendarError::Encoding(format!("Reminder offset out of range: {e}")))?;
            Ok((reminder, offset))
        })
        .collect::<ComplendarResult<Vec<_>>>()?;

    let mut cal = Calendar::new();
    cal.name(&config.calendar_name);

    for event in events {
        cal.push(build_event(event, config.anchor_year, &dtstamp, &reminders)?);
    }
    let cal = cal.done();

    Ok(CalendarDocument {
        text: strip_ics_bloat(&cal.to_string(), &config.prod_id),
        event_count: events.len(),
    })
}

fn build_event(
    event: &BirthdayEvent,
    anchor_year: i32,
    dtstamp: &str,
    reminders: &[(&ReminderConfig, Duration)],
) -> ComplendarResult<icalendar::Event> {
    if event.name().trim().is_empty() {
        return Err(ComplendarError::Encoding(format!(
            "Event {} has no name",
            event.uid()
        )));
    }

    let start = event.start(anchor_year).ok_or_else(|| {
        ComplendarError::Encoding(format!(
            "{} does not exist in anchor year {anchor_year}",
            event.birth_date()
        ))
    })?;
    let end = start
        .succ_opt()
        .ok_or_else(|| ComplendarError::Encoding(format!("No day after {start}")))?;

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(event.uid());
    ics_event.add_property("DTSTAMP", dtstamp);
    ics_event.summary(&event.summary());
    ics_event.description(&event.description());

    add_date_property(&mut ics_event, "DTSTART", start);
    add_date_property(&mut ics_event, "DTEND", end);
    ics_event.add_property("RRULE", event.rrule());

    ics_event.add_property("CATEGORIES", "BIRTHDAY");
    // Birthdays don't block time
    ics_event.add_property("TRANSP", "TRANSPARENT");

    let possessive = event.possessive();
    for (reminder, offset) in reminders {
        let trigger = Trigger::before_start(*offset);
        ics_event.alarm(Alarm::display(&reminder.message_for(&possessive), trigger));
    }

    Ok(ics_event.done())
}

/// Add an all-day date property (`;VALUE=DATE`)
fn add_date_property(ics_event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with ours
/// - Remove CALSCALE:GREGORIAN (it's the default)
/// - Remove DTSTAMP and UID inside VALARM sections (not required by RFC 5545,
///   and the crate fills them with the current time and a random id)
fn strip_ics_bloat(ics: &str, prod_id: &str) -> String {
    let mut result = String::with_capacity(ics.len());
    let mut in_valarm = false;

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(prod_id);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        if line == "BEGIN:VALARM" {
            in_valarm = true;
        } else if line == "END:VALARM" {
            in_valarm = false;
        }

        if in_valarm && (line.starts_with("DTSTAMP:") || line.starts_with("UID:")) {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::BirthDate;

    fn make_event(name: &str, raw_date: &str) -> BirthdayEvent {
        BirthdayEvent::new(name, BirthDate::parse(raw_date).unwrap(), "complendar.event")
    }

    fn valarm_sections(ics: &str) -> Vec<String> {
        ics.split("BEGIN:VALARM")
            .skip(1)
            .map(|s| s.split("END:VALARM").next().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_encode_single_birthday() {
        let doc = encode(&[make_event("Jane Doe", "03/15/1990")], &CalendarConfig::default()).unwrap();
        let ics = doc.as_str();

        assert_eq!(doc.event_count(), 1);
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"), "ICS:\n{}", ics);
        assert!(ics.ends_with("END:VCALENDAR\r\n"), "ICS:\n{}", ics);
        assert!(ics.contains("SUMMARY:Jane Doe's Birthday"), "ICS:\n{}", ics);
        assert!(ics.contains("DTSTART;VALUE=DATE:20000315"), "ICS:\n{}", ics);
        assert!(ics.contains("DTEND;VALUE=DATE:20000316"), "ICS:\n{}", ics);
        assert!(ics.contains("RRULE:FREQ=YEARLY\r\n"), "ICS:\n{}", ics);
        assert!(ics.contains("TRANSP:TRANSPARENT"));
        assert!(ics.contains("CATEGORIES:BIRTHDAY"));
        assert!(ics.contains("PRODID:-//Complendar//EN\r\n"));
        assert!(!ics.contains("CALSCALE"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    }

    #[test]
    fn test_two_minimal_display_alarms() {
        let doc = encode(&[make_event("Jane", "3/15")], &CalendarConfig::default()).unwrap();
        let alarms = valarm_sections(doc.as_str());

        assert_eq!(alarms.len(), 2, "ICS:\n{}", doc.as_str());
        for alarm in &alarms {
            assert!(alarm.contains("ACTION:DISPLAY"), "Got:\n{}", alarm);
            assert!(alarm.contains("TRIGGER"), "Got:\n{}", alarm);
            assert!(!alarm.contains("UID:"), "VALARM should not have UID. Got:\n{}", alarm);
            assert!(!alarm.contains("DTSTAMP:"), "VALARM should not have DTSTAMP. Got:\n{}", alarm);
        }
        assert!(alarms[0].contains("Tomorrow is Jane's birthday!"));
        assert!(alarms[1].contains("Today is Jane's birthday!"));
    }

    #[test]
    fn test_birth_year_is_never_written() {
        let doc = encode(&[make_event("Jane", "03/15/1990")], &CalendarConfig::default()).unwrap();

        let leaks: Vec<&str> = doc
            .as_str()
            .lines()
            .filter(|l| !l.starts_with("UID:"))
            .filter(|l| l.contains("1990"))
            .collect();
        assert!(leaks.is_empty(), "Birth year leaked: {:?}", leaks);
    }

    #[test]
    fn test_crlf_line_endings() {
        let doc = encode(&[make_event("Jane", "3/15")], &CalendarConfig::default()).unwrap();
        assert!(!doc.as_str().replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let events = vec![make_event("Jane", "3/15"), make_event("Bob", "Feb 29")];
        let config = CalendarConfig::default();

        let first = encode(&events, &config).unwrap();
        let second = encode(&events, &config).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_events_keep_input_order() {
        let events = vec![make_event("Zed", "1/1"), make_event("Amy", "2/2")];
        let doc = encode(&events, &CalendarConfig::default()).unwrap();
        let ics = doc.as_str();

        let zed = ics.find("Zed's Birthday").unwrap();
        let amy = ics.find("Amy's Birthday").unwrap();
        assert!(zed < amy);
    }

    #[test]
    fn test_leap_day_rule() {
        let doc = encode(&[make_event("Leap", "Feb 29")], &CalendarConfig::default()).unwrap();
        let ics = doc.as_str();

        assert!(ics.contains("DTSTART;VALUE=DATE:20000229"), "ICS:\n{}", ics);
        assert!(ics.contains("RRULE:FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=-1"), "ICS:\n{}", ics);
    }

    #[test]
    fn test_custom_envelope_and_reminders() {
        let config = CalendarConfig {
            prod_id: "-//Example//Test//EN".to_string(),
            calendar_name: "Team".to_string(),
            reminders: vec![ReminderConfig {
                before: "2days".to_string(),
                message: "{who} party soon".to_string(),
            }],
            ..CalendarConfig::default()
        };

        let doc = encode(&[make_event("Jane", "3/15")], &config).unwrap();
        let ics = doc.as_str();

        assert!(ics.contains("PRODID:-//Example//Test//EN\r\n"));
        assert!(ics.contains("Team"));
        assert_eq!(valarm_sections(ics).len(), 1);
        assert!(ics.contains("Jane's party soon"));
    }

    #[test]
    fn test_anchor_year_without_leap_day_is_an_encoding_error() {
        let config = CalendarConfig {
            anchor_year: 2001,
            ..CalendarConfig::default()
        };

        let result = encode(&[make_event("Leap", "Feb 29")], &config);
        assert!(matches!(result, Err(ComplendarError::Encoding(_))));
    }
}
