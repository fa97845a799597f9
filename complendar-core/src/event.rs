//! The yearly birthday event built for each person.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::date::BirthDate;
use crate::record::PersonRecord;

/// Plain yearly recurrence on the start date's month and day.
pub const YEARLY: &str = "FREQ=YEARLY";

/// Yearly on the last day of February: Feb 29 in leap years, Feb 28 otherwise.
///
/// A plain `FREQ=YEARLY` rule starting on Feb 29 only produces occurrences in
/// leap years (RFC 5545 drops invalid dates), so leap-day birthdays use this instead.
pub const YEARLY_LAST_DAY_OF_FEBRUARY: &str = "FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=-1";

/// One person's recurring birthday, ready to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayEvent {
    uid: String,
    name: String,
    birth_date: BirthDate,
}

impl BirthdayEvent {
    pub fn new(name: impl Into<String>, birth_date: BirthDate, uid_domain: &str) -> Self {
        let name = name.into();
        let uid = stable_uid(&name, &birth_date, uid_domain);
        BirthdayEvent {
            uid,
            name,
            birth_date,
        }
    }

    pub fn from_record(record: &PersonRecord, uid_domain: &str) -> Self {
        Self::new(record.name.clone(), record.birth_date, uid_domain)
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn birth_date(&self) -> BirthDate {
        self.birth_date
    }

    /// "Jane's", or "James'" for names ending in s
    pub fn possessive(&self) -> String {
        if self.name.ends_with(['s', 'S']) {
            format!("{}'", self.name)
        } else {
            format!("{}'s", self.name)
        }
    }

    pub fn summary(&self) -> String {
        format!("{} Birthday", self.possessive())
    }

    pub fn description(&self) -> String {
        format!("Celebrate {} birthday 🎂", self.possessive())
    }

    /// First occurrence, placed in `anchor_year` rather than the birth year.
    pub fn start(&self, anchor_year: i32) -> Option<NaiveDate> {
        self.birth_date.in_year(anchor_year)
    }

    pub fn rrule(&self) -> &'static str {
        if self.birth_date.is_leap_day() {
            YEARLY_LAST_DAY_OF_FEBRUARY
        } else {
            YEARLY
        }
    }
}

/// `<uuid>@<domain>` where the UUID is the first 16 bytes of
/// SHA-256("<name> <date key>"). Same person, same birthday, same UID.
pub fn stable_uid(name: &str, birth_date: &BirthDate, domain: &str) -> String {
    let digest = Sha256::digest(format!("{} {}", name, birth_date.key()).as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    format!("{}@{}", Uuid::from_bytes(bytes), domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, raw_date: &str) -> BirthdayEvent {
        BirthdayEvent::new(name, BirthDate::parse(raw_date).unwrap(), "complendar.event")
    }

    #[test]
    fn test_summary_and_possessive() {
        assert_eq!(event("Jane Doe", "3/15").summary(), "Jane Doe's Birthday");
        assert_eq!(event("James", "3/15").summary(), "James' Birthday");
        assert_eq!(
            event("Jane", "3/15").description(),
            "Celebrate Jane's birthday 🎂"
        );
    }

    #[test]
    fn test_uid_is_stable_and_content_derived() {
        let a = event("Jane Doe", "03/15/1990");
        let b = event("Jane Doe", "1990-03-15");
        let c = event("Jane Doe", "March 15");
        let d = event("John Doe", "03/15/1990");

        assert_eq!(a.uid(), b.uid());
        assert_ne!(a.uid(), c.uid());
        assert_ne!(a.uid(), d.uid());
        assert!(a.uid().ends_with("@complendar.event"));
        assert_eq!(a.uid().len(), 36 + "@complendar.event".len());
    }

    #[test]
    fn test_start_ignores_birth_year() {
        let e = event("Jane", "03/15/1990");
        assert_eq!(e.start(2000), NaiveDate::from_ymd_opt(2000, 3, 15));
    }

    #[test]
    fn test_leap_day_uses_last_day_of_february() {
        assert_eq!(event("Leap", "Feb 29").rrule(), YEARLY_LAST_DAY_OF_FEBRUARY);
        assert_eq!(event("Leap", "02/29/2004").rrule(), YEARLY_LAST_DAY_OF_FEBRUARY);
        assert_eq!(event("Not leap", "Feb 28").rrule(), YEARLY);
    }
}
