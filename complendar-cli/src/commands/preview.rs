use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Months, NaiveDate};
use complendar_core::ics::{ParsedEvent, parse_calendar};
use complendar_core::recurrence::{next_occurrence, occurrences};
use owo_colors::OwoColorize;

use crate::render::{Occurrence, Render, pluralize};

pub fn run(file: &Path, years: u32, from: Option<&str>) -> Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let events = parse_calendar(&content)?;

    let from = match from {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("Invalid --from date '{raw}', expected YYYY-MM-DD"))?,
        None => Local::now().date_naive(),
    };
    let to = from
        .checked_add_months(Months::new(years.saturating_mul(12)))
        .and_then(|d| d.pred_opt())
        .context("--years reaches past the end of the calendar")?;

    let mut upcoming = Vec::new();
    for event in &events {
        match &event.rrule {
            Some(rule) => upcoming.extend(
                occurrences(event.start, rule, from, to)?
                    .into_iter()
                    .map(|date| Occurrence { date, event }),
            ),
            None if event.start >= from && event.start <= to => {
                upcoming.push(Occurrence {
                    date: event.start,
                    event,
                });
            }
            None => {}
        }
    }
    upcoming.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.event.summary.cmp(&b.event.summary))
    });

    println!("📅 {} ({} to {})", file.display(), from, to);
    if upcoming.is_empty() {
        println!("   {}", "No birthdays in this range".dimmed());
        return Ok(());
    }
    for occurrence in &upcoming {
        println!("{}", occurrence.render());
    }

    if let Some(next) = next_birthday(&events, from)? {
        println!("\nNext up: {}", next.render().trim_start());
    }
    println!(
        "{} {} from {} {}",
        upcoming.len(),
        pluralize("occurrence", upcoming.len()),
        events.len(),
        pluralize("event", events.len())
    );

    Ok(())
}

/// Soonest recurring event on or after `from`
fn next_birthday(events: &[ParsedEvent], from: NaiveDate) -> Result<Option<Occurrence<'_>>> {
    let mut next: Option<Occurrence<'_>> = None;
    for event in events {
        let Some(rule) = &event.rrule else { continue };
        let Some(date) = next_occurrence(event.start, rule, from)? else { continue };
        if next.as_ref().is_none_or(|n| date < n.date) {
            next = Some(Occurrence { date, event });
        }
    }
    Ok(next)
}
