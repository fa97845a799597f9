//! Colored terminal rendering for complendar-core types.

use chrono::NaiveDate;
use complendar_core::ics::ParsedEvent;
use complendar_core::{GuessedHeaders, SkippedRow};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for GuessedHeaders {
    fn render(&self) -> String {
        format!(
            "Guessed headers\n   {} Name: \"{}\"\n   {} Birthday: \"{}\"",
            "→".dimmed(),
            self.name.cyan(),
            "→".dimmed(),
            self.birthday.cyan()
        )
    }
}

impl Render for SkippedRow {
    fn render(&self) -> String {
        format!("   {} row {}: {}", "!".yellow(), self.row, self.reason.to_string().dimmed())
    }
}

/// One occurrence of a calendar event
pub struct Occurrence<'a> {
    pub date: NaiveDate,
    pub event: &'a ParsedEvent,
}

impl Render for Occurrence<'_> {
    fn render(&self) -> String {
        format!(
            "   {} {}",
            self.date.format("%a %Y-%m-%d").to_string().dimmed(),
            self.event.summary
        )
    }
}

/// Threshold for compact view (show a count instead of every skipped row)
const COMPACT_THRESHOLD: usize = 10;

/// Render the skip report, compacting long lists unless `verbose`.
pub fn render_skipped(skipped: &[SkippedRow], verbose: bool) -> Vec<String> {
    if skipped.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![format!(
        "Skipped {} {}",
        skipped.len(),
        pluralize("row", skipped.len())
    )
    .yellow()
    .to_string()];

    if verbose || skipped.len() <= COMPACT_THRESHOLD {
        lines.extend(skipped.iter().map(Render::render));
    } else {
        lines.extend(skipped[..COMPACT_THRESHOLD].iter().map(Render::render));
        let rest = skipped.len() - COMPACT_THRESHOLD;
        lines.push(format!("   {}", format!("(and {rest} more, use -v to see all)").dimmed()));
    }

    lines
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
