//! Content-shape inspection: guess a column's role from its values.

use crate::config::ResolverConfig;
use crate::date::BirthDate;
use crate::table::Table;

/// Names longer than this are more likely free-text answers.
const MAX_NAME_CHARS: usize = 64;

/// The first `sample_size` data rows' cells for one column, trimmed.
fn sample<'a>(table: &'a Table, index: usize, sample_size: usize) -> impl Iterator<Item = &'a str> {
    table
        .rows()
        .iter()
        .take(sample_size)
        .map(move |row| row.cell(index).trim())
}

/// Share of non-empty sampled cells that parse as a birthday.
pub(super) fn date_ratio(table: &Table, index: usize, sample_size: usize) -> Option<f64> {
    let cells: Vec<&str> = sample(table, index, sample_size)
        .filter(|c| !c.is_empty())
        .collect();
    if cells.is_empty() {
        return None;
    }

    let parsed = cells.iter().filter(|c| BirthDate::parse(c).is_ok()).count();
    Some(parsed as f64 / cells.len() as f64)
}

/// Share of sampled cells that look like a person's name. Empty cells count against.
pub(super) fn name_ratio(table: &Table, index: usize, sample_size: usize) -> Option<f64> {
    let cells: Vec<&str> = sample(table, index, sample_size).collect();
    if cells.is_empty() {
        return None;
    }

    let names = cells.iter().filter(|c| looks_like_name(c)).count();
    Some(names as f64 / cells.len() as f64)
}

fn looks_like_name(cell: &str) -> bool {
    !cell.is_empty()
        && cell.chars().count() <= MAX_NAME_CHARS
        && cell.chars().any(char::is_alphabetic)
        && !cell.contains('@')
        && BirthDate::parse(cell).is_err()
}

/// The column whose values most often parse as dates. Ties go to the leftmost.
pub(super) fn date_column(table: &Table, exclude: Option<usize>, config: &ResolverConfig) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for index in (0..table.width()).filter(|i| Some(*i) != exclude) {
        let Some(ratio) = date_ratio(table, index, config.sample_size) else {
            continue;
        };
        tracing::debug!(column = index, ratio, "date shape");

        if ratio >= config.date_ratio_threshold && best.is_none_or(|(_, b)| ratio > b) {
            best = Some((index, ratio));
        }
    }

    best.map(|(index, _)| index)
}

/// The first column whose values mostly look like names.
pub(super) fn name_column(table: &Table, exclude: Option<usize>, config: &ResolverConfig) -> Option<usize> {
    (0..table.width())
        .filter(|i| Some(*i) != exclude)
        .find(|&index| {
            name_ratio(table, index, config.sample_size)
                .is_some_and(|ratio| ratio >= config.name_ratio_threshold)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_rows(vec![
            vec!["Submitted", "A", "B", "Contact"],
            vec!["1", "Jane Doe", "March 15", "jane@example.com"],
            vec!["2", "Bob", "April 1", "bob@example.com"],
            vec!["3", "Alice", "garbage", ""],
        ])
    }

    #[test]
    fn test_date_ratio_ignores_empty_cells() {
        let table = table();
        let ratio = date_ratio(&table, 2, 10).unwrap();
        assert!((ratio - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(date_ratio(&table, 1, 10), Some(0.0));
    }

    #[test]
    fn test_sample_size_limits_rows() {
        let table = table();
        assert_eq!(date_ratio(&table, 2, 2), Some(1.0));
    }

    #[test]
    fn test_date_column_picks_best_ratio() {
        let config = ResolverConfig::default();
        assert_eq!(date_column(&table(), None, &config), Some(2));
        assert_eq!(date_column(&table(), Some(2), &config), None);
    }

    #[test]
    fn test_name_column_skips_numbers_and_emails() {
        let config = ResolverConfig::default();
        assert_eq!(name_column(&table(), None, &config), Some(1));
        assert_eq!(name_column(&table(), Some(1), &config), None);
    }

    #[test]
    fn test_no_rows_means_no_guess() {
        let table = Table::from_rows(vec![vec!["A", "B"]]);
        let config = ResolverConfig::default();
        assert_eq!(date_column(&table, None, &config), None);
        assert_eq!(name_column(&table, None, &config), None);
    }
}
