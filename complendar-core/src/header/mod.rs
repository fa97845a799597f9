//! Header resolution: which column holds the name, which holds the birthday.
//!
//! Headers of shared forms are free text ("Your Name", "When's your b-day?"),
//! so resolution runs in two passes. First each header is scored against
//! synonym lists; a role with no good enough lexical match then falls back to
//! inspecting what the column's values look like.

mod lexical;
mod shape;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ResolverConfig;
use crate::table::Table;

pub use lexical::LexicalMatch;
use lexical::Synonyms;

/// The two things every row must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Name,
    Birthday,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Name => write!(f, "name"),
            Role::Birthday => write!(f, "birthday"),
        }
    }
}

/// Which pass picked a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    Lexical,
    ContentShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub index: usize,
    /// Raw header text, as shown to the user ("guessed header")
    pub header: String,
    pub method: ResolutionMethod,
}

/// The resolved columns. `name.index != date.index`, both within the header width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSchema {
    pub name: ResolvedColumn,
    pub date: ResolvedColumn,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    #[error("The header row is empty. There is no data to parse.")]
    EmptyHeader,

    #[error("Found {0} column(s), but separate name and birthday columns are needed")]
    TooFewColumns(usize),

    #[error("Could not tell which column holds the {}", describe_roles(.0))]
    Unresolved(Vec<Role>),
}

fn describe_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::to_string)
        .collect::<Vec<_>>()
        .join(" or the ")
}

/// Best lexical candidate at or above `min`, leftmost on ties.
fn best_lexical(scores: &[LexicalMatch], exclude: Option<usize>, min: LexicalMatch) -> Option<(usize, LexicalMatch)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|&(i, score)| Some(i) != exclude && score >= min && score > LexicalMatch::None)
        .fold(None, |best, (i, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((i, score)),
        })
}

/// Work out the name and birthday columns of `table`.
pub fn resolve(table: &Table, config: &ResolverConfig) -> Result<ResolvedSchema, ResolutionFailure> {
    let header = table.header();
    if header.is_empty() {
        return Err(ResolutionFailure::EmptyHeader);
    }
    if header.len() < 2 {
        return Err(ResolutionFailure::TooFewColumns(header.len()));
    }

    let min = config.min_lexical_match;
    let name_synonyms = Synonyms::for_role(Role::Name, &config.extra_name_synonyms);
    let date_synonyms = Synonyms::for_role(Role::Birthday, &config.extra_date_synonyms);
    let name_scores: Vec<LexicalMatch> = header.iter().map(|h| name_synonyms.score(h)).collect();
    let date_scores: Vec<LexicalMatch> = header.iter().map(|h| date_synonyms.score(h)).collect();
    tracing::debug!(?name_scores, ?date_scores, "lexical header scores");

    let mut name = best_lexical(&name_scores, None, min);
    let mut date = best_lexical(&date_scores, None, min);

    // One column can't play both roles; the stronger match keeps it
    if let (Some((name_index, name_score)), Some((date_index, date_score))) = (name, date) {
        if name_index == date_index {
            if name_score > date_score {
                date = best_lexical(&date_scores, Some(name_index), min);
            } else {
                name = best_lexical(&name_scores, Some(date_index), min);
            }
        }
    }

    let date = match date {
        Some((index, _)) => Some((index, ResolutionMethod::Lexical)),
        None => {
            tracing::warn!("no birthday header matched, inspecting column contents");
            shape::date_column(table, name.map(|(i, _)| i), config)
                .map(|index| (index, ResolutionMethod::ContentShape))
        }
    };

    let name = match name {
        Some((index, _)) => Some((index, ResolutionMethod::Lexical)),
        None => {
            tracing::warn!("no name header matched, inspecting column contents");
            shape::name_column(table, date.map(|(i, _)| i), config)
                .map(|index| (index, ResolutionMethod::ContentShape))
        }
    };

    let column = |(index, method): (usize, ResolutionMethod)| ResolvedColumn {
        index,
        header: header[index].clone(),
        method,
    };

    match (name, date) {
        (Some(name), Some(date)) => {
            let schema = ResolvedSchema {
                name: column(name),
                date: column(date),
            };
            tracing::info!(
                name = %schema.name.header,
                birthday = %schema.date.header,
                "guessed headers"
            );
            Ok(schema)
        }
        (name, date) => {
            let mut missing = Vec::new();
            if name.is_none() {
                missing.push(Role::Name);
            }
            if date.is_none() {
                missing.push(Role::Birthday);
            }
            Err(ResolutionFailure::Unresolved(missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_rows(rows: Vec<Vec<&str>>) -> Result<ResolvedSchema, ResolutionFailure> {
        resolve(&Table::from_rows(rows), &ResolverConfig::default())
    }

    #[test]
    fn test_google_form_headers() {
        let schema = resolve_rows(vec![
            vec!["Timestamp", "Your Name", "Your Birthday"],
            vec!["2021-01-01", "Jane Doe", "03/15/1990"],
        ])
        .unwrap();

        assert_eq!(schema.name.index, 1);
        assert_eq!(schema.date.index, 2);
        assert_eq!(schema.name.header, "Your Name");
        assert_eq!(schema.date.header, "Your Birthday");
        assert_eq!(schema.date.method, ResolutionMethod::Lexical);
    }

    #[test]
    fn test_exact_synonyms_win_regardless_of_content() {
        let schema = resolve_rows(vec![
            vec!["Notes", "DOB", "Name", "Seen on"],
            vec!["Jane", "not a date", "12/01/1990", "March 3"],
        ])
        .unwrap();

        assert_eq!(schema.name.index, 2);
        assert_eq!(schema.date.index, 1);
    }

    #[test]
    fn test_stronger_match_beats_leftmost() {
        let schema = resolve_rows(vec![
            vec!["Username", "Date added", "Full Name", "Birthday"],
            vec!["jd", "1/1/2020", "Jane Doe", "3/15"],
        ])
        .unwrap();

        assert_eq!(schema.name.index, 2);
        assert_eq!(schema.date.index, 3);
    }

    #[test]
    fn test_leftmost_wins_ties() {
        let schema = resolve_rows(vec![
            vec!["First Name", "Last Name", "Birthday"],
            vec!["Jane", "Doe", "3/15"],
        ])
        .unwrap();

        assert_eq!(schema.name.index, 0);
    }

    #[test]
    fn test_shared_column_goes_to_stronger_role() {
        // Equal scores for both roles: the birthday keeps the column
        let schema = resolve_rows(vec![
            vec!["Birthday name", "Col"],
            vec!["3/15", "Jane"],
        ])
        .unwrap();

        assert_eq!(schema.date.index, 0);
        assert_eq!(schema.name.index, 1);
        assert_eq!(schema.name.method, ResolutionMethod::ContentShape);
    }

    #[test]
    fn test_content_shape_fallback() {
        let schema = resolve_rows(vec![
            vec!["A", "B"],
            vec!["Jane Doe", "March 15"],
            vec!["John Smith", "April 2"],
            vec!["Ann Lee", "December 31"],
        ])
        .unwrap();

        assert_eq!(schema.date.index, 1);
        assert_eq!(schema.date.method, ResolutionMethod::ContentShape);
        assert_eq!(schema.name.index, 0);
        assert_eq!(schema.name.method, ResolutionMethod::ContentShape);
        assert_eq!(schema.date.header, "B");
    }

    #[test]
    fn test_fallback_accepts_half_parseable_column() {
        let schema = resolve_rows(vec![
            vec!["Who", "Col"],
            vec!["Jane", "3/15"],
            vec!["Bob", "sometime in May"],
        ])
        .unwrap();

        assert_eq!(schema.name.method, ResolutionMethod::Lexical);
        assert_eq!(schema.date.index, 1);
        assert_eq!(schema.date.method, ResolutionMethod::ContentShape);
    }

    #[test]
    fn test_weak_matches_below_minimum_use_content() {
        let config = ResolverConfig {
            min_lexical_match: LexicalMatch::Contains,
            ..ResolverConfig::default()
        };
        let table = Table::from_rows(vec![
            vec!["Name", "Birthdate2", "Col"],
            vec!["Jane", "x", "3/15"],
            vec!["Bob", "y", "4/2"],
        ]);

        let schema = resolve(&table, &config).unwrap();
        assert_eq!(schema.date.index, 2);
        assert_eq!(schema.date.method, ResolutionMethod::ContentShape);

        // Trusted at the default minimum
        let schema = resolve(&table, &ResolverConfig::default()).unwrap();
        assert_eq!(schema.date.index, 1);
        assert_eq!(schema.date.method, ResolutionMethod::Lexical);
    }

    #[test]
    fn test_unrelated_headers_fall_back_to_content() {
        for decoy in ["Last updated", "Candidate"] {
            let schema = resolve_rows(vec![
                vec!["Name", decoy, "Col"],
                vec!["Jane", "yes", "3/15"],
                vec!["Bob", "no", "4/2"],
            ])
            .unwrap();

            assert_eq!(schema.date.header, "Col", "picked {decoy}");
            assert_eq!(schema.date.method, ResolutionMethod::ContentShape);
        }
    }

    #[test]
    fn test_too_few_columns() {
        assert_eq!(
            resolve_rows(vec![vec!["Name"], vec!["Jane"]]),
            Err(ResolutionFailure::TooFewColumns(1))
        );
        assert_eq!(resolve_rows(vec![]), Err(ResolutionFailure::EmptyHeader));
    }

    #[test]
    fn test_unresolved_roles_are_named() {
        let err = resolve_rows(vec![
            vec!["Name", "Favourite colour"],
            vec!["Jane", "blue"],
            vec!["Bob", "green"],
        ])
        .unwrap_err();

        assert_eq!(err, ResolutionFailure::Unresolved(vec![Role::Birthday]));
        assert_eq!(err.to_string(), "Could not tell which column holds the birthday");

        let err = resolve_rows(vec![vec!["1", "2"], vec!["3", "4"]]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not tell which column holds the name or the birthday"
        );
    }

    #[test]
    fn test_duplicate_and_empty_headers() {
        let schema = resolve_rows(vec![
            vec!["", "Name", "Name", "Birthday"],
            vec!["x", "Jane", "Jane", "3/15"],
        ])
        .unwrap();

        assert_eq!(schema.name.index, 1);
        assert_eq!(schema.date.index, 3);
    }
}
