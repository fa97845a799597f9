//! Header text scoring against synonym lists.

use serde::{Deserialize, Serialize};

use super::Role;

/// How well a header matches a role, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexicalMatch {
    None,
    /// A word starts with a role keyword (`names`, `birthdate2`)
    Partial,
    /// Contains a synonym as whole words (`what is your name`)
    Contains,
    /// Is a synonym (`Your Name`, `D.O.B.`)
    Exact,
}

const NAME_SYNONYMS: &[&str] = &[
    "name",
    "full name",
    "your name",
    "first name",
    "last name",
    "person",
    "who",
    "nickname",
    "display name",
    "participant",
    "member",
    "employee",
    "student",
    "friend",
];

const DATE_SYNONYMS: &[&str] = &[
    "birthday",
    "birth date",
    "birthdate",
    "dob",
    "date of birth",
    "your birthday",
    "bday",
    "b day",
    "birth day",
    "born",
    "day of birth",
];

const NAME_KEYWORDS: &[&str] = &["name"];
const DATE_KEYWORDS: &[&str] = &["birth", "bday", "dob", "born", "date"];

/// A header reduced to lowercase alphanumeric words.
#[derive(Debug, Clone, PartialEq)]
struct Normalized {
    words: Vec<String>,
    compact: String,
}

impl Normalized {
    fn new(text: &str) -> Self {
        let words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        let compact = words.concat();
        Normalized { words, compact }
    }

    fn contains_words(&self, phrase: &Normalized) -> bool {
        !phrase.words.is_empty()
            && self
                .words
                .windows(phrase.words.len())
                .any(|window| window == phrase.words.as_slice())
    }
}

/// Synonyms and keywords for one role.
pub(super) struct Synonyms {
    phrases: Vec<Normalized>,
    keywords: &'static [&'static str],
}

impl Synonyms {
    pub(super) fn for_role(role: Role, extra: &[String]) -> Self {
        let (builtin, keywords) = match role {
            Role::Name => (NAME_SYNONYMS, NAME_KEYWORDS),
            Role::Birthday => (DATE_SYNONYMS, DATE_KEYWORDS),
        };

        let phrases = builtin
            .iter()
            .copied()
            .chain(extra.iter().map(String::as_str))
            .map(Normalized::new)
            .filter(|n| !n.words.is_empty())
            .collect();

        Synonyms { phrases, keywords }
    }

    pub(super) fn score(&self, header: &str) -> LexicalMatch {
        let header = Normalized::new(header);
        if header.words.is_empty() {
            return LexicalMatch::None;
        }

        if self
            .phrases
            .iter()
            .any(|p| p.words == header.words || p.compact == header.compact)
        {
            LexicalMatch::Exact
        } else if self.phrases.iter().any(|p| header.contains_words(p)) {
            LexicalMatch::Contains
        } else if self
            .keywords
            .iter()
            .any(|k| header.words.iter().any(|w| w.starts_with(k)))
        {
            LexicalMatch::Partial
        } else {
            LexicalMatch::None
        }
    }
}
