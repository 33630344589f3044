//! GIVEN/WHEN/THEN narratives and lexical term sets.

use std::{collections::BTreeSet, fmt, sync::LazyLock};

use regex::Regex;

const GIVEN: &str = "- GIVEN ";
const WHEN: &str = "- WHEN ";
const THEN: &str = "- THEN ";

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

/// A test description split into its GIVEN, WHEN and THEN segments.
///
/// Only GIVEN is mandatory. Missing segments are empty strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Narrative<'a> {
    /// Preconditions.
    pub given: &'a str,
    /// Action, possibly empty.
    pub when: &'a str,
    /// Expected outcome, possibly empty.
    pub then: &'a str,
}

impl<'a> Narrative<'a> {
    /// Splits a description into narrative segments.
    ///
    /// The narrative starts at the first `- GIVEN ` marker and ends at the
    /// first blank line after it, or the end of the text. Returns `None` if
    /// there is no GIVEN marker.
    #[must_use]
    pub fn parse(description: &'a str) -> Option<Self> {
        let start = description.find(GIVEN)? + GIVEN.len();
        let rest = &description[start..];
        let rest = rest.find("\n\n").map_or(rest, |end| &rest[..end]);

        let given_end = [rest.find(WHEN), rest.find(THEN)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(rest.len());
        let given = &rest[..given_end];
        let mut rest = &rest[given_end..];

        let mut when = "";
        if let Some(after) = rest.strip_prefix(WHEN) {
            let when_end = after.find(THEN).unwrap_or(after.len());
            when = &after[..when_end];
            rest = &after[when_end..];
        }

        let then = rest.strip_prefix(THEN).unwrap_or("");

        Some(Self {
            given: given.trim(),
            when: when.trim(),
            then: then.trim(),
        })
    }

    /// The lowercase word terms appearing in any segment.
    #[must_use]
    pub fn terms(&self) -> BTreeSet<String> {
        terms(&format!("{} {} {}", self.given, self.when, self.then))
    }
}

impl fmt::Display for Narrative<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GIVEN {} WHEN {} THEN {}",
            self.given, self.when, self.then
        )
    }
}

/// Splits text into its set of lowercase `\w+` terms.
#[must_use]
pub fn terms(text: &str) -> BTreeSet<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}
