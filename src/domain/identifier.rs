use std::{
    borrow::Borrow,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    str::FromStr,
};

use non_empty_string::NonEmptyString;
use serde::Serialize;

/// A validated identifier for a requirement or a test case.
///
/// Identifiers are case-sensitive, non-empty, and contain only letters,
/// digits, hyphens and underscores.
///
/// Examples: `REQ-1`, `DLT-SRS-APP-FSM-FUN-001`, `UT-APP-FSM-0010`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Identifier(NonEmptyString);

impl Identifier {
    /// Creates a new `Identifier` from a string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` if the string is empty or contains a
    /// character outside the identifier alphabet.
    pub fn new(s: String) -> Result<Self, InvalidIdentifier> {
        if !s.chars().all(is_identifier_char) {
            return Err(InvalidIdentifier(s));
        }

        NonEmptyString::new(s).map(Self).map_err(InvalidIdentifier)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Whether `c` may appear in an [`Identifier`].
#[must_use]
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

impl TryFrom<String> for Identifier {
    type Error = InvalidIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = InvalidIdentifier;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl FromStr for Identifier {
    type Err = InvalidIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Deref for Identifier {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

// Must agree with `Borrow<str>` so maps keyed by `Identifier` can be queried
// with a `&str`.
impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Error returned when a string is not a valid [`Identifier`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "Invalid identifier '{0}': must be non-empty and contain only letters, digits, '-' or '_'"
)]
pub struct InvalidIdentifier(String);
