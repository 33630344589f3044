use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::domain::Identifier;

/// Where a test-case declaration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    file: PathBuf,
    line: usize,
}

impl SourceLocation {
    /// Creates a location from a file path and a 1-based line number.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// The source file.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// The 1-based line of the opening marker.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// A test declaration embedded in a source comment.
///
/// The `checks` are plain strings rather than [`Identifier`]s: a reference
/// that does not name a known requirement is reported, not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    id: Identifier,
    description: String,
    checks: Vec<String>,
    tags: Vec<String>,
    location: SourceLocation,
}

impl TestCase {
    /// Creates a test case with no tags.
    #[must_use]
    pub fn new(
        id: Identifier,
        description: impl Into<String>,
        checks: Vec<String>,
        location: SourceLocation,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            checks,
            tags: Vec::new(),
            location,
        }
    }

    /// Attaches the values of the `tags` field.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// The test identifier.
    #[must_use]
    pub const fn id(&self) -> &Identifier {
        &self.id
    }

    /// The header description, expected to be a GIVEN/WHEN/THEN narrative.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The requirement identifiers this test claims to validate, in
    /// declaration order.
    #[must_use]
    pub fn checks(&self) -> &[String] {
        &self.checks
    }

    /// Free-form tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Where the declaration was found.
    #[must_use]
    pub const fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// The file the declaration came from.
    #[must_use]
    pub fn file(&self) -> &Path {
        self.location.file()
    }
}
