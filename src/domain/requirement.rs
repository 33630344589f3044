use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::domain::Identifier;

/// The recognized categories of a `list2need` requirement block.
///
/// A block is only extracted if its `:types:` option names at least one of
/// these. Both categories are treated identically by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementCategory {
    /// System requirement (`sss`).
    System,
    /// Software requirement (`srs`).
    Software,
}

impl RequirementCategory {
    /// Maps a `:types:` token to a category.
    ///
    /// Tokens are matched exactly; anything else is not a requirement type.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "sss" => Some(Self::System),
            "srs" => Some(Self::Software),
            _ => None,
        }
    }

    /// The token used for this category in documentation.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::System => "sss",
            Self::Software => "srs",
        }
    }
}

impl fmt::Display for RequirementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A documented, uniquely identified statement of required behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    id: Identifier,
    title: String,
    description: String,
    category: RequirementCategory,
    source: Option<PathBuf>,
}

impl Requirement {
    /// Creates a requirement that is not tied to a documentation file.
    #[must_use]
    pub fn new(
        id: Identifier,
        title: impl Into<String>,
        description: impl Into<String>,
        category: RequirementCategory,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            category,
            source: None,
        }
    }

    /// Records the documentation file the requirement was declared in.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The requirement identifier.
    #[must_use]
    pub const fn id(&self) -> &Identifier {
        &self.id
    }

    /// The short title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The free-text description used for lexical alignment.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The category of the block the requirement was declared in.
    #[must_use]
    pub const fn category(&self) -> RequirementCategory {
        self.category
    }

    /// The documentation file, if known.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
