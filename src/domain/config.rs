use std::{
    ffi::OsStr,
    io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use serde::Deserialize;

/// The default minimum number of terms a test narrative must share with the
/// description of a requirement it checks.
pub const DEFAULT_MIN_MATCHING_TERMS: NonZeroUsize = NonZeroUsize::new(3).unwrap();

/// Configuration for a coherence check.
///
/// This struct holds the settings that control which files are scanned and
/// how strictly test narratives are compared with requirements.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Versions")]
pub struct Config {
    /// The minimum size of the term intersection between a test narrative and
    /// a requirement description.
    ///
    /// Pairs sharing fewer terms are reported as possibly misaligned.
    min_matching_terms: NonZeroUsize,

    /// File extensions (without the leading '.') of source files scanned for
    /// test annotations.
    source_extensions: Vec<String>,

    /// File extensions (without the leading '.') of documentation files
    /// scanned for requirements.
    doc_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_matching_terms: DEFAULT_MIN_MATCHING_TERMS,
            source_extensions: default_source_extensions(),
            doc_extensions: default_doc_extensions(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the minimum number of matching terms.
    #[must_use]
    pub const fn min_matching_terms(&self) -> NonZeroUsize {
        self.min_matching_terms
    }

    /// Overrides the minimum number of matching terms.
    pub const fn set_min_matching_terms(&mut self, value: NonZeroUsize) {
        self.min_matching_terms = value;
    }

    /// Returns the source file extensions.
    #[must_use]
    pub fn source_extensions(&self) -> &[String] {
        &self.source_extensions
    }

    /// Returns the documentation file extensions.
    #[must_use]
    pub fn doc_extensions(&self) -> &[String] {
        &self.doc_extensions
    }

    /// Whether the path has one of the configured source extensions.
    #[must_use]
    pub fn is_source_file(&self, path: &Path) -> bool {
        has_extension(path, &self.source_extensions)
    }

    /// Whether the path has one of the configured documentation extensions.
    #[must_use]
    pub fn is_doc_file(&self, path: &Path) -> bool {
        has_extension(path, &self.doc_extensions)
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
}

fn default_min_matching_terms() -> NonZeroUsize {
    DEFAULT_MIN_MATCHING_TERMS
}

fn default_source_extensions() -> Vec<String> {
    ["c", "cc", "cpp", "cxx", "h", "hh", "hpp"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_doc_extensions() -> Vec<String> {
    vec!["rst".to_string()]
}

/// Errors that can occur when loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The file is not a valid configuration document.
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// The underlying TOML error.
        source: toml::de::Error,
    },
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_min_matching_terms")]
        min_matching_terms: NonZeroUsize,

        #[serde(default = "default_source_extensions")]
        source_extensions: Vec<String>,

        #[serde(default = "default_doc_extensions")]
        doc_extensions: Vec<String>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                min_matching_terms,
                source_extensions,
                doc_extensions,
            } => Self {
                min_matching_terms,
                source_extensions,
                doc_extensions,
            },
        }
    }
}
