//! Filesystem discovery and extraction
//!
//! A [`Corpus`] is everything extracted from a source tree and a
//! documentation tree. Files are discovered recursively, sorted by path, and
//! extracted in parallel; the results are merged in path order so the
//! outcome never depends on directory listing or scheduling order.

use std::{
    borrow::Cow,
    fs, io,
    path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;
use walkdir::WalkDir;

use crate::{
    domain::{Config, Requirement, RequirementSet, TestCase},
    parse::{parse_requirements, parse_tests},
};

/// The declarations found in a source tree and a documentation tree.
#[derive(Debug, Default)]
pub struct Corpus {
    tests: Vec<TestCase>,
    requirements: RequirementSet,
    failures: Vec<ExtractionFailure>,
}

impl Corpus {
    /// Scans `src_root` for test cases and `req_root` for requirements.
    ///
    /// Nothing here is fatal. A root that is not a directory, or a file that
    /// cannot be read, is logged and contributes nothing; the failures are
    /// available afterwards from [`Corpus::failures`].
    #[must_use]
    #[instrument(level = "debug", skip(config))]
    pub fn load(src_root: &Path, req_root: &Path, config: &Config) -> Self {
        let mut corpus = Self::default();

        let source_paths = corpus.discover(src_root, |path| config.is_source_file(path));
        tracing::debug!("found {} source files", source_paths.len());
        for result in extract(&source_paths, parse_tests) {
            match result {
                Ok(tests) => corpus.tests.extend(tests),
                Err(failure) => corpus.record(failure),
            }
        }

        let doc_paths = corpus.discover(req_root, |path| config.is_doc_file(path));
        tracing::debug!("found {} documentation files", doc_paths.len());
        for result in extract(&doc_paths, parse_requirements) {
            match result {
                Ok(requirements) => corpus.insert_requirements(requirements),
                Err(failure) => corpus.record(failure),
            }
        }

        corpus
    }

    /// The test cases, in file then declaration order.
    #[must_use]
    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    /// The requirements.
    #[must_use]
    pub const fn requirements(&self) -> &RequirementSet {
        &self.requirements
    }

    /// The files that could not be extracted.
    #[must_use]
    pub fn failures(&self) -> &[ExtractionFailure] {
        &self.failures
    }

    /// Collects the files under `root` accepted by `filter`, sorted by path.
    ///
    /// A root that is not a directory is recorded as a failure and yields no
    /// paths.
    fn discover(&mut self, root: &Path, filter: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if !root.is_dir() {
            self.record(ExtractionFailure::MissingRoot {
                root: root.to_path_buf(),
            });
            return paths;
        }

        for entry in WalkDir::new(root) {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => {}
                Ok(entry) => {
                    if filter(entry.path()) {
                        paths.push(entry.into_path());
                    }
                }
                Err(source) => self.record(ExtractionFailure::Walk {
                    root: root.to_path_buf(),
                    source,
                }),
            }
        }

        paths.sort();
        paths
    }

    fn insert_requirements(&mut self, requirements: Vec<Requirement>) {
        for requirement in requirements {
            let source = requirement.source().map(Path::to_path_buf);
            if let Some(replaced) = self.requirements.insert(requirement) {
                let redeclared_in = path_label(source.as_deref());
                let replaced_in = path_label(replaced.source());
                tracing::warn!(
                    "requirement {} redeclared in {redeclared_in}; \
                     replacing the declaration in {replaced_in}",
                    replaced.id(),
                );
            }
        }
    }

    fn record(&mut self, failure: ExtractionFailure) {
        tracing::error!("{failure}");
        self.failures.push(failure);
    }
}

fn path_label(path: Option<&Path>) -> Cow<'_, str> {
    path.map_or(Cow::Borrowed("<unknown>"), |path| path.to_string_lossy())
}

/// Runs `parse` over every file, in parallel, keeping the order of `paths`.
fn extract<T, F>(paths: &[PathBuf], parse: F) -> Vec<Result<Vec<T>, ExtractionFailure>>
where
    T: Send,
    F: Fn(&str, &Path) -> Vec<T> + Sync,
{
    paths
        .par_iter()
        .map(|path| -> Result<Vec<T>, ExtractionFailure> {
            let text = read_lossy(path)?;
            let records = parse(&text, path);
            tracing::debug!(
                "extracted {} declarations from {}",
                records.len(),
                path.display()
            );
            Ok(records)
        })
        .collect()
}

/// Reads a file as text, replacing invalid UTF-8 sequences.
fn read_lossy(path: &Path) -> Result<String, ExtractionFailure> {
    let bytes = fs::read(path).map_err(|source| ExtractionFailure::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// A file or directory whose contents could not be extracted.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionFailure {
    /// The file could not be read.
    #[error("Error processing {}: {source}", path.display())]
    Read {
        /// The file.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// A root to scan does not exist or is not a directory.
    #[error("Error scanning {}: not a directory", root.display())]
    MissingRoot {
        /// The root as given.
        root: PathBuf,
    },

    /// An entry below a root could not be listed.
    #[error("Error scanning {}: {source}", root.display())]
    Walk {
        /// The root being scanned.
        root: PathBuf,
        /// The underlying traversal error.
        source: walkdir::Error,
    },
}
