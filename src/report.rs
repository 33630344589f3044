//! Rendering of a coherence check for humans and for machines.

use std::path::Path;

use serde::Serialize;

use crate::{
    analysis::{Report, Severity},
    domain::{Identifier, RequirementCategory},
    storage::Corpus,
};

/// The two summary lines printed before the issues.
#[must_use]
pub fn summary(corpus: &Corpus, report: &Report) -> [String; 2] {
    [
        format!(
            "Found {} tests and {} requirements",
            corpus.tests().len(),
            corpus.requirements().len()
        ),
        format!("Found {} issues", report.issues().len()),
    ]
}

/// The complete text output: summary lines followed by one line per issue.
#[must_use]
pub fn text_lines(corpus: &Corpus, report: &Report) -> Vec<String> {
    summary(corpus, report)
        .into_iter()
        .chain(report.issues().iter().map(ToString::to_string))
        .collect()
}

/// The machine-readable form of a coherence check.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    tests: usize,
    requirements: Vec<JsonRequirement<'a>>,
    issues: Vec<JsonIssue>,
    uncovered: &'a [Identifier],
}

#[derive(Debug, Serialize)]
struct JsonRequirement<'a> {
    id: &'a Identifier,
    title: &'a str,
    category: RequirementCategory,
    covered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a Path>,
}

#[derive(Debug, Serialize)]
struct JsonIssue {
    severity: Severity,
    message: String,
}

impl<'a> JsonReport<'a> {
    /// Builds the JSON view of a corpus and its analysis.
    #[must_use]
    pub fn new(corpus: &'a Corpus, report: &'a Report) -> Self {
        let requirements = corpus
            .requirements()
            .iter()
            .map(|requirement| JsonRequirement {
                id: requirement.id(),
                title: requirement.title(),
                category: requirement.category(),
                covered: report.covered().contains(requirement.id()),
                source: requirement.source(),
            })
            .collect();

        let issues = report
            .issues()
            .iter()
            .map(|issue| JsonIssue {
                severity: issue.severity(),
                message: issue.message(),
            })
            .collect();

        Self {
            tests: corpus.tests().len(),
            requirements,
            issues,
            uncovered: report.uncovered(),
        }
    }
}
