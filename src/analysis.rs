//! Coherence analysis between test cases and requirements
//!
//! [`analyze`] checks every reference a test makes, compares the narrative of
//! each test with the requirements it checks, and finally lists the
//! requirements no test refers to.

use std::{
    collections::BTreeSet,
    fmt,
    num::NonZeroUsize,
    path::PathBuf,
};

use serde::Serialize;
use tracing::instrument;

use crate::domain::{
    DEFAULT_MIN_MATCHING_TERMS, Identifier, Narrative, Requirement, RequirementSet, TestCase,
    narrative,
};

/// How serious an [`Issue`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A broken reference.
    Error,
    /// A format, alignment or coverage gap.
    Warning,
    /// Supporting detail for the preceding issue.
    Info,
}

impl Severity {
    /// The prefix printed before issues of this severity, if any.
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::Error => Some("ERROR"),
            Self::Warning => Some("WARNING"),
            Self::Info => None,
        }
    }
}

/// A single finding of the analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// A test checks a requirement that is not declared anywhere.
    UnknownRequirement {
        /// The referring test.
        test: Identifier,
        /// The reference as written.
        requirement: String,
        /// The file declaring the test.
        file: PathBuf,
    },

    /// A test checking a requirement has no GIVEN segment.
    NotGivenWhenThen {
        /// The test.
        test: Identifier,
        /// The checked requirement.
        requirement: Identifier,
    },

    /// A test narrative shares too few terms with a requirement it checks.
    FewMatchingTerms {
        /// The test.
        test: Identifier,
        /// The checked requirement.
        requirement: Identifier,
    },

    /// The description of the requirement behind a
    /// [`Issue::FewMatchingTerms`].
    RequirementDetail {
        /// The requirement description.
        description: String,
    },

    /// The narrative of the test behind a [`Issue::FewMatchingTerms`].
    NarrativeDetail {
        /// The narrative rendered as `GIVEN .. WHEN .. THEN ..`.
        narrative: String,
    },

    /// No test checks this requirement.
    Uncovered {
        /// The requirement.
        requirement: Identifier,
        /// Its title.
        title: String,
    },
}

impl Issue {
    /// How serious the issue is.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::UnknownRequirement { .. } => Severity::Error,
            Self::NotGivenWhenThen { .. }
            | Self::FewMatchingTerms { .. }
            | Self::Uncovered { .. } => Severity::Warning,
            Self::RequirementDetail { .. } | Self::NarrativeDetail { .. } => Severity::Info,
        }
    }

    /// The issue text without its severity prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::UnknownRequirement {
                test,
                requirement,
                file,
            } => format!(
                "Test {test} references non-existent requirement {requirement} in {}",
                file.display()
            ),
            Self::NotGivenWhenThen { test, requirement } => format!(
                "Test {test} checking {requirement} does not follow GIVEN/WHEN/THEN format"
            ),
            Self::FewMatchingTerms { test, requirement } => format!(
                "Test {test} and requirement {requirement} may not be aligned - few matching terms"
            ),
            Self::RequirementDetail { description } => format!("  Requirement: {description}"),
            Self::NarrativeDetail { narrative } => format!("  Test: {narrative}"),
            Self::Uncovered { requirement, title } => {
                format!("Requirement {requirement} ({title}) is not covered by any test")
            }
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity().label() {
            Some(label) => write!(f, "{label}: {}", self.message()),
            None => f.write_str(&self.message()),
        }
    }
}

/// Settings for [`analyze`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Follow each alignment warning with the requirement description and the
    /// test narrative.
    pub verbose: bool,

    /// The minimum number of terms a narrative must share with a requirement
    /// description.
    pub min_matching_terms: NonZeroUsize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            min_matching_terms: DEFAULT_MIN_MATCHING_TERMS,
        }
    }
}

/// The outcome of [`analyze`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    issues: Vec<Issue>,
    covered: BTreeSet<Identifier>,
    uncovered: Vec<Identifier>,
}

impl Report {
    /// The issues, in the order they were found.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// The requirements checked by at least one test.
    #[must_use]
    pub const fn covered(&self) -> &BTreeSet<Identifier> {
        &self.covered
    }

    /// The requirements no test checks, in requirement order.
    #[must_use]
    pub fn uncovered(&self) -> &[Identifier] {
        &self.uncovered
    }

    /// Whether the analysis found nothing to report.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// The number of issues with the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == severity)
            .count()
    }
}

/// Checks the coherence of `tests` against `requirements`.
///
/// Issues are ordered by test, then by reference within the test, followed by
/// one [`Issue::Uncovered`] per unreferenced requirement in requirement
/// order.
#[must_use]
#[instrument(
    level = "debug",
    skip_all,
    fields(tests = tests.len(), requirements = requirements.len())
)]
pub fn analyze(
    tests: &[TestCase],
    requirements: &RequirementSet,
    options: &AnalysisOptions,
) -> Report {
    let mut report = Report::default();

    for test in tests {
        for reference in test.checks() {
            let Some(requirement) = requirements.get(reference) else {
                report.issues.push(Issue::UnknownRequirement {
                    test: test.id().clone(),
                    requirement: reference.clone(),
                    file: test.file().to_path_buf(),
                });
                continue;
            };

            report.covered.insert(requirement.id().clone());
            check_alignment(test, requirement, options, &mut report.issues);
        }
    }

    for requirement in requirements {
        if !report.covered.contains(requirement.id()) {
            report.uncovered.push(requirement.id().clone());
            report.issues.push(Issue::Uncovered {
                requirement: requirement.id().clone(),
                title: requirement.title().to_string(),
            });
        }
    }

    tracing::debug!(
        issues = report.issues.len(),
        covered = report.covered.len(),
        "analysis complete"
    );
    report
}

fn check_alignment(
    test: &TestCase,
    requirement: &Requirement,
    options: &AnalysisOptions,
    issues: &mut Vec<Issue>,
) {
    let Some(narrative) = Narrative::parse(test.description()) else {
        issues.push(Issue::NotGivenWhenThen {
            test: test.id().clone(),
            requirement: requirement.id().clone(),
        });
        return;
    };

    let requirement_terms = narrative::terms(requirement.description());
    let matching = requirement_terms.intersection(&narrative.terms()).count();
    tracing::trace!(
        test = %test.id(),
        requirement = %requirement.id(),
        matching,
        "compared narrative terms"
    );

    if matching < options.min_matching_terms.get() {
        issues.push(Issue::FewMatchingTerms {
            test: test.id().clone(),
            requirement: requirement.id().clone(),
        });
        if options.verbose {
            issues.push(Issue::RequirementDetail {
                description: requirement.description().to_string(),
            });
            issues.push(Issue::NarrativeDetail {
                narrative: narrative.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use test_case::test_case;

    use super::*;
    use crate::domain::{RequirementCategory, SourceLocation};

    const SAVE_DESCRIPTION: &str = "The system shall save the file when asked.";
    const SAVE_NARRATIVE: &str =
        "- GIVEN the file is modified - WHEN save is requested - THEN the file shall be saved";

    fn id(s: &str) -> Identifier {
        Identifier::try_from(s).unwrap()
    }

    fn requirement(req_id: &str, title: &str, description: &str) -> Requirement {
        Requirement::new(id(req_id), title, description, RequirementCategory::Software)
    }

    fn test_case(test_id: &str, description: &str, checks: &[&str]) -> TestCase {
        TestCase::new(
            id(test_id),
            description,
            checks.iter().map(ToString::to_string).collect(),
            SourceLocation::new("tests/ut-save.c", 1),
        )
    }

    fn save_requirements() -> RequirementSet {
        std::iter::once(requirement("REQ-1", "Save file", SAVE_DESCRIPTION)).collect()
    }

    fn lines(report: &Report) -> Vec<String> {
        report.issues().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn uncovered_requirement() {
        let report = analyze(&[], &save_requirements(), &AnalysisOptions::default());

        assert_eq!(
            lines(&report),
            ["WARNING: Requirement REQ-1 (Save file) is not covered by any test"]
        );
        assert_eq!(report.uncovered(), [id("REQ-1")]);
        assert!(report.covered().is_empty());
        assert!(!report.is_clean());
    }

    #[test]
    fn aligned_test_is_clean() {
        let tests = [test_case("T-1", SAVE_NARRATIVE, &["REQ-1"])];
        let report = analyze(&tests, &save_requirements(), &AnalysisOptions::default());

        assert!(report.is_clean(), "unexpected issues: {:?}", lines(&report));
        assert!(report.covered().contains("REQ-1"));
    }

    #[test]
    fn unknown_requirement() {
        let tests = [test_case("T-1", SAVE_NARRATIVE, &["REQ-99"])];
        let report = analyze(&tests, &RequirementSet::default(), &AnalysisOptions::default());

        assert_eq!(
            lines(&report),
            ["ERROR: Test T-1 references non-existent requirement REQ-99 in tests/ut-save.c"]
        );
        assert_eq!(report.count(Severity::Error), 1);
        assert!(report.covered().is_empty());
        assert!(report.uncovered().is_empty());
    }

    #[test]
    fn unknown_reference_does_not_cover() {
        let tests = [test_case("T-1", SAVE_NARRATIVE, &["REQ-99"])];
        let report = analyze(&tests, &save_requirements(), &AnalysisOptions::default());

        assert_eq!(
            lines(&report),
            [
                "ERROR: Test T-1 references non-existent requirement REQ-99 in tests/ut-save.c",
                "WARNING: Requirement REQ-1 (Save file) is not covered by any test",
            ]
        );
    }

    #[test]
    fn missing_given_skips_term_check() {
        let tests = [test_case("T-1", "Test saving", &["REQ-1"])];
        let report = analyze(&tests, &save_requirements(), &AnalysisOptions::default());

        assert_eq!(
            lines(&report),
            ["WARNING: Test T-1 checking REQ-1 does not follow GIVEN/WHEN/THEN format"]
        );
        assert!(report.covered().contains("REQ-1"));
    }

    #[test]
    fn few_matching_terms() {
        let tests = [test_case("T-1", "- GIVEN power on - THEN boot", &["REQ-1"])];
        let report = analyze(&tests, &save_requirements(), &AnalysisOptions::default());

        assert_eq!(
            lines(&report),
            ["WARNING: Test T-1 and requirement REQ-1 may not be aligned - few matching terms"]
        );
    }

    #[test]
    fn verbose_adds_detail_lines() {
        let tests = [test_case("T-1", "- GIVEN power on - THEN boot", &["REQ-1"])];
        let options = AnalysisOptions {
            verbose: true,
            ..AnalysisOptions::default()
        };
        let report = analyze(&tests, &save_requirements(), &options);

        assert_eq!(
            lines(&report),
            [
                "WARNING: Test T-1 and requirement REQ-1 may not be aligned - few matching terms",
                "  Requirement: The system shall save the file when asked.",
                "  Test: GIVEN power on WHEN  THEN boot",
            ]
        );
        assert_eq!(report.count(Severity::Info), 2);
    }

    // The save narrative shares "the", "file", "save" and "shall" with the
    // requirement description.
    #[test_case(3, true; "default threshold")]
    #[test_case(4, true; "exactly at threshold")]
    #[test_case(5, false; "above shared terms")]
    fn threshold(min_matching_terms: usize, clean: bool) {
        let tests = [test_case("T-1", SAVE_NARRATIVE, &["REQ-1"])];
        let options = AnalysisOptions {
            verbose: false,
            min_matching_terms: NonZeroUsize::new(min_matching_terms).unwrap(),
        };
        let report = analyze(&tests, &save_requirements(), &options);
        assert_eq!(report.is_clean(), clean);
    }

    #[test]
    fn issue_order_is_test_then_check_then_uncovered() {
        let requirements: RequirementSet = [
            requirement("REQ-2", "Second", "Unrelated words here."),
            requirement("REQ-1", "Save file", SAVE_DESCRIPTION),
            requirement("REQ-3", "Third", "Never referenced."),
        ]
        .into_iter()
        .collect();
        let tests = [
            test_case("T-1", "no narrative", &["REQ-X", "REQ-1"]),
            test_case("T-2", SAVE_NARRATIVE, &["REQ-1", "REQ-Y"]),
        ];
        let report = analyze(&tests, &requirements, &AnalysisOptions::default());

        assert_eq!(
            lines(&report),
            [
                "ERROR: Test T-1 references non-existent requirement REQ-X in tests/ut-save.c",
                "WARNING: Test T-1 checking REQ-1 does not follow GIVEN/WHEN/THEN format",
                "ERROR: Test T-2 references non-existent requirement REQ-Y in tests/ut-save.c",
                "WARNING: Requirement REQ-2 (Second) is not covered by any test",
                "WARNING: Requirement REQ-3 (Third) is not covered by any test",
            ]
        );
        assert_eq!(report.uncovered(), [id("REQ-2"), id("REQ-3")]);
    }

    #[test]
    fn each_uncovered_requirement_reported_once() {
        let requirements: RequirementSet = ["A", "B", "C"]
            .into_iter()
            .map(|r| requirement(r, r, ""))
            .collect();
        let tests = [
            test_case("T-1", SAVE_NARRATIVE, &["B"]),
            test_case("T-2", SAVE_NARRATIVE, &["B"]),
        ];
        let report = analyze(&tests, &requirements, &AnalysisOptions::default());

        let uncovered: Vec<_> = report
            .issues()
            .iter()
            .filter_map(|issue| match issue {
                Issue::Uncovered { requirement, .. } => Some(requirement.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(uncovered, ["A", "C"]);
    }

    #[test]
    fn duplicate_test_ids_are_independent() {
        let tests = [
            test_case("T-1", "no narrative", &["REQ-1"]),
            test_case("T-1", "no narrative", &["REQ-1"]),
        ];
        let report = analyze(&tests, &save_requirements(), &AnalysisOptions::default());
        assert_eq!(report.count(Severity::Warning), 2);
    }

    #[test]
    fn analysis_is_deterministic() {
        let tests = [
            test_case("T-1", "x", &["REQ-1", "NOPE"]),
            test_case("T-2", SAVE_NARRATIVE, &["REQ-1"]),
        ];
        let requirements = save_requirements();
        let options = AnalysisOptions::default();
        assert_eq!(
            analyze(&tests, &requirements, &options),
            analyze(&tests, &requirements, &options)
        );
    }

    #[test]
    fn severity_labels() {
        assert_eq!(Severity::Error.label(), Some("ERROR"));
        assert_eq!(Severity::Warning.label(), Some("WARNING"));
        assert_eq!(Severity::Info.label(), None);

        let issue = Issue::UnknownRequirement {
            test: id("T-1"),
            requirement: "R".to_string(),
            file: Path::new("a.c").to_path_buf(),
        };
        assert_eq!(issue.message(), "Test T-1 references non-existent requirement R in a.c");
    }
}
