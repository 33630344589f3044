//! Test/requirement coherence checking
//!
//! Requirements are declared in reStructuredText `list2need` blocks. Test
//! cases are declared in `@utdef` source comments which name the
//! requirements they check. This crate extracts both and reports broken
//! references, narratives that do not match their requirements, and
//! requirements no test covers.

pub mod analysis;
pub use analysis::{AnalysisOptions, Issue, Report, Severity, analyze};

pub mod domain;
pub use domain::{Config, Identifier, Requirement, RequirementCategory, RequirementSet, TestCase};

pub mod parse;

pub mod report;

pub mod storage;
pub use storage::{Corpus, ExtractionFailure};
