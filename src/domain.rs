//! Domain models for coherence checking.
//!
//! This module contains the core domain types: requirements, test cases,
//! identifiers, GIVEN/WHEN/THEN narratives and configuration.

mod config;
pub use config::{Config, ConfigError, DEFAULT_MIN_MATCHING_TERMS};

/// Validated requirement and test identifiers.
pub mod identifier;
pub use identifier::{Identifier, InvalidIdentifier};

pub mod narrative;
pub use narrative::Narrative;

mod requirement;
pub use requirement::{Requirement, RequirementCategory};

mod requirement_set;
pub use requirement_set::RequirementSet;

mod test_case;
pub use test_case::{SourceLocation, TestCase};
