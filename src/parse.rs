//! Declaration grammars.
//!
//! Both extractors are pure functions of a file's text. Malformed
//! declarations are skipped rather than reported.

mod annotation;
pub use annotation::parse_tests;

mod rst;
pub use rst::parse_requirements;
