//! Filesystem access: discovering and reading the documentation and source
//! trees.

mod corpus;

pub use corpus::{Corpus, ExtractionFailure};
