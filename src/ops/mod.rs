//! High-level operations.

pub mod parse_project;

pub use parse_project::{parse_project, ProjectParser, MANIFEST_FILE};
