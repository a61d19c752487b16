//! Core data structures.
//!
//! This module contains the model handed back to callers:
//! - The project, its targets and packages
//! - Repository locations of remote packages
//! - The error taxonomy of the parsing pipeline

pub mod error;
pub mod package;
pub mod project;
pub mod repository;

pub use error::{Location, ParseError, Result};
pub use package::{LocalPackage, PinState, RemotePackage, Requirement, SwiftPackage};
pub use project::{Project, ProjectBuilder, Target, TargetKind};
pub use repository::RepositoryUrl;
