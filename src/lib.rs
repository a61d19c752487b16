//! xcpkg - reads Xcode project bundles.
//!
//! Parses an `.xcodeproj` bundle into a [`Project`]: the project's name, its
//! build targets, and the Swift packages those targets depend on. Packages on
//! the local filesystem are told apart from packages fetched from a remote
//! repository.
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! let project = xcpkg::parse_project(Path::new("Example/Example.xcodeproj"))?;
//! for target in project.targets() {
//!     println!("{}: {:?}", target.name, target.package_product_dependencies);
//! }
//! # Ok::<(), xcpkg::ParseError>(())
//! ```

pub mod core;
pub mod manifest;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities for xcpkg unit tests.
///
/// Only compiled for tests. Provides a manifest builder and project fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    LocalPackage, ParseError, Project, RemotePackage, RepositoryUrl, Requirement, SwiftPackage,
    Target, TargetKind,
};
pub use ops::{parse_project, ProjectParser};
pub use util::fs::{FileSystem, LiveFileSystem, MemoryFileSystem};
