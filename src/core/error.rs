//! Error taxonomy for project parsing.
//!
//! Every failure of [`ProjectParser::parse_project`](crate::ops::ProjectParser::parse_project)
//! is one of these variants; there is no partial result.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Result alias used throughout the parsing pipeline.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Where inside the manifest a syntax or shape violation was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Byte offset into the manifest text.
    Offset(usize),
    /// Dotted key path, e.g. `objects.ABC.isa`.
    KeyPath(String),
}

impl Location {
    /// Key path for a field of an object record.
    pub fn field(id: &str, field: &str) -> Self {
        Location::KeyPath(format!("objects.{}.{}", id, field))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Offset(offset) => write!(f, "byte {}", offset),
            Location::KeyPath(path) => write!(f, "`{}`", path),
        }
    }
}

/// Error raised while reading a project bundle.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed project manifest at {location}: {message}")]
    MalformedManifest { location: Location, message: String },

    #[error("object `{from}` references missing object `{id}` through `{field}`")]
    DanglingReference {
        id: String,
        from: String,
        field: String,
    },

    #[error("product `{product}` references missing package `{package}`")]
    UnresolvedPackageReference { product: String, package: String },

    #[error("group `{id}` contains itself ({path})")]
    CyclicGroupReference { id: String, path: String },

    #[error("package `{name}` is declared more than once")]
    DuplicatePackageName {
        name: String,
        first: String,
        second: String,
    },

    #[error("no project manifest found at {}", path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("malformed package resolution file {}", path.display())]
    MalformedResolved {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("path cannot be expressed as a file URL: {}", path.display())]
    InvalidPath { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ParseError {
    /// Shorthand for a [`ParseError::MalformedManifest`].
    pub fn malformed(location: Location, message: impl Into<String>) -> Self {
        ParseError::MalformedManifest {
            location,
            message: message.into(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ParseError::MalformedManifest { location, message } => {
                Diagnostic::error(format!("malformed project manifest: {}", message))
                    .with_context(format!("at {}", location))
                    .with_suggestion("Open the project in Xcode and save it to rewrite the manifest")
            }

            ParseError::DanglingReference { id, from, field } => {
                Diagnostic::error(format!("object `{}` not found", id))
                    .with_context(format!("referenced from `{}` through `{}`", from, field))
                    .with_suggestion("The manifest may have been damaged by a bad merge")
            }

            ParseError::UnresolvedPackageReference { product, package } => Diagnostic::error(
                format!("product `{}` points at a missing package reference", product),
            )
            .with_context(format!("package reference `{}` is not in the manifest", package))
            .with_suggestion("Remove and re-add the package in Xcode"),

            ParseError::CyclicGroupReference { id, path } => {
                Diagnostic::error(format!("group `{}` contains itself", id))
                    .with_context(format!("cycle: {}", path))
            }

            ParseError::DuplicatePackageName {
                name,
                first,
                second,
            } => Diagnostic::error(format!("package `{}` is declared more than once", name))
                .with_context(format!("first declared as {}", first))
                .with_context(format!("then declared as {}", second))
                .with_suggestion("Remove one of the conflicting package references"),

            ParseError::ManifestNotFound { path } => {
                Diagnostic::error("no project manifest found")
                    .with_location(path)
                    .with_suggestion("Pass the path of an `.xcodeproj` bundle")
            }

            ParseError::MalformedResolved { path, source } => {
                Diagnostic::error("malformed package resolution file")
                    .with_location(path)
                    .with_context(source.to_string())
                    .with_suggestion("Resolve package versions in Xcode to regenerate the file")
            }

            ParseError::InvalidPath { path } => {
                Diagnostic::error("path cannot be expressed as a file URL").with_location(path)
            }

            ParseError::Io { path, source } => Diagnostic::error(format!("failed to read file: {}", source))
                .with_location(path),
        }
    }
}
