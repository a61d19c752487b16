//! Swift packages a project depends on.
//!
//! A package is either found on disk next to the project or fetched from a
//! source-control repository. The two shapes only share a name.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::RepositoryUrl;

/// A Swift package dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SwiftPackage {
    /// Package resolved from the local filesystem
    Local(LocalPackage),
    /// Package resolved from a remote repository
    Remote(RemotePackage),
}

/// A package living inside (or next to) the project's directory tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalPackage {
    /// Package name (the directory holding the package manifest)
    pub name: String,
    /// Absolute `file://` URL of the package manifest
    pub file_url: Url,
}

/// A package fetched from a source-control repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemotePackage {
    /// Package name
    pub name: String,
    /// Repository location as declared in the project
    pub repository_url: RepositoryUrl,
    /// Products consumed by any target of the project
    pub products: BTreeSet<String>,
    /// Declared version rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<Requirement>,
    /// Resolved state recorded in `Package.resolved`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<PinState>,
}

/// The version rule declared for a remote package.
///
/// Recorded as written; nothing here is ever solved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Requirement {
    UpToNextMajorVersion { minimum_version: Version },
    UpToNextMinorVersion { minimum_version: Version },
    VersionRange {
        minimum_version: Version,
        maximum_version: Version,
    },
    ExactVersion { version: Version },
    Branch { branch: String },
    Revision { revision: String },
}

/// Resolved state of a remote package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

impl SwiftPackage {
    /// Get the package name.
    pub fn name(&self) -> &str {
        match self {
            SwiftPackage::Local(local) => &local.name,
            SwiftPackage::Remote(remote) => &remote.name,
        }
    }

    /// Check if this package comes from the local filesystem.
    pub fn is_local(&self) -> bool {
        matches!(self, SwiftPackage::Local(_))
    }

    pub fn as_local(&self) -> Option<&LocalPackage> {
        match self {
            SwiftPackage::Local(local) => Some(local),
            SwiftPackage::Remote(_) => None,
        }
    }

    pub fn as_remote(&self) -> Option<&RemotePackage> {
        match self {
            SwiftPackage::Remote(remote) => Some(remote),
            SwiftPackage::Local(_) => None,
        }
    }

    /// Whether two declarations describe the same package at the same place.
    pub fn same_origin(&self, other: &SwiftPackage) -> bool {
        match (self, other) {
            (SwiftPackage::Local(a), SwiftPackage::Local(b)) => a.file_url == b.file_url,
            (SwiftPackage::Remote(a), SwiftPackage::Remote(b)) => {
                a.repository_url.same_repository(&b.repository_url)
            }
            _ => false,
        }
    }
}

impl fmt::Display for SwiftPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwiftPackage::Local(local) => write!(f, "local package at {}", local.file_url),
            SwiftPackage::Remote(remote) => {
                write!(f, "remote package at {}", remote.repository_url)
            }
        }
    }
}

impl LocalPackage {
    /// Create a local package from the absolute path of its manifest.
    ///
    /// Returns `None` when the path is relative.
    pub fn from_manifest_path(name: impl Into<String>, manifest_path: &Path) -> Option<Self> {
        let file_url = Url::from_file_path(manifest_path).ok()?;
        Some(LocalPackage {
            name: name.into(),
            file_url,
        })
    }

    /// Path of the package manifest on disk.
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.file_url.to_file_path().ok()
    }

    /// Directory holding the package.
    pub fn root(&self) -> Option<PathBuf> {
        self.manifest_path()
            .and_then(|path| path.parent().map(Path::to_path_buf))
    }
}

impl RemotePackage {
    /// Create a remote package with no products yet.
    pub fn new(name: impl Into<String>, repository_url: RepositoryUrl) -> Self {
        RemotePackage {
            name: name.into(),
            repository_url,
            products: BTreeSet::new(),
            requirement: None,
            pin: None,
        }
    }

    /// Set the declared requirement.
    pub fn with_requirement(mut self, requirement: Option<Requirement>) -> Self {
        self.requirement = requirement;
        self
    }

    /// Set the resolved pin.
    pub fn with_pin(mut self, pin: Option<PinState>) -> Self {
        self.pin = pin;
        self
    }

    /// Fold another declaration of the same repository into this one.
    pub fn absorb(&mut self, other: RemotePackage) {
        self.products.extend(other.products);
        if self.requirement.is_none() {
            self.requirement = other.requirement;
        }
        if self.pin.is_none() {
            self.pin = other.pin;
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::UpToNextMajorVersion { minimum_version } => {
                write!(f, "from {} (next major)", minimum_version)
            }
            Requirement::UpToNextMinorVersion { minimum_version } => {
                write!(f, "from {} (next minor)", minimum_version)
            }
            Requirement::VersionRange {
                minimum_version,
                maximum_version,
            } => write!(f, "{}..<{}", minimum_version, maximum_version),
            Requirement::ExactVersion { version } => write!(f, "exactly {}", version),
            Requirement::Branch { branch } => write!(f, "branch {}", branch),
            Requirement::Revision { revision } => write!(f, "revision {}", revision),
        }
    }
}

impl fmt::Display for PinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.version, &self.branch, &self.revision) {
            (Some(version), _, _) => write!(f, "{}", version),
            (None, Some(branch), Some(revision)) => {
                write!(f, "{}@{}", branch, short_revision(revision))
            }
            (None, Some(branch), None) => write!(f, "{}", branch),
            (None, None, Some(revision)) => write!(f, "{}", short_revision(revision)),
            (None, None, None) => write!(f, "unpinned"),
        }
    }
}

fn short_revision(revision: &str) -> &str {
    revision.get(..7).unwrap_or(revision)
}
