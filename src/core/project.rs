//! Project - the parsed view of an Xcode project bundle.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::core::error::{ParseError, Result};
use crate::core::SwiftPackage;

/// A parsed Xcode project.
///
/// Built once per parse and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    name: String,
    targets: Vec<Target>,
    swift_packages: Vec<SwiftPackage>,
}

/// A build target and the package products it links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub name: String,
    pub kind: TargetKind,
    pub package_product_dependencies: BTreeSet<String>,
}

/// Kind of target record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// `PBXNativeTarget`
    Native,
    /// `PBXAggregateTarget`
    Aggregate,
    /// `PBXLegacyTarget` (external build tool)
    Legacy,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Native => write!(f, "native"),
            TargetKind::Aggregate => write!(f, "aggregate"),
            TargetKind::Legacy => write!(f, "legacy"),
        }
    }
}

impl Project {
    /// Name of the project bundle, e.g. `Example.xcodeproj`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Targets in manifest declaration order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Get a target by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// All packages, sorted by name. Names are unique.
    pub fn swift_packages(&self) -> &[SwiftPackage] {
        &self.swift_packages
    }

    /// Get a package by name.
    pub fn swift_package(&self, name: &str) -> Option<&SwiftPackage> {
        self.swift_packages.iter().find(|p| p.name() == name)
    }
}

impl Target {
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Target {
            name: name.into(),
            kind,
            package_product_dependencies: BTreeSet::new(),
        }
    }

    /// Check if the target links the given package product.
    pub fn depends_on(&self, product: &str) -> bool {
        self.package_product_dependencies.contains(product)
    }
}

/// Assembles a [`Project`] and enforces its invariants.
#[derive(Debug)]
pub struct ProjectBuilder {
    name: String,
    targets: Vec<Target>,
    packages: BTreeMap<String, SwiftPackage>,
}

impl ProjectBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ProjectBuilder {
            name: name.into(),
            targets: Vec::new(),
            packages: BTreeMap::new(),
        }
    }

    /// Append a target, keeping declaration order.
    pub fn target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    /// Add a package.
    ///
    /// A second declaration of the same package at the same place is merged
    /// into the first; any other reuse of a name is an error.
    pub fn add_package(&mut self, package: SwiftPackage) -> Result<()> {
        match self.packages.entry(package.name().to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(package);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if !existing.same_origin(&package) {
                    return Err(ParseError::DuplicatePackageName {
                        name: package.name().to_string(),
                        first: existing.to_string(),
                        second: package.to_string(),
                    });
                }

                if let (SwiftPackage::Remote(existing), SwiftPackage::Remote(other)) =
                    (existing, package)
                {
                    existing.absorb(other);
                }
            }
        }
        Ok(())
    }

    pub fn build(self) -> Project {
        Project {
            name: self.name,
            targets: self.targets,
            swift_packages: self.packages.into_values().collect(),
        }
    }
}
