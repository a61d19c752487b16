//! Package reconciliation.
//!
//! Collects the packages a project declares and the products each target
//! consumes, then merges them with the resolved pins.
//!
//! Local packages show up in two ways. Xcode 15 writes an
//! `XCLocalSwiftPackageReference` with a `relativePath`. Older projects add the
//! package folder to the group tree as a plain file reference, and its product
//! dependencies carry no `package` at all; those folders are recognized by the
//! package manifest inside them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use semver::Version;

use crate::core::error::{ParseError, Result};
use crate::core::{
    LocalPackage, RemotePackage, RepositoryUrl, Requirement, SwiftPackage, Target, TargetKind,
};
use crate::manifest::graph::{ObjectId, Record, RecordKind};
use crate::manifest::plist::Value;
use crate::manifest::{GroupTree, ReferenceResolver};
use crate::resolver::pins::ResolvedPins;
use crate::util::fs::{normalize_path, FileSystem};

/// Prefix Xcode puts on product names of build-tool plugins.
const PLUGIN_PREFIX: &str = "plugin:";

/// Targets and packages of a project, before model assembly.
#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    /// Targets in declaration order
    pub targets: Vec<Target>,
    /// Every package found; duplicates are left to the model builder
    pub packages: Vec<SwiftPackage>,
}

/// Correlates package declarations, target product dependencies and pins.
pub struct PackageReconciler<'a, F: ?Sized> {
    resolver: ReferenceResolver<'a>,
    tree: &'a GroupTree,
    fs: &'a F,
    pins: Option<&'a ResolvedPins>,
    source_root: &'a Path,
    package_manifest: &'a str,
}

/// Packages keyed by the record that declared them, in discovery order.
#[derive(Default)]
struct Declared {
    order: Vec<ObjectId>,
    packages: HashMap<ObjectId, SwiftPackage>,
}

impl Declared {
    fn contains(&self, id: &ObjectId) -> bool {
        self.packages.contains_key(id)
    }

    fn insert(&mut self, id: ObjectId, package: SwiftPackage) {
        self.order.push(id.clone());
        self.packages.insert(id, package);
    }

    fn into_packages(mut self) -> Vec<SwiftPackage> {
        self.order
            .iter()
            .filter_map(|id| self.packages.remove(id))
            .collect()
    }
}

impl<'a, F: FileSystem + ?Sized> PackageReconciler<'a, F> {
    pub fn new(
        resolver: ReferenceResolver<'a>,
        tree: &'a GroupTree,
        fs: &'a F,
        source_root: &'a Path,
    ) -> Self {
        PackageReconciler {
            resolver,
            tree,
            fs,
            pins: None,
            source_root,
            package_manifest: "Package.swift",
        }
    }

    /// Use resolved pins for remote packages.
    pub fn with_pins(mut self, pins: Option<&'a ResolvedPins>) -> Self {
        self.pins = pins;
        self
    }

    /// File name marking a folder as a package.
    pub fn with_package_manifest(mut self, file_name: &'a str) -> Self {
        self.package_manifest = file_name;
        self
    }

    /// Reconcile everything reachable from the project record.
    pub fn reconcile(&self, project: &Record) -> Result<Reconciled> {
        let mut declared = Declared::default();

        self.collect_folder_packages(&mut declared)?;

        for reference in self.resolver.resolve_list(project, "packageReferences")? {
            if !declared.contains(reference.id()) {
                let package = self.package_from_reference(reference)?;
                declared.insert(reference.id().clone(), package);
            }
        }

        let targets = self
            .resolver
            .resolve_list(project, "targets")?
            .into_iter()
            .map(|record| self.target(record, &mut declared))
            .collect::<Result<Vec<_>>>()?;

        Ok(Reconciled {
            targets,
            packages: declared.into_packages(),
        })
    }

    /// Folder references in the group tree that contain a package manifest.
    fn collect_folder_packages(&self, declared: &mut Declared) -> Result<()> {
        for (id, path) in self.tree.file_references() {
            let manifest = path.join(self.package_manifest);
            if !self.fs.exists(&manifest) {
                continue;
            }

            let package = self.local_package(path)?;
            tracing::debug!("found local package `{}` at {}", package.name, path.display());
            declared.insert(id.clone(), SwiftPackage::Local(package));
        }

        for id in self.tree.unresolved() {
            let Some(record) = self.resolver.graph().get(id.as_str()) else {
                continue;
            };
            if matches!(record.string("lastKnownFileType"), Some("folder" | "wrapper")) {
                tracing::warn!(
                    "folder `{}` is relative to a build-time location and cannot be checked for a package",
                    record.string("path").unwrap_or(id.as_str())
                );
            }
        }
        Ok(())
    }

    fn target(&self, record: &Record, declared: &mut Declared) -> Result<Target> {
        let kind = match record.kind() {
            RecordKind::NativeTarget => TargetKind::Native,
            RecordKind::AggregateTarget => TargetKind::Aggregate,
            RecordKind::LegacyTarget => TargetKind::Legacy,
            other => {
                return Err(ParseError::malformed(
                    record.location("isa"),
                    format!("listed as a target but is a {}", other),
                ))
            }
        };

        let mut target = Target::new(record.required_string("name")?, kind);

        for dependency in self.resolver.resolve_list(record, "packageProductDependencies")? {
            if *dependency.kind() != RecordKind::SwiftPackageProductDependency {
                return Err(ParseError::malformed(
                    dependency.location("isa"),
                    format!("expected a package product dependency, found {}", dependency.kind()),
                ));
            }

            let product = product_name(dependency.required_string("productName")?);
            target
                .package_product_dependencies
                .insert(product.to_string());

            let Some(package_id) = package_id(dependency)? else {
                // Product of a folder-referenced local package
                continue;
            };

            let reference = self.resolver.graph().get(package_id).ok_or_else(|| {
                ParseError::UnresolvedPackageReference {
                    product: product.to_string(),
                    package: package_id.to_string(),
                }
            })?;

            if !reference.kind().is_package_reference() {
                return Err(ParseError::malformed(
                    dependency.location("package"),
                    format!(
                        "product `{}` points at a {}, expected a package reference",
                        product,
                        reference.kind()
                    ),
                ));
            }

            if !declared.contains(reference.id()) {
                tracing::debug!(
                    "package `{}` is used by `{}` but not listed by the project",
                    reference.id(),
                    target.name
                );
                let package = self.package_from_reference(reference)?;
                declared.insert(reference.id().clone(), package);
            }

            if let Some(SwiftPackage::Remote(remote)) = declared.packages.get_mut(reference.id()) {
                remote.products.insert(product.to_string());
            }
        }

        Ok(target)
    }

    fn package_from_reference(&self, reference: &Record) -> Result<SwiftPackage> {
        match reference.kind() {
            RecordKind::RemoteSwiftPackageReference => {
                self.remote_package(reference).map(SwiftPackage::Remote)
            }
            RecordKind::LocalSwiftPackageReference => {
                let relative = reference.required_string("relativePath")?;
                let root = normalize_path(&self.source_root.join(relative));
                if !self.fs.exists(&root.join(self.package_manifest)) {
                    tracing::warn!(
                        "local package `{}` has no {} at {}",
                        relative,
                        self.package_manifest,
                        root.display()
                    );
                }
                self.local_package(&root).map(SwiftPackage::Local)
            }
            other => Err(ParseError::malformed(
                reference.location("isa"),
                format!("expected a package reference, found {}", other),
            )),
        }
    }

    fn remote_package(&self, reference: &Record) -> Result<RemotePackage> {
        let url = RepositoryUrl::new(reference.required_string("repositoryURL")?);
        let pin = self.pins.and_then(|pins| pins.find(&url));

        let name = match pin.and_then(|pin| pin.name.as_deref()) {
            Some(name) => name.to_string(),
            None => url
                .package_name()
                .ok_or_else(|| {
                    ParseError::malformed(
                        reference.location("repositoryURL"),
                        format!("cannot derive a package name from `{}`", url),
                    )
                })?
                .to_string(),
        };

        match pin {
            Some(pin) => tracing::debug!("package `{}` pinned at {}", name, pin.state),
            None if self.pins.is_some() => {
                tracing::debug!("package `{}` has no pin in the resolution file", name)
            }
            None => {}
        }

        Ok(RemotePackage::new(name, url)
            .with_requirement(requirement(reference)?)
            .with_pin(pin.map(|pin| pin.state.clone())))
    }

    fn local_package(&self, root: &Path) -> Result<LocalPackage> {
        let manifest: PathBuf = root.join(self.package_manifest);
        let name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ParseError::InvalidPath {
                path: root.to_path_buf(),
            })?;

        LocalPackage::from_manifest_path(name, &manifest)
            .ok_or(ParseError::InvalidPath { path: manifest })
    }
}

fn product_name(raw: &str) -> &str {
    raw.strip_prefix(PLUGIN_PREFIX).unwrap_or(raw)
}

/// The `package` field of a product dependency, if any.
fn package_id(dependency: &Record) -> Result<Option<&str>> {
    match dependency.field("package") {
        None => Ok(None),
        Some(Value::String(id)) => Ok(Some(id)),
        Some(other) => Err(ParseError::malformed(
            dependency.location("package"),
            format!("expected an object identifier, found {}", other.type_name()),
        )),
    }
}

/// Decode the `requirement` dictionary of a remote package reference.
///
/// Unknown requirement kinds are skipped rather than rejected.
fn requirement(reference: &Record) -> Result<Option<Requirement>> {
    let Some(value) = reference.field("requirement") else {
        return Ok(None);
    };
    let Some(fields) = value.as_dictionary() else {
        return Err(ParseError::malformed(
            reference.location("requirement"),
            format!("expected a dictionary, found {}", value.type_name()),
        ));
    };

    let string = |key: &str| -> Result<String> {
        fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ParseError::malformed(
                    reference.location(&format!("requirement.{}", key)),
                    "missing or not a string",
                )
            })
    };
    let version = |key: &str| -> Result<Version> {
        let raw = string(key)?;
        Version::parse(&raw).map_err(|e| {
            ParseError::malformed(
                reference.location(&format!("requirement.{}", key)),
                format!("invalid version `{}`: {}", raw, e),
            )
        })
    };

    let kind = string("kind")?;
    let requirement = match kind.as_str() {
        "upToNextMajorVersion" => Requirement::UpToNextMajorVersion {
            minimum_version: version("minimumVersion")?,
        },
        "upToNextMinorVersion" => Requirement::UpToNextMinorVersion {
            minimum_version: version("minimumVersion")?,
        },
        "versionRange" => Requirement::VersionRange {
            minimum_version: version("minimumVersion")?,
            maximum_version: version("maximumVersion")?,
        },
        "exactVersion" => Requirement::ExactVersion {
            version: version("version")?,
        },
        "branch" => Requirement::Branch {
            branch: string("branch")?,
        },
        "revision" => Requirement::Revision {
            revision: string("revision")?,
        },
        other => {
            tracing::warn!(
                "package reference `{}` has unknown requirement kind `{}`",
                reference.id(),
                other
            );
            return Ok(None);
        }
    };

    Ok(Some(requirement))
}
