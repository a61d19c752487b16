//! Parsing a project bundle into a [`Project`].

use std::io;
use std::path::{Path, PathBuf};

use crate::core::error::{ParseError, Result};
use crate::core::{Project, ProjectBuilder};
use crate::manifest::{GroupTree, ObjectGraph, RecordKind, ReferenceResolver};
use crate::resolver::{PackageReconciler, ResolvedPins};
use crate::util::config::ParseConfig;
use crate::util::fs::{normalize_path, FileSystem, LiveFileSystem};

/// Name of the manifest inside a project bundle.
pub const MANIFEST_FILE: &str = "project.pbxproj";

/// Reads project bundles through a [`FileSystem`].
///
/// Holds no per-parse state, so one parser can serve many threads.
#[derive(Debug, Clone, Default)]
pub struct ProjectParser<F = LiveFileSystem> {
    fs: F,
    config: ParseConfig,
}

impl ProjectParser<LiveFileSystem> {
    /// Parser reading the real filesystem.
    pub fn live() -> Self {
        Self::new(LiveFileSystem)
    }
}

impl<F: FileSystem> ProjectParser<F> {
    pub fn new(fs: F) -> Self {
        ProjectParser {
            fs,
            config: ParseConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Parse the `.xcodeproj` bundle at `path`.
    ///
    /// A relative path is taken relative to the working directory.
    pub fn parse_project(&self, path: &Path) -> Result<Project> {
        let bundle = absolute_bundle_path(path)?;
        let name = bundle
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ParseError::InvalidPath {
                path: bundle.clone(),
            })?;

        tracing::debug!("parsing project bundle {}", bundle.display());

        let manifest_path = bundle.join(MANIFEST_FILE);
        let bytes = self.read_manifest(&manifest_path)?;
        let graph = ObjectGraph::decode(&bytes)?;
        tracing::debug!(
            "decoded {} records (object version {})",
            graph.len(),
            graph.object_version().unwrap_or("unknown")
        );

        let resolver = ReferenceResolver::new(&graph);
        let project = resolver.root()?;
        if *project.kind() != RecordKind::Project {
            return Err(ParseError::malformed(
                project.location("isa"),
                format!("root object is a {}, expected PBXProject", project.kind()),
            ));
        }

        let source_root = source_root(&bundle, project.string("projectDirPath"))?;
        let main_group = resolver.resolve(project, "mainGroup")?;
        let tree = GroupTree::build(&resolver, main_group, &source_root)?;

        let pins = self.load_pins(&bundle)?;

        let reconciled = PackageReconciler::new(resolver, &tree, &self.fs, &source_root)
            .with_pins(pins.as_ref())
            .with_package_manifest(&self.config.package_manifest)
            .reconcile(project)?;

        let mut builder = ProjectBuilder::new(name);
        for target in reconciled.targets {
            builder = builder.target(target);
        }
        for package in reconciled.packages {
            builder.add_package(package)?;
        }

        let project = builder.build();
        tracing::debug!(
            "project `{}`: {} targets, {} packages",
            project.name(),
            project.targets().len(),
            project.swift_packages().len()
        );
        Ok(project)
    }

    fn read_manifest(&self, path: &Path) -> Result<Vec<u8>> {
        if !self.fs.exists(path) {
            return Err(ParseError::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }

        self.fs.read(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ParseError::ManifestNotFound {
                path: path.to_path_buf(),
            },
            _ => ParseError::Io {
                path: path.to_path_buf(),
                source,
            },
        })
    }

    /// Read `Package.resolved` if enabled and present.
    fn load_pins(&self, bundle: &Path) -> Result<Option<ResolvedPins>> {
        if !self.config.read_resolved {
            return Ok(None);
        }

        let path = bundle.join(&self.config.resolved_path);
        if !self.fs.exists(&path) {
            tracing::debug!("no package resolution file at {}", path.display());
            return Ok(None);
        }

        let bytes = self.fs.read(&path).map_err(|source| ParseError::Io {
            path: path.clone(),
            source,
        })?;
        let pins = ResolvedPins::decode(&bytes)
            .map_err(|source| ParseError::MalformedResolved { path: path.clone(), source })?;

        tracing::debug!(
            "read {} pins from {} (format version {})",
            pins.pins().len(),
            path.display(),
            pins.version()
        );
        Ok(Some(pins))
    }
}

/// Parse the bundle at `path` from the real filesystem with default settings.
pub fn parse_project(path: &Path) -> Result<Project> {
    ProjectParser::live().parse_project(path)
}

fn absolute_bundle_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::path::absolute(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?
    };
    Ok(normalize_path(&absolute))
}

/// Directory `SOURCE_ROOT` paths are relative to.
fn source_root(bundle: &Path, project_dir_path: Option<&str>) -> Result<PathBuf> {
    let parent = bundle.parent().ok_or_else(|| ParseError::InvalidPath {
        path: bundle.to_path_buf(),
    })?;

    Ok(match project_dir_path {
        Some(dir) if !dir.is_empty() => normalize_path(&parent.join(dir)),
        _ => parent.to_path_buf(),
    })
}
