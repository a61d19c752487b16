//! Test fixtures for common test scenarios.
//!
//! A [`ProjectFixture`] is a project directory: an `.xcodeproj` bundle plus
//! any other files (package manifests, sources) next to it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::PbxprojBuilder;
use crate::util::fs::MemoryFileSystem;

/// Fixture for a project directory.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Bundle name without the `.xcodeproj` extension.
    pub name: String,
    /// `project.pbxproj` content.
    pub manifest: String,
    /// `Package.resolved` content, if any.
    pub resolved: Option<String>,
    /// Other files (path relative to the project directory -> content).
    pub files: BTreeMap<PathBuf, String>,
}

impl ProjectFixture {
    /// Create a fixture with the given manifest.
    pub fn new(name: impl Into<String>, manifest: &PbxprojBuilder) -> Self {
        ProjectFixture {
            name: name.into(),
            manifest: manifest.build(),
            resolved: None,
            files: BTreeMap::new(),
        }
    }

    /// Add a `Package.resolved`.
    pub fn with_resolved(mut self, content: impl Into<String>) -> Self {
        self.resolved = Some(content.into());
        self
    }

    /// Add a file next to the bundle.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Add a package folder holding a minimal `Package.swift`.
    pub fn with_local_package(self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.with_file(dir.join("Package.swift"), package_swift(&name))
    }

    /// Bundle directory name.
    pub fn bundle_name(&self) -> String {
        format!("{}.xcodeproj", self.name)
    }

    /// Every file of the fixture, relative to the project directory.
    pub fn entries(&self) -> Vec<(PathBuf, &str)> {
        let bundle = PathBuf::from(self.bundle_name());
        let mut entries = vec![(bundle.join("project.pbxproj"), self.manifest.as_str())];
        if let Some(ref resolved) = self.resolved {
            entries.push((
                bundle.join("project.xcworkspace/xcshareddata/swiftpm/Package.resolved"),
                resolved.as_str(),
            ));
        }
        entries.extend(self.files.iter().map(|(p, c)| (p.clone(), c.as_str())));
        entries
    }

    /// Write the fixture to disk, returning the bundle path.
    pub fn write_to(&self, base_path: &Path) -> std::io::Result<PathBuf> {
        for (relative, content) in self.entries() {
            let path = base_path.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        Ok(base_path.join(self.bundle_name()))
    }

    /// Write the fixture to an in-memory filesystem, returning the bundle path.
    pub fn write_to_memory(&self, fs: &mut MemoryFileSystem, base_path: &Path) -> PathBuf {
        for (relative, content) in self.entries() {
            fs.add_file(base_path.join(relative), content);
        }
        base_path.join(self.bundle_name())
    }
}

/// Minimal package manifest for a library named after the package.
pub fn package_swift(name: &str) -> String {
    format!(
        r#"// swift-tools-version: 5.7
import PackageDescription

let package = Package(
    name: "{name}",
    products: [
        .library(name: "{name}", targets: ["{name}"])
    ],
    targets: [
        .target(name: "{name}")
    ]
)
"#
    )
}

/// A version 2 `Package.resolved` with one pin per `(identity, location, version)`.
pub fn resolved_v2(pins: &[(&str, &str, &str)]) -> String {
    let pins: Vec<serde_json::Value> = pins
        .iter()
        .map(|(identity, location, version)| {
            serde_json::json!({
                "identity": identity,
                "kind": "remoteSourceControl",
                "location": location,
                "state": {
                    "revision": "0123456789abcdef0123456789abcdef01234567",
                    "version": version,
                }
            })
        })
        .collect();

    let resolved = serde_json::json!({ "pins": pins, "version": 2 });
    serde_json::to_string_pretty(&resolved).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::fs::FileSystem;

    #[test]
    fn test_fixture_layout() {
        let fixture = ProjectFixture::new("App", &PbxprojBuilder::new())
            .with_resolved(resolved_v2(&[("a", "https://e.com/a", "1.0.0")]))
            .with_local_package("Packages/Core");

        let mut fs = MemoryFileSystem::new();
        let bundle = fixture.write_to_memory(&mut fs, Path::new("/work"));

        assert_eq!(bundle, PathBuf::from("/work/App.xcodeproj"));
        assert!(fs.exists(&bundle.join("project.pbxproj")));
        assert!(fs.exists(Path::new("/work/Packages/Core/Package.swift")));
        assert_eq!(fs.file_count(), 3);
    }
}
