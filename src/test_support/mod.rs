//! Test utilities for xcpkg unit tests.
//!
//! [`PbxprojBuilder`] writes small synthetic manifests so a test only spells
//! out the records it cares about. [`fixtures`] lays complete project bundles
//! out on a filesystem.
//!
//! # Example
//!
//! ```rust,ignore
//! use xcpkg::test_support::PbxprojBuilder;
//!
//! let graph = PbxprojBuilder::new()
//!     .group("MAIN", None, "<group>", &["PKG"])
//!     .file_reference("PKG", "LocalPackage", "<group>")
//!     .decode();
//! ```

pub mod fixtures;

use crate::manifest::ObjectGraph;

pub use fixtures::*;

/// Identifier of the project record written by [`PbxprojBuilder`].
pub const PROJECT_ID: &str = "PROJECT";

/// Builds `project.pbxproj` text.
///
/// The project record is always written. Its main group defaults to `MAIN`,
/// which the test still has to add with [`group`](Self::group).
#[derive(Debug, Clone)]
pub struct PbxprojBuilder {
    main_group: String,
    project_dir_path: Option<String>,
    targets: Vec<String>,
    package_references: Vec<String>,
    objects: Vec<(String, String)>,
}

impl Default for PbxprojBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PbxprojBuilder {
    pub fn new() -> Self {
        PbxprojBuilder {
            main_group: "MAIN".to_string(),
            project_dir_path: None,
            targets: Vec::new(),
            package_references: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn main_group(mut self, id: &str) -> Self {
        self.main_group = id.to_string();
        self
    }

    pub fn project_dir_path(mut self, path: &str) -> Self {
        self.project_dir_path = Some(path.to_string());
        self
    }

    /// Add a `PBXGroup`.
    pub fn group(mut self, id: &str, path: Option<&str>, source_tree: &str, children: &[&str]) -> Self {
        let mut body = format!("isa = PBXGroup; children = {}; ", list(children));
        if let Some(path) = path {
            body.push_str(&format!("path = {}; ", quote(path)));
        }
        body.push_str(&format!("sourceTree = {};", quote(source_tree)));
        self.objects.push((id.to_string(), body));
        self
    }

    /// Add a `PBXFileReference`.
    pub fn file_reference(mut self, id: &str, path: &str, source_tree: &str) -> Self {
        self.objects.push((
            id.to_string(),
            format!(
                "isa = PBXFileReference; lastKnownFileType = folder; path = {}; sourceTree = {};",
                quote(path),
                quote(source_tree)
            ),
        ));
        self
    }

    /// Add a `PBXNativeTarget` and list it on the project.
    pub fn target(mut self, id: &str, name: &str, product_dependencies: &[&str]) -> Self {
        self.objects.push((
            id.to_string(),
            format!(
                "isa = PBXNativeTarget; name = {}; packageProductDependencies = {}; productType = \"com.apple.product-type.application\";",
                quote(name),
                list(product_dependencies)
            ),
        ));
        self.targets.push(id.to_string());
        self
    }

    /// List already added records as the project's targets.
    pub fn targets(mut self, ids: &[&str]) -> Self {
        self.targets.extend(ids.iter().map(|id| id.to_string()));
        self
    }

    /// Add an `XCSwiftPackageProductDependency`.
    pub fn product_dependency(mut self, id: &str, product: &str, package: Option<&str>) -> Self {
        let mut body = "isa = XCSwiftPackageProductDependency; ".to_string();
        if let Some(package) = package {
            body.push_str(&format!("package = {}; ", quote(package)));
        }
        body.push_str(&format!("productName = {};", quote(product)));
        self.objects.push((id.to_string(), body));
        self
    }

    /// Add an `XCRemoteSwiftPackageReference` requiring up to the next major of 1.0.0.
    pub fn remote_package(self, id: &str, url: &str) -> Self {
        self.remote_package_with_requirement(
            id,
            url,
            "kind = upToNextMajorVersion; minimumVersion = 1.0.0;",
        )
    }

    /// Add an `XCRemoteSwiftPackageReference` with the given requirement
    /// dictionary body.
    pub fn remote_package_with_requirement(mut self, id: &str, url: &str, requirement: &str) -> Self {
        self.objects.push((
            id.to_string(),
            format!(
                "isa = XCRemoteSwiftPackageReference; repositoryURL = {}; requirement = {{ {} }};",
                quote(url),
                requirement
            ),
        ));
        self
    }

    /// Add an `XCLocalSwiftPackageReference`.
    pub fn local_package(mut self, id: &str, relative_path: &str) -> Self {
        self.objects.push((
            id.to_string(),
            format!(
                "isa = XCLocalSwiftPackageReference; relativePath = {};",
                quote(relative_path)
            ),
        ));
        self
    }

    pub fn package_references(mut self, ids: &[&str]) -> Self {
        self.package_references
            .extend(ids.iter().map(|id| id.to_string()));
        self
    }

    /// Add a record with a hand-written body.
    pub fn raw_object(mut self, id: &str, body: &str) -> Self {
        self.objects.push((id.to_string(), body.to_string()));
        self
    }

    /// Render the manifest.
    pub fn build(&self) -> String {
        let mut out = String::from("// !$*UTF8*$!\n{\n\tarchiveVersion = 1;\n\tclasses = {\n\t};\n\tobjectVersion = 56;\n\tobjects = {\n");

        let mut project = format!(
            "isa = PBXProject; mainGroup = {}; targets = {}; packageReferences = {};",
            quote(&self.main_group),
            list_owned(&self.targets),
            list_owned(&self.package_references)
        );
        if let Some(ref dir) = self.project_dir_path {
            project.push_str(&format!(" projectDirPath = {};", quote(dir)));
        }
        out.push_str(&format!("\t\t{} = {{ {} }};\n", PROJECT_ID, project));

        for (id, body) in &self.objects {
            out.push_str(&format!("\t\t{} = {{ {} }};\n", quote(id), body));
        }

        out.push_str(&format!("\t}};\n\trootObject = {};\n}}\n", PROJECT_ID));
        out
    }

    /// Render and decode the manifest.
    ///
    /// Panics if the result does not decode.
    pub fn decode(&self) -> ObjectGraph {
        let text = self.build();
        match ObjectGraph::parse(&text) {
            Ok(graph) => graph,
            Err(e) => panic!("builder produced an undecodable manifest: {e}\n{text}"),
        }
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn list(ids: &[&str]) -> String {
    let items: String = ids.iter().map(|id| format!("{}, ", quote(id))).collect();
    format!("({})", items)
}

fn list_owned(ids: &[String]) -> String {
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    list(&ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_output_decodes() {
        let graph = PbxprojBuilder::new()
            .group("MAIN", None, "<group>", &["PKG"])
            .file_reference("PKG", "Some \"Quoted\" Dir", "<group>")
            .project_dir_path("App")
            .decode();

        assert_eq!(graph.root_object().as_str(), PROJECT_ID);
        assert_eq!(graph.len(), 3);
        assert_eq!(
            graph.get("PKG").and_then(|r| r.string("path")),
            Some("Some \"Quoted\" Dir")
        );
        assert_eq!(
            graph.get(PROJECT_ID).and_then(|r| r.string("projectDirPath")),
            Some("App")
        );
    }
}
