//! Locating file references on disk.
//!
//! Groups and file references form a tree rooted at the project's main group.
//! Each node's path is relative to an anchor named by its `sourceTree`, so the
//! absolute location of a file is only known after walking down to it.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::error::{ParseError, Result};
use crate::manifest::graph::{ObjectId, Record, RecordKind};
use crate::manifest::reference::ReferenceResolver;
use crate::util::fs::normalize_path;

/// The anchor a node's `path` is relative to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTree {
    /// `<group>`: the enclosing group's directory
    Group,
    /// `SOURCE_ROOT`: the directory holding the project bundle
    SourceRoot,
    /// `<absolute>`: `path` is absolute
    Absolute,
    /// Build-time locations (`BUILT_PRODUCTS_DIR`, `SDKROOT`, ...) that
    /// cannot be resolved without a build
    Other(String),
}

impl SourceTree {
    /// A missing `sourceTree` means `<group>`.
    pub fn of(record: &Record) -> Self {
        match record.string("sourceTree") {
            None | Some("<group>") => SourceTree::Group,
            Some("SOURCE_ROOT") => SourceTree::SourceRoot,
            Some("<absolute>") => SourceTree::Absolute,
            Some(other) => SourceTree::Other(other.to_string()),
        }
    }
}

/// Absolute locations of every file reference reachable from the main group.
#[derive(Debug, Clone, Default)]
pub struct GroupTree {
    locations: HashMap<ObjectId, PathBuf>,
    /// File references in depth-first order
    order: Vec<ObjectId>,
    unresolved: Vec<ObjectId>,
}

impl GroupTree {
    /// Walk the tree below `main_group`.
    pub fn build(
        resolver: &ReferenceResolver<'_>,
        main_group: &Record,
        source_root: &Path,
    ) -> Result<Self> {
        let mut walker = Walker {
            resolver,
            source_root,
            tree: GroupTree::default(),
            descent: Vec::new(),
            explored: HashMap::new(),
        };
        walker.visit(main_group, Some(source_root))?;

        tracing::debug!(
            "located {} file references ({} unresolvable)",
            walker.tree.order.len(),
            walker.tree.unresolved.len()
        );
        Ok(walker.tree)
    }

    /// Absolute path of a file reference.
    pub fn resolve_path(&self, file_reference: &ObjectId) -> Option<&Path> {
        self.locations.get(file_reference).map(PathBuf::as_path)
    }

    /// Located file references in depth-first order.
    pub fn file_references(&self) -> impl Iterator<Item = (&ObjectId, &Path)> {
        self.order
            .iter()
            .filter_map(|id| self.locations.get(id).map(|path| (id, path.as_path())))
    }

    /// File references whose anchor is only known at build time.
    pub fn unresolved(&self) -> &[ObjectId] {
        &self.unresolved
    }
}

struct Walker<'a, 'g> {
    resolver: &'a ReferenceResolver<'g>,
    source_root: &'a Path,
    tree: GroupTree,
    /// Groups on the current descent path
    descent: Vec<ObjectId>,
    /// Fully walked groups, and whether they were walked with a location
    explored: HashMap<ObjectId, bool>,
}

impl Walker<'_, '_> {
    fn visit(&mut self, node: &Record, parent_dir: Option<&Path>) -> Result<()> {
        let location = self.locate(node, parent_dir);

        if node.kind().is_group() {
            if self.descent.contains(node.id()) {
                let mut path: Vec<&str> = self.descent.iter().map(ObjectId::as_str).collect();
                path.push(node.id().as_str());
                return Err(ParseError::CyclicGroupReference {
                    id: node.id().to_string(),
                    path: path.join(" -> "),
                });
            }

            // A located walk covers everything an unlocated one would
            let located = location.is_some();
            let previous = self.explored.get(node.id()).copied();
            if matches!(previous, Some(prev) if prev || !located) {
                return Ok(());
            }

            self.descent.push(node.id().clone());
            for child in self.resolver.resolve_list(node, "children")? {
                self.visit(child, location.as_deref())?;
            }
            self.descent.pop();
            self.explored
                .insert(node.id().clone(), located || previous.unwrap_or(false));
        } else if *node.kind() == RecordKind::FileReference {
            match location {
                Some(path) => {
                    if let Entry::Vacant(slot) = self.tree.locations.entry(node.id().clone()) {
                        slot.insert(path);
                        self.tree.order.push(node.id().clone());
                    }
                }
                None => self.tree.unresolved.push(node.id().clone()),
            }
        }

        Ok(())
    }

    /// Directory (for groups) or file path (for leaves) of a node.
    fn locate(&self, node: &Record, parent_dir: Option<&Path>) -> Option<PathBuf> {
        let base = match SourceTree::of(node) {
            SourceTree::Group => parent_dir?.to_path_buf(),
            SourceTree::SourceRoot => self.source_root.to_path_buf(),
            SourceTree::Absolute => return node.string("path").map(|p| normalize_path(Path::new(p))),
            SourceTree::Other(_) => return None,
        };

        match node.string("path") {
            Some(path) => Some(normalize_path(&base.join(path))),
            None => Some(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::graph::ObjectGraph;
    use crate::test_support::PbxprojBuilder;

    fn build(graph: &ObjectGraph) -> Result<GroupTree> {
        let resolver = ReferenceResolver::new(graph);
        let project = resolver.root()?;
        let main_group = resolver.resolve(project, "mainGroup")?;
        GroupTree::build(&resolver, main_group, Path::new("/work/Example"))
    }

    fn id(s: &str) -> ObjectId {
        ObjectId::new(s)
    }

    #[test]
    fn test_file_at_top_level() {
        let graph = PbxprojBuilder::new()
            .group("MAIN", None, "<group>", &["PKG_A"])
            .file_reference("PKG_A", "ExamplePackageA", "<group>")
            .decode();

        let tree = build(&graph).unwrap();
        assert_eq!(
            tree.resolve_path(&id("PKG_A")),
            Some(Path::new("/work/Example/ExamplePackageA"))
        );
    }

    #[test]
    fn test_nested_groups_accumulate_paths() {
        let graph = PbxprojBuilder::new()
            .group("MAIN", None, "<group>", &["PACKAGES"])
            .group("PACKAGES", None, "<group>", &["NESTED"])
            .group("NESTED", Some("NestedPackages"), "<group>", &["DEEPER"])
            .group("DEEPER", Some("More"), "<group>", &["PKG_B"])
            .file_reference("PKG_B", "ExamplePackageB", "<group>")
            .decode();

        let tree = build(&graph).unwrap();
        assert_eq!(
            tree.resolve_path(&id("PKG_B")),
            Some(Path::new("/work/Example/NestedPackages/More/ExamplePackageB"))
        );
    }

    #[test]
    fn test_anchors_reset_prefix() {
        let graph = PbxprojBuilder::new()
            .group("MAIN", None, "<group>", &["SUB"])
            .group("SUB", Some("Sources/Deep"), "<group>", &["ROOTED", "ABS", "BUILT", "UP"])
            .file_reference("ROOTED", "Shared/Pkg", "SOURCE_ROOT")
            .file_reference("ABS", "/opt/packages/Tool", "<absolute>")
            .file_reference("BUILT", "Example.app", "BUILT_PRODUCTS_DIR")
            .file_reference("UP", "../../Vendor/Lib", "<group>")
            .decode();

        let tree = build(&graph).unwrap();
        assert_eq!(
            tree.resolve_path(&id("ROOTED")),
            Some(Path::new("/work/Example/Shared/Pkg"))
        );
        assert_eq!(
            tree.resolve_path(&id("ABS")),
            Some(Path::new("/opt/packages/Tool"))
        );
        assert_eq!(
            tree.resolve_path(&id("UP")),
            Some(Path::new("/work/Example/Vendor/Lib"))
        );
        assert_eq!(tree.resolve_path(&id("BUILT")), None);
        assert_eq!(tree.unresolved(), &[id("BUILT")]);
    }

    #[test]
    fn test_children_of_unresolvable_group() {
        let graph = PbxprojBuilder::new()
            .group("MAIN", None, "<group>", &["SDK"])
            .group("SDK", Some("System/Library"), "SDKROOT", &["REL", "ROOTED"])
            .file_reference("REL", "UIKit.framework", "<group>")
            .file_reference("ROOTED", "Pkg", "SOURCE_ROOT")
            .decode();

        let tree = build(&graph).unwrap();
        assert_eq!(tree.resolve_path(&id("REL")), None);
        assert_eq!(
            tree.resolve_path(&id("ROOTED")),
            Some(Path::new("/work/Example/Pkg"))
        );
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let graph = PbxprojBuilder::new()
            .group("MAIN", None, "<group>", &["LEFT", "RIGHT"])
            .group("LEFT", Some("Left"), "<group>", &["SHARED"])
            .group("RIGHT", Some("Right"), "<group>", &["SHARED"])
            .group("SHARED", Some("Shared"), "<group>", &["FILE"])
            .file_reference("FILE", "Pkg", "<group>")
            .decode();

        let tree = build(&graph).unwrap();
        // First descent wins
        assert_eq!(
            tree.resolve_path(&id("FILE")),
            Some(Path::new("/work/Example/Left/Shared/Pkg"))
        );
        assert_eq!(tree.file_references().count(), 1);
    }

    #[test]
    fn test_stacked_diamonds_are_walked_once() {
        let levels = 30;
        let mut builder = PbxprojBuilder::new().group("MAIN", None, "<group>", &["L0", "R0"]);
        for level in 0..levels {
            let (left, right, join) = (format!("L{level}"), format!("R{level}"), format!("J{level}"));
            let next = if level + 1 == levels {
                vec!["FILE".to_string()]
            } else {
                vec![format!("L{}", level + 1), format!("R{}", level + 1)]
            };
            let next: Vec<&str> = next.iter().map(String::as_str).collect();
            builder = builder
                .group(&left, Some("Left"), "<group>", &[join.as_str()])
                .group(&right, Some("Right"), "<group>", &[join.as_str()])
                .group(&join, None, "<group>", &next);
        }
        let graph = builder.file_reference("FILE", "Pkg", "<group>").decode();

        let started = std::time::Instant::now();
        let tree = build(&graph).unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(5));

        let expected: PathBuf = std::iter::once("/work/Example")
            .chain(std::iter::repeat("Left").take(levels))
            .chain(std::iter::once("Pkg"))
            .collect();
        assert_eq!(tree.resolve_path(&id("FILE")), Some(expected.as_path()));
        assert_eq!(tree.file_references().count(), 1);
    }

    #[test]
    fn test_shared_group_located_on_later_branch() {
        let graph = PbxprojBuilder::new()
            .group("MAIN", None, "<group>", &["SDK", "LOCAL"])
            .group("SDK", Some("System"), "SDKROOT", &["SHARED"])
            .group("LOCAL", Some("Local"), "<group>", &["SHARED"])
            .group("SHARED", Some("Shared"), "<group>", &["FILE"])
            .file_reference("FILE", "Pkg", "<group>")
            .decode();

        let tree = build(&graph).unwrap();
        assert_eq!(
            tree.resolve_path(&id("FILE")),
            Some(Path::new("/work/Example/Local/Shared/Pkg"))
        );
    }

    #[test]
    fn test_cycle_is_rejected() {
        let graph = PbxprojBuilder::new()
            .group("MAIN", None, "<group>", &["A"])
            .group("A", Some("A"), "<group>", &["B"])
            .group("B", Some("B"), "<group>", &["A"])
            .decode();

        match build(&graph).unwrap_err() {
            ParseError::CyclicGroupReference { id, path } => {
                assert_eq!(id, "A");
                assert_eq!(path, "MAIN -> A -> B -> A");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_reference_is_rejected() {
        let graph = PbxprojBuilder::new()
            .group("MAIN", None, "<group>", &["MAIN"])
            .decode();

        assert!(matches!(
            build(&graph),
            Err(ParseError::CyclicGroupReference { .. })
        ));
    }

    #[test]
    fn test_dangling_child() {
        let graph = PbxprojBuilder::new()
            .group("MAIN", None, "<group>", &["GHOST"])
            .decode();

        assert!(matches!(
            build(&graph),
            Err(ParseError::DanglingReference { ref id, ref from, .. }) if id == "GHOST" && from == "MAIN"
        ));
    }
}
