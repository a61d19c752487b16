//! Reading the project manifest (`project.pbxproj`).
//!
//! The manifest is an OpenStep property list holding a flat table of objects
//! that point at each other by identifier. Decoding happens in layers:
//!
//! - [`plist`] turns text into a [`Value`] tree
//! - [`graph`] turns the tree into typed [`Record`]s keyed by [`ObjectId`]
//! - [`reference`] follows identifiers between records
//! - [`group_tree`] locates file references on disk

pub mod graph;
pub mod group_tree;
pub mod plist;
pub mod reference;

pub use graph::{ObjectGraph, ObjectId, Record, RecordKind};
pub use group_tree::{GroupTree, SourceTree};
pub use plist::Value;
pub use reference::ReferenceResolver;
