//! Identifier resolution.
//!
//! Every cross-reference in the manifest is looked up here, so a broken
//! manifest is always reported the same way.

use crate::core::error::{Location, ParseError, Result};
use crate::manifest::graph::{ObjectGraph, Record};
use crate::manifest::plist::Value;

/// Resolves identifier fields of a record into the records they name.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'g> {
    graph: &'g ObjectGraph,
}

impl<'g> ReferenceResolver<'g> {
    pub fn new(graph: &'g ObjectGraph) -> Self {
        ReferenceResolver { graph }
    }

    pub fn graph(&self) -> &'g ObjectGraph {
        self.graph
    }

    /// The record named by `rootObject`.
    pub fn root(&self) -> Result<&'g Record> {
        let id = self.graph.root_object();
        self.graph
            .get(id.as_str())
            .ok_or_else(|| ParseError::DanglingReference {
                id: id.to_string(),
                from: "(archive)".to_string(),
                field: "rootObject".to_string(),
            })
    }

    /// Look up `id`, which was read from `from.field`.
    pub fn get(&self, id: &str, from: &Record, field: &str) -> Result<&'g Record> {
        self.graph
            .get(id)
            .ok_or_else(|| ParseError::DanglingReference {
                id: id.to_string(),
                from: from.id().to_string(),
                field: field.to_string(),
            })
    }

    /// Resolve a single reference that must be present.
    pub fn resolve(&self, from: &Record, field: &str) -> Result<&'g Record> {
        self.resolve_optional(from, field)?.ok_or_else(|| {
            ParseError::malformed(
                from.location(field),
                format!("{} has no `{}`", from.kind(), field),
            )
        })
    }

    /// Resolve a single reference that may be absent.
    pub fn resolve_optional(&self, from: &Record, field: &str) -> Result<Option<&'g Record>> {
        match from.field(field) {
            None => Ok(None),
            Some(Value::String(id)) => self.get(id, from, field).map(Some),
            Some(other) => Err(ParseError::malformed(
                from.location(field),
                format!("expected an object identifier, found {}", other.type_name()),
            )),
        }
    }

    /// Resolve a list of references. A missing field is an empty list.
    pub fn resolve_list(&self, from: &Record, field: &str) -> Result<Vec<&'g Record>> {
        let items = match from.field(field) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ParseError::malformed(
                    from.location(field),
                    format!("expected an array, found {}", other.type_name()),
                ))
            }
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(id) => self.get(id, from, field),
                other => Err(ParseError::malformed(
                    Location::KeyPath(format!("objects.{}.{}[{}]", from.id(), field, index)),
                    format!("expected an object identifier, found {}", other.type_name()),
                )),
            })
            .collect()
    }
}
