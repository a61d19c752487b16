//! The manifest's object table.
//!
//! `project.pbxproj` is a flat map from opaque identifiers to records; the
//! records point at each other by identifier. The graph is kept as that
//! arena and every cross-reference is resolved on demand through
//! [`ReferenceResolver`](super::ReferenceResolver).

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::{Location, ParseError, Result};
use crate::manifest::plist::{self, Value};

/// Identifier of a record in the object table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        ObjectId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The `isa` of a record.
///
/// Only kinds that matter for targets, groups, files and packages get their
/// own variant; everything else is kept as [`RecordKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Project,
    NativeTarget,
    AggregateTarget,
    LegacyTarget,
    Group,
    VariantGroup,
    VersionGroup,
    FileReference,
    ReferenceProxy,
    RemoteSwiftPackageReference,
    LocalSwiftPackageReference,
    SwiftPackageProductDependency,
    Other(String),
}

impl RecordKind {
    pub fn from_isa(isa: &str) -> Self {
        match isa {
            "PBXProject" => RecordKind::Project,
            "PBXNativeTarget" => RecordKind::NativeTarget,
            "PBXAggregateTarget" => RecordKind::AggregateTarget,
            "PBXLegacyTarget" => RecordKind::LegacyTarget,
            "PBXGroup" => RecordKind::Group,
            "PBXVariantGroup" => RecordKind::VariantGroup,
            "XCVersionGroup" => RecordKind::VersionGroup,
            "PBXFileReference" => RecordKind::FileReference,
            "PBXReferenceProxy" => RecordKind::ReferenceProxy,
            "XCRemoteSwiftPackageReference" => RecordKind::RemoteSwiftPackageReference,
            "XCLocalSwiftPackageReference" => RecordKind::LocalSwiftPackageReference,
            "XCSwiftPackageProductDependency" => RecordKind::SwiftPackageProductDependency,
            other => RecordKind::Other(other.to_string()),
        }
    }

    pub fn isa(&self) -> &str {
        match self {
            RecordKind::Project => "PBXProject",
            RecordKind::NativeTarget => "PBXNativeTarget",
            RecordKind::AggregateTarget => "PBXAggregateTarget",
            RecordKind::LegacyTarget => "PBXLegacyTarget",
            RecordKind::Group => "PBXGroup",
            RecordKind::VariantGroup => "PBXVariantGroup",
            RecordKind::VersionGroup => "XCVersionGroup",
            RecordKind::FileReference => "PBXFileReference",
            RecordKind::ReferenceProxy => "PBXReferenceProxy",
            RecordKind::RemoteSwiftPackageReference => "XCRemoteSwiftPackageReference",
            RecordKind::LocalSwiftPackageReference => "XCLocalSwiftPackageReference",
            RecordKind::SwiftPackageProductDependency => "XCSwiftPackageProductDependency",
            RecordKind::Other(isa) => isa,
        }
    }

    /// Records with `children`.
    pub fn is_group(&self) -> bool {
        matches!(
            self,
            RecordKind::Group | RecordKind::VariantGroup | RecordKind::VersionGroup
        )
    }

    pub fn is_package_reference(&self) -> bool {
        matches!(
            self,
            RecordKind::RemoteSwiftPackageReference | RecordKind::LocalSwiftPackageReference
        )
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.isa())
    }
}

/// One entry of the object table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: ObjectId,
    kind: RecordKind,
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(id: ObjectId, kind: RecordKind, fields: BTreeMap<String, Value>) -> Self {
        Record { id, kind, fields }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn kind(&self) -> &RecordKind {
        &self.kind
    }

    /// Raw field value. `isa` is included.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String field, `None` when missing or not a string.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// String field that must be present.
    pub fn required_string(&self, name: &str) -> Result<&str> {
        match self.field(name) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(ParseError::malformed(
                self.location(name),
                format!("expected a string, found {}", other.type_name()),
            )),
            None => Err(ParseError::malformed(
                self.location(name),
                format!("{} has no `{}`", self.kind, name),
            )),
        }
    }

    /// Key path of one of this record's fields.
    pub fn location(&self, field: &str) -> Location {
        Location::field(self.id.as_str(), field)
    }
}

/// The decoded object table of a manifest.
#[derive(Debug, Clone)]
pub struct ObjectGraph {
    archive_version: Option<String>,
    object_version: Option<String>,
    root_object: ObjectId,
    objects: BTreeMap<ObjectId, Record>,
}

impl ObjectGraph {
    /// Decode the raw bytes of a `project.pbxproj`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            ParseError::malformed(Location::Offset(e.valid_up_to()), "manifest is not valid UTF-8")
        })?;
        Self::parse(text)
    }

    /// Decode manifest text.
    pub fn parse(text: &str) -> Result<Self> {
        let value = plist::parse(text)
            .map_err(|e| ParseError::malformed(Location::Offset(e.offset), e.message))?;

        let Value::Dictionary(mut top) = value else {
            return Err(ParseError::malformed(
                Location::Offset(0),
                format!("top-level value is {}, expected a dictionary", value.type_name()),
            ));
        };

        let root_object = match top.remove("rootObject") {
            Some(Value::String(id)) => ObjectId::new(id),
            Some(_) => {
                return Err(ParseError::malformed(
                    key_path("rootObject"),
                    "expected an object identifier",
                ))
            }
            None => return Err(ParseError::malformed(key_path("rootObject"), "missing")),
        };

        let raw_objects = match top.remove("objects") {
            Some(Value::Dictionary(objects)) => objects,
            Some(other) => {
                return Err(ParseError::malformed(
                    key_path("objects"),
                    format!("expected a dictionary, found {}", other.type_name()),
                ))
            }
            None => return Err(ParseError::malformed(key_path("objects"), "missing")),
        };

        let mut objects = BTreeMap::new();
        for (id, value) in raw_objects {
            let Value::Dictionary(fields) = value else {
                return Err(ParseError::malformed(
                    key_path(&format!("objects.{}", id)),
                    format!("expected a dictionary, found {}", value.type_name()),
                ));
            };

            let kind = match fields.get("isa") {
                Some(Value::String(isa)) => RecordKind::from_isa(isa),
                _ => {
                    return Err(ParseError::malformed(
                        Location::field(&id, "isa"),
                        "missing or not a string",
                    ))
                }
            };

            let id = ObjectId::new(id);
            objects.insert(id.clone(), Record::new(id, kind, fields));
        }

        Ok(ObjectGraph {
            archive_version: string_entry(&top, "archiveVersion"),
            object_version: string_entry(&top, "objectVersion"),
            root_object,
            objects,
        })
    }

    pub fn root_object(&self) -> &ObjectId {
        &self.root_object
    }

    pub fn archive_version(&self) -> Option<&str> {
        self.archive_version.as_deref()
    }

    pub fn object_version(&self) -> Option<&str> {
        self.object_version.as_deref()
    }

    /// Look up a record by identifier.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.objects.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All records, ordered by identifier.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.objects.values()
    }

    /// Records of one kind, ordered by identifier.
    pub fn records_of<'g>(&'g self, kind: &'g RecordKind) -> impl Iterator<Item = &'g Record> + 'g {
        self.objects.values().filter(move |r| r.kind() == kind)
    }
}

fn key_path(path: &str) -> Location {
    Location::KeyPath(path.to_string())
}

fn string_entry(map: &BTreeMap<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}
