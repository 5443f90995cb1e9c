//! One serialized scene node — the unit written as a single JSON line.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Transform;

/// A kind tag plus a JSON-compatible payload. Built by the codec at export
/// time, consumed by it at import time; never persisted outside a record.
///
/// The tag stays a plain string here so records written by newer schemas
/// (unknown kinds) still parse — the codec decides what to do with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    pub kind: String,
    pub payload: serde_json::Value,
}

/// The serialized representation of one scene node.
///
/// `id` is unique within one exported stream and strictly increasing in
/// emission order. `parent`, when not the root sentinel, always references an
/// id emitted on an earlier line (breadth-first order) — the reconstructor
/// relies on this to never see a forward reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: u64,
    /// None is the root sentinel, written as `-1` on the wire.
    #[serde(with = "parent_sentinel")]
    pub parent: Option<u64>,
    /// Declared node type as the host reports it, e.g. `"TransformNode"`.
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    /// Absent in records produced by older, transform-unaware schemas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    /// Attribute name → typed value. BTreeMap keeps wire order deterministic;
    /// readers must not depend on key order.
    pub attributes: BTreeMap<String, TypedValue>,
    /// Present only for mesh-backed node types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl NodeRecord {
    pub fn new(id: u64, parent: Option<u64>, node_type: impl Into<String>) -> Self {
        Self {
            id,
            parent,
            node_type: node_type.into(),
            name: String::new(),
            transform: None,
            attributes: BTreeMap::new(),
            filename: None,
        }
    }

    /// How this record's node gets instantiated on import.
    pub fn class(&self) -> NodeClass {
        NodeClass::of(&self.node_type)
    }
}

/// Instantiation class of a node type, selected once at record-construction
/// time instead of re-dispatching on the type name at every use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Default-constructed by the host.
    Standard,
    /// Instantiated through the asset loader from an external geometry file.
    MeshBacked,
}

impl NodeClass {
    pub fn of(node_type: &str) -> Self {
        match node_type {
            "TriMeshNode" => NodeClass::MeshBacked,
            _ => NodeClass::Standard,
        }
    }
}

/// Extract the filename from a host geometry descriptor of the form
/// `TriMesh|<filename>|...`. None when either delimiter is absent.
pub(crate) fn mesh_filename(descriptor: &str) -> Option<&str> {
    let rest = &descriptor[descriptor.find('|')? + 1..];
    let end = rest.find('|')?;
    Some(&rest[..end])
}

mod parent_sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<u64>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(v.map(|p| p as i64).unwrap_or(-1))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        let raw = i64::deserialize(d)?;
        Ok(if raw < 0 { None } else { Some(raw as u64) })
    }
}
