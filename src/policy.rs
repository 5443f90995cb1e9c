//! Filter policy — which attributes and node types never reach the wire.
//!
//! Policies are plain values injected into export and import. There is no
//! process-wide blacklist, so callers can run different policies side by side.

use hashbrown::HashSet;

/// Attributes that are derived, structural, or unsupported and therefore
/// never serialized as generic attributes:
/// - `Transform` and `Children` are handled structurally by the record schema;
/// - `Geometry` is replaced by the parsed asset filename;
/// - `WorldTransform`, `BoundingBox`, `Path` and `Parent` are derived;
/// - full `Material` round-trip is out of scope.
pub const DEFAULT_ATTRIBUTE_BLACKLIST: &[&str] = &[
    "BoundingBox",
    "Children",
    "Geometry",
    "Material",
    "Parent",
    "Path",
    "Transform",
    "WorldTransform",
];

/// Node types excluded from serialization together with their entire subtree.
pub const DEFAULT_NODE_TYPE_BLACKLIST: &[&str] = &["CameraNode", "ScreenNode"];

/// Immutable exclusion rules for one export or import pass.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    attributes: HashSet<String>,
    node_types: HashSet<String>,
}

impl FilterPolicy {
    /// The stock policy from the defaults above.
    pub fn new() -> Self {
        Self {
            attributes: DEFAULT_ATTRIBUTE_BLACKLIST.iter().map(|s| s.to_string()).collect(),
            node_types: DEFAULT_NODE_TYPE_BLACKLIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A policy that excludes nothing. Useful as a base for custom rules.
    pub fn permissive() -> Self {
        Self { attributes: HashSet::new(), node_types: HashSet::new() }
    }

    pub fn block_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.insert(name.into());
        self
    }

    pub fn allow_attribute(mut self, name: &str) -> Self {
        self.attributes.remove(name);
        self
    }

    pub fn block_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_types.insert(node_type.into());
        self
    }

    pub fn allow_node_type(mut self, node_type: &str) -> Self {
        self.node_types.remove(node_type);
        self
    }

    pub fn attribute_blocked(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    pub fn node_type_blocked(&self, node_type: &str) -> bool {
        self.node_types.contains(node_type)
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_policy() {
        let policy = FilterPolicy::new();
        assert!(policy.attribute_blocked("WorldTransform"));
        assert!(policy.attribute_blocked("Transform"));
        assert!(policy.node_type_blocked("CameraNode"));
        assert!(!policy.attribute_blocked("Name"));
        assert!(!policy.node_type_blocked("TriMeshNode"));
    }

    #[test]
    fn test_overrides() {
        let policy = FilterPolicy::new()
            .allow_node_type("CameraNode")
            .block_node_type("DebugNode")
            .block_attribute("Tags");
        assert!(!policy.node_type_blocked("CameraNode"));
        assert!(policy.node_type_blocked("DebugNode"));
        assert!(policy.attribute_blocked("Tags"));
    }

    #[test]
    fn test_permissive() {
        let policy = FilterPolicy::permissive();
        assert!(!policy.node_type_blocked("CameraNode"));
        assert!(!policy.attribute_blocked("Geometry"));
    }
}
