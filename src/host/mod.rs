//! # Host Engine Seam
//!
//! The contract between this crate and the scene-graph engine that owns node
//! lifetime, transform math and asset loading. Export only ever reads through
//! it; import only appends.
//!
//! ## Implementations
//!
//! | Host | Module | Description |
//! |------|--------|-------------|
//! | `MemoryScene` | `memory` | In-memory scene graph for testing/embedding |
//!
//! A real engine binding implements `SceneHost` over its own node handles and
//! `AssetLoader` over its mesh pipeline.

pub mod memory;

use crate::Result;
use crate::model::{AttrValue, Transform};

pub use memory::{MemoryScene, MeshLibrary};

// ============================================================================
// Node handles
// ============================================================================

/// Opaque host node handle. Only meaningful to the host that issued it;
/// distinct from the integer identities assigned during export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Loader flags
// ============================================================================

/// Opaque asset-loader configuration, forwarded unchanged to
/// `AssetLoader::create_from_file`. The bit meanings belong to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoaderFlags(pub u32);

impl LoaderFlags {
    pub const DEFAULTS: Self = Self(0);
    pub const LOAD_MATERIALS: Self = Self(1);
    pub const OPTIMIZE_GEOMETRY: Self = Self(1 << 1);
    pub const NORMALIZE_SCALE: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for LoaderFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ============================================================================
// SceneHost Trait
// ============================================================================

/// The scene-graph contract.
///
/// All methods take `&self`; hosts with mutable internals use interior
/// mutability. Concurrent mutation of the same graph by another thread while
/// an export or import runs is the caller's problem to prevent.
pub trait SceneHost {
    // ========================================================================
    // Structure
    // ========================================================================

    /// The graph root. Identity 0 during a whole-graph export.
    fn root(&self) -> NodeId;

    /// Ordered children of a node. Export determinism follows from this
    /// order being deterministic.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Append a node as the last child of `parent`.
    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Default-construct a node of the given declared type.
    fn create_node(&self, node_type: &str, name: &str) -> Result<NodeId>;

    // ========================================================================
    // Identity and typing
    // ========================================================================

    /// Declared node type, e.g. `"TransformNode"` or `"TriMeshNode"`.
    fn declared_type(&self, node: NodeId) -> String;

    fn node_name(&self, node: NodeId) -> String;

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Attribute names in the host's stable order (typically declaration
    /// order).
    fn attribute_names(&self, node: NodeId) -> Vec<String>;

    /// Current value of an attribute, or None when the node lacks it. The
    /// value carries its own kind tag.
    fn get_attribute(&self, node: NodeId, name: &str) -> Option<AttrValue>;

    /// Overwrite an existing attribute.
    fn set_attribute(&self, node: NodeId, name: &str, value: AttrValue) -> Result<()>;

    /// Create a new attribute on a node whose default shape lacks it.
    fn add_attribute(&self, node: NodeId, name: &str, value: AttrValue) -> Result<()>;

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get_attribute(node, name).is_some()
    }

    // ========================================================================
    // Transform and geometry
    // ========================================================================

    /// The node's local transform.
    fn transform(&self, node: NodeId) -> Transform;

    fn set_transform(&self, node: NodeId, transform: Transform) -> Result<()>;

    /// The host's internal geometry descriptor for mesh-backed nodes,
    /// `"TriMesh|<filename>|..."`. None for nodes without geometry.
    fn geometry_descriptor(&self, node: NodeId) -> Option<String>;
}

// ============================================================================
// AssetLoader Trait
// ============================================================================

/// Instantiates mesh-backed nodes from external geometry files. Used by the
/// reconstructor for node types that cannot be default-constructed.
pub trait AssetLoader<H: SceneHost> {
    /// Create a node named `name` backed by the geometry in `filename`.
    /// `flags` are forwarded opaquely from the import call.
    fn create_from_file(
        &self,
        host: &H,
        name: &str,
        filename: &str,
        flags: LoaderFlags,
    ) -> Result<NodeId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_flags_combine() {
        let flags = LoaderFlags::LOAD_MATERIALS | LoaderFlags::NORMALIZE_SCALE;
        assert!(flags.contains(LoaderFlags::LOAD_MATERIALS));
        assert!(flags.contains(LoaderFlags::NORMALIZE_SCALE));
        assert!(!flags.contains(LoaderFlags::OPTIMIZE_GEOMETRY));
        assert!(flags.contains(LoaderFlags::DEFAULTS));
    }
}
