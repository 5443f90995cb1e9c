//! # scenelines — Scene Graph ⇄ JSON Lines
//!
//! Serializes a retained-mode 3D scene graph into a stable, line-delimited,
//! human-inspectable format and reconstructs an equivalent graph from it.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `SceneHost` is the contract between this crate and
//!    the engine that owns the graph
//! 2. **Clean DTOs**: `NodeRecord`, `TypedValue`, `AttrValue` cross all
//!    boundaries
//! 3. **Closed value set**: encoding is total over the known kinds — an
//!    unsupported attribute kind is a hard error, never a silent drop
//! 4. **Injected policy**: blacklists are values, not process-wide state
//!
//! ## Quick Start
//!
//! ```rust
//! use scenelines::GraphSerializer;
//! use scenelines::host::{LoaderFlags, MemoryScene, MeshLibrary, SceneHost};
//!
//! fn example() -> scenelines::Result<()> {
//!     let scene = MemoryScene::new();
//!     scene.add_node(scene.root(), "Group", "hull")?;
//!
//!     // Export: one JSON object per line, root implicit.
//!     let serializer = GraphSerializer::new();
//!     let mut buf = Vec::new();
//!     serializer.export(&scene, &mut buf)?;
//!
//!     // Import onto a fresh root.
//!     let restored = MemoryScene::new();
//!     serializer.import(
//!         &restored,
//!         &MeshLibrary::new(),
//!         restored.root(),
//!         buf.as_slice(),
//!         LoaderFlags::DEFAULTS,
//!     )?;
//!     Ok(())
//! }
//! example().unwrap();
//! ```
//!
//! ## Wire format
//!
//! UTF-8 JSON Lines: each line one node record, keys sorted for stable
//! diffing, no header or footer. The export root is identity 0 and never
//! written; every other record names a parent identity from an earlier line.

// ============================================================================
// Modules
// ============================================================================

pub mod codec;
pub mod export;
pub mod host;
pub mod import;
pub mod model;
pub mod policy;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{AttrValue, Mat3, Mat4, Material, NodeClass, NodeRecord, Transform, TypedValue, ValueKind};

// ============================================================================
// Re-exports: Host seam
// ============================================================================

pub use host::{AssetLoader, LoaderFlags, NodeId, SceneHost};

// ============================================================================
// Re-exports: Policy
// ============================================================================

pub use policy::FilterPolicy;

// ============================================================================
// Top-level serializer handle
// ============================================================================

use std::io::{BufRead, Write};

/// The primary entry point. A `GraphSerializer` carries a filter policy and
/// drives export and import with it.
#[derive(Debug, Clone, Default)]
pub struct GraphSerializer {
    policy: FilterPolicy,
}

impl GraphSerializer {
    /// Serializer with the stock blacklists.
    pub fn new() -> Self {
        Self { policy: FilterPolicy::new() }
    }

    /// Serializer with a caller-supplied policy.
    pub fn with_policy(policy: FilterPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    /// Export every non-blacklisted strict descendant of the host root.
    /// Returns the number of records written.
    pub fn export<H: SceneHost>(&self, host: &H, writer: &mut dyn Write) -> Result<u64> {
        export::export_graph(host, writer, &self.policy)
    }

    /// Export the subtree below `start`, excluding `start` itself.
    pub fn export_subtree<H: SceneHost>(
        &self,
        host: &H,
        start: NodeId,
        writer: &mut dyn Write,
    ) -> Result<u64> {
        export::export_subtree(host, start, writer, &self.policy)
    }

    /// Reconstruct a previously exported stream under `target`. Returns the
    /// number of nodes attached.
    pub fn import<H, L>(
        &self,
        host: &H,
        loader: &L,
        target: NodeId,
        reader: impl BufRead,
        flags: LoaderFlags,
    ) -> Result<u64>
    where
        H: SceneHost,
        L: AssetLoader<H>,
    {
        import::import_graph(host, loader, target, reader, flags, &self.policy)
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Encode-time: an attribute's runtime kind is outside the closed set.
    /// Fatal for the whole export — a partial record would break the
    /// line-format contract.
    #[error("attribute `{attribute}` has unsupported type `{type_name}`")]
    UnsupportedType { attribute: String, type_name: String },

    /// A mesh-backed node whose geometry descriptor lacks the
    /// `TriMesh|<filename>|...` delimiters. `node` is the export identity.
    #[error("node {node}: malformed geometry descriptor `{descriptor}`")]
    MalformedGeometryDescriptor { node: u64, descriptor: String },

    /// Decode-time: the declared kind contradicts the attribute's current
    /// shape on the instantiated node.
    #[error("attribute `{attribute}`: declared kind {got} cannot be applied to {expected}")]
    TypeMismatch { attribute: String, expected: String, got: String },

    /// Decode-time: the payload's shape or length does not fit the declared
    /// kind.
    #[error("attribute `{attribute}`: malformed {kind} payload: {detail}")]
    MalformedPayload { attribute: String, kind: String, detail: String },

    /// Decode-time: an unknown kind tag with no current attribute shape to
    /// rebuild positionally.
    #[error("attribute `{attribute}`: no native type to construct for kind `{kind}`")]
    UnknownFieldType { attribute: String, kind: String },

    /// A record names a parent identity no earlier line defined. Corrupted
    /// or hand-edited input; not recoverable.
    #[error("record {id} references parent {parent} not seen in any earlier line")]
    DanglingParentReference { id: u64, parent: u64 },

    /// A mesh-backed record without an asset filename.
    #[error("record {id}: mesh-backed node without asset filename")]
    MissingAssetFilename { id: u64 },

    /// Failure reported by the host engine or asset loader.
    #[error("host error: {0}")]
    Host(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
