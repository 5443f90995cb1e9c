//! In-memory scene graph host.
//!
//! This is the reference implementation of `SceneHost`. It uses simple
//! HashMaps protected by RwLock.
//!
//! ## Limitations
//!
//! - **No transform math**: transforms are stored, never composed.
//!   `WorldTransform` style derived attributes do not exist here.
//! - **No real asset loading**: `MeshLibrary` fabricates a `TriMeshNode`
//!   with the descriptor set; no file is ever opened.
//! - **Single-writer only**: per-collection locks mean multi-step mutations
//!   are NOT atomic. Safe for single-threaded or read-heavy use only.
//!
//! Use this host for:
//! - Testing the codec, linearizer and reconstructor
//! - Embedding scenelines in applications without a real engine

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use parking_lot::RwLock;
use smallvec::SmallVec;

use super::{AssetLoader, LoaderFlags, NodeId, SceneHost};
use crate::model::{AttrValue, Transform};
use crate::{Error, Result};

// ============================================================================
// MemoryScene
// ============================================================================

/// In-memory retained-mode scene graph.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    inner: Arc<SceneInner>,
}

#[derive(Debug)]
struct SceneInner {
    nodes: RwLock<HashMap<NodeId, SceneNode>>,
    root: NodeId,
    next_id: AtomicU64,
}

#[derive(Debug)]
struct SceneNode {
    node_type: String,
    name: String,
    transform: Transform,
    /// Declaration order is attribute order.
    attributes: Vec<(String, AttrValue)>,
    children: SmallVec<[NodeId; 4]>,
    geometry: Option<String>,
}

impl SceneNode {
    fn new(node_type: &str, name: &str) -> Self {
        Self {
            node_type: node_type.to_owned(),
            name: name.to_owned(),
            transform: Transform::identity(),
            attributes: vec![("Name".to_owned(), AttrValue::from(name))],
            children: SmallVec::new(),
            geometry: None,
        }
    }
}

impl MemoryScene {
    /// A scene holding only a root `TransformNode`.
    pub fn new() -> Self {
        let root = NodeId(1);
        let mut nodes = HashMap::new();
        nodes.insert(root, SceneNode::new("TransformNode", "Root"));
        Self {
            inner: Arc::new(SceneInner {
                nodes: RwLock::new(nodes),
                root,
                next_id: AtomicU64::new(2),
            }),
        }
    }

    /// Create a node and attach it under `parent` in one step.
    pub fn add_node(&self, parent: NodeId, node_type: &str, name: &str) -> Result<NodeId> {
        let id = self.create_node(node_type, name)?;
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Set the host-internal geometry descriptor of a node.
    pub fn set_geometry(&self, node: NodeId, descriptor: &str) -> Result<()> {
        let mut nodes = self.inner.nodes.write();
        let n = nodes.get_mut(&node).ok_or_else(|| missing(node))?;
        n.geometry = Some(descriptor.to_owned());
        Ok(())
    }

    /// Number of nodes in the scene, root included.
    pub fn node_count(&self) -> usize {
        self.inner.nodes.read().len()
    }
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(node: NodeId) -> Error {
    Error::Host(format!("no such node: {node}"))
}

// ============================================================================
// SceneHost impl
// ============================================================================

impl SceneHost for MemoryScene {
    fn root(&self) -> NodeId {
        self.inner.root
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .nodes
            .read()
            .get(&node)
            .map(|n| n.children.to_vec())
            .unwrap_or_default()
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut nodes = self.inner.nodes.write();
        if !nodes.contains_key(&child) {
            return Err(missing(child));
        }
        let p = nodes.get_mut(&parent).ok_or_else(|| missing(parent))?;
        p.children.push(child);
        Ok(())
    }

    fn create_node(&self, node_type: &str, name: &str) -> Result<NodeId> {
        let id = NodeId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.nodes.write().insert(id, SceneNode::new(node_type, name));
        Ok(id)
    }

    fn declared_type(&self, node: NodeId) -> String {
        self.inner
            .nodes
            .read()
            .get(&node)
            .map(|n| n.node_type.clone())
            .unwrap_or_default()
    }

    fn node_name(&self, node: NodeId) -> String {
        self.inner
            .nodes
            .read()
            .get(&node)
            .map(|n| n.name.clone())
            .unwrap_or_default()
    }

    fn attribute_names(&self, node: NodeId) -> Vec<String> {
        self.inner
            .nodes
            .read()
            .get(&node)
            .map(|n| n.attributes.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default()
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<AttrValue> {
        self.inner
            .nodes
            .read()
            .get(&node)?
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: AttrValue) -> Result<()> {
        let mut nodes = self.inner.nodes.write();
        let n = nodes.get_mut(&node).ok_or_else(|| missing(node))?;
        match n.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::Host(format!("node {node} has no attribute `{name}`"))),
        }
    }

    fn add_attribute(&self, node: NodeId, name: &str, value: AttrValue) -> Result<()> {
        let mut nodes = self.inner.nodes.write();
        let n = nodes.get_mut(&node).ok_or_else(|| missing(node))?;
        if n.attributes.iter().any(|(k, _)| k == name) {
            return Err(Error::Host(format!("node {node} already has attribute `{name}`")));
        }
        n.attributes.push((name.to_owned(), value));
        Ok(())
    }

    fn transform(&self, node: NodeId) -> Transform {
        self.inner
            .nodes
            .read()
            .get(&node)
            .map(|n| n.transform)
            .unwrap_or_default()
    }

    fn set_transform(&self, node: NodeId, transform: Transform) -> Result<()> {
        let mut nodes = self.inner.nodes.write();
        let n = nodes.get_mut(&node).ok_or_else(|| missing(node))?;
        n.transform = transform;
        Ok(())
    }

    fn geometry_descriptor(&self, node: NodeId) -> Option<String> {
        self.inner.nodes.read().get(&node)?.geometry.clone()
    }
}

// ============================================================================
// MeshLibrary
// ============================================================================

/// Reference `AssetLoader`: fabricates mesh-backed nodes without touching the
/// filesystem and records every request so tests can assert on them.
#[derive(Default)]
pub struct MeshLibrary {
    requests: RwLock<Vec<(String, LoaderFlags)>>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filenames and flags requested so far, in call order.
    pub fn requests(&self) -> Vec<(String, LoaderFlags)> {
        self.requests.read().clone()
    }
}

impl AssetLoader<MemoryScene> for MeshLibrary {
    fn create_from_file(
        &self,
        host: &MemoryScene,
        name: &str,
        filename: &str,
        flags: LoaderFlags,
    ) -> Result<NodeId> {
        self.requests.write().push((filename.to_owned(), flags));
        let node = host.create_node("TriMeshNode", name)?;
        host.set_geometry(node, &format!("TriMesh|{filename}|0"))?;
        Ok(node)
    }
}

// ============================================================================
// Tests
// ============================================================================
