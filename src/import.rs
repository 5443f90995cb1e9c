//! Graph reconstructor — streaming import of JSON Lines records.
//!
//! Reads one record per line and rebuilds the hierarchy under a caller-chosen
//! target node, relying on the export guarantee that every parent identity
//! was emitted on an earlier line. The input is consumed line by line; the
//! file is never loaded whole.
//!
//! Errors are fatal: a skipped record would silently orphan every descendant
//! that names it as parent, so import never skips-and-continues.

use std::io::BufRead;

use hashbrown::HashMap;

use crate::codec;
use crate::host::{AssetLoader, LoaderFlags, NodeId, SceneHost};
use crate::model::{NodeClass, NodeRecord};
use crate::policy::FilterPolicy;
use crate::{Error, Result};

/// Import records from `reader`, attaching the reconstructed nodes under
/// `target`. `flags` are forwarded opaquely to the asset loader. Returns the
/// number of nodes attached.
pub fn import_graph<H, L>(
    host: &H,
    loader: &L,
    target: NodeId,
    reader: impl BufRead,
    flags: LoaderFlags,
    policy: &FilterPolicy,
) -> Result<u64>
where
    H: SceneHost,
    L: AssetLoader<H>,
{
    // Identity → host node for everything restored so far. Identity 0 is the
    // target node the stream's top-level records point at.
    let mut nodes: HashMap<u64, Restored> = HashMap::new();
    nodes.insert(0, Restored::Attached(target));

    let mut attached: u64 = 0;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: NodeRecord = serde_json::from_str(&line)?;

        let Some(parent) = record.parent else {
            // Legacy whole-graph files write the root itself with the -1
            // sentinel. The root already exists on the target side; alias its
            // identity so its children attach to `target`.
            nodes.insert(record.id, Restored::Attached(target));
            continue;
        };

        let parent_state = *nodes.get(&parent).ok_or(Error::DanglingParentReference {
            id: record.id,
            parent,
        })?;

        // A record of a blacklisted type is dropped along with everything
        // below it; descendants resolve their parent to the dropped marker.
        if policy.node_type_blocked(&record.node_type) || parent_state == Restored::Dropped {
            nodes.insert(record.id, Restored::Dropped);
            continue;
        }
        let Restored::Attached(parent_node) = parent_state else { unreachable!() };

        let node = instantiate(host, loader, &record, flags)?;

        if let Some(transform) = record.transform {
            host.set_transform(node, transform)?;
        }

        for (name, value) in &record.attributes {
            let current = host.get_attribute(node, name);
            let decoded = codec::decode(name, value, current.as_ref().and_then(|v| v.kind()))?;
            if current.is_some() {
                host.set_attribute(node, name, decoded)?;
            } else {
                host.add_attribute(node, name, decoded)?;
            }
        }

        nodes.insert(record.id, Restored::Attached(node));
        host.append_child(parent_node, node)?;
        attached += 1;
    }

    tracing::debug!(records = attached, "scene import complete");
    Ok(attached)
}

/// How one imported identity resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restored {
    Attached(NodeId),
    /// Record (or an ancestor) was node-type blacklisted.
    Dropped,
}

/// Instantiate the node for one record: through the asset loader for
/// mesh-backed types, by default construction otherwise.
fn instantiate<H, L>(host: &H, loader: &L, record: &NodeRecord, flags: LoaderFlags) -> Result<NodeId>
where
    H: SceneHost,
    L: AssetLoader<H>,
{
    match record.class() {
        NodeClass::MeshBacked => {
            let filename = record
                .filename
                .as_deref()
                .ok_or(Error::MissingAssetFilename { id: record.id })?;
            loader.create_from_file(host, &record.name, filename, flags)
        }
        NodeClass::Standard => host.create_node(&record.node_type, &record.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryScene, MeshLibrary};

    fn import_str(input: &str) -> Result<(MemoryScene, u64)> {
        let scene = MemoryScene::new();
        let loader = MeshLibrary::new();
        let n = import_graph(
            &scene,
            &loader,
            scene.root(),
            input.as_bytes(),
            LoaderFlags::DEFAULTS,
            &FilterPolicy::new(),
        )?;
        Ok((scene, n))
    }

    #[test]
    fn test_empty_and_blank_lines() {
        let (_, n) = import_str("").unwrap();
        assert_eq!(n, 0);
        let (_, n) = import_str("\n\n").unwrap();
        assert_eq!(n, 0);
    }

    #[test]
    fn test_dangling_parent_is_fatal() {
        let input = r#"{"attributes":{},"id":1,"name":"a","parent":5,"type":"Group"}"#;
        let err = import_str(input).unwrap_err();
        match err {
            Error::DanglingParentReference { id, parent } => {
                assert_eq!(id, 1);
                assert_eq!(parent, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_legacy_sentinel_root_line() {
        // Whole-graph legacy form: the root itself with parent -1, a child
        // referencing the root's own id rather than 0.
        let input = concat!(
            r#"{"attributes":{},"id":0,"name":"scenegraph","parent":-1,"type":"TransformNode"}"#,
            "\n",
            r#"{"attributes":{},"id":1,"name":"child","parent":0,"type":"Group"}"#,
            "\n",
        );
        let (scene, n) = import_str(input).unwrap();
        assert_eq!(n, 1);
        assert_eq!(scene.children(scene.root()).len(), 1);
    }

    #[test]
    fn test_mesh_record_without_filename() {
        let input = r#"{"attributes":{},"id":1,"name":"m","parent":0,"type":"TriMeshNode"}"#;
        let err = import_str(input).unwrap_err();
        assert!(matches!(err, Error::MissingAssetFilename { id: 1 }), "{err}");
    }

    #[test]
    fn test_blacklisted_record_and_descendants_dropped() {
        let input = concat!(
            r#"{"attributes":{},"id":1,"name":"cam","parent":0,"type":"CameraNode"}"#,
            "\n",
            r#"{"attributes":{},"id":2,"name":"under-cam","parent":1,"type":"Group"}"#,
            "\n",
            r#"{"attributes":{},"id":3,"name":"kept","parent":0,"type":"Group"}"#,
            "\n",
        );
        let (scene, n) = import_str(input).unwrap();
        assert_eq!(n, 1);
        let children = scene.children(scene.root());
        assert_eq!(children.len(), 1);
        assert_eq!(scene.node_name(children[0]), "kept");
    }

    #[test]
    fn test_unknown_attribute_is_created() {
        let input = concat!(
            r#"{"attributes":{"Speed":{"kind":"Float","payload":2.5}},"#,
            r#""id":1,"name":"n","parent":0,"type":"Group"}"#,
        );
        let (scene, _) = import_str(input).unwrap();
        let node = scene.children(scene.root())[0];
        assert_eq!(
            scene.get_attribute(node, "Speed"),
            Some(crate::model::AttrValue::Float(2.5))
        );
    }
}
