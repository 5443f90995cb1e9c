//! Import failure modes and schema-evolution behavior, driven by hand-built
//! record streams (the same way a hand-edited or corrupted file would look).

use scenelines::host::{LoaderFlags, MemoryScene, MeshLibrary, SceneHost};
use scenelines::{Error, GraphSerializer};

fn import_str(input: &str) -> (MemoryScene, scenelines::Result<u64>) {
    let scene = MemoryScene::new();
    let loader = MeshLibrary::new();
    let result = GraphSerializer::new().import(
        &scene,
        &loader,
        scene.root(),
        input.as_bytes(),
        LoaderFlags::DEFAULTS,
    );
    (scene, result)
}

#[test]
fn test_dangling_parent_stops_import() {
    // First line is fine; the second references an id no line defined.
    let input = concat!(
        r#"{"attributes":{},"id":1,"name":"ok","parent":0,"type":"Group"}"#,
        "\n",
        r#"{"attributes":{},"id":2,"name":"orphan","parent":9,"type":"Group"}"#,
        "\n",
        r#"{"attributes":{},"id":3,"name":"never-reached","parent":1,"type":"Group"}"#,
        "\n",
    );
    let (scene, result) = import_str(input);

    match result.unwrap_err() {
        Error::DanglingParentReference { id, parent } => {
            assert_eq!(id, 2);
            assert_eq!(parent, 9);
        }
        other => panic!("unexpected error: {other}"),
    }

    // The partially built subtree before the bad line remains; nothing after
    // it was attached.
    let top = scene.children(scene.root());
    assert_eq!(top.len(), 1);
    assert_eq!(scene.node_name(top[0]), "ok");
    assert!(scene.children(top[0]).is_empty());
}

#[test]
fn test_malformed_matrix_payload_is_fatal() {
    let input = concat!(
        r#"{"attributes":{"Offset":{"kind":"Mat4","payload":[0,1,2,3,4,5,6,7,8,9]}},"#,
        r#""id":1,"name":"n","parent":0,"type":"Group"}"#,
    );
    let (_, result) = import_str(input);
    assert!(matches!(result.unwrap_err(), Error::MalformedPayload { .. }));
}

#[test]
fn test_kind_conflicting_with_default_shape_is_fatal() {
    // Every default-constructed node carries a String `Name`; a record that
    // declares Name as Int cannot be applied.
    let input = concat!(
        r#"{"attributes":{"Name":{"kind":"Int","payload":7}},"#,
        r#""id":1,"name":"n","parent":0,"type":"Group"}"#,
    );
    let (_, result) = import_str(input);
    match result.unwrap_err() {
        Error::TypeMismatch { attribute, expected, got } => {
            assert_eq!(attribute, "Name");
            assert_eq!(expected, "String");
            assert_eq!(got, "Int");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_kind_without_native_type_is_fatal() {
    // A kind tag from a newer schema on an attribute the default node does
    // not have: there is no shape to rebuild.
    let input = concat!(
        r#"{"attributes":{"Aura":{"kind":"SpectralField","payload":[1,2]}},"#,
        r#""id":1,"name":"n","parent":0,"type":"Group"}"#,
    );
    let (_, result) = import_str(input);
    assert!(matches!(result.unwrap_err(), Error::UnknownFieldType { .. }));
}

#[test]
fn test_garbage_line_is_a_json_error() {
    let (_, result) = import_str("not json at all\n");
    assert!(matches!(result.unwrap_err(), Error::Json(_)));
}

#[test]
fn test_legacy_whole_graph_file() {
    // The historical whole-graph variant: the root written as its own line
    // with the -1 sentinel, descendants referencing its real id.
    let input = concat!(
        r#"{"attributes":{},"id":0,"name":"scenegraph","parent":-1,"type":"TransformNode"}"#,
        "\n",
        r#"{"attributes":{},"id":1,"name":"hull","parent":0,"type":"Group"}"#,
        "\n",
        r#"{"attributes":{},"id":2,"name":"inner","parent":1,"type":"Group"}"#,
        "\n",
    );
    let (scene, result) = import_str(input);
    assert_eq!(result.unwrap(), 2);

    let top = scene.children(scene.root());
    assert_eq!(top.len(), 1);
    assert_eq!(scene.node_name(top[0]), "hull");
    assert_eq!(scene.children(top[0]).len(), 1);
}

#[test]
fn test_record_without_transform_keeps_default() {
    let input = r#"{"attributes":{},"id":1,"name":"n","parent":0,"type":"Group"}"#;
    let (scene, result) = import_str(input);
    result.unwrap();

    let node = scene.children(scene.root())[0];
    assert_eq!(scene.transform(node), scenelines::Transform::identity());
}

#[test]
fn test_import_under_arbitrary_target() {
    // Reconstruction attaches under any caller-chosen node, not just root.
    let scene = MemoryScene::new();
    let dock = scene.add_node(scene.root(), "Group", "dock").unwrap();

    let input = r#"{"attributes":{},"id":1,"name":"cargo","parent":0,"type":"Group"}"#;
    GraphSerializer::new()
        .import(&scene, &MeshLibrary::new(), dock, input.as_bytes(), LoaderFlags::DEFAULTS)
        .unwrap();

    let under_dock = scene.children(dock);
    assert_eq!(under_dock.len(), 1);
    assert_eq!(scene.node_name(under_dock[0]), "cargo");
}

#[test]
fn test_streaming_large_input() {
    // 10k records through a BufRead without materializing the file.
    let mut input = String::new();
    for id in 1..=10_000u64 {
        let parent = if id == 1 { 0 } else { id - 1 };
        input.push_str(&format!(
            "{{\"attributes\":{{}},\"id\":{id},\"name\":\"n{id}\",\"parent\":{parent},\"type\":\"Group\"}}\n"
        ));
    }
    let (scene, result) = import_str(&input);
    assert_eq!(result.unwrap(), 10_000);
    assert_eq!(scene.node_count(), 10_001);
}
