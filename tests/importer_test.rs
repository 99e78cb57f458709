//! TOML import and export using fixtures under tests/resources/trees

use std::path::Path;

use rstest::{fixture, rstest};
use toml::Value;

use gatetree::application::{ApplicationError, Exporter, ImportedTree, Importer};
use gatetree::config::Settings;
use gatetree::domain::{IdPolicy, RenderStyle, TreeRender};
use gatetree::util::testing;

const TREES: &str = "tests/resources/trees";

#[fixture]
fn importer() -> Importer {
    testing::init_test_setup();
    Importer::new(&Settings::default())
}

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(TREES).join(name)
}

#[rstest]
fn given_nested_document_when_importing_then_ids_follow_document_order(importer: Importer) {
    let ImportedTree { tree, root } = importer.import_path(&fixture_path("anytree.toml")).unwrap();

    let visited: Vec<(u64, String)> = tree
        .subtree(root)
        .unwrap()
        .map(|(_, n)| (n.id(), n.name().to_string()))
        .collect();
    let expected = [
        "root", "sub0", "sub0B", "sub0A", "sub1", "sub1A", "sub1B", "sub1C", "sub1Ca",
    ];
    assert_eq!(visited.len(), expected.len());
    for (i, (id, name)) in visited.iter().enumerate() {
        assert_eq!(*id, i as u64);
        assert_eq!(name, expected[i]);
    }
}

#[rstest]
fn given_nested_document_when_rendering_names_then_layout_matches(importer: Importer) {
    let ImportedTree { tree, root } = importer.import_path(&fixture_path("anytree.toml")).unwrap();
    let rendered = tree
        .to_tree_string(root, RenderStyle::Name)
        .unwrap()
        .to_string();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(
        lines,
        vec![
            "root",
            "├── sub0",
            "│   ├── sub0B",
            "│   └── sub0A",
            "└── sub1",
            "    ├── sub1A",
            "    ├── sub1B",
            "    └── sub1C",
            "        └── sub1Ca",
        ]
    );
}

#[rstest]
fn given_gate_index_and_attributes_when_importing_then_node_fields_are_set(importer: Importer) {
    let ImportedTree { tree, root } = importer.import_path(&fixture_path("anytree.toml")).unwrap();

    assert_eq!(tree.get(root).unwrap().gate().as_deref(), Some("and"));

    let sub1 = tree.find_by_name(root, "sub1").unwrap()[0];
    let node = tree.get(sub1).unwrap();
    assert_eq!(node.gate().as_deref(), Some("or"));
    assert_eq!(node.index().len(), 2);
    assert!(node.index().contains("x"));

    let sub0b = tree.find_by_name(root, "sub0B").unwrap()[0];
    assert_eq!(
        tree.repr(sub0b).unwrap(),
        "Node('/root/sub0/sub0B', bar=109, foo=4, gate=None, id=2, index={})"
    );
}

#[rstest]
fn given_reserved_attribute_keys_when_importing_then_explicit_fields_win(importer: Importer) {
    let ImportedTree { tree, root } = importer
        .import_path(&fixture_path("shadowed.toml"))
        .unwrap();
    let node = tree.get(root).unwrap();

    assert_eq!(node.name(), "y");
    assert_eq!(node.id(), 0);
    assert_eq!(node.attributes().len(), 1);
    assert_eq!(node.attr("weight"), Some(&Value::from(1.5)));
    // [1, 2, 2, 3] collapses to three elements
    assert_eq!(node.index().len(), 3);
    assert!(node.index().contains("2"));
}

#[rstest]
fn given_node_without_name_when_importing_then_import_error(importer: Importer) {
    let err = importer
        .import_path(&fixture_path("broken.toml"))
        .unwrap_err();
    match err {
        ApplicationError::Import { message } => assert!(message.contains("broken.toml")),
        other => panic!("expected import error, got {other:?}"),
    }
}

#[rstest]
fn given_missing_file_when_importing_then_operation_failed(importer: Importer) {
    let err = importer
        .import_path(&fixture_path("does-not-exist.toml"))
        .unwrap_err();
    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
}

#[rstest]
fn given_imported_tree_when_exported_and_reimported_then_structure_is_kept(importer: Importer) {
    let first = importer.import_path(&fixture_path("anytree.toml")).unwrap();
    let exported = Exporter::export_string(&first.tree, first.root).unwrap();
    assert!(exported.contains("id = 8"));

    let second = importer.import_str(&exported).unwrap();
    let reprs = |t: &ImportedTree| -> Vec<String> {
        t.tree
            .subtree(t.root)
            .unwrap()
            .map(|(idx, _)| t.tree.repr(idx).unwrap())
            .collect()
    };
    assert_eq!(reprs(&first), reprs(&second));
}

#[rstest]
fn given_export_when_inspecting_table_then_children_are_nested() {
    let importer = Importer::new(&Settings::default());
    let ImportedTree { tree, root } = importer
        .import_str("name = \"a\"\n[[children]]\nname = \"b\"\nindex = [\"k\"]\n")
        .unwrap();
    let table = Exporter::export(&tree, root).unwrap();

    assert_eq!(table.get("id"), Some(&Value::Integer(0)));
    let children = table.get("children").and_then(Value::as_array).unwrap();
    assert_eq!(children.len(), 1);
    let child = children[0].as_table().unwrap();
    assert_eq!(child.get("name"), Some(&Value::from("b")));
    assert_eq!(child.get("id"), Some(&Value::Integer(1)));
    assert_eq!(
        child.get("index"),
        Some(&Value::Array(vec![Value::from("k")]))
    );
}

#[rstest]
fn given_settings_when_importing_then_separator_and_policy_apply() {
    let settings = Settings {
        separator: ".".to_string(),
        id_policy: IdPolicy::Counter,
        ..Settings::default()
    };
    let ImportedTree { tree, root } = Importer::new(&settings)
        .import_path(&fixture_path("anytree.toml"))
        .unwrap();
    assert_eq!(tree.id_policy(), IdPolicy::Counter);

    let sub1ca = tree.find_by_name(root, "sub1Ca").unwrap()[0];
    assert_eq!(tree.path_string(sub1ca).unwrap(), ".root.sub1.sub1C.sub1Ca");
    assert_eq!(tree.get(sub1ca).unwrap().id(), 8);
}
