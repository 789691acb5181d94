// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::sync::Arc;

use attr_store::{
    AttributeRegistry, AttributeTable, ConfigError, ConfigService, ConfigStore, DirConfigStore,
    ElementKind, TableConfig,
};
use tempfile::TempDir;

#[test]
fn configs_live_as_json_files_keyed_by_graph_label() {
    let temp = TempDir::new().unwrap();
    let store = DirConfigStore::open(temp.path().join("configs")).unwrap();
    let service = ConfigService::new(store);
    assert_eq!(service.load("graph").unwrap(), TableConfig::default());

    let cfg = TableConfig {
        vertex_capacity: 5,
        undo_depth: 8,
        ..TableConfig::default()
    };
    service.save("graph", &cfg).unwrap();
    let path = service.store().dir().join("graph.json");
    assert!(path.is_file());

    let reopened = ConfigService::new(DirConfigStore::open(service.store().dir()).unwrap());
    let loaded = reopened.load("graph").unwrap();
    assert_eq!(loaded, cfg);

    let registry = Arc::new(AttributeRegistry::with_builtins().expect("builtins"));
    let mut t = AttributeTable::new("graph", registry, &loaded);
    let weight = t.declare(ElementKind::Vertex, "weight", "long").unwrap();
    assert_eq!(t.store(weight).unwrap().capacity(), 5);
    assert_eq!(t.log().depth(), 8);
}

#[test]
fn keys_that_escape_the_directory_are_rejected() {
    let temp = TempDir::new().unwrap();
    let store = DirConfigStore::open(temp.path()).unwrap();
    for key in ["", "../graph", "a/b", ".hidden"] {
        assert!(
            matches!(store.read(key), Err(ConfigError::InvalidKey(_))),
            "{key:?}"
        );
    }
    assert!(matches!(
        store.write("a/b", b"{}"),
        Err(ConfigError::InvalidKey(_))
    ));
}

#[test]
fn unreadable_entries_surface_as_io_errors() {
    let temp = TempDir::new().unwrap();
    let store = DirConfigStore::open(temp.path()).unwrap();
    // A directory where the file should be cannot be read as bytes.
    fs::create_dir(temp.path().join("graph.json")).unwrap();
    assert!(matches!(
        store.read("graph"),
        Err(ConfigError::Io { ref key, .. }) if key == "graph"
    ));
    assert!(matches!(
        store.write("graph", b"{}"),
        Err(ConfigError::Io { .. })
    ));
}
