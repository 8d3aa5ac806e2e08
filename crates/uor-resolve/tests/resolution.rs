//! End-to-end resolution tests over the in-memory backend: stored UOR
//! objects, persisted resolver records, the graph walk, and the cache.

use serde_json::json;
use uor_object::{Concept, TypeTag, UorObject};
use uor_resolve::{
    load_records, FailingStore, MemoryStore, NamespaceResolver, ResolveOptions, ResolverRecord,
    StorageBackend, StoreError, UorReference,
};

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    let concept = Concept::new("graph-theory", "Graph theory", "The study of graphs")
        .with_tags(&["math"]);
    store
        .write(
            "user2",
            "concepts/graph-theory.json",
            &concept.serialize(),
            None,
        )
        .expect("seed write succeeds");
    store
}

#[test]
fn serialized_objects_resolve_across_one_hop() {
    let mut resolver = NamespaceResolver::new(seeded_store());
    resolver
        .add_resolver_record(ResolverRecord::new("user1", "user2"))
        .expect("record persists");

    let resolution = resolver
        .resolve("uor://user1/concept/graph-theory", &ResolveOptions::default())
        .expect("reference parses");

    assert_eq!(
        resolution.resolved_reference,
        Some(UorReference::new(
            "user2",
            TypeTag::concept(),
            "graph-theory"
        ))
    );
    assert!(resolution.path.resolved);
    assert_eq!(resolution.path.steps.len(), 1);

    // The resolved object round-trips through the same path convention.
    let resolved = resolution.resolved_reference.expect("resolved");
    let stored = resolver
        .store()
        .read(&resolved.namespace, &resolved.storage_path())
        .expect("read succeeds")
        .expect("object exists");
    let concept = Concept::from_serialized(&stored.content).expect("stored record parses");
    assert_eq!(concept.id(), "graph-theory");
}

#[test]
fn resolver_records_are_loaded_from_persistence() {
    let store = seeded_store();
    let record = ResolverRecord::new("user1", "user2");
    uor_resolve::save_record(&store, &record).expect("save succeeds");

    // A fresh resolver sees the persisted edge without add_resolver_record.
    let mut resolver = NamespaceResolver::new(store);
    let resolution = resolver
        .resolve("uor://user1/concept/graph-theory", &ResolveOptions::default())
        .expect("reference parses");
    assert!(resolution.path.resolved);
    assert_eq!(resolution.path.steps[0].via, record.id);
}

#[test]
fn failing_backend_degrades_to_unresolved() {
    let mut resolver = NamespaceResolver::new(FailingStore);
    let resolution = resolver
        .resolve("uor://user1/concept/x", &ResolveOptions::default())
        .expect("reference parses");
    assert_eq!(resolution.resolved_reference, None);
    assert!(!resolution.path.resolved);
}

#[test]
fn corrupt_resolver_records_surface_outside_a_walk() {
    let store = MemoryStore::new();
    store
        .write("user1", "resolvers/broken.json", &json!([1, 2, 3]), None)
        .expect("write succeeds");
    assert!(matches!(
        load_records(&store, "user1"),
        Err(StoreError::Corrupt { .. })
    ));
}

#[test]
fn branching_graphs_respect_persisted_edge_order() {
    let store = MemoryStore::new();
    // The object exists in both targets; the first persisted edge wins.
    for namespace in ["mirror-a", "mirror-b"] {
        store
            .write(namespace, "concepts/x.json", &json!({ "id": "x" }), None)
            .expect("seed write succeeds");
    }
    let mut resolver = NamespaceResolver::new(store);
    resolver
        .add_resolver_record(ResolverRecord::new("user1", "mirror-a"))
        .expect("record persists");
    resolver
        .add_resolver_record(ResolverRecord::new("user1", "mirror-b"))
        .expect("record persists");

    let resolution = resolver
        .resolve("uor://user1/concept/x", &ResolveOptions::default())
        .expect("reference parses");
    assert_eq!(
        resolution
            .resolved_reference
            .map(|reference| reference.namespace),
        Some("mirror-a".to_owned())
    );
}

#[test]
fn two_hop_chains_accumulate_ordered_steps() {
    let store = MemoryStore::new();
    store
        .write("user3", "concepts/x.json", &json!({ "id": "x" }), None)
        .expect("seed write succeeds");
    let mut resolver = NamespaceResolver::new(store);
    resolver
        .add_resolver_record(ResolverRecord::new("user1", "user2"))
        .expect("record persists");
    resolver
        .add_resolver_record(ResolverRecord::new("user2", "user3"))
        .expect("record persists");

    let resolution = resolver
        .resolve("uor://user1/concept/x", &ResolveOptions::default())
        .expect("reference parses");
    let route: Vec<(&str, &str)> = resolution
        .path
        .steps
        .iter()
        .map(|step| (step.from.as_str(), step.to.as_str()))
        .collect();
    assert_eq!(route, [("user1", "user2"), ("user2", "user3")]);
}

#[test]
fn resolution_serializes_for_upper_layers() {
    let mut resolver = NamespaceResolver::new(seeded_store());
    resolver
        .add_resolver_record(ResolverRecord::new("user1", "user2"))
        .expect("record persists");
    let resolution = resolver
        .resolve("uor://user1/concept/graph-theory", &ResolveOptions::default())
        .expect("reference parses");

    let wire = json!(resolution);
    assert_eq!(wire["resolvedReference"], "uor://user2/concept/graph-theory");
    assert_eq!(wire["path"]["resolved"], true);
    assert_eq!(wire["path"]["steps"][0]["from"], "user1");
}
