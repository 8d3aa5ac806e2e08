//! Demonstrates cross-namespace resolution over an in-memory backend.
//!
//! Run with: `cargo run --example resolve_chain -p uor-resolve`

use serde_json::json;
use uor_object::{Concept, UorObject};
use uor_resolve::{
    MemoryStore, NamespaceResolver, ResolveOptions, ResolverRecord, StorageBackend,
};

fn main() -> anyhow::Result<()> {
    let store = MemoryStore::new();

    // user2 holds a concept that user1 will reference.
    let concept = Concept::new("graph-theory", "Graph theory", "The study of graphs")
        .with_tags(&["math", "structure"]);
    store.write(
        "user2",
        "concepts/graph-theory.json",
        &concept.serialize(),
        None,
    )?;

    let mut resolver = NamespaceResolver::new(store);

    // Without an edge, the reference is unresolved (not an error).
    let missing = resolver.resolve("uor://user1/concept/graph-theory", &ResolveOptions::default())?;
    println!("before record: resolved = {}", missing.path.resolved);

    // Declare: references unresolved in user1 may be retried in user2.
    resolver.add_resolver_record(
        ResolverRecord::new("user1", "user2").with_description("user2 mirrors user1"),
    )?;

    let resolution =
        resolver.resolve("uor://user1/concept/graph-theory", &ResolveOptions::default())?;
    println!("after record:  resolved = {}", resolution.path.resolved);
    if let Some(resolved) = &resolution.resolved_reference {
        println!("resolved to:   {resolved}");
    }
    for step in &resolution.path.steps {
        println!("  step: {} -> {} via {}", step.from, step.to, step.via);
    }
    println!("{}", serde_json::to_string_pretty(&json!(resolution))?);

    Ok(())
}
