//! Universal Object Reference (UOR) — namespace resolution.
//!
//! Namespaces are isolated storage scopes (one per user or tenant). A
//! `uor://<namespace>/<type>/<id>` reference that cannot be found in its
//! own namespace may still resolve through persisted resolver records —
//! directed edges declaring where unresolved references should be retried.
//!
//! - [`reference`] — reference parsing and formatting.
//! - [`store`] — the storage backend boundary and the in-memory backend.
//! - [`record`] — resolver record persistence under `resolvers/`.
//! - [`resolver`] — the cached, cycle-guarded, depth-bounded graph walk.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use uor_resolve::{
//!     MemoryStore, NamespaceResolver, ResolveOptions, ResolverRecord, StorageBackend,
//! };
//!
//! let store = MemoryStore::new();
//! store.write("user2", "concepts/x.json", &json!({ "id": "x" }), None)?;
//!
//! let mut resolver = NamespaceResolver::new(store);
//! resolver.add_resolver_record(ResolverRecord::new("user1", "user2"))?;
//!
//! let resolution = resolver.resolve("uor://user1/concept/x", &ResolveOptions::default())?;
//! assert_eq!(
//!     resolution.resolved_reference.map(|r| r.to_string()),
//!     Some("uor://user2/concept/x".to_owned())
//! );
//! assert_eq!(resolution.path.steps.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod record;
pub mod reference;
pub mod resolver;
pub mod store;

pub use record::{load_records, save_record, ResolverRecord};
pub use reference::{ReferenceParseError, UorReference, SCHEME};
pub use resolver::{
    NamespaceResolver, PathStep, Resolution, ResolutionPath, ResolveOptions, DEFAULT_CACHE_TTL,
    DEFAULT_MAX_DEPTH,
};
pub use store::{
    object_path, DirEntry, EntryKind, FailingStore, MemoryStore, StorageBackend, StoreError,
    StoredContent,
};
