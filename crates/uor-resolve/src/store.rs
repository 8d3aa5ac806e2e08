//! The storage backend boundary.
//!
//! Namespace storage is an external collaborator (a GitHub repository per
//! namespace in the reference deployment). The resolver consumes it only
//! through [`StorageBackend`]: existence checks, versioned reads and
//! writes, and directory listings over the `<plural>/<id>.json` path
//! convention.
//!
//! [`MemoryStore`] is the in-process implementation used by tests and
//! examples; it honors the same version-tag discipline as a real backend.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;
use thiserror::Error;
use uor_object::TypeTag;

/// Why a storage operation failed.
///
/// During resolution these are swallowed per edge — a backend failure
/// means "not resolvable via this edge", not an aborted walk. They are
/// surfaced directly only by explicit read/write calls.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not complete the operation.
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// Stored content failed to parse — external data corruption, never
    /// swallowed.
    #[error("stored content at `{path}` is corrupt")]
    Corrupt {
        /// Path of the damaged entry.
        path: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Content read from a namespace, with its backend version tag.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredContent {
    /// The stored JSON document.
    pub content: Value,
    /// Opaque version tag for optimistic concurrency on writes.
    pub version_tag: String,
}

/// Kind of a directory listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A stored document.
    File,
    /// A nested directory.
    Directory,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name relative to the listed directory.
    pub name: String,
    /// File or directory.
    pub kind: EntryKind,
}

/// Storage path of an object: `<plural>/<id>.json`.
#[must_use]
pub fn object_path(type_tag: &TypeTag, id: &str) -> String {
    format!("{}/{id}.json", type_tag.plural())
}

/// The boundary contract every namespace backend satisfies.
///
/// Implementations must be safe to share across threads; the resolver
/// holds one backend for all namespaces it walks.
pub trait StorageBackend: Send + Sync {
    /// True when the object exists in the namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot answer.
    fn exists_at(
        &self,
        namespace: &str,
        type_tag: &TypeTag,
        id: &str,
    ) -> Result<bool, StoreError> {
        Ok(self.read(namespace, &object_path(type_tag, id))?.is_some())
    }

    /// Reads a document; `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure or corrupt content.
    fn read(&self, namespace: &str, path: &str) -> Result<Option<StoredContent>, StoreError>;

    /// Writes a document, optionally guarded by a version tag.
    ///
    /// Returns `false` when the guard does not match the stored version
    /// (the write is not applied).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot complete the write.
    fn write(
        &self,
        namespace: &str,
        path: &str,
        content: &Value,
        version_tag: Option<&str>,
    ) -> Result<bool, StoreError>;

    /// Deletes a document guarded by its version tag.
    ///
    /// Returns `false` when the document is absent or the guard does not
    /// match.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot complete the delete.
    fn delete(&self, namespace: &str, path: &str, version_tag: &str) -> Result<bool, StoreError>;

    /// Lists the immediate entries under a directory path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot answer.
    fn list(&self, namespace: &str, dir_path: &str) -> Result<Vec<DirEntry>, StoreError>;
}

/// Thread-safe in-memory namespace storage.
///
/// Version tags are a monotone counter per store; a write guarded by a
/// stale tag returns `false` exactly like a real backend's conditional
/// write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespaces: RwLock<BTreeMap<String, BTreeMap<String, StoredContent>>>,
    version_counter: RwLock<u64>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_version(&self) -> String {
        let mut counter = self
            .version_counter
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *counter += 1;
        format!("v{counter}")
    }
}

impl StorageBackend for MemoryStore {
    fn read(&self, namespace: &str, path: &str) -> Result<Option<StoredContent>, StoreError> {
        let namespaces = self
            .namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(namespaces
            .get(namespace)
            .and_then(|entries| entries.get(path))
            .cloned())
    }

    fn write(
        &self,
        namespace: &str,
        path: &str,
        content: &Value,
        version_tag: Option<&str>,
    ) -> Result<bool, StoreError> {
        let version = self.next_version();
        let mut namespaces = self
            .namespaces
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entries = namespaces.entry(namespace.to_owned()).or_default();
        if let Some(expected) = version_tag {
            let current = entries.get(path).map(|stored| stored.version_tag.as_str());
            if current != Some(expected) {
                return Ok(false);
            }
        }
        entries.insert(
            path.to_owned(),
            StoredContent {
                content: content.clone(),
                version_tag: version,
            },
        );
        Ok(true)
    }

    fn delete(&self, namespace: &str, path: &str, version_tag: &str) -> Result<bool, StoreError> {
        let mut namespaces = self
            .namespaces
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(entries) = namespaces.get_mut(namespace) else {
            return Ok(false);
        };
        match entries.get(path) {
            Some(stored) if stored.version_tag == version_tag => {
                entries.remove(path);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn list(&self, namespace: &str, dir_path: &str) -> Result<Vec<DirEntry>, StoreError> {
        let namespaces = self
            .namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(entries) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let prefix = if dir_path.is_empty() {
            String::new()
        } else {
            format!("{}/", dir_path.trim_end_matches('/'))
        };

        let mut listed: Vec<DirEntry> = Vec::new();
        for path in entries.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                None => listed.push(DirEntry {
                    name: rest.to_owned(),
                    kind: EntryKind::File,
                }),
                Some((dir, _)) => {
                    let entry = DirEntry {
                        name: dir.to_owned(),
                        kind: EntryKind::Directory,
                    };
                    if !listed.contains(&entry) {
                        listed.push(entry);
                    }
                }
            }
        }
        Ok(listed)
    }
}

/// A backend wrapper that fails every call.
///
/// Test collaborator for the degraded-edge behavior: resolution over a
/// failing backend must treat each edge as "not found here", never abort.
#[derive(Debug, Default)]
pub struct FailingStore;

impl StorageBackend for FailingStore {
    fn read(&self, _namespace: &str, _path: &str) -> Result<Option<StoredContent>, StoreError> {
        Err(StoreError::Backend("simulated outage".to_owned()))
    }

    fn write(
        &self,
        _namespace: &str,
        _path: &str,
        _content: &Value,
        _version_tag: Option<&str>,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Backend("simulated outage".to_owned()))
    }

    fn delete(
        &self,
        _namespace: &str,
        _path: &str,
        _version_tag: &str,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Backend("simulated outage".to_owned()))
    }

    fn list(&self, _namespace: &str, _dir_path: &str) -> Result<Vec<DirEntry>, StoreError> {
        Err(StoreError::Backend("simulated outage".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn read_back_what_was_written() {
        let store = MemoryStore::new();
        let written = store
            .write("user1", "concepts/x.json", &json!({ "id": "x" }), None)
            .expect("write succeeds");
        assert!(written);
        let stored = store
            .read("user1", "concepts/x.json")
            .expect("read succeeds")
            .expect("entry exists");
        assert_eq!(stored.content, json!({ "id": "x" }));
    }

    #[test]
    fn exists_at_follows_the_path_convention() {
        let store = MemoryStore::new();
        store
            .write("user1", "concepts/x.json", &json!({}), None)
            .expect("write succeeds");
        let exists = store
            .exists_at("user1", &TypeTag::concept(), "x")
            .expect("existence check succeeds");
        assert!(exists);
        let missing = store
            .exists_at("user1", &TypeTag::concept(), "y")
            .expect("existence check succeeds");
        assert!(!missing);
    }

    #[test]
    fn stale_version_guard_rejects_the_write() {
        let store = MemoryStore::new();
        store
            .write("user1", "concepts/x.json", &json!(1), None)
            .expect("write succeeds");
        let applied = store
            .write("user1", "concepts/x.json", &json!(2), Some("v999"))
            .expect("guarded write runs");
        assert!(!applied);
    }

    #[test]
    fn delete_requires_the_current_version() {
        let store = MemoryStore::new();
        store
            .write("user1", "concepts/x.json", &json!(1), None)
            .expect("write succeeds");
        let stored = store
            .read("user1", "concepts/x.json")
            .expect("read succeeds")
            .expect("entry exists");
        assert!(!store
            .delete("user1", "concepts/x.json", "v999")
            .expect("guarded delete runs"));
        assert!(store
            .delete("user1", "concepts/x.json", &stored.version_tag)
            .expect("guarded delete runs"));
    }

    #[test]
    fn list_separates_files_and_directories() {
        let store = MemoryStore::new();
        store
            .write("user1", "resolvers/a.json", &json!({}), None)
            .expect("write succeeds");
        store
            .write("user1", "resolvers/b.json", &json!({}), None)
            .expect("write succeeds");
        store
            .write("user1", "resolvers/archive/c.json", &json!({}), None)
            .expect("write succeeds");
        let entries = store.list("user1", "resolvers").expect("list succeeds");
        let files: Vec<_> = entries
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .map(|e| e.name.as_str())
            .collect();
        let dirs: Vec<_> = entries
            .iter()
            .filter(|e| e.kind == EntryKind::Directory)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(files, ["a.json", "b.json"]);
        assert_eq!(dirs, ["archive"]);
    }
}
