//! Resolver records — persisted edges of the namespace graph.
//!
//! A record declares that references unresolved in `source_namespace` may
//! be retried in `target_namespace`. Records are persisted one JSON file
//! per record under `resolvers/` in the source namespace and loaded into
//! the resolver's in-memory adjacency map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{EntryKind, StorageBackend, StoreError};

/// A directed edge in the namespace graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverRecord {
    /// Record identifier, stable per `(source, target)` pair.
    pub id: String,
    /// Namespace the unresolved reference was rooted in.
    pub source_namespace: String,
    /// Namespace to retry the reference in.
    pub target_namespace: String,
    /// How the target resolves references (free-form, `fallback` by
    /// default).
    pub resolution_method: String,
    /// When the record was created.
    pub date_created: DateTime<Utc>,
    /// Optional human-readable note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ResolverRecord {
    /// Creates a `fallback` edge from `source` to `target`.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("resolver-{source}-to-{target}"),
            source_namespace: source,
            target_namespace: target,
            resolution_method: "fallback".to_owned(),
            date_created: Utc::now(),
            description: None,
        }
    }

    /// Overrides the resolution method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.resolution_method = method.into();
        self
    }

    /// Attaches a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Storage path of this record in its source namespace.
    #[must_use]
    pub fn storage_path(&self) -> String {
        format!("resolvers/{}.json", self.id)
    }
}

/// Persists a record into its source namespace.
///
/// Returns `false` when the backend rejected the write.
///
/// # Errors
///
/// Returns [`StoreError`] when the backend cannot complete the write.
pub fn save_record<S: StorageBackend>(store: &S, record: &ResolverRecord) -> Result<bool, StoreError> {
    let content = serde_json::to_value(record).map_err(|source| StoreError::Corrupt {
        path: record.storage_path(),
        source,
    })?;
    store.write(
        &record.source_namespace,
        &record.storage_path(),
        &content,
        None,
    )
}

/// Loads every resolver record persisted under `resolvers/` in a
/// namespace.
///
/// # Errors
///
/// Returns [`StoreError::Corrupt`] when a record file does not parse —
/// damaged resolver state is surfaced, not skipped — and other
/// [`StoreError`] values when the backend cannot answer.
pub fn load_records<S: StorageBackend>(
    store: &S,
    namespace: &str,
) -> Result<Vec<ResolverRecord>, StoreError> {
    let mut records = Vec::new();
    for entry in store.list(namespace, "resolvers")? {
        if entry.kind != EntryKind::File || !entry.name.ends_with(".json") {
            continue;
        }
        let path = format!("resolvers/{}", entry.name);
        let Some(stored) = store.read(namespace, &path)? else {
            continue;
        };
        let record: ResolverRecord = serde_json::from_value(stored.content)
            .map_err(|source| StoreError::Corrupt { path, source })?;
        records.push(record);
    }
    Ok(records)
}
