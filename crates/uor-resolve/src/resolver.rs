//! Cross-namespace resolution — the cached namespace-graph walk.
//!
//! A reference that cannot be found in its source namespace may still be
//! resolvable through resolver records: directed edges declaring that
//! namespace A's unresolved references may be retried in namespace B. The
//! resolver walks those edges depth-first, one at a time, first successful
//! resolution wins — there is no search for a "best" path, and persisted
//! edge order is authoritative.
//!
//! Failure handling is deliberately soft. A backend error on one edge
//! means "not resolvable via this edge" and the walk continues; a cycle or
//! an exhausted depth budget is a normal unresolved outcome, never an
//! error. The only hard failure in this module's orbit is a malformed
//! reference string, which fails at parse time before a walk begins.
//!
//! Successful resolutions are cached with a TTL. Adding a resolver record
//! conservatively drops every cache entry that mentions the record's
//! source or target namespace — correctness over hit rate.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::record::{load_records, save_record, ResolverRecord};
use crate::reference::UorReference;
use crate::store::{StorageBackend, StoreError};

/// Default maximum number of edges a walk may follow.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Default lifetime of a cached resolution.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Per-call resolution options.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Maximum number of edges to follow before giving up.
    pub max_depth: usize,
    /// Skip the resolution cache for this call.
    pub bypass_cache: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            bypass_cache: false,
        }
    }
}

impl ResolveOptions {
    /// Overrides the depth budget.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Skips the cache for this call.
    #[must_use]
    pub fn bypassing_cache(mut self) -> Self {
        self.bypass_cache = true;
        self
    }
}

/// One edge followed during a walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStep {
    /// Namespace the edge left from.
    pub from: String,
    /// Namespace the edge led to.
    pub to: String,
    /// Id of the resolver record that supplied the edge.
    pub via: String,
    /// When the edge was followed.
    pub timestamp: DateTime<Utc>,
}

/// The route a resolution took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionPath {
    /// Edges followed, in order. Empty for a direct hit in the source
    /// namespace and for unresolved outcomes.
    pub steps: Vec<PathStep>,
    /// Whether the reference was resolved.
    pub resolved: bool,
}

/// The outcome of a resolution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// The reference rebased onto the namespace that holds the object, or
    /// `None` when unresolved.
    pub resolved_reference: Option<UorReference>,
    /// The route taken.
    pub path: ResolutionPath,
}

impl Resolution {
    fn unresolved() -> Self {
        Self {
            resolved_reference: None,
            path: ResolutionPath {
                steps: Vec::new(),
                resolved: false,
            },
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    resolution: Resolution,
    cached_at: Instant,
}

/// Resolves references across namespaces over a storage backend.
///
/// Owns two caches: loaded resolver records per namespace, and a
/// TTL-bounded cache of successful resolutions. Concurrent callers each
/// hold their own resolver (or serialize access to one); two callers
/// racing the same miss both walk and the last write wins — the outcome
/// is idempotent, so no locking is required.
#[derive(Debug)]
pub struct NamespaceResolver<S> {
    store: S,
    records: BTreeMap<String, Vec<ResolverRecord>>,
    resolutions: BTreeMap<String, CacheEntry>,
    cache_ttl: Duration,
}

impl<S: StorageBackend> NamespaceResolver<S> {
    /// Creates a resolver over the given backend with the default TTL.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            records: BTreeMap::new(),
            resolutions: BTreeMap::new(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Overrides the resolution-cache TTL.
    #[must_use]
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// The underlying storage backend.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of live cached resolutions.
    #[must_use]
    pub fn cached_resolutions(&self) -> usize {
        self.resolutions.len()
    }

    /// Resolves a reference string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ReferenceParseError`] when the string is
    /// malformed. Every other failure mode is a normal unresolved
    /// [`Resolution`].
    pub fn resolve(
        &mut self,
        reference: &str,
        options: &ResolveOptions,
    ) -> Result<Resolution, crate::ReferenceParseError> {
        let parsed = UorReference::parse(reference)?;
        Ok(self.resolve_across_namespaces(&parsed, options))
    }

    /// Resolves a parsed reference across namespaces.
    ///
    /// Checks the cache (unless bypassed), then the source namespace
    /// directly, then walks resolver edges depth-first with a cycle guard
    /// and the `max_depth` budget. Unresolvable references produce
    /// `resolved_reference: None` — never an error.
    pub fn resolve_across_namespaces(
        &mut self,
        reference: &UorReference,
        options: &ResolveOptions,
    ) -> Resolution {
        let key = reference.to_string();

        if !options.bypass_cache {
            if let Some(entry) = self.resolutions.get(&key) {
                if entry.cached_at.elapsed() < self.cache_ttl {
                    debug!(reference = %key, "resolution cache hit");
                    return entry.resolution.clone();
                }
                debug!(reference = %key, "cached resolution expired");
                self.resolutions.remove(&key);
            }
        }

        debug!(reference = %key, max_depth = options.max_depth, "resolving across namespaces");

        // Direct hit in the source namespace needs no path.
        if self.exists_in(&reference.namespace, reference) {
            let resolution = Resolution {
                resolved_reference: Some(reference.clone()),
                path: ResolutionPath {
                    steps: Vec::new(),
                    resolved: true,
                },
            };
            self.remember(key, &resolution);
            return resolution;
        }

        let mut visited = BTreeSet::new();
        visited.insert(reference.namespace.clone());
        let mut steps = Vec::new();

        match self.walk(
            reference,
            &reference.namespace,
            options.max_depth,
            &mut visited,
            &mut steps,
        ) {
            Some(resolved) => {
                let resolution = Resolution {
                    resolved_reference: Some(resolved),
                    path: ResolutionPath {
                        steps,
                        resolved: true,
                    },
                };
                self.remember(key, &resolution);
                resolution
            }
            None => {
                debug!(reference = %key, "unresolved: edges exhausted or depth bound hit");
                Resolution::unresolved()
            }
        }
    }

    /// Persists a new resolver record and folds it into the live graph.
    ///
    /// Every cached resolution whose reference, resolved reference, or
    /// path mentions the record's source or target namespace is dropped —
    /// deliberate over-invalidation so stale routes never survive a graph
    /// change.
    ///
    /// Returns `false` when the backend rejected the write.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record cannot be persisted.
    pub fn add_resolver_record(&mut self, record: ResolverRecord) -> Result<bool, StoreError> {
        if !save_record(&self.store, &record)? {
            return Ok(false);
        }
        let source = record.source_namespace.clone();
        let target = record.target_namespace.clone();
        let edges = self.records.entry(source.clone()).or_default();
        edges.retain(|existing| existing.id != record.id);
        edges.push(record);
        self.invalidate_mentioning(&[source, target]);
        Ok(true)
    }

    /// Depth-first walk over resolver edges rooted at `from`.
    ///
    /// `visited` holds the namespaces on the current path (cycle guard);
    /// entries are removed on backtrack so alternate routes to the same
    /// namespace stay explorable. First successful resolution wins.
    fn walk(
        &mut self,
        reference: &UorReference,
        from: &str,
        remaining: usize,
        visited: &mut BTreeSet<String>,
        steps: &mut Vec<PathStep>,
    ) -> Option<UorReference> {
        if remaining == 0 {
            debug!(namespace = from, "depth budget exhausted");
            return None;
        }

        for record in self.records_for(from) {
            let target = record.target_namespace.clone();
            if !visited.insert(target.clone()) {
                debug!(namespace = %target, "cycle guard: already on the current path");
                continue;
            }

            steps.push(PathStep {
                from: from.to_owned(),
                to: target.clone(),
                via: record.id.clone(),
                timestamp: Utc::now(),
            });

            if self.exists_in(&target, reference) {
                return Some(reference.in_namespace(&target));
            }
            if let Some(found) = self.walk(reference, &target, remaining - 1, visited, steps) {
                return Some(found);
            }

            steps.pop();
            visited.remove(&target);
        }
        None
    }

    /// Existence check with the degraded-edge contract: a backend failure
    /// reads as "not found here" and the walk moves on.
    fn exists_in(&self, namespace: &str, reference: &UorReference) -> bool {
        match self
            .store
            .exists_at(namespace, &reference.type_tag, &reference.id)
        {
            Ok(found) => found,
            Err(error) => {
                warn!(
                    namespace,
                    reference = %reference,
                    error = %error,
                    "existence check failed; treating as not found"
                );
                false
            }
        }
    }

    /// Resolver records for a namespace, loading and caching them on first
    /// use. A load failure degrades to an edgeless namespace.
    fn records_for(&mut self, namespace: &str) -> Vec<ResolverRecord> {
        if !self.records.contains_key(namespace) {
            let loaded = match load_records(&self.store, namespace) {
                Ok(records) => records,
                Err(error) => {
                    warn!(
                        namespace,
                        error = %error,
                        "failed to load resolver records; treating namespace as edgeless"
                    );
                    Vec::new()
                }
            };
            self.records.insert(namespace.to_owned(), loaded);
        }
        self.records.get(namespace).cloned().unwrap_or_default()
    }

    /// Caches a successful resolution. Unresolved outcomes are not cached:
    /// a record added later must be able to resolve them immediately.
    fn remember(&mut self, key: String, resolution: &Resolution) {
        self.resolutions.insert(
            key,
            CacheEntry {
                resolution: resolution.clone(),
                cached_at: Instant::now(),
            },
        );
    }

    /// Drops every cached resolution mentioning any of the namespaces.
    fn invalidate_mentioning(&mut self, namespaces: &[String]) {
        let before = self.resolutions.len();
        self.resolutions.retain(|key, entry| {
            !namespaces
                .iter()
                .any(|namespace| entry_mentions(key, entry, namespace))
        });
        let dropped = before - self.resolutions.len();
        if dropped > 0 {
            debug!(dropped, "invalidated cached resolutions after graph change");
        }
    }
}

/// True when a cache entry involves the namespace anywhere: the cached
/// reference itself, the resolved reference, or any step of the path.
fn entry_mentions(key: &str, entry: &CacheEntry, namespace: &str) -> bool {
    let in_reference = UorReference::parse(key)
        .map(|reference| reference.namespace == namespace)
        .unwrap_or(false);
    let in_resolved = entry
        .resolution
        .resolved_reference
        .as_ref()
        .is_some_and(|reference| reference.namespace == namespace);
    let in_path = entry
        .resolution
        .path
        .steps
        .iter()
        .any(|step| step.from == namespace || step.to == namespace);
    in_reference || in_resolved || in_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;
    use uor_object::TypeTag;

    fn seed_object(store: &MemoryStore, namespace: &str, id: &str) {
        store
            .write(
                namespace,
                &format!("concepts/{id}.json"),
                &json!({ "id": id, "type": "concept" }),
                None,
            )
            .expect("seed write succeeds");
    }

    fn reference(namespace: &str, id: &str) -> UorReference {
        UorReference::new(namespace, TypeTag::concept(), id)
    }

    #[test]
    fn direct_hit_has_an_empty_path() {
        let store = MemoryStore::new();
        seed_object(&store, "user1", "x");
        let mut resolver = NamespaceResolver::new(store);
        let resolution =
            resolver.resolve_across_namespaces(&reference("user1", "x"), &ResolveOptions::default());
        assert_eq!(
            resolution.resolved_reference,
            Some(reference("user1", "x"))
        );
        assert!(resolution.path.resolved);
        assert!(resolution.path.steps.is_empty());
    }

    #[test]
    fn one_hop_resolution_records_one_step() {
        let store = MemoryStore::new();
        seed_object(&store, "user2", "x");
        let mut resolver = NamespaceResolver::new(store);
        resolver
            .add_resolver_record(ResolverRecord::new("user1", "user2"))
            .expect("record persists");

        let resolution =
            resolver.resolve_across_namespaces(&reference("user1", "x"), &ResolveOptions::default());
        assert_eq!(
            resolution.resolved_reference,
            Some(reference("user2", "x"))
        );
        assert_eq!(resolution.path.steps.len(), 1);
        assert_eq!(resolution.path.steps[0].from, "user1");
        assert_eq!(resolution.path.steps[0].to, "user2");
        assert_eq!(resolution.path.steps[0].via, "resolver-user1-to-user2");
    }

    #[test]
    fn unresolved_outcome_is_not_an_error() {
        let store = MemoryStore::new();
        let mut resolver = NamespaceResolver::new(store);
        let resolution =
            resolver.resolve_across_namespaces(&reference("user1", "x"), &ResolveOptions::default());
        assert_eq!(resolution.resolved_reference, None);
        assert!(!resolution.path.resolved);
    }

    #[test]
    fn cycles_terminate_unresolved() {
        let store = MemoryStore::new();
        let mut resolver = NamespaceResolver::new(store);
        for (from, to) in [("a", "b"), ("b", "c"), ("c", "a")] {
            resolver
                .add_resolver_record(ResolverRecord::new(from, to))
                .expect("record persists");
        }
        let resolution =
            resolver.resolve_across_namespaces(&reference("a", "x"), &ResolveOptions::default());
        assert_eq!(resolution.resolved_reference, None);
        assert!(!resolution.path.resolved);
    }

    #[test]
    fn depth_budget_bounds_the_walk() {
        let store = MemoryStore::new();
        seed_object(&store, "n5", "x");
        let mut resolver = NamespaceResolver::new(store);
        for (from, to) in [("n0", "n1"), ("n1", "n2"), ("n2", "n3"), ("n3", "n4"), ("n4", "n5")] {
            resolver
                .add_resolver_record(ResolverRecord::new(from, to))
                .expect("record persists");
        }

        let shallow = resolver.resolve_across_namespaces(
            &reference("n0", "x"),
            &ResolveOptions::default().with_max_depth(2),
        );
        assert_eq!(shallow.resolved_reference, None);

        let deep = resolver
            .resolve_across_namespaces(&reference("n0", "x"), &ResolveOptions::default());
        assert_eq!(deep.resolved_reference, Some(reference("n5", "x")));
        assert_eq!(deep.path.steps.len(), 5);
    }

    #[test]
    fn cache_serves_repeat_resolutions() {
        let store = MemoryStore::new();
        seed_object(&store, "user1", "x");
        let mut resolver = NamespaceResolver::new(store);
        let first =
            resolver.resolve_across_namespaces(&reference("user1", "x"), &ResolveOptions::default());
        assert_eq!(resolver.cached_resolutions(), 1);
        let second =
            resolver.resolve_across_namespaces(&reference("user1", "x"), &ResolveOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let store = MemoryStore::new();
        seed_object(&store, "user1", "x");
        let mut resolver = NamespaceResolver::new(store).with_cache_ttl(Duration::ZERO);
        resolver.resolve_across_namespaces(&reference("user1", "x"), &ResolveOptions::default());
        // The expired entry is dropped on the next lookup, then repopulated.
        let resolution =
            resolver.resolve_across_namespaces(&reference("user1", "x"), &ResolveOptions::default());
        assert!(resolution.path.resolved);
    }

    #[test]
    fn new_record_invalidates_entries_mentioning_its_namespaces() {
        let store = MemoryStore::new();
        seed_object(&store, "user1", "x");
        let mut resolver = NamespaceResolver::new(store);
        resolver.resolve_across_namespaces(&reference("user1", "x"), &ResolveOptions::default());
        assert_eq!(resolver.cached_resolutions(), 1);

        resolver
            .add_resolver_record(ResolverRecord::new("user1", "user9"))
            .expect("record persists");
        assert_eq!(resolver.cached_resolutions(), 0);
    }

    #[test]
    fn unrelated_records_leave_the_cache_alone() {
        let store = MemoryStore::new();
        seed_object(&store, "user1", "x");
        let mut resolver = NamespaceResolver::new(store);
        resolver.resolve_across_namespaces(&reference("user1", "x"), &ResolveOptions::default());

        resolver
            .add_resolver_record(ResolverRecord::new("other1", "other2"))
            .expect("record persists");
        assert_eq!(resolver.cached_resolutions(), 1);
    }

    #[test]
    fn bypass_cache_walks_again() {
        let store = MemoryStore::new();
        seed_object(&store, "user1", "x");
        let mut resolver = NamespaceResolver::new(store);
        resolver.resolve_across_namespaces(&reference("user1", "x"), &ResolveOptions::default());
        let bypassed = resolver.resolve_across_namespaces(
            &reference("user1", "x"),
            &ResolveOptions::default().bypassing_cache(),
        );
        assert!(bypassed.path.resolved);
    }

    #[test]
    fn malformed_reference_strings_fail_at_parse() {
        let store = MemoryStore::new();
        let mut resolver = NamespaceResolver::new(store);
        assert!(resolver
            .resolve("not-a-reference", &ResolveOptions::default())
            .is_err());
    }
}
