//! The UOR object model.
//!
//! Every concrete object type satisfies one shallow capability interface,
//! [`UorObject`]: canonical representation, prime decomposition, coherence,
//! frame transforms, serialization, and structural validation. Types
//! compose an [`ObjectCore`] (identity, type tag, observer frame, metadata,
//! and the memoization caches) with their own typed payload rather than
//! inheriting from each other.
//!
//! The canonical representation and prime decomposition are computed from
//! the payload, memoized, and recomputed after any mutation — a setter
//! calls [`ObjectCore::touch`], which takes the caches and bumps the
//! `updatedAt` timestamp. Both are observer-frame-invariant: changing the
//! frame replaces only the frame pointer.
//!
//! # Lifecycle
//!
//! ```text
//! constructed → computed on demand (memoized) → mutated → recomputed
//!             → serialized → deserialized → frame-transformed
//! ```

mod serialized;

pub use serialized::SerializedFormError;
pub(crate) use serialized::{
    data_section, optional_date, optional_f64, optional_str, require_object, require_str,
    str_list,
};

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::canonical::{canonical_string, CanonicalPolicy};
use crate::coherence::CoherenceMeasure;
use crate::frame::{default_frame, ObserverFrame};
use crate::prime::{DecompositionBuilder, PrimeDecomposition, PrimeFactor};

/// Open type discriminator for UOR objects.
///
/// The well-known tags cover the types this engine ships concrete
/// implementations or storage conventions for; arbitrary tags are valid so
/// new types can participate without touching the canonicalizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    /// Creates a tag from an arbitrary type name.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The `concept` type.
    #[must_use]
    pub fn concept() -> Self {
        Self::new("concept")
    }

    /// The `resource` type.
    #[must_use]
    pub fn resource() -> Self {
        Self::new("resource")
    }

    /// The `topic` type.
    #[must_use]
    pub fn topic() -> Self {
        Self::new("topic")
    }

    /// The `predicate` type.
    #[must_use]
    pub fn predicate() -> Self {
        Self::new("predicate")
    }

    /// The `resolver` type.
    #[must_use]
    pub fn resolver() -> Self {
        Self::new("resolver")
    }

    /// The `media` type.
    #[must_use]
    pub fn media() -> Self {
        Self::new("media")
    }

    /// The `identity` type.
    #[must_use]
    pub fn identity() -> Self {
        Self::new("identity")
    }

    /// The `message` type.
    #[must_use]
    pub fn message() -> Self {
        Self::new("message")
    }

    /// The `thread` type.
    #[must_use]
    pub fn thread() -> Self {
        Self::new("thread")
    }

    /// The `subscription` type.
    #[must_use]
    pub fn subscription() -> Self {
        Self::new("subscription")
    }

    /// The `event` type.
    #[must_use]
    pub fn event() -> Self {
        Self::new("event")
    }

    /// The `channel` type.
    #[must_use]
    pub fn channel() -> Self {
        Self::new("channel")
    }

    /// The `schema` type.
    #[must_use]
    pub fn schema() -> Self {
        Self::new("schema")
    }

    /// The tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Plural form used by the storage path convention
    /// (`<plural>/<id>.json`).
    ///
    /// The well-known types use the fixed table; unknown tags fall back to
    /// a naive `s` suffix.
    #[must_use]
    pub fn plural(&self) -> String {
        match self.0.as_str() {
            "concept" => "concepts".to_owned(),
            "resource" => "resources".to_owned(),
            "topic" => "topics".to_owned(),
            "predicate" => "predicates".to_owned(),
            "resolver" => "resolvers".to_owned(),
            "event" => "events".to_owned(),
            "channel" => "channels".to_owned(),
            "subscription" => "subscriptions".to_owned(),
            "identity" => "identities".to_owned(),
            "message" => "messages".to_owned(),
            "thread" => "threads".to_owned(),
            "media" => "media".to_owned(),
            "schema" => "schemas".to_owned(),
            other => format!("{other}s"),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Timestamps and optional authorship carried by every object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the most recent mutation.
    pub updated_at: DateTime<Utc>,
    /// Optional author tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Optional version tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ObjectMetadata {
    /// Fresh metadata with both timestamps set to now.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            author: None,
            version: None,
        }
    }

    /// Records a mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for ObjectMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// The unique normal form of an object's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRepresentation {
    /// Serialization format of `content` (always `json` here).
    pub format: String,
    /// Compact canonical JSON string of the payload.
    pub content: String,
    /// Coherence value of the object at canonicalization time.
    pub coherence_norm: f64,
}

/// Identity, frame, metadata, and memoization caches shared by every
/// concrete object type.
#[derive(Debug)]
pub struct ObjectCore {
    id: String,
    type_tag: TypeTag,
    frame: Arc<ObserverFrame>,
    metadata: ObjectMetadata,
    canonical: OnceLock<CanonicalRepresentation>,
    decomposition: OnceLock<PrimeDecomposition>,
}

impl ObjectCore {
    /// Creates a core in the default objective frame.
    #[must_use]
    pub fn new(id: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            id: id.into(),
            type_tag,
            frame: default_frame(),
            metadata: ObjectMetadata::new(),
            canonical: OnceLock::new(),
            decomposition: OnceLock::new(),
        }
    }

    /// Object identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Type discriminator.
    #[must_use]
    pub fn type_tag(&self) -> &TypeTag {
        &self.type_tag
    }

    /// The frame this object is currently viewed through.
    #[must_use]
    pub fn frame(&self) -> &Arc<ObserverFrame> {
        &self.frame
    }

    /// Object metadata.
    #[must_use]
    pub fn metadata(&self) -> &ObjectMetadata {
        &self.metadata
    }

    /// Sets the author tag.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.metadata.author = Some(author.into());
        self
    }

    /// Replaces the observer frame.
    ///
    /// Canonical form and decomposition are frame-invariant, so the
    /// memoization caches survive a frame change.
    pub fn set_frame(&mut self, frame: Arc<ObserverFrame>) {
        self.frame = frame;
    }

    /// Records a data mutation: takes both caches so the canonical form
    /// and decomposition are recomputed on next access, and bumps the
    /// `updatedAt` timestamp.
    pub fn touch(&mut self) {
        self.canonical.take();
        self.decomposition.take();
        self.metadata.touch();
    }

    /// Memoization slot for the canonical representation.
    pub(crate) fn canonical_cache(&self) -> &OnceLock<CanonicalRepresentation> {
        &self.canonical
    }

    /// Memoization slot for the prime decomposition.
    pub(crate) fn decomposition_cache(&self) -> &OnceLock<PrimeDecomposition> {
        &self.decomposition
    }

    /// Reconstructs a core from a serialized object record and returns it
    /// together with the record's `data` section.
    ///
    /// The serialized `observerFrame` and `metadata` sections are restored
    /// when present; the persisted canonical form and decomposition are
    /// deliberately not restored — both are recomputed from the data, which
    /// is what keeps the uniqueness invariant trustworthy.
    ///
    /// # Errors
    ///
    /// Returns [`SerializedFormError`] when the value is not an object,
    /// lacks `id`, carries a different `type` than `expected`, or has a
    /// malformed frame or metadata section.
    pub fn from_serialized(
        value: &Value,
        expected: &TypeTag,
    ) -> Result<(Self, Map<String, Value>), SerializedFormError> {
        let record = require_object(value)?;
        let id = require_str(record, "id")?;
        let found = require_str(record, "type")?;
        if found != expected.as_str() {
            return Err(SerializedFormError::TypeMismatch {
                expected: expected.as_str().to_owned(),
                found: found.to_owned(),
            });
        }

        let frame = match record.get("observerFrame") {
            Some(section) => serde_json::from_value::<ObserverFrame>(section.clone())
                .map_err(|source| SerializedFormError::Malformed {
                    section: "observerFrame",
                    source,
                })?
                .shared(),
            None => default_frame(),
        };

        let metadata = match record.get("metadata") {
            Some(section) => serde_json::from_value::<ObjectMetadata>(section.clone()).map_err(
                |source| SerializedFormError::Malformed {
                    section: "metadata",
                    source,
                },
            )?,
            None => ObjectMetadata::new(),
        };

        let core = Self {
            id: id.to_owned(),
            type_tag: expected.clone(),
            frame,
            metadata,
            canonical: OnceLock::new(),
            decomposition: OnceLock::new(),
        };
        Ok((core, data_section(record)?))
    }
}

impl Clone for ObjectCore {
    /// Clones identity, frame pointer, and metadata with fresh caches;
    /// the clone recomputes its canonical form and decomposition on first
    /// access.
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            type_tag: self.type_tag.clone(),
            frame: Arc::clone(&self.frame),
            metadata: self.metadata.clone(),
            canonical: OnceLock::new(),
            decomposition: OnceLock::new(),
        }
    }
}

impl PartialEq for ObjectCore {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.type_tag == other.type_tag
            && self.frame == other.frame
            && self.metadata == other.metadata
    }
}

/// Capability set every concrete UOR object type satisfies.
///
/// Required methods cover what only the concrete type knows: its core,
/// its payload, how the payload decomposes, its coherence weight table,
/// and what makes it structurally valid. Everything else — canonical
/// representation, decomposition assembly, memoization, frame transforms,
/// serialization — is provided.
pub trait UorObject: Sized {
    /// Shared identity/frame/metadata state.
    fn core(&self) -> &ObjectCore;

    /// Mutable access to the shared state (setters call
    /// [`ObjectCore::touch`] through this).
    fn core_mut(&mut self) -> &mut ObjectCore;

    /// The type-specific data fields as a JSON tree.
    ///
    /// This is the input to canonicalization and the `data` section of the
    /// serialized form.
    fn payload(&self) -> Value;

    /// Emits the factors derived from this object's data.
    fn derive_factors(&self, builder: &mut DecompositionBuilder);

    /// Measures completeness against this type's weight table.
    ///
    /// Pure; must not mutate the object. The result value is in `[0, 1]`.
    fn measure_coherence(&self) -> CoherenceMeasure;

    /// Structural validity of required identity fields.
    ///
    /// Returns `false` — never panics, never errors — when required fields
    /// are missing or inconsistent. A data-quality signal, not control
    /// flow.
    fn validate(&self) -> bool;

    /// Array-ordering policy for this type's payload.
    fn canonical_policy(&self) -> CanonicalPolicy {
        CanonicalPolicy::new()
    }

    /// The factors intrinsic to this object independent of its data.
    ///
    /// At minimum the core identity factor; types may add type-marker
    /// factors.
    fn intrinsic_primes(&self) -> Vec<PrimeFactor> {
        vec![PrimeFactor::core(
            self.core().type_tag().as_str(),
            self.core().id(),
        )]
    }

    /// Object identifier.
    fn id(&self) -> &str {
        self.core().id()
    }

    /// Type discriminator.
    fn type_tag(&self) -> &TypeTag {
        self.core().type_tag()
    }

    /// The frame this object is currently viewed through.
    fn observer_frame(&self) -> &Arc<ObserverFrame> {
        self.core().frame()
    }

    /// Object metadata.
    fn metadata(&self) -> &ObjectMetadata {
        self.core().metadata()
    }

    /// Attaches a different observer frame in place.
    fn set_observer_frame(&mut self, frame: Arc<ObserverFrame>) {
        self.core_mut().set_frame(frame);
    }

    /// Computes (and memoizes) the canonical representation.
    ///
    /// Identical for structurally equal payloads regardless of key order,
    /// defaulted null fields, or unordered-collection order.
    fn compute_canonical_representation(&self) -> CanonicalRepresentation {
        self.core()
            .canonical_cache()
            .get_or_init(|| CanonicalRepresentation {
                format: "json".to_owned(),
                content: canonical_string(&self.payload(), &self.canonical_policy()),
                coherence_norm: self.measure_coherence().value,
            })
            .clone()
    }

    /// Computes (and memoizes) the prime decomposition.
    ///
    /// Non-empty for every object: the core identity factor is always
    /// present.
    fn compute_prime_decomposition(&self) -> PrimeDecomposition {
        self.core()
            .decomposition_cache()
            .get_or_init(|| {
                let mut builder =
                    DecompositionBuilder::new(self.type_tag().as_str(), self.core().id());
                for factor in self.intrinsic_primes() {
                    builder.push(factor);
                }
                self.derive_factors(&mut builder);
                builder.finish()
            })
            .clone()
    }

    /// Produces a new instance of the same type and data viewed through
    /// `frame`.
    ///
    /// The original is untouched. The new instance's canonical
    /// representation and decomposition, recomputed from the same data,
    /// equal the original's — only frame-variant metadata differs.
    #[must_use]
    fn transform_to_frame(&self, frame: Arc<ObserverFrame>) -> Self
    where
        Self: Clone,
    {
        let mut transformed = self.clone();
        transformed.core_mut().set_frame(frame);
        transformed
    }

    /// Serializes the full record to a plain JSON object.
    ///
    /// Upper layers marshal this form directly; consumers never need the
    /// canonicalization machinery. The matching `from_serialized`
    /// constructor on each concrete type round-trips losslessly.
    fn serialize(&self) -> Value {
        let mut record = Map::new();
        record.insert("id".to_owned(), json!(self.id()));
        record.insert("type".to_owned(), json!(self.type_tag().as_str()));
        record.insert(
            "canonicalRepresentation".to_owned(),
            json!(self.compute_canonical_representation()),
        );
        record.insert(
            "primeDecomposition".to_owned(),
            json!(self.compute_prime_decomposition()),
        );
        record.insert(
            "observerFrame".to_owned(),
            json!(self.observer_frame().as_ref()),
        );
        record.insert("metadata".to_owned(), json!(self.metadata()));
        record.insert("data".to_owned(), self.payload());
        Value::Object(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plural_table_covers_the_storage_convention() {
        assert_eq!(TypeTag::concept().plural(), "concepts");
        assert_eq!(TypeTag::resolver().plural(), "resolvers");
        assert_eq!(TypeTag::identity().plural(), "identities");
        assert_eq!(TypeTag::media().plural(), "media");
        assert_eq!(TypeTag::new("widget").plural(), "widgets");
    }

    #[test]
    fn type_tag_is_open_for_extension() {
        let tag = TypeTag::new("annotation");
        assert_eq!(tag.as_str(), "annotation");
        assert_eq!(serde_json::json!(tag), "annotation");
    }

    #[test]
    fn touch_bumps_updated_at() {
        let mut core = ObjectCore::new("x-1", TypeTag::concept());
        let before = core.metadata().updated_at;
        core.touch();
        assert!(core.metadata().updated_at >= before);
        assert!(core.metadata().created_at <= core.metadata().updated_at);
    }

    #[test]
    fn clone_shares_the_frame_pointer() {
        let core = ObjectCore::new("x-1", TypeTag::topic());
        let cloned = core.clone();
        assert!(Arc::ptr_eq(core.frame(), cloned.frame()));
        assert_eq!(core, cloned);
    }

    #[test]
    fn from_serialized_rejects_type_mismatch() {
        let record = json!({ "id": "x-1", "type": "resource" });
        let err = ObjectCore::from_serialized(&record, &TypeTag::concept());
        assert!(matches!(
            err,
            Err(SerializedFormError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn from_serialized_defaults_frame_and_metadata() {
        let record = json!({ "id": "x-1", "type": "concept" });
        let (core, data) = ObjectCore::from_serialized(&record, &TypeTag::concept())
            .expect("minimal record must parse");
        assert_eq!(core.id(), "x-1");
        assert_eq!(core.frame().perspective, crate::frame::Perspective::Objective);
        assert!(data.is_empty());
    }
}
