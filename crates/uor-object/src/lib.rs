//! Universal Object Reference (UOR) — the object engine.
//!
//! A UOR object is a content-addressed, canonicalized record: however its
//! source data was keyed, nested, or ordered, it reduces to one unique
//! representation, and it decomposes into a set of deterministically
//! identified prime factors that is identical for semantically identical
//! content.
//!
//! # Pipeline
//!
//! ```text
//! construct/load → canonical form → prime decomposition → coherence
//!                → (frame transform) → serialize ⇄ deserialize
//! ```
//!
//! - [`canonical`] — key-sorted, policy-driven normal form of a JSON tree.
//! - [`prime`] — decomposition into atomic factors with stable identifiers.
//! - [`coherence`] — bounded `[0, 1]` completeness score.
//! - [`frame`] — observer frames and the declarative invariant contract.
//! - [`object`] — the [`UorObject`] capability set and [`ObjectCore`].
//! - [`types`] — the concrete object family (concept, message, identity, …).
//!
//! # Example
//!
//! ```
//! use uor_object::prelude::*;
//!
//! let a = Concept::new("c-1", "Graph", "Vertices and edges")
//!     .with_tags(&["math", "structure"]);
//! let b = Concept::new("c-1", "Graph", "Vertices and edges")
//!     .with_tags(&["structure", "math"]);
//!
//! // Same semantic content, same canonical form, same factor set.
//! assert_eq!(
//!     a.compute_canonical_representation().content,
//!     b.compute_canonical_representation().content
//! );
//! assert_eq!(
//!     a.compute_prime_decomposition().sorted_factor_ids(),
//!     b.compute_prime_decomposition().sorted_factor_ids()
//! );
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod canonical;
pub mod coherence;
pub mod frame;
pub mod object;
pub mod prime;
pub mod types;

pub use canonical::{canonical_string, canonicalize, CanonicalPolicy};
pub use coherence::{CoherenceMeasure, CoherenceScore, Normalization};
pub use frame::{check_invariants, default_frame, ObserverFrame, Perspective};
pub use object::{
    CanonicalRepresentation, ObjectCore, ObjectMetadata, SerializedFormError, TypeTag, UorObject,
};
pub use prime::{DecompositionBuilder, PrimeDecomposition, PrimeFactor};
pub use types::{
    Channel, ChannelVisibility, Concept, DataObject, Event, Identity, Message, MessageStatus,
    Predicate, Resource, Subscription, Thread, Topic,
};

/// Prelude module for convenient imports.
///
/// ```
/// use uor_object::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canonical::{canonical_string, canonicalize, CanonicalPolicy};
    pub use crate::coherence::{CoherenceMeasure, CoherenceScore, Normalization};
    pub use crate::frame::{check_invariants, default_frame, ObserverFrame, Perspective};
    pub use crate::object::{
        CanonicalRepresentation, ObjectCore, ObjectMetadata, SerializedFormError, TypeTag,
        UorObject,
    };
    pub use crate::prime::{DecompositionBuilder, PrimeDecomposition, PrimeFactor};
    pub use crate::types::{
        Channel, ChannelVisibility, Concept, DataObject, Event, Identity, Message,
        MessageStatus, Predicate, Resource, Subscription, Thread, Topic,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use serde_json::json;

    #[test]
    fn every_object_has_a_nonempty_decomposition() {
        let concept = Concept::new("c-1", "Graph", "");
        let message = Message::new("m-1", "alice", &["bob"], "hi");
        let generic = DataObject::new("x-1", TypeTag::new("test"), json!({}));
        assert!(!concept.compute_prime_decomposition().is_empty());
        assert!(!message.compute_prime_decomposition().is_empty());
        assert!(!generic.compute_prime_decomposition().is_empty());
    }

    #[test]
    fn coherence_is_bounded_for_every_type() {
        let objects: Vec<f64> = vec![
            Concept::new("c-1", "Graph", "x").measure_coherence().value,
            Resource::new("r-1", "Paper", "x").measure_coherence().value,
            Topic::new("t-1", "Storage", "x").measure_coherence().value,
            Identity::new("i-1", "github", "octocat")
                .verified()
                .measure_coherence()
                .value,
            Message::new("m-1", "alice", &["bob"], "hi")
                .measure_coherence()
                .value,
        ];
        for value in objects {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn frame_transform_preserves_canonical_form() {
        let concept = Concept::new("c-1", "Graph", "Vertices and edges").with_tags(&["math"]);
        let frame = ObserverFrame::new("frame:review", Perspective::Subjective)
            .with_invariants(&["id", "canonicalRepresentation"])
            .shared();
        let transformed = concept.transform_to_frame(frame.clone());
        assert_eq!(transformed.observer_frame().id, "frame:review");
        assert_eq!(
            concept.compute_canonical_representation().content,
            transformed.compute_canonical_representation().content
        );
        assert_eq!(
            concept.compute_prime_decomposition().sorted_factor_ids(),
            transformed.compute_prime_decomposition().sorted_factor_ids()
        );
        // Original untouched.
        assert_eq!(concept.observer_frame().id, "frame:objective");
    }
}
