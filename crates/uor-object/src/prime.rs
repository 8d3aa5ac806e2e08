//! Prime decomposition — irreducible semantic factors of an object.
//!
//! Every UOR object decomposes into a flat set of atomic, deterministically
//! identified factors. The decomposition of semantically identical content
//! is identical regardless of how the source data was ordered: factor
//! identifiers are built from `(domain, stable stringification of the
//! discriminating value)`, collection attributes contribute one factor per
//! element rather than one factor for the whole collection, and nested
//! values are key-sorted before they are folded into an identifier.
//!
//! Decomposition is a pure projection of existing state and cannot fail.
//! It is recomputed whenever source data mutates; persisted copies are
//! never trusted.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use uor_object::prime::DecompositionBuilder;
//!
//! let mut builder = DecompositionBuilder::new("concept", "concept-1");
//! builder.elements("tags", &[json!("b"), json!("a")]);
//! let decomposition = builder.finish();
//!
//! // Core identity factor plus one factor per tag.
//! assert_eq!(decomposition.len(), 3);
//! assert!(decomposition.contains("concept:concept-1"));
//! assert!(decomposition.contains("concept.tags:a"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::canonical::stable_string;

/// Decomposition algorithm name for the standard per-attribute shape.
pub const ATTRIBUTE_DECOMPOSITION: &str = "attribute-decomposition";

/// An atomic, deterministically identified semantic unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimeFactor {
    /// Deterministic identifier: `<domain>:<stable value string>`.
    pub id: String,
    /// The discriminating value this factor carries.
    pub value: Value,
    /// Semantic domain of the factor (e.g., `message.recipients`).
    pub domain: String,
}

impl PrimeFactor {
    /// Creates the core identity factor for an object.
    ///
    /// Present in every decomposition; guarantees non-emptiness.
    #[must_use]
    pub fn core(domain: &str, object_id: &str) -> Self {
        Self {
            id: format!("{domain}:{object_id}"),
            value: Value::String(object_id.to_owned()),
            domain: domain.to_owned(),
        }
    }

    /// Creates a factor from a domain and its discriminating value.
    #[must_use]
    pub fn derived(domain: &str, value: &Value) -> Self {
        Self {
            id: factor_id(domain, value),
            value: value.clone(),
            domain: domain.to_owned(),
        }
    }
}

/// Builds the deterministic identifier for a factor.
///
/// Plain strings fold in unquoted; every other value is stringified with
/// key-sorted compact JSON, so nested reordering does not change identity.
#[must_use]
pub fn factor_id(domain: &str, value: &Value) -> String {
    format!("{domain}:{}", stable_string(value))
}

/// The complete prime decomposition of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimeDecomposition {
    /// All factors, core identity factor first.
    pub prime_factors: Vec<PrimeFactor>,
    /// Name of the algorithm that produced this decomposition.
    pub decomposition_method: String,
}

impl PrimeDecomposition {
    /// Number of factors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prime_factors.len()
    }

    /// True when the decomposition has no factors.
    ///
    /// Never the case for a decomposition built through
    /// [`DecompositionBuilder`], which always seeds the core factor.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prime_factors.is_empty()
    }

    /// True when a factor with the given id is present.
    #[must_use]
    pub fn contains(&self, factor_id: &str) -> bool {
        self.prime_factors.iter().any(|f| f.id == factor_id)
    }

    /// Factor ids in sorted order — the order-independent identity of the
    /// decomposition, used to compare independently constructed objects.
    #[must_use]
    pub fn sorted_factor_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.prime_factors.iter().map(|f| f.id.clone()).collect();
        ids.sort();
        ids
    }
}

/// Accumulates factors for one object's decomposition.
///
/// Seeds the core identity factor, deduplicates by factor id (two equal
/// elements of a collection are one semantic unit), and skips attributes
/// with no semantic content so minimal objects stay minimal.
#[derive(Debug, Clone)]
pub struct DecompositionBuilder {
    domain: String,
    factors: Vec<PrimeFactor>,
    seen: BTreeSet<String>,
}

impl DecompositionBuilder {
    /// Starts a decomposition for the object with the given domain and id.
    #[must_use]
    pub fn new(domain: &str, object_id: &str) -> Self {
        let core = PrimeFactor::core(domain, object_id);
        let mut seen = BTreeSet::new();
        seen.insert(core.id.clone());
        Self {
            domain: domain.to_owned(),
            factors: vec![core],
            seen,
        }
    }

    /// Adds a pre-built factor (used for a type's intrinsic primes).
    pub fn push(&mut self, factor: PrimeFactor) -> &mut Self {
        if self.seen.insert(factor.id.clone()) {
            self.factors.push(factor);
        }
        self
    }

    /// Emits one factor for a scalar or nested attribute value.
    ///
    /// Null and empty-string values contribute nothing.
    pub fn attribute(&mut self, subpath: &str, value: &Value) -> &mut Self {
        if has_content(value) {
            let domain = format!("{}.{subpath}", self.domain);
            self.push(PrimeFactor::derived(&domain, value));
        }
        self
    }

    /// Emits one factor per element of a collection-valued attribute.
    ///
    /// This is what makes factor sets order-independent: two objects with
    /// the same element set in different order decompose identically.
    pub fn elements(&mut self, subpath: &str, values: &[Value]) -> &mut Self {
        for value in values {
            self.attribute(subpath, value);
        }
        self
    }

    /// Emits one factor per `(key, value)` entry of a map-valued attribute.
    pub fn entries<'a, I>(&mut self, subpath: &str, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        for (key, value) in entries {
            if has_content(value) {
                let domain = format!("{}.{subpath}.{key}", self.domain);
                self.push(PrimeFactor::derived(&domain, value));
            }
        }
        self
    }

    /// Finalizes the decomposition.
    #[must_use]
    pub fn finish(self) -> PrimeDecomposition {
        PrimeDecomposition {
            prime_factors: self.factors,
            decomposition_method: ATTRIBUTE_DECOMPOSITION.to_owned(),
        }
    }
}

/// True when a value carries semantic content worth a factor.
fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
