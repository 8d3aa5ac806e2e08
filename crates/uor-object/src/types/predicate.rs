//! Predicate objects — typed relations between objects.

use serde_json::{json, Map, Value};

use crate::canonical::CanonicalPolicy;
use crate::coherence::{CoherenceMeasure, CoherenceScore};
use crate::object::{
    optional_f64, optional_str, require_str, str_list, ObjectCore, SerializedFormError, TypeTag,
    UorObject,
};
use crate::prime::DecompositionBuilder;

/// A directed relation from one subject to one or more target objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    core: ObjectCore,
    name: String,
    subject_ref: String,
    object_refs: Vec<String>,
    predicate_type: Option<String>,
    strength: Option<f64>,
}

impl Predicate {
    /// Creates a predicate relating a subject to its targets.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        subject_ref: impl Into<String>,
        object_refs: &[&str],
    ) -> Self {
        Self {
            core: ObjectCore::new(id, TypeTag::predicate()),
            name: name.into(),
            subject_ref: subject_ref.into(),
            object_refs: object_refs.iter().map(|r| (*r).to_owned()).collect(),
            predicate_type: None,
            strength: None,
        }
    }

    /// Attaches a relation type label.
    #[must_use]
    pub fn with_predicate_type(mut self, predicate_type: impl Into<String>) -> Self {
        self.predicate_type = Some(predicate_type.into());
        self
    }

    /// Attaches a relation strength in `[0, 1]`.
    #[must_use]
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength.clamp(0.0, 1.0));
        self
    }

    /// The relation's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The subject reference.
    #[must_use]
    pub fn subject_ref(&self) -> &str {
        &self.subject_ref
    }

    /// The target references.
    #[must_use]
    pub fn object_refs(&self) -> &[String] {
        &self.object_refs
    }

    /// Adds a target reference and invalidates the computed forms.
    pub fn add_object_ref(&mut self, target: impl Into<String>) {
        self.object_refs.push(target.into());
        self.core.touch();
    }

    /// Reconstructs a predicate from its serialized record.
    ///
    /// # Errors
    ///
    /// Returns [`SerializedFormError`] on a wrong type tag, missing
    /// `name`/`subjectRef`, or mistyped fields.
    pub fn from_serialized(value: &Value) -> Result<Self, SerializedFormError> {
        let (core, data) = ObjectCore::from_serialized(value, &TypeTag::predicate())?;
        Ok(Self {
            core,
            name: require_str(&data, "name")?.to_owned(),
            subject_ref: require_str(&data, "subjectRef")?.to_owned(),
            object_refs: str_list(&data, "objectRefs")?,
            predicate_type: optional_str(&data, "predicateType")?,
            strength: optional_f64(&data, "strength")?,
        })
    }
}

impl UorObject for Predicate {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn payload(&self) -> Value {
        let mut data = Map::new();
        data.insert("name".to_owned(), json!(self.name));
        data.insert("subjectRef".to_owned(), json!(self.subject_ref));
        data.insert("objectRefs".to_owned(), json!(self.object_refs));
        if let Some(predicate_type) = &self.predicate_type {
            data.insert("predicateType".to_owned(), json!(predicate_type));
        }
        if let Some(strength) = self.strength {
            data.insert("strength".to_owned(), json!(strength));
        }
        Value::Object(data)
    }

    fn canonical_policy(&self) -> CanonicalPolicy {
        CanonicalPolicy::unordered(&["objectRefs"])
    }

    fn derive_factors(&self, builder: &mut DecompositionBuilder) {
        builder
            .attribute("name", &json!(self.name))
            .attribute("subjectRef", &json!(self.subject_ref))
            .attribute("predicateType", &json!(self.predicate_type))
            .elements(
                "objectRefs",
                &self.object_refs.iter().map(|r| json!(r)).collect::<Vec<_>>(),
            );
    }

    fn measure_coherence(&self) -> CoherenceMeasure {
        CoherenceScore::new()
            .credit(0.2, !self.name.is_empty())
            .credit(0.25, !self.subject_ref.is_empty())
            .credit(0.25, !self.object_refs.is_empty())
            .credit(0.15, self.predicate_type.is_some())
            .credit(0.15, self.strength.is_some())
            .finish(self.type_tag().as_str())
    }

    fn validate(&self) -> bool {
        !self.id().is_empty()
            && !self.name.is_empty()
            && !self.subject_ref.is_empty()
            && !self.object_refs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_without_targets_is_invalid() {
        let predicate = Predicate::new("p-1", "references", "uor://ns/concept/a", &[]);
        assert!(!predicate.validate());
    }

    #[test]
    fn target_order_does_not_change_the_factor_set() {
        let a = Predicate::new(
            "p-1",
            "references",
            "uor://ns/concept/a",
            &["uor://ns/concept/b", "uor://ns/concept/c"],
        );
        let b = Predicate::new(
            "p-1",
            "references",
            "uor://ns/concept/a",
            &["uor://ns/concept/c", "uor://ns/concept/b"],
        );
        assert_eq!(
            a.compute_prime_decomposition().sorted_factor_ids(),
            b.compute_prime_decomposition().sorted_factor_ids()
        );
    }

    #[test]
    fn strength_is_clamped_on_construction() {
        let predicate =
            Predicate::new("p-1", "references", "uor://ns/concept/a", &["uor://ns/concept/b"])
                .with_strength(3.0);
        assert_eq!(predicate.payload()["strength"], json!(1.0));
    }
}
