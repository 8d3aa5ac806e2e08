//! Observer frames — declared perspectives on an object.
//!
//! A frame names the perspective an object is currently viewed through and
//! declares which properties the caller requires to stay fixed across a
//! frame transform. Frames are shared by reference: many objects may point
//! at one frame, so they are handed around as `Arc<ObserverFrame>` and
//! never exclusively owned by an object.
//!
//! The invariant-property list is a declarative contract. The transform
//! itself does not enforce it programmatically; callers check post hoc,
//! either field by field or with [`check_invariants`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The perspective a frame views an object from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    /// Frame-independent view; the default for newly constructed objects.
    Objective,
    /// A single observer's view.
    Subjective,
    /// A view shared by a community of observers.
    Intersubjective,
}

impl Perspective {
    /// Returns the string value used in serialized frames.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Perspective::Objective => "objective",
            Perspective::Subjective => "subjective",
            Perspective::Intersubjective => "intersubjective",
        }
    }
}

/// A named viewing context attachable to any UOR object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObserverFrame {
    /// Frame identifier.
    pub id: String,
    /// Perspective of this frame.
    pub perspective: Perspective,
    /// Names of object fields declared invariant across transforms into
    /// this frame.
    #[serde(default)]
    pub invariant_properties: Vec<String>,
    /// Free-form rule names describing how frame-variant views are derived.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformation_rules: Vec<String>,
}

impl ObserverFrame {
    /// Creates a frame with no declared invariants.
    #[must_use]
    pub fn new(id: impl Into<String>, perspective: Perspective) -> Self {
        Self {
            id: id.into(),
            perspective,
            invariant_properties: Vec::new(),
            transformation_rules: Vec::new(),
        }
    }

    /// Declares the properties that must not change across a transform
    /// into this frame.
    #[must_use]
    pub fn with_invariants(mut self, properties: &[&str]) -> Self {
        self.invariant_properties = properties.iter().map(|p| (*p).to_owned()).collect();
        self
    }

    /// Attaches transformation rule names.
    #[must_use]
    pub fn with_rules(mut self, rules: &[&str]) -> Self {
        self.transformation_rules = rules.iter().map(|r| (*r).to_owned()).collect();
        self
    }

    /// Wraps the frame for sharing across objects.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// The default objective frame every object starts in.
///
/// Identity and canonical content are declared invariant; they are also
/// structurally frame-invariant, so the declaration is a statement of
/// intent rather than a constraint the engine must work to satisfy.
#[must_use]
pub fn default_frame() -> Arc<ObserverFrame> {
    ObserverFrame::new("frame:objective", Perspective::Objective)
        .with_invariants(&["id", "type", "canonicalRepresentation", "primeDecomposition"])
        .shared()
}

/// Post-hoc check of a frame's declared invariants.
///
/// Compares the serialized forms of the original and transformed object and
/// returns the names of declared-invariant top-level fields whose values
/// differ. An empty result means the declaration held.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use uor_object::frame::{check_invariants, ObserverFrame, Perspective};
///
/// let frame = ObserverFrame::new("frame:review", Perspective::Subjective)
///     .with_invariants(&["id"]);
/// let original = json!({ "id": "x", "note": "before" });
/// let transformed = json!({ "id": "x", "note": "after" });
/// assert!(check_invariants(&frame, &original, &transformed).is_empty());
/// ```
#[must_use]
pub fn check_invariants(frame: &ObserverFrame, original: &Value, transformed: &Value) -> Vec<String> {
    frame
        .invariant_properties
        .iter()
        .filter(|property| {
            original.get(property.as_str()) != transformed.get(property.as_str())
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn perspective_round_trips_through_serde() {
        for perspective in [
            Perspective::Objective,
            Perspective::Subjective,
            Perspective::Intersubjective,
        ] {
            let json = serde_json::json!(perspective);
            assert_eq!(json, perspective.as_str());
            let back: Perspective =
                serde_json::from_value(json).unwrap_or(Perspective::Objective);
            assert_eq!(back, perspective);
        }
    }

    #[test]
    fn default_frame_declares_identity_invariant() {
        let frame = default_frame();
        assert_eq!(frame.perspective, Perspective::Objective);
        assert!(frame.invariant_properties.contains(&"id".to_owned()));
    }

    #[test]
    fn frames_are_shared_by_reference() {
        let frame = ObserverFrame::new("frame:shared", Perspective::Intersubjective).shared();
        let other = Arc::clone(&frame);
        assert!(Arc::ptr_eq(&frame, &other));
    }

    #[test]
    fn check_invariants_reports_drifted_fields() {
        let frame = ObserverFrame::new("frame:f", Perspective::Subjective)
            .with_invariants(&["id", "name"]);
        let original = json!({ "id": "x", "name": "a" });
        let transformed = json!({ "id": "x", "name": "b" });
        assert_eq!(check_invariants(&frame, &original, &transformed), ["name"]);
    }

    #[test]
    fn frame_serialization_uses_camel_case() {
        let frame = ObserverFrame::new("frame:f", Perspective::Objective)
            .with_invariants(&["id"]);
        let json = serde_json::json!(frame);
        assert!(json.get("invariantProperties").is_some());
        assert!(json.get("transformationRules").is_none());
    }
}
