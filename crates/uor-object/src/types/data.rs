//! Generic objects — an arbitrary JSON payload under any type tag.
//!
//! The open member of the type family: callers that need a UOR object for
//! a type with no dedicated struct (media, schema, ad-hoc test types)
//! construct one of these around a plain JSON object.

use serde_json::{Map, Value};

use crate::coherence::{CoherenceMeasure, CoherenceScore};
use crate::object::{require_object, require_str, ObjectCore, SerializedFormError, TypeTag, UorObject};
use crate::prime::DecompositionBuilder;

/// A UOR object over an arbitrary JSON payload.
///
/// Array-valued fields decompose into one factor per element; scalar and
/// nested fields decompose into one factor each. All arrays keep their
/// source order in the canonical form — a type that needs sorted
/// collections should be a dedicated struct with its own policy.
#[derive(Debug, Clone, PartialEq)]
pub struct DataObject {
    core: ObjectCore,
    data: Map<String, Value>,
}

impl DataObject {
    /// Creates a generic object from a JSON payload.
    ///
    /// Non-object payloads are wrapped as `{"value": payload}` so every
    /// object's data is a field map.
    #[must_use]
    pub fn new(id: impl Into<String>, type_tag: TypeTag, data: Value) -> Self {
        let data = match data {
            Value::Object(entries) => entries,
            other => {
                let mut wrapped = Map::new();
                wrapped.insert("value".to_owned(), other);
                wrapped
            }
        };
        Self {
            core: ObjectCore::new(id, type_tag),
            data,
        }
    }

    /// Looks up one data field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Sets one data field and invalidates the computed forms.
    pub fn set_field(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
        self.core.touch();
    }

    /// Reconstructs a generic object from its serialized record.
    ///
    /// Unlike the dedicated types, the expected type tag is read from the
    /// record itself.
    ///
    /// # Errors
    ///
    /// Returns [`SerializedFormError`] when the record lacks `id` or
    /// `type` or has a mistyped section.
    pub fn from_serialized(value: &Value) -> Result<Self, SerializedFormError> {
        let record = require_object(value)?;
        let tag = TypeTag::new(require_str(record, "type")?);
        let (core, data) = ObjectCore::from_serialized(value, &tag)?;
        Ok(Self { core, data })
    }
}

impl UorObject for DataObject {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn payload(&self) -> Value {
        Value::Object(self.data.clone())
    }

    fn derive_factors(&self, builder: &mut DecompositionBuilder) {
        for (key, value) in &self.data {
            match value {
                Value::Array(items) => {
                    builder.elements(key, items);
                }
                other => {
                    builder.attribute(key, other);
                }
            }
        }
    }

    fn measure_coherence(&self) -> CoherenceMeasure {
        let field_fraction = self.data.len() as f64 / 4.0;
        CoherenceScore::new()
            .credit(0.25, !self.id().is_empty())
            .credit(0.25, !self.type_tag().as_str().is_empty())
            .partial(0.5, field_fraction)
            .finish(self.type_tag().as_str())
    }

    fn validate(&self) -> bool {
        !self.id().is_empty() && !self.type_tag().as_str().is_empty()
    }
}
