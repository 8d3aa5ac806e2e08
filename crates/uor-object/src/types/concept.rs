//! Concept objects — named units of meaning in a namespace.

use serde_json::{json, Map, Value};

use crate::canonical::CanonicalPolicy;
use crate::coherence::{CoherenceMeasure, CoherenceScore};
use crate::object::{
    optional_str, require_str, str_list, ObjectCore, SerializedFormError, TypeTag, UorObject,
};
use crate::prime::DecompositionBuilder;

/// A named concept with free-form tags and references to related concepts.
#[derive(Debug, Clone, PartialEq)]
pub struct Concept {
    core: ObjectCore,
    name: String,
    description: String,
    definition: Option<String>,
    tags: Vec<String>,
    related: Vec<String>,
}

impl Concept {
    /// Creates a concept with the required identity fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            core: ObjectCore::new(id, TypeTag::concept()),
            name: name.into(),
            description: description.into(),
            definition: None,
            tags: Vec::new(),
            related: Vec::new(),
        }
    }

    /// Attaches a formal definition.
    #[must_use]
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    /// Attaches tags (an unordered collection).
    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| (*t).to_owned()).collect();
        self
    }

    /// Attaches references to related concepts (unordered).
    #[must_use]
    pub fn with_related(mut self, related: &[&str]) -> Self {
        self.related = related.iter().map(|r| (*r).to_owned()).collect();
        self
    }

    /// The concept's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The concept's description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The concept's tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Replaces the description and invalidates the computed forms.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.core.touch();
    }

    /// Adds one tag and invalidates the computed forms.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
        self.core.touch();
    }

    /// Reconstructs a concept from its serialized record.
    ///
    /// # Errors
    ///
    /// Returns [`SerializedFormError`] when the record is structurally
    /// corrupt: wrong type tag, missing `name`, or mistyped fields.
    pub fn from_serialized(value: &Value) -> Result<Self, SerializedFormError> {
        let (core, data) = ObjectCore::from_serialized(value, &TypeTag::concept())?;
        Ok(Self {
            core,
            name: require_str(&data, "name")?.to_owned(),
            description: optional_str(&data, "description")?.unwrap_or_default(),
            definition: optional_str(&data, "definition")?,
            tags: str_list(&data, "tags")?,
            related: str_list(&data, "related")?,
        })
    }
}

impl UorObject for Concept {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn payload(&self) -> Value {
        let mut data = Map::new();
        data.insert("name".to_owned(), json!(self.name));
        data.insert("description".to_owned(), json!(self.description));
        if let Some(definition) = &self.definition {
            data.insert("definition".to_owned(), json!(definition));
        }
        data.insert("tags".to_owned(), json!(self.tags));
        data.insert("related".to_owned(), json!(self.related));
        Value::Object(data)
    }

    fn canonical_policy(&self) -> CanonicalPolicy {
        CanonicalPolicy::unordered(&["tags", "related"])
    }

    fn derive_factors(&self, builder: &mut DecompositionBuilder) {
        builder
            .attribute("name", &json!(self.name))
            .attribute("description", &json!(self.description))
            .attribute("definition", &json!(self.definition))
            .elements("tags", &self.tags.iter().map(|t| json!(t)).collect::<Vec<_>>())
            .elements(
                "related",
                &self.related.iter().map(|r| json!(r)).collect::<Vec<_>>(),
            );
    }

    fn measure_coherence(&self) -> CoherenceMeasure {
        CoherenceScore::new()
            .credit(0.2, !self.name.is_empty())
            .credit(0.2, !self.description.is_empty())
            .credit(0.2, self.definition.is_some())
            .credit(0.2, !self.tags.is_empty())
            .credit(0.2, !self.related.is_empty())
            .finish(self.type_tag().as_str())
    }

    fn validate(&self) -> bool {
        !self.id().is_empty() && !self.name.is_empty()
    }
}
