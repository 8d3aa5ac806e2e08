//! Topic objects — subject areas that group related content.

use serde_json::{json, Map, Value};

use crate::canonical::CanonicalPolicy;
use crate::coherence::{CoherenceMeasure, CoherenceScore};
use crate::object::{
    optional_str, require_str, str_list, ObjectCore, SerializedFormError, TypeTag, UorObject,
};
use crate::prime::DecompositionBuilder;

/// A subject area with keywords and an optional parent topic.
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    core: ObjectCore,
    name: String,
    description: String,
    keywords: Vec<String>,
    parent_topic: Option<String>,
}

impl Topic {
    /// Creates a topic with the required identity fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            core: ObjectCore::new(id, TypeTag::topic()),
            name: name.into(),
            description: description.into(),
            keywords: Vec::new(),
            parent_topic: None,
        }
    }

    /// Attaches keywords (an unordered collection).
    #[must_use]
    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| (*k).to_owned()).collect();
        self
    }

    /// Attaches a reference to the parent topic.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_topic = Some(parent.into());
        self
    }

    /// The topic's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The topic's keywords.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Adds a keyword and invalidates the computed forms.
    pub fn add_keyword(&mut self, keyword: impl Into<String>) {
        self.keywords.push(keyword.into());
        self.core.touch();
    }

    /// Reconstructs a topic from its serialized record.
    ///
    /// # Errors
    ///
    /// Returns [`SerializedFormError`] on a wrong type tag, missing
    /// `name`, or mistyped fields.
    pub fn from_serialized(value: &Value) -> Result<Self, SerializedFormError> {
        let (core, data) = ObjectCore::from_serialized(value, &TypeTag::topic())?;
        Ok(Self {
            core,
            name: require_str(&data, "name")?.to_owned(),
            description: optional_str(&data, "description")?.unwrap_or_default(),
            keywords: str_list(&data, "keywords")?,
            parent_topic: optional_str(&data, "parentTopic")?,
        })
    }
}

impl UorObject for Topic {
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
        data.insert("keywords".to_owned(), json!(self.keywords));
        if let Some(parent) = &self.parent_topic {
            data.insert("parentTopic".to_owned(), json!(parent));
        }
        Value::Object(data)
    }

    fn canonical_policy(&self) -> CanonicalPolicy {
        CanonicalPolicy::unordered(&["keywords"])
    }

    fn derive_factors(&self, builder: &mut DecompositionBuilder) {
        builder
            .attribute("name", &json!(self.name))
            .attribute("description", &json!(self.description))
            .attribute("parentTopic", &json!(self.parent_topic))
            .elements(
                "keywords",
                &self.keywords.iter().map(|k| json!(k)).collect::<Vec<_>>(),
            );
    }

    fn measure_coherence(&self) -> CoherenceMeasure {
        let keyword_fraction = self.keywords.len() as f64 / 3.0;
        CoherenceScore::new()
            .credit(0.25, !self.name.is_empty())
            .credit(0.25, !self.description.is_empty())
            .partial(0.3, keyword_fraction)
            .credit(0.2, self.parent_topic.is_some())
            .finish(self.type_tag().as_str())
    }

    fn validate(&self) -> bool {
        !self.id().is_empty() && !self.name.is_empty()
    }
}
