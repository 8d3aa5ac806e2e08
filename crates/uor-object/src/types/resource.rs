//! Resource objects — addressable content with an optional external URL.

use serde_json::{json, Map, Value};

use crate::canonical::CanonicalPolicy;
use crate::coherence::{CoherenceMeasure, CoherenceScore};
use crate::object::{
    optional_str, require_str, str_list, ObjectCore, SerializedFormError, TypeTag, UorObject,
};
use crate::prime::DecompositionBuilder;

/// A piece of addressable content: document, dataset, or external link.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    core: ObjectCore,
    name: String,
    description: String,
    url: Option<String>,
    media_type: Option<String>,
    content: Option<String>,
    tags: Vec<String>,
}

impl Resource {
    /// Creates a resource with the required identity fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            core: ObjectCore::new(id, TypeTag::resource()),
            name: name.into(),
            description: description.into(),
            url: None,
            media_type: None,
            content: None,
            tags: Vec::new(),
        }
    }

    /// Attaches an external URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Attaches a media type (e.g. `text/markdown`).
    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Attaches inline content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Attaches tags (an unordered collection).
    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| (*t).to_owned()).collect();
        self
    }

    /// The resource's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The external URL, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Replaces the inline content and invalidates the computed forms.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
        self.core.touch();
    }

    /// Reconstructs a resource from its serialized record.
    ///
    /// # Errors
    ///
    /// Returns [`SerializedFormError`] on a wrong type tag, missing
    /// `name`, or mistyped fields.
    pub fn from_serialized(value: &Value) -> Result<Self, SerializedFormError> {
        let (core, data) = ObjectCore::from_serialized(value, &TypeTag::resource())?;
        Ok(Self {
            core,
            name: require_str(&data, "name")?.to_owned(),
            description: optional_str(&data, "description")?.unwrap_or_default(),
            url: optional_str(&data, "url")?,
            media_type: optional_str(&data, "mediaType")?,
            content: optional_str(&data, "content")?,
            tags: str_list(&data, "tags")?,
        })
    }
}

impl UorObject for Resource {
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
        if let Some(url) = &self.url {
            data.insert("url".to_owned(), json!(url));
        }
        if let Some(media_type) = &self.media_type {
            data.insert("mediaType".to_owned(), json!(media_type));
        }
        if let Some(content) = &self.content {
            data.insert("content".to_owned(), json!(content));
        }
        data.insert("tags".to_owned(), json!(self.tags));
        Value::Object(data)
    }

    fn canonical_policy(&self) -> CanonicalPolicy {
        CanonicalPolicy::unordered(&["tags"])
    }

    fn derive_factors(&self, builder: &mut DecompositionBuilder) {
        builder
            .attribute("name", &json!(self.name))
            .attribute("description", &json!(self.description))
            .attribute("url", &json!(self.url))
            .attribute("mediaType", &json!(self.media_type))
            .attribute("content", &json!(self.content))
            .elements("tags", &self.tags.iter().map(|t| json!(t)).collect::<Vec<_>>());
    }

    fn measure_coherence(&self) -> CoherenceMeasure {
        CoherenceScore::new()
            .credit(0.2, !self.name.is_empty())
            .credit(0.15, !self.description.is_empty())
            .credit(0.25, self.url.is_some() || self.content.is_some())
            .credit(0.15, self.media_type.is_some())
            .credit(0.15, self.content.is_some())
            .credit(0.1, !self.tags.is_empty())
            .finish(self.type_tag().as_str())
    }

    fn validate(&self) -> bool {
        !self.id().is_empty() && !self.name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_absent_from_payload_when_unset() {
        let resource = Resource::new("r-1", "Paper", "");
        let payload = resource.payload();
        assert!(payload.get("url").is_none());
        assert!(payload.get("content").is_none());
    }

    #[test]
    fn url_and_content_drive_coherence() {
        let bare = Resource::new("r-1", "Paper", "");
        let linked = Resource::new("r-1", "Paper", "").with_url("https://example.org/p.pdf");
        assert!(linked.measure_coherence().value > bare.measure_coherence().value);
    }

    #[test]
    fn decomposition_has_one_factor_per_tag() {
        let resource = Resource::new("r-1", "Paper", "").with_tags(&["a", "b", "c"]);
        let decomposition = resource.compute_prime_decomposition();
        assert!(decomposition.contains("resource.tags:a"));
        assert!(decomposition.contains("resource.tags:b"));
        assert!(decomposition.contains("resource.tags:c"));
    }
}
