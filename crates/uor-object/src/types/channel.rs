//! Channel objects — named publication streams.

use serde_json::{json, Map, Value};

use crate::canonical::CanonicalPolicy;
use crate::coherence::{CoherenceMeasure, CoherenceScore};
use crate::object::{
    optional_str, require_str, str_list, ObjectCore, SerializedFormError, TypeTag, UorObject,
};
use crate::prime::DecompositionBuilder;

/// Who may see a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelVisibility {
    /// Discoverable and readable by anyone.
    Public,
    /// Readable only by subscribers the owner admits.
    Private,
}

impl ChannelVisibility {
    /// The string value used in serialized records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelVisibility::Public => "public",
            ChannelVisibility::Private => "private",
        }
    }

    /// Parses the serialized string value.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "public" => Some(ChannelVisibility::Public),
            "private" => Some(ChannelVisibility::Private),
            _ => None,
        }
    }
}

/// A publication stream events are emitted into.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    core: ObjectCore,
    name: String,
    description: Option<String>,
    owner: String,
    visibility: ChannelVisibility,
    tags: Vec<String>,
}

impl Channel {
    /// Creates a public channel.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            core: ObjectCore::new(id, TypeTag::channel()),
            name: name.into(),
            description: None,
            owner: owner.into(),
            visibility: ChannelVisibility::Public,
            tags: Vec::new(),
        }
    }

    /// Attaches a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the visibility.
    #[must_use]
    pub fn with_visibility(mut self, visibility: ChannelVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Attaches tags (an unordered collection).
    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| (*t).to_owned()).collect();
        self
    }

    /// The channel's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owner reference.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The channel's visibility.
    #[must_use]
    pub fn visibility(&self) -> ChannelVisibility {
        self.visibility
    }

    /// Reconstructs a channel from its serialized record.
    ///
    /// # Errors
    ///
    /// Returns [`SerializedFormError`] on a wrong type tag, missing
    /// `name`/`owner`, an unknown visibility value, or mistyped fields.
    pub fn from_serialized(value: &Value) -> Result<Self, SerializedFormError> {
        let (core, data) = ObjectCore::from_serialized(value, &TypeTag::channel())?;
        let visibility = match optional_str(&data, "visibility")? {
            None => ChannelVisibility::Public,
            Some(text) => {
                ChannelVisibility::parse(&text).ok_or(SerializedFormError::InvalidField {
                    field: "visibility",
                    expected: "channel visibility",
                })?
            }
        };
        Ok(Self {
            core,
            name: require_str(&data, "name")?.to_owned(),
            description: optional_str(&data, "description")?,
            owner: require_str(&data, "owner")?.to_owned(),
            visibility,
            tags: str_list(&data, "tags")?,
        })
    }
}

impl UorObject for Channel {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn payload(&self) -> Value {
        let mut data = Map::new();
        data.insert("name".to_owned(), json!(self.name));
        if let Some(description) = &self.description {
            data.insert("description".to_owned(), json!(description));
        }
        data.insert("owner".to_owned(), json!(self.owner));
        data.insert("visibility".to_owned(), json!(self.visibility.as_str()));
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
            .attribute("owner", &json!(self.owner))
            .attribute("visibility", &json!(self.visibility.as_str()))
            .elements("tags", &self.tags.iter().map(|t| json!(t)).collect::<Vec<_>>());
    }

    fn measure_coherence(&self) -> CoherenceMeasure {
        CoherenceScore::new()
            .credit(0.25, !self.name.is_empty())
            .credit(0.25, !self.owner.is_empty())
            .credit(0.2, self.description.is_some())
            .credit(0.15, self.visibility == ChannelVisibility::Public)
            .credit(0.15, !self.tags.is_empty())
            .finish(self.type_tag().as_str())
    }

    fn validate(&self) -> bool {
        !self.id().is_empty() && !self.name.is_empty() && !self.owner.is_empty()
    }
}
