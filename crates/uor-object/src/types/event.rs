//! Event objects — timestamped occurrences emitted into channels.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::canonical::format_date;
use crate::coherence::{CoherenceMeasure, CoherenceScore};
use crate::object::{
    optional_date, optional_str, require_str, ObjectCore, SerializedFormError, TypeTag,
    UorObject,
};
use crate::prime::DecompositionBuilder;

/// A timestamped occurrence with a free-form payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    core: ObjectCore,
    event_type: String,
    source: String,
    payload_entries: Map<String, Value>,
    emitted_at: DateTime<Utc>,
    channel_ref: Option<String>,
}

impl Event {
    /// Creates an event emitted now.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        event_type: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            core: ObjectCore::new(id, TypeTag::event()),
            event_type: event_type.into(),
            source: source.into(),
            payload_entries: Map::new(),
            emitted_at: Utc::now(),
            channel_ref: None,
        }
    }

    /// Adds a payload entry.
    #[must_use]
    pub fn with_payload_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload_entries.insert(key.into(), value);
        self
    }

    /// Emits the event into a channel.
    #[must_use]
    pub fn with_channel(mut self, channel_ref: impl Into<String>) -> Self {
        self.channel_ref = Some(channel_ref.into());
        self
    }

    /// Overrides the emission time.
    #[must_use]
    pub fn emitted(mut self, at: DateTime<Utc>) -> Self {
        self.emitted_at = at;
        self
    }

    /// The event type label.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The emitting source reference.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// When the event was emitted.
    #[must_use]
    pub fn emitted_at(&self) -> DateTime<Utc> {
        self.emitted_at
    }

    /// The channel the event was emitted into, if any.
    #[must_use]
    pub fn channel_ref(&self) -> Option<&str> {
        self.channel_ref.as_deref()
    }

    /// Looks up one payload entry.
    #[must_use]
    pub fn payload_entry(&self, key: &str) -> Option<&Value> {
        self.payload_entries.get(key)
    }

    /// Reconstructs an event from its serialized record.
    ///
    /// # Errors
    ///
    /// Returns [`SerializedFormError`] on a wrong type tag, missing
    /// `eventType`/`source`, a malformed emission date, or mistyped
    /// fields.
    pub fn from_serialized(value: &Value) -> Result<Self, SerializedFormError> {
        let (core, data) = ObjectCore::from_serialized(value, &TypeTag::event())?;
        let payload_entries = match data.get("payload") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(entries)) => entries.clone(),
            Some(_) => {
                return Err(SerializedFormError::InvalidField {
                    field: "payload",
                    expected: "object",
                })
            }
        };
        let emitted_at = optional_date(&data, "emittedAt")?.unwrap_or_else(Utc::now);
        Ok(Self {
            core,
            event_type: require_str(&data, "eventType")?.to_owned(),
            source: require_str(&data, "source")?.to_owned(),
            payload_entries,
            emitted_at,
            channel_ref: optional_str(&data, "channelRef")?,
        })
    }
}

impl UorObject for Event {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn payload(&self) -> Value {
        let mut data = Map::new();
        data.insert("eventType".to_owned(), json!(self.event_type));
        data.insert("source".to_owned(), json!(self.source));
        data.insert(
            "payload".to_owned(),
            Value::Object(self.payload_entries.clone()),
        );
        data.insert("emittedAt".to_owned(), json!(format_date(&self.emitted_at)));
        if let Some(channel_ref) = &self.channel_ref {
            data.insert("channelRef".to_owned(), json!(channel_ref));
        }
        Value::Object(data)
    }

    fn derive_factors(&self, builder: &mut DecompositionBuilder) {
        builder
            .attribute("eventType", &json!(self.event_type))
            .attribute("source", &json!(self.source))
            .attribute("channelRef", &json!(self.channel_ref))
            .entries("payload", self.payload_entries.iter());
    }

    fn measure_coherence(&self) -> CoherenceMeasure {
        let payload_fraction = self.payload_entries.len() as f64 / 3.0;
        CoherenceScore::new()
            .credit(0.25, !self.event_type.is_empty())
            .credit(0.25, !self.source.is_empty())
            .partial(0.3, payload_fraction)
            .credit(0.2, self.channel_ref.is_some())
            .finish(self.type_tag().as_str())
    }

    fn validate(&self) -> bool {
        !self.id().is_empty() && !self.event_type.is_empty() && !self.source.is_empty()
    }
}
