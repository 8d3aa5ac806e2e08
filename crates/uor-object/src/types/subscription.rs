//! Subscription objects — a subscriber's standing interest in a channel.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::canonical::format_date;
use crate::coherence::{CoherenceMeasure, CoherenceScore};
use crate::object::{
    optional_date, require_str, ObjectCore, SerializedFormError, TypeTag, UorObject,
};
use crate::prime::DecompositionBuilder;
use crate::types::Event;

/// A standing interest in events from one channel, filtered by criteria.
///
/// Criteria are exact-match constraints against event payload entries; an
/// event matches when every criterion is satisfied.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    core: ObjectCore,
    subscriber: String,
    channel_ref: String,
    criteria: Map<String, Value>,
    active: bool,
    expires_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Creates an active subscription with no criteria.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        subscriber: impl Into<String>,
        channel_ref: impl Into<String>,
    ) -> Self {
        Self {
            core: ObjectCore::new(id, TypeTag::subscription()),
            subscriber: subscriber.into(),
            channel_ref: channel_ref.into(),
            criteria: Map::new(),
            active: true,
            expires_at: None,
        }
    }

    /// Adds an exact-match criterion against an event payload entry.
    #[must_use]
    pub fn with_criterion(mut self, key: impl Into<String>, value: Value) -> Self {
        self.criteria.insert(key.into(), value);
        self
    }

    /// Attaches an expiry time.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// The subscriber reference.
    #[must_use]
    pub fn subscriber(&self) -> &str {
        &self.subscriber
    }

    /// The channel reference.
    #[must_use]
    pub fn channel_ref(&self) -> &str {
        &self.channel_ref
    }

    /// Whether the subscription is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Deactivates the subscription.
    pub fn cancel(&mut self) {
        self.active = false;
        self.core.touch();
    }

    /// True when the given event satisfies every criterion and the
    /// subscription is live (active, unexpired relative to the event time,
    /// same channel when the event names one).
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        if !self.active {
            return false;
        }
        if let Some(expires_at) = self.expires_at {
            if event.emitted_at() > expires_at {
                return false;
            }
        }
        if let Some(channel_ref) = event.channel_ref() {
            if channel_ref != self.channel_ref {
                return false;
            }
        }
        self.criteria
            .iter()
            .all(|(key, expected)| event.payload_entry(key) == Some(expected))
    }

    /// Reconstructs a subscription from its serialized record.
    ///
    /// # Errors
    ///
    /// Returns [`SerializedFormError`] on a wrong type tag, missing
    /// `subscriber`/`channelRef`, a malformed expiry date, or mistyped
    /// fields.
    pub fn from_serialized(value: &Value) -> Result<Self, SerializedFormError> {
        let (core, data) = ObjectCore::from_serialized(value, &TypeTag::subscription())?;
        let criteria = match data.get("criteria") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(entries)) => entries.clone(),
            Some(_) => {
                return Err(SerializedFormError::InvalidField {
                    field: "criteria",
                    expected: "object",
                })
            }
        };
        let active = data.get("active").and_then(Value::as_bool).unwrap_or(true);
        Ok(Self {
            core,
            subscriber: require_str(&data, "subscriber")?.to_owned(),
            channel_ref: require_str(&data, "channelRef")?.to_owned(),
            criteria,
            active,
            expires_at: optional_date(&data, "expiresAt")?,
        })
    }
}

impl UorObject for Subscription {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn payload(&self) -> Value {
        let mut data = Map::new();
        data.insert("subscriber".to_owned(), json!(self.subscriber));
        data.insert("channelRef".to_owned(), json!(self.channel_ref));
        data.insert("criteria".to_owned(), Value::Object(self.criteria.clone()));
        data.insert("active".to_owned(), json!(self.active));
        if let Some(expires_at) = self.expires_at {
            data.insert("expiresAt".to_owned(), json!(format_date(&expires_at)));
        }
        Value::Object(data)
    }

    fn derive_factors(&self, builder: &mut DecompositionBuilder) {
        builder
            .attribute("subscriber", &json!(self.subscriber))
            .attribute("channelRef", &json!(self.channel_ref))
            .entries("criteria", self.criteria.iter());
    }

    fn measure_coherence(&self) -> CoherenceMeasure {
        CoherenceScore::new()
            .credit(0.25, !self.subscriber.is_empty())
            .credit(0.25, !self.channel_ref.is_empty())
            .credit(0.25, !self.criteria.is_empty())
            .credit(0.15, self.active)
            .credit(0.1, self.expires_at.is_some())
            .finish(self.type_tag().as_str())
    }

    fn validate(&self) -> bool {
        !self.id().is_empty() && !self.subscriber.is_empty() && !self.channel_ref.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn subscription() -> Subscription {
        Subscription::new(
            "s-1",
            "uor://ns/identity/alice",
            "uor://ns/channel/releases",
        )
        .with_criterion("kind", json!("publish"))
    }

    fn matching_event() -> Event {
        Event::new("e-1", "publish", "uor://ns/identity/bob")
            .with_payload_entry("kind", json!("publish"))
            .with_channel("uor://ns/channel/releases")
    }

    #[test]
    fn matching_event_is_accepted() {
        assert!(subscription().matches(&matching_event()));
    }

    #[test]
    fn criterion_mismatch_is_rejected() {
        let event = Event::new("e-1", "publish", "uor://ns/identity/bob")
            .with_payload_entry("kind", json!("retract"))
            .with_channel("uor://ns/channel/releases");
        assert!(!subscription().matches(&event));
    }

    #[test]
    fn cancelled_subscription_matches_nothing() {
        let mut sub = subscription();
        sub.cancel();
        assert!(!sub.matches(&matching_event()));
    }

    #[test]
    fn expired_subscription_rejects_later_events() {
        let expiry = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single();
        let sub = match expiry {
            Some(at) => subscription().with_expiry(at),
            None => return,
        };
        assert!(!sub.matches(&matching_event()));
    }

    #[test]
    fn criteria_entries_become_factors() {
        let decomposition = subscription().compute_prime_decomposition();
        assert!(decomposition.contains("subscription.criteria.kind:publish"));
    }
}
