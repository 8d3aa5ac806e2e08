//! Thread objects — ordered message history among participants.

use serde_json::{json, Map, Value};

use crate::canonical::CanonicalPolicy;
use crate::coherence::{CoherenceMeasure, CoherenceScore};
use crate::object::{
    optional_str, str_list, ObjectCore, SerializedFormError, TypeTag, UorObject,
};
use crate::prime::DecompositionBuilder;

/// A conversation: an unordered participant set and a sequential message
/// history.
///
/// Participants are an unordered collection (canonically sorted, one factor
/// per participant); the message list is a sequence whose order is
/// semantic and is preserved as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    core: ObjectCore,
    participants: Vec<String>,
    subject: Option<String>,
    message_refs: Vec<String>,
    active: bool,
}

impl Thread {
    /// Creates an active thread among the given participants.
    #[must_use]
    pub fn new(id: impl Into<String>, participants: &[&str]) -> Self {
        Self {
            core: ObjectCore::new(id, TypeTag::thread()),
            participants: participants.iter().map(|p| (*p).to_owned()).collect(),
            subject: None,
            message_refs: Vec::new(),
            active: true,
        }
    }

    /// Attaches a subject line.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// The participant references.
    #[must_use]
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// The message history, in conversation order.
    #[must_use]
    pub fn message_refs(&self) -> &[String] {
        &self.message_refs
    }

    /// Whether the thread is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Appends a message to the history and invalidates the computed forms.
    pub fn append_message(&mut self, message_ref: impl Into<String>) {
        self.message_refs.push(message_ref.into());
        self.core.touch();
    }

    /// Adds a participant and invalidates the computed forms.
    pub fn add_participant(&mut self, participant: impl Into<String>) {
        self.participants.push(participant.into());
        self.core.touch();
    }

    /// Closes the thread.
    pub fn close(&mut self) {
        self.active = false;
        self.core.touch();
    }

    /// Reconstructs a thread from its serialized record.
    ///
    /// # Errors
    ///
    /// Returns [`SerializedFormError`] on a wrong type tag or mistyped
    /// fields.
    pub fn from_serialized(value: &Value) -> Result<Self, SerializedFormError> {
        let (core, data) = ObjectCore::from_serialized(value, &TypeTag::thread())?;
        let active = data.get("active").and_then(Value::as_bool).unwrap_or(true);
        Ok(Self {
            core,
            participants: str_list(&data, "participants")?,
            subject: optional_str(&data, "subject")?,
            message_refs: str_list(&data, "messageRefs")?,
            active,
        })
    }
}

impl UorObject for Thread {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn payload(&self) -> Value {
        let mut data = Map::new();
        data.insert("participants".to_owned(), json!(self.participants));
        if let Some(subject) = &self.subject {
            data.insert("subject".to_owned(), json!(subject));
        }
        data.insert("messageRefs".to_owned(), json!(self.message_refs));
        data.insert("active".to_owned(), json!(self.active));
        Value::Object(data)
    }

    fn canonical_policy(&self) -> CanonicalPolicy {
        // messageRefs is deliberately absent: history order is semantic.
        CanonicalPolicy::unordered(&["participants"])
    }

    fn derive_factors(&self, builder: &mut DecompositionBuilder) {
        builder
            .attribute("subject", &json!(self.subject))
            .elements(
                "participants",
                &self.participants.iter().map(|p| json!(p)).collect::<Vec<_>>(),
            );
        // The history contributes a single sequence factor: reordering the
        // same messages is a different conversation.
        builder.attribute("messageRefs", &json!(self.message_refs));
    }

    fn measure_coherence(&self) -> CoherenceMeasure {
        let participant_fraction = self.participants.len() as f64 / 2.0;
        CoherenceScore::new()
            .partial(0.3, participant_fraction)
            .credit(0.2, self.subject.is_some())
            .credit(0.3, !self.message_refs.is_empty())
            .credit(0.2, self.active)
            .finish(self.type_tag().as_str())
    }

    fn validate(&self) -> bool {
        !self.id().is_empty() && !self.participants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_order_is_canonically_irrelevant() {
        let a = Thread::new("t-1", &["alice", "bob"]);
        let b = Thread::new("t-1", &["bob", "alice"]);
        assert_eq!(
            a.compute_canonical_representation().content,
            b.compute_canonical_representation().content
        );
    }

    #[test]
    fn message_history_order_is_semantic() {
        let mut forward = Thread::new("t-1", &["alice", "bob"]);
        forward.append_message("uor://ns/message/m1");
        forward.append_message("uor://ns/message/m2");
        let mut reversed = Thread::new("t-1", &["alice", "bob"]);
        reversed.append_message("uor://ns/message/m2");
        reversed.append_message("uor://ns/message/m1");
        assert_ne!(
            forward.compute_canonical_representation().content,
            reversed.compute_canonical_representation().content
        );
    }

    #[test]
    fn empty_thread_is_invalid() {
        let thread = Thread::new("t-1", &[]);
        assert!(!thread.validate());
    }
}
