//! Message objects — directed communication between identities.

use serde_json::{json, Map, Value};

use crate::canonical::CanonicalPolicy;
use crate::coherence::{CoherenceMeasure, CoherenceScore};
use crate::object::{
    optional_str, require_str, str_list, ObjectCore, SerializedFormError, TypeTag, UorObject,
};
use crate::prime::DecompositionBuilder;

/// Delivery status of a message.
///
/// The ordering is the lifecycle progression; coherence credits a message
/// for how far along it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessageStatus {
    /// Created locally, not yet sent.
    Created,
    /// Handed to delivery.
    Sent,
    /// Acknowledged by the recipient's store.
    Delivered,
    /// Read by the recipient.
    Read,
}

impl MessageStatus {
    /// The string value used in serialized records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Created => "created",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
        }
    }

    /// Parses the serialized string value.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "created" => Some(MessageStatus::Created),
            "sent" => Some(MessageStatus::Sent),
            "delivered" => Some(MessageStatus::Delivered),
            "read" => Some(MessageStatus::Read),
            _ => None,
        }
    }

    /// Position in the lifecycle, 0 (created) through 3 (read).
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            MessageStatus::Created => 0,
            MessageStatus::Sent => 1,
            MessageStatus::Delivered => 2,
            MessageStatus::Read => 3,
        }
    }
}

/// A message from one sender to a set of recipients.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    core: ObjectCore,
    sender: String,
    recipients: Vec<String>,
    content: String,
    subject: Option<String>,
    thread_ref: Option<String>,
    reply_to: Option<String>,
    status: MessageStatus,
}

impl Message {
    /// Creates a message in the `created` status.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        recipients: &[&str],
        content: impl Into<String>,
    ) -> Self {
        Self {
            core: ObjectCore::new(id, TypeTag::message()),
            sender: sender.into(),
            recipients: recipients.iter().map(|r| (*r).to_owned()).collect(),
            content: content.into(),
            subject: None,
            thread_ref: None,
            reply_to: None,
            status: MessageStatus::Created,
        }
    }

    /// Attaches a subject line.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Places the message in a thread.
    #[must_use]
    pub fn with_thread(mut self, thread_ref: impl Into<String>) -> Self {
        self.thread_ref = Some(thread_ref.into());
        self
    }

    /// Marks the message as a reply to another message.
    #[must_use]
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// The sender reference.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// The recipient references.
    #[must_use]
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    /// The message body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Current delivery status.
    #[must_use]
    pub fn status(&self) -> MessageStatus {
        self.status
    }

    /// Advances the delivery status.
    ///
    /// Regressions are ignored: a `read` message cannot return to `sent`.
    pub fn advance_status(&mut self, status: MessageStatus) {
        if status > self.status {
            self.status = status;
            self.core.touch();
        }
    }

    /// Reconstructs a message from its serialized record.
    ///
    /// # Errors
    ///
    /// Returns [`SerializedFormError`] on a wrong type tag, missing
    /// `sender`/`content`, an unknown status value, or mistyped fields.
    pub fn from_serialized(value: &Value) -> Result<Self, SerializedFormError> {
        let (core, data) = ObjectCore::from_serialized(value, &TypeTag::message())?;
        let status = match optional_str(&data, "status")? {
            None => MessageStatus::Created,
            Some(text) => {
                MessageStatus::parse(&text).ok_or(SerializedFormError::InvalidField {
                    field: "status",
                    expected: "message status",
                })?
            }
        };
        Ok(Self {
            core,
            sender: require_str(&data, "sender")?.to_owned(),
            recipients: str_list(&data, "recipients")?,
            content: require_str(&data, "content")?.to_owned(),
            subject: optional_str(&data, "subject")?,
            thread_ref: optional_str(&data, "threadRef")?,
            reply_to: optional_str(&data, "replyTo")?,
            status,
        })
    }
}

impl UorObject for Message {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn payload(&self) -> Value {
        let mut data = Map::new();
        data.insert("sender".to_owned(), json!(self.sender));
        data.insert("recipients".to_owned(), json!(self.recipients));
        data.insert("content".to_owned(), json!(self.content));
        if let Some(subject) = &self.subject {
            data.insert("subject".to_owned(), json!(subject));
        }
        if let Some(thread_ref) = &self.thread_ref {
            data.insert("threadRef".to_owned(), json!(thread_ref));
        }
        if let Some(reply_to) = &self.reply_to {
            data.insert("replyTo".to_owned(), json!(reply_to));
        }
        data.insert("status".to_owned(), json!(self.status.as_str()));
        Value::Object(data)
    }

    fn canonical_policy(&self) -> CanonicalPolicy {
        CanonicalPolicy::unordered(&["recipients"])
    }

    fn derive_factors(&self, builder: &mut DecompositionBuilder) {
        builder
            .attribute("sender", &json!(self.sender))
            .attribute("content", &json!(self.content))
            .attribute("subject", &json!(self.subject))
            .attribute("threadRef", &json!(self.thread_ref))
            .attribute("replyTo", &json!(self.reply_to))
            .attribute("status", &json!(self.status.as_str()))
            .elements(
                "recipients",
                &self.recipients.iter().map(|r| json!(r)).collect::<Vec<_>>(),
            );
    }

    fn measure_coherence(&self) -> CoherenceMeasure {
        let progression = f64::from(self.status.rank()) / f64::from(MessageStatus::Read.rank());
        CoherenceScore::new()
            .credit(0.2, !self.sender.is_empty())
            .credit(0.2, !self.recipients.is_empty())
            .credit(0.2, !self.content.is_empty())
            .credit(0.2, self.thread_ref.is_some() || self.reply_to.is_some())
            .partial(0.2, progression)
            .finish(self.type_tag().as_str())
    }

    fn validate(&self) -> bool {
        !self.id().is_empty()
            && !self.sender.is_empty()
            && !self.recipients.is_empty()
            && !self.content.is_empty()
    }
}
