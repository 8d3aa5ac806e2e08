//! `uor://` reference parsing and formatting.
//!
//! A reference names one object in one namespace:
//!
//! ```text
//! uor://<namespace>/<type>/<id>
//! ```
//!
//! Parsing is strict: a malformed reference is a caller error surfaced as
//! a typed [`ReferenceParseError`] at parse time, never retried and never
//! degraded to a "not found".

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uor_object::TypeTag;

/// The reference scheme prefix.
pub const SCHEME: &str = "uor://";

/// Why a reference string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceParseError {
    /// The string does not start with `uor://`.
    #[error("reference `{reference}` does not start with `uor://`")]
    MissingScheme {
        /// The offending reference string.
        reference: String,
    },

    /// A segment (namespace, type, or id) is absent.
    #[error("reference `{reference}` is missing its {segment} segment")]
    MissingSegment {
        /// The offending reference string.
        reference: String,
        /// Which segment is absent.
        segment: &'static str,
    },

    /// A segment is present but empty.
    #[error("reference `{reference}` has an empty {segment} segment")]
    EmptySegment {
        /// The offending reference string.
        reference: String,
        /// Which segment is empty.
        segment: &'static str,
    },
}

/// A parsed `uor://<namespace>/<type>/<id>` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UorReference {
    /// The namespace the reference is rooted in.
    pub namespace: String,
    /// The referenced object's type.
    pub type_tag: TypeTag,
    /// The referenced object's id.
    pub id: String,
}

impl UorReference {
    /// Creates a reference from its parts.
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        type_tag: TypeTag,
        id: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            type_tag,
            id: id.into(),
        }
    }

    /// Parses a reference string.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceParseError`] when the scheme is wrong or any of
    /// the three segments is missing or empty.
    pub fn parse(reference: &str) -> Result<Self, ReferenceParseError> {
        let rest = reference
            .strip_prefix(SCHEME)
            .ok_or_else(|| ReferenceParseError::MissingScheme {
                reference: reference.to_owned(),
            })?;

        let mut segments = rest.splitn(3, '/');
        let namespace = next_segment(&mut segments, reference, "namespace")?;
        let type_name = next_segment(&mut segments, reference, "type")?;
        let id = next_segment(&mut segments, reference, "id")?;

        Ok(Self {
            namespace: namespace.to_owned(),
            type_tag: TypeTag::new(type_name),
            id: id.to_owned(),
        })
    }

    /// The same object re-rooted in a different namespace.
    ///
    /// This is the shape of a resolution result: the reference that could
    /// not be found in its source namespace, rebased onto the namespace
    /// that holds it.
    #[must_use]
    pub fn in_namespace(&self, namespace: &str) -> Self {
        Self {
            namespace: namespace.to_owned(),
            type_tag: self.type_tag.clone(),
            id: self.id.clone(),
        }
    }

    /// Storage path of the referenced object: `<plural>/<id>.json`.
    #[must_use]
    pub fn storage_path(&self) -> String {
        format!("{}/{}.json", self.type_tag.plural(), self.id)
    }
}

fn next_segment<'a>(
    segments: &mut impl Iterator<Item = &'a str>,
    reference: &str,
    name: &'static str,
) -> Result<&'a str, ReferenceParseError> {
    match segments.next() {
        None => Err(ReferenceParseError::MissingSegment {
            reference: reference.to_owned(),
            segment: name,
        }),
        Some("") => Err(ReferenceParseError::EmptySegment {
            reference: reference.to_owned(),
            segment: name,
        }),
        Some(segment) => Ok(segment),
    }
}

impl fmt::Display for UorReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{SCHEME}{}/{}/{}",
            self.namespace,
            self.type_tag.as_str(),
            self.id
        )
    }
}

impl FromStr for UorReference {
    type Err = ReferenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// References serialize as their string form, the shape stored in cache
// entries and path records.
impl serde::Serialize for UorReference {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for UorReference {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
