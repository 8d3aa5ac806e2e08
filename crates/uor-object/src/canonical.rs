//! Canonicalization of JSON-like value trees.
//!
//! Every UOR object reduces to a unique normal form regardless of how its
//! source data was structured: object keys are ordered lexicographically at
//! every nesting level, fields with no semantic content (nulls, empty
//! strings, empty collections) are omitted, RFC 3339 date strings are
//! rewritten to a fixed UTC form, and arrays a type declares as unordered
//! collections are deterministically sorted.
//!
//! Which arrays count as unordered is a per-field decision owned by the
//! concrete object type, not by the canonicalizer: the caller supplies a
//! [`CanonicalPolicy`] naming the unordered fields, and every other array is
//! preserved in source order (message history, rewrite sequences).
//!
//! Canonicalization is a total function. Its contract fails only on cyclic
//! input, and a [`serde_json::Value`] is a tree by construction — a cycle
//! cannot be represented, and `serde_json`'s parser already bounds nesting
//! depth at 128.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use uor_object::canonical::{canonical_string, CanonicalPolicy};
//!
//! let policy = CanonicalPolicy::default();
//! let a = json!({ "b": 2, "a": 1 });
//! let b = json!({ "a": 1, "b": 2, "note": null });
//! assert_eq!(canonical_string(&a, &policy), canonical_string(&b, &policy));
//! ```

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Per-field array-ordering policy for canonicalization.
///
/// Fields named here hold unordered collections (tags, recipients,
/// participants); their array values are sorted by each element's canonical
/// string. Arrays under any other field are ordered sequences and keep their
/// source order. The field name matches at any nesting depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalPolicy {
    unordered: BTreeSet<String>,
}

impl CanonicalPolicy {
    /// Creates a policy with no unordered fields (all arrays sequential).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy marking the given field names as unordered.
    ///
    /// # Example
    ///
    /// ```
    /// use uor_object::canonical::CanonicalPolicy;
    ///
    /// let policy = CanonicalPolicy::unordered(&["tags", "recipients"]);
    /// assert!(policy.is_unordered("tags"));
    /// assert!(!policy.is_unordered("history"));
    /// ```
    #[must_use]
    pub fn unordered(fields: &[&str]) -> Self {
        Self {
            unordered: fields.iter().map(|f| (*f).to_owned()).collect(),
        }
    }

    /// Marks an additional field as an unordered collection.
    #[must_use]
    pub fn mark_unordered(mut self, field: &str) -> Self {
        self.unordered.insert(field.to_owned());
        self
    }

    /// Returns true if arrays under `field` are treated as unordered sets.
    #[must_use]
    pub fn is_unordered(&self, field: &str) -> bool {
        self.unordered.contains(field)
    }
}

/// Reduces a value tree to its canonical form.
///
/// Returns `Value::Null` when the input carries no semantic content at all
/// (null, empty string, or a tree of nothing but those).
#[must_use]
pub fn canonicalize(value: &Value, policy: &CanonicalPolicy) -> Value {
    canonical_value(value, policy, None).unwrap_or(Value::Null)
}

/// Canonicalizes a value tree and serializes it to a compact JSON string.
///
/// The string is the object's canonical content: key order, date form, and
/// unordered-collection order are all fixed, so structurally equal inputs
/// yield byte-identical output.
#[must_use]
pub fn canonical_string(value: &Value, policy: &CanonicalPolicy) -> String {
    canonicalize(value, policy).to_string()
}

/// Deterministic compact stringification of a value, with no field dropping.
///
/// Object keys iterate in lexicographic order (`serde_json`'s default map is
/// a `BTreeMap`), so the output is independent of insertion order. Used to
/// fold nested values into prime-factor identifiers.
#[must_use]
pub fn stable_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rewrites an RFC 3339 date string to the fixed UTC millisecond form.
///
/// Returns `None` when the string is not an RFC 3339 date.
///
/// # Example
///
/// ```
/// use uor_object::canonical::normalize_date;
///
/// assert_eq!(
///     normalize_date("2025-03-01T12:00:00+02:00").as_deref(),
///     Some("2025-03-01T10:00:00.000Z")
/// );
/// assert_eq!(normalize_date("not a date"), None);
/// ```
#[must_use]
pub fn normalize_date(text: &str) -> Option<String> {
    let parsed = DateTime::parse_from_rfc3339(text).ok()?;
    Some(format_date(&parsed.with_timezone(&Utc)))
}

/// Serializes a timestamp to the canonical ISO-8601 UTC millisecond form.
#[must_use]
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Recursive canonicalization step.
///
/// `field` is the object key holding `value`, used to look up the array
/// policy. `None` signals content with no semantic value, which the caller
/// drops.
fn canonical_value(value: &Value, policy: &CanonicalPolicy, field: Option<&str>) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Bool(_) | Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            if s.is_empty() {
                return None;
            }
            match normalize_date(s) {
                Some(normalized) => Some(Value::String(normalized)),
                None => Some(value.clone()),
            }
        }
        Value::Array(items) => {
            let mut out: Vec<Value> = items
                .iter()
                .filter_map(|item| canonical_value(item, policy, field))
                .collect();
            if out.is_empty() {
                return None;
            }
            if field.is_some_and(|f| policy.is_unordered(f)) {
                out.sort_by_key(|item| item.to_string());
            }
            Some(Value::Array(out))
        }
        Value::Object(entries) => {
            let mut out = Map::new();
            for (key, entry) in entries {
                if let Some(canonical) = canonical_value(entry, policy, Some(key)) {
                    out.insert(key.clone(), canonical);
                }
            }
            if out.is_empty() {
                return None;
            }
            Some(Value::Object(out))
        }
    }
}
