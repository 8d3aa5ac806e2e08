//! Coherence measurement — a bounded completeness score.
//!
//! Coherence quantifies how well an object's current state reflects a
//! complete UOR object: identity present, factors derivable, profile or
//! content fields filled in. Each concrete type owns its own weight table
//! (summing to at most 1.0 in the maximal case); all types expose the same
//! `{type, value, normalization}` result shape with `value` in `[0, 1]`.
//!
//! The measure is a unary heuristic over one object's state. The axiom
//! vocabulary also describes coherence as a symmetric, triangle-inequality
//! pairwise distance; that reading is aspirational documentation — the
//! implemented and tested contract is the unary completeness score.
//!
//! Measuring never mutates the object and never fails.

use serde::{Deserialize, Serialize};

/// How per-signal contributions combine into the final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// Independent weighted contributions, summed and clamped to `[0, 1]`.
    #[serde(rename = "linear-sum")]
    LinearSum,
}

impl Normalization {
    /// Returns the string value used in serialized measures.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Normalization::LinearSum => "linear-sum",
        }
    }
}

/// The result of measuring an object's coherence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceMeasure {
    /// Type tag of the measured object.
    #[serde(rename = "type")]
    pub kind: String,
    /// Completeness score in `[0, 1]`.
    pub value: f64,
    /// Combination rule for the per-signal contributions.
    pub normalization: Normalization,
}

/// Accumulates weighted presence/quality signals for one measurement.
///
/// Each signal contributes `weight` when fully earned, or a clamped
/// fraction of it. The finished value is clamped to `[0, 1]`, so a weight
/// table that sums past 1.0 still produces a bounded measure.
///
/// # Example
///
/// ```
/// use uor_object::coherence::CoherenceScore;
///
/// let measure = CoherenceScore::new()
///     .credit(0.5, true)        // provider verification
///     .partial(0.5, 3.0 / 5.0)  // 3 of 5 profile fields
///     .finish("identity");
/// assert!((measure.value - 0.8).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoherenceScore {
    value: f64,
}

impl CoherenceScore {
    /// Starts an empty score.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the full weight when the signal is present.
    #[must_use]
    pub fn credit(mut self, weight: f64, earned: bool) -> Self {
        if earned {
            self.value += weight;
        }
        self
    }

    /// Adds a fraction of the weight, with the fraction clamped to `[0, 1]`.
    #[must_use]
    pub fn partial(mut self, weight: f64, fraction: f64) -> Self {
        self.value += weight * fraction.clamp(0.0, 1.0);
        self
    }

    /// Finalizes the measure for the given type tag.
    #[must_use]
    pub fn finish(self, kind: impl Into<String>) -> CoherenceMeasure {
        CoherenceMeasure {
            kind: kind.into(),
            value: self.value.clamp(0.0, 1.0),
            normalization: Normalization::LinearSum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_score_is_zero() {
        let measure = CoherenceScore::new().finish("concept");
        assert_eq!(measure.value, 0.0);
        assert_eq!(measure.kind, "concept");
        assert_eq!(measure.normalization, Normalization::LinearSum);
    }

    #[test]
    fn unearned_credit_contributes_nothing() {
        let measure = CoherenceScore::new()
            .credit(0.5, false)
            .credit(0.25, true)
            .finish("resource");
        assert!((measure.value - 0.25).abs() < 1e-9);
    }

    #[test]
    fn fractions_are_clamped() {
        let measure = CoherenceScore::new().partial(0.4, 2.5).finish("message");
        assert!((measure.value - 0.4).abs() < 1e-9);
    }

    #[test]
    fn finished_value_is_bounded() {
        let measure = CoherenceScore::new()
            .credit(0.8, true)
            .credit(0.8, true)
            .finish("message");
        assert_eq!(measure.value, 1.0);
    }

    #[test]
    fn serializes_with_expected_field_names() {
        let measure = CoherenceScore::new().credit(1.0, true).finish("topic");
        let json = serde_json::json!(measure);
        assert_eq!(json["type"], "topic");
        assert_eq!(json["value"], 1.0);
        assert_eq!(json["normalization"], "linear-sum");
    }
}
