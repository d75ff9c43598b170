use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::patient::{AttributeValue, PatientAttributes};

/// One STOPP/START-style screening rule.
///
/// Trigger sets use OR semantics within themselves; an empty set means the
/// axis has no requirement. Conditions are ANDed with the trigger checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Opaque unique identifier, surfaced verbatim in alerts.
    pub id: String,
    /// Human-readable alert text.
    pub message: String,
    /// Diagnosis concept keys; a detected concept satisfies a trigger by
    /// exact or prefix match ("h401" satisfies "h40").
    #[serde(default)]
    pub concept_triggers: Vec<String>,
    /// Medication concept keys or literal keywords, matched by
    /// case-insensitive containment.
    #[serde(default)]
    pub medication_triggers: Vec<String>,
    /// Attribute name → constraint. Omitted attribute = no constraint.
    #[serde(default)]
    pub conditions: BTreeMap<String, Constraint>,
}

/// Inclusive numeric bounds; either may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeBounds {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// A constraint on one patient attribute: an inclusive numeric range or an
/// exact-match scalar (case-insensitive for strings).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constraint {
    Range(RangeBounds),
    Exact(Value),
}

impl Constraint {
    /// Whether a resolved patient value satisfies this constraint.
    pub fn satisfied_by(&self, value: &AttributeValue) -> bool {
        match (self, value) {
            (Constraint::Range(bounds), AttributeValue::Number(n)) => {
                bounds.min.map_or(true, |min| *n >= min)
                    && bounds.max.map_or(true, |max| *n <= max)
            }
            (Constraint::Range(_), AttributeValue::Text(_)) => false,
            (Constraint::Exact(expected), actual) => match (expected, actual) {
                (Value::Number(e), AttributeValue::Number(n)) => e.as_f64() == Some(*n),
                (Value::String(e), AttributeValue::Text(t)) => {
                    e.to_lowercase() == t.to_lowercase()
                }
                _ => false,
            },
        }
    }

    /// Load-time shape check. Returns the defect, if any.
    fn validation_error(&self) -> Option<&'static str> {
        match self {
            Constraint::Range(bounds) => {
                if bounds.min.is_none() && bounds.max.is_none() {
                    Some("range constraint has neither min nor max")
                } else {
                    None
                }
            }
            Constraint::Exact(value) => match value {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => None,
                _ => Some("exact constraint must be a string, number, or bool"),
            },
        }
    }
}

impl Rule {
    /// Validate against the data-model invariants. Returns the reason this
    /// rule must be excluded from the store, if any.
    pub fn validation_error(&self) -> Option<String> {
        if self.id.trim().is_empty() {
            return Some("empty id".to_string());
        }
        if self.message.trim().is_empty() {
            return Some("empty message".to_string());
        }
        if self.concept_triggers.is_empty()
            && self.medication_triggers.is_empty()
            && self.conditions.is_empty()
        {
            return Some(
                "no triggers and no conditions (would fire for every patient)".to_string(),
            );
        }
        if self
            .concept_triggers
            .iter()
            .chain(self.medication_triggers.iter())
            .any(|t| t.trim().is_empty())
        {
            return Some("blank trigger string".to_string());
        }
        for (attribute, constraint) in &self.conditions {
            if let Some(defect) = constraint.validation_error() {
                return Some(format!("condition '{attribute}': {defect}"));
            }
        }
        None
    }

    /// Condition attribute names not in the canonical vocabulary. Such a
    /// condition can never hold, so the rule can never fire.
    pub fn unrecognized_attributes(&self) -> Vec<&str> {
        self.conditions
            .keys()
            .map(String::as_str)
            .filter(|name| {
                !PatientAttributes::KNOWN_ATTRIBUTES.contains(&name.to_lowercase().as_str())
            })
            .collect()
    }
}
