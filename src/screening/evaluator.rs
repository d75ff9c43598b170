use std::collections::BTreeSet;

use crate::models::{PatientAttributes, Rule};

use super::detection::MedicationDetection;
use super::store::RuleStore;
use super::types::Alert;

/// Evaluate every stored rule against one patient's detected concepts.
///
/// Pure over its inputs; the alert list preserves rule-store order, so the
/// same inputs always produce the same alerts in the same order. Records
/// that failed load-time validation never reach this function.
pub fn evaluate(
    attributes: &PatientAttributes,
    diagnoses: &BTreeSet<String>,
    medications: &MedicationDetection,
    store: &RuleStore,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for rule in store.rules() {
        if !conditions_met(rule, attributes) {
            continue;
        }
        if !diagnosis_trigger_met(rule, diagnoses) {
            continue;
        }
        if !medication_trigger_met(rule, medications) {
            continue;
        }

        alerts.push(Alert {
            rule_id: rule.id.clone(),
            message: rule.message.clone(),
        });
    }

    alerts
}

/// All attribute conditions must hold. An unknown or absent patient value
/// leaves the condition unmet: missing data suppresses the alert rather
/// than guessing.
fn conditions_met(rule: &Rule, attributes: &PatientAttributes) -> bool {
    rule.conditions.iter().all(|(name, constraint)| {
        match attributes.get(name) {
            Some(value) => constraint.satisfied_by(&value),
            None => false,
        }
    })
}

/// At least one diagnosis trigger must be matched by a detected concept,
/// exactly or as a code prefix (detected "h401" satisfies trigger "h40").
/// An empty trigger set has no diagnosis requirement.
fn diagnosis_trigger_met(rule: &Rule, detected: &BTreeSet<String>) -> bool {
    if rule.concept_triggers.is_empty() {
        return true;
    }
    rule.concept_triggers.iter().any(|trigger| {
        detected
            .iter()
            .any(|concept| concept == trigger || concept.starts_with(trigger.as_str()))
    })
}

/// At least one medication trigger must be contained in a detected
/// medication concept or raw medication line. An empty trigger set has no
/// medication requirement.
fn medication_trigger_met(rule: &Rule, medications: &MedicationDetection) -> bool {
    if rule.medication_triggers.is_empty() {
        return true;
    }
    rule.medication_triggers
        .iter()
        .any(|trigger| medications.contains_trigger(trigger))
}
