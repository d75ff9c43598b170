use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::PatientAttributes;

use super::detection::MedicationDetection;
use super::report::ScreeningReport;

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// The output of a satisfied rule for one evaluation.
///
/// Alerts are produced independently per rule; distinct rule ids may carry
/// the same message and both are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub rule_id: String,
    pub message: String,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule_id, self.message)
    }
}

// ---------------------------------------------------------------------------
// SkippedRule
// ---------------------------------------------------------------------------

/// A rule record excluded at load time, with the reason it was excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRule {
    /// Zero-based position of the record in the source sequence.
    pub index: usize,
    /// The record's id, when it could be read.
    pub id: Option<String>,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// ScreeningError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ScreeningError {
    #[error("Reference data load failed ({0}): {1}")]
    ReferenceDataLoad(String, String),

    #[error("Reference data parse failed ({0}): {1}")]
    ReferenceDataParse(String, String),

    #[error("Invalid dictionary entry '{key}': {reason}")]
    InvalidDictionaryEntry { key: String, reason: String },

    #[error("Invalid synonym pattern '{synonym}': {detail}")]
    InvalidPattern { synonym: String, detail: String },
}

// ---------------------------------------------------------------------------
// ScreeningEngine trait
// ---------------------------------------------------------------------------

/// The screening seam consumed by UI and export collaborators.
///
/// Implementations hold the loaded rule store and dictionaries as immutable
/// state, so one engine can be shared read-only across requests.
pub trait ScreeningEngine {
    /// Scan free clinical text for diagnosis concepts.
    fn detect_diagnoses(&self, text: &str) -> BTreeSet<String>;

    /// Scan the medication block (one medication per line) for medication
    /// concepts and raw lines.
    fn detect_medications(&self, text: &str) -> MedicationDetection;

    /// Evaluate every stored rule; the alert list preserves rule order.
    fn evaluate(
        &self,
        attributes: &PatientAttributes,
        diagnoses: &BTreeSet<String>,
        medications: &MedicationDetection,
    ) -> Vec<Alert>;

    /// Run the full flow (detect, evaluate, assemble) for one patient.
    fn screen(
        &self,
        attributes: &PatientAttributes,
        history_text: &str,
        medication_text: &str,
    ) -> ScreeningReport;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_displays_id_and_message() {
        let alert = Alert {
            rule_id: "R1".to_string(),
            message: "Avoid beta-blocker with bradycardia".to_string(),
        };
        assert_eq!(
            alert.to_string(),
            "R1: Avoid beta-blocker with bradycardia"
        );
    }

    #[test]
    fn screening_error_messages_name_the_source() {
        let err = ScreeningError::ReferenceDataParse(
            "stopp_rules.json".to_string(),
            "expected an array".to_string(),
        );
        assert!(err.to_string().contains("stopp_rules.json"));
    }
}
