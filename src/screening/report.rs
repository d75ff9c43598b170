use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::PatientAttributes;

use super::detection::MedicationDetection;
use super::types::Alert;

/// The display-ready screening bundle handed to UI and export collaborators.
/// No further interpretation is required: alerts are ordered and rendered
/// per rule, detected sets are sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub id: Uuid,
    pub patient: PatientAttributes,
    pub detected_diagnoses: Vec<String>,
    pub detected_medications: Vec<String>,
    /// The normalized medication lines the patient entered, one per drug.
    pub medication_lines: Vec<String>,
    pub alerts: Vec<Alert>,
    pub generated_at: NaiveDateTime,
    pub processing_time_ms: u64,
}

/// Package one evaluation's inputs and outputs into a report.
pub fn assemble(
    patient: PatientAttributes,
    diagnoses: &BTreeSet<String>,
    medications: &MedicationDetection,
    alerts: Vec<Alert>,
    processing_time_ms: u64,
) -> ScreeningReport {
    ScreeningReport {
        id: Uuid::new_v4(),
        patient,
        detected_diagnoses: diagnoses.iter().cloned().collect(),
        detected_medications: medications.concepts.iter().cloned().collect(),
        medication_lines: medications.lines.clone(),
        alerts,
        generated_at: chrono::Local::now().naive_local(),
        processing_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ScreeningReport {
        let diagnoses = BTreeSet::from(["bradicardia".to_string()]);
        let medications = MedicationDetection {
            concepts: BTreeSet::from(["betabloqueante".to_string()]),
            lines: vec!["bisoprolol 5mg".to_string()],
        };
        let alerts = vec![Alert {
            rule_id: "R1".to_string(),
            message: "Avoid beta-blocker with bradycardia".to_string(),
        }];
        assemble(
            PatientAttributes::new(70),
            &diagnoses,
            &medications,
            alerts,
            3,
        )
    }

    #[test]
    fn assemble_carries_all_sections() {
        let report = sample_report();
        assert_eq!(report.patient.age, 70);
        assert_eq!(report.detected_diagnoses, vec!["bradicardia"]);
        assert_eq!(report.detected_medications, vec!["betabloqueante"]);
        assert_eq!(report.medication_lines, vec!["bisoprolol 5mg"]);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.processing_time_ms, 3);
    }

    #[test]
    fn report_serializes_for_the_exporter() {
        let report = sample_report();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("patient").is_some());
        assert!(json.get("detected_diagnoses").is_some());
        assert!(json.get("detected_medications").is_some());
        assert!(json.get("alerts").is_some());
        assert_eq!(json["alerts"][0]["rule_id"], "R1");
    }

    #[test]
    fn reports_get_distinct_ids() {
        assert_ne!(sample_report().id, sample_report().id);
    }
}
