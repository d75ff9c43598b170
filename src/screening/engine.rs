use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

use crate::models::PatientAttributes;

use super::detection::{self, MedicationDetection};
use super::evaluator;
use super::reference::ConceptDictionary;
use super::report::{self, ScreeningReport};
use super::store::RuleStore;
use super::types::{Alert, ScreeningEngine, ScreeningError};

/// Default implementation of the screening engine.
///
/// Owns the loaded rule store and concept dictionaries; all state is
/// immutable after construction, so one engine may be shared read-only
/// across concurrent requests. Each request passes its own patient
/// attributes and text.
pub struct DefaultScreeningEngine {
    rules: RuleStore,
    diagnoses: ConceptDictionary,
    medications: ConceptDictionary,
}

impl DefaultScreeningEngine {
    pub fn new(
        rules: RuleStore,
        diagnoses: ConceptDictionary,
        medications: ConceptDictionary,
    ) -> Self {
        Self {
            rules,
            diagnoses,
            medications,
        }
    }

    /// Load all reference data from a directory using the bundled file
    /// names. Any load failure is fatal: the engine never serves requests
    /// against a partially loaded dataset.
    pub fn load(reference_dir: &Path) -> Result<Self, ScreeningError> {
        let rules = RuleStore::load(&reference_dir.join("stopp_rules.json"))?;
        let diagnoses =
            ConceptDictionary::load(&reference_dir.join("diagnosis_concepts.json"))?;
        let medications =
            ConceptDictionary::load(&reference_dir.join("medication_concepts.json"))?;

        tracing::info!(
            rules = rules.len(),
            skipped = rules.skipped().len(),
            diagnosis_concepts = diagnoses.len(),
            medication_concepts = medications.len(),
            "Screening reference data loaded"
        );

        Ok(Self::new(rules, diagnoses, medications))
    }

    /// Engine over the test fixtures (no file I/O).
    pub fn load_test() -> Self {
        Self::new(
            RuleStore::load_test(),
            ConceptDictionary::load_test_diagnoses(),
            ConceptDictionary::load_test_medications(),
        )
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }
}

impl ScreeningEngine for DefaultScreeningEngine {
    fn detect_diagnoses(&self, text: &str) -> BTreeSet<String> {
        detection::detect(text, &self.diagnoses)
    }

    fn detect_medications(&self, text: &str) -> MedicationDetection {
        detection::detect_medications(text, &self.medications)
    }

    fn evaluate(
        &self,
        attributes: &PatientAttributes,
        diagnoses: &BTreeSet<String>,
        medications: &MedicationDetection,
    ) -> Vec<Alert> {
        evaluator::evaluate(attributes, diagnoses, medications, &self.rules)
    }

    fn screen(
        &self,
        attributes: &PatientAttributes,
        history_text: &str,
        medication_text: &str,
    ) -> ScreeningReport {
        let start = Instant::now();

        let diagnoses = self.detect_diagnoses(history_text);
        let medications = self.detect_medications(medication_text);
        let alerts = self.evaluate(attributes, &diagnoses, &medications);

        let processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            rules = self.rules.len(),
            diagnoses = diagnoses.len(),
            medications = medications.concepts.len(),
            alerts = alerts.len(),
            processing_ms = processing_time_ms,
            "Screening complete"
        );

        report::assemble(
            attributes.clone(),
            &diagnoses,
            &medications,
            alerts,
            processing_time_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// End-to-end: notes + medication list through the full data flow.
    #[test]
    fn screen_runs_the_full_flow() {
        let engine = DefaultScreeningEngine::load_test();

        let mut patient = PatientAttributes::new(70);
        patient.heart_rate = Some(45);

        let report = engine.screen(
            &patient,
            "Paciente con bradicardia sinusal e insuficiencia renal.",
            "Bisoprolol 5mg\nIbuprofeno 600mg",
        );

        assert!(report
            .detected_diagnoses
            .contains(&"bradicardia".to_string()));
        assert!(report
            .detected_diagnoses
            .contains(&"insuficiencia_renal".to_string()));
        assert!(report
            .detected_medications
            .contains(&"betabloqueante".to_string()));

        let ids: Vec<&str> = report.alerts.iter().map(|a| a.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["R1", "STOPP-H1"]);
    }

    /// Empty text and medication list: empty sets, zero alerts, no error.
    #[test]
    fn screen_with_empty_inputs_yields_empty_report() {
        let engine = DefaultScreeningEngine::load_test();
        let report = engine.screen(&PatientAttributes::new(70), "", "");

        assert!(report.detected_diagnoses.is_empty());
        assert!(report.detected_medications.is_empty());
        assert!(report.medication_lines.is_empty());
        assert!(report.alerts.is_empty());
    }

    /// Repeated screening of the same inputs produces the same alerts in
    /// the same order.
    #[test]
    fn screen_is_deterministic() {
        let engine = DefaultScreeningEngine::load_test();
        let mut patient = PatientAttributes::new(80);
        patient.heart_rate = Some(44);
        patient.egfr = Some(25.0);

        let notes = "Antecedentes: fibrilacion auricular, erc avanzada.";
        let meds = "Digoxina 0.25mg\nBisoprolol 2.5mg\nLorazepam 1mg";

        let first = engine.screen(&patient, notes, meds);
        let second = engine.screen(&patient, notes, meds);

        assert_eq!(first.alerts, second.alerts);
        assert_eq!(first.detected_diagnoses, second.detected_diagnoses);
        assert_eq!(first.detected_medications, second.detected_medications);
    }

    /// The engine is consumable through the trait object seam.
    #[test]
    fn engine_works_behind_the_trait() {
        let engine: Box<dyn ScreeningEngine> = Box::new(DefaultScreeningEngine::load_test());
        let found = engine.detect_diagnoses("dm2 en tratamiento");
        assert!(found.contains("diabetes_mellitus"));
    }

    #[test]
    fn load_fails_on_missing_reference_dir() {
        let missing = Path::new("/nonexistent/reference");
        assert!(matches!(
            DefaultScreeningEngine::load(missing),
            Err(ScreeningError::ReferenceDataLoad(_, _))
        ));
    }

    #[test]
    fn load_reads_a_reference_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("stopp_rules.json"),
            r#"[{"id": "R1", "message": "m", "medication_triggers": ["bisoprolol"]}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("diagnosis_concepts.json"),
            r#"{"bradicardia": ["fc baja"]}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("medication_concepts.json"),
            r#"{"betabloqueante": ["bisoprolol"]}"#,
        )
        .unwrap();

        let engine = DefaultScreeningEngine::load(dir.path()).unwrap();
        assert_eq!(engine.rules().len(), 1);
    }
}
