//! Concilia screens a patient's free-text clinical notes and medication
//! list against a STOPP/START-style rule set and flags potentially
//! inappropriate medication combinations.
//!
//! The crate ends at the [`ScreeningReport`] bundle: collecting inputs,
//! rendering alerts, exporting PDFs, and external drug-database lookups are
//! collaborator surfaces, not part of the engine.
//!
//! ```
//! use concilia::models::PatientAttributes;
//! use concilia::{DefaultScreeningEngine, ScreeningEngine};
//!
//! let engine = DefaultScreeningEngine::load_test();
//!
//! let mut patient = PatientAttributes::new(70);
//! patient.heart_rate = Some(45);
//!
//! let report = engine.screen(
//!     &patient,
//!     "Paciente con bradicardia sinusal.",
//!     "Bisoprolol 5mg",
//! );
//! assert_eq!(report.alerts[0].to_string(), "R1: Avoid beta-blocker with bradycardia");
//! ```

pub mod config;
pub mod models;
pub mod screening;

pub use screening::{
    Alert, ConceptDictionary, DefaultScreeningEngine, MedicationDetection, RuleStore,
    ScreeningEngine, ScreeningError, ScreeningReport, SkippedRule,
};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for hosting surfaces. Honors RUST_LOG, falling back
/// to the crate default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
