use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Concilia";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> &'static str {
    "concilia=info"
}

/// Get the application data directory
/// ~/Concilia/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Concilia")
}

/// Get the reference-data directory (rule set + concept dictionaries)
pub fn reference_dir() -> PathBuf {
    app_data_dir().join("reference")
}

/// Bundled rule-set file
pub fn rules_path() -> PathBuf {
    reference_dir().join("stopp_rules.json")
}

/// Bundled diagnosis concept dictionary
pub fn diagnosis_concepts_path() -> PathBuf {
    reference_dir().join("diagnosis_concepts.json")
}

/// Bundled medication concept dictionary
pub fn medication_concepts_path() -> PathBuf {
    reference_dir().join("medication_concepts.json")
}
