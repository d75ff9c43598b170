use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;

use super::types::ScreeningError;

/// One canonical concept with its compiled synonym patterns.
#[derive(Debug)]
pub struct ConceptEntry {
    /// Canonical concept key (diagnosis code or drug class), lowercased.
    pub key: String,
    /// Surface forms, lowercased and trimmed, in source order.
    pub synonyms: Vec<String>,
    patterns: Vec<Regex>,
}

impl ConceptEntry {
    /// Whether any synonym occurs as a whole word in the lowercased text.
    /// Short-circuits on the first matching synonym.
    pub fn matches(&self, lowercased_text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(lowercased_text))
    }
}

/// Read-only synonym dictionary mapping canonical concept keys to the
/// surface forms that identify them in free text.
///
/// Loaded once at startup from JSON (`{"key": ["synonym", ...], ...}`) and
/// immutable thereafter. Word-boundary patterns are compiled here, with
/// regex metacharacters escaped, so detection never builds a regex per call.
#[derive(Debug, Default)]
pub struct ConceptDictionary {
    entries: Vec<ConceptEntry>,
}

impl ConceptDictionary {
    /// Load a dictionary from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ScreeningError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ScreeningError::ReferenceDataLoad(path.display().to_string(), e.to_string())
        })?;
        Self::from_json_named(&json, &path.display().to_string())
    }

    /// Parse a dictionary from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ScreeningError> {
        Self::from_json_named(json, "inline dictionary")
    }

    fn from_json_named(json: &str, source: &str) -> Result<Self, ScreeningError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)
            .map_err(|e| ScreeningError::ReferenceDataParse(source.to_string(), e.to_string()))?;
        Self::from_map(raw)
    }

    /// Build a dictionary from an already-parsed map, validating every entry.
    pub fn from_map(map: BTreeMap<String, Vec<String>>) -> Result<Self, ScreeningError> {
        let mut entries = Vec::with_capacity(map.len());

        for (key, synonyms) in map {
            let key = key.trim().to_lowercase();
            if key.is_empty() {
                return Err(ScreeningError::InvalidDictionaryEntry {
                    key: "<blank>".to_string(),
                    reason: "empty concept key".to_string(),
                });
            }
            if synonyms.is_empty() {
                return Err(ScreeningError::InvalidDictionaryEntry {
                    key,
                    reason: "empty synonym list".to_string(),
                });
            }

            let mut cleaned = Vec::with_capacity(synonyms.len());
            let mut patterns = Vec::with_capacity(synonyms.len());
            for synonym in synonyms {
                let synonym = synonym.trim().to_lowercase();
                if synonym.is_empty() {
                    return Err(ScreeningError::InvalidDictionaryEntry {
                        key,
                        reason: "blank synonym string".to_string(),
                    });
                }
                let regex = Regex::new(&word_bounded(&synonym)).map_err(|e| {
                    ScreeningError::InvalidPattern {
                        synonym: synonym.clone(),
                        detail: e.to_string(),
                    }
                })?;
                cleaned.push(synonym);
                patterns.push(regex);
            }

            entries.push(ConceptEntry {
                key,
                synonyms: cleaned,
                patterns,
            });
        }

        Ok(Self { entries })
    }

    /// Entries in key order.
    pub fn entries(&self) -> &[ConceptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diagnosis dictionary for tests (no file I/O).
    pub fn load_test_diagnoses() -> Self {
        Self::from_map(BTreeMap::from([
            (
                "bradicardia".to_string(),
                vec![
                    "bradicardia".to_string(),
                    "fc baja".to_string(),
                    "frecuencia cardiaca baja".to_string(),
                ],
            ),
            (
                "diabetes_mellitus".to_string(),
                vec![
                    "diabetes".to_string(),
                    "diabetes mellitus".to_string(),
                    "dm2".to_string(),
                ],
            ),
            (
                "insuficiencia_renal".to_string(),
                vec![
                    "insuficiencia renal".to_string(),
                    "enfermedad renal cronica".to_string(),
                    "erc".to_string(),
                ],
            ),
            (
                "h401".to_string(),
                vec![
                    "glaucoma de angulo abierto".to_string(),
                    "glaucoma cronico simple".to_string(),
                ],
            ),
            (
                "i48".to_string(),
                vec![
                    "fibrilacion auricular".to_string(),
                    "fa paroxistica".to_string(),
                ],
            ),
        ]))
        .expect("test diagnosis dictionary is well-formed")
    }

    /// Medication dictionary for tests (no file I/O).
    pub fn load_test_medications() -> Self {
        Self::from_map(BTreeMap::from([
            (
                "betabloqueante".to_string(),
                vec![
                    "bisoprolol".to_string(),
                    "atenolol".to_string(),
                    "metoprolol".to_string(),
                    "carvedilol".to_string(),
                ],
            ),
            (
                "aine".to_string(),
                vec![
                    "ibuprofeno".to_string(),
                    "naproxeno".to_string(),
                    "diclofenaco".to_string(),
                    "ac. acetilsalicilico (aas)".to_string(),
                ],
            ),
            (
                "benzodiacepina".to_string(),
                vec![
                    "diazepam".to_string(),
                    "lorazepam".to_string(),
                    "alprazolam".to_string(),
                ],
            ),
            ("digoxina".to_string(), vec!["digoxina".to_string()]),
        ]))
        .expect("test medication dictionary is well-formed")
    }
}

/// Escaped whole-word pattern for one synonym. A `\b` anchor only exists
/// next to a word character, so edges that are already non-word (e.g. the
/// closing paren of "(aas)") get no anchor.
fn word_bounded(synonym: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut pattern = String::new();
    if synonym.chars().next().is_some_and(is_word) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(synonym));
    if synonym.chars().next_back().is_some_and(is_word) {
        pattern.push_str(r"\b");
    }
    pattern
}
