use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::reference::ConceptDictionary;

/// Scan free text for dictionary concepts.
///
/// Text is lowercased once; each concept is included the first time any of
/// its synonyms matches as a whole word. Empty text yields an empty set,
/// never an error. The result is a set: no duplicates, deterministic order.
pub fn detect(text: &str, dictionary: &ConceptDictionary) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    if text.trim().is_empty() {
        return found;
    }

    let lowered = text.to_lowercase();
    for entry in dictionary.entries() {
        if entry.matches(&lowered) {
            found.insert(entry.key.clone());
        }
    }
    found
}

/// Split a medication free-text block into one normalized name per line.
/// Lines are trimmed and lowercased; empty lines are discarded.
pub fn parse_medication_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Result of scanning the medication block: dictionary concepts plus the
/// raw normalized lines, kept so literal medication triggers can match
/// free-text entries the dictionary does not know.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicationDetection {
    pub concepts: BTreeSet<String>,
    pub lines: Vec<String>,
}

impl MedicationDetection {
    /// Whether a rule trigger is satisfied: case-insensitive containment in
    /// a detected concept key or in any raw medication line.
    pub fn contains_trigger(&self, trigger: &str) -> bool {
        let trigger = trigger.to_lowercase();
        self.concepts.iter().any(|key| key.contains(&trigger))
            || self.lines.iter().any(|line| line.contains(&trigger))
    }
}

/// Scan the medication block against the medication dictionary.
pub fn detect_medications(
    text: &str,
    dictionary: &ConceptDictionary,
) -> MedicationDetection {
    MedicationDetection {
        concepts: detect(text, dictionary),
        lines: parse_medication_lines(text),
    }
}
