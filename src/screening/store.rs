use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::models::Rule;

use super::types::{ScreeningError, SkippedRule};

/// The loaded, validated rule set, in source order.
///
/// A source that is not a JSON array at all is a fatal load error; the
/// process must not screen against a partially loaded rule set. Individual
/// records that fail validation are excluded and recorded in `skipped`, so
/// one bad rule never takes down the rest.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
    skipped: Vec<SkippedRule>,
}

impl RuleStore {
    /// Load rules from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ScreeningError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ScreeningError::ReferenceDataLoad(path.display().to_string(), e.to_string())
        })?;
        Self::from_json_named(&json, &path.display().to_string())
    }

    /// Parse rules from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ScreeningError> {
        Self::from_json_named(json, "inline rules")
    }

    fn from_json_named(json: &str, source: &str) -> Result<Self, ScreeningError> {
        let records: Vec<Value> = serde_json::from_str(json)
            .map_err(|e| ScreeningError::ReferenceDataParse(source.to_string(), e.to_string()))?;
        Ok(Self::from_records(records))
    }

    /// Validate each record independently, excluding and recording failures.
    pub fn from_records(records: Vec<Value>) -> Self {
        let mut rules = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let id = record
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string);

            let rule = match serde_json::from_value::<Rule>(record) {
                Ok(rule) => normalize(rule),
                Err(e) => {
                    tracing::warn!(index, id = id.as_deref(), error = %e, "Rule record skipped");
                    skipped.push(SkippedRule {
                        index,
                        id,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if let Some(reason) = rule.validation_error() {
                tracing::warn!(index, id = %rule.id, %reason, "Rule failed validation, skipped");
                skipped.push(SkippedRule {
                    index,
                    id: Some(rule.id),
                    reason,
                });
                continue;
            }

            for attribute in rule.unrecognized_attributes() {
                tracing::warn!(
                    id = %rule.id,
                    attribute,
                    "Rule conditions on an unrecognized attribute and can never fire"
                );
            }

            rules.push(rule);
        }

        Self { rules, skipped }
    }

    /// Validated rules, preserving source order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Records excluded at load time.
    pub fn skipped(&self) -> &[SkippedRule] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule set for tests (no file I/O), matching the test dictionaries.
    pub fn load_test() -> Self {
        let json = r#"[
            {
                "id": "R1",
                "message": "Avoid beta-blocker with bradycardia",
                "medication_triggers": ["bisoprolol", "atenolol"],
                "conditions": {"heart_rate": {"max": 50}}
            },
            {
                "id": "STOPP-B6",
                "message": "Avoid digoxin above 125 ug/day with reduced renal function",
                "medication_triggers": ["digoxina"],
                "conditions": {"age": {"min": 65}, "egfr": {"max": 30}}
            },
            {
                "id": "STOPP-D5",
                "message": "Avoid long-term benzodiazepines in older adults",
                "medication_triggers": ["benzodiacepina"],
                "conditions": {"age": {"min": 65}}
            },
            {
                "id": "STOPP-H1",
                "message": "Avoid NSAIDs with chronic kidney disease",
                "concept_triggers": ["insuficiencia_renal"],
                "medication_triggers": ["aine"]
            }
        ]"#;
        Self::from_json(json).expect("test rule set is well-formed")
    }
}

/// Lowercase trigger keys and condition attribute names so matching against
/// lowercased detection output is uniform.
fn normalize(mut rule: Rule) -> Rule {
    let lower = |triggers: Vec<String>| -> Vec<String> {
        triggers
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .collect()
    };
    rule.concept_triggers = lower(rule.concept_triggers);
    rule.medication_triggers = lower(rule.medication_triggers);
    rule.conditions = rule
        .conditions
        .into_iter()
        .map(|(name, constraint)| (name.trim().to_lowercase(), constraint))
        .collect::<BTreeMap<_, _>>();
    rule
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_test_rules_all_validate() {
        let store = RuleStore::load_test();
        assert_eq!(store.len(), 4);
        assert!(store.skipped().is_empty());
    }

    #[test]
    fn rule_order_is_preserved() {
        let store = RuleStore::load_test();
        let ids: Vec<&str> = store.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["R1", "STOPP-B6", "STOPP-D5", "STOPP-H1"]);
    }

    /// A record missing `message` is skipped; the well-formed record loads.
    #[test]
    fn malformed_record_is_isolated() {
        let store = RuleStore::from_json(
            r#"[
                {"id": "BAD", "medication_triggers": ["digoxina"]},
                {"id": "OK", "message": "ok", "medication_triggers": ["digoxina"]}
            ]"#,
        )
        .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.rules()[0].id, "OK");
        assert_eq!(store.skipped().len(), 1);
        assert_eq!(store.skipped()[0].index, 0);
        assert_eq!(store.skipped()[0].id.as_deref(), Some("BAD"));
        assert!(store.skipped()[0].reason.contains("message"));
    }

    /// A rule with no triggers and no conditions would fire for everyone.
    #[test]
    fn always_matching_rule_is_excluded() {
        let store = RuleStore::from_json(
            r#"[{"id": "VACUOUS", "message": "always"}]"#,
        )
        .unwrap();
        assert!(store.is_empty());
        assert!(store.skipped()[0].reason.contains("no triggers"));
    }

    #[test]
    fn blank_trigger_rule_is_excluded() {
        let store = RuleStore::from_json(
            r#"[{"id": "B", "message": "m", "medication_triggers": ["  "]}]"#,
        )
        .unwrap();
        assert!(store.is_empty());
        assert_eq!(store.skipped()[0].reason, "blank trigger string");
    }

    #[test]
    fn triggers_and_condition_keys_are_lowercased() {
        let store = RuleStore::from_json(
            r#"[{
                "id": "N",
                "message": "m",
                "concept_triggers": ["H40"],
                "medication_triggers": [" Bisoprolol "],
                "conditions": {"Heart_Rate": {"max": 50}}
            }]"#,
        )
        .unwrap();
        let rule = &store.rules()[0];
        assert_eq!(rule.concept_triggers, vec!["h40"]);
        assert_eq!(rule.medication_triggers, vec!["bisoprolol"]);
        assert!(rule.conditions.contains_key("heart_rate"));
    }

    #[test]
    fn whole_document_malformed_is_fatal() {
        let err = RuleStore::from_json(r#"{"not": "an array"}"#).unwrap_err();
        assert!(matches!(err, ScreeningError::ReferenceDataParse(_, _)));
    }

    #[test]
    fn load_reads_a_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "R1", "message": "m", "medication_triggers": ["digoxina"]}}]"#
        )
        .unwrap();

        let store = RuleStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn load_missing_file_is_a_load_error() {
        let err = RuleStore::load(Path::new("/nonexistent/rules.json")).unwrap_err();
        assert!(matches!(err, ScreeningError::ReferenceDataLoad(_, _)));
    }

    /// An unrecognized condition attribute keeps the rule (it can never
    /// fire) rather than excluding it: visible misconfiguration.
    #[test]
    fn unrecognized_attribute_does_not_exclude() {
        let store = RuleStore::from_json(
            r#"[{"id": "W", "message": "m", "conditions": {"weight": {"min": 80}}}]"#,
        )
        .unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.skipped().is_empty());
    }
}
