use serde::{Deserialize, Serialize};

use super::enums::Sex;

/// Typed clinical values for one screening request.
///
/// Every field except `age` is optional. An absent value is "unknown", not
/// zero: rule conditions on an unknown attribute never hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientAttributes {
    /// Age in years.
    pub age: u32,
    #[serde(default)]
    pub sex: Sex,
    /// Heart rate in beats/min.
    pub heart_rate: Option<i32>,
    /// Serum creatinine in mg/dL.
    pub creatinine: Option<f64>,
    /// Estimated glomerular filtration rate in mL/min/1.73m².
    pub egfr: Option<f64>,
    /// Serum potassium in mEq/L.
    pub potassium: Option<f64>,
}

/// A patient value as seen by rule conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl PatientAttributes {
    /// Canonical attribute names that rule conditions may reference.
    pub const KNOWN_ATTRIBUTES: &'static [&'static str] = &[
        "age",
        "sex",
        "heart_rate",
        "creatinine",
        "egfr",
        "potassium",
    ];

    pub fn new(age: u32) -> Self {
        Self {
            age,
            sex: Sex::Unspecified,
            heart_rate: None,
            creatinine: None,
            egfr: None,
            potassium: None,
        }
    }

    /// Resolve an attribute by canonical name (case-insensitive).
    ///
    /// Returns `None` for unknown names and for attributes the patient did
    /// not supply; unspecified sex counts as not supplied.
    pub fn get(&self, name: &str) -> Option<AttributeValue> {
        match name.to_lowercase().as_str() {
            "age" => Some(AttributeValue::Number(f64::from(self.age))),
            "sex" => match self.sex {
                Sex::Unspecified => None,
                sex => Some(AttributeValue::Text(sex.as_str().to_string())),
            },
            "heart_rate" => self.heart_rate.map(|v| AttributeValue::Number(f64::from(v))),
            "creatinine" => self.creatinine.map(AttributeValue::Number),
            "egfr" => self.egfr.map(AttributeValue::Number),
            "potassium" => self.potassium.map(AttributeValue::Number),
            _ => None,
        }
    }
}
