use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A patient record as returned by the patient service.
///
/// The three vital fields are kept verbatim: the service is known to send
/// strings, numbers, nulls and garbage in any of them, and deciding what
/// counts as usable belongs to the field parsers, not to deserialization.
/// Any other payload fields (name, visit date, medications...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(deserialize_with = "deserialize_patient_id")]
    pub patient_id: String,
    #[serde(default)]
    pub blood_pressure: Option<Value>,
    #[serde(default)]
    pub temperature: Option<Value>,
    #[serde(default)]
    pub age: Option<Value>,
}

impl PatientRecord {
    pub fn new(
        patient_id: impl Into<String>,
        blood_pressure: Option<Value>,
        temperature: Option<Value>,
        age: Option<Value>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            blood_pressure,
            temperature,
            age,
        }
    }

    /// Convert one raw entry of a page into a record.
    ///
    /// Fails only when the entry has no usable identifier (or is not an
    /// object at all). Malformed vitals are never an error here. The entry
    /// is read in place; only the kept fields are copied out.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

/// Accept string or integer identifiers; numeric ids are rendered as text.
fn deserialize_patient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unusable patient_id: {other}"
        ))),
    }
}
