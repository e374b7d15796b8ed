use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Severity;

/// Field holding the vulnerability identifier (e.g. `CVE-2023-1234`).
pub const ID_FIELD: &str = "VulnerabilityID";

/// Field holding the severity label.
pub const SEVERITY_FIELD: &str = "Severity";

/// A single vulnerability record from a Trivy report.
///
/// Only `VulnerabilityID` and `Severity` are interpreted. Every other field is
/// kept verbatim, in the order it appeared in the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vulnerability {
    fields: Map<String, Value>,
}

impl Vulnerability {
    /// Wraps a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn severity_label(&self) -> Option<&str> {
        self.fields.get(SEVERITY_FIELD).and_then(Value::as_str)
    }

    pub fn severity(&self) -> Option<Severity> {
        self.severity_label().and_then(Severity::from_label)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the string value of a field, if present and a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}
