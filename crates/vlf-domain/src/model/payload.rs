//! Report payload as a typed tree of field values

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};
use vlf_types::ValidationError;

/// Non-text leaf values
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
}

/// One node of the payload tree
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Mapping(BTreeMap<String, FieldValue>),
    Sequence(Vec<FieldValue>),
    Text(String),
    Scalar(Scalar),
}

/// Rewrites leaves of a [`FieldValue`] tree.
///
/// Mappings and sequences are always rebuilt with the same keys and length;
/// only leaves go through the visitor.
pub trait FieldVisitor {
    fn visit_text(&mut self, text: String) -> FieldValue {
        FieldValue::Text(text)
    }

    fn visit_scalar(&mut self, scalar: Scalar) -> FieldValue {
        FieldValue::Scalar(scalar)
    }
}

/// Upper-cases every text leaf
pub struct Uppercase;

impl FieldVisitor for Uppercase {
    fn visit_text(&mut self, text: String) -> FieldValue {
        FieldValue::Text(text.to_uppercase())
    }
}

impl FieldValue {
    pub fn accept<V: FieldVisitor>(self, visitor: &mut V) -> FieldValue {
        match self {
            FieldValue::Mapping(map) => FieldValue::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, value.accept(visitor)))
                    .collect(),
            ),
            FieldValue::Sequence(items) => FieldValue::Sequence(
                items.into_iter().map(|value| value.accept(visitor)).collect(),
            ),
            FieldValue::Text(text) => visitor.visit_text(text),
            FieldValue::Scalar(scalar) => visitor.visit_scalar(scalar),
        }
    }

    /// Leaf rendered as text: strings as-is, numbers in their JSON form
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Scalar(Scalar::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Scalar(Scalar::Null),
            Value::Bool(b) => FieldValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => FieldValue::Scalar(Scalar::Number(n)),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => {
                FieldValue::Sequence(items.into_iter().map(FieldValue::from).collect())
            }
            Value::Object(map) => FieldValue::Mapping(
                map.into_iter().map(|(k, v)| (k, FieldValue::from(v))).collect(),
            ),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Scalar(Scalar::Null) => Value::Null,
            FieldValue::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            FieldValue::Scalar(Scalar::Number(n)) => Value::Number(n),
            FieldValue::Text(s) => Value::String(s),
            FieldValue::Sequence(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            FieldValue::Mapping(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Scalar(Scalar::Number(Number::from(value)))
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Scalar(Scalar::Number(Number::from(value)))
    }
}

/// Top-level report fields keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPayload {
    fields: BTreeMap<String, FieldValue>,
}

impl ReportPayload {
    /// Parse an uploaded JSON document; the top level must be an object
    pub fn from_json_str(content: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match FieldValue::from(value) {
            FieldValue::Mapping(fields) => Ok(Self { fields }),
            _ => Err(ValidationError::NotAnObject),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Field as text, `None` when absent or not a leaf
    pub fn text(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(FieldValue::as_text)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Run a visitor over every field value; keys are left untouched
    pub fn accept<V: FieldVisitor>(self, visitor: &mut V) -> Self {
        Self {
            fields: self
                .fields
                .into_iter()
                .map(|(key, value)| (key, value.accept(visitor)))
                .collect(),
        }
    }

    pub fn to_uppercase(self) -> Self {
        self.accept(&mut Uppercase)
    }

    /// JSON object handed to the template engine
    pub fn to_json(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ReportPayload {
        ReportPayload::from_value(json!({
            "cliente": "Luz del Sur",
            "cantidadTramos": 3,
            "aprobado": true,
            "nota": null,
            "equipos": ["hvb 45", {"serie": "ab-12", "kv": 34.5}],
            "detalle": {"ubicacion": "lima", "fases": ["a", "b"]}
        }))
        .unwrap()
    }

    #[test]
    fn test_uppercase_touches_only_text() {
        let upper = sample().to_uppercase();
        assert_eq!(upper.text("cliente").as_deref(), Some("LUZ DEL SUR"));
        assert_eq!(upper.get("cantidadTramos"), sample().get("cantidadTramos"));
        assert_eq!(upper.get("aprobado"), Some(&FieldValue::Scalar(Scalar::Bool(true))));
        assert_eq!(upper.get("nota"), Some(&FieldValue::Scalar(Scalar::Null)));

        let json = Value::Object(upper.to_json());
        assert_eq!(json["equipos"][0], "HVB 45");
        assert_eq!(json["equipos"][1]["serie"], "AB-12");
        assert_eq!(json["equipos"][1]["kv"], 34.5);
        assert_eq!(json["detalle"]["fases"], json!(["A", "B"]));
    }

    #[test]
    fn test_uppercase_is_idempotent() {
        let once = sample().to_uppercase();
        let twice = once.clone().to_uppercase();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_uppercase_preserves_structure() {
        let original = Value::Object(sample().to_json());
        let upper = Value::Object(sample().to_uppercase().to_json());

        let orig_obj = original.as_object().unwrap();
        let upper_obj = upper.as_object().unwrap();
        assert_eq!(
            orig_obj.keys().collect::<Vec<_>>(),
            upper_obj.keys().collect::<Vec<_>>()
        );
        assert_eq!(
            original["equipos"].as_array().unwrap().len(),
            upper["equipos"].as_array().unwrap().len()
        );
        assert!(upper["detalle"].is_object());
    }

    #[test]
    fn test_uppercase_keeps_keys() {
        let upper = sample().to_uppercase();
        assert!(upper.contains_key("cantidadTramos"));
        assert!(!upper.contains_key("CANTIDADTRAMOS"));
    }

    #[test]
    fn test_uppercase_accented_text() {
        let mut payload = ReportPayload::default();
        payload.insert("tensionPrueba", "Aceptación");
        let upper = payload.to_uppercase();
        assert_eq!(upper.text("tensionPrueba").as_deref(), Some("ACEPTACIÓN"));
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert!(matches!(
            ReportPayload::from_json_str("[1, 2]"),
            Err(ValidationError::NotAnObject)
        ));
        assert!(matches!(
            ReportPayload::from_json_str("{not json"),
            Err(ValidationError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_text_of_number() {
        let payload = sample();
        assert_eq!(payload.text("cantidadTramos").as_deref(), Some("3"));
        assert_eq!(payload.text("detalle"), None);
        assert_eq!(payload.text("missing"), None);
    }
}
