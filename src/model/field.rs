//! Tri-state document fields.
//!
//! Documents are untrusted input. Instead of failing the whole parse when a
//! single field has the wrong shape, every field is read into a [`Field`]
//! that remembers whether it was missing, present with the wrong JSON type,
//! or present and well-formed.

use std::fmt;

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

/// The JSON type of a raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    /// Classify a raw JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Boolean,
            Value::Number(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::Null => "null",
            JsonKind::Boolean => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        };
        write!(f, "{}", name)
    }
}

/// A payload type that can be read into a [`Field`].
pub trait FieldValue: DeserializeOwned {
    /// Human description of the expected shape, e.g. "a string".
    fn expected() -> &'static str;

    /// Whether a raw value of this kind is the right shape.
    fn accepts(kind: JsonKind) -> bool;
}

impl FieldValue for String {
    fn expected() -> &'static str {
        "a string"
    }

    fn accepts(kind: JsonKind) -> bool {
        kind == JsonKind::String
    }
}

impl FieldValue for bool {
    fn expected() -> &'static str {
        "a boolean"
    }

    fn accepts(kind: JsonKind) -> bool {
        kind == JsonKind::Boolean
    }
}

impl<T: DeserializeOwned> FieldValue for Vec<T> {
    fn expected() -> &'static str {
        "an array"
    }

    fn accepts(kind: JsonKind) -> bool {
        kind == JsonKind::Array
    }
}

impl FieldValue for Map<String, Value> {
    fn expected() -> &'static str {
        "an object"
    }

    fn accepts(kind: JsonKind) -> bool {
        kind == JsonKind::Object
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn expected() -> &'static str {
        T::expected()
    }

    fn accepts(kind: JsonKind) -> bool {
        kind == JsonKind::Null || T::accepts(kind)
    }
}

/// Implements [`FieldValue`] for record types read from JSON objects.
macro_rules! object_field_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::model::field::FieldValue for $ty {
                fn expected() -> &'static str {
                    "an object"
                }

                fn accepts(kind: $crate::model::field::JsonKind) -> bool {
                    kind == $crate::model::field::JsonKind::Object
                }
            }
        )*
    };
}

pub(crate) use object_field_value;

/// A document field that may be missing, malformed, or present.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// The key was absent.
    Missing,
    /// The key was present but held a value of the wrong shape.
    Invalid { found: JsonKind },
    /// The key held a well-formed value.
    Present(T),
}

/// Presence of a field, independent of its payload type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Missing,
    WrongType(String),
    Present,
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Missing
    }
}

impl<T> Field<T> {
    /// The payload, if present and well-formed.
    pub fn get(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }
}

impl Field<String> {
    /// The string payload, if present.
    pub fn as_deref(&self) -> Option<&str> {
        self.get().map(String::as_str)
    }
}

impl<T: FieldValue> Field<T> {
    /// Describe a shape mismatch, or `None` if the field is not malformed.
    pub fn type_error(&self) -> Option<String> {
        match self {
            Field::Invalid { found } if T::accepts(*found) => Some(format!(
                "must be {} (contains an element of the wrong type)",
                T::expected()
            )),
            Field::Invalid { found } => {
                Some(format!("must be {}, found {}", T::expected(), found))
            }
            _ => None,
        }
    }

    /// Presence of this field, with any shape mismatch described.
    pub fn presence(&self) -> Presence {
        match self {
            Field::Missing => Presence::Missing,
            Field::Present(_) => Presence::Present,
            Field::Invalid { .. } => Presence::WrongType(self.type_error().unwrap_or_default()),
        }
    }
}

impl<'de, T: FieldValue> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let found = JsonKind::of(&value);
        if !T::accepts(found) {
            return Ok(Field::Invalid { found });
        }
        Ok(match serde_json::from_value(value) {
            Ok(inner) => Field::Present(inner),
            Err(_) => Field::Invalid { found },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Probe {
        name: Field<String>,
        tags: Field<Vec<String>>,
        flag: Field<bool>,
        optional: Field<Option<String>>,
    }

    fn probe(value: Value) -> Probe {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn absent_key_is_missing() {
        let p = probe(json!({}));
        assert!(p.name.is_missing());
        assert_eq!(p.name.presence(), Presence::Missing);
    }

    #[test]
    fn well_formed_value_is_present() {
        let p = probe(json!({"name": "web-app", "flag": true}));
        assert_eq!(p.name.as_deref(), Some("web-app"));
        assert_eq!(p.flag.get(), Some(&true));
    }

    #[test]
    fn wrong_kind_is_invalid() {
        let p = probe(json!({"name": 42}));
        assert_eq!(
            p.name,
            Field::Invalid {
                found: JsonKind::Number
            }
        );
        assert_eq!(
            p.name.type_error().unwrap(),
            "must be a string, found number"
        );
    }

    #[test]
    fn null_is_invalid_for_required_string() {
        let p = probe(json!({"name": null}));
        assert!(matches!(p.name, Field::Invalid { found: JsonKind::Null }));
    }

    #[test]
    fn null_is_accepted_for_optional_payload() {
        let p = probe(json!({"optional": null}));
        assert_eq!(p.optional, Field::Present(None));
    }

    #[test]
    fn bad_array_element_is_described() {
        let p = probe(json!({"tags": ["a", 1]}));
        let err = p.tags.type_error().unwrap();
        assert!(err.contains("element of the wrong type"));
    }

    #[test]
    fn kind_display() {
        assert_eq!(JsonKind::of(&json!([])).to_string(), "array");
        assert_eq!(JsonKind::of(&json!({})).to_string(), "object");
    }
}
