// Typed wire values exchanged with the contracts

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// TYPED VALUE
// ============================================================================

/// A value passed to or returned from a contract function.
///
/// The tag fully determines the payload. Nothing is coerced between tags:
/// a `string-ascii` is never accepted where a `string-utf8` is expected.
///
/// Wire shape: `{"type": "uint", "value": 100000000}`. Keys may arrive in
/// either order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum TypedValue {
    /// Unsigned 128-bit integer
    Uint(u128),

    /// UTF-8 text (descriptions, option labels)
    StringUtf8(String),

    /// ASCII text (status names)
    StringAscii(String),

    /// Account identifier
    Principal(String),

    Bool(bool),

    /// Ordered sequence of values
    List(Vec<TypedValue>),

    /// Named record, used for `get-*` results
    Tuple(BTreeMap<String, TypedValue>),
}

impl TypedValue {
    pub fn uint(value: u128) -> Self {
        TypedValue::Uint(value)
    }

    pub fn string_utf8(value: impl Into<String>) -> Self {
        TypedValue::StringUtf8(value.into())
    }

    pub fn string_ascii(value: impl Into<String>) -> Self {
        TypedValue::StringAscii(value.into())
    }

    pub fn principal(value: impl Into<String>) -> Self {
        TypedValue::Principal(value.into())
    }

    pub fn bool(value: bool) -> Self {
        TypedValue::Bool(value)
    }

    pub fn list(values: impl IntoIterator<Item = TypedValue>) -> Self {
        TypedValue::List(values.into_iter().collect())
    }

    /// Build a list of `uint` values
    pub fn uint_list(values: impl IntoIterator<Item = u128>) -> Self {
        TypedValue::List(values.into_iter().map(TypedValue::Uint).collect())
    }

    /// Build a record from `(field, value)` pairs
    pub fn tuple<K: Into<String>>(fields: impl IntoIterator<Item = (K, TypedValue)>) -> Self {
        TypedValue::Tuple(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wire name of this value's tag
    pub fn type_name(&self) -> &'static str {
        match self {
            TypedValue::Uint(_) => "uint",
            TypedValue::StringUtf8(_) => "string-utf8",
            TypedValue::StringAscii(_) => "string-ascii",
            TypedValue::Principal(_) => "principal",
            TypedValue::Bool(_) => "bool",
            TypedValue::List(_) => "list",
            TypedValue::Tuple(_) => "tuple",
        }
    }

    pub fn as_uint(&self) -> Option<u128> {
        match self {
            TypedValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string_utf8(&self) -> Option<&str> {
        match self {
            TypedValue::StringUtf8(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string_ascii(&self) -> Option<&str> {
        match self {
            TypedValue::StringAscii(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_principal(&self) -> Option<&str> {
        match self {
            TypedValue::Principal(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&BTreeMap<String, TypedValue>> {
        match self {
            TypedValue::Tuple(fields) => Some(fields),
            _ => None,
        }
    }

    /// Look up a field of a tuple value
    pub fn field(&self, name: &str) -> Option<&TypedValue> {
        self.as_tuple().and_then(|fields| fields.get(name))
    }
}

// ============================================================================
// DECODING
// ============================================================================

/// Raw `{"type", "value"}` pair before the payload is checked against the tag
#[derive(Deserialize)]
struct TaggedPayload {
    #[serde(rename = "type")]
    tag: String,
    value: Value,
}

impl<'de> Deserialize<'de> for TypedValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let TaggedPayload { tag, value } = TaggedPayload::deserialize(deserializer)?;
        TypedValue::from_payload(&tag, value).map_err(de::Error::custom)
    }
}

impl TypedValue {
    fn from_payload(tag: &str, value: Value) -> Result<Self, String> {
        let invalid = |value: &Value| format!("invalid {} payload: {}", tag, value);

        match tag {
            // Exact digits survive because serde_json keeps numbers as text
            "uint" => match &value {
                Value::Number(n) => n
                    .to_string()
                    .parse::<u128>()
                    .map(TypedValue::Uint)
                    .map_err(|_| invalid(&value)),
                _ => Err(invalid(&value)),
            },
            "string-utf8" | "string-ascii" | "principal" => {
                let text = value.as_str().ok_or_else(|| invalid(&value))?.to_string();
                Ok(match tag {
                    "string-utf8" => TypedValue::StringUtf8(text),
                    "string-ascii" => TypedValue::StringAscii(text),
                    _ => TypedValue::Principal(text),
                })
            }
            "bool" => value.as_bool().map(TypedValue::Bool).ok_or_else(|| invalid(&value)),
            "list" => serde_json::from_value(value)
                .map(TypedValue::List)
                .map_err(|e| format!("invalid list payload: {}", e)),
            "tuple" => serde_json::from_value(value)
                .map(TypedValue::Tuple)
                .map_err(|e| format!("invalid tuple payload: {}", e)),
            other => Err(format!("unknown value type: {}", other)),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Uint(v) => write!(f, "u{}", v),
            TypedValue::StringUtf8(s) => write!(f, "u{:?}", s),
            TypedValue::StringAscii(s) => write!(f, "{:?}", s),
            TypedValue::Principal(p) => write!(f, "'{}", p),
            TypedValue::Bool(b) => write!(f, "{}", b),
            TypedValue::List(items) => {
                write!(f, "(list")?;
                for item in items {
                    write!(f, " {}", item)?;
                }
                write!(f, ")")
            }
            TypedValue::Tuple(fields) => {
                write!(f, "(tuple")?;
                for (name, value) in fields {
                    write!(f, " ({} {})", name, value)?;
                }
                write!(f, ")")
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
