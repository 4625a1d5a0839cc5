// This is free and unencumbered software released into the public domain.

use super::{BridgeError, BridgeResult};
use alloc::collections::BTreeMap;
use bytes::Bytes;

/// A dynamically-typed message payload as carried by the method channel.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Bytes),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Converts a JSON document into a channel value.
    ///
    /// JSON has no byte strings, so arrays stay lists; integers that do not
    /// fit an `i64` become floats.
    pub fn from_json(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from_json).collect()),
            Json::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts a channel value into JSON. Byte buffers become arrays of
    /// integers; non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::String(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::Array(b.iter().map(|&x| Json::from(x)).collect()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// The named arguments of a single call.
///
/// Every accessor checks presence and type, so a malformed call surfaces as
/// [`BridgeError`] rather than a panic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments(BTreeMap<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    fn required(&self, name: &'static str) -> BridgeResult<&Value> {
        self.get(name).ok_or(BridgeError::MissingArgument(name))
    }

    pub fn bool(&self, name: &'static str) -> BridgeResult<bool> {
        let value = self.required(name)?;
        value
            .as_bool()
            .ok_or_else(|| mistyped(name, "bool", value))
    }

    pub fn int(&self, name: &'static str) -> BridgeResult<i32> {
        let value = self.required(name)?;
        let wide = value.as_int().ok_or_else(|| mistyped(name, "int", value))?;
        i32::try_from(wide)
            .map_err(|_| BridgeError::invalid_argument(name, format!("{wide} is out of range")))
    }

    /// The first character of a string argument.
    pub fn char(&self, name: &'static str) -> BridgeResult<char> {
        let value = self.required(name)?;
        let s = value
            .as_str()
            .ok_or_else(|| mistyped(name, "string", value))?;
        s.chars()
            .next()
            .ok_or_else(|| BridgeError::invalid_argument(name, "expected a non-empty string"))
    }
}

fn mistyped(name: &'static str, expected: &str, got: &Value) -> BridgeError {
    BridgeError::invalid_argument(name, format!("expected {expected}, got {}", got.type_name()))
}

impl From<Arguments> for Value {
    fn from(args: Arguments) -> Self {
        Value::Map(args.0)
    }
}

impl TryFrom<Value> for Arguments {
    type Error = BridgeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Arguments::default()),
            Value::Map(map) => Ok(Arguments(map)),
            other => Err(BridgeError::invalid_arguments(format!(
                "expected a map, got {}",
                other.type_name()
            ))),
        }
    }
}
