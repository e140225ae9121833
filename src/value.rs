//! Raw configuration values and the ordered raw configuration object.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A value as produced by the upstream parser, before flattening.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<String>),
}

impl RawValue {
    /// Loose truthiness: `false`, `null`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            RawValue::Null => false,
            RawValue::Bool(b) => *b,
            RawValue::Number(n) => *n != 0.0 && !n.is_nan(),
            RawValue::String(s) => !s.is_empty(),
            RawValue::List(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RawValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view; numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) if !n.is_nan() => Some(*n),
            RawValue::String(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            _ => None,
        }
    }

    /// Non-negative integer view, saturating at `u64::MAX` for infinity.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64)
    }

    /// List view: a single string counts as a one-element list.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            RawValue::List(items) => items.clone(),
            RawValue::String(s) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::String(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::String(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(value: Vec<String>) -> Self {
        RawValue::List(value)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(value: Vec<&str>) -> Self {
        RawValue::List(value.into_iter().map(String::from).collect())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawValue::Null, Into::into)
    }
}

impl fmt::Display for RawValue {
    /// Documentation rendering: strings are JSON-quoted, lists bracketed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("null"),
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            RawValue::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::String(s) => f.write_str(&quote(s)),
            RawValue::List(items) => {
                let inner: Vec<String> = items.iter().map(|s| quote(s)).collect();
                write!(f, "[{}]", inner.join(", "))
            }
        }
    }
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

/// One member of a definition's type union.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueType {
    Null,
    Boolean,
    String,
    Number,
    Path,
    Url,
    Date,
    /// Anything goes.
    Any,
    /// One of a fixed set of strings.
    OneOf(Vec<String>),
    /// The option may be given more than once and collects a list.
    List,
}

impl ValueType {
    pub fn one_of(values: &[&str]) -> Self {
        ValueType::OneOf(values.iter().map(|s| s.to_string()).collect())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Null => f.write_str("null"),
            ValueType::Boolean => f.write_str("Boolean"),
            ValueType::String => f.write_str("String"),
            ValueType::Number => f.write_str("Number"),
            ValueType::Path => f.write_str("Path"),
            ValueType::Url => f.write_str("URL"),
            ValueType::Date => f.write_str("Date"),
            ValueType::Any => f.write_str("Any"),
            ValueType::OneOf(values) => {
                let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
                f.write_str(&quoted.join(", "))
            }
            ValueType::List => f.write_str("(can be set multiple times)"),
        }
    }
}

/// The merged raw configuration object.
///
/// Keys keep insertion order; that order is the order in which flatten
/// rules run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawConfig {
    entries: IndexMap<String, RawValue>,
}

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, keeping the key's original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style [`RawConfig::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<RawValue> {
        self.entries.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Truthiness of a sibling value; missing keys are falsy.
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(RawValue::is_truthy)
    }

    /// A sibling value as a list of strings; missing keys give an empty list.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key).map(RawValue::to_list).unwrap_or_default()
    }

    /// Append `item` to the list at `key` unless it is already there.
    pub fn add_to_list(&mut self, key: &str, item: &str) {
        let mut list = self.list(key);
        if !list.iter().any(|i| i == item) {
            list.push(item.to_string());
        }
        self.set(key, RawValue::List(list));
    }

    /// Remove `item` from the list at `key`, if the key exists.
    pub fn remove_from_list(&mut self, key: &str, item: &str) {
        if self.contains_key(key) {
            let mut list = self.list(key);
            list.retain(|i| i != item);
            self.set(key, RawValue::List(list));
        }
    }

    /// Merge a higher-precedence layer on top of this one.
    ///
    /// Overlaid keys move to the end so they are flattened after the keys
    /// they override.
    pub fn overlay(&mut self, other: &RawConfig) {
        for (key, value) in other.iter() {
            self.entries.shift_remove(key);
            self.entries.insert(key.to_string(), value.clone());
        }
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut raw = RawConfig::new();
        for (k, v) in iter {
            raw.set(k, v);
        }
        raw
    }
}
