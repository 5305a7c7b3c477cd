//! Field values and field sets shared by drafts, payloads, and snapshots.
//!
//! # Design
//! - Pure data carriers; no locking or notification logic lives here.
//! - Values mirror plain JSON scalars so snapshots and payloads map 1:1.
//! - Keep ordering deterministic (`BTreeMap`) for payloads and tests.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{SettingsError, SettingsResult};
use crate::schema::FieldKind;

/// Scalar value held by a settings field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicitly unset value.
    Null,
    /// Boolean toggle value.
    Bool(bool),
    /// Numeric value, keeping integer/float fidelity.
    Number(Number),
    /// Free-form or enumerated text value.
    Text(String),
}

impl FieldValue {
    /// Kind of the value, or `None` for `Null`.
    #[must_use]
    pub const fn kind(&self) -> Option<FieldKind> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(FieldKind::Bool),
            Self::Number(_) => Some(FieldKind::Number),
            Self::Text(_) => Some(FieldKind::Text),
        }
    }

    /// Short type label used in validation errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
        }
    }

    /// Loose truthiness: null, `false`, zero, and empty text are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(value) => *value,
            Self::Number(number) => number.as_f64().is_some_and(|value| value != 0.0),
            Self::Text(text) => !text.is_empty(),
        }
    }

    /// Boolean payload when the value is a `Bool`.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Text payload when the value is `Text`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Render the value the way a form control displays it.
    #[must_use]
    pub fn display_value(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Convert a JSON member into a field value; arrays and objects are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidSnapshot`] when the JSON value is not a scalar.
    pub fn from_json(field: &str, value: &Value) -> SettingsResult<Self> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(flag) => Ok(Self::Bool(*flag)),
            Value::Number(number) => Ok(Self::Number(number.clone())),
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Array(_) | Value::Object(_) => Err(SettingsError::InvalidSnapshot {
                field: field.to_string(),
                reason: "must be a scalar",
            }),
        }
    }

    /// Convert the value into its JSON representation.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Number(number) => Value::Number(number.clone()),
            Self::Text(text) => Value::String(text.clone()),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Mapping from field name to value.
///
/// Used for the server-confirmed snapshot, for save payloads, and for the
/// merged view handed to renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSet(BTreeMap<String, FieldValue>);

impl FieldSet {
    /// Create an empty field set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Look up a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// Whether the set carries a value for `field`.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.0.insert(field.into(), value.into())
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.0.remove(field)
    }

    /// Number of fields in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.0.iter()
    }

    /// Field names in name order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Overwrite entries with every value in `other`.
    pub fn merge(&mut self, other: &Self) {
        for (field, value) in other.iter() {
            self.0.insert(field.clone(), value.clone());
        }
    }

    /// Build a field set from a JSON object of scalar members.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidSnapshot`] when the document is not an
    /// object or a member is not a scalar.
    pub fn from_json(value: &Value) -> SettingsResult<Self> {
        let Value::Object(members) = value else {
            return Err(SettingsError::InvalidSnapshot {
                field: "$".to_string(),
                reason: "must be an object",
            });
        };

        members
            .iter()
            .map(|(field, member)| Ok((field.clone(), FieldValue::from_json(field, member)?)))
            .collect::<SettingsResult<BTreeMap<_, _>>>()
            .map(Self)
    }

    /// Render the set as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let members: Map<String, Value> = self
            .0
            .iter()
            .map(|(field, value)| (field.clone(), value.to_json()))
            .collect();
        Value::Object(members)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FieldSet {
    type Item = (String, FieldValue);
    type IntoIter = btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
