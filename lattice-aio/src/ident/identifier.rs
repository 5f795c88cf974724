//! Concrete identifiers and property references.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use super::token::InstanceId;
use crate::error::ParseError;

/// Field name or tag. Widget code uses `&'static str` constants, parsed
/// identifiers own their strings.
pub type Key = Cow<'static, str>;

pub const COMPONENT: &str = "component";
pub const SUBCOMPONENT: &str = "subcomponent";
pub const INSTANCE: &str = "instance";

/// Value of a single identifier field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Str(Cow<'static, str>),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => b.fmt(f),
            FieldValue::Int(i) => i.fmt(f),
            FieldValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&'static str> for FieldValue {
    fn from(value: &'static str) -> Self {
        FieldValue::Str(Cow::Borrowed(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(Cow::Owned(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<InstanceId> for FieldValue {
    fn from(value: InstanceId) -> Self {
        FieldValue::Str(value.into())
    }
}

/// Structured address of one sub-element of one widget instance.
///
/// Fields are kept sorted by key, so two identifiers are equal exactly when
/// every field is equal, regardless of the order they were built in. The
/// `component`, `subcomponent` and `instance` fields are always present and
/// always strings.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    fields: SmallVec<[(Key, FieldValue); 4]>,
}

impl Identifier {
    pub fn new(
        component: impl Into<Key>,
        subcomponent: impl Into<Key>,
        instance: impl Into<InstanceId>,
    ) -> Self {
        let mut id = Self {
            fields: SmallVec::new(),
        };
        id.insert(Cow::Borrowed(COMPONENT), FieldValue::Str(component.into()));
        id.insert(Cow::Borrowed(SUBCOMPONENT), FieldValue::Str(subcomponent.into()));
        id.insert(Cow::Borrowed(INSTANCE), instance.into().into());
        id
    }

    /// Add an extra field, widening the identifier "in breadth".
    ///
    /// The reserved keys must keep string values; use [`Identifier::new`] for
    /// them.
    pub fn with_field(mut self, key: impl Into<Key>, value: impl Into<FieldValue>) -> Self {
        let key = key.into();
        debug_assert!(
            !matches!(key.as_ref(), COMPONENT | SUBCOMPONENT | INSTANCE),
            "reserved identifier field '{key}'"
        );
        self.insert(key, value.into());
        self
    }

    /// Build an identifier from raw fields, checking the reserved ones.
    pub fn from_fields<K>(fields: impl IntoIterator<Item = (K, FieldValue)>) -> Result<Self, ParseError>
    where
        K: Into<Key>,
    {
        let mut id = Self {
            fields: SmallVec::new(),
        };
        for (key, value) in fields {
            id.insert(key.into(), value);
        }
        for field in [COMPONENT, SUBCOMPONENT, INSTANCE] {
            if id.get(field).and_then(FieldValue::as_str).is_none() {
                return Err(ParseError::MissingField { field });
            }
        }
        Ok(id)
    }

    fn insert(&mut self, key: Key, value: FieldValue) {
        match self.position(&key) {
            Ok(i) => self.fields[i].1 = value,
            Err(i) => self.fields.insert(i, (key, value)),
        }
    }

    fn position(&self, key: &str) -> Result<usize, usize> {
        self.fields.binary_search_by(|(k, _)| k.as_ref().cmp(key))
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.position(key).ok().map(|i| &self.fields[i].1)
    }

    pub fn component(&self) -> &str {
        self.get(COMPONENT).and_then(FieldValue::as_str).unwrap_or_default()
    }

    pub fn subcomponent(&self) -> &str {
        self.get(SUBCOMPONENT).and_then(FieldValue::as_str).unwrap_or_default()
    }

    pub fn instance(&self) -> &str {
        self.get(INSTANCE).and_then(FieldValue::as_str).unwrap_or_default()
    }

    /// Fields in key order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key.as_ref(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, FieldValue>::deserialize(deserializer)?;
        Identifier::from_fields(raw).map_err(D::Error::custom)
    }
}

/// Canonical JSON with sorted keys.
impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({self})")
    }
}

impl FromStr for Identifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

/// One property of one addressed sub-element, e.g. a button's `n_clicks`.
///
/// Printed as `<canonical identifier JSON>.<property>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropRef {
    pub id: Identifier,
    pub property: Key,
}

impl PropRef {
    pub fn new(id: Identifier, property: impl Into<Key>) -> Self {
        Self {
            id,
            property: property.into(),
        }
    }
}

impl fmt::Display for PropRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.property)
    }
}

impl FromStr for PropRef {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, property) = s
            .rsplit_once('.')
            .filter(|(_, property)| !property.is_empty() && !property.contains('}'))
            .ok_or_else(|| ParseError::MissingProperty {
                input: s.to_string(),
            })?;
        Ok(Self::new(id.parse()?, property.to_string()))
    }
}
