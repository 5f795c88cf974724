//! Wildcard patterns over identifiers.

use std::borrow::Cow;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;

use super::identifier::{FieldValue, Identifier, Key, COMPONENT, INSTANCE, SUBCOMPONENT};
use super::token::InstanceId;

/// Wildcard marker replacing an identifier field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wildcard {
    /// Match any value and bind it across the rule's MATCH patterns.
    Match,
    /// Match every value.
    All,
}

impl Wildcard {
    pub fn as_str(&self) -> &'static str {
        match self {
            Wildcard::Match => "MATCH",
            Wildcard::All => "ALL",
        }
    }
}

/// One field of a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Exact(FieldValue),
    Wildcard(Wildcard),
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Slot::Exact(value) => value.serialize(serializer),
            Slot::Wildcard(wildcard) => [wildcard.as_str()].serialize(serializer),
        }
    }
}

impl From<Wildcard> for Slot {
    fn from(wildcard: Wildcard) -> Self {
        Slot::Wildcard(wildcard)
    }
}

impl From<FieldValue> for Slot {
    fn from(value: FieldValue) -> Self {
        Slot::Exact(value)
    }
}

impl From<&'static str> for Slot {
    fn from(value: &'static str) -> Self {
        Slot::Exact(value.into())
    }
}

impl From<i64> for Slot {
    fn from(value: i64) -> Self {
        Slot::Exact(value.into())
    }
}

impl From<InstanceId> for Slot {
    fn from(value: InstanceId) -> Self {
        Slot::Exact(value.into())
    }
}

impl From<&InstanceId> for Slot {
    fn from(value: &InstanceId) -> Self {
        Slot::Exact(value.clone().into())
    }
}

/// A field value captured by a wildcard during matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capture {
    pub key: Key,
    pub wildcard: Wildcard,
    pub value: FieldValue,
}

pub type Captures = SmallVec<[Capture; 2]>;

/// An identifier shape with zero or more wildcard fields.
///
/// Key sets must coincide exactly for a match: a pattern with an extra
/// `purpose` field never matches identifiers without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    fields: SmallVec<[(Key, Slot); 4]>,
}

impl Pattern {
    pub fn new(
        component: impl Into<Slot>,
        subcomponent: impl Into<Slot>,
        instance: impl Into<Slot>,
    ) -> Self {
        let mut pattern = Self {
            fields: SmallVec::new(),
        };
        pattern.insert(Cow::Borrowed(COMPONENT), component.into());
        pattern.insert(Cow::Borrowed(SUBCOMPONENT), subcomponent.into());
        pattern.insert(Cow::Borrowed(INSTANCE), instance.into());
        pattern
    }

    /// A wildcard-free pattern matching exactly `id`.
    pub fn exact(id: &Identifier) -> Self {
        let mut pattern = Self {
            fields: SmallVec::new(),
        };
        for (key, value) in id.fields() {
            pattern
                .fields
                .push((Cow::Owned(key.to_string()), Slot::Exact(value.clone())));
        }
        pattern
    }

    pub fn with_field(mut self, key: impl Into<Key>, slot: impl Into<Slot>) -> Self {
        self.insert(key.into(), slot.into());
        self
    }

    fn insert(&mut self, key: Key, slot: Slot) {
        match self
            .fields
            .binary_search_by(|(k, _)| k.as_ref().cmp(key.as_ref()))
        {
            Ok(i) => self.fields[i].1 = slot,
            Err(i) => self.fields.insert(i, (key, slot)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Slot> {
        self.fields
            .binary_search_by(|(k, _)| k.as_ref().cmp(key))
            .ok()
            .map(|i| &self.fields[i].1)
    }

    /// Match `id` against this pattern, capturing wildcard fields.
    ///
    /// Returns `None` on any structural difference; never fails otherwise.
    pub fn matches(&self, id: &Identifier) -> Option<Captures> {
        if self.fields.len() != id.len() {
            return None;
        }

        let mut captures = Captures::new();
        for ((key, slot), (id_key, value)) in self.fields.iter().zip(id.fields()) {
            if key.as_ref() != id_key {
                return None;
            }
            match slot {
                Slot::Exact(expected) if expected != value => return None,
                Slot::Exact(_) => {}
                Slot::Wildcard(wildcard) => captures.push(Capture {
                    key: key.clone(),
                    wildcard: *wildcard,
                    value: value.clone(),
                }),
            }
        }
        Some(captures)
    }

    /// Replace MATCH slots with the values bound in `captures`.
    ///
    /// MATCH slots without a binding are left in place.
    pub fn bind(&self, captures: &[Capture]) -> Pattern {
        let fields = self
            .fields
            .iter()
            .map(|(key, slot)| {
                let bound = match slot {
                    Slot::Wildcard(Wildcard::Match) => captures
                        .iter()
                        .find(|c| c.wildcard == Wildcard::Match && c.key == *key)
                        .map(|c| Slot::Exact(c.value.clone())),
                    _ => None,
                };
                (key.clone(), bound.unwrap_or_else(|| slot.clone()))
            })
            .collect();
        Pattern { fields }
    }

    /// Keys whose slot is the given wildcard.
    pub fn wildcard_keys(&self, wildcard: Wildcard) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(move |(key, slot)| match slot {
            Slot::Wildcard(w) if *w == wildcard => Some(key.as_ref()),
            _ => None,
        })
    }

    pub fn has_wildcard(&self, wildcard: Wildcard) -> bool {
        self.wildcard_keys(wildcard).next().is_some()
    }

    pub fn is_concrete(&self) -> bool {
        self.fields
            .iter()
            .all(|(_, slot)| matches!(slot, Slot::Exact(_)))
    }

    /// The identifier this pattern denotes, if it has no wildcards.
    pub fn to_identifier(&self) -> Option<Identifier> {
        let mut fields = Vec::with_capacity(self.fields.len());
        for (key, slot) in &self.fields {
            match slot {
                Slot::Exact(value) => fields.push((key.clone(), value.clone())),
                Slot::Wildcard(_) => return None,
            }
        }
        Identifier::from_fields(fields).ok()
    }

    /// Fixed `(component, subcomponent)` prefix used for registry indexing.
    pub(crate) fn prefix(&self) -> Option<(&FieldValue, &FieldValue)> {
        match (self.get(COMPONENT), self.get(SUBCOMPONENT)) {
            (Some(Slot::Exact(c)), Some(Slot::Exact(s))) => Some((c, s)),
            _ => None,
        }
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, slot) in &self.fields {
            map.serialize_entry(key.as_ref(), slot)?;
        }
        map.end()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(instance: &'static str) -> Identifier {
        Identifier::new("ToggleButton", "button", instance)
    }

    #[test]
    fn wildcard_captures_instance() {
        let pattern = Pattern::new("ToggleButton", "button", Wildcard::Match);
        let captures = pattern.matches(&button("b1")).unwrap();

        assert_eq!(captures.len(), 1);
        assert_eq!(captures[0].key, INSTANCE);
        assert_eq!(captures[0].wildcard, Wildcard::Match);
        assert_eq!(captures[0].value, FieldValue::from("b1"));
    }

    #[test]
    fn fixed_fields_must_agree() {
        let pattern = Pattern::new("ToggleButton", "button", Wildcard::All);
        assert!(pattern
            .matches(&Identifier::new("TextFilter", "button", "b1"))
            .is_none());
        assert!(pattern
            .matches(&Identifier::new("ToggleButton", "input", "b1"))
            .is_none());
    }

    #[test]
    fn key_sets_must_coincide() {
        let pattern = Pattern::new("ToggleButton", "button", Wildcard::All);
        let widened = button("b1").with_field("purpose", "apply");
        assert!(pattern.matches(&widened).is_none());

        let widened_pattern = pattern.with_field("purpose", "apply");
        assert!(widened_pattern.matches(&widened).is_some());
        assert!(widened_pattern.matches(&button("b1")).is_none());
    }

    #[test]
    fn exact_pattern_matches_only_its_identifier() {
        let id = button("b1");
        let pattern = Pattern::exact(&id);
        assert!(pattern.is_concrete());
        assert_eq!(pattern.matches(&id).map(|c| c.len()), Some(0));
        assert!(pattern.matches(&button("b2")).is_none());
        assert_eq!(pattern.to_identifier(), Some(id));
    }

    #[test]
    fn bind_substitutes_match_slots_only() {
        let input = Pattern::new("ToggleButton", "button", Wildcard::Match);
        let captures = input.matches(&button("b7")).unwrap();

        let output = Pattern::new("ToggleButton", "button", Wildcard::Match);
        assert_eq!(output.bind(&captures).to_identifier(), Some(button("b7")));

        let broadcast = Pattern::new("TextFilter", "input", Wildcard::All);
        assert_eq!(broadcast.bind(&captures), broadcast);
    }

    #[test]
    fn wildcards_display_as_bracketed_markers() {
        let pattern = Pattern::new("TextFilter", "store", Wildcard::All);
        assert_eq!(
            pattern.to_string(),
            r#"{"component":"TextFilter","instance":["ALL"],"subcomponent":"store"}"#
        );
    }

    #[test]
    fn prefix_requires_exact_tags() {
        assert!(Pattern::new("A", "b", Wildcard::All).prefix().is_some());
        assert!(Pattern::new(Wildcard::All, "b", "x").prefix().is_none());
    }
}
