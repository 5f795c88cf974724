//! Correlation Store
//!
//! A side-table mapping an owner identifier to the one foreign identifier it
//! depends on, e.g. a text filter's store entry to the button that resets it.
//! Entries are written once, when the owning widget is mounted, and read by
//! rules through correlation states. Many owners may name the same foreign
//! identifier; an owner names exactly one.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::ident::Identifier;

#[derive(Debug, Default)]
pub struct CorrelationStore {
    entries: DashMap<Identifier, Identifier>,
}

impl CorrelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `owner -> foreign`. Entries are write-once.
    pub fn set(&self, owner: Identifier, foreign: Identifier) -> Result<(), StoreError> {
        match self.entries.entry(owner) {
            Entry::Occupied(entry) => Err(StoreError::AlreadySet {
                owner: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(foreign);
                Ok(())
            }
        }
    }

    pub fn get(&self, owner: &Identifier) -> Result<Identifier, StoreError> {
        self.entries
            .get(owner)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::Missing {
                owner: owner.clone(),
            })
    }

    pub fn contains(&self, owner: &Identifier) -> bool {
        self.entries.contains_key(owner)
    }

    /// Owners whose entry names `foreign`.
    pub fn dependents_of(&self, foreign: &Identifier) -> Vec<Identifier> {
        self.entries
            .iter()
            .filter(|entry| entry.value() == foreign)
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the entry of an unmounted owner.
    pub(crate) fn retire(&self, owner: &Identifier) -> Option<Identifier> {
        self.entries.remove(owner).map(|(_, foreign)| foreign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::IdScheme;

    const STORE: IdScheme = IdScheme::new("TextFilter", "store");
    const BUTTON: IdScheme = IdScheme::new("ToggleButton", "button");

    #[test]
    fn set_then_get() {
        let store = CorrelationStore::new();
        store.set(STORE.id("f1"), BUTTON.id("b1")).unwrap();
        assert_eq!(store.get(&STORE.id("f1")).unwrap(), BUTTON.id("b1"));
        assert!(store.contains(&STORE.id("f1")));
    }

    #[test]
    fn entries_are_write_once() {
        let store = CorrelationStore::new();
        store.set(STORE.id("f1"), BUTTON.id("b1")).unwrap();

        let err = store.set(STORE.id("f1"), BUTTON.id("b2")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadySet { .. }));
        assert_eq!(store.get(&STORE.id("f1")).unwrap(), BUTTON.id("b1"));
    }

    #[test]
    fn absence_is_an_error() {
        let store = CorrelationStore::new();
        assert!(matches!(
            store.get(&STORE.id("nobody")),
            Err(StoreError::Missing { .. })
        ));
    }

    #[test]
    fn fan_in_is_allowed() {
        let store = CorrelationStore::new();
        store.set(STORE.id("f1"), BUTTON.id("b1")).unwrap();
        store.set(STORE.id("f2"), BUTTON.id("b1")).unwrap();
        store.set(STORE.id("f3"), BUTTON.id("b2")).unwrap();

        let mut owners = store.dependents_of(&BUTTON.id("b1"));
        owners.sort();
        assert_eq!(owners, vec![STORE.id("f1"), STORE.id("f2")]);
    }

    #[test]
    fn retire_frees_the_owner() {
        let store = CorrelationStore::new();
        store.set(STORE.id("f1"), BUTTON.id("b1")).unwrap();
        assert_eq!(store.retire(&STORE.id("f1")), Some(BUTTON.id("b1")));
        assert!(store.is_empty());
        store.set(STORE.id("f1"), BUTTON.id("b2")).unwrap();
    }
}
