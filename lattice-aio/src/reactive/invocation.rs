//! Invocation snapshots.
//!
//! An [`Invocation`] is everything a handler sees: which properties fired and
//! the resolved values of its inputs, states and output candidates, taken at
//! one instant. Handlers never read live state directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ident::{Identifier, Key, PropRef};

/// A property change: the inbound trigger surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub prop: PropRef,
    pub value: Value,
}

impl TriggerEvent {
    pub fn new(id: Identifier, property: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self {
            prop: PropRef::new(id, property),
            value: value.into(),
        }
    }
}

/// A resolved dependency value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    /// Current property value; `Null` if never set.
    Prop(Value),
    /// The owner's correlation entry, `None` if it has none.
    Correlation(Option<Identifier>),
}

/// One matched sub-element and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub id: Identifier,
    pub property: Key,
    pub value: ResolvedValue,
}

impl Resolved {
    pub fn prop(id: Identifier, property: impl Into<Key>, value: Value) -> Self {
        Self {
            id,
            property: property.into(),
            value: ResolvedValue::Prop(value),
        }
    }

    pub fn correlation(owner: Identifier, foreign: Option<Identifier>) -> Self {
        Self {
            id: owner,
            property: Key::Borrowed(CORRELATION),
            value: ResolvedValue::Correlation(foreign),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.value {
            ResolvedValue::Prop(value) => Some(value),
            ResolvedValue::Correlation(_) => None,
        }
    }

    pub fn foreign(&self) -> Option<&Identifier> {
        match &self.value {
            ResolvedValue::Correlation(foreign) => foreign.as_ref(),
            ResolvedValue::Prop(_) => None,
        }
    }
}

/// Property name reported for correlation states.
pub const CORRELATION: &str = "correlation";

/// Snapshot handed to a rule handler.
///
/// `inputs`, `states` and `outputs` hold one list per declared dependency, in
/// declaration order. Each list holds every live match in mount order: a
/// single element for MATCH or concrete dependencies, any number for ALL.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    rule: Key,
    triggered: Vec<TriggerEvent>,
    inputs: Vec<Vec<Resolved>>,
    states: Vec<Vec<Resolved>>,
    outputs: Vec<Vec<PropRef>>,
}

impl Invocation {
    pub fn new(
        rule: impl Into<Key>,
        triggered: Vec<TriggerEvent>,
        inputs: Vec<Vec<Resolved>>,
        states: Vec<Vec<Resolved>>,
        outputs: Vec<Vec<PropRef>>,
    ) -> Self {
        Self {
            rule: rule.into(),
            triggered,
            inputs,
            states,
            outputs,
        }
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Properties that changed. Empty for the initial call made on mount.
    pub fn triggered(&self) -> &[TriggerEvent] {
        &self.triggered
    }

    /// Identifier of the first triggering sub-element.
    pub fn trigger_id(&self) -> Option<&Identifier> {
        self.triggered.first().map(|event| &event.prop.id)
    }

    pub fn inputs(&self) -> &[Vec<Resolved>] {
        &self.inputs
    }

    pub fn states(&self) -> &[Vec<Resolved>] {
        &self.states
    }

    pub fn outputs(&self) -> &[Vec<PropRef>] {
        &self.outputs
    }

    pub fn input(&self, index: usize) -> &[Resolved] {
        self.inputs.get(index).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn state(&self, index: usize) -> &[Resolved] {
        self.states.get(index).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn output(&self, index: usize) -> &[PropRef] {
        self.outputs.get(index).map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accessors_tolerate_missing_dependencies() {
        let invocation = Invocation::new("r", Vec::new(), Vec::new(), Vec::new(), Vec::new());
        assert!(invocation.trigger_id().is_none());
        assert!(invocation.input(0).is_empty());
        assert!(invocation.state(3).is_empty());
        assert!(invocation.output(1).is_empty());
    }

    #[test]
    fn trigger_id_is_first_triggered() {
        let button = Identifier::new("ToggleButton", "button", "b1");
        let invocation = Invocation::new(
            "r",
            vec![TriggerEvent::new(button.clone(), "n_clicks", 2)],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(invocation.trigger_id(), Some(&button));
        assert_eq!(invocation.triggered()[0].value, json!(2));
    }

    #[test]
    fn resolved_views() {
        let owner = Identifier::new("TextFilter", "store", "f1");
        let foreign = Identifier::new("ToggleButton", "button", "b1");
        let entry = Resolved::correlation(owner, Some(foreign.clone()));
        assert_eq!(entry.foreign(), Some(&foreign));
        assert!(entry.value().is_none());
        assert_eq!(entry.property, CORRELATION);
    }
}
