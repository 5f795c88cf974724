//! Reactive rules.
//!
//! A rule binds input dependencies (what triggers it), state dependencies
//! (read-only context) and output dependencies (what it updates) to a pure
//! handler. Dependencies are declared with patterns, so one rule definition
//! serves every present and future instance of a widget type.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::invocation::Invocation;
use crate::error::{CallbackError, RuleError};
use crate::ident::{Captures, Key, Pattern, PropRef, Wildcard};

/// A pattern plus the property it reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pattern: Pattern,
    property: Key,
}

impl Dependency {
    pub fn new(pattern: Pattern, property: impl Into<Key>) -> Self {
        Self {
            pattern,
            property: property.into(),
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub(crate) fn property_key(&self) -> Key {
        self.property.clone()
    }

    /// Match a concrete property reference against this dependency.
    pub fn matches(&self, prop: &PropRef) -> Option<Captures> {
        if prop.property != self.property {
            return None;
        }
        self.pattern.matches(&prop.id)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.pattern, self.property)
    }
}

/// Where a rule's state values come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateSource {
    /// A property of the matched sub-elements.
    Prop(Dependency),
    /// Correlation store entries of the matched owners.
    Correlation(Pattern),
}

impl StateSource {
    pub fn pattern(&self) -> &Pattern {
        match self {
            StateSource::Prop(dep) => dep.pattern(),
            StateSource::Correlation(pattern) => pattern,
        }
    }
}

impl fmt::Display for StateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateSource::Prop(dep) => dep.fmt(f),
            StateSource::Correlation(pattern) => write!(f, "correlation({pattern})"),
        }
    }
}

/// Update for one output candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Update {
    Set(Value),
    /// Leave the candidate untouched. Broadcast outputs need one entry per
    /// candidate, so "nothing" has to be said explicitly.
    NoUpdate,
}

impl Update {
    pub fn is_no_update(&self) -> bool {
        matches!(self, Update::NoUpdate)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Update::Set(value) => Some(value),
            Update::NoUpdate => None,
        }
    }
}

/// Handler result for one output dependency.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    /// For MATCH or concrete outputs.
    Single(Update),
    /// For ALL outputs, one update per candidate in candidate order.
    Many(Vec<Update>),
}

impl OutputValue {
    pub(crate) fn describe(&self) -> String {
        match self {
            OutputValue::Single(_) => "a single value".to_string(),
            OutputValue::Many(updates) => format!("{} values", updates.len()),
        }
    }
}

pub type Handler =
    dyn Fn(&Invocation) -> Result<Vec<OutputValue>, CallbackError> + Send + Sync + 'static;

/// Registry-assigned rule identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(u32);

impl RuleId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A registered-once, pattern-driven reactive rule.
#[derive(Clone)]
pub struct Rule {
    name: Key,
    outputs: Vec<Dependency>,
    inputs: Vec<Dependency>,
    states: Vec<StateSource>,
    prevent_initial_call: bool,
    handler: Arc<Handler>,
}

impl Rule {
    pub fn builder(name: impl Into<Key>) -> RuleBuilder {
        RuleBuilder {
            name: name.into(),
            outputs: Vec::new(),
            inputs: Vec::new(),
            states: Vec::new(),
            prevent_initial_call: false,
            handler: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_key(&self) -> Key {
        self.name.clone()
    }

    pub fn outputs(&self) -> &[Dependency] {
        &self.outputs
    }

    pub fn inputs(&self) -> &[Dependency] {
        &self.inputs
    }

    pub fn states(&self) -> &[StateSource] {
        &self.states
    }

    pub fn prevent_initial_call(&self) -> bool {
        self.prevent_initial_call
    }

    /// Run the handler against a resolved snapshot.
    pub fn call(&self, invocation: &Invocation) -> Result<Vec<OutputValue>, CallbackError> {
        (self.handler)(invocation)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("outputs", &self.outputs.len())
            .field("inputs", &self.inputs.len())
            .field("states", &self.states.len())
            .field("prevent_initial_call", &self.prevent_initial_call)
            .finish()
    }
}

pub struct RuleBuilder {
    name: Key,
    outputs: Vec<Dependency>,
    inputs: Vec<Dependency>,
    states: Vec<StateSource>,
    prevent_initial_call: bool,
    handler: Option<Arc<Handler>>,
}

impl RuleBuilder {
    pub fn output(mut self, pattern: Pattern, property: impl Into<Key>) -> Self {
        self.outputs.push(Dependency::new(pattern, property));
        self
    }

    pub fn input(mut self, pattern: Pattern, property: impl Into<Key>) -> Self {
        self.inputs.push(Dependency::new(pattern, property));
        self
    }

    pub fn state(mut self, pattern: Pattern, property: impl Into<Key>) -> Self {
        self.states
            .push(StateSource::Prop(Dependency::new(pattern, property)));
        self
    }

    /// Read the correlation store entries of the owners matching `pattern`.
    pub fn correlation(mut self, pattern: Pattern) -> Self {
        self.states.push(StateSource::Correlation(pattern));
        self
    }

    /// Skip the invocation normally made when matching inputs are mounted.
    pub fn prevent_initial_call(mut self, prevent: bool) -> Self {
        self.prevent_initial_call = prevent;
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Invocation) -> Result<Vec<OutputValue>, CallbackError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<Rule, RuleError> {
        self.validate()?;
        let handler = self.handler.ok_or_else(|| RuleError::MissingHandler {
            rule: self.name.to_string(),
        })?;

        Ok(Rule {
            name: self.name,
            outputs: self.outputs,
            inputs: self.inputs,
            states: self.states,
            prevent_initial_call: self.prevent_initial_call,
            handler,
        })
    }

    /// MATCH keys must line up: every MATCH input binds the same keys, and
    /// outputs and states may only use MATCH on keys the inputs bind. ALL is
    /// unrestricted, which is what lets a broadcast rule fan many triggers
    /// into many outputs.
    fn validate(&self) -> Result<(), RuleError> {
        let rule = || self.name.to_string();
        if self.inputs.is_empty() {
            return Err(RuleError::MissingInput { rule: rule() });
        }
        if self.outputs.is_empty() {
            return Err(RuleError::MissingOutput { rule: rule() });
        }

        fn match_keys(pattern: &Pattern) -> BTreeSet<&str> {
            pattern.wildcard_keys(Wildcard::Match).collect()
        }

        let mut bound: Option<BTreeSet<&str>> = None;
        for input in &self.inputs {
            let keys = match_keys(input.pattern());
            if keys.is_empty() {
                continue;
            }
            match &bound {
                Some(existing) if *existing != keys => {
                    return Err(RuleError::WildcardMismatch {
                        rule: rule(),
                        detail: format!("input {input} binds different MATCH keys than the other inputs"),
                    });
                }
                Some(_) => {}
                None => bound = Some(keys),
            }
        }
        let bound = bound.unwrap_or_default();

        for output in &self.outputs {
            let keys = match_keys(output.pattern());
            if !keys.is_empty() && keys != bound {
                return Err(RuleError::WildcardMismatch {
                    rule: rule(),
                    detail: format!("output {output} uses MATCH on keys the inputs do not bind"),
                });
            }
        }

        for state in &self.states {
            let keys = match_keys(state.pattern());
            if !keys.is_subset(&bound) {
                return Err(RuleError::WildcardMismatch {
                    rule: rule(),
                    detail: format!("state {state} uses MATCH on keys the inputs do not bind"),
                });
            }
        }

        Ok(())
    }
}

/// Convenience for handlers: a single `Set`.
pub fn set(value: impl Into<Value>) -> OutputValue {
    OutputValue::Single(Update::Set(value.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::IdScheme;

    const BUTTON: IdScheme = IdScheme::new("ToggleButton", "button");
    const INPUT: IdScheme = IdScheme::new("TextFilter", "input");
    const STORE: IdScheme = IdScheme::new("TextFilter", "store");

    fn noop(_: &Invocation) -> Result<Vec<OutputValue>, CallbackError> {
        Ok(vec![OutputValue::Single(Update::NoUpdate)])
    }

    #[test]
    fn builds_broadcast_rule() {
        let rule = Rule::builder("reset")
            .output(INPUT.every(), "value")
            .input(BUTTON.every(), "n_clicks")
            .correlation(STORE.every())
            .handler(noop)
            .build()
            .unwrap();

        assert_eq!(rule.name(), "reset");
        assert_eq!(rule.inputs().len(), 1);
        assert!(matches!(rule.states()[0], StateSource::Correlation(_)));
        assert!(!rule.prevent_initial_call());
    }

    #[test]
    fn requires_inputs_outputs_and_handler() {
        let err = Rule::builder("r")
            .output(INPUT.every(), "value")
            .handler(noop)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::MissingInput { .. }));

        let err = Rule::builder("r")
            .input(BUTTON.every(), "n_clicks")
            .handler(noop)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::MissingOutput { .. }));

        let err = Rule::builder("r")
            .output(INPUT.every(), "value")
            .input(BUTTON.every(), "n_clicks")
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::MissingHandler { .. }));
    }

    #[test]
    fn match_output_needs_match_input() {
        let err = Rule::builder("r")
            .output(BUTTON.each(), "style")
            .input(BUTTON.every(), "n_clicks")
            .handler(noop)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::WildcardMismatch { .. }));
    }

    #[test]
    fn match_state_must_be_bound_by_inputs() {
        let err = Rule::builder("r")
            .output(INPUT.every(), "value")
            .input(BUTTON.every(), "n_clicks")
            .correlation(STORE.each())
            .handler(noop)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::WildcardMismatch { .. }));

        Rule::builder("r")
            .output(INPUT.each(), "value")
            .input(INPUT.each(), "n_submit")
            .correlation(STORE.each())
            .handler(noop)
            .build()
            .unwrap();
    }

    #[test]
    fn match_on_extra_key_lines_up_across_dependencies() {
        let rule = Rule::builder("r")
            .output(INPUT.every().with_field("page", Wildcard::Match), "value")
            .input(BUTTON.every().with_field("page", Wildcard::Match), "n_clicks")
            .handler(noop)
            .build()
            .unwrap();
        assert_eq!(rule.name(), "r");

        let err = Rule::builder("r")
            .output(INPUT.every().with_field("tab", Wildcard::Match), "value")
            .input(BUTTON.every().with_field("page", Wildcard::Match), "n_clicks")
            .handler(noop)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::WildcardMismatch { .. }));
    }

    #[test]
    fn dependency_matches_property_and_pattern() {
        let dep = Dependency::new(BUTTON.every(), "n_clicks");
        assert!(dep.matches(&PropRef::new(BUTTON.id("b"), "n_clicks")).is_some());
        assert!(dep.matches(&PropRef::new(BUTTON.id("b"), "style")).is_none());
        assert!(dep.matches(&PropRef::new(INPUT.id("b"), "n_clicks")).is_none());
    }
}
