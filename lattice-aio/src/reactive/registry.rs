//! Rule Registry
//!
//! The registry is the central table of reactive rules. It is created once at
//! startup, filled while widget types initialize, and read-only afterwards.
//! There is no removal: a rule registered for a widget type serves every
//! instance that will ever be mounted.
//!
//! # Lookup
//!
//! When a property changes we need the rules listening to it. Input patterns
//! with fixed `(component, subcomponent)` tags are indexed by
//! `(component, subcomponent, property)`; patterns with a wildcard tag go to
//! a short list that is scanned for every event.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::debug;

use super::rule::{Dependency, Rule, RuleId};
use crate::config::AppConfig;
use crate::error::RuleError;
use crate::ident::{Captures, FieldValue, Key, PropRef, COMPONENT, SUBCOMPONENT};
use crate::widgets::WidgetType;

type PrefixKey = (FieldValue, FieldValue, Key);

#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<Rule>>,
    index: HashMap<PrefixKey, SmallVec<[RuleId; 4]>>,
    unindexed: Vec<RuleId>,
    outputs: HashMap<Dependency, RuleId>,
    widget_types: HashSet<TypeId>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule.
    ///
    /// Fails if another rule already declares one of its outputs.
    pub fn register(&mut self, rule: Rule) -> Result<RuleId, RuleError> {
        for output in rule.outputs() {
            if let Some(existing) = self.outputs.get(output) {
                return Err(RuleError::DuplicateOutput {
                    output: output.to_string(),
                    existing: self.rules[existing.index()].name().to_string(),
                });
            }
        }

        let id = RuleId::from_index(self.rules.len());
        for output in rule.outputs() {
            self.outputs.insert(output.clone(), id);
        }

        for input in rule.inputs() {
            match input.pattern().prefix() {
                Some((component, subcomponent)) => {
                    let key = (component.clone(), subcomponent.clone(), input.property_key());
                    let ids = self.index.entry(key).or_default();
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                None => {
                    if !self.unindexed.contains(&id) {
                        self.unindexed.push(id);
                    }
                }
            }
        }

        debug!(rule = rule.name(), id = id.index(), "registered rule");
        self.rules.push(Arc::new(rule));
        Ok(id)
    }

    /// Register the rules of widget type `W`, once per type.
    ///
    /// Returns `false` if the type was already registered.
    pub fn register_widget<W: WidgetType>(&mut self, config: &AppConfig) -> Result<bool, RuleError> {
        let type_id = TypeId::of::<W>();
        if self.widget_types.contains(&type_id) {
            return Ok(false);
        }

        for rule in W::rules(config)? {
            self.register(rule)?;
        }
        self.widget_types.insert(type_id);
        debug!(widget = W::COMPONENT, "registered widget type");
        Ok(true)
    }

    pub fn get(&self, id: RuleId) -> Option<&Arc<Rule>> {
        self.rules.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Arc<Rule>)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (RuleId::from_index(i), rule))
    }

    /// Rules with an input listening to `prop`, in registration order, each
    /// with the captures of its first matching input.
    pub fn listeners(&self, prop: &PropRef) -> Vec<(RuleId, Captures)> {
        let mut ids: Vec<RuleId> = self.unindexed.clone();
        if let (Some(component), Some(subcomponent)) =
            (prop.id.get(COMPONENT), prop.id.get(SUBCOMPONENT))
        {
            let key = (component.clone(), subcomponent.clone(), prop.property.clone());
            if let Some(indexed) = self.index.get(&key) {
                ids.extend(indexed.iter().copied());
            }
        }
        ids.sort_unstable();
        ids.dedup();

        ids.into_iter()
            .filter_map(|id| {
                self.rules[id.index()]
                    .inputs()
                    .iter()
                    .find_map(|input| input.matches(prop))
                    .map(|captures| (id, captures))
            })
            .collect()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.rules)
            .field("widget_types", &self.widget_types.len())
            .finish()
    }
}
