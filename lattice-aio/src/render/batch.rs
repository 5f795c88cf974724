//! Render batches: the outbound surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ident::{Key, PropRef};
use crate::reactive::Update;

/// One output of one rule invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emission {
    pub rule: Key,
    pub target: PropRef,
    pub update: Update,
}

/// An invocation that produced nothing because it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFailure {
    pub rule: Key,
    pub reason: String,
}

/// Everything produced by one event or mount, in evaluation order.
///
/// Emissions of one invocation are contiguous and follow its candidate order,
/// `NoUpdate` entries included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderBatch {
    emissions: Vec<Emission>,
    failures: Vec<RuleFailure>,
}

impl RenderBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emissions(&self) -> &[Emission] {
        &self.emissions
    }

    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.emissions.is_empty() && self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.emissions.len()
    }

    /// Emissions of one rule, in order.
    pub fn for_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Emission> + 'a {
        self.emissions.iter().filter(move |e| e.rule == rule)
    }

    /// Values actually written, skipping `NoUpdate`.
    pub fn changes(&self) -> impl Iterator<Item = (&PropRef, &Value)> {
        self.emissions
            .iter()
            .filter_map(|e| e.update.value().map(|value| (&e.target, value)))
    }

    /// The last update emitted for `target`.
    pub fn update_for(&self, target: &PropRef) -> Option<&Update> {
        self.emissions
            .iter()
            .rev()
            .find(|e| e.target == *target)
            .map(|e| &e.update)
    }

    pub(crate) fn extend(&mut self, emissions: impl IntoIterator<Item = Emission>) {
        self.emissions.extend(emissions);
    }

    pub(crate) fn fail(&mut self, rule: Key, reason: impl Into<String>) {
        self.failures.push(RuleFailure {
            rule,
            reason: reason.into(),
        });
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Compact MessagePack form for hosts across a language boundary.
    pub fn encode_msgpack(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(self)
    }

    pub fn decode_msgpack(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}
