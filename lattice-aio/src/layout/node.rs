//! Layout Nodes
//!
//! This module defines the nodes that live in the mounted layout.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::ident::Key;
use crate::render::ElementKind;

/// Handle for one `mount` call; unmounting it removes everything it added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MountId(u64);

impl MountId {
    /// Generate a new unique mount ID.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A mounted, addressed sub-element and its current properties.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedNode {
    kind: ElementKind,
    mount: MountId,
    props: IndexMap<Key, Value>,
}

impl MountedNode {
    pub(crate) fn new(kind: ElementKind, mount: MountId, props: IndexMap<Key, Value>) -> Self {
        Self { kind, mount, props }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn mount(&self) -> MountId {
        self.mount
    }

    pub fn props(&self) -> &IndexMap<Key, Value> {
        &self.props
    }

    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    /// Set a property, returning the previous value.
    pub(crate) fn set_prop(&mut self, name: Key, value: Value) -> Option<Value> {
        self.props.insert(name, value)
    }
}
