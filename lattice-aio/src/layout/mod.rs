//! Live Layout
//!
//! The layout is the set of currently mounted, addressed sub-elements and
//! their property values. It is what patterns are matched against: an ALL
//! dependency resolves to the live matches in mount order, and anything
//! unmounted is simply no longer a candidate.
//!
//! # Design Decisions
//!
//! 1. Nodes are kept in an insertion-ordered map keyed by identifier, so
//!    lookups are O(1) and candidate lists come out in document order.
//!
//! 2. Mounting is all-or-nothing. If any identifier in the new tree is
//!    already mounted (or repeated inside the tree), nothing is added.
//!
//! 3. Anonymous elements (containers) are not tracked; only addressed
//!    sub-elements take part in matching.

mod node;

pub use node::{MountId, MountedNode};

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::LayoutError;
use crate::ident::{Captures, Identifier, Pattern, PropRef};
use crate::render::Element;

/// What a successful mount added.
#[derive(Debug, Clone, PartialEq)]
pub struct Mounted {
    pub mount: MountId,
    /// Addressed sub-elements, in document order.
    pub ids: Vec<Identifier>,
    /// `(owner, foreign)` pairs declared by correlation elements.
    pub correlations: Vec<(Identifier, Identifier)>,
}

#[derive(Debug, Default)]
pub struct Layout {
    nodes: IndexMap<Identifier, MountedNode>,
}

impl Layout {
    /// An empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every addressed sub-element of `root`, in document order.
    pub fn mount(&mut self, root: &Element) -> Result<Mounted, LayoutError> {
        let addressed: Vec<(&Identifier, &Element)> = root
            .descendants()
            .into_iter()
            .filter_map(|element| element.id().map(|id| (id, element)))
            .collect();

        let mut seen = HashSet::with_capacity(addressed.len());
        for (id, _) in &addressed {
            if self.nodes.contains_key(*id) || !seen.insert(*id) {
                return Err(LayoutError::DuplicateId { id: (*id).clone() });
            }
        }

        let mount = MountId::next();
        let mut mounted = Mounted {
            mount,
            ids: Vec::with_capacity(addressed.len()),
            correlations: Vec::new(),
        };
        for (id, element) in addressed {
            self.nodes.insert(
                id.clone(),
                MountedNode::new(element.kind(), mount, element.props().clone()),
            );
            if let Some(foreign) = element.correlation_target() {
                mounted.correlations.push((id.clone(), foreign.clone()));
            }
            mounted.ids.push(id.clone());
        }
        Ok(mounted)
    }

    /// Remove every sub-element added by `mount`, returning their identifiers.
    pub fn unmount(&mut self, mount: MountId) -> Result<Vec<Identifier>, LayoutError> {
        let removed: Vec<Identifier> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.mount() == mount)
            .map(|(id, _)| id.clone())
            .collect();
        if removed.is_empty() {
            return Err(LayoutError::UnknownMount { mount });
        }

        for id in &removed {
            self.nodes.shift_remove(id);
        }
        Ok(removed)
    }

    /// Whether `id` is mounted.
    pub fn contains(&self, id: &Identifier) -> bool {
        self.nodes.contains_key(id)
    }

    /// Current value of one property of a mounted sub-element.
    pub fn prop(&self, id: &Identifier, property: &str) -> Option<&Value> {
        self.nodes.get(id).and_then(|node| node.prop(property))
    }

    /// Write a property, returning its previous value.
    pub fn set_prop(&mut self, target: &PropRef, value: Value) -> Result<Option<Value>, LayoutError> {
        let node = self
            .nodes
            .get_mut(&target.id)
            .ok_or_else(|| LayoutError::NotMounted {
                id: target.id.clone(),
            })?;
        Ok(node.set_prop(target.property.clone(), value))
    }

    /// Live identifiers matching `pattern`, in mount order.
    pub fn matching<'a>(
        &'a self,
        pattern: &'a Pattern,
    ) -> impl Iterator<Item = (&'a Identifier, Captures)> + 'a {
        self.nodes
            .keys()
            .filter_map(move |id| pattern.matches(id).map(|captures| (id, captures)))
    }

    /// Mounted identifiers in mount order.
    pub fn ids(&self) -> impl Iterator<Item = &Identifier> {
        self.nodes.keys()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
