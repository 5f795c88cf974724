//! Element trees produced by widgets.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::props;
use crate::ident::{Identifier, Key};

/// What kind of host element a node renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Anonymous grouping node.
    Container,
    /// Clickable control with an `n_clicks` counter.
    Button,
    /// Editable text with a `value`.
    TextInput,
    /// Correlation store entry. Not displayed.
    Correlation,
}

/// A node of the element tree handed to the layout on mount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    kind: ElementKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Identifier>,
    props: IndexMap<Key, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Element>,
    #[serde(skip)]
    correlation: Option<Identifier>,
}

impl Element {
    fn new(kind: ElementKind, id: Option<Identifier>) -> Self {
        Self {
            kind,
            id,
            props: IndexMap::new(),
            children: Vec::new(),
            correlation: None,
        }
    }

    pub fn container(children: impl IntoIterator<Item = Element>) -> Self {
        let mut element = Self::new(ElementKind::Container, None);
        element.children = children.into_iter().collect();
        element
    }

    pub fn button(id: Identifier, label: impl Into<String>) -> Self {
        Self::new(ElementKind::Button, Some(id)).with_prop(props::CHILDREN, label.into())
    }

    pub fn text_input(id: Identifier) -> Self {
        Self::new(ElementKind::TextInput, Some(id)).with_prop(props::VALUE, "")
    }

    /// A correlation entry recording that `owner` depends on `foreign`.
    pub fn correlation(owner: Identifier, foreign: Identifier) -> Self {
        let mut element = Self::new(ElementKind::Correlation, Some(owner));
        element.correlation = Some(foreign);
        element
    }

    pub fn with_prop(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn id(&self) -> Option<&Identifier> {
        self.id.as_ref()
    }

    pub fn props(&self) -> &IndexMap<Key, Value> {
        &self.props
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn correlation_target(&self) -> Option<&Identifier> {
        self.correlation.as_ref()
    }

    /// This node and its descendants in document (pre-)order.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(element) = stack.pop() {
            out.push(element);
            stack.extend(element.children.iter().rev());
        }
        out
    }
}
