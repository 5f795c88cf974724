//! Render Surface
//!
//! Widgets describe themselves as [`Element`] trees; the runtime answers
//! events with [`RenderBatch`]es of per-property updates. Both are plain data
//! so a host renderer can consume them without knowing about rules.

mod batch;
mod element;

pub use batch::{Emission, RenderBatch, RuleFailure};
pub use element::{Element, ElementKind};

/// Property names shared by widgets and rules.
pub mod props {
    pub const N_CLICKS: &str = "n_clicks";
    pub const STYLE: &str = "style";
    pub const VALUE: &str = "value";
    pub const CHILDREN: &str = "children";
}
