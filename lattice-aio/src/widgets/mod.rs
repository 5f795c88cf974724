//! All-in-one Widgets
//!
//! A widget bundles a small element tree with the rules that animate it.
//! Rules belong to the widget *type* and are registered once; every mounted
//! instance is addressed by its own instance token, so the same rules serve
//! any number of instances without per-instance wiring.
//!
//! # Writing a Widget
//!
//! 1. Declare an [`IdScheme`](crate::ident::IdScheme) per addressed
//!    sub-element.
//! 2. Implement [`WidgetType`] to build the type's rules from those schemes.
//! 3. Implement [`Widget`] for the instance: its token and its element tree.

mod text_filter;
mod toggle;

pub use text_filter::{TextFilter, TextFilterBuilder};
pub use toggle::{Toggle, ToggleState};

use crate::config::AppConfig;
use crate::error::RuleError;
use crate::ident::{Identifier, InstanceId};
use crate::reactive::Rule;
use crate::render::Element;

/// Type-level half of a widget: the rules shared by all instances.
pub trait WidgetType: 'static {
    /// Component tag carried by the widget's identifiers.
    const COMPONENT: &'static str;

    fn rules(config: &AppConfig) -> Result<Vec<Rule>, RuleError>;
}

/// Instance-level half of a widget.
pub trait Widget {
    fn instance(&self) -> &InstanceId;

    /// Identifiers this instance adds to the layout, excluding nested widgets.
    fn ids(&self) -> Vec<Identifier>;

    fn render(&self) -> Element;
}

pub mod ids {
    //! Identifier schemes of the built-in widgets.

    pub use super::text_filter::ids::{INPUT, STORE};
    pub use super::toggle::ids::BUTTON;
}
