//! Toggle button.
//!
//! A button whose background alternates with the parity of its click
//! count. The styling rule is a MATCH rule: a click restyles the clicked
//! button and nothing else.

use serde_json::{json, Value};

use super::{Widget, WidgetType};
use crate::config::{AppConfig, TogglePalette};
use crate::error::RuleError;
use crate::ident::{Identifier, InstanceId};
use crate::reactive::{set, Rule};
use crate::render::{props, Element};

pub mod ids {
    use crate::ident::IdScheme;

    pub const BUTTON: IdScheme = IdScheme::new("ToggleButton", "button");
}

use ids::BUTTON;

/// Visual state derived from a click count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    Even,
    Odd,
}

impl ToggleState {
    pub fn from_clicks(n_clicks: i64) -> Self {
        if n_clicks.rem_euclid(2) == 0 {
            ToggleState::Even
        } else {
            ToggleState::Odd
        }
    }

    pub fn background<'a>(&self, palette: &'a TogglePalette) -> &'a str {
        match self {
            ToggleState::Even => &palette.even_background,
            ToggleState::Odd => &palette.odd_background,
        }
    }
}

/// A labelled toggle button.
#[derive(Debug, Clone, PartialEq)]
pub struct Toggle {
    instance: InstanceId,
    label: String,
    initial_clicks: i64,
}

impl Toggle {
    /// Click count a freshly mounted toggle starts from.
    pub const DEFAULT_INITIAL_CLICKS: i64 = 1;

    pub const DEFAULT_LABEL: &'static str = "Click me!";

    /// A toggle with a freshly generated instance token.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            instance: InstanceId::generate(),
            label: label.into(),
            initial_clicks: Self::DEFAULT_INITIAL_CLICKS,
        }
    }

    pub fn with_instance(mut self, instance: impl Into<InstanceId>) -> Self {
        self.instance = instance.into();
        self
    }

    pub fn with_initial_clicks(mut self, n_clicks: i64) -> Self {
        self.initial_clicks = n_clicks;
        self
    }

    pub fn id(&self) -> Identifier {
        BUTTON.id(&self.instance)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn initial_clicks(&self) -> i64 {
        self.initial_clicks
    }
}

impl Default for Toggle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LABEL)
    }
}

impl Widget for Toggle {
    fn instance(&self) -> &InstanceId {
        &self.instance
    }

    fn ids(&self) -> Vec<Identifier> {
        vec![self.id()]
    }

    fn render(&self) -> Element {
        Element::button(self.id(), self.label.clone()).with_prop(props::N_CLICKS, self.initial_clicks)
    }
}

impl WidgetType for Toggle {
    const COMPONENT: &'static str = BUTTON.component();

    fn rules(config: &AppConfig) -> Result<Vec<Rule>, RuleError> {
        let palette = config.toggle.clone();
        let parity = Rule::builder("toggle-parity")
            .output(BUTTON.each(), props::STYLE)
            .input(BUTTON.each(), props::N_CLICKS)
            .handler(move |invocation| {
                // A missing or non-integer count is treated as zero clicks.
                let n_clicks = invocation
                    .input(0)
                    .first()
                    .and_then(|resolved| resolved.value())
                    .and_then(Value::as_i64)
                    .unwrap_or(0);
                let background = ToggleState::from_clicks(n_clicks).background(&palette);
                Ok(vec![set(json!({ "background": background }))])
            })
            .build()?;
        Ok(vec![parity])
    }
}
