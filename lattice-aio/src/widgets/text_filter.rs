//! Text filter with an external reset.
//!
//! A text input, a nested apply toggle, and a correlation entry naming the
//! button that resets this filter. The reset button lives elsewhere in the
//! layout and knows nothing about the filter.
//!
//! # Reset Rule
//!
//! The reset rule is a broadcast rule: it listens to every toggle button and
//! may write every filter input. Each invocation reads every filter's
//! correlation entry and clears only the inputs whose entry names the button
//! that fired. Other candidates, including all of them when the apply button
//! of some filter is clicked, get an explicit `NoUpdate`.

use serde_json::json;

use super::toggle::ids::BUTTON;
use super::{Toggle, Widget, WidgetType};
use crate::config::AppConfig;
use crate::error::{ConfigError, RuleError};
use crate::ident::{Identifier, InstanceId};
use crate::reactive::{narrow_to_correlated, OutputValue, Rule};
use crate::render::{props, Element};

pub mod ids {
    use crate::ident::IdScheme;

    pub const INPUT: IdScheme = IdScheme::new("TextFilter", "input");
    pub const STORE: IdScheme = IdScheme::new("TextFilter", "store");
}

use ids::{INPUT, STORE};

const APPLY_LABEL: &str = "Apply filters";

#[derive(Debug, Clone, PartialEq)]
pub struct TextFilter {
    instance: InstanceId,
    reset_source: Identifier,
    apply: Toggle,
}

impl TextFilter {
    pub fn builder() -> TextFilterBuilder {
        TextFilterBuilder::default()
    }

    pub fn input_id(&self) -> Identifier {
        INPUT.id(&self.instance)
    }

    pub fn store_id(&self) -> Identifier {
        STORE.id(&self.instance)
    }

    pub fn apply_button(&self) -> &Toggle {
        &self.apply
    }

    /// The button whose clicks clear this filter.
    pub fn reset_source(&self) -> &Identifier {
        &self.reset_source
    }
}

impl Widget for TextFilter {
    fn instance(&self) -> &InstanceId {
        &self.instance
    }

    fn ids(&self) -> Vec<Identifier> {
        vec![self.input_id(), self.store_id()]
    }

    fn render(&self) -> Element {
        Element::container([
            Element::text_input(self.input_id()),
            self.apply.render(),
            Element::correlation(self.store_id(), self.reset_source.clone()),
        ])
    }
}

impl WidgetType for TextFilter {
    const COMPONENT: &'static str = INPUT.component();

    fn rules(_config: &AppConfig) -> Result<Vec<Rule>, RuleError> {
        let reset = Rule::builder("text-filter-reset")
            .output(INPUT.every(), props::VALUE)
            .input(BUTTON.every(), props::N_CLICKS)
            .correlation(STORE.every())
            .handler(|invocation| {
                let updates = narrow_to_correlated(
                    invocation.trigger_id(),
                    invocation.output(0),
                    invocation.state(0),
                    &json!(""),
                )?;
                Ok(vec![OutputValue::Many(updates)])
            })
            .build()?;
        Ok(vec![reset])
    }
}

#[derive(Debug, Default)]
pub struct TextFilterBuilder {
    instance: Option<InstanceId>,
    reset_source: Option<Identifier>,
}

impl TextFilterBuilder {
    pub fn instance(mut self, instance: impl Into<InstanceId>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Identifier of the button that resets this filter. Required.
    pub fn reset_source(mut self, source: Identifier) -> Self {
        self.reset_source = Some(source);
        self
    }

    pub fn build(self) -> Result<TextFilter, ConfigError> {
        let instance = self.instance.unwrap_or_else(InstanceId::generate);
        let reset_source = self
            .reset_source
            .ok_or_else(|| ConfigError::MissingResetSource {
                instance: instance.clone(),
            })?;

        Ok(TextFilter {
            instance,
            reset_source,
            apply: Toggle::new(APPLY_LABEL),
        })
    }
}
