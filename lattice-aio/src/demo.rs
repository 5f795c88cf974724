//! Demo Page
//!
//! Two text filters, each reset by its own toggle placed after it in the
//! page. Neither reset button knows which filter it clears; the pairing lives
//! in the filters' correlation entries.

use crate::app::{App, MountReport};
use crate::error::{ConfigError, DispatchError};
use crate::widgets::{TextFilter, Toggle};

const RESETS: [(&str, &str); 2] = [("Reset 1", "reset_button_1"), ("Reset 2", "reset_button_2")];

/// The demo layout, ready to mount.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoPage {
    pub filters: [TextFilter; 2],
    pub resets: [Toggle; 2],
}

impl DemoPage {
    /// Filters get fresh instance tokens; reset buttons use fixed ones.
    pub fn new() -> Result<Self, ConfigError> {
        let resets = RESETS.map(|(label, instance)| Toggle::new(label).with_instance(instance));
        let filters = [
            TextFilter::builder().reset_source(resets[0].id()).build()?,
            TextFilter::builder().reset_source(resets[1].id()).build()?,
        ];
        Ok(Self { filters, resets })
    }

    /// Mount filter 1, reset 1, filter 2, reset 2, in that order.
    pub fn mount(&self, app: &App) -> Result<Vec<MountReport>, DispatchError> {
        let mut reports = Vec::with_capacity(4);
        for (filter, reset) in self.filters.iter().zip(&self.resets) {
            reports.push(app.mount_widget(filter)?);
            reports.push(app.mount_widget(reset)?);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::widgets::ids::{BUTTON, INPUT};
    use crate::widgets::Widget;

    #[test]
    fn filters_point_at_their_own_reset() {
        let page = DemoPage::new().unwrap();
        assert_eq!(page.filters[0].reset_source(), &BUTTON.id("reset_button_1"));
        assert_eq!(page.filters[1].reset_source(), &BUTTON.id("reset_button_2"));
        assert_eq!(page.resets[1].label(), "Reset 2");
        assert_ne!(page.filters[0].instance(), page.filters[1].instance());
    }

    #[test]
    fn mounts_in_document_order() {
        let app = App::with_default_widgets(AppConfig::default()).unwrap();
        let page = DemoPage::new().unwrap();
        let reports = page.mount(&app).unwrap();

        assert_eq!(reports.len(), 4);
        assert_eq!(reports[1].ids, vec![page.resets[0].id()]);
        let inputs: Vec<_> = app
            .live_ids()
            .into_iter()
            .filter(|id| INPUT.owns(id))
            .collect();
        assert_eq!(inputs, vec![page.filters[0].input_id(), page.filters[1].input_id()]);
        assert_eq!(
            app.store().get(&page.filters[1].store_id()).unwrap(),
            page.resets[1].id()
        );
    }
}
