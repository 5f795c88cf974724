//! Python bindings.
//!
//! Identifiers, property references and values cross the boundary as their
//! canonical JSON text, so the Python side needs no mirror types.

use std::fmt::Display;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::app::App;
use crate::config::AppConfig;
use crate::ident::{Identifier, PropRef};
use crate::reactive::TriggerEvent;
use crate::render::RenderBatch;
use crate::widgets::{TextFilter, Toggle, Widget};

fn value_error(err: impl Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn batch_json(batch: &RenderBatch) -> PyResult<String> {
    batch.to_json().map_err(value_error)
}

/// Python-exposed dispatcher with the built-in widgets registered.
#[pyclass(name = "Dispatcher")]
pub struct PyDispatcher {
    app: App,
}

#[pymethods]
impl PyDispatcher {
    #[new]
    #[pyo3(signature = (config_json = None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => AppConfig::from_json_str(json).map_err(value_error)?,
            None => AppConfig::default(),
        };
        let app = App::with_default_widgets(config).map_err(value_error)?;
        Ok(Self { app })
    }

    /// Mount a toggle; returns its button identifier.
    #[pyo3(signature = (label = Toggle::DEFAULT_LABEL, instance = None))]
    fn mount_toggle(&self, label: &str, instance: Option<String>) -> PyResult<String> {
        let mut toggle = Toggle::new(label);
        if let Some(instance) = instance {
            toggle = toggle.with_instance(instance);
        }
        self.app.mount_widget(&toggle).map_err(value_error)?;
        Ok(toggle.id().to_string())
    }

    /// Mount a text filter reset by `reset_source`; returns its input
    /// identifier.
    #[pyo3(signature = (reset_source, instance = None))]
    fn mount_text_filter(&self, reset_source: &str, instance: Option<String>) -> PyResult<String> {
        let source: Identifier = reset_source.parse().map_err(value_error)?;
        let mut builder = TextFilter::builder().reset_source(source);
        if let Some(instance) = instance {
            builder = builder.instance(instance);
        }
        let filter = builder.build().map_err(value_error)?;
        self.app.mount_widget(&filter).map_err(value_error)?;
        Ok(filter.input_id().to_string())
    }

    /// Click a button; returns the render batch as JSON.
    fn click(&self, id: &str) -> PyResult<String> {
        let id: Identifier = id.parse().map_err(value_error)?;
        let batch = self.app.click(&id).map_err(value_error)?;
        batch_json(&batch)
    }

    /// Set `prop_id` (`<identifier>.<property>`) to a JSON value.
    fn fire(&self, prop_id: &str, value_json: &str) -> PyResult<String> {
        let prop: PropRef = prop_id.parse().map_err(value_error)?;
        let value = serde_json::from_str(value_json).map_err(value_error)?;
        let batch = self
            .app
            .fire(TriggerEvent { prop, value })
            .map_err(value_error)?;
        batch_json(&batch)
    }

    /// Current value of a property as JSON, or `None` if unset.
    fn prop(&self, id: &str, property: &str) -> PyResult<Option<String>> {
        let id: Identifier = id.parse().map_err(value_error)?;
        Ok(self.app.prop(&id, property).map(|value| value.to_string()))
    }

    fn live_ids(&self) -> Vec<String> {
        self.app.live_ids().iter().map(Identifier::to_string).collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "Dispatcher(rules={}, mounted={}, correlations={})",
            self.app.registry().len(),
            self.app.live_ids().len(),
            self.app.store().len()
        )
    }
}

/// Python module definition.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDispatcher>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
