//! Lattice AIO
//!
//! All-in-one components for the Lattice reactive UI framework. Widgets
//! that can be placed any number of times in one layout, each instance
//! addressed by composite identifiers and animated by rules registered once
//! per widget type.
//!
//! It implements:
//!
//! - Composite identifiers and wildcard patterns (MATCH / ALL)
//! - Pattern-matched reactive rules and a dispatch runtime
//! - A write-once correlation store for pairing instances across widgets
//! - Built-in toggle and text filter widgets
//!
//! The crate is designed to be used both as a native Rust library and, with
//! the `python` feature, as a Python extension module via PyO3.
//!
//! # Architecture
//!
//! - `ident`: identifiers, patterns and per-widget identifier schemes
//! - `reactive`: rules, the rule registry and correlation narrowing
//! - `layout`: the set of mounted sub-elements and their properties
//! - `store`: the correlation store
//! - `render`: element trees in, render batches out
//! - `widgets`: the built-in widgets
//! - `app`: the dispatch runtime tying it together
//! - `demo`: the two-filter demo page
//!
//! # Example
//!
//! ```rust
//! use lattice_aio::widgets::{TextFilter, Toggle};
//! use lattice_aio::{App, AppConfig, Update};
//!
//! let app = App::with_default_widgets(AppConfig::default()).unwrap();
//!
//! let reset = Toggle::new("Reset 1");
//! let filter = TextFilter::builder()
//!     .reset_source(reset.id())
//!     .build()
//!     .unwrap();
//! app.mount_widget(&filter).unwrap();
//! app.mount_widget(&reset).unwrap();
//!
//! let batch = app.click(&reset.id()).unwrap();
//! let target = lattice_aio::ident::PropRef::new(filter.input_id(), "value");
//! assert_eq!(batch.update_for(&target), Some(&Update::Set("".into())));
//! ```

pub mod app;
pub mod config;
pub mod demo;
pub mod error;
pub mod ident;
pub mod layout;
pub mod reactive;
pub mod render;
pub mod store;
pub mod widgets;

#[cfg(feature = "python")]
mod python;

pub use app::{App, AppBuilder, MountReport};
pub use config::{AppConfig, TogglePalette};
pub use error::{AppError, CallbackError, ConfigError, DispatchError};
pub use ident::{IdScheme, Identifier, InstanceId, Pattern, PropRef, Wildcard};
pub use reactive::{OutputValue, Rule, TriggerEvent, Update};
pub use render::RenderBatch;
pub use store::CorrelationStore;
