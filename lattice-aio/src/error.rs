//! Error types for lattice-aio.
//!
//! Each concern gets its own `thiserror` enum so callers can match on the
//! failure they care about; [`AppError`] composes them for the top-level
//! application surface.

use std::path::PathBuf;

use thiserror::Error;

use crate::ident::{Identifier, InstanceId};
use crate::layout::MountId;

/// Configuration and widget-construction errors.
///
/// These are fatal at construction time: a widget that fails here is never
/// created.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A text filter was built without the identifier of its reset source.
    #[error("text filter {instance} was built without a reset source")]
    MissingResetSource { instance: InstanceId },

    /// A configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },

    /// Configuration JSON could not be parsed.
    #[error("failed to parse configuration: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },

    /// Configuration file could not be read.
    #[error("failed to read configuration {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors parsing the canonical text forms of identifiers and property
/// references.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid identifier JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// A required identifier field is absent or not a string.
    #[error("identifier is missing string field '{field}'")]
    MissingField { field: &'static str },

    /// A property reference has no `.property` suffix.
    #[error("property reference '{input}' has no property suffix")]
    MissingProperty { input: String },
}

/// Errors raised while building or registering a reactive rule.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("rule '{rule}' declares no inputs")]
    MissingInput { rule: String },

    #[error("rule '{rule}' declares no outputs")]
    MissingOutput { rule: String },

    #[error("rule '{rule}' has no handler")]
    MissingHandler { rule: String },

    /// MATCH wildcards are used inconsistently between dependencies.
    #[error("rule '{rule}': {detail}")]
    WildcardMismatch { rule: String, detail: String },

    /// Two rules declare the identical output dependency.
    #[error("output {output} is already produced by rule '{existing}'")]
    DuplicateOutput { output: String, existing: String },
}

/// Correlation store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Entries are write-once per owner.
    #[error("correlation for {owner} is already set")]
    AlreadySet { owner: Identifier },

    #[error("no correlation recorded for {owner}")]
    Missing { owner: Identifier },
}

/// Errors from the live layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// Two mounted sub-elements would share an identifier.
    #[error("duplicate identifier {id}")]
    DuplicateId { id: Identifier },

    #[error("{id} is not mounted")]
    NotMounted { id: Identifier },

    #[error("unknown mount {mount}")]
    UnknownMount { mount: MountId },
}

/// Signals a rule handler may return instead of output values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// Abort the invocation without emitting anything.
    #[error("update prevented")]
    PreventUpdate,

    /// The handler failed; the invocation emits nothing.
    #[error("callback failed: {0}")]
    Failed(String),

    /// The handler returned values that do not line up with the resolved
    /// output candidates.
    #[error("output shape mismatch: {0}")]
    OutputShape(String),
}

/// Errors surfaced by mount, unmount and trigger dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// `fire`/`mount`/`unmount` was called from inside a running rule.
    #[error("re-entrant dispatch from inside rule '{rule}'")]
    Reentrant { rule: String },

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Top-level error for building and validating an [`App`](crate::App).
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A rule names a concrete sub-element that is not mounted.
    #[error("rule '{rule}' depends on {dependency}, which is not in the layout")]
    UnresolvedDependency { rule: String, dependency: String },
}
