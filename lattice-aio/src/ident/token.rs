//! Instance tokens.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token scoping a set of identifiers to one widget instance.
///
/// Tokens are either supplied by the caller (`"reset_button_1"`) or generated
/// as a random UUID. Within one component/subcomponent pair, tokens must be
/// unique across mounted instances; the layout rejects duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(Cow<'static, str>);

impl InstanceId {
    /// Wrap a caller-supplied token.
    pub fn new(token: impl Into<Cow<'static, str>>) -> Self {
        Self(token.into())
    }

    /// Generate a fresh, globally unique token.
    pub fn generate() -> Self {
        Self(Cow::Owned(Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for InstanceId {
    fn from(token: &'static str) -> Self {
        Self(Cow::Borrowed(token))
    }
}

impl From<String> for InstanceId {
    fn from(token: String) -> Self {
        Self(Cow::Owned(token))
    }
}

impl From<&InstanceId> for InstanceId {
    fn from(token: &InstanceId) -> Self {
        token.clone()
    }
}

impl From<InstanceId> for Cow<'static, str> {
    fn from(token: InstanceId) -> Self {
        token.0
    }
}
