//! Correlation narrowing.
//!
//! A broadcast rule listens to every trigger of a kind and writes to every
//! candidate output of a kind. Narrowing turns that many-to-many match into
//! the intended pairing: only candidates whose correlation entry names the
//! sub-element that actually fired are updated, every other candidate gets an
//! explicit `NoUpdate`.
//!
//! Correlation is a flat equality filter in the handler, not a nested
//! pattern. Patterns cannot wildcard inside an identifier-valued field, so the
//! foreign identifier is compared here instead.

use std::collections::HashMap;

use serde_json::Value;

use super::invocation::Resolved;
use super::rule::Update;
use crate::error::CallbackError;
use crate::ident::{FieldValue, Identifier, PropRef, SUBCOMPONENT};

/// Owner key of a sub-element: every identifier field but `subcomponent`.
type OwnerKey<'a> = Vec<(&'a str, &'a FieldValue)>;

fn owner_key(id: &Identifier) -> OwnerKey<'_> {
    id.fields().filter(|(key, _)| *key != SUBCOMPONENT).collect()
}

/// Emit `reset` for the candidates correlated with `trigger`.
///
/// Candidates and correlation entries are paired by owner: every identifier
/// field except `subcomponent` must agree, so extra fields count. The
/// result has exactly one update per candidate, in candidate order. A
/// candidate whose owner has no correlation entry is left untouched. With no
/// trigger the invocation is aborted with [`CallbackError::PreventUpdate`].
pub fn narrow_to_correlated(
    trigger: Option<&Identifier>,
    candidates: &[PropRef],
    correlations: &[Resolved],
    reset: &Value,
) -> Result<Vec<Update>, CallbackError> {
    let Some(fired) = trigger else {
        return Err(CallbackError::PreventUpdate);
    };

    let foreign_by_owner: HashMap<OwnerKey<'_>, &Identifier> = correlations
        .iter()
        .filter_map(|entry| entry.foreign().map(|foreign| (owner_key(&entry.id), foreign)))
        .collect();

    Ok(candidates
        .iter()
        .map(|candidate| match foreign_by_owner.get(&owner_key(&candidate.id)) {
            Some(foreign) if *foreign == fired => Update::Set(reset.clone()),
            _ => Update::NoUpdate,
        })
        .collect())
}
