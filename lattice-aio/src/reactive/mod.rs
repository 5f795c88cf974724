//! Reactive Rules
//!
//! This module implements pattern-matched reactivity: rules registered once
//! per widget type that react to every matching instance.
//!
//! # Concepts
//!
//! ## Rules
//!
//! A [`Rule`] names its inputs, states and outputs with patterns over
//! identifiers plus a property name. When a property changes, every rule
//! with a matching input is invoked with an [`Invocation`] snapshot and
//! returns one [`OutputValue`] per output dependency.
//!
//! ## Broadcast and MATCH
//!
//! MATCH dependencies resolve per instance: a click on one toggle re-styles
//! that toggle only. ALL dependencies resolve to every live instance, so a
//! broadcast rule sees all candidates at once and must answer for each of
//! them, using `Update::NoUpdate` for the ones it leaves alone.
//!
//! ## Correlation
//!
//! Broadcast rules narrow themselves to a one-to-one effect with
//! [`narrow_to_correlated`], comparing each candidate's correlation entry
//! with the identifier that fired.
//!
//! # Implementation Notes
//!
//! The [`RuleRegistry`] is explicit and owned by the application rather than
//! a global, and a thread-local [`DispatchScope`] records which rule is
//! running so re-entrant dispatch can be rejected.

mod context;
mod correlate;
mod invocation;
mod registry;
mod rule;

pub use context::DispatchScope;
pub use correlate::narrow_to_correlated;
pub use invocation::{Invocation, Resolved, ResolvedValue, TriggerEvent, CORRELATION};
pub use registry::RuleRegistry;
pub use rule::{set, Dependency, Handler, OutputValue, Rule, RuleBuilder, RuleId, StateSource, Update};
