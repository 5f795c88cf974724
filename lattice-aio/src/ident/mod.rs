//! Identifier Scheme
//!
//! Sub-elements of a widget are addressed by structured identifiers rather
//! than flat names. An [`Identifier`] is an ordered record
//! `{component, subcomponent, instance, ...}`: the two tags are fixed by the
//! widget type, the instance token scopes the identifier to one mounted widget.
//!
//! Replacing a field with a [`Wildcard`] turns the same shape into a
//! [`Pattern`] that matches every sub-element of that kind, present or future.
//! [`IdScheme`] produces both forms from one definition so they always agree.
//!
//! # Wildcards
//!
//! - `Wildcard::Match` matches any value and binds it: every MATCH pattern in
//!   one rule invocation resolves to the same captured value.
//! - `Wildcard::All` matches any value and yields every match as a list.
//!
//! Nested identifiers (an identifier as a field value) are not supported;
//! correlating two instances is done with the correlation store instead.

mod identifier;
mod pattern;
mod scheme;
mod token;

pub use identifier::{FieldValue, Identifier, Key, PropRef, COMPONENT, INSTANCE, SUBCOMPONENT};
pub use pattern::{Capture, Captures, Pattern, Slot, Wildcard};
pub use scheme::IdScheme;
pub use token::InstanceId;
