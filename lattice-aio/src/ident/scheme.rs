//! Identifier schemes: one definition, concrete ids and patterns.

use super::identifier::Identifier;
use super::pattern::{Pattern, Slot, Wildcard};
use super::token::InstanceId;

/// The `(component, subcomponent)` tag pair of one kind of sub-element.
///
/// Widget types declare their schemes as constants:
///
/// ```rust
/// use lattice_aio::ident::{IdScheme, Wildcard};
///
/// const BUTTON: IdScheme = IdScheme::new("ToggleButton", "button");
///
/// let id = BUTTON.id("reset_button_1");
/// assert!(BUTTON.pattern(Wildcard::All).matches(&id).is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdScheme {
    component: &'static str,
    subcomponent: &'static str,
}

impl IdScheme {
    pub const fn new(component: &'static str, subcomponent: &'static str) -> Self {
        Self {
            component,
            subcomponent,
        }
    }

    pub const fn component(&self) -> &'static str {
        self.component
    }

    pub const fn subcomponent(&self) -> &'static str {
        self.subcomponent
    }

    /// Concrete address of this sub-element in one instance.
    pub fn id(&self, instance: impl Into<InstanceId>) -> Identifier {
        Identifier::new(self.component, self.subcomponent, instance)
    }

    /// Pattern with the instance field replaced by `instance`.
    pub fn pattern(&self, instance: impl Into<Slot>) -> Pattern {
        Pattern::new(self.component, self.subcomponent, instance)
    }

    /// `pattern(Wildcard::Match)`.
    pub fn each(&self) -> Pattern {
        self.pattern(Wildcard::Match)
    }

    /// `pattern(Wildcard::All)`.
    pub fn every(&self) -> Pattern {
        self.pattern(Wildcard::All)
    }

    /// Whether `id` has this scheme's shape.
    pub fn owns(&self, id: &Identifier) -> bool {
        self.every().matches(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: IdScheme = IdScheme::new("TextFilter", "input");

    #[test]
    fn same_tags_and_token_give_identical_ids() {
        let token = InstanceId::generate();
        assert_eq!(INPUT.id(&token), INPUT.id(token.clone()));
        assert_eq!(INPUT.pattern(&token).to_identifier(), Some(INPUT.id(token)));
    }

    #[test]
    fn broadcast_pattern_matches_every_instance() {
        let every = INPUT.every();
        for token in ["a", "b", "c"] {
            assert!(every.matches(&INPUT.id(token)).is_some());
        }
        assert!(!INPUT.owns(&IdScheme::new("TextFilter", "store").id("a")));
    }
}
