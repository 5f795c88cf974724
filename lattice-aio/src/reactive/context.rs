//! Dispatch Scope
//!
//! The dispatch scope tracks which rule is currently being evaluated on this
//! thread. The runtime uses it to reject re-entrant dispatch: a handler that
//! calls back into `fire` or `mount` would otherwise deadlock on the
//! runtime's serialization lock.
//!
//! # Implementation
//!
//! We use a thread-local stack. Entering a scope pushes the rule name and
//! returns a guard; dropping the guard pops it, so the stack stays balanced
//! even if a handler panics.

use std::cell::RefCell;

use crate::ident::Key;

thread_local! {
    static DISPATCH_STACK: RefCell<Vec<ScopeEntry>> = const { RefCell::new(Vec::new()) };
}

#[derive(Debug, Clone)]
struct ScopeEntry {
    rule: Key,
    depth: usize,
}

/// Guard that pops the scope when dropped.
pub struct DispatchScope {
    depth: usize,
}

impl DispatchScope {
    /// Enter the evaluation of `rule`.
    pub fn enter(rule: impl Into<Key>) -> Self {
        let depth = DISPATCH_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let depth = stack.len();
            stack.push(ScopeEntry {
                rule: rule.into(),
                depth,
            });
            depth
        });

        Self { depth }
    }

    /// Whether a rule is being evaluated on this thread.
    pub fn is_active() -> bool {
        DISPATCH_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// Name of the innermost rule being evaluated, if any.
    pub fn current_rule() -> Option<Key> {
        DISPATCH_STACK.with(|stack| stack.borrow().last().map(|entry| entry.rule.clone()))
    }

    /// Number of nested scopes.
    pub fn depth() -> usize {
        DISPATCH_STACK.with(|stack| stack.borrow().len())
    }
}

impl Drop for DispatchScope {
    fn drop(&mut self) {
        DISPATCH_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.depth, self.depth,
                    "DispatchScope mismatch: expected depth {}, got {} ({})",
                    self.depth, entry.depth, entry.rule
                );
            }
        });
    }
}
