//! Deduplicated warnings for recovered input errors.
//!
//! Malformed markup, dropped stylesheet rules and unparsable selectors are
//! never fatal. Each stage reports them here so a page that repeats the same
//! mistake a thousand times prints it once.
//!
//! Deduplication is per [`WarningScope`]. A document build runs its parsing
//! stages inside its own scope, so builds running side by side never see or
//! reset each other's warnings. Outside any scope a process-wide set is used.

use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Messages printed outside any scope since the last [`clear_warnings`].
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

thread_local! {
    /// The scope entered on this thread, if any.
    static ACTIVE: RefCell<Option<WarningScope>> = const { RefCell::new(None) };
}

/// The warnings of one unit of work, usually one document build.
///
/// Work runs inside the scope through [`enter`](Self::enter), which must be
/// synchronous: the scope is installed on the current thread for the
/// duration of the closure only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningScope {
    seen: HashSet<String>,
    messages: Vec<String>,
}

impl WarningScope {
    /// A scope with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with warnings deduplicated against this scope.
    ///
    /// Scopes nest: the enclosing scope, if any, is restored afterwards,
    /// even if `f` panics.
    pub fn enter<R>(&mut self, f: impl FnOnce() -> R) -> R {
        struct Restore<'a> {
            scope: &'a mut WarningScope,
            outer: Option<WarningScope>,
        }

        impl Drop for Restore<'_> {
            fn drop(&mut self) {
                let outer = self.outer.take();
                let inner = ACTIVE.with(|active| active.replace(outer));
                if let Some(inner) = inner {
                    *self.scope = inner;
                }
            }
        }

        let outer = ACTIVE.with(|active| active.replace(Some(std::mem::take(self))));
        let _restore = Restore { scope: self, outer };
        f()
    }

    /// Distinct warnings recorded, in the order first seen.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Consume the scope, keeping its messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    /// Number of distinct warnings recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn record(&mut self, key: &str) -> bool {
        if self.seen.contains(key) {
            return false;
        }
        let _ = self.seen.insert(key.to_string());
        self.messages.push(key.to_string());
        true
    }
}

/// Print a warning once per unique `(component, message)` pair.
///
/// # Example
/// ```ignore
/// warn_once("CSS", "dropped declaration without ':' in rule 'p'");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let scoped = ACTIVE.with(|active| {
        active
            .borrow_mut()
            .as_mut()
            .map(|scope| scope.record(&key))
    });
    let should_print = scoped.unwrap_or_else(|| {
        WARNED
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert_with(HashSet::new)
            .insert(key)
    });

    if should_print {
        eprintln!("{YELLOW}[Kestrel {component}] ⚠ {message}{RESET}");
    }
}

/// Forget every warning recorded outside a scope.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Number of distinct warnings recorded outside a scope since the last clear.
#[must_use]
pub fn warning_count() -> usize {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map_or(0, HashSet::len)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::*;

    #[test]
    fn test_scope_deduplicates() {
        let mut scope = WarningScope::new();
        scope.enter(|| {
            warn_once("CSS", "scoped twice");
            warn_once("CSS", "scoped twice");
            warn_once("HTML", "scoped twice");
        });
        assert_eq!(
            scope.messages(),
            ["[CSS] scoped twice", "[HTML] scoped twice"]
        );
    }

    #[test]
    fn test_unscoped_warnings_use_process_set() {
        let mut scope = WarningScope::new();
        scope.enter(|| warn_once("CSS", "kept out of the process set"));
        warn_once("CSS", "unscoped");
        warn_once("CSS", "unscoped");
        assert_eq!(warning_count(), 1);
        clear_warnings();
        assert_eq!(warning_count(), 0);
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn test_scope_survives_reentry() {
        let mut scope = WarningScope::new();
        scope.enter(|| warn_once("CSS", "first pass"));
        scope.enter(|| warn_once("CSS", "first pass"));
        scope.enter(|| warn_once("CSS", "second pass"));
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn test_nested_scopes_restore_outer() {
        let mut outer = WarningScope::new();
        let mut inner = WarningScope::new();
        outer.enter(|| {
            warn_once("CSS", "outer");
            inner.enter(|| warn_once("CSS", "inner"));
            warn_once("CSS", "outer again");
        });
        assert_eq!(outer.messages(), ["[CSS] outer", "[CSS] outer again"]);
        assert_eq!(inner.messages(), ["[CSS] inner"]);
    }

    #[test]
    fn test_concurrent_scopes_are_independent() {
        let barrier = Arc::new(Barrier::new(2));
        let workers: Vec<_> = (0..2)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut scope = WarningScope::new();
                    scope.enter(|| {
                        warn_once("HTML", "shared mistake");
                        let _ = barrier.wait();
                        warn_once("HTML", "shared mistake");
                    });
                    scope.into_messages()
                })
            })
            .collect();
        for worker in workers {
            assert_eq!(worker.join().unwrap(), ["[HTML] shared mistake"]);
        }
    }
}
