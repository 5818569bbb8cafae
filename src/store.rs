//! Reactive global variable store.
//!
//! One store exists per engine; it holds every document-global variable and
//! intercepts writes.  `set` commits the value, bumps a revision counter,
//! and synchronously notifies registered watchers before returning.  Reads
//! are plain map lookups — only writes are intercepted.
//!
//! The whole-document observer re-scan (`hs-print` / `hs-show` / `hs-hide`
//! re-rendering) is driven by the engine right after each global write; see
//! `interp.rs`.  Watchers registered here are for callers that want to see
//! writes without owning the document (tests, external logging).

use std::collections::HashMap;
use std::fmt;

use crate::value::Value;

type Watcher = Box<dyn FnMut(&str, &Value)>;

/// Global key/value store with write interception.
#[derive(Default)]
pub struct Store {
    vars: HashMap<String, Value>,
    revision: u64,
    watchers: Vec<Watcher>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("vars", &self.vars)
            .field("revision", &self.revision)
            .field("watchers", &self.watchers.len())
            .finish()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a write, then synchronously notify every watcher.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.vars.insert(name.clone(), value.clone());
        self.revision += 1;
        for w in &mut self.watchers {
            w(&name, &value);
        }
    }

    /// Read a variable (pass-through, never intercepted).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Remove a variable.  Counts as a write: bumps the revision and
    /// notifies watchers with `Undefined`.
    pub fn remove(&mut self, name: &str) -> bool {
        let existed = self.vars.remove(name).is_some();
        if existed {
            self.revision += 1;
            for w in &mut self.watchers {
                w(name, &Value::Undefined);
            }
        }
        existed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Number of writes committed so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a watcher invoked synchronously on every write.
    pub fn watch(&mut self, watcher: impl FnMut(&str, &Value) + 'static) {
        self.watchers.push(Box::new(watcher));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn set_and_get() {
        let mut store = Store::new();
        store.set("x", Value::Int(5));
        assert_eq!(store.get("x"), Some(&Value::Int(5)));
        assert!(store.contains("x"));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn overwrite_keeps_one_entry() {
        let mut store = Store::new();
        store.set("x", Value::Int(1));
        store.set("x", Value::Int(2));
        assert_eq!(store.get("x"), Some(&Value::Int(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn revision_counts_writes_not_reads() {
        let mut store = Store::new();
        assert_eq!(store.revision(), 0);
        store.set("a", Value::Int(1));
        store.set("a", Value::Int(2));
        let _ = store.get("a");
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn watcher_fires_synchronously_on_write() {
        let seen: Rc<RefCell<Vec<(String, Value)>>> = Rc::default();
        let seen2 = Rc::clone(&seen);
        let mut store = Store::new();
        store.watch(move |name, value| {
            seen2.borrow_mut().push((name.to_owned(), value.clone()));
        });

        store.set("x", Value::Int(1));
        assert_eq!(
            seen.borrow().as_slice(),
            &[("x".to_owned(), Value::Int(1))]
        );

        store.remove("x");
        assert_eq!(seen.borrow().last().unwrap().1, Value::Undefined);
    }

    #[test]
    fn remove_missing_is_silent() {
        let mut store = Store::new();
        assert!(!store.remove("ghost"));
        assert_eq!(store.revision(), 0);
    }
}
