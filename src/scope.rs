//! Scope model for the directive walk.
//!
//! Two flavors exist: the shared global [`Store`](crate::store::Store) and
//! ephemeral local overlays created by `hs-group`.  Scopes do not chain:
//! expression evaluation sees a single-level merged view — every store entry
//! overlaid by the current local entries, local winning on conflict.  A
//! nested `hs-group` gets a fresh empty overlay, not a child of its parent's.

use std::collections::HashMap;

use crate::store::Store;
use crate::value::Value;

/// The mutable scope a subtree is being expanded under.
///
/// `Scope::global()` means directive assignments write through the engine to
/// the store (triggering the reactive re-scan); a local scope absorbs them
/// silently and is dropped when the group or loop finishes.
#[derive(Debug, Default)]
pub struct Scope {
    local: Option<HashMap<String, Value>>,
}

impl Scope {
    /// The global scope: writes go to the store.
    pub fn global() -> Self {
        Scope { local: None }
    }

    /// A fresh empty local overlay (one per `hs-group`).
    pub fn local() -> Self {
        Scope {
            local: Some(HashMap::new()),
        }
    }

    pub fn is_global(&self) -> bool {
        self.local.is_none()
    }

    /// Look up a name in the local overlay only.
    pub fn get_local(&self, name: &str) -> Option<&Value> {
        self.local.as_ref()?.get(name)
    }

    /// Insert into the local overlay.  Returns `false` when this scope is
    /// global (the caller must route the write through the store instead).
    pub fn set_local(&mut self, name: &str, value: Value) -> bool {
        match self.local.as_mut() {
            Some(map) => {
                map.insert(name.to_owned(), value);
                true
            }
            None => false,
        }
    }

    /// Remove from the local overlay.  Returns `false` for a global scope.
    pub fn remove_local(&mut self, name: &str) -> bool {
        match self.local.as_mut() {
            Some(map) => {
                map.remove(name);
                true
            }
            None => false,
        }
    }

    /// Build the per-evaluation merged view: store entries overlaid by the
    /// local overlay.  The result is an independent copy — writes made by an
    /// expression land here and are discarded afterwards.
    pub fn merged(&self, store: &Store) -> HashMap<String, Value> {
        let mut merged: HashMap<String, Value> = store
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(local) = &self.local {
            for (k, v) in local {
                merged.insert(k.clone(), v.clone());
            }
        }
        merged
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
