// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Listener table keyed by node handle and event type

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::event::Event;
use super::node::Node;
use crate::error::Result;
use crate::gateway::Handle;

/// Registered event callback
///
/// Returning an error aborts the dispatch in progress.
pub type Listener = Arc<dyn Fn(&Node, &mut Event) -> Result<()> + Send + Sync>;

/// handle -> event type -> callbacks in registration order
///
/// Entries are created on first registration and never removed.
#[derive(Default)]
pub struct ListenerTable {
    entries: RwLock<HashMap<Handle, HashMap<String, Vec<Listener>>>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; duplicates are kept
    pub fn add(&self, handle: &Handle, event_type: &str, listener: Listener) {
        let mut entries = self.entries.write();
        entries
            .entry(handle.clone())
            .or_default()
            .entry(event_type.to_string())
            .or_default()
            .push(listener);
    }

    /// Copy of the listeners for (handle, type), taken under the lock
    pub fn snapshot(&self, handle: &Handle, event_type: &str) -> Vec<Listener> {
        self.entries
            .read()
            .get(handle)
            .and_then(|types| types.get(event_type))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of listeners for (handle, type)
    pub fn count(&self, handle: &Handle, event_type: &str) -> usize {
        self.entries
            .read()
            .get(handle)
            .and_then(|types| types.get(event_type))
            .map_or(0, Vec::len)
    }

    /// Whether any node listens for `event_type`
    pub fn is_listening(&self, event_type: &str) -> bool {
        self.entries
            .read()
            .values()
            .any(|types| types.get(event_type).is_some_and(|l| !l.is_empty()))
    }

    /// Number of handles with at least one registration
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl std::fmt::Debug for ListenerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.read();
        let total: usize = entries
            .values()
            .flat_map(|types| types.values())
            .map(Vec::len)
            .sum();
        f.debug_struct("ListenerTable")
            .field("handles", &entries.len())
            .field("listeners", &total)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Listener {
        Arc::new(|_, _| Ok(()))
    }

    #[test]
    fn test_add_and_count() {
        let table = ListenerTable::new();
        let form = Handle::Int(7);

        assert!(table.is_empty());
        assert_eq!(table.count(&form, "submit"), 0);
        assert!(table.snapshot(&form, "submit").is_empty());

        let listener = noop();
        table.add(&form, "submit", listener.clone());
        table.add(&form, "submit", listener);
        table.add(&form, "reset", noop());

        assert_eq!(table.count(&form, "submit"), 2);
        assert_eq!(table.count(&form, "reset"), 1);
        assert_eq!(table.count(&Handle::Int(8), "submit"), 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_is_listening() {
        let table = ListenerTable::new();
        assert!(!table.is_listening("click"));

        table.add(&Handle::from("btn"), "click", noop());
        assert!(table.is_listening("click"));
        assert!(!table.is_listening("submit"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let table = ListenerTable::new();
        let node = Handle::Int(1);
        table.add(&node, "click", noop());

        let snapshot = table.snapshot(&node, "click");
        table.add(&node, "click", noop());

        assert_eq!(snapshot.len(), 1);
        assert_eq!(table.count(&node, "click"), 2);
    }
}
