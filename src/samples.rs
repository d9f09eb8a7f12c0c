//! Built-in demo workspace fixtures and in-process endpoint implementations.
//!
//! The real item source and persistence endpoint are external services
//! consumed through the traits in [`crate::sync`]. The implementations here
//! let the app run standalone out of the box and give tests concrete
//! doubles.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::json;

use crate::sync::{GraphEndpoint, ItemSource, SyncError};
use crate::types::{Item, ItemKind, PersistedGraph};

/// A small demo workspace: a few databases, instances, and buckets.
pub fn demo_items() -> Vec<Item> {
    vec![
        Item {
            id: "db-orders".to_string(),
            kind: ItemKind::Database,
            display_name: "orders-postgres".to_string(),
            status: "running".to_string(),
            provider_metadata: json!({"provider": "aws", "engine": "postgres", "region": "eu-west-1"}),
        },
        Item {
            id: "db-sessions".to_string(),
            kind: ItemKind::Database,
            display_name: "sessions-redis".to_string(),
            status: "running".to_string(),
            provider_metadata: json!({"provider": "aws", "engine": "redis", "region": "eu-west-1"}),
        },
        Item {
            id: "vm-api".to_string(),
            kind: ItemKind::Instance,
            display_name: "api-server".to_string(),
            status: "running".to_string(),
            provider_metadata: json!({"provider": "gcp", "machine": "e2-standard-4", "zone": "europe-west1-b"}),
        },
        Item {
            id: "vm-worker".to_string(),
            kind: ItemKind::Instance,
            display_name: "batch-worker".to_string(),
            status: "stopped".to_string(),
            provider_metadata: json!({"provider": "gcp", "machine": "e2-highmem-2", "zone": "europe-west1-b"}),
        },
        Item {
            id: "bucket-assets".to_string(),
            kind: ItemKind::Storage,
            display_name: "static-assets".to_string(),
            status: "available".to_string(),
            provider_metadata: json!({"provider": "aws", "class": "standard", "region": "eu-west-1"}),
        },
        Item {
            id: "bucket-backups".to_string(),
            kind: ItemKind::Storage,
            display_name: "nightly-backups".to_string(),
            status: "available".to_string(),
            provider_metadata: json!({"provider": "aws", "class": "glacier", "region": "eu-central-1"}),
        },
    ]
}

/// An item source backed by a fixed in-memory list.
pub struct StaticItemSource {
    items: Vec<Item>,
}

impl StaticItemSource {
    /// Creates a source over the given items.
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// The demo workspace source.
    pub fn demo() -> Self {
        Self::new(demo_items())
    }
}

impl ItemSource for StaticItemSource {
    fn fetch_items(&self) -> Result<Vec<Item>, SyncError> {
        Ok(self.items.clone())
    }
}

/// A persistence endpoint holding the document in memory.
///
/// Also used as a test double: it counts successful stores and can be told
/// to fail incoming writes.
#[derive(Default)]
pub struct InMemoryGraphEndpoint {
    document: Mutex<Option<PersistedGraph>>,
    stores: AtomicUsize,
    fail_stores: AtomicBool,
}

impl InMemoryGraphEndpoint {
    /// Number of writes that have landed.
    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }

    /// The last stored document, if any.
    pub fn stored(&self) -> Option<PersistedGraph> {
        self.document.lock().ok()?.clone()
    }

    /// Makes subsequent writes fail until called again with `false`.
    pub fn fail_next_stores(&self, fail: bool) {
        self.fail_stores.store(fail, Ordering::SeqCst);
    }
}

impl GraphEndpoint for InMemoryGraphEndpoint {
    fn load(&self) -> Result<PersistedGraph, SyncError> {
        let guard = self
            .document
            .lock()
            .map_err(|_| SyncError::Unavailable("endpoint poisoned".to_string()))?;
        Ok(guard.clone().unwrap_or_default())
    }

    fn store(&self, document: &PersistedGraph) -> Result<(), SyncError> {
        if self.fail_stores.load(Ordering::SeqCst) {
            return Err(SyncError::Unavailable("simulated write failure".to_string()));
        }
        let mut guard = self
            .document
            .lock()
            .map_err(|_| SyncError::Unavailable("endpoint poisoned".to_string()))?;
        *guard = Some(document.clone());
        self.stores.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_items_have_unique_ids() {
        let items = demo_items();
        let mut ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), items.len());
    }

    #[test]
    fn empty_endpoint_loads_an_empty_document() {
        let endpoint = InMemoryGraphEndpoint::default();
        let document = endpoint.load().unwrap();
        assert!(document.nodes.is_empty());
        assert!(document.edges.is_empty());
    }

    #[test]
    fn endpoint_roundtrips_the_last_document() {
        let endpoint = InMemoryGraphEndpoint::default();
        let document = PersistedGraph::default();
        endpoint.store(&document).unwrap();
        assert_eq!(endpoint.store_count(), 1);
        assert_eq!(endpoint.load().unwrap(), document);
    }

    #[test]
    fn failing_endpoint_rejects_writes_without_storing() {
        let endpoint = InMemoryGraphEndpoint::default();
        endpoint.fail_next_stores(true);
        assert!(endpoint.store(&PersistedGraph::default()).is_err());
        assert_eq!(endpoint.store_count(), 0);
        assert!(endpoint.stored().is_none());
    }
}
