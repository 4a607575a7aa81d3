use crate::item::{ItemId, QueueItem};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Identifiers of items that are pending, running, or inside their
/// post-completion retention window.
///
/// Several items may share an identifier when the caller did not ask for
/// duplicates to be rejected.
#[derive(Debug, Default)]
pub struct IdentifierRegistry {
    entries: Mutex<HashMap<String, BTreeMap<ItemId, Arc<QueueItem>>>>,
}

impl IdentifierRegistry {
    pub(crate) fn register(&self, item: &Arc<QueueItem>) {
        self.entries
            .lock()
            .entry(item.identifier().to_string())
            .or_default()
            .insert(item.id(), Arc::clone(item));
    }

    /// Remove one (id, identifier) pair. Returns whether it was present.
    pub(crate) fn release(&self, id: ItemId, identifier: &str) -> bool {
        let mut entries = self.entries.lock();
        let Some(items) = entries.get_mut(identifier) else {
            return false;
        };
        let removed = items.remove(&id).is_some();
        if items.is_empty() {
            entries.remove(identifier);
        }
        removed
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.lock().contains_key(identifier)
    }

    /// Registered items carrying `identifier`, in submission order
    pub fn items_with(&self, identifier: &str) -> Vec<Arc<QueueItem>> {
        self.entries
            .lock()
            .get(identifier)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of registered (id, identifier) pairs
    pub fn len(&self) -> usize {
        self.entries.lock().values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn item(registry: &Arc<IdentifierRegistry>, id: ItemId, identifier: &str) -> Arc<QueueItem> {
        Arc::new(QueueItem::new(
            id,
            identifier.to_string(),
            Duration::ZERO,
            format!("item {}", id),
            Box::pin(async { crate::item::Finished::undeliverable() }),
            Arc::downgrade(registry),
        ))
    }

    #[test]
    fn test_register_and_release() {
        let registry = Arc::new(IdentifierRegistry::default());
        let first = item(&registry, 1, "refresh");
        registry.register(&first);
        assert!(registry.contains("refresh"));
        assert!(!registry.contains("checkout"));

        assert!(registry.release(1, "refresh"));
        assert!(!registry.contains("refresh"));
        assert!(registry.is_empty());
        assert!(!registry.release(1, "refresh"));
    }

    #[test]
    fn test_shared_identifier_stays_until_last_release() {
        let registry = Arc::new(IdentifierRegistry::default());
        let first = item(&registry, 1, "refresh");
        let second = item(&registry, 2, "refresh");
        registry.register(&second);
        registry.register(&first);
        assert_eq!(registry.len(), 2);

        let ids: Vec<_> = registry.items_with("refresh").iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![1, 2]);

        registry.release(1, "refresh");
        assert!(registry.contains("refresh"));
        registry.release(2, "refresh");
        assert!(!registry.contains("refresh"));
    }

    #[test]
    fn test_release_with_wrong_identifier_is_noop() {
        let registry = Arc::new(IdentifierRegistry::default());
        registry.register(&item(&registry, 7, "checkout:main"));
        assert!(!registry.release(7, "checkout:other"));
        assert!(registry.contains("checkout:main"));
    }

    #[test]
    fn test_cancel_frees_identifier_immediately() {
        let registry = Arc::new(IdentifierRegistry::default());
        let queued = item(&registry, 3, "refresh");
        registry.register(&queued);
        assert!(queued.cancel());
        assert!(!registry.contains("refresh"));
    }
}
